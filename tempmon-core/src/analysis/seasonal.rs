use std::collections::BTreeMap;

use crate::model::{Season, SeasonalProfile, TemperatureRecord};

/// Per-season mean, sample standard deviation and range.
///
/// Only seasons with at least one record appear; output follows the
/// canonical season order. Records are accumulated in timestamp order
/// (stable for ties), so the row order of `records` does not change the
/// result.
pub fn seasonal_profiles(records: &[TemperatureRecord]) -> Vec<SeasonalProfile> {
    let mut ordered: Vec<&TemperatureRecord> = records.iter().collect();
    ordered.sort_by_key(|r| r.timestamp);
    profiles_in_order(ordered)
}

/// Accumulates in iteration order. Floating-point sums depend on that order,
/// so callers pass records already sorted by timestamp.
pub(crate) fn profiles_in_order<'a>(
    records: impl IntoIterator<Item = &'a TemperatureRecord>,
) -> Vec<SeasonalProfile> {
    let mut by_season: BTreeMap<Season, Vec<f64>> = BTreeMap::new();
    for record in records {
        by_season
            .entry(record.season)
            .or_default()
            .push(record.temperature);
    }

    by_season
        .into_iter()
        .map(|(season, temps)| profile_of(season, &temps))
        .collect()
}

fn profile_of(season: Season, temps: &[f64]) -> SeasonalProfile {
    let count = temps.len();
    let mean = temps.iter().sum::<f64>() / count as f64;

    // ddof = 1
    let std = (count > 1).then(|| {
        let ss: f64 = temps.iter().map(|t| (t - mean).powi(2)).sum();
        (ss / (count - 1) as f64).sqrt()
    });

    let min = temps.iter().copied().fold(f64::INFINITY, f64::min);
    let max = temps.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    SeasonalProfile {
        season,
        count,
        mean,
        std,
        min,
        max,
    }
}
