//! Seasonal anomaly analysis for a single city's series.
//!
//! Records are ordered by timestamp with a stable sort: rows sharing a
//! timestamp keep the order they had in the input. That order feeds the
//! rolling window and the seasonal sums, so callers that need a different
//! tie-break must sort before calling [`analyze`].

use tracing::debug;

use crate::{
    ROLLING_WINDOW,
    error::{AnalysisError, Result},
    model::{AnnotatedRecord, TemperatureRecord},
};

pub mod aggregate;
pub mod rolling;
pub mod seasonal;

pub use aggregate::{Aggregator, Strategy};
pub use seasonal::seasonal_profiles;

/// Annotate one city's records with rolling trend, seasonal statistics and
/// anomaly flag. Output is sorted ascending by timestamp and has the same
/// length as the input.
pub fn analyze(records: &[TemperatureRecord]) -> Result<Vec<AnnotatedRecord>> {
    validate(records)?;

    let mut sorted: Vec<&TemperatureRecord> = records.iter().collect();
    sorted.sort_by_key(|r| r.timestamp);

    let temps: Vec<f64> = sorted.iter().map(|r| r.temperature).collect();
    let trend = rolling::centered_mean(&temps, ROLLING_WINDOW);
    let profiles = seasonal::profiles_in_order(sorted.iter().copied());

    let annotated = sorted
        .into_iter()
        .zip(trend)
        .map(|(record, rolling_mean)| {
            let profile = profiles.iter().find(|p| p.season == record.season);
            // a season without a profile has undefined statistics
            let (season_mean, season_std, is_anomaly) = match profile {
                Some(p) => (p.mean, p.std, p.is_anomalous(record.temperature)),
                None => (f64::NAN, None, false),
            };

            AnnotatedRecord {
                city: record.city.clone(),
                timestamp: record.timestamp,
                temperature: record.temperature,
                season: record.season,
                rolling_mean,
                season_mean,
                season_std,
                is_anomaly,
            }
        })
        .collect::<Vec<_>>();

    if let Some(first) = annotated.first() {
        debug!(
            city = %first.city,
            records = annotated.len(),
            anomalies = annotated.iter().filter(|r| r.is_anomaly).count(),
            "analyzed city"
        );
    }

    Ok(annotated)
}

fn validate(records: &[TemperatureRecord]) -> Result<()> {
    let Some(first) = records.first() else {
        return Ok(());
    };

    for (idx, record) in records.iter().enumerate() {
        if record.city.trim().is_empty() {
            return Err(AnalysisError::InvalidInput(format!(
                "record {idx} has no city"
            )));
        }
        if record.city != first.city {
            return Err(AnalysisError::InvalidInput(format!(
                "records span more than one city: '{}' and '{}'",
                first.city, record.city
            )));
        }
        if !record.temperature.is_finite() {
            return Err(AnalysisError::InvalidInput(format!(
                "record {idx} for '{}' at {} has no usable temperature",
                record.city, record.timestamp
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Season;
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    fn day(offset: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2021, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + Duration::days(offset)
    }

    fn rec(city: &str, offset: i64, temperature: f64, season: Season) -> TemperatureRecord {
        TemperatureRecord {
            city: city.into(),
            timestamp: day(offset),
            temperature,
            season,
        }
    }

    fn paris_winter() -> Vec<TemperatureRecord> {
        (0..40)
            .map(|i| {
                let t = if i == 20 { 20.0 } else { -3.0 };
                rec("Paris", i, t, Season::Winter)
            })
            .collect()
    }

    #[test]
    fn paris_outlier_is_the_only_anomaly() {
        let out = analyze(&paris_winter()).unwrap();

        assert_eq!(out.len(), 40);
        for (i, r) in out.iter().enumerate() {
            assert_eq!(r.is_anomaly, i == 20, "index {i}");
            assert_eq!(
                r.rolling_mean.is_some(),
                (14..=24).contains(&i),
                "index {i}"
            );
        }
    }

    #[test]
    fn output_is_sorted_and_preserves_pairs() {
        let input = vec![
            rec("Rome", 3, 12.0, Season::Spring),
            rec("Rome", 1, 10.0, Season::Spring),
            rec("Rome", 2, 11.0, Season::Spring),
        ];

        let out = analyze(&input).unwrap();
        let pairs: Vec<(NaiveDateTime, f64)> = out
            .iter()
            .map(|r| (r.timestamp, r.temperature))
            .collect();
        assert_eq!(pairs, vec![(day(1), 10.0), (day(2), 11.0), (day(3), 12.0)]);
    }

    #[test]
    fn equal_timestamps_keep_input_order() {
        let input = vec![
            rec("Rome", 1, 5.0, Season::Spring),
            rec("Rome", 0, 1.0, Season::Spring),
            rec("Rome", 1, 3.0, Season::Spring),
        ];

        let temps: Vec<f64> = analyze(&input)
            .unwrap()
            .iter()
            .map(|r| r.temperature)
            .collect();
        assert_eq!(temps, vec![1.0, 5.0, 3.0]);
    }

    #[test]
    fn single_record_is_valid_but_never_anomalous() {
        let out = analyze(&[rec("Cairo", 0, 45.0, Season::Summer)]).unwrap();

        assert_eq!(out.len(), 1);
        assert!(out[0].rolling_mean.is_none());
        assert!(out[0].season_std.is_none());
        assert!(!out[0].is_anomaly);
    }

    #[test]
    fn singleton_season_is_not_flagged_among_others() {
        let mut input: Vec<TemperatureRecord> = (0..10)
            .map(|i| rec("Lima", i, 20.0 + (i % 3) as f64, Season::Summer))
            .collect();
        input.push(rec("Lima", 10, -40.0, Season::Winter));

        let out = analyze(&input).unwrap();
        let winter = out.iter().find(|r| r.season == Season::Winter).unwrap();
        assert!(!winter.is_anomaly);
        assert_eq!(winter.season_mean, -40.0);
    }

    #[test]
    fn mixed_cities_are_rejected() {
        let input = vec![
            rec("Paris", 0, 1.0, Season::Winter),
            rec("Berlin", 1, 1.0, Season::Winter),
        ];
        let err = analyze(&input).unwrap_err();
        assert!(
            matches!(err, AnalysisError::InvalidInput(msg) if msg.contains("more than one city"))
        );
    }

    #[test]
    fn missing_temperature_is_rejected() {
        let input = vec![
            rec("Paris", 0, 1.0, Season::Winter),
            rec("Paris", 1, f64::NAN, Season::Winter),
        ];
        assert!(matches!(analyze(&input), Err(AnalysisError::InvalidInput(_))));
    }

    #[test]
    fn empty_input_gives_empty_output() {
        assert!(analyze(&[]).unwrap().is_empty());
    }

    #[test]
    fn analysis_is_idempotent() {
        let input: Vec<TemperatureRecord> = (0..60)
            .map(|i| rec("Tokyo", i, ((i * 7) % 11) as f64 - 3.3, Season::Autumn))
            .collect();

        let first = analyze(&input).unwrap();
        let second = analyze(&input).unwrap();
        assert_eq!(first, second);

        let bits = |v: &[AnnotatedRecord]| -> Vec<Option<u64>> {
            v.iter().map(|r| r.rolling_mean.map(f64::to_bits)).collect()
        };
        assert_eq!(bits(&first), bits(&second));
    }

    #[test]
    fn row_order_does_not_change_output() {
        // magnitudes chosen so that summation order changes the rounded mean
        let temps = [0.1, 1e16, 0.2, -1e16, 0.3, 0.7, 1.1, 3.3];
        let input: Vec<TemperatureRecord> = temps
            .iter()
            .enumerate()
            .map(|(i, &t)| rec("Oslo", i as i64, t, Season::Winter))
            .collect();
        let reversed: Vec<TemperatureRecord> = input.iter().rev().cloned().collect();

        let forward = analyze(&input).unwrap();
        let backward = analyze(&reversed).unwrap();

        let bits = |v: &[AnnotatedRecord]| -> Vec<(u64, Option<u64>, bool)> {
            v.iter()
                .map(|r| {
                    let std = r.season_std.map(f64::to_bits);
                    (r.season_mean.to_bits(), std, r.is_anomaly)
                })
                .collect()
        };
        assert_eq!(bits(&forward), bits(&backward));
        assert_eq!(forward, backward);
    }
}
