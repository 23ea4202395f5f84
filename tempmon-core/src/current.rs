use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::model::{CityProfiles, Season};

/// Verdict for a single live reading against the historical seasonal norm.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentAssessment {
    pub season: Season,
    pub temperature: f64,
    pub season_mean: f64,
    pub season_std: Option<f64>,
    /// `[mean - 2σ, mean + 2σ]`, absent when σ is undefined.
    pub normal_range: Option<(f64, f64)>,
    pub is_anomaly: bool,
}

/// Season a given calendar date falls in.
pub fn season_for(date: NaiveDate) -> Season {
    match Season::from_month(date.month()) {
        Some(season) => season,
        // month() is always 1..=12
        None => Season::Winter,
    }
}

/// Compare `temperature` with the city's history for `season`.
///
/// Returns `None` when the city has no records in that season.
pub fn assess_current(
    profiles: &CityProfiles,
    season: Season,
    temperature: f64,
) -> Option<CurrentAssessment> {
    let profile = profiles.get(season)?;

    Some(CurrentAssessment {
        season,
        temperature,
        season_mean: profile.mean,
        season_std: profile.std,
        normal_range: profile.band(),
        is_anomaly: profile.is_anomalous(temperature),
    })
}
