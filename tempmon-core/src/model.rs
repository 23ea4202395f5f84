use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::{convert::TryFrom, fmt};

use crate::error::AnalysisError;

/// Calendar bucket assigned to each record by the data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Autumn,
}

impl Season {
    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Winter => "winter",
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Autumn => "autumn",
        }
    }

    /// Canonical display order.
    pub const fn all() -> &'static [Season] {
        &[Season::Winter, Season::Spring, Season::Summer, Season::Autumn]
    }

    /// Meteorological season for a calendar month (1..=12).
    pub fn from_month(month: u32) -> Option<Season> {
        match month {
            12 | 1 | 2 => Some(Season::Winter),
            3..=5 => Some(Season::Spring),
            6..=8 => Some(Season::Summer),
            9..=11 => Some(Season::Autumn),
            _ => None,
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl TryFrom<&str> for Season {
    type Error = AnalysisError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "winter" => Ok(Season::Winter),
            "spring" => Ok(Season::Spring),
            "summer" => Ok(Season::Summer),
            "autumn" => Ok(Season::Autumn),
            _ => Err(AnalysisError::InvalidInput(format!(
                "unknown season '{value}', expected one of: winter, spring, summer, autumn"
            ))),
        }
    }
}

/// One historical daily observation for a city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureRecord {
    pub city: String,
    pub timestamp: NaiveDateTime,
    pub temperature: f64,
    pub season: Season,
}

/// Seasonal statistics for one city.
///
/// `std` is the sample standard deviation and is `None` when fewer than two
/// samples exist for the season.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalProfile {
    pub season: Season,
    pub count: usize,
    pub mean: f64,
    pub std: Option<f64>,
    pub min: f64,
    pub max: f64,
}

impl SeasonalProfile {
    /// Strict two-sigma test. Never fires when `std` is undefined.
    pub fn is_anomalous(&self, temperature: f64) -> bool {
        match self.band() {
            Some((lower, upper)) => temperature < lower || temperature > upper,
            None => false,
        }
    }

    /// Normal range `[mean - 2σ, mean + 2σ]`, if σ is defined.
    pub fn band(&self) -> Option<(f64, f64)> {
        self.std.map(|std| {
            let spread = crate::ANOMALY_SIGMAS * std;
            (self.mean - spread, self.mean + spread)
        })
    }
}

/// Seasonal table for a single city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityProfiles {
    pub city: String,
    pub profiles: Vec<SeasonalProfile>,
}

impl CityProfiles {
    pub fn get(&self, season: Season) -> Option<&SeasonalProfile> {
        self.profiles.iter().find(|p| p.season == season)
    }
}

/// A record augmented with its rolling trend and seasonal verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedRecord {
    pub city: String,
    pub timestamp: NaiveDateTime,
    pub temperature: f64,
    pub season: Season,
    pub rolling_mean: Option<f64>,
    pub season_mean: f64,
    pub season_std: Option<f64>,
    pub is_anomaly: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(mean: f64, std: Option<f64>) -> SeasonalProfile {
        SeasonalProfile {
            season: Season::Winter,
            count: 10,
            mean,
            std,
            min: mean,
            max: mean,
        }
    }

    #[test]
    fn season_as_str_roundtrip() {
        for season in Season::all() {
            let parsed = Season::try_from(season.as_str())
                .expect("roundtrip should succeed");
            assert_eq!(*season, parsed);
        }
    }

    #[test]
    fn season_parse_ignores_case_and_whitespace() {
        assert_eq!(Season::try_from(" Summer ").unwrap(), Season::Summer);
    }

    #[test]
    fn unknown_season_error() {
        let err = Season::try_from("monsoon").unwrap_err();
        assert!(err.to_string().contains("unknown season"));
    }

    #[test]
    fn months_map_to_meteorological_seasons() {
        assert_eq!(Season::from_month(12), Some(Season::Winter));
        assert_eq!(Season::from_month(2), Some(Season::Winter));
        assert_eq!(Season::from_month(3), Some(Season::Spring));
        assert_eq!(Season::from_month(8), Some(Season::Summer));
        assert_eq!(Season::from_month(11), Some(Season::Autumn));
        assert_eq!(Season::from_month(13), None);
    }

    #[test]
    fn band_threshold_is_exclusive() {
        let p = profile(10.0, Some(1.0));
        assert!(!p.is_anomalous(12.0));
        assert!(!p.is_anomalous(8.0));
        assert!(p.is_anomalous(12.001));
        assert!(p.is_anomalous(7.999));
    }

    #[test]
    fn undefined_std_never_flags() {
        let p = profile(10.0, None);
        assert!(p.band().is_none());
        assert!(!p.is_anomalous(1_000.0));
    }
}
