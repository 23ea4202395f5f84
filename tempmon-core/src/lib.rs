//! Core library for the `tempmon` CLI.
//!
//! This crate defines:
//! - Domain models for historical temperature records and their annotations
//! - CSV loading of the historical dataset
//! - Seasonal statistics, rolling trends and anomaly detection per city
//! - Comparison of a live reading against the seasonal norm
//! - Configuration & credentials for the live weather provider
//!
//! It is used by `tempmon-cli`, but can also be reused by other binaries or services.

pub mod analysis;
pub mod config;
pub mod current;
pub mod dataset;
pub mod error;
pub mod model;
pub mod provider;

pub use analysis::{Aggregator, Strategy, analyze, seasonal_profiles};
pub use config::{AnalysisConfig, Config, ProviderConfig};
pub use current::{CurrentAssessment, assess_current, season_for};
pub use dataset::DatasetError;
pub use error::AnalysisError;
pub use model::{AnnotatedRecord, CityProfiles, Season, SeasonalProfile, TemperatureRecord};
pub use provider::{CurrentReading, FetchError, WeatherProvider, provider_from_config};

/// Records in the centered rolling window.
pub const ROLLING_WINDOW: usize = 30;

/// Half-width of the normal band, in sample standard deviations.
pub const ANOMALY_SIGMAS: f64 = 2.0;
