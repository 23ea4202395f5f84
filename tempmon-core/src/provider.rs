use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::{fmt::Debug, time::Duration};
use thiserror::Error;

use crate::{Config, provider::openweather::OpenWeatherProvider};

pub mod openweather;

/// A single live temperature observation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentReading {
    pub location_name: String,
    pub temperature_c: f64,
    pub observation_time: DateTime<Utc>,
    /// HTTP status of the upstream response.
    pub status: u16,
}

/// Failure to obtain a live reading. Historical analysis is unaffected.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("weather service answered with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("weather request failed: {0}")]
    Transport(String),

    #[error("unexpected weather response: {0}")]
    Parse(String),
}

impl FetchError {
    /// HTTP-style status for the failure; transport errors report 500.
    pub fn status_code(&self) -> u16 {
        match self {
            FetchError::Status { status, .. } => *status,
            FetchError::Transport(_) | FetchError::Parse(_) => 500,
        }
    }
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current(&self, city: &str) -> Result<CurrentReading, FetchError>;
}

/// Construct the live weather provider from config.
///
/// `api_key` overrides the key stored in the config file.
pub fn provider_from_config(
    config: &Config,
    api_key: Option<&str>,
) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let api_key = api_key.or_else(|| config.api_key()).ok_or_else(|| {
        anyhow::anyhow!(
            "No OpenWeather API key configured.\n\
                 Hint: run `tempmon configure` or pass --api-key / set OPENWEATHER_API_KEY."
        )
    })?;

    let timeout = Duration::from_secs(config.request_timeout_secs);
    let provider = OpenWeatherProvider::new(api_key.to_owned(), timeout)?;

    Ok(Box::new(provider))
}
