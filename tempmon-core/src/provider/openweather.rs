use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::{CurrentReading, FetchError, WeatherProvider};

const CURRENT_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String, timeout: Duration) -> anyhow::Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { api_key, http })
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    dt: i64,
    main: OwMain,
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current(&self, city: &str) -> Result<CurrentReading, FetchError> {
        debug!(city, "requesting current weather from OpenWeather");

        let res = self
            .http
            .get(CURRENT_URL)
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await
            .map_err(|e| {
                warn!(city, error = %e, "OpenWeather request failed");
                FetchError::Transport(e.to_string())
            })?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        if !status.is_success() {
            warn!(
                city,
                status = status.as_u16(),
                "OpenWeather returned an error status"
            );
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        parse_current(&body, status.as_u16())
    }
}

fn parse_current(body: &str, status: u16) -> Result<CurrentReading, FetchError> {
    let parsed: OwCurrentResponse =
        serde_json::from_str(body).map_err(|e| FetchError::Parse(e.to_string()))?;

    let observation_time =
        DateTime::<Utc>::from_timestamp(parsed.dt, 0).unwrap_or_else(Utc::now);

    Ok(CurrentReading {
        location_name: parsed.name,
        temperature_c: parsed.main.temp,
        observation_time,
        status,
    })
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_current_weather_payload() {
        let body = r#"{
            "name": "London",
            "dt": 1700000000,
            "main": {"temp": 7.42, "feels_like": 5.1, "humidity": 81},
            "weather": [{"description": "light rain"}]
        }"#;

        let reading = parse_current(body, 200).unwrap();
        assert_eq!(reading.location_name, "London");
        assert_eq!(reading.temperature_c, 7.42);
        assert_eq!(reading.observation_time.timestamp(), 1_700_000_000);
        assert_eq!(reading.status, 200);
    }

    #[test]
    fn malformed_payload_is_a_parse_error() {
        let err = parse_current(r#"{"cod": 200}"#, 200).unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(500);
        assert_eq!(truncate_body(&body).len(), 203);
        assert_eq!(truncate_body("short"), "short");
    }
}
