//! CSV loading of historical temperature records.
//!
//! Expected header: `city,timestamp,temperature,season`. Extra columns are
//! ignored; every required field must be present on every row.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use std::{collections::BTreeSet, fs::File, io::Read, path::Path};
use thiserror::Error;
use tracing::debug;

use crate::model::{Season, TemperatureRecord};

const REQUIRED_COLUMNS: [&str; 4] = ["city", "timestamp", "temperature", "season"];

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to open dataset {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("row {row}: {message}")]
    InvalidRow { row: usize, message: String },
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    city: Option<String>,
    timestamp: Option<String>,
    temperature: Option<String>,
    season: Option<String>,
}

/// Load records from a CSV file on disk.
pub fn load_csv(path: &Path) -> Result<Vec<TemperatureRecord>, DatasetError> {
    let file = File::open(path).map_err(|source| DatasetError::Open {
        path: path.display().to_string(),
        source,
    })?;
    let records = from_reader(file)?;
    debug!(path = %path.display(), records = records.len(), "loaded dataset");
    Ok(records)
}

/// Parse records from any CSV source.
pub fn from_reader<R: Read>(reader: R) -> Result<Vec<TemperatureRecord>, DatasetError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(DatasetError::MissingColumn(column));
        }
    }

    reader
        .deserialize::<CsvRow>()
        .enumerate()
        .map(|(idx, row)| {
            let row = row?;
            to_record(row).map_err(|message| DatasetError::InvalidRow {
                row: idx + 1,
                message,
            })
        })
        .collect()
}

/// Distinct city names, sorted alphabetically.
pub fn cities(records: &[TemperatureRecord]) -> Vec<String> {
    records
        .iter()
        .map(|r| r.city.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn to_record(row: CsvRow) -> Result<TemperatureRecord, String> {
    let city = row.city.filter(|c| !c.is_empty()).ok_or("missing city")?;

    let timestamp = row.timestamp.ok_or("missing timestamp")?;
    let timestamp = parse_timestamp(&timestamp)
        .ok_or_else(|| format!("invalid timestamp '{timestamp}'"))?;

    let temperature = row.temperature.ok_or("missing temperature")?;
    let temperature: f64 = temperature
        .parse()
        .map_err(|_| format!("invalid temperature '{temperature}'"))?;
    if !temperature.is_finite() {
        return Err("missing temperature".into());
    }

    let season = row.season.ok_or("missing season")?;
    let season = Season::try_from(season.as_str()).map_err(|e| e.to_string())?;

    Ok(TemperatureRecord {
        city,
        timestamp,
        temperature,
        season,
    })
}

fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    const DATETIME_FORMATS: [&str; 3] = [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
