use anyhow::{Context, Result, bail};
use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tempmon_core::{
    Aggregator, Config, Strategy, TemperatureRecord, assess_current, dataset, provider_from_config,
    season_for,
};
use tracing::{debug, info, warn};

use crate::output;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "tempmon",
    version,
    about = "Historical temperature statistics and anomaly monitor"
)]
pub struct Cli {
    /// Enable debug logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key used for live readings.
    Configure,

    /// List the cities present in a dataset.
    Cities {
        /// CSV with columns city,timestamp,temperature,season.
        dataset: PathBuf,
    },

    /// Show seasonal statistics per city.
    Stats {
        dataset: PathBuf,

        /// Restrict output to one city.
        #[arg(long)]
        city: Option<String>,

        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Annotate records with rolling trend and anomaly flags.
    Analyze {
        dataset: PathBuf,

        #[arg(long)]
        city: Option<String>,

        /// Only print records flagged as anomalous.
        #[arg(long)]
        anomalies_only: bool,

        /// Analyze cities one after another instead of in parallel.
        #[arg(long)]
        sequential: bool,

        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Compare the live temperature of a city with its seasonal norm.
    Current {
        dataset: PathBuf,

        #[arg(long)]
        city: String,

        /// OpenWeather API key; overrides the configured one.
        #[arg(long, env = "OPENWEATHER_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
}

impl Cli {
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    pub async fn run(self) -> Result<()> {
        let config = Config::load()?;
        debug!(
            analysis = ?config.analysis,
            timeout = config.request_timeout_secs,
            "loaded configuration"
        );

        match self.command {
            Command::Configure => configure(config),
            Command::Cities { dataset: path } => {
                let records = load(&path)?;
                for city in dataset::cities(&records) {
                    println!("{city}");
                }
                Ok(())
            }
            Command::Stats {
                dataset,
                city,
                format,
            } => {
                let records = select_city(load(&dataset)?, city.as_deref())?;
                let tables = Aggregator::new(config.strategy()).profiles(&records)?;
                output::print_profiles(&tables, format)
            }
            Command::Analyze {
                dataset,
                city,
                anomalies_only,
                sequential,
                format,
            } => {
                let records = select_city(load(&dataset)?, city.as_deref())?;
                let strategy = if sequential {
                    Strategy::Sequential
                } else {
                    config.strategy()
                };

                let mut annotated = Aggregator::new(strategy).aggregate(&records)?;
                if anomalies_only {
                    annotated.retain(|r| r.is_anomaly);
                }
                output::print_records(&annotated, format)
            }
            Command::Current {
                dataset,
                city,
                api_key,
                format,
            } => {
                current(&config, &dataset, &city, api_key.as_deref(), format).await
            }
        }
    }
}

fn configure(mut config: Config) -> Result<()> {
    let api_key = inquire::Password::new("OpenWeather API key:")
        .without_confirmation()
        .with_display_mode(inquire::PasswordDisplayMode::Masked)
        .prompt()
        .context("Failed to read API key")?;

    if api_key.trim().is_empty() {
        bail!("API key must not be empty");
    }

    config.set_api_key(api_key.trim().to_string());
    let path = config.save()?;
    println!("Saved configuration to {}", path.display());
    Ok(())
}

async fn current(
    config: &Config,
    dataset: &Path,
    city: &str,
    api_key: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let records = select_city(load(dataset)?, Some(city))?;

    // historical analysis first: it stays valid whatever the live lookup does
    let tables = Aggregator::new(config.strategy()).profiles(&records)?;
    let Some(profiles) = tables.into_iter().next() else {
        bail!("No history for '{city}'");
    };

    let provider = provider_from_config(config, api_key)?;
    let reading = match provider.current(city).await {
        Ok(reading) => reading,
        Err(e) => {
            warn!(city, status = e.status_code(), "live weather unavailable");
            bail!(
                "Could not fetch current weather for '{city}' (status {}): {e}",
                e.status_code()
            );
        }
    };

    let season = season_for(Local::now().date_naive());
    info!(city, %season, temperature = reading.temperature_c, "received live reading");

    let assessment = assess_current(&profiles, season, reading.temperature_c);
    output::print_current(&reading, season, assessment.as_ref(), format)
}

fn load(path: &Path) -> Result<Vec<TemperatureRecord>> {
    let records = dataset::load_csv(path)?;
    info!(path = %path.display(), records = records.len(), "dataset loaded");
    Ok(records)
}

fn select_city(
    records: Vec<TemperatureRecord>,
    city: Option<&str>,
) -> Result<Vec<TemperatureRecord>> {
    let Some(city) = city else {
        return Ok(records);
    };

    let selected: Vec<TemperatureRecord> =
        records.into_iter().filter(|r| r.city == city).collect();
    if selected.is_empty() {
        bail!("City '{city}' not found in dataset");
    }
    Ok(selected)
}
