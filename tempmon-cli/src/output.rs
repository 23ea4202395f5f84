//! Human-friendly and JSON rendering of analysis results.

use anyhow::Result;
use tempmon_core::{AnnotatedRecord, CityProfiles, CurrentAssessment, CurrentReading, Season};

use crate::cli::OutputFormat;

pub fn print_profiles(tables: &[CityProfiles], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(tables)?),
        OutputFormat::Table => {
            for table in tables {
                println!("{}", table.city);
                println!(
                    "  {:<8} {:>6} {:>9} {:>9} {:>9} {:>9}",
                    "season", "days", "mean °C", "std", "min °C", "max °C"
                );
                for p in &table.profiles {
                    println!(
                        "  {:<8} {:>6} {:>9.2} {:>9} {:>9.2} {:>9.2}",
                        p.season,
                        p.count,
                        p.mean,
                        fmt_opt(p.std),
                        p.min,
                        p.max
                    );
                }
                println!();
            }
        }
    }
    Ok(())
}

pub fn print_records(records: &[AnnotatedRecord], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(records)?),
        OutputFormat::Table => {
            println!(
                "{:<16} {:<19} {:>8} {:<7} {:>9} {:>9}",
                "city", "timestamp", "temp", "season", "trend", "anomaly"
            );
            for r in records {
                println!(
                    "{:<16} {:<19} {:>8.2} {:<7} {:>9} {:>9}",
                    r.city,
                    r.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
                    r.temperature,
                    r.season,
                    fmt_opt(r.rolling_mean),
                    if r.is_anomaly { "yes" } else { "" }
                );
            }
            let anomalies = records.iter().filter(|r| r.is_anomaly).count();
            println!("\n{} records, {} anomalies", records.len(), anomalies);
        }
    }
    Ok(())
}

pub fn print_current(
    reading: &CurrentReading,
    season: Season,
    assessment: Option<&CurrentAssessment>,
    format: OutputFormat,
) -> Result<()> {
    if let OutputFormat::Json = format {
        let value = serde_json::json!({
            "reading": reading,
            "season": season,
            "assessment": assessment,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!(
        "Current temperature in {}: {:.1} °C",
        reading.location_name, reading.temperature_c
    );

    let Some(a) = assessment else {
        println!("No historical data for {season}; cannot judge this reading.");
        return Ok(());
    };

    match a.season_std {
        Some(std) => println!(
            "Norm for {season}: {:.2} °C (± {:.2} °C)",
            a.season_mean,
            2.0 * std
        ),
        None => println!(
            "Norm for {season}: {:.2} °C (spread undefined)",
            a.season_mean
        ),
    }

    if a.is_anomaly {
        println!(
            "Warning: {:.1} °C is anomalous for {season}.",
            a.temperature
        );
    } else {
        println!("{:.1} °C is within the seasonal norm.", a.temperature);
    }
    Ok(())
}

fn fmt_opt(value: Option<f64>) -> String {
    value
        .map(|v| format!("{v:.2}"))
        .unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_values_render_as_dash() {
        assert_eq!(fmt_opt(None), "-");
        assert_eq!(fmt_opt(Some(1.234)), "1.23");
    }
}
