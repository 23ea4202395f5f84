//! Multi-city aggregation.
//!
//! The dataset is split by city and each partition is analyzed on its own.
//! Partitions share nothing, so the parallel strategy hands them to the rayon
//! pool and joins before returning.

use rayon::prelude::*;
use std::collections::HashMap;
use tracing::info;

use crate::{
    analysis::{analyze, seasonal::seasonal_profiles},
    error::{AnalysisError, Result},
    model::{AnnotatedRecord, CityProfiles, TemperatureRecord},
};

type CityGroup = (String, Vec<TemperatureRecord>);

/// How city partitions are scheduled. Has no effect on the output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Strategy {
    Sequential,
    #[default]
    Parallel,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Aggregator {
    strategy: Strategy,
}

impl Aggregator {
    pub fn new(strategy: Strategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Analyze every city and concatenate the results.
    ///
    /// Cities appear in order of first occurrence in `records`. Any invalid
    /// city fails the whole call.
    pub fn aggregate(&self, records: &[TemperatureRecord]) -> Result<Vec<AnnotatedRecord>> {
        let groups = partition_by_city(records)?;

        let per_city: Vec<Vec<AnnotatedRecord>> = match self.strategy {
            Strategy::Sequential => groups
                .iter()
                .map(|(_, group)| analyze(group))
                .collect::<Result<_>>()?,
            Strategy::Parallel => groups
                .par_iter()
                .map(|(_, group)| analyze(group))
                .collect::<Result<_>>()?,
        };

        let annotated: Vec<AnnotatedRecord> = per_city.into_iter().flatten().collect();
        info!(
            cities = groups.len(),
            records = annotated.len(),
            anomalies = annotated.iter().filter(|r| r.is_anomaly).count(),
            strategy = ?self.strategy,
            "aggregated dataset"
        );

        Ok(annotated)
    }

    /// Seasonal profile table for every city.
    pub fn profiles(&self, records: &[TemperatureRecord]) -> Result<Vec<CityProfiles>> {
        let groups = partition_by_city(records)?;

        let build = |(city, group): &CityGroup| -> Result<CityProfiles> {
            if let Some(bad) = group.iter().find(|r| !r.temperature.is_finite()) {
                return Err(AnalysisError::InvalidInput(format!(
                    "record for '{city}' at {} has no usable temperature",
                    bad.timestamp
                )));
            }
            Ok(CityProfiles {
                city: city.clone(),
                profiles: seasonal_profiles(group),
            })
        };

        match self.strategy {
            Strategy::Sequential => groups.iter().map(build).collect(),
            Strategy::Parallel => groups.par_iter().map(build).collect(),
        }
    }
}

/// Split records by city, keeping first-occurrence order of cities and input
/// order within each city.
fn partition_by_city(records: &[TemperatureRecord]) -> Result<Vec<CityGroup>> {
    if records.is_empty() {
        return Err(AnalysisError::InvalidInput("dataset is empty".into()));
    }

    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<CityGroup> = Vec::new();
    for record in records {
        if record.city.trim().is_empty() {
            return Err(AnalysisError::InvalidInput(format!(
                "record at {} has no city",
                record.timestamp
            )));
        }

        let slot = *index.entry(record.city.as_str()).or_insert_with(|| {
            groups.push((record.city.clone(), Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(record.clone());
    }

    Ok(groups)
}
