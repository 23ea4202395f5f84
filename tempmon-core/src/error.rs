use thiserror::Error;

/// Failures of the analysis core. Undefined statistics are not errors.
#[derive(Debug, Error, PartialEq)]
pub enum AnalysisError {
    /// Malformed, missing or mixed-city input; nothing is computed.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T, E = AnalysisError> = std::result::Result<T, E>;
