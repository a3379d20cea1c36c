use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VitalSimError {
    #[error("Unknown scenario: '{0}'")]
    UnknownScenario(String),

    #[error("Subject '{0}' is not registered")]
    SubjectNotFound(String),

    #[error("Invalid profile input: {0}")]
    InvalidProfileInput(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    // Only ever seen inside classifier implementations; the fallback wrapper
    // turns it into a rule-based verdict.
    #[error("Safety classifier unavailable: {0}")]
    ClassifierUnavailable(String),

    #[error("Failed to append to history file '{0}': {1}")]
    HistoryWrite(PathBuf, #[source] std::io::Error),

    #[error("Failed to read history file '{0}': {1}")]
    HistoryRead(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParsing(#[from] serde_json::Error),

    #[error("Failed to process CSV file '{0}': {1}")]
    CsvError(String, #[source] csv::Error),

    #[error("I/O error for file '{0}': {1}")]
    FileIO(String, #[source] std::io::Error),
}

pub type Result<T, E = VitalSimError> = std::result::Result<T, E>;
