//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for spreadcheck.
#[derive(Debug, thiserror::Error)]
pub enum SpreadError {
    #[error("data unavailable: {path}")]
    DataUnavailable { path: String },

    #[error("{source_name} is missing required column '{column}'")]
    SchemaMismatch { source_name: String, column: String },

    #[error("{source_name} contains duplicate trade_date {date}")]
    DuplicateDate { source_name: String, date: NaiveDate },

    #[error("parse error in {source_name}: {reason}")]
    Parse { source_name: String, reason: String },

    #[error("degenerate series: {reason}")]
    DegenerateSeries { reason: String },

    #[error("insufficient observations: have {observations}, need {required}")]
    InsufficientObservations { observations: usize, required: usize },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&SpreadError> for std::process::ExitCode {
    fn from(err: &SpreadError) -> Self {
        let code: u8 = match err {
            SpreadError::Io(_) | SpreadError::Csv(_) => 1,
            SpreadError::ConfigParse { .. } | SpreadError::ConfigInvalid { .. } => 2,
            SpreadError::DataUnavailable { .. } => 3,
            SpreadError::SchemaMismatch { .. }
            | SpreadError::DuplicateDate { .. }
            | SpreadError::Parse { .. } => 4,
            SpreadError::DegenerateSeries { .. }
            | SpreadError::InsufficientObservations { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
