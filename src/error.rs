//! Error types for Zen Analytics

use crate::schema::ValidationError;
use thiserror::Error;

/// Errors that can occur while loading, validating or exporting sessions
#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("Failed to parse session payload: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Invalid session record: {0}")]
    Validation(#[from] ValidationError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Export error: {0}")]
    ExportError(String),

    #[error("Session source error: {0}")]
    SourceError(String),

    #[error("Stress estimation failed: {0}")]
    EstimatorError(String),
}
