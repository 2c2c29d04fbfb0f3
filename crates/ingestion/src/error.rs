//! Ingestion error types

use contracts::ContractError;
use thiserror::Error;

/// Ingestion errors
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Index pattern could not be parsed
    #[error("invalid index pattern '{pattern}': {message}")]
    InvalidPattern {
        /// Offending pattern
        pattern: String,
        /// Error message
        message: String,
    },

    /// Referenced field is absent from the record
    #[error("field '{field}' not found in record")]
    MissingField {
        /// Dotted field path
        field: String,
    },

    /// Referenced field is an object, array or null
    #[error("field '{field}' is not a scalar value")]
    NonScalarField {
        /// Dotted field path
        field: String,
    },

    /// Date placeholder could not be formatted
    #[error("failed to format date with '{format}'")]
    DateFormat {
        /// strftime format
        format: String,
    },

    /// JSON serialization failed
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<IngestionError> for ContractError {
    fn from(err: IngestionError) -> Self {
        match err {
            IngestionError::InvalidPattern { .. } => {
                ContractError::config_validation("index", err.to_string())
            }
            other => ContractError::encode(other.to_string()),
        }
    }
}

/// Ingestion Result alias
pub type Result<T> = std::result::Result<T, IngestionError>;
