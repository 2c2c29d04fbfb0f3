//! Layered error definitions
//!
//! Categorized by source: config / encode / delivery

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Encoding Errors =====
    /// A record could not be turned into a bulk entry
    #[error("encode error: {message}")]
    Encode { message: String },

    /// A bulk entry could not be parsed back
    #[error("decode error: {message}")]
    Decode { message: String },

    // ===== Delivery Errors =====
    /// Transport-level failure (connect, timeout, body)
    #[error("delivery to '{endpoint}' failed: {message}")]
    Delivery { endpoint: String, message: String },

    /// Endpoint answered with a non-success status
    #[error("delivery to '{endpoint}' rejected with status {status}: {body}")]
    DeliveryStatus {
        endpoint: String,
        status: u16,
        body: String,
    },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create encode error
    pub fn encode(message: impl Into<String>) -> Self {
        Self::Encode {
            message: message.into(),
        }
    }

    /// Create decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create transport-level delivery error
    pub fn delivery(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Delivery {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// True for configuration errors, which are fatal at construction
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::ConfigParse { .. } | Self::ConfigValidation { .. }
        )
    }
}
