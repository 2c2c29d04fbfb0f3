//! Error types for CLI operations.

use batch_engine::EngineError;
use contracts::ContractError;
use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Configuration could not be loaded or is invalid
    #[error("Failed to load configuration: {0}")]
    Config(#[from] ContractError),

    /// Engine failed to start
    #[error("Failed to start bulk output: {0}")]
    Engine(#[from] EngineError),

    /// Input stream could not be opened or read
    #[error("Failed to read input {source_name}: {source}")]
    Input {
        source_name: String,
        #[source]
        source: std::io::Error,
    },
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn input(source_name: impl Into<String>, source: std::io::Error) -> Self {
        Self::Input {
            source_name: source_name.into(),
            source,
        }
    }
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
