//! Engine error types

use contracts::ContractError;
use dispatcher::DispatcherError;
use thiserror::Error;

/// Errors raised while starting the engine
///
/// Runtime failures (encoding, delivery) never surface here; they are
/// logged and the record or batch is dropped.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Invalid or missing setting
    #[error("configuration error: {0}")]
    Config(#[from] ContractError),

    /// Worker pool or transport could not be created
    #[error("dispatcher error: {0}")]
    Dispatcher(#[from] DispatcherError),
}

/// Engine Result alias
pub type Result<T> = std::result::Result<T, EngineError>;
