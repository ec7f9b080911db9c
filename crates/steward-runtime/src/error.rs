//! Runtime error types.

use steward_core::TableError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can stop the engine from starting.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The command roster failed to register or bind.
    #[error("Failed to install command roster: {0}")]
    Roster(#[from] TableError),

    /// Configuration loading or validation failed.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Commands were registered but never bound to a handler.
    #[error("Commands registered without handlers: {keys:?}")]
    UnboundCommands { keys: Vec<String> },
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
