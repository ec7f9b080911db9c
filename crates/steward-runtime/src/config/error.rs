//! Failures surfaced while loading or validating configuration.

use std::path::PathBuf;
use thiserror::Error;

/// What can go wrong between reading config sources and handing the engine
/// a validated [`StewardConfig`](super::StewardConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An explicitly requested file does not exist.
    #[error("Config file does not exist: {0}")]
    FileNotFound(PathBuf),

    /// A source could not be read or extracted into the schema.
    #[error("Could not parse configuration: {0}")]
    ParseError(String),

    /// A value is present but out of range or inconsistent.
    #[error("Configuration failed validation: {message}")]
    ValidationError { message: String },

    /// A required value is unset or empty.
    #[error("Required config field not set: {field}")]
    MissingField { field: String },
}

impl ConfigError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;
