//! Configuration validation utilities.

use super::error::{ConfigError, ConfigResult};
use super::schema::{LimitsConfig, LoggingConfig, StewardConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &StewardConfig) -> ConfigResult<()> {
    validate_identity_config(config)?;
    validate_limits_config(&config.limits)?;
    validate_logging_config(&config.logging)?;

    if config.answers.is_empty() {
        return Err(ConfigError::validation(
            "Answer phrase list cannot be empty",
        ));
    }

    if config.default_playlist.id.is_empty() {
        return Err(ConfigError::missing_field("default_playlist.id"));
    }
    if config.default_playlist.owner.is_empty() {
        return Err(ConfigError::missing_field("default_playlist.owner"));
    }

    Ok(())
}

/// Validates bot and owner identity settings.
fn validate_identity_config(config: &StewardConfig) -> ConfigResult<()> {
    if config.identity.id.is_empty() {
        return Err(ConfigError::missing_field("identity.id"));
    }

    if config.identity.trigger.is_empty() {
        return Err(ConfigError::missing_field("identity.trigger"));
    }
    if config.identity.trigger.chars().any(char::is_whitespace) {
        return Err(ConfigError::validation(
            "Trigger word cannot contain whitespace",
        ));
    }

    if config.owner.thread.is_empty() {
        return Err(ConfigError::missing_field("owner.thread"));
    }

    Ok(())
}

/// Validates numeric tunables.
fn validate_limits_config(limits: &LimitsConfig) -> ConfigResult<()> {
    if limits.music_search_limit == 0 {
        return Err(ConfigError::validation(
            "Music search limit must be at least 1",
        ));
    }

    if limits.wakeup_repeats == 0 {
        return Err(ConfigError::validation(
            "Wake-up repeat count must be at least 1",
        ));
    }

    if limits.query_timeout_ms == 0 {
        return Err(ConfigError::validation(
            "Query timeout must be greater than 0",
        ));
    }

    if limits.rng_lower > limits.rng_upper {
        return Err(ConfigError::validation(
            "RNG lower bound cannot exceed the upper bound",
        ));
    }

    Ok(())
}

/// Validates logging settings.
fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_log_levels.contains(&logging.level.to_lowercase().as_str()) {
        return Err(ConfigError::validation(format!(
            "Invalid log level: {}. Valid values are: {:?}",
            logging.level, valid_log_levels
        )));
    }

    for (module, level) in &logging.filters {
        if !valid_log_levels.contains(&level.to_lowercase().as_str()) {
            return Err(ConfigError::validation(format!(
                "Invalid log level for module {module}: {level}"
            )));
        }
    }

    Ok(())
}
