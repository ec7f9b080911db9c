//! Configuration module for the Steward runtime.
//!
//! Layers programmatic defaults, TOML files (behind the `toml-config`
//! feature), and `STEWARD_`-prefixed environment variables through figment,
//! then validates the result before the engine sees it.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{
    IdentityConfig, LimitsConfig, LogFormat, LogOutput, LoggingConfig, OwnerConfig,
    PlaylistConfig, StewardConfig,
};
pub use validation::validate_config;
