//! Layered configuration loading over figment.
//!
//! Sources merge from lowest to highest priority:
//!
//! 1. Built-in defaults
//! 2. Programmatic overrides via [`ConfigLoader::merge`]
//! 3. Profile-specific file (`steward.{profile}.toml`)
//! 4. Main file (`steward.toml` / `config.toml`)
//! 5. Environment variables (`STEWARD_*`)
//!
//! File loading requires the `toml-config` feature.
//!
//! Environment variables use the `STEWARD_` prefix with `__` between key
//! segments, so `STEWARD_LOGGING__LEVEL=debug` sets `logging.level` and
//! `STEWARD_LIMITS__RNG_UPPER=500` sets `limits.rng_upper`.
//!
//! ```rust,ignore
//! use steward_runtime::config::ConfigLoader;
//!
//! let config = ConfigLoader::new().load()?;
//!
//! let config = ConfigLoader::new()
//!     .file("./config/steward.toml")
//!     .load()?;
//! ```

use std::path::{Path, PathBuf};

use figment::Figment;
#[cfg(feature = "toml-config")]
use figment::providers::{Format, Toml};
use figment::providers::{Env, Serialized};
use tracing::{debug, info, trace, warn};

use super::error::{ConfigError, ConfigResult};
use super::schema::StewardConfig;
use super::validation::validate_config;

/// Names the deployment flavor a config file set targets.
#[derive(Debug, Clone, Default)]
pub enum Profile {
    #[default]
    Development,
    Production,
    /// Anything else, kept as written.
    Custom(String),
}

impl Profile {
    fn parse(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "development" | "dev" => Self::Development,
            "production" | "prod" => Self::Production,
            _ => Self::Custom(name.to_string()),
        }
    }

    /// Reads `STEWARD_PROFILE`, defaulting to development when unset.
    pub fn from_env() -> Self {
        match std::env::var("STEWARD_PROFILE") {
            Ok(name) => Self::parse(&name),
            Err(_) => Self::default(),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Custom(name) => name,
        }
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builder that assembles, extracts, and validates a [`StewardConfig`].
///
/// ```rust,ignore
/// let config = ConfigLoader::new()
///     .with_current_dir()
///     .load()?;
/// ```
pub struct ConfigLoader {
    overlay: Figment,
    profile: Profile,
    roots: Vec<PathBuf>,
    env_overrides: bool,
    explicit_file: Option<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            overlay: Figment::new(),
            profile: Profile::from_env(),
            roots: Vec::new(),
            env_overrides: true,
            explicit_file: None,
        }
    }

    /// Overrides the profile picked up from `STEWARD_PROFILE`.
    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Profile::parse(&profile.into());
        self
    }

    /// Adds a directory to search for config files.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.roots.push(path.as_ref().to_path_buf());
        self
    }

    /// Searches the working directory.
    pub fn with_current_dir(self) -> Self {
        match std::env::current_dir() {
            Ok(cwd) => self.search_path(cwd),
            Err(_) => self,
        }
    }

    /// Searches the per-user config directory (`~/.config/steward` on Linux).
    pub fn with_user_config_dir(self) -> Self {
        match dirs::config_dir() {
            Some(dir) => self.search_path(dir.join("steward")),
            None => self,
        }
    }

    /// Loads exactly this file instead of searching. Missing file is an
    /// error rather than a silent fallback.
    pub fn file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.explicit_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Applies `STEWARD_*` environment variables (the default).
    pub fn with_env(mut self) -> Self {
        self.env_overrides = true;
        self
    }

    /// Ignores environment variables. Useful in tests.
    pub fn without_env(mut self) -> Self {
        self.env_overrides = false;
        self
    }

    /// Layers the given values over the built-in defaults.
    pub fn merge(mut self, config: StewardConfig) -> Self {
        self.overlay = self.overlay.merge(Serialized::defaults(config));
        self
    }

    /// Assembles every source, then extracts and validates the config.
    pub fn load(self) -> ConfigResult<StewardConfig> {
        let profile = self.profile.clone();
        let sources = self.assemble()?;

        let config: StewardConfig = sources
            .extract()
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        validate_config(&config)?;

        debug!(
            profile = %profile,
            logging_level = %config.logging.level,
            "Configuration ready"
        );

        Ok(config)
    }

    fn assemble(mut self) -> ConfigResult<Figment> {
        let defaults = Serialized::defaults(StewardConfig::default());
        let overlay = std::mem::take(&mut self.overlay);
        let mut sources = Figment::from(defaults).merge(overlay);

        sources = match self.explicit_file.take() {
            Some(path) if path.exists() => {
                info!(path = %path.display(), "Loading configuration file");
                Self::layer_file(sources, &path)?
            }
            Some(path) => return Err(ConfigError::FileNotFound(path)),
            None => self.layer_found_files(sources),
        };

        if self.env_overrides {
            trace!("Applying STEWARD_ environment overrides");
            let env = Env::prefixed("STEWARD_")
                .split("__")
                .map(|key| key.as_str().replace("__", ".").into());
            sources = sources.merge(env);
        }

        Ok(sources)
    }

    /// Merges one named file, rejecting extensions no enabled feature covers.
    #[cfg(feature = "toml-config")]
    fn layer_file(sources: Figment, path: &Path) -> ConfigResult<Figment> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Ok(sources.merge(Toml::file(path))),
            other => Err(ConfigError::ParseError(format!(
                "Unsupported configuration file format: .{}",
                other.unwrap_or("")
            ))),
        }
    }

    #[cfg(not(feature = "toml-config"))]
    fn layer_file(_sources: Figment, path: &Path) -> ConfigResult<Figment> {
        Err(ConfigError::ParseError(format!(
            "Configuration file support is disabled (enable the toml-config feature): {}",
            path.display()
        )))
    }

    /// Walks the search roots looking for `steward.toml` or `config.toml`,
    /// layering a `steward.{profile}.toml` variant underneath when present.
    /// The first main file found wins.
    #[cfg(feature = "toml-config")]
    fn layer_found_files(&self, mut sources: Figment) -> Figment {
        for root in self.effective_roots() {
            for stem in ["steward", "config"] {
                let profiled = root.join(format!("{stem}.{}.toml", self.profile.as_str()));
                if profiled.exists() {
                    debug!(path = %profiled.display(), "Loading profile-specific config");
                    sources = sources.merge(Toml::file(&profiled));
                }

                let main = root.join(format!("{stem}.toml"));
                if main.exists() {
                    info!(path = %main.display(), "Loading configuration file");
                    return sources.merge(Toml::file(&main));
                }
            }
        }

        warn!("No configuration file found, using defaults");
        sources
    }

    #[cfg(not(feature = "toml-config"))]
    fn layer_found_files(&self, sources: Figment) -> Figment {
        if self.roots.is_empty() {
            warn!("Configuration file support is disabled, using defaults");
        } else {
            warn!("Configuration file support is disabled, ignoring search paths");
        }
        sources
    }

    /// Explicit search roots, or the working directory plus the per-user
    /// config directory when none were given.
    #[cfg(feature = "toml-config")]
    fn effective_roots(&self) -> Vec<PathBuf> {
        if !self.roots.is_empty() {
            return self.roots.clone();
        }
        let mut roots = Vec::new();
        if let Ok(cwd) = std::env::current_dir() {
            roots.push(cwd);
        }
        if let Some(dir) = dirs::config_dir() {
            roots.push(dir.join("steward"));
        }
        roots
    }
}

/// Loads configuration from the default search locations.
pub fn load_config() -> ConfigResult<StewardConfig> {
    ConfigLoader::new().load()
}

/// Loads configuration from a specific file.
pub fn load_config_from_file<P: AsRef<Path>>(path: P) -> ConfigResult<StewardConfig> {
    ConfigLoader::new().file(path).load()
}

// =============================================================================
// Tests
// =============================================================================
