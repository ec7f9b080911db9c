//! Steward Runtime - Orchestration layer for the Steward chat assistant.
//!
//! Everything between a deployment and the dispatch core lives here.
//! [`ConfigLoader`] turns files and environment variables into a validated
//! [`StewardConfig`], and [`Engine`] wires the full command roster behind a
//! single `handle_message` call. Logging setup over `tracing-subscriber`
//! comes along through [`LoggingBuilder`].
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use steward_core::MemoryUsageStore;
//! use steward_runtime::Engine;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Loads steward.toml (plus STEWARD_* overrides), initializes
//!     // logging, and wires the full command roster
//!     let store = Arc::new(MemoryUsageStore::new());
//!     let (engine, _config) = Engine::from_env(store, services)?;
//!
//!     // One call per incoming message
//!     let report = engine.handle_message(&ctx).await;
//!     for (command, outcome) in report.iter() {
//!         println!("{command}: {outcome:?}");
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Configuration
//!
//! Settings layer from lowest to highest priority: built-in defaults, a
//! profile-specific file (`steward.{profile}.toml`), the main file
//! (`steward.toml` / `config.toml`), then `STEWARD_`-prefixed environment
//! variables. File loading requires the `toml-config` feature.

pub mod config;
pub mod engine;
pub mod error;
pub mod logging;

pub use config::{
    ConfigError, ConfigLoader, ConfigResult, LoggingConfig, StewardConfig, validate_config,
};
pub use engine::Engine;
pub use error::{EngineError, EngineResult};
pub use logging::{LoggingBuilder, SpanEvents};

// Downstream crates log through the same tracing version the runtime was
// built with.
pub use tracing;
pub use tracing_subscriber;

/// One-line import for code that logs.
///
/// Pulls in the level macros (`trace!` through `error!`), the `instrument`
/// attribute, and `Level`.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
