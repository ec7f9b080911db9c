//! # Steward
//!
//! A command-driven group-chat assistant with pluggable platform services.
//!
//! ## Overview
//!
//! Steward turns free-form chat messages into commands: a compiled pattern
//! table matches each message against every registered trigger, and a
//! dispatcher runs all matched handlers concurrently behind admin and
//! attachment gates, recording usage as it goes.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐     ┌─────────────┐     ┌───────────────────────────────────────┐
//! │ Platform │────▶│   Matcher   │────▶│ Handler "help"   (own task, gates)    │──▶ services
//! │ listener │     │ + exclusion │────▶│ Handler "score"  (own task, gates)    │──▶ services
//! └──────────┘     └─────────────┘────▶│ Handler ...      (own task, gates)    │──▶ services
//!                                      └───────────────────────────────────────┘
//! ```
//!
//! - **Engine**: Owns the table, matcher, dispatcher, and usage log; one
//!   `handle_message` call per incoming message
//! - **Commands**: The built-in roster of 35 handlers, installed in one call
//! - **Services**: Capability traits the platform supplies (messenger,
//!   platform controls, group store, search, weather, music)
//! - **Usage log**: Append-only event store behind windowed statistics
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use steward::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Capability bundle wired to the real platform
//!     let services = my_platform_services();
//!
//!     // Loads steward.toml (plus STEWARD_* overrides), initializes
//!     // logging, and installs the full roster
//!     let store = Arc::new(MemoryUsageStore::new());
//!     let (engine, _config) = Engine::from_env(store, services)?;
//!
//!     // One call per message delivered by the platform listener
//!     while let Some(ctx) = next_message().await {
//!         let report = engine.handle_message(&ctx).await;
//!         for (command, outcome) in report.iter() {
//!             tracing::debug!(%command, ?outcome, "dispatched");
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config` (default): TOML configuration files (`steward.toml`)
//! - `json-log`: newline-delimited JSON log output

pub use steward_commands as commands;
pub use steward_core as core;
pub use steward_runtime as runtime;

/// Everything an embedding typically imports, in one line.
///
/// ```rust,ignore
/// use steward::prelude::*;
/// ```
pub mod prelude {
    // Engine - main entry point
    pub use steward_runtime::{ConfigLoader, Engine, StewardConfig};

    // Roster settings and one-call installation
    pub use steward_commands::{Roster, RosterSettings, install};

    // Message flow types
    pub use steward_core::{
        Attachment, DispatchOutcome, DispatchReport, IncomingMessage, MessageContext,
        OutboundMessage,
    };

    // Capability traits for platform integrations
    pub use steward_core::{
        Capabilities, GroupStore, Messenger, MusicApi, PlatformHandle, SearchApi, WeatherApi,
    };

    // Usage storage
    pub use steward_core::{MemoryUsageStore, UsageStore};

    // Group state and handler authoring
    pub use steward_core::{CommandError, CommandHandler, DispatchContext, GroupInfo};
}
