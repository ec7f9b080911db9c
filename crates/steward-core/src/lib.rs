//! # Steward Core
//!
//! The command-dispatch engine of the Steward group-chat bot.
//!
//! This crate provides the fundamental building blocks for turning an incoming
//! chat message into zero or more executed commands: the pattern table, the
//! matcher, the dispatcher, and the usage-statistics log.
//!
//! ## Layout
//!
//! Three modules, stacked:
//!
//! * [`foundation`] holds the data model every other piece consumes: the
//!   per-message input ([`MessageContext`]), the per-handler snapshot
//!   ([`DispatchContext`]), the group model ([`GroupInfo`]), and the error
//!   taxonomy ([`TableError`], [`StatsError`], [`CommandError`]).
//! * [`framework`] is the machinery itself. [`PatternTable`] holds the
//!   registered commands, [`Matcher`] evaluates triggers with mutual
//!   exclusion, [`Dispatcher`] runs gated handlers concurrently, and
//!   [`UsageLog`] keeps the append-only usage record behind [`UsageStore`].
//! * [`integration`] defines the traits handlers reach the outside world
//!   through: [`Messenger`] for outbound messages, [`PlatformHandle`] for
//!   thread mutation, [`GroupStore`] for persisted group properties, and
//!   the content lookups ([`SearchApi`], [`WeatherApi`], [`MusicApi`]).
//!
//! ## Message Flow
//!
//! Every message takes the same path through the core:
//!
//! ```text
//! ┌───────────┐     ┌─────────┐     ┌────────────┐     ┌───────────┐
//! │  Message  │────▶│ Matcher │────▶│ Dispatcher │────▶│  Handler  │
//! │  (text)   │     │ (table) │     │  (gates)   │────▶│  Handler  │
//! └───────────┘     └─────────┘     └─────┬──────┘     └───────────┘
//!                                         │ (never blocks handlers)
//!                                         ▼
//!                                   ┌───────────┐
//!                                   │ Usage Log │
//!                                   └───────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use steward_core::{
//!     CommandDefinition, CommandHandler, DispatchContext, Dispatcher, Matcher,
//!     PatternTable, Trigger,
//! };
//! use std::sync::Arc;
//!
//! struct Ping;
//!
//! #[async_trait::async_trait]
//! impl CommandHandler for Ping {
//!     async fn handle(&self, ctx: DispatchContext) -> Result<(), steward_core::CommandError> {
//!         ctx.reply("pong").await?;
//!         Ok(())
//!     }
//! }
//!
//! let mut table = PatternTable::new();
//! table.register(
//!     CommandDefinition::new("ping", Trigger::word("ping"))
//!         .names(["ping"])
//!         .syntax("ping")
//!         .describe("Replies with pong."),
//! )?;
//! let table = Arc::new(table);
//!
//! let matcher = Matcher::new(Arc::clone(&table));
//! let matches = matcher.match_all("ping");
//! // dispatcher.dispatch(&matches, &ctx).await drives the handlers
//! ```

pub mod foundation;
pub mod framework;
pub mod integration;

// Flat re-exports so callers rarely need the module paths.
pub use foundation::{
    Attachment, AttachmentRequiredError, AuthorizationError, CommandError, DispatchContext,
    ExternalServiceError, GroupInfo, GroupStoreError, IncomingMessage, MessageContext,
    PlatformError, Playlist, StatsError, TableError, UserId,
};

pub use framework::{
    CommandDefinition, CommandHandler, CommandStats, DispatchOutcome, DispatchReport, Dispatcher,
    MatchResult, MatchSet, Matcher, MemoryUsageStore, PatternTable, Trigger, UsageAggregate,
    UsageEvent, UsageLog, UsageStore, UserCount,
};

pub use integration::{
    ArtistInfo, Capabilities, ColorSwatch, ComicInfo, GroupStore, Mention, Messenger, MusicApi,
    OutboundMessage, PlatformHandle, PlaylistSnapshot, SearchApi, SearchHit, TrackInfo,
    UserProfile, WeatherApi, WeatherReport,
};

/// Everything a command handler implementation typically needs.
pub mod prelude {
    pub use super::foundation::*;
    pub use super::framework::{
        CommandDefinition, CommandHandler, DispatchOutcome, DispatchReport, Dispatcher,
        MatchResult, MatchSet, Matcher, PatternTable, Trigger, UsageLog,
    };
    pub use super::integration::*;
}
