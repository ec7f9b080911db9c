//! Framework layer - Matching and routing.
//!
//! This module contains the machinery that turns message text into executed
//! commands:
//! - Command definitions and their triggers
//! - The pattern table (registration, lookup, exclusions)
//! - The matcher (trigger evaluation, exclusion resolution)
//! - The dispatcher (gates, usage recording, concurrent execution)
//! - The usage log (append-only events, derived aggregates)

pub mod command;
pub mod dispatcher;
pub mod matcher;
pub mod stats;
pub mod table;

pub use command::{CommandDefinition, MatchResult, Trigger};
pub use dispatcher::{CommandHandler, DispatchOutcome, DispatchReport, Dispatcher};
pub use matcher::{MatchSet, Matcher};
pub use stats::{
    CommandStats, MemoryUsageStore, UsageAggregate, UsageEvent, UsageLog, UsageStore, UserCount,
};
pub use table::PatternTable;
