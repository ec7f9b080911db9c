//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use steward_commands::RosterSettings;
use steward_core::Playlist;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StewardConfig {
    /// Who the bot is and which word wakes it.
    #[serde(default)]
    pub identity: IdentityConfig,

    /// Who maintains the bot and where reports land.
    #[serde(default)]
    pub owner: OwnerConfig,

    /// Numeric tunables the command handlers read.
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Fallback playlist for groups with none stored.
    #[serde(default)]
    pub default_playlist: PlaylistConfig,

    /// Phrase pool the answer command draws from.
    #[serde(default = "default_answers")]
    pub answers: Vec<String>,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for StewardConfig {
    fn default() -> Self {
        Self {
            identity: IdentityConfig::default(),
            owner: OwnerConfig::default(),
            limits: LimitsConfig::default(),
            default_playlist: PlaylistConfig::default(),
            answers: default_answers(),
            logging: LoggingConfig::default(),
        }
    }
}

impl StewardConfig {
    /// Flattens the schema into the settings bundle the handlers read.
    pub fn to_roster_settings(&self) -> RosterSettings {
        RosterSettings {
            bot_id: self.identity.id.clone(),
            bot_short_name: self.identity.short_name.clone(),
            owner_name: self.owner.name.clone(),
            owner_short_name: self.owner.short_name.clone(),
            owner_thread: self.owner.thread.clone(),
            trigger_word: self.identity.trigger.clone(),
            wakeup_repeats: self.limits.wakeup_repeats,
            kick_revive_secs: self.limits.kick_revive_secs,
            purge_revive_secs: self.limits.purge_revive_secs,
            music_search_limit: self.limits.music_search_limit,
            rng_lower: self.limits.rng_lower,
            rng_upper: self.limits.rng_upper,
            answers: self.answers.clone(),
            default_playlist: self.default_playlist.to_playlist(),
            query_timeout: Duration::from_millis(self.limits.query_timeout_ms),
        }
    }
}

fn default_answers() -> Vec<String> {
    RosterSettings::default().answers
}

/// Bot identity settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Platform user id of the bot itself.
    #[serde(default = "default_bot_id")]
    pub id: String,

    /// Full bot name, logged at startup.
    #[serde(default = "default_bot_name")]
    pub name: String,

    /// Short name used in the help header.
    #[serde(default = "default_bot_name")]
    pub short_name: String,

    /// Keyword that prefixes every command.
    #[serde(default = "default_trigger")]
    pub trigger: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            id: default_bot_id(),
            name: default_bot_name(),
            short_name: default_bot_name(),
            trigger: default_trigger(),
        }
    }
}

fn default_bot_id() -> String {
    "0".to_string()
}

fn default_bot_name() -> String {
    "Steward".to_string()
}

fn default_trigger() -> String {
    "steward".to_string()
}

/// Maintainer identity settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerConfig {
    /// Owner's full name, shown as the help contact.
    #[serde(default = "default_owner_name")]
    pub name: String,

    /// Owner's short name, used in confirmations.
    #[serde(default = "default_owner_name")]
    pub short_name: String,

    /// Thread that receives bug reports.
    #[serde(default = "default_owner_thread")]
    pub thread: String,
}

impl Default for OwnerConfig {
    fn default() -> Self {
        Self {
            name: default_owner_name(),
            short_name: default_owner_name(),
            thread: default_owner_thread(),
        }
    }
}

fn default_owner_name() -> String {
    "the maintainer".to_string()
}

fn default_owner_thread() -> String {
    "0".to_string()
}

/// Numeric tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Direct messages sent per wake-up call.
    #[serde(default = "default_wakeup_repeats")]
    pub wakeup_repeats: u32,

    /// Seconds before a kicked member returns when no time is given.
    #[serde(default = "default_kick_revive_secs")]
    pub kick_revive_secs: u64,

    /// Seconds before purged members return.
    #[serde(default = "default_purge_revive_secs")]
    pub purge_revive_secs: u64,

    /// Result cap for music searches and sample-track listings.
    #[serde(default = "default_music_search_limit")]
    pub music_search_limit: usize,

    /// Default lower bound for the random number generator.
    #[serde(default = "default_rng_lower")]
    pub rng_lower: i64,

    /// Default upper bound for the random number generator.
    #[serde(default = "default_rng_upper")]
    pub rng_upper: i64,

    /// Bound on each statistics or playlist sub-query, in milliseconds.
    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            wakeup_repeats: default_wakeup_repeats(),
            kick_revive_secs: default_kick_revive_secs(),
            purge_revive_secs: default_purge_revive_secs(),
            music_search_limit: default_music_search_limit(),
            rng_lower: default_rng_lower(),
            rng_upper: default_rng_upper(),
            query_timeout_ms: default_query_timeout_ms(),
        }
    }
}

fn default_wakeup_repeats() -> u32 {
    10
}

fn default_kick_revive_secs() -> u64 {
    30
}

fn default_purge_revive_secs() -> u64 {
    1800
}

fn default_music_search_limit() -> usize {
    3
}

fn default_rng_lower() -> i64 {
    1
}

fn default_rng_upper() -> i64 {
    100
}

fn default_query_timeout_ms() -> u64 {
    5000
}

/// Stored coordinates of the fallback playlist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistConfig {
    /// Display name of the playlist holder.
    pub name: String,

    /// Playlist id.
    pub id: String,

    /// Account that owns the playlist.
    pub owner: String,

    /// Full playlist URI.
    pub uri: String,
}

impl Default for PlaylistConfig {
    fn default() -> Self {
        let playlist = RosterSettings::default().default_playlist;
        Self {
            name: playlist.name,
            id: playlist.id,
            owner: playlist.owner,
            uri: playlist.uri,
        }
    }
}

impl PlaylistConfig {
    /// Converts to the stored-playlist type the handlers use.
    pub fn to_playlist(&self) -> Playlist {
        Playlist {
            name: self.name.clone(),
            id: self.id.clone(),
            owner: self.owner.clone(),
            uri: self.uri.clone(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Line format.
    #[serde(default)]
    pub format: LogFormat,

    /// Destination for log output.
    #[serde(default)]
    pub output: LogOutput,

    /// Log file path, used when `output` is `file`.
    #[serde(default)]
    pub file_path: Option<PathBuf>,

    /// Include thread ids in each line.
    #[serde(default)]
    pub thread_ids: bool,

    /// Include the file and line of the call site.
    #[serde(default)]
    pub file_location: bool,

    /// Per-module level overrides, e.g. `"steward_core" = "debug"`.
    #[serde(default)]
    pub filters: HashMap<String, String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            output: LogOutput::default(),
            file_path: None,
            thread_ids: false,
            file_location: false,
            filters: HashMap::new(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Single-line, abbreviated output.
    #[default]
    Compact,

    /// Single-line output with full metadata.
    Full,

    /// Multi-line, human-oriented output.
    Pretty,

    /// Newline-delimited JSON (requires the `json-log` feature).
    Json,
}

/// Log output destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    /// Write to standard output.
    #[default]
    Stdout,

    /// Write to standard error.
    Stderr,

    /// Write to the file named by `file_path`.
    File,
}
