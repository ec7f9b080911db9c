//! The assembled front door for message handling.
//!
//! [`Engine`] owns the shared pattern table, the matcher, the dispatcher,
//! and the usage log, and funnels every incoming message through the same
//! match-then-dispatch path.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use steward_core::MemoryUsageStore;
//! use steward_runtime::Engine;
//!
//! // Auto-loads config, initializes logging, wires the full roster
//! let store = Arc::new(MemoryUsageStore::new());
//! let (engine, _config) = Engine::from_env(store, services)?;
//!
//! let report = engine.handle_message(&ctx).await;
//! ```

use std::sync::Arc;

use steward_commands::{RosterSettings, install};
use steward_core::{
    Capabilities, DispatchReport, Dispatcher, Matcher, MessageContext, PatternTable, UsageLog,
    UsageStore,
};
use tracing::{Instrument, info, info_span, trace};

use crate::config::{ConfigLoader, StewardConfig};
use crate::error::{EngineError, EngineResult};
use crate::logging;

/// The assembled dispatch engine.
///
/// Construction wires the full command roster and fails on any registration
/// problem: duplicate keys, invalid triggers, unknown exclusion keys, or a
/// registered command left without a handler. A half-wired engine never sees
/// traffic.
pub struct Engine {
    /// Shared command table.
    table: Arc<PatternTable>,
    /// Compiled matcher over the table.
    matcher: Matcher,
    /// Usage log shared with the statistics commands.
    stats: Arc<UsageLog>,
    /// Dispatcher with every handler bound.
    dispatcher: Dispatcher,
}

impl Engine {
    /// Wires the full command roster against the given usage store and
    /// platform services.
    pub fn new(
        settings: RosterSettings,
        store: Arc<dyn UsageStore>,
        services: Capabilities,
    ) -> EngineResult<Self> {
        let roster = install(settings, store, services)?;

        let unbound = roster.dispatcher.unbound_keys();
        if !unbound.is_empty() {
            return Err(EngineError::UnboundCommands { keys: unbound });
        }

        info!(commands = roster.table.len(), "Command roster installed");

        Ok(Self {
            matcher: Matcher::new(Arc::clone(&roster.table)),
            table: roster.table,
            stats: roster.stats,
            dispatcher: roster.dispatcher,
        })
    }

    /// Builds an engine from a loaded configuration.
    ///
    /// Initializes logging first so wiring failures are reported through it.
    pub fn from_config(
        config: &StewardConfig,
        store: Arc<dyn UsageStore>,
        services: Capabilities,
    ) -> EngineResult<Self> {
        logging::init_from_config(&config.logging);
        Self::new(config.to_roster_settings(), store, services)
    }

    /// Loads configuration from the default locations, then builds the
    /// engine. Returns the loaded configuration alongside it.
    pub fn from_env(
        store: Arc<dyn UsageStore>,
        services: Capabilities,
    ) -> EngineResult<(Self, StewardConfig)> {
        let config = ConfigLoader::new().with_current_dir().load()?;
        let engine = Self::from_config(&config, store, services)?;
        Ok((engine, config))
    }

    /// The shared pattern table.
    pub fn table(&self) -> &Arc<PatternTable> {
        &self.table
    }

    /// The shared usage log.
    pub fn stats(&self) -> &Arc<UsageLog> {
        &self.stats
    }

    /// Matches and dispatches one incoming message.
    ///
    /// Every command the message matches runs concurrently; the report holds
    /// one outcome per matched command. Runs inside a span carrying the
    /// thread and message ids.
    pub async fn handle_message(&self, ctx: &MessageContext) -> DispatchReport {
        let span = info_span!(
            "dispatch",
            thread = %ctx.message.thread_id,
            message = %ctx.message.message_id,
        );

        async {
            let matches = self.matcher.match_all(&ctx.message.body);
            if matches.is_empty() {
                trace!("No command matched");
            }
            self.dispatcher.dispatch(&matches, ctx).await
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use steward_core::{
        ArtistInfo, ColorSwatch, ComicInfo, DispatchOutcome, ExternalServiceError, GroupInfo,
        GroupStore, GroupStoreError, IncomingMessage, Mention, MemoryUsageStore, Messenger,
        MusicApi, OutboundMessage, PlatformError, PlatformHandle, PlaylistSnapshot, SearchApi,
        SearchHit, TrackInfo, UserProfile, WeatherApi, WeatherReport,
    };

    /// Capability bundle that accepts every write and misses every lookup.
    struct NullServices;

    #[async_trait]
    impl Messenger for NullServices {
        async fn send(
            &self,
            _message: OutboundMessage,
            _thread: &str,
        ) -> Result<(), PlatformError> {
            Ok(())
        }

        async fn send_with_mentions(
            &self,
            _body: String,
            _mentions: Vec<Mention>,
            _thread: &str,
        ) -> Result<(), PlatformError> {
            Ok(())
        }
    }

    #[async_trait]
    impl PlatformHandle for NullServices {
        async fn set_nickname(
            &self,
            _nickname: &str,
            _thread: &str,
            _user: &str,
        ) -> Result<(), PlatformError> {
            Ok(())
        }

        async fn set_title(&self, _title: &str, _thread: &str) -> Result<(), PlatformError> {
            Ok(())
        }

        async fn set_emoji(&self, _emoji: &str, _thread: &str) -> Result<(), PlatformError> {
            Ok(())
        }

        async fn set_color(&self, _color: &str, _thread: &str) -> Result<(), PlatformError> {
            Ok(())
        }

        fn palette(&self) -> Vec<ColorSwatch> {
            Vec::new()
        }

        async fn add_member(&self, _user: &str, _thread: &str) -> Result<(), PlatformError> {
            Ok(())
        }

        async fn remove_member(&self, _user: &str, _thread: &str) -> Result<(), PlatformError> {
            Ok(())
        }

        async fn search_users(&self, _query: &str) -> Result<Vec<UserProfile>, PlatformError> {
            Ok(Vec::new())
        }

        async fn create_poll(
            &self,
            _title: &str,
            _options: &[String],
            _thread: &str,
        ) -> Result<(), PlatformError> {
            Ok(())
        }

        async fn set_group_image(
            &self,
            _image_url: &str,
            _thread: &str,
        ) -> Result<(), PlatformError> {
            Ok(())
        }
    }

    #[async_trait]
    impl GroupStore for NullServices {
        async fn group(&self, thread: &str) -> Result<GroupInfo, GroupStoreError> {
            Err(GroupStoreError::UnknownThread {
                thread: thread.to_string(),
            })
        }

        async fn set_property(
            &self,
            _name: &str,
            _value: serde_json::Value,
            _group: &GroupInfo,
        ) -> Result<(), GroupStoreError> {
            Ok(())
        }

        async fn known_threads(&self) -> Result<Vec<String>, GroupStoreError> {
            Ok(Vec::new())
        }

        async fn score(&self, _thread: &str, _user: &str) -> Result<Option<i64>, GroupStoreError> {
            Ok(None)
        }

        async fn set_score(
            &self,
            _thread: &str,
            _user: &str,
            _points: i64,
        ) -> Result<(), GroupStoreError> {
            Ok(())
        }
    }

    #[async_trait]
    impl SearchApi for NullServices {
        async fn search_wiki(&self, query: &str) -> Result<SearchHit, ExternalServiceError> {
            Err(ExternalServiceError::NoResults {
                service: "search",
                query: query.to_string(),
            })
        }

        async fn search_comic(&self, query: &str) -> Result<SearchHit, ExternalServiceError> {
            Err(ExternalServiceError::NoResults {
                service: "xkcd",
                query: query.to_string(),
            })
        }

        async fn latest_comic(&self) -> Result<ComicInfo, ExternalServiceError> {
            Err(ExternalServiceError::RequestFailed {
                service: "xkcd",
                reason: "not wired".to_string(),
            })
        }
    }

    #[async_trait]
    impl WeatherApi for NullServices {
        async fn current(&self, city: &str) -> Result<WeatherReport, ExternalServiceError> {
            Err(ExternalServiceError::NoResults {
                service: "weather",
                query: city.to_string(),
            })
        }
    }

    #[async_trait]
    impl MusicApi for NullServices {
        async fn search_tracks(
            &self,
            _query: &str,
            _limit: usize,
        ) -> Result<Vec<TrackInfo>, ExternalServiceError> {
            Ok(Vec::new())
        }

        async fn search_artist(&self, query: &str) -> Result<ArtistInfo, ExternalServiceError> {
            Err(ExternalServiceError::NoResults {
                service: "music",
                query: query.to_string(),
            })
        }

        async fn top_tracks(&self, _artist_id: &str) -> Result<Vec<TrackInfo>, ExternalServiceError> {
            Ok(Vec::new())
        }

        async fn playlist_tracks(
            &self,
            _owner: &str,
            _playlist_id: &str,
        ) -> Result<PlaylistSnapshot, ExternalServiceError> {
            Err(ExternalServiceError::RequestFailed {
                service: "music",
                reason: "not wired".to_string(),
            })
        }
    }

    fn services() -> Capabilities {
        let null = Arc::new(NullServices);
        Capabilities {
            messenger: Arc::clone(&null) as Arc<dyn Messenger>,
            platform: Arc::clone(&null) as Arc<dyn PlatformHandle>,
            groups: Arc::clone(&null) as Arc<dyn GroupStore>,
            search: Arc::clone(&null) as Arc<dyn SearchApi>,
            weather: Arc::clone(&null) as Arc<dyn WeatherApi>,
            music: Arc::clone(&null) as Arc<dyn MusicApi>,
        }
    }

    fn engine() -> Engine {
        Engine::new(
            RosterSettings::default(),
            Arc::new(MemoryUsageStore::new()),
            services(),
        )
        .expect("engine should boot")
    }

    fn context(body: &str, is_admin: bool) -> MessageContext {
        let message = IncomingMessage {
            message_id: "m1".to_string(),
            thread_id: "t1".to_string(),
            sender: "100".to_string(),
            body: body.to_string(),
            attachments: Vec::new(),
        };
        let group = GroupInfo {
            thread_id: "t1".to_string(),
            name: "Engine Bench".to_string(),
            is_group: true,
            ..GroupInfo::default()
        };
        MessageContext::new(message, group, is_admin)
    }

    #[test]
    fn test_engine_boots_with_full_roster() {
        let engine = engine();
        assert_eq!(engine.table().len(), 35);
    }

    #[tokio::test]
    async fn test_handle_message_dispatches_matched_command() {
        let engine = engine();

        let report = engine.handle_message(&context("help", false)).await;

        assert_eq!(report.outcome("help"), Some(&DispatchOutcome::Completed));
        assert_eq!(report.completed(), 1);
    }

    #[tokio::test]
    async fn test_unmatched_text_produces_empty_report() {
        let engine = engine();

        let report = engine.handle_message(&context("nothing to see here", false)).await;

        assert!(report.is_empty());
    }

    #[tokio::test]
    async fn test_admin_gate_holds_through_the_engine() {
        let engine = engine();

        let denied = engine.handle_message(&context("clearstats", false)).await;
        assert_eq!(
            denied.outcome("clearstats"),
            Some(&DispatchOutcome::Denied)
        );

        let allowed = engine.handle_message(&context("clearstats", true)).await;
        assert_eq!(
            allowed.outcome("clearstats"),
            Some(&DispatchOutcome::Completed)
        );
    }
}
