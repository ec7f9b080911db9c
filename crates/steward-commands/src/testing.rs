//! Shared fixtures for the roster tests.
//!
//! One [`Harness`] wires the full roster against recording fakes: every
//! capability records what it was asked to do, the content services answer
//! with whatever a test configured, and `run` pushes a message through the
//! real matcher and dispatcher. Tests assert on the recorded traffic.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use steward_core::framework::stats::MemoryUsageStore;
use steward_core::{
    ArtistInfo, Attachment, Capabilities, ColorSwatch, ComicInfo, DispatchReport,
    Dispatcher, ExternalServiceError, GroupInfo, GroupStore, GroupStoreError, IncomingMessage,
    Matcher, Mention, MessageContext, Messenger, MusicApi, OutboundMessage, PatternTable,
    PlatformError, PlatformHandle, PlaylistSnapshot, SearchApi, SearchHit, TrackInfo, UsageLog,
    UserProfile, WeatherApi, WeatherReport,
};

use crate::{CommandDeps, RosterSettings};

// ─── Messenger ───────────────────────────────────────────────────────────────

/// One delivery the fake messenger accepted.
#[derive(Debug, Clone)]
pub(crate) struct SentMessage {
    pub(crate) thread: String,
    pub(crate) message: OutboundMessage,
    pub(crate) mentions: Vec<Mention>,
}

#[derive(Default)]
pub(crate) struct RecordingMessenger {
    sent: Mutex<Vec<SentMessage>>,
}

impl RecordingMessenger {
    pub(crate) fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().clone()
    }

    /// Text rendering of every delivery, in order.
    pub(crate) fn bodies(&self) -> Vec<String> {
        self.sent.lock().iter().map(|s| body_of(&s.message)).collect()
    }

    pub(crate) fn last_body(&self) -> String {
        self.bodies().last().cloned().unwrap_or_default()
    }
}

pub(crate) fn body_of(message: &OutboundMessage) -> String {
    match message {
        OutboundMessage::Text(body) => body.clone(),
        OutboundMessage::Link { body, .. } => body.clone(),
        OutboundMessage::RemoteFile { caption, .. } => caption.clone().unwrap_or_default(),
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send(&self, message: OutboundMessage, thread: &str) -> Result<(), PlatformError> {
        self.sent.lock().push(SentMessage {
            thread: thread.to_string(),
            message,
            mentions: Vec::new(),
        });
        Ok(())
    }

    async fn send_with_mentions(
        &self,
        body: String,
        mentions: Vec<Mention>,
        thread: &str,
    ) -> Result<(), PlatformError> {
        self.sent.lock().push(SentMessage {
            thread: thread.to_string(),
            message: OutboundMessage::Text(body),
            mentions,
        });
        Ok(())
    }
}

// ─── Platform ────────────────────────────────────────────────────────────────

/// One mutation the fake platform accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PlatformCall {
    Nickname {
        nickname: String,
        thread: String,
        user: String,
    },
    Title {
        title: String,
        thread: String,
    },
    Emoji {
        emoji: String,
        thread: String,
    },
    Color {
        color: String,
        thread: String,
    },
    AddMember {
        user: String,
        thread: String,
    },
    RemoveMember {
        user: String,
        thread: String,
    },
    Poll {
        title: String,
        options: Vec<String>,
        thread: String,
    },
    GroupImage {
        url: String,
        thread: String,
    },
}

#[derive(Default)]
pub(crate) struct RecordingPlatform {
    calls: Mutex<Vec<PlatformCall>>,
    pub(crate) palette: Mutex<Vec<ColorSwatch>>,
    pub(crate) directory: Mutex<Vec<UserProfile>>,
    /// When set, the next `set_emoji` fails (and clears the flag).
    pub(crate) reject_next_emoji: Mutex<bool>,
}

impl RecordingPlatform {
    pub(crate) fn calls(&self) -> Vec<PlatformCall> {
        self.calls.lock().clone()
    }

    fn record(&self, call: PlatformCall) {
        self.calls.lock().push(call);
    }
}

#[async_trait]
impl PlatformHandle for RecordingPlatform {
    async fn set_nickname(
        &self,
        nickname: &str,
        thread: &str,
        user: &str,
    ) -> Result<(), PlatformError> {
        self.record(PlatformCall::Nickname {
            nickname: nickname.to_string(),
            thread: thread.to_string(),
            user: user.to_string(),
        });
        Ok(())
    }

    async fn set_title(&self, title: &str, thread: &str) -> Result<(), PlatformError> {
        self.record(PlatformCall::Title {
            title: title.to_string(),
            thread: thread.to_string(),
        });
        Ok(())
    }

    async fn set_emoji(&self, emoji: &str, thread: &str) -> Result<(), PlatformError> {
        let mut reject = self.reject_next_emoji.lock();
        if *reject {
            *reject = false;
            return Err(PlatformError::call_failed("invalid emoji"));
        }
        self.record(PlatformCall::Emoji {
            emoji: emoji.to_string(),
            thread: thread.to_string(),
        });
        Ok(())
    }

    async fn set_color(&self, color: &str, thread: &str) -> Result<(), PlatformError> {
        self.record(PlatformCall::Color {
            color: color.to_string(),
            thread: thread.to_string(),
        });
        Ok(())
    }

    fn palette(&self) -> Vec<ColorSwatch> {
        self.palette.lock().clone()
    }

    async fn add_member(&self, user: &str, thread: &str) -> Result<(), PlatformError> {
        self.record(PlatformCall::AddMember {
            user: user.to_string(),
            thread: thread.to_string(),
        });
        Ok(())
    }

    async fn remove_member(&self, user: &str, thread: &str) -> Result<(), PlatformError> {
        self.record(PlatformCall::RemoveMember {
            user: user.to_string(),
            thread: thread.to_string(),
        });
        Ok(())
    }

    async fn search_users(&self, _query: &str) -> Result<Vec<UserProfile>, PlatformError> {
        Ok(self.directory.lock().clone())
    }

    async fn create_poll(
        &self,
        title: &str,
        options: &[String],
        thread: &str,
    ) -> Result<(), PlatformError> {
        self.record(PlatformCall::Poll {
            title: title.to_string(),
            options: options.to_vec(),
            thread: thread.to_string(),
        });
        Ok(())
    }

    async fn set_group_image(&self, image_url: &str, thread: &str) -> Result<(), PlatformError> {
        self.record(PlatformCall::GroupImage {
            url: image_url.to_string(),
            thread: thread.to_string(),
        });
        Ok(())
    }
}

// ─── Group store ─────────────────────────────────────────────────────────────

#[derive(Default)]
pub(crate) struct MemoryGroupStore {
    groups: Mutex<Vec<GroupInfo>>,
    scores: Mutex<HashMap<(String, String), i64>>,
    writes: Mutex<Vec<(String, serde_json::Value, String)>>,
}

impl MemoryGroupStore {
    pub(crate) fn with_group(group: GroupInfo) -> Self {
        let store = Self::default();
        store.insert(group);
        store
    }

    pub(crate) fn insert(&self, group: GroupInfo) {
        self.groups.lock().push(group);
    }

    pub(crate) fn seed_score(&self, thread: &str, user: &str, points: i64) {
        self.scores
            .lock()
            .insert((thread.to_string(), user.to_string()), points);
    }

    pub(crate) fn stored_score(&self, thread: &str, user: &str) -> Option<i64> {
        self.scores
            .lock()
            .get(&(thread.to_string(), user.to_string()))
            .copied()
    }

    /// Recorded property writes as (name, value, thread) triples.
    pub(crate) fn writes(&self) -> Vec<(String, serde_json::Value, String)> {
        self.writes.lock().clone()
    }
}

#[async_trait]
impl GroupStore for MemoryGroupStore {
    async fn group(&self, thread: &str) -> Result<GroupInfo, GroupStoreError> {
        self.groups
            .lock()
            .iter()
            .find(|g| g.thread_id == thread)
            .cloned()
            .ok_or_else(|| GroupStoreError::UnknownThread {
                thread: thread.to_string(),
            })
    }

    async fn set_property(
        &self,
        name: &str,
        value: serde_json::Value,
        group: &GroupInfo,
    ) -> Result<(), GroupStoreError> {
        self.writes
            .lock()
            .push((name.to_string(), value, group.thread_id.clone()));
        Ok(())
    }

    async fn known_threads(&self) -> Result<Vec<String>, GroupStoreError> {
        Ok(self.groups.lock().iter().map(|g| g.thread_id.clone()).collect())
    }

    async fn score(&self, thread: &str, user: &str) -> Result<Option<i64>, GroupStoreError> {
        Ok(self
            .scores
            .lock()
            .get(&(thread.to_string(), user.to_string()))
            .copied())
    }

    async fn set_score(
        &self,
        thread: &str,
        user: &str,
        points: i64,
    ) -> Result<(), GroupStoreError> {
        self.scores
            .lock()
            .insert((thread.to_string(), user.to_string()), points);
        Ok(())
    }
}

// ─── Content services ────────────────────────────────────────────────────────

/// Content fake answering with whatever a test configured; everything else
/// comes up empty.
#[derive(Default)]
pub(crate) struct FakeContent {
    pub(crate) wiki: Mutex<Option<SearchHit>>,
    pub(crate) comic: Mutex<Option<SearchHit>>,
    pub(crate) latest: Mutex<Option<ComicInfo>>,
    pub(crate) weather: Mutex<Option<WeatherReport>>,
    pub(crate) tracks: Mutex<Vec<TrackInfo>>,
    pub(crate) artist: Mutex<Option<ArtistInfo>>,
    pub(crate) top: Mutex<Vec<TrackInfo>>,
    /// (owner, playlist id) -> snapshot served by `playlist_tracks`.
    pub(crate) playlists: Mutex<HashMap<(String, String), PlaylistSnapshot>>,
    /// Playlist fetches that hang long enough to trip any bounded wait.
    pub(crate) slow: Mutex<HashSet<(String, String)>>,
}

fn no_results(service: &'static str, query: &str) -> ExternalServiceError {
    ExternalServiceError::NoResults {
        service,
        query: query.to_string(),
    }
}

#[async_trait]
impl SearchApi for FakeContent {
    async fn search_wiki(&self, query: &str) -> Result<SearchHit, ExternalServiceError> {
        self.wiki.lock().clone().ok_or_else(|| no_results("search", query))
    }

    async fn search_comic(&self, query: &str) -> Result<SearchHit, ExternalServiceError> {
        self.comic.lock().clone().ok_or_else(|| no_results("search", query))
    }

    async fn latest_comic(&self) -> Result<ComicInfo, ExternalServiceError> {
        self.latest
            .lock()
            .clone()
            .ok_or(ExternalServiceError::RequestFailed {
                service: "xkcd",
                reason: "not configured".to_string(),
            })
    }
}

#[async_trait]
impl WeatherApi for FakeContent {
    async fn current(&self, city: &str) -> Result<WeatherReport, ExternalServiceError> {
        self.weather.lock().clone().ok_or_else(|| no_results("weather", city))
    }
}

#[async_trait]
impl MusicApi for FakeContent {
    async fn search_tracks(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<TrackInfo>, ExternalServiceError> {
        let tracks = self.tracks.lock().clone();
        if tracks.is_empty() {
            return Err(no_results("music", query));
        }
        Ok(tracks.into_iter().take(limit).collect())
    }

    async fn search_artist(&self, query: &str) -> Result<ArtistInfo, ExternalServiceError> {
        self.artist.lock().clone().ok_or_else(|| no_results("music", query))
    }

    async fn top_tracks(&self, _artist_id: &str) -> Result<Vec<TrackInfo>, ExternalServiceError> {
        Ok(self.top.lock().clone())
    }

    async fn playlist_tracks(
        &self,
        owner: &str,
        playlist_id: &str,
    ) -> Result<PlaylistSnapshot, ExternalServiceError> {
        let key = (owner.to_string(), playlist_id.to_string());
        if self.slow.lock().contains(&key) {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        self.playlists
            .lock()
            .get(&key)
            .cloned()
            .ok_or(ExternalServiceError::RequestFailed {
                service: "music",
                reason: "playlist not found".to_string(),
            })
    }
}

/// A track with boring but stable metadata.
pub(crate) fn track(name: &str) -> TrackInfo {
    TrackInfo {
        name: name.to_string(),
        artists: vec!["The Night Owls".to_string()],
        album: "First Pressing".to_string(),
        url: format!("https://music.example.com/{name}"),
        preview_url: None,
        explicit: false,
    }
}

// ─── Harness ─────────────────────────────────────────────────────────────────

/// Group every test starts from: three members, one alias, no stored extras.
pub(crate) fn seeded_group() -> GroupInfo {
    let mut group = GroupInfo {
        thread_id: "t1".to_string(),
        name: "The Test Bench".to_string(),
        is_group: true,
        ..GroupInfo::default()
    };
    group.members.insert("charlie".to_string(), "100".to_string());
    group.members.insert("alice".to_string(), "200".to_string());
    group.members.insert("bob".to_string(), "300".to_string());
    group.names.insert("100".to_string(), "Charlie Fox".to_string());
    group.names.insert("200".to_string(), "Alice Quinn".to_string());
    group.names.insert("300".to_string(), "Bob Stone".to_string());
    group.aliases.insert("alice".to_string(), "al".to_string());
    group
}

/// The full roster wired against recording fakes.
pub(crate) struct Harness {
    pub(crate) table: Arc<PatternTable>,
    pub(crate) stats: Arc<UsageLog>,
    pub(crate) messenger: Arc<RecordingMessenger>,
    pub(crate) platform: Arc<RecordingPlatform>,
    pub(crate) groups: Arc<MemoryGroupStore>,
    pub(crate) content: Arc<FakeContent>,
    pub(crate) dispatcher: Dispatcher,
    pub(crate) settings: RosterSettings,
    pub(crate) group: GroupInfo,
}

impl Harness {
    pub(crate) fn new() -> Self {
        Self::with_group(seeded_group())
    }

    pub(crate) fn with_group(group: GroupInfo) -> Self {
        let settings = RosterSettings::default();
        let mut table = PatternTable::new();
        crate::register(&mut table).expect("roster should register");
        let table = Arc::new(table);

        let stats = Arc::new(UsageLog::new(
            Arc::clone(&table),
            Arc::new(MemoryUsageStore::new()),
            settings.query_timeout,
        ));
        let messenger = Arc::new(RecordingMessenger::default());
        let platform = Arc::new(RecordingPlatform::default());
        let groups = Arc::new(MemoryGroupStore::with_group(group.clone()));
        let content = Arc::new(FakeContent::default());

        let services = Capabilities {
            messenger: Arc::clone(&messenger) as Arc<dyn Messenger>,
            platform: Arc::clone(&platform) as Arc<dyn PlatformHandle>,
            groups: Arc::clone(&groups) as Arc<dyn GroupStore>,
            search: Arc::clone(&content) as Arc<dyn SearchApi>,
            weather: Arc::clone(&content) as Arc<dyn WeatherApi>,
            music: Arc::clone(&content) as Arc<dyn MusicApi>,
        };
        let mut dispatcher = Dispatcher::new(Arc::clone(&table), Arc::clone(&stats), services);
        let deps = CommandDeps {
            table: Arc::clone(&table),
            stats: Arc::clone(&stats),
            settings: settings.clone(),
        };
        crate::bind(&mut dispatcher, &deps).expect("roster should bind");

        Self {
            table,
            stats,
            messenger,
            platform,
            groups,
            content,
            dispatcher,
            settings,
            group,
        }
    }

    /// A fresh capability bundle over this harness's fakes.
    pub(crate) fn services(&self) -> Capabilities {
        Capabilities {
            messenger: Arc::clone(&self.messenger) as Arc<dyn Messenger>,
            platform: Arc::clone(&self.platform) as Arc<dyn PlatformHandle>,
            groups: Arc::clone(&self.groups) as Arc<dyn GroupStore>,
            search: Arc::clone(&self.content) as Arc<dyn SearchApi>,
            weather: Arc::clone(&self.content) as Arc<dyn WeatherApi>,
            music: Arc::clone(&self.content) as Arc<dyn MusicApi>,
        }
    }

    fn message(&self, text: &str) -> IncomingMessage {
        IncomingMessage {
            message_id: "m1".to_string(),
            thread_id: self.group.thread_id.clone(),
            sender: "100".to_string(),
            body: text.to_string(),
            attachments: Vec::new(),
        }
    }

    async fn run_message(&self, message: IncomingMessage, is_admin: bool) -> DispatchReport {
        let matches = Matcher::new(Arc::clone(&self.table)).match_all(&message.body);
        let ctx = MessageContext::new(message, self.group.clone(), is_admin);
        self.dispatcher.dispatch(&matches, &ctx).await
    }

    /// Runs one message from a regular member.
    pub(crate) async fn run(&self, text: &str) -> DispatchReport {
        self.run_message(self.message(text), false).await
    }

    /// Runs one message from an admin.
    pub(crate) async fn run_admin(&self, text: &str) -> DispatchReport {
        self.run_message(self.message(text), true).await
    }

    /// Runs one message carrying a photo attachment.
    pub(crate) async fn run_with_photo(&self, text: &str, url: &str) -> DispatchReport {
        let mut message = self.message(text);
        message.attachments.push(Attachment::Photo {
            url: url.to_string(),
        });
        self.run_message(message, false).await
    }
}
