//! Console Bot
//!
//! Runs the full Steward roster as a terminal session: every line you type is
//! dispatched as a chat message from a demo member, and the bot's replies
//! print straight back to the console.
//!
//! Platform mutations (titles, kicks, polls) have no real chat to act on, so
//! the demo platform prints what it was asked to do instead. Group state
//! (pins, the tab, aliases, scores, playlists) is held in memory and carries
//! across messages within one session. Content services answer offline with
//! canned data.
//!
//! # Usage
//!
//! ```bash
//! cargo run --package console-bot
//! ```
//!
//! Type `help` for the roster. Prefix a line with `sudo ` to run it with
//! admin rights:
//!
//! ```text
//! > score board
//! > sudo clearstats all
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::Mutex;
use steward::core::{
    ArtistInfo, Capabilities, ColorSwatch, ComicInfo, ExternalServiceError, GroupInfo, GroupStore,
    GroupStoreError, IncomingMessage, MemoryUsageStore, Mention, MessageContext, Messenger,
    MusicApi, OutboundMessage, PlatformError, PlatformHandle, PlaylistSnapshot, SearchApi,
    SearchHit, TrackInfo, UserProfile, WeatherApi, WeatherReport,
};
use steward::runtime::Engine;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

// ============================================================================
// Demo Services
// ============================================================================

/// Prints every outbound message to the terminal.
struct ConsoleMessenger;

#[async_trait]
impl Messenger for ConsoleMessenger {
    async fn send(&self, message: OutboundMessage, _thread: &str) -> Result<(), PlatformError> {
        match message {
            OutboundMessage::Text(body) => println!("steward> {body}"),
            OutboundMessage::Link { body, url } => println!("steward> {body}\n         {url}"),
            OutboundMessage::RemoteFile { url, caption, .. } => {
                if let Some(caption) = caption {
                    println!("steward> {caption}");
                }
                println!("         [file] {url}");
            }
        }
        Ok(())
    }

    async fn send_with_mentions(
        &self,
        body: String,
        _mentions: Vec<Mention>,
        _thread: &str,
    ) -> Result<(), PlatformError> {
        println!("steward> {body}");
        Ok(())
    }
}

/// Answers every platform mutation by describing it.
struct ConsolePlatform;

#[async_trait]
impl PlatformHandle for ConsolePlatform {
    async fn set_nickname(
        &self,
        nickname: &str,
        _thread: &str,
        user: &str,
    ) -> Result<(), PlatformError> {
        println!("(platform) nickname for user {user} set to {nickname:?}");
        Ok(())
    }

    async fn set_title(&self, title: &str, _thread: &str) -> Result<(), PlatformError> {
        println!("(platform) title set to {title:?}");
        Ok(())
    }

    async fn set_emoji(&self, emoji: &str, _thread: &str) -> Result<(), PlatformError> {
        println!("(platform) emoji set to {emoji}");
        Ok(())
    }

    async fn set_color(&self, color: &str, _thread: &str) -> Result<(), PlatformError> {
        println!("(platform) color set to {color}");
        Ok(())
    }

    fn palette(&self) -> Vec<ColorSwatch> {
        vec![
            ColorSwatch {
                name: "Classic Blue".to_string(),
                code: "#0084ff".to_string(),
            },
            ColorSwatch {
                name: "Coral".to_string(),
                code: "#fa3c4c".to_string(),
            },
            ColorSwatch {
                name: "Teal Blue".to_string(),
                code: "#6699cc".to_string(),
            },
        ]
    }

    async fn add_member(&self, user: &str, _thread: &str) -> Result<(), PlatformError> {
        println!("(platform) user {user} added back to the group");
        Ok(())
    }

    async fn remove_member(&self, user: &str, _thread: &str) -> Result<(), PlatformError> {
        println!("(platform) user {user} removed from the group");
        Ok(())
    }

    async fn search_users(&self, query: &str) -> Result<Vec<UserProfile>, PlatformError> {
        let needle = query.to_lowercase();
        Ok(directory()
            .into_iter()
            .filter(|profile| profile.name.to_lowercase().contains(&needle))
            .collect())
    }

    async fn create_poll(
        &self,
        title: &str,
        options: &[String],
        _thread: &str,
    ) -> Result<(), PlatformError> {
        println!("(platform) poll {title:?} with options {options:?}");
        Ok(())
    }

    async fn set_group_image(&self, image_url: &str, _thread: &str) -> Result<(), PlatformError> {
        println!("(platform) group image set to {image_url}");
        Ok(())
    }
}

fn directory() -> Vec<UserProfile> {
    vec![
        UserProfile {
            id: "4".to_string(),
            name: "Alan Turing".to_string(),
        },
        UserProfile {
            id: "5".to_string(),
            name: "Barbara Liskov".to_string(),
        },
        UserProfile {
            id: "6".to_string(),
            name: "Donald Knuth".to_string(),
        },
    ]
}

/// One group held in memory; property writes are applied to the snapshot so
/// later messages observe them.
struct LocalGroupStore {
    group: Mutex<GroupInfo>,
    scores: Mutex<HashMap<String, i64>>,
}

impl LocalGroupStore {
    fn new(group: GroupInfo) -> Self {
        Self {
            group: Mutex::new(group),
            scores: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl GroupStore for LocalGroupStore {
    async fn group(&self, thread: &str) -> Result<GroupInfo, GroupStoreError> {
        let group = self.group.lock();
        if group.thread_id != thread {
            return Err(GroupStoreError::UnknownThread {
                thread: thread.to_string(),
            });
        }
        Ok(group.clone())
    }

    async fn set_property(
        &self,
        name: &str,
        value: serde_json::Value,
        _group: &GroupInfo,
    ) -> Result<(), GroupStoreError> {
        let mut group = self.group.lock();
        match name {
            "pinned" => group.pinned = value.as_str().map(str::to_string),
            "tab" => group.tab = value.as_f64().unwrap_or(0.0),
            "muted" => group.muted = value.as_bool().unwrap_or(false),
            "aliases" => {
                if let Ok(aliases) = serde_json::from_value(value) {
                    group.aliases = aliases;
                }
            }
            "playlists" => {
                if let Ok(playlists) = serde_json::from_value(value) {
                    group.playlists = playlists;
                }
            }
            other => info!(property = other, "property write ignored by the demo store"),
        }
        Ok(())
    }

    async fn known_threads(&self) -> Result<Vec<String>, GroupStoreError> {
        Ok(vec![self.group.lock().thread_id.clone()])
    }

    async fn score(&self, _thread: &str, user: &str) -> Result<Option<i64>, GroupStoreError> {
        Ok(self.scores.lock().get(user).copied())
    }

    async fn set_score(
        &self,
        _thread: &str,
        user: &str,
        points: i64,
    ) -> Result<(), GroupStoreError> {
        self.scores.lock().insert(user.to_string(), points);
        Ok(())
    }
}

/// Content services answering offline with plausible canned data.
struct CannedContent;

#[async_trait]
impl SearchApi for CannedContent {
    async fn search_wiki(&self, query: &str) -> Result<SearchHit, ExternalServiceError> {
        let slug = query.trim().replace(' ', "_");
        Ok(SearchHit {
            title: query.to_string(),
            url: format!("https://en.wikipedia.org/wiki/{slug}"),
        })
    }

    async fn search_comic(&self, query: &str) -> Result<SearchHit, ExternalServiceError> {
        Err(ExternalServiceError::NoResults {
            service: "search",
            query: query.to_string(),
        })
    }

    async fn latest_comic(&self) -> Result<ComicInfo, ExternalServiceError> {
        Ok(ComicInfo {
            number: 614,
            title: "Woodpecker".to_string(),
            url: "https://xkcd.com/614/".to_string(),
        })
    }
}

#[async_trait]
impl WeatherApi for CannedContent {
    async fn current(&self, city: &str) -> Result<WeatherReport, ExternalServiceError> {
        Ok(WeatherReport {
            city: city.to_string(),
            country: "US".to_string(),
            description: "scattered clouds".to_string(),
            temp: 72.5,
            temp_min: 64.0,
            temp_max: 81.0,
            clouds_pct: 40,
            icon_url: "https://openweathermap.org/img/w/03d.png".to_string(),
        })
    }
}

#[async_trait]
impl MusicApi for CannedContent {
    async fn search_tracks(
        &self,
        _query: &str,
        limit: usize,
    ) -> Result<Vec<TrackInfo>, ExternalServiceError> {
        Ok(demo_tracks().into_iter().take(limit).collect())
    }

    async fn search_artist(&self, query: &str) -> Result<ArtistInfo, ExternalServiceError> {
        Ok(ArtistInfo {
            id: "demo-artist".to_string(),
            name: query.to_string(),
            url: "https://music.example.com/artist/demo".to_string(),
            popularity: 64,
            image_url: None,
        })
    }

    async fn top_tracks(&self, _artist_id: &str) -> Result<Vec<TrackInfo>, ExternalServiceError> {
        Ok(demo_tracks())
    }

    async fn playlist_tracks(
        &self,
        _owner: &str,
        _playlist_id: &str,
    ) -> Result<PlaylistSnapshot, ExternalServiceError> {
        Ok(PlaylistSnapshot {
            name: "Console Classics".to_string(),
            tracks: demo_tracks(),
        })
    }
}

fn demo_tracks() -> Vec<TrackInfo> {
    ["Rhapsody in Blue", "Clair de Lune", "The Planets"]
        .into_iter()
        .map(|name| TrackInfo {
            name: name.to_string(),
            artists: vec!["The Console Orchestra".to_string()],
            album: "Sessions, Vol. 1".to_string(),
            url: format!("https://music.example.com/{}", name.replace(' ', "-")),
            preview_url: None,
            explicit: false,
        })
        .collect()
}

fn demo_group() -> GroupInfo {
    let mut group = GroupInfo {
        thread_id: "console".to_string(),
        name: "The Console".to_string(),
        is_group: true,
        ..GroupInfo::default()
    };
    group.members.insert("you".to_string(), "1".to_string());
    group.members.insert("ada".to_string(), "2".to_string());
    group.members.insert("grace".to_string(), "3".to_string());
    group.names.insert("1".to_string(), "You".to_string());
    group.names.insert("2".to_string(), "Ada Lovelace".to_string());
    group.names.insert("3".to_string(), "Grace Hopper".to_string());
    group
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let groups = Arc::new(LocalGroupStore::new(demo_group()));
    let content = Arc::new(CannedContent);
    let services = Capabilities {
        messenger: Arc::new(ConsoleMessenger),
        platform: Arc::new(ConsolePlatform),
        groups: Arc::clone(&groups) as Arc<dyn GroupStore>,
        search: Arc::clone(&content) as Arc<dyn SearchApi>,
        weather: Arc::clone(&content) as Arc<dyn WeatherApi>,
        music: Arc::clone(&content) as Arc<dyn MusicApi>,
    };

    let (engine, config) = Engine::from_env(Arc::new(MemoryUsageStore::new()), services)?;
    info!(
        trigger = %config.identity.trigger,
        commands = engine.table().len(),
        "Console session ready"
    );
    println!("Steward console. Type a command ('help' lists them all).");
    println!("Prefix with 'sudo ' for admin rights; Ctrl-D exits.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut serial = 0u64;
    while let Some(line) = lines.next_line().await? {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let (body, is_admin) = match trimmed.strip_prefix("sudo ") {
            Some(rest) => (rest.to_string(), true),
            None => (trimmed.to_string(), false),
        };

        serial += 1;
        let message = IncomingMessage {
            message_id: format!("console-{serial}"),
            thread_id: "console".to_string(),
            sender: "1".to_string(),
            body,
            attachments: Vec::new(),
        };
        let group = groups.group("console").await?;
        let report = engine
            .handle_message(&MessageContext::new(message, group, is_admin))
            .await;
        if report.is_empty() {
            println!("(no command matched; try 'help')");
        }
    }
    Ok(())
}
