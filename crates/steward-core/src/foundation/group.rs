//! Group model for the Steward core.
//!
//! A [`GroupInfo`] is a point-in-time snapshot of everything the bot knows
//! about a chat thread: its members, stored properties, and appearance
//! settings. Snapshots are produced by the
//! [`GroupStore`](crate::integration::GroupStore) and handed to handlers
//! by value, so a handler always works against the state the thread had
//! when the message arrived.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Platform-assigned user identifier.
pub type UserId = String;

/// A music playlist registered for a group member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    /// Display name of the member the playlist belongs to.
    pub name: String,
    /// Playlist identifier on the music service.
    pub id: String,
    /// Service-side login of the playlist's owner.
    pub owner: String,
    /// Full URI the playlist was registered with.
    pub uri: String,
}

/// Snapshot of a chat thread.
///
/// `members` and `aliases` are keyed by lowercased names so that
/// case-insensitive username captures resolve without further processing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupInfo {
    /// Thread identifier the snapshot belongs to.
    pub thread_id: String,
    /// Current thread title.
    pub name: String,
    /// Whether the thread is a group chat (as opposed to a direct message).
    pub is_group: bool,
    /// Lowercased first name -> user id.
    pub members: HashMap<String, UserId>,
    /// User id -> full display name.
    pub names: HashMap<UserId, String>,
    /// User id -> thread-local nickname.
    pub nicknames: HashMap<UserId, String>,
    /// Thread emoji, if one has been set.
    pub emoji: Option<String>,
    /// Thread color as a hex value, if a custom color has been set.
    pub color: Option<String>,
    /// Whether the bot is muted in this thread.
    pub muted: bool,
    /// Stored playlists, keyed by the owning member's user id.
    pub playlists: HashMap<UserId, Playlist>,
    /// Lowercased member name -> lowercased alias.
    pub aliases: HashMap<String, String>,
    /// Running group tab in dollars.
    pub tab: f64,
    /// Currently pinned message, already formatted for display.
    pub pinned: Option<String>,
}

impl GroupInfo {
    /// Resolves a (lowercased) name or alias to a member's user id.
    pub fn member_id(&self, name: &str) -> Option<&UserId> {
        if let Some(id) = self.members.get(name) {
            return Some(id);
        }
        self.aliases
            .iter()
            .find(|(_, alias)| alias.as_str() == name)
            .and_then(|(member, _)| self.members.get(member))
    }

    /// Returns the display name stored for a user id.
    pub fn display_name(&self, id: &str) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    /// Number of members in the snapshot.
    pub fn member_count(&self) -> usize {
        self.members.len()
    }
}

/// Uppercases the first letter of a (lowercased) captured name for display.
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
