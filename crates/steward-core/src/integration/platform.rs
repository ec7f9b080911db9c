//! Thread and group mutation.
//!
//! [`PlatformHandle`] is the capability object handlers use to change the
//! chat itself: nicknames, titles, emoji, colors, membership, polls, and the
//! group image. The core only passes it through; what each call does is
//! entirely the platform adapter's business.

use async_trait::async_trait;

use crate::foundation::error::PlatformError;

/// One entry of the platform's fixed color palette.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorSwatch {
    /// Human-facing name, e.g. `"Teal Blue"`.
    pub name: String,
    /// Platform color code, typically a hex string.
    pub code: String,
}

/// A user found through platform search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
}

/// Mutating operations on threads and their members.
#[async_trait]
pub trait PlatformHandle: Send + Sync {
    /// Sets a member's nickname within a thread.
    async fn set_nickname(
        &self,
        nickname: &str,
        thread: &str,
        user: &str,
    ) -> Result<(), PlatformError>;

    /// Sets the thread title. Fails on threads that cannot carry one.
    async fn set_title(&self, title: &str, thread: &str) -> Result<(), PlatformError>;

    /// Sets the thread emoji.
    async fn set_emoji(&self, emoji: &str, thread: &str) -> Result<(), PlatformError>;

    /// Sets the thread color to a palette code.
    async fn set_color(&self, color: &str, thread: &str) -> Result<(), PlatformError>;

    /// The palette of colors the platform accepts, in display order.
    fn palette(&self) -> Vec<ColorSwatch>;

    /// Adds a user to a thread.
    async fn add_member(&self, user: &str, thread: &str) -> Result<(), PlatformError>;

    /// Removes a user from a thread.
    async fn remove_member(&self, user: &str, thread: &str) -> Result<(), PlatformError>;

    /// Searches the platform's user directory, best matches first.
    async fn search_users(&self, query: &str) -> Result<Vec<UserProfile>, PlatformError>;

    /// Creates a poll in a group thread.
    async fn create_poll(
        &self,
        title: &str,
        options: &[String],
        thread: &str,
    ) -> Result<(), PlatformError>;

    /// Replaces the group image with one fetched from a URL.
    async fn set_group_image(&self, image_url: &str, thread: &str) -> Result<(), PlatformError>;
}
