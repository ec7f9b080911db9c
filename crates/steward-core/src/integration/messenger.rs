//! Outbound message delivery.
//!
//! The core never talks to a chat platform directly; it hands finished
//! [`OutboundMessage`] values to a [`Messenger`] and treats delivery failure
//! as a [`PlatformError`] to log or surface.

use async_trait::async_trait;

use crate::foundation::error::PlatformError;

/// Content the core can ask the platform to deliver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundMessage {
    /// Plain text.
    Text(String),
    /// Text accompanied by a URL the platform should unfurl.
    Link { body: String, url: String },
    /// A file fetched from a URL and attached to the thread.
    RemoteFile {
        url: String,
        name: String,
        caption: Option<String>,
    },
}

impl OutboundMessage {
    /// Plain text message.
    pub fn text(body: impl Into<String>) -> Self {
        Self::Text(body.into())
    }

    /// Text plus an unfurled URL.
    pub fn link(body: impl Into<String>, url: impl Into<String>) -> Self {
        Self::Link {
            body: body.into(),
            url: url.into(),
        }
    }

    /// Remote file attachment without a caption.
    pub fn file(url: impl Into<String>, name: impl Into<String>) -> Self {
        Self::RemoteFile {
            url: url.into(),
            name: name.into(),
            caption: None,
        }
    }

    /// Remote file attachment with a caption shown alongside it.
    pub fn file_with_caption(
        url: impl Into<String>,
        name: impl Into<String>,
        caption: impl Into<String>,
    ) -> Self {
        Self::RemoteFile {
            url: url.into(),
            name: name.into(),
            caption: Some(caption.into()),
        }
    }
}

/// A user reference embedded in a message body.
///
/// `handle` is the literal substring of the body to turn into a tag for
/// `user`, for example `"@Alice"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mention {
    pub user: String,
    pub handle: String,
}

/// Delivers messages to platform threads.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Sends a message to a thread.
    async fn send(&self, message: OutboundMessage, thread: &str) -> Result<(), PlatformError>;

    /// Sends a text message that tags the given users.
    async fn send_with_mentions(
        &self,
        body: String,
        mentions: Vec<Mention>,
        thread: &str,
    ) -> Result<(), PlatformError>;
}
