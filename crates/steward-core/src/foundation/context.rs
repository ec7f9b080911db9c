//! Context management for the Steward core.
//!
//! Two context types flow through the dispatch pipeline:
//!
//! - [`MessageContext`] is the per-message input: the incoming message, the
//!   group snapshot it arrived in, and the sender's admin standing. One is
//!   built per message and borrowed by the dispatcher.
//! - [`DispatchContext`] is the per-handler view: everything from the message
//!   context plus the captures of the trigger that matched and handles to the
//!   bot's capabilities. Each handler receives its own owned copy, so
//!   concurrent handlers never share mutable state.

use crate::foundation::error::PlatformError;
use crate::foundation::group::{GroupInfo, UserId};
use crate::framework::command::MatchResult;
use crate::integration::{Capabilities, OutboundMessage};

/// A message attachment as reported by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attachment {
    /// A photo, by (preview) URL.
    Photo {
        /// URL of the largest available rendition.
        url: String,
    },
    /// A non-photo file.
    File {
        /// Download URL.
        url: String,
        /// Original file name.
        name: String,
    },
    /// Anything the transport could not classify.
    Other {
        /// Platform-reported attachment kind.
        kind: String,
    },
}

impl Attachment {
    /// Returns `true` for photo attachments.
    pub fn is_photo(&self) -> bool {
        matches!(self, Self::Photo { .. })
    }
}

/// An incoming chat message, already stripped of the trigger word by the
/// transport.
#[derive(Debug, Clone, Default)]
pub struct IncomingMessage {
    /// Platform message id.
    pub message_id: String,
    /// Thread the message arrived in.
    pub thread_id: String,
    /// User id of the sender.
    pub sender: UserId,
    /// Message text.
    pub body: String,
    /// Attachments delivered with the message.
    pub attachments: Vec<Attachment>,
}

impl IncomingMessage {
    /// Returns the first photo attachment, if any.
    pub fn first_photo(&self) -> Option<&Attachment> {
        self.attachments.iter().find(|a| a.is_photo())
    }
}

/// Per-message input to the dispatcher.
///
/// Built once per incoming message; the group snapshot is fetched before
/// matching so every handler spawned from this message sees the same state.
#[derive(Debug, Clone)]
pub struct MessageContext {
    /// The incoming message.
    pub message: IncomingMessage,
    /// Snapshot of the thread the message arrived in.
    pub group: GroupInfo,
    /// Whether the sender holds admin rights.
    pub is_admin: bool,
}

impl MessageContext {
    /// Creates a message context from its parts.
    pub fn new(message: IncomingMessage, group: GroupInfo, is_admin: bool) -> Self {
        Self {
            message,
            group,
            is_admin,
        }
    }
}

/// The owned view a handler receives for a single matched command.
///
/// Everything here is a snapshot or a cheaply clonable handle; handlers can
/// hold the context across suspension points without blocking siblings.
#[derive(Clone)]
pub struct DispatchContext {
    /// Key of the matched command.
    pub command: String,
    /// Captures produced by the command's trigger.
    pub captures: MatchResult,
    /// The message that produced the match.
    pub message: IncomingMessage,
    /// Group snapshot taken when the message arrived.
    pub group: GroupInfo,
    /// Whether the sender holds admin rights.
    pub is_admin: bool,
    /// Capability handles for outbound effects.
    pub services: Capabilities,
}

impl DispatchContext {
    /// Thread id the message arrived in.
    pub fn thread_id(&self) -> &str {
        &self.message.thread_id
    }

    /// User id of the sender.
    pub fn sender(&self) -> &str {
        &self.message.sender
    }

    /// Display name of the sender, falling back to the raw id.
    pub fn sender_name(&self) -> &str {
        self.group
            .display_name(&self.message.sender)
            .unwrap_or(&self.message.sender)
    }

    /// Sends a plain text reply to the originating thread.
    pub async fn reply(&self, body: impl Into<String>) -> Result<(), PlatformError> {
        self.services
            .messenger
            .send(OutboundMessage::text(body), self.thread_id())
            .await
    }

    /// Sends an arbitrary outbound message to the originating thread.
    pub async fn send(&self, message: OutboundMessage) -> Result<(), PlatformError> {
        self.services.messenger.send(message, self.thread_id()).await
    }
}

impl std::fmt::Debug for DispatchContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchContext")
            .field("command", &self.command)
            .field("thread_id", &self.message.thread_id)
            .field("sender", &self.message.sender)
            .field("is_admin", &self.is_admin)
            .finish()
    }
}
