//! Foundation layer - Core abstractions and data model.
//!
//! This module contains the fundamental building blocks of the Steward core:
//! - Message context for per-message and per-handler state
//! - Group model describing a chat thread at a point in time
//! - Error taxonomy shared by every layer above

pub mod context;
pub mod error;
pub mod group;

pub use context::{Attachment, DispatchContext, IncomingMessage, MessageContext};
pub use error::{
    AttachmentRequiredError, AuthorizationError, CommandError, ExternalServiceError,
    GroupStoreError, PlatformError, StatsError, TableError,
};
pub use group::{GroupInfo, Playlist, UserId, capitalize};
