//! Unified error types for the Steward core.
//!
//! Registration-time errors ([`TableError`]) are fatal: a misconfigured
//! command roster should stop startup, not limp along. Everything that can
//! fail while a message is being served is recoverable and carries enough
//! context to log and to render a user-facing line.

use thiserror::Error;

// =============================================================================
// Registration Errors
// =============================================================================

/// Errors raised while building the pattern table.
#[derive(Debug, Clone, Error)]
pub enum TableError {
    /// A command key was registered twice.
    #[error("command '{key}' is already registered")]
    DuplicateKey {
        /// The duplicated key.
        key: String,
    },

    /// A key was referenced that no registration created.
    #[error("unknown command '{key}'")]
    UnknownCommand {
        /// The missing key.
        key: String,
    },

    /// A trigger's parameter pattern failed to compile.
    #[error("invalid trigger for command '{key}': {source}")]
    InvalidTrigger {
        /// Key of the offending command.
        key: String,
        /// The underlying regex error.
        #[source]
        source: regex::Error,
    },
}

// =============================================================================
// Statistics Errors
// =============================================================================

/// Errors raised by the usage log and its backing store.
#[derive(Debug, Clone, Error)]
pub enum StatsError {
    /// The backing store could not be reached.
    #[error("usage store unavailable: {reason}")]
    Unavailable {
        /// Reason reported by the store.
        reason: String,
    },

    /// An event or query referenced a key the table does not know.
    #[error("unknown command '{key}'")]
    UnknownCommand {
        /// The missing key.
        key: String,
    },
}

impl StatsError {
    /// Creates an `Unavailable` error.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Service Errors
// =============================================================================

/// Errors from third-party content services (search, weather, music).
#[derive(Debug, Clone, Error)]
pub enum ExternalServiceError {
    /// The service answered but had nothing for the query.
    #[error("no results from {service} for '{query}'")]
    NoResults {
        /// Which service was queried.
        service: &'static str,
        /// The query that came up empty.
        query: String,
    },

    /// The request itself failed.
    #[error("{service} request failed: {reason}")]
    RequestFailed {
        /// Which service was queried.
        service: &'static str,
        /// Reason for failure.
        reason: String,
    },
}

/// Errors from the chat platform itself.
#[derive(Debug, Clone, Error)]
pub enum PlatformError {
    /// Message send failed.
    #[error("failed to send message: {0}")]
    SendFailed(String),

    /// The operation is not available in this kind of thread.
    #[error("operation not supported here: {0}")]
    Unsupported(String),

    /// Any other platform call failure.
    #[error("platform call failed: {reason}")]
    CallFailed {
        /// Reason for failure.
        reason: String,
    },
}

impl PlatformError {
    /// Creates a `CallFailed` error.
    pub fn call_failed(reason: impl Into<String>) -> Self {
        Self::CallFailed {
            reason: reason.into(),
        }
    }
}

/// Errors from the group property store.
#[derive(Debug, Clone, Error)]
pub enum GroupStoreError {
    /// No state is stored for the thread.
    #[error("thread '{thread}' not found")]
    UnknownThread {
        /// The missing thread id.
        thread: String,
    },

    /// The store could not be reached.
    #[error("group store unavailable: {reason}")]
    Unavailable {
        /// Reason reported by the store.
        reason: String,
    },
}

// =============================================================================
// Gate Errors
// =============================================================================

/// Raised when a non-admin invokes an admin-only command.
///
/// Always recovered with a soft denial; never aborts the message.
#[derive(Debug, Clone, Error)]
#[error("command '{key}' requires admin rights")]
pub struct AuthorizationError {
    /// Key of the gated command.
    pub key: String,
}

/// Raised when a command that needs an attachment receives none.
///
/// Always recovered with a prompt to retry; never aborts the message.
#[derive(Debug, Clone, Error)]
#[error("command '{key}' requires a photo attachment")]
pub struct AttachmentRequiredError {
    /// Key of the gated command.
    pub key: String,
}

// =============================================================================
// Handler Boundary
// =============================================================================

/// The error type every command handler returns.
///
/// The dispatcher catches these at the handler boundary, logs the full error,
/// and sends [`user_message`](CommandError::user_message) to the thread, so
/// one failing command never takes down its siblings.
#[derive(Debug, Error)]
pub enum CommandError {
    /// A message the user should read verbatim.
    #[error("{0}")]
    User(String),

    /// A content-service failure.
    #[error(transparent)]
    External(#[from] ExternalServiceError),

    /// A platform failure.
    #[error(transparent)]
    Platform(#[from] PlatformError),

    /// A group-store failure.
    #[error(transparent)]
    GroupStore(#[from] GroupStoreError),

    /// A statistics failure that a stats-surfacing command chose to raise.
    #[error(transparent)]
    Stats(#[from] StatsError),
}

impl CommandError {
    /// Creates an error whose text is shown to the user as-is.
    pub fn user(msg: impl Into<String>) -> Self {
        Self::User(msg.into())
    }

    /// The line sent to the thread when this error reaches the dispatcher.
    ///
    /// Service failures collapse to a short "couldn't do that" style message;
    /// internals never leak into the chat.
    pub fn user_message(&self) -> String {
        match self {
            Self::User(msg) => msg.clone(),
            Self::External(ExternalServiceError::NoResults { query, .. }) => {
                format!("No results found for \"{query}\"")
            }
            Self::External(ExternalServiceError::RequestFailed { service, .. }) => {
                format!("Couldn't reach {service} right now; try again later.")
            }
            Self::Platform(PlatformError::Unsupported(msg)) => msg.clone(),
            Self::Platform(_) => "Couldn't do that right now; try again later.".to_string(),
            Self::GroupStore(_) => "Stored group data is unavailable right now.".to_string(),
            Self::Stats(_) => "Usage statistics are unavailable right now.".to_string(),
        }
    }
}
