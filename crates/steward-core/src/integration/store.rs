//! Persisted per-group state.
//!
//! Group metadata lives in an external keyed store. The core reads whole
//! [`GroupInfo`] snapshots and writes back individual properties; it never
//! owns the storage format.

use async_trait::async_trait;

use crate::foundation::error::GroupStoreError;
use crate::foundation::group::GroupInfo;

/// External key-value store of per-group properties.
#[async_trait]
pub trait GroupStore: Send + Sync {
    /// A snapshot of the group behind a thread id.
    async fn group(&self, thread: &str) -> Result<GroupInfo, GroupStoreError>;

    /// Writes one named property of a group, e.g. `"tab"` or `"pinned"`.
    ///
    /// The property value is stored as loose JSON so each handler can keep
    /// whatever shape it needs.
    async fn set_property(
        &self,
        name: &str,
        value: serde_json::Value,
        group: &GroupInfo,
    ) -> Result<(), GroupStoreError>;

    /// Every thread id the store has a group for.
    async fn known_threads(&self) -> Result<Vec<String>, GroupStoreError>;

    /// A member's score within a thread, if one was ever set.
    async fn score(&self, thread: &str, user: &str) -> Result<Option<i64>, GroupStoreError>;

    /// Overwrites a member's score within a thread.
    async fn set_score(&self, thread: &str, user: &str, points: i64)
        -> Result<(), GroupStoreError>;
}
