//! Usage statistics for dispatched commands.
//!
//! Every dispatched command appends one [`UsageEvent`] to a [`UsageStore`].
//! Aggregates are always recomputed from the raw event log at query time;
//! nothing derived is ever cached, so rankings cannot go stale.
//!
//! # Partial collection
//!
//! Queries that sweep the whole table (the all-commands listing, the
//! cross-command total) bound each per-command fetch with the configured
//! query limit and proceed with whatever completed. Only the fetch for the
//! specifically requested command is awaited without a bound, so the data a
//! caller asked for is exact while the surrounding garnish degrades
//! gracefully when the store is slow.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use futures::future::join_all;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::time::timeout;
use tracing::{trace, warn};

use crate::foundation::error::StatsError;
use crate::framework::table::PatternTable;

// ============================================================================
// Events and storage
// ============================================================================

/// One recorded command invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageEvent {
    /// Key of the dispatched command.
    pub command: String,
    /// Platform id of the sender.
    pub sender: String,
    /// When the dispatch happened.
    pub at: DateTime<Utc>,
}

/// Append-only backing storage for usage events.
///
/// Implementations must tolerate interleaved appends from in-flight handlers;
/// an append is never lost to a concurrent one.
#[async_trait]
pub trait UsageStore: Send + Sync {
    /// Appends one event.
    async fn append(&self, event: UsageEvent) -> Result<(), StatsError>;

    /// All events recorded for a command key, oldest first.
    async fn events_for(&self, command: &str) -> Result<Vec<UsageEvent>, StatsError>;

    /// Irreversibly drops every recorded event.
    async fn clear(&self) -> Result<(), StatsError>;
}

/// In-process [`UsageStore`] backed by a read-write lock.
#[derive(Debug, Default)]
pub struct MemoryUsageStore {
    events: RwLock<HashMap<String, Vec<UsageEvent>>>,
}

impl MemoryUsageStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UsageStore for MemoryUsageStore {
    async fn append(&self, event: UsageEvent) -> Result<(), StatsError> {
        self.events
            .write()
            .entry(event.command.clone())
            .or_default()
            .push(event);
        Ok(())
    }

    async fn events_for(&self, command: &str) -> Result<Vec<UsageEvent>, StatsError> {
        Ok(self
            .events
            .read()
            .get(command)
            .cloned()
            .unwrap_or_default())
    }

    async fn clear(&self) -> Result<(), StatsError> {
        self.events.write().clear();
        Ok(())
    }
}

// ============================================================================
// Derived aggregates
// ============================================================================

/// Headline numbers for one command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandStats {
    /// Events recorded for the command.
    pub count: u64,
    /// Events recorded across every command at query time.
    pub total: u64,
}

impl CommandStats {
    /// The command's share of all recorded usage, in percent.
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.count as f64 / self.total as f64 * 100.0
        }
    }
}

/// Per-user slice of an aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserCount {
    pub user: String,
    pub count: u64,
}

/// Windowed usage numbers for one command, recomputed on demand.
#[derive(Debug, Clone, PartialEq)]
pub struct UsageAggregate {
    /// Events recorded for the command.
    pub count: u64,
    /// Events recorded across every command at query time.
    pub total: u64,
    /// Events within the trailing 24 hours.
    pub day: u64,
    /// Events within the trailing 30 days.
    pub month: u64,
    /// `count / total * 100`, or zero when nothing was recorded anywhere.
    pub perc: f64,
    /// Per-sender counts, ordered by first appearance in the log.
    pub by_user: Vec<UserCount>,
}

impl UsageAggregate {
    fn compute(events: &[UsageEvent], total: u64, now: DateTime<Utc>) -> Self {
        let day_floor = now - TimeDelta::hours(24);
        let month_floor = now - TimeDelta::days(30);
        let mut day = 0;
        let mut month = 0;
        let mut by_user: Vec<UserCount> = Vec::new();
        for event in events {
            if event.at > day_floor && event.at <= now {
                day += 1;
            }
            if event.at > month_floor && event.at <= now {
                month += 1;
            }
            match by_user.iter_mut().find(|entry| entry.user == event.sender) {
                Some(entry) => entry.count += 1,
                None => by_user.push(UserCount {
                    user: event.sender.clone(),
                    count: 1,
                }),
            }
        }
        let count = events.len() as u64;
        let perc = if total == 0 {
            0.0
        } else {
            count as f64 / total as f64 * 100.0
        };
        Self {
            count,
            total,
            day,
            month,
            perc,
            by_user,
        }
    }

    /// The sender with the most events; ties go to the earlier-seen sender.
    pub fn top_user(&self) -> Option<&UserCount> {
        let mut best: Option<&UserCount> = None;
        for entry in &self.by_user {
            match best {
                Some(current) if entry.count <= current.count => {}
                _ => best = Some(entry),
            }
        }
        best
    }
}

// ============================================================================
// Query front-end
// ============================================================================

/// Records usage events and answers aggregate queries over them.
///
/// Recording validates the command key against the pattern table, so the log
/// can never hold events for keys that were never registered.
pub struct UsageLog {
    table: Arc<PatternTable>,
    store: Arc<dyn UsageStore>,
    query_limit: Duration,
}

impl UsageLog {
    /// Creates a log over a finished table.
    ///
    /// `query_limit` bounds each per-command fetch of a whole-table sweep.
    pub fn new(table: Arc<PatternTable>, store: Arc<dyn UsageStore>, query_limit: Duration) -> Self {
        Self {
            table,
            store,
            query_limit,
        }
    }

    /// Appends a usage event for a registered command.
    ///
    /// # Errors
    ///
    /// [`StatsError::UnknownCommand`] when the key was never registered;
    /// [`StatsError::Unavailable`] when the store rejects the append.
    pub async fn record(&self, command: &str, sender: &str) -> Result<(), StatsError> {
        if !self.table.contains(command) {
            return Err(StatsError::UnknownCommand {
                key: command.to_string(),
            });
        }
        trace!(command = %command, sender = %sender, "recording usage");
        self.store
            .append(UsageEvent {
                command: command.to_string(),
                sender: sender.to_string(),
                at: Utc::now(),
            })
            .await
    }

    /// Count and cross-command total for one command.
    pub async fn stats(&self, command: &str) -> Result<CommandStats, StatsError> {
        if !self.table.contains(command) {
            return Err(StatsError::UnknownCommand {
                key: command.to_string(),
            });
        }
        let count = self.store.events_for(command).await?.len() as u64;
        let total = count + self.bounded_total_excluding(command).await;
        Ok(CommandStats { count, total })
    }

    /// Full windowed aggregate for one command, relative to the current time.
    pub async fn aggregate(&self, command: &str) -> Result<UsageAggregate, StatsError> {
        self.aggregate_at(command, Utc::now()).await
    }

    /// Full windowed aggregate for one command, relative to `now`.
    ///
    /// Taking the reference instant as a parameter keeps window arithmetic
    /// checkable without a clock.
    pub async fn aggregate_at(
        &self,
        command: &str,
        now: DateTime<Utc>,
    ) -> Result<UsageAggregate, StatsError> {
        if !self.table.contains(command) {
            return Err(StatsError::UnknownCommand {
                key: command.to_string(),
            });
        }
        let events = self.store.events_for(command).await?;
        let total = events.len() as u64 + self.bounded_total_excluding(command).await;
        Ok(UsageAggregate::compute(&events, total, now))
    }

    /// The sender who used a command the most, earliest-seen winning ties.
    pub async fn highest_user(&self, command: &str) -> Result<Option<String>, StatsError> {
        let aggregate = self.aggregate(command).await?;
        Ok(aggregate.top_user().map(|entry| entry.user.clone()))
    }

    /// Aggregates for every command with at least one recorded event, in
    /// registration order.
    ///
    /// Commands whose fetch fails or outlives the query limit are skipped
    /// rather than blocking the sweep.
    pub async fn all_stats(&self) -> Vec<(String, UsageAggregate)> {
        self.all_stats_at(Utc::now()).await
    }

    /// [`Self::all_stats`] relative to an explicit reference instant.
    pub async fn all_stats_at(&self, now: DateTime<Utc>) -> Vec<(String, UsageAggregate)> {
        let collected = self.bounded_fetch(None).await;
        let total: u64 = collected.iter().map(|(_, events)| events.len() as u64).sum();
        collected
            .into_iter()
            .filter(|(_, events)| !events.is_empty())
            .map(|(key, events)| {
                let aggregate = UsageAggregate::compute(&events, total, now);
                (key, aggregate)
            })
            .collect()
    }

    /// Irreversibly clears the whole event log.
    pub async fn reset_all(&self) -> Result<(), StatsError> {
        self.store.clear().await
    }

    /// Sum of events over every command except `skip`, each fetch bounded by
    /// the query limit. Fetches that fail or time out contribute nothing.
    async fn bounded_total_excluding(&self, skip: &str) -> u64 {
        self.bounded_fetch(Some(skip))
            .await
            .iter()
            .map(|(_, events)| events.len() as u64)
            .sum()
    }

    async fn bounded_fetch(&self, skip: Option<&str>) -> Vec<(String, Vec<UsageEvent>)> {
        let limit = self.query_limit;
        let fetches = self
            .table
            .all()
            .filter(|def| skip != Some(def.key()))
            .map(|def| {
                let key = def.key().to_string();
                let store = Arc::clone(&self.store);
                async move {
                    let fetched = timeout(limit, store.events_for(&key)).await;
                    (key, fetched)
                }
            })
            .collect::<Vec<_>>();

        let mut collected = Vec::with_capacity(fetches.len());
        for (key, fetched) in join_all(fetches).await {
            match fetched {
                Ok(Ok(events)) => collected.push((key, events)),
                Ok(Err(err)) => {
                    warn!(command = %key, error = %err, "usage fetch failed; skipping")
                }
                Err(_) => warn!(command = %key, "usage fetch outlived the query limit; skipping"),
            }
        }
        collected
    }
}

impl std::fmt::Debug for UsageLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsageLog")
            .field("command_count", &self.table.len())
            .field("query_limit", &self.query_limit)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::command::{CommandDefinition, Trigger};
    use chrono::TimeZone;

    fn table(keys: &[&str]) -> Arc<PatternTable> {
        let mut table = PatternTable::new();
        for key in keys {
            table
                .register(CommandDefinition::new(*key, Trigger::word(*key)))
                .expect("should register");
        }
        Arc::new(table)
    }

    fn log(keys: &[&str]) -> UsageLog {
        UsageLog::new(
            table(keys),
            Arc::new(MemoryUsageStore::new()),
            Duration::from_secs(1),
        )
    }

    fn event(command: &str, sender: &str, at: DateTime<Utc>) -> UsageEvent {
        UsageEvent {
            command: command.to_string(),
            sender: sender.to_string(),
            at,
        }
    }

    #[tokio::test]
    async fn recording_increases_count_and_total_by_one_each() {
        let log = log(&["ban", "kick"]);
        for _ in 0..3 {
            log.record("ban", "100").await.expect("should record");
        }
        let stats = log.stats("ban").await.expect("should query");
        assert_eq!(stats.count, 3);
        assert_eq!(stats.total, 3);

        log.record("kick", "100").await.expect("should record");
        log.record("kick", "200").await.expect("should record");
        let ban = log.stats("ban").await.expect("should query");
        let kick = log.stats("kick").await.expect("should query");
        assert_eq!(ban.count, 3);
        assert_eq!(ban.total, 5);
        assert_eq!(kick.count, 2);
        assert_eq!(kick.total, 5);
    }

    #[tokio::test]
    async fn recording_unregistered_key_is_rejected() {
        let log = log(&["ban"]);
        let err = log.record("ghost", "100").await.expect_err("should reject");
        assert!(matches!(err, StatsError::UnknownCommand { key } if key == "ghost"));
    }

    #[tokio::test]
    async fn day_and_month_windows_split_two_day_old_events() {
        let store = Arc::new(MemoryUsageStore::new());
        let log = UsageLog::new(table(&["ban"]), Arc::clone(&store) as Arc<dyn UsageStore>, Duration::from_secs(1));

        let t1 = Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap();
        let t2 = t1 + TimeDelta::days(2);
        store.append(event("ban", "100", t1)).await.expect("should append");
        store.append(event("ban", "100", t2)).await.expect("should append");

        let aggregate = log
            .aggregate_at("ban", t2 + TimeDelta::hours(1))
            .await
            .expect("should aggregate");
        assert_eq!(aggregate.day, 1);
        assert_eq!(aggregate.month, 2);
        assert_eq!(aggregate.count, 2);
    }

    #[tokio::test]
    async fn windows_are_nested() {
        let store = Arc::new(MemoryUsageStore::new());
        let log = UsageLog::new(table(&["ban"]), Arc::clone(&store) as Arc<dyn UsageStore>, Duration::from_secs(1));

        let now = Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap();
        store
            .append(event("ban", "100", now - TimeDelta::hours(1)))
            .await
            .expect("should append");
        store
            .append(event("ban", "100", now - TimeDelta::days(3)))
            .await
            .expect("should append");
        store
            .append(event("ban", "100", now - TimeDelta::days(45)))
            .await
            .expect("should append");

        let aggregate = log.aggregate_at("ban", now).await.expect("should aggregate");
        assert_eq!(aggregate.day, 1);
        assert_eq!(aggregate.month, 2);
        assert_eq!(aggregate.count, 3);
        assert!(aggregate.day <= aggregate.month && aggregate.month <= aggregate.count);
    }

    #[tokio::test]
    async fn percentage_is_relative_to_every_command() {
        let log = log(&["echo", "rng"]);
        log.record("echo", "100").await.expect("should record");
        for _ in 0..3 {
            log.record("rng", "100").await.expect("should record");
        }
        let aggregate = log.aggregate("echo").await.expect("should aggregate");
        assert_eq!(aggregate.total, 4);
        assert!((aggregate.perc - 25.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn top_user_breaks_ties_toward_first_seen() {
        let log = log(&["echo"]);
        for sender in ["alice", "bob", "alice", "bob"] {
            log.record("echo", sender).await.expect("should record");
        }
        let top = log.highest_user("echo").await.expect("should query");
        assert_eq!(top.as_deref(), Some("alice"));

        // A strictly higher count still wins.
        log.record("echo", "bob").await.expect("should record");
        let top = log.highest_user("echo").await.expect("should query");
        assert_eq!(top.as_deref(), Some("bob"));
    }

    #[tokio::test]
    async fn all_stats_lists_only_used_commands_in_registration_order() {
        let log = log(&["help", "echo", "rng"]);
        log.record("rng", "100").await.expect("should record");
        log.record("echo", "100").await.expect("should record");
        log.record("rng", "200").await.expect("should record");

        let all = log.all_stats().await;
        let keys: Vec<&str> = all.iter().map(|(key, _)| key.as_str()).collect();
        assert_eq!(keys, ["echo", "rng"]);
        assert_eq!(all[0].1.count, 1);
        assert_eq!(all[1].1.count, 2);
        assert_eq!(all[1].1.total, 3);
    }

    #[tokio::test]
    async fn reset_all_behaves_like_a_fresh_store() {
        let log = log(&["echo"]);
        log.record("echo", "100").await.expect("should record");
        log.reset_all().await.expect("should reset");

        assert!(log.all_stats().await.is_empty());
        log.record("echo", "100").await.expect("should record");
        let stats = log.stats("echo").await.expect("should query");
        assert_eq!(stats.count, 1);
        assert_eq!(stats.total, 1);
    }

    #[tokio::test]
    async fn sweep_proceeds_past_a_stalled_fetch() {
        struct StallingStore {
            inner: MemoryUsageStore,
        }

        #[async_trait]
        impl UsageStore for StallingStore {
            async fn append(&self, event: UsageEvent) -> Result<(), StatsError> {
                self.inner.append(event).await
            }

            async fn events_for(&self, command: &str) -> Result<Vec<UsageEvent>, StatsError> {
                if command == "slow" {
                    tokio::time::sleep(Duration::from_millis(200)).await;
                }
                self.inner.events_for(command).await
            }

            async fn clear(&self) -> Result<(), StatsError> {
                self.inner.clear().await
            }
        }

        let store = Arc::new(StallingStore {
            inner: MemoryUsageStore::new(),
        });
        let log = UsageLog::new(
            table(&["slow", "fast"]),
            Arc::clone(&store) as Arc<dyn UsageStore>,
            Duration::from_millis(50),
        );
        store
            .append(event("slow", "100", Utc::now()))
            .await
            .expect("should append");
        store
            .append(event("fast", "100", Utc::now()))
            .await
            .expect("should append");

        let all = log.all_stats().await;
        let keys: Vec<&str> = all.iter().map(|(key, _)| key.as_str()).collect();
        assert_eq!(keys, ["fast"]);
        // The partial total reflects only what completed in time.
        assert_eq!(all[0].1.total, 1);

        // A direct query for the stalled command itself is not bounded.
        let slow = log.stats("slow").await.expect("should query");
        assert_eq!(slow.count, 1);
    }

    #[tokio::test]
    async fn zero_usage_has_zero_percentage() {
        let stats = CommandStats { count: 0, total: 0 };
        assert_eq!(stats.percentage(), 0.0);
    }
}
