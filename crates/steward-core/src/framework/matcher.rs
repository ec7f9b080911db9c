//! Trigger evaluation against incoming messages.
//!
//! Matching runs in two passes:
//!
//! 1. **Raw pass** - every registered trigger is applied to the message in
//!    registration order; each hit produces a [`MatchResult`].
//! 2. **Exclusion pass** - for every declared mutual-exclusion pair where
//!    both sides matched, the later-registered side is dropped.
//!
//! Overlaps that were never declared exclusive are left alone: several
//! commands genuinely firing from one message is normal and the dispatcher
//! runs them all.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::framework::command::MatchResult;
use crate::framework::table::PatternTable;

/// Applies the pattern table's triggers to message text.
#[derive(Clone)]
pub struct Matcher {
    table: Arc<PatternTable>,
}

impl Matcher {
    /// Creates a matcher over a finished pattern table.
    pub fn new(table: Arc<PatternTable>) -> Self {
        Self { table }
    }

    /// Matches every registered trigger against `text`.
    ///
    /// Returns the surviving matches in registration order.
    pub fn match_all(&self, text: &str) -> MatchSet {
        let mut hits: Vec<(usize, MatchResult)> = Vec::new();
        for (idx, entry) in self.table.entries().iter().enumerate() {
            let key = entry.definition.key();
            if let Some(caps) = entry.pattern.captures(text) {
                trace!(command = %key, "trigger matched");
                hits.push((idx, MatchResult::from_captures(key, &caps)));
            }
        }

        // Exclusion pass: the earlier-registered side of a declared pair
        // wins. Hits are in index order, so scanning earlier hits suffices.
        let mut survivors: Vec<(usize, MatchResult)> = Vec::with_capacity(hits.len());
        for (idx, result) in hits {
            let shadowed_by = survivors
                .iter()
                .find(|(kept, _)| self.table.is_excluded_pair(*kept, idx))
                .map(|(_, kept)| kept.command().to_string());
            match shadowed_by {
                Some(winner) => {
                    debug!(
                        command = %result.command(),
                        winner = %winner,
                        "dropping excluded match"
                    );
                }
                None => survivors.push((idx, result)),
            }
        }

        MatchSet {
            results: survivors.into_iter().map(|(_, r)| r).collect(),
        }
    }
}

impl std::fmt::Debug for Matcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Matcher")
            .field("command_count", &self.table.len())
            .finish()
    }
}

/// The matches one message produced, in registration order.
#[derive(Debug, Clone, Default)]
pub struct MatchSet {
    results: Vec<MatchResult>,
}

impl MatchSet {
    /// Returns `true` if no trigger matched.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Number of surviving matches.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Iterates the matches in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &MatchResult> {
        self.results.iter()
    }

    /// The match for a specific command, if it survived.
    pub fn get(&self, command: &str) -> Option<&MatchResult> {
        self.results.iter().find(|r| r.command() == command)
    }
}

impl IntoIterator for MatchSet {
    type Item = MatchResult;
    type IntoIter = std::vec::IntoIter<MatchResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}
