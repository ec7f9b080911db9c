//! The pattern table: every registered command and its compiled trigger.
//!
//! Registration order matters twice over: it is the order the matcher
//! applies triggers in, and it decides which side of a mutual-exclusion
//! pair survives when both match. The table is built once at startup and
//! then shared immutably behind an `Arc`.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use regex::Regex;
use tracing::debug;

use crate::foundation::error::TableError;
use crate::framework::command::CommandDefinition;

/// A command definition paired with its compiled trigger.
#[derive(Debug, Clone)]
pub(crate) struct RegisteredCommand {
    pub(crate) definition: Arc<CommandDefinition>,
    pub(crate) pattern: Regex,
}

/// Ordered registry of command definitions.
#[derive(Debug, Default)]
pub struct PatternTable {
    commands: Vec<RegisteredCommand>,
    index: HashMap<String, usize>,
    /// Mutually exclusive pairs, stored as (earlier, later) registration
    /// indexes.
    exclusions: HashSet<(usize, usize)>,
}

impl PatternTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a command definition.
    ///
    /// Compiles the trigger eagerly so an invalid pattern is caught here,
    /// at startup, rather than on first use.
    ///
    /// # Errors
    ///
    /// [`TableError::DuplicateKey`] if the key is already registered;
    /// [`TableError::InvalidTrigger`] if the trigger does not compile.
    pub fn register(&mut self, definition: CommandDefinition) -> Result<(), TableError> {
        let key = definition.key().to_string();
        if self.index.contains_key(&key) {
            return Err(TableError::DuplicateKey { key });
        }

        let pattern = definition
            .trigger()
            .compile()
            .map_err(|source| TableError::InvalidTrigger {
                key: key.clone(),
                source,
            })?;

        debug!(command = %key, pattern = %pattern.as_str(), "registered command");
        self.index.insert(key, self.commands.len());
        self.commands.push(RegisteredCommand {
            definition: Arc::new(definition),
            pattern,
        });
        Ok(())
    }

    /// Looks a command up by exact key.
    ///
    /// # Errors
    ///
    /// [`TableError::UnknownCommand`] if the key was never registered.
    pub fn lookup(&self, key: &str) -> Result<Arc<CommandDefinition>, TableError> {
        self.index
            .get(key)
            .map(|&i| Arc::clone(&self.commands[i].definition))
            .ok_or_else(|| TableError::UnknownCommand {
                key: key.to_string(),
            })
    }

    /// Returns `true` if the key is registered.
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Iterates all definitions in registration order.
    pub fn all(&self) -> impl Iterator<Item = &Arc<CommandDefinition>> {
        self.commands.iter().map(|c| &c.definition)
    }

    /// Number of registered commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Finds a command by user-supplied name.
    ///
    /// Case-insensitive; a query hits when it equals the key, equals a
    /// display name, or equals one token of a multi-word display name.
    /// The first hit in registration order wins.
    pub fn find_by_alias(&self, query: &str) -> Option<Arc<CommandDefinition>> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return None;
        }
        self.commands
            .iter()
            .map(|c| &c.definition)
            .find(|def| {
                def.key().eq_ignore_ascii_case(&query)
                    || def.display_names().iter().any(|name| {
                        name.eq_ignore_ascii_case(&query)
                            || name
                                .to_lowercase()
                                .split_whitespace()
                                .any(|token| token == query)
                    })
            })
            .cloned()
    }

    /// Declares two commands mutually exclusive.
    ///
    /// The pair is unordered: whichever of the two registered earlier wins
    /// when both triggers match one message.
    ///
    /// # Errors
    ///
    /// [`TableError::UnknownCommand`] if either key is unregistered.
    pub fn exclude(&mut self, a: &str, b: &str) -> Result<(), TableError> {
        let ia = self.position(a)?;
        let ib = self.position(b)?;
        self.exclusions
            .insert((ia.min(ib), ia.max(ib)));
        Ok(())
    }

    /// Registration index of a key.
    fn position(&self, key: &str) -> Result<usize, TableError> {
        self.index
            .get(key)
            .copied()
            .ok_or_else(|| TableError::UnknownCommand {
                key: key.to_string(),
            })
    }

    /// Whether the two registration indexes form a declared exclusion pair.
    pub(crate) fn is_excluded_pair(&self, a: usize, b: usize) -> bool {
        self.exclusions.contains(&(a.min(b), a.max(b)))
    }

    /// Registration-ordered entries, for the matcher.
    pub(crate) fn entries(&self) -> &[RegisteredCommand] {
        &self.commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::command::Trigger;

    fn def(key: &str) -> CommandDefinition {
        CommandDefinition::new(key, Trigger::word(key)).names([key])
    }

    #[test]
    fn register_then_lookup_round_trips() {
        let mut table = PatternTable::new();
        table.register(def("ping")).expect("should register");
        let found = table.lookup("ping").expect("should resolve");
        assert_eq!(found.key(), "ping");
    }

    #[test]
    fn duplicate_key_is_rejected() {
        let mut table = PatternTable::new();
        table.register(def("ping")).expect("should register");
        let err = table.register(def("ping")).expect_err("should reject");
        assert!(matches!(err, TableError::DuplicateKey { key } if key == "ping"));
    }

    #[test]
    fn unknown_key_is_reported() {
        let table = PatternTable::new();
        let err = table.lookup("nope").expect_err("should fail");
        assert!(matches!(err, TableError::UnknownCommand { key } if key == "nope"));
    }

    #[test]
    fn invalid_trigger_fails_registration() {
        let mut table = PatternTable::new();
        let bad = CommandDefinition::new("bad", Trigger::word("bad").params("(unclosed"));
        let err = table.register(bad).expect_err("should reject");
        assert!(matches!(err, TableError::InvalidTrigger { key, .. } if key == "bad"));
    }

    #[test]
    fn all_preserves_registration_order() {
        let mut table = PatternTable::new();
        for key in ["one", "two", "three"] {
            table.register(def(key)).expect("should register");
        }
        let keys: Vec<&str> = table.all().map(|d| d.key()).collect();
        assert_eq!(keys, ["one", "two", "three"]);
    }

    #[test]
    fn find_by_alias_matches_key_name_and_token() {
        let mut table = PatternTable::new();
        table
            .register(
                CommandDefinition::new("spotsearch", Trigger::word("spotsearch"))
                    .names(["song search", "artist search"]),
            )
            .expect("should register");
        table.register(def("song")).expect("should register");

        // Exact key
        assert_eq!(
            table.find_by_alias("spotsearch").map(|d| d.key().to_string()),
            Some("spotsearch".to_string())
        );
        // Full display name, case-insensitive
        assert_eq!(
            table.find_by_alias("Song Search").map(|d| d.key().to_string()),
            Some("spotsearch".to_string())
        );
        // Token of a display name; earlier registration wins over the later
        // "song" key
        assert_eq!(
            table.find_by_alias("song").map(|d| d.key().to_string()),
            Some("spotsearch".to_string())
        );
        assert!(table.find_by_alias("missing").is_none());
    }

    #[test]
    fn exclusions_require_registered_keys() {
        let mut table = PatternTable::new();
        table.register(def("help")).expect("should register");
        let err = table.exclude("help", "stats").expect_err("should fail");
        assert!(matches!(err, TableError::UnknownCommand { key } if key == "stats"));
    }

    #[test]
    fn exclusion_pairs_are_unordered() {
        let mut table = PatternTable::new();
        table.register(def("help")).expect("should register");
        table.register(def("stats")).expect("should register");
        table.exclude("stats", "help").expect("should record");
        assert!(table.is_excluded_pair(0, 1));
        assert!(table.is_excluded_pair(1, 0));
        assert!(!table.is_excluded_pair(0, 0));
    }
}
