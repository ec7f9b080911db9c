//! Command definitions and trigger patterns.
//!
//! A [`Trigger`] is a literal command word (or a set of interchangeable
//! words) plus an optional parameter pattern. Triggers compile to anchored,
//! case-insensitive regexes: the word must open the message, so "help score"
//! fires `help` and never `score`.
//!
//! # Capture conventions
//!
//! Parameter patterns wrap optional whitespace in non-capturing groups and
//! capture only the payload, keeping logical captures at stable 1-based
//! indexes:
//!
//! ```rust,ignore
//! // "score", "score board", "score alice", "score alice 5"
//! Trigger::word("score")
//!     .params(r"(?:\s+(board))?(?:\s+([A-Za-z]\w*))?(?:\s+(-?\d+))?")
//! ```
//!
//! On `"score alice 5"` the captures are group 1 absent, group 2 `"alice"`,
//! group 3 `"5"`. [`MatchResult`] centralizes the coercion rules: captures
//! are trimmed, empty means absent, and numeric accessors fall back to a
//! default instead of surfacing parse errors.

use regex::{Regex, RegexBuilder};

// =============================================================================
// Trigger
// =============================================================================

/// The pattern that decides whether a message invokes a command.
#[derive(Debug, Clone)]
pub struct Trigger {
    /// Literal command words; more than one makes the word capture group 1.
    words: Vec<String>,
    /// Raw regex fragment appended after the command word.
    params: Option<String>,
}

impl Trigger {
    /// A trigger for a single literal command word.
    pub fn word(word: impl Into<String>) -> Self {
        Self {
            words: vec![word.into()],
            params: None,
        }
    }

    /// A trigger for a set of interchangeable command words.
    ///
    /// The matched word becomes capture group 1, shifting any parameter
    /// captures by one.
    pub fn any<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: words.into_iter().map(Into::into).collect(),
            params: None,
        }
    }

    /// Appends a parameter pattern after the command word.
    pub fn params(mut self, pattern: impl Into<String>) -> Self {
        self.params = Some(pattern.into());
        self
    }

    /// Compiles the trigger to its anchored, case-insensitive regex.
    ///
    /// The command word is escaped and must start the (whitespace-trimmed)
    /// message; the parameter pattern is appended verbatim.
    pub(crate) fn compile(&self) -> Result<Regex, regex::Error> {
        let head = match self.words.as_slice() {
            [word] => regex::escape(word),
            words => {
                let alts: Vec<String> = words.iter().map(|w| regex::escape(w)).collect();
                format!("({})", alts.join("|"))
            }
        };
        let mut source = format!(r"^\s*{head}\b");
        if let Some(params) = &self.params {
            source.push_str(params);
        }
        RegexBuilder::new(&source).case_insensitive(true).build()
    }
}

// =============================================================================
// CommandDefinition
// =============================================================================

/// A registered command: its trigger plus the metadata the help system,
/// the alias search, and the dispatcher gates need.
///
/// Built fluently and immutable once handed to the
/// [`PatternTable`](crate::framework::PatternTable):
///
/// ```rust,ignore
/// CommandDefinition::new("kick", Trigger::word("kick").params(r"\s+(\w+)(?:\s+(\d+))?"))
///     .names(["kick"])
///     .syntax("kick {user} ({seconds})")
///     .describe("Removes a member for a while, then adds them back.")
///     .short("Temporarily removes a member")
///     .example("kick alice")
/// ```
#[derive(Debug, Clone)]
pub struct CommandDefinition {
    key: String,
    trigger: Trigger,
    display_names: Vec<String>,
    syntax: String,
    description: String,
    short_description: Option<String>,
    examples: Vec<String>,
    requires_admin: bool,
    requires_attachment: bool,
    experimental: bool,
}

impl CommandDefinition {
    /// Creates a definition with the given key and trigger.
    ///
    /// A definition starts hidden: give it display names with
    /// [`names`](Self::names) to surface it in help listings.
    pub fn new(key: impl Into<String>, trigger: Trigger) -> Self {
        Self {
            key: key.into(),
            trigger,
            display_names: Vec::new(),
            syntax: String::new(),
            description: String::new(),
            short_description: None,
            examples: Vec::new(),
            requires_admin: false,
            requires_attachment: false,
            experimental: false,
        }
    }

    /// Sets the display names used by help listings and alias search.
    pub fn names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.display_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the syntax template shown in help output.
    pub fn syntax(mut self, syntax: impl Into<String>) -> Self {
        self.syntax = syntax.into();
        self
    }

    /// Sets the long description.
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the one-line description used in the overview listing.
    pub fn short(mut self, short: impl Into<String>) -> Self {
        self.short_description = Some(short.into());
        self
    }

    /// Adds a usage example. Call repeatedly for several examples.
    pub fn example(mut self, example: impl Into<String>) -> Self {
        self.examples.push(example.into());
        self
    }

    /// Restricts the command to admins.
    pub fn admin(mut self) -> Self {
        self.requires_admin = true;
        self
    }

    /// Requires a photo attachment on the invoking message.
    pub fn attachment(mut self) -> Self {
        self.requires_attachment = true;
        self
    }

    /// Marks the command as experimental.
    pub fn experimental(mut self) -> Self {
        self.experimental = true;
        self
    }

    /// The unique command key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The command's trigger.
    pub fn trigger(&self) -> &Trigger {
        &self.trigger
    }

    /// Display names; empty for hidden commands.
    pub fn display_names(&self) -> &[String] {
        &self.display_names
    }

    /// Whether the command appears in help listings.
    pub fn is_listed(&self) -> bool {
        !self.display_names.is_empty()
    }

    /// Syntax template for help output.
    pub fn syntax_text(&self) -> &str {
        &self.syntax
    }

    /// Long description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// One-line description, if one was given.
    pub fn short_description(&self) -> Option<&str> {
        self.short_description.as_deref()
    }

    /// Usage examples.
    pub fn examples(&self) -> &[String] {
        &self.examples
    }

    /// Whether the command is admin-only.
    pub fn requires_admin(&self) -> bool {
        self.requires_admin
    }

    /// Whether the command needs a photo attachment.
    pub fn requires_attachment(&self) -> bool {
        self.requires_attachment
    }

    /// Whether the command is experimental.
    pub fn is_experimental(&self) -> bool {
        self.experimental
    }
}

// =============================================================================
// MatchResult
// =============================================================================

/// The outcome of one trigger matching one message.
///
/// Captures are 1-indexed and whitespace-trimmed; optional groups that did
/// not participate are absent rather than empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    command: String,
    matched_text: String,
    groups: Vec<Option<String>>,
}

impl MatchResult {
    /// Builds a result from a regex capture set.
    pub(crate) fn from_captures(command: &str, caps: &regex::Captures<'_>) -> Self {
        let matched_text = caps
            .get(0)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();
        let groups = (1..caps.len())
            .map(|i| caps.get(i).map(|m| m.as_str().trim().to_string()))
            .collect();
        Self {
            command: command.to_string(),
            matched_text,
            groups,
        }
    }

    /// Key of the command whose trigger matched.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// The full text the trigger consumed.
    pub fn matched_text(&self) -> &str {
        &self.matched_text
    }

    /// Number of capture groups in the trigger.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// The trimmed capture at 1-based index `i`, if the group participated.
    pub fn group(&self, i: usize) -> Option<&str> {
        i.checked_sub(1)
            .and_then(|j| self.groups.get(j))
            .and_then(|g| g.as_deref())
    }

    /// Like [`group`](Self::group), but an empty capture counts as absent.
    pub fn non_empty(&self, i: usize) -> Option<&str> {
        self.group(i).filter(|s| !s.is_empty())
    }

    /// Integer capture with a fallback: absent or malformed input yields
    /// `default` instead of an error.
    pub fn int_or(&self, i: usize, default: i64) -> i64 {
        self.non_empty(i)
            .and_then(|s| s.parse().ok())
            .unwrap_or(default)
    }

    /// Float capture with a fallback, same policy as [`int_or`](Self::int_or).
    pub fn float_or(&self, i: usize, default: f64) -> f64 {
        self.non_empty(i)
            .and_then(|s| s.parse().ok())
            .unwrap_or(default)
    }

    /// Username capture, lowercased for membership lookups.
    pub fn user(&self, i: usize) -> Option<String> {
        self.non_empty(i).map(|s| s.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capture(trigger: &Trigger, text: &str) -> Option<MatchResult> {
        let re = trigger.compile().expect("trigger should compile");
        re.captures(text).map(|c| MatchResult::from_captures("t", &c))
    }

    #[test]
    fn word_is_anchored_and_case_insensitive() {
        let trigger = Trigger::word("help");
        let re = trigger.compile().expect("should compile");
        assert!(re.is_match("help"));
        assert!(re.is_match("  HELP"));
        assert!(!re.is_match("please help"));
        assert!(!re.is_match("helpful"));
    }

    #[test]
    fn help_pattern_captures_entry_query() {
        let trigger = Trigger::word("help").params(r"(?:\s+(.+))?");
        let result = capture(&trigger, "help score").expect("should match");
        assert_eq!(result.group(1), Some("score"));

        let bare = capture(&trigger, "help").expect("should match");
        assert_eq!(bare.group(1), None);
    }

    #[test]
    fn score_pattern_keeps_logical_capture_layout() {
        let trigger =
            Trigger::word("score").params(r"(?:\s+(board))?(?:\s+([A-Za-z]\w*))?(?:\s+(-?\d+))?");
        let result = capture(&trigger, "score alice 5").expect("should match");
        assert_eq!(result.group(1), None);
        assert_eq!(result.group(2), Some("alice"));
        assert_eq!(result.group(3), Some("5"));

        let board = capture(&trigger, "score board").expect("should match");
        assert_eq!(board.group(1), Some("board"));
        assert_eq!(board.group(2), None);
    }

    #[test]
    fn any_captures_the_matched_word() {
        let trigger = Trigger::any(["echo", "quote"]).params(r"\s+([\s\S]+)");
        let result = capture(&trigger, "quote to be or not to be").expect("should match");
        assert_eq!(result.group(1), Some("quote"));
        assert_eq!(result.group(2), Some("to be or not to be"));
    }

    #[test]
    fn numeric_fallbacks_never_error() {
        let trigger = Trigger::word("tab").params(r"(?:\s+(add|subtract|split|clear))?(?:\s+(\S+))?");
        let result = capture(&trigger, "tab add twelve").expect("should match");
        assert_eq!(result.float_or(2, 1.0), 1.0);

        let valid = capture(&trigger, "tab add 12.5").expect("should match");
        assert_eq!(valid.float_or(2, 1.0), 12.5);
    }

    #[test]
    fn user_captures_are_lowercased() {
        let trigger = Trigger::word("kick").params(r"\s+(\w+)");
        let result = capture(&trigger, "kick Alice").expect("should match");
        assert_eq!(result.user(1), Some("alice".to_string()));
    }

    #[test]
    fn invalid_params_fail_compilation() {
        let trigger = Trigger::word("bad").params(r"(\s+(.+)"); // unbalanced paren
        assert!(trigger.compile().is_err());
    }
}
