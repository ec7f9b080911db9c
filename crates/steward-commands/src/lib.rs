//! # Steward Commands
//!
//! The built-in command roster for the Steward assistant: every command
//! definition, in precedence order, and the handler behind each one.
//!
//! Installation happens in two halves:
//! - [`register`] fills a fresh `PatternTable` with the whole roster. The
//!   order of that list IS the precedence order; the declared exclusions
//!   keep overlapping triggers (song search vs. song, help stats vs. stats)
//!   from double-firing.
//! - [`bind`] attaches a handler to every key once the table is shared and
//!   the dispatcher exists.
//!
//! ```rust,ignore
//! let mut table = PatternTable::new();
//! steward_commands::register(&mut table)?;
//! let table = Arc::new(table);
//!
//! let stats = Arc::new(UsageLog::new(Arc::clone(&table), store, limit));
//! let mut dispatcher = Dispatcher::new(Arc::clone(&table), Arc::clone(&stats), services);
//! steward_commands::bind(&mut dispatcher, &CommandDeps { table, stats, settings })?;
//! assert!(dispatcher.unbound_keys().is_empty());
//! ```
//!
//! [`install`] composes both halves around fresh instances; the runtime
//! performs exactly this dance at startup and treats any error as fatal, so
//! a half-wired roster never sees traffic.

pub mod fun;
pub mod group;
pub mod members;
pub mod meta;
pub mod music;
pub mod search;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;
use std::time::Duration;

use steward_core::foundation::error::TableError;
use steward_core::foundation::group::Playlist;
use steward_core::framework::command::{CommandDefinition, Trigger};
use steward_core::framework::dispatcher::Dispatcher;
use steward_core::framework::stats::{UsageLog, UsageStore};
use steward_core::framework::table::PatternTable;
use steward_core::integration::Capabilities;

/// Identity facts and tunables the handlers read from configuration.
#[derive(Debug, Clone)]
pub struct RosterSettings {
    /// Platform user id of the bot itself.
    pub bot_id: String,
    /// Short bot name used in the help header.
    pub bot_short_name: String,
    /// Owner's full name, shown as the help contact.
    pub owner_name: String,
    /// Owner's short name, used in confirmations and broadcasts.
    pub owner_short_name: String,
    /// Thread that receives bug reports.
    pub owner_thread: String,
    /// Word that wakes the bot; only rendered into help text here.
    pub trigger_word: String,
    /// How many messages one wake-up call sends.
    pub wakeup_repeats: u32,
    /// Seconds before a kicked member returns when no time is given.
    pub kick_revive_secs: u64,
    /// Seconds before purged members return.
    pub purge_revive_secs: u64,
    /// Result cap for music searches and sample-track listings.
    pub music_search_limit: usize,
    /// Default lower bound for the random number generator.
    pub rng_lower: i64,
    /// Default upper bound for the random number generator.
    pub rng_upper: i64,
    /// Phrases the answer command picks from.
    pub answers: Vec<String>,
    /// Fallback playlist for groups with none stored.
    pub default_playlist: Playlist,
    /// Bound on each per-playlist fetch of the playlist listing.
    pub query_timeout: Duration,
}

impl Default for RosterSettings {
    fn default() -> Self {
        Self {
            bot_id: "0".into(),
            bot_short_name: "Steward".into(),
            owner_name: "the maintainer".into(),
            owner_short_name: "the maintainer".into(),
            owner_thread: "0".into(),
            trigger_word: "steward".into(),
            wakeup_repeats: 10,
            kick_revive_secs: 30,
            purge_revive_secs: 1800,
            music_search_limit: 3,
            rng_lower: 1,
            rng_upper: 100,
            answers: default_answers(),
            default_playlist: Playlist {
                name: "Steward".into(),
                id: "37i9dQZF1DXcBWIGoYBM5M".into(),
                owner: "spotify".into(),
                uri: "spotify:playlist:37i9dQZF1DXcBWIGoYBM5M".into(),
            },
            query_timeout: Duration::from_secs(5),
        }
    }
}

fn default_answers() -> Vec<String> {
    [
        "It is certain.",
        "It is decidedly so.",
        "Without a doubt.",
        "Yes, definitely.",
        "You may rely on it.",
        "As I see it, yes.",
        "Most likely.",
        "Outlook good.",
        "Yes.",
        "Signs point to yes.",
        "Reply hazy, try again.",
        "Ask again later.",
        "Better not tell you now.",
        "Cannot predict now.",
        "Concentrate and ask again.",
        "Don't count on it.",
        "My reply is no.",
        "My sources say no.",
        "Outlook not so good.",
        "Very doubtful.",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Shared services the handlers close over at bind time.
#[derive(Clone)]
pub struct CommandDeps {
    /// The finished pattern table, for the help and stats listings.
    pub table: Arc<PatternTable>,
    /// The usage log the dispatcher records into.
    pub stats: Arc<UsageLog>,
    /// Configured identity and tunables.
    pub settings: RosterSettings,
}

/// Registers every built-in command and declares the trigger exclusions.
///
/// The list below is the precedence order; moving an entry changes which
/// command wins ambiguous text.
///
/// # Errors
///
/// Any [`TableError`] here means the roster itself is broken and startup
/// must fail.
pub fn register(table: &mut PatternTable) -> Result<(), TableError> {
    table.register(
        CommandDefinition::new("help", Trigger::word("help").params(r"(?:\s+(.+))?"))
            .names(["help"])
            .syntax("help ({command})")
            .short("Command reference")
            .describe("Shows the full command list, or everything about one command.")
            .example("help stats"),
    )?;
    table.register(
        CommandDefinition::new("stats", Trigger::word("stats").params(r"(?:\s+(.+))?"))
            .names(["stats"])
            .syntax("stats ({command})")
            .short("Usage statistics")
            .describe(
                "Shows usage statistics for one command, or a ranked listing across all of them.",
            )
            .example("stats score"),
    )?;
    table.register(
        CommandDefinition::new("clearstats", Trigger::word("clearstats"))
            .names(["clearstats"])
            .syntax("clearstats")
            .short("Reset usage statistics")
            .describe("Clears every recorded usage event and starts counting fresh.")
            .admin(),
    )?;
    table.register(
        CommandDefinition::new("psa", Trigger::word("psa").params(r"\s+([\s\S]+)"))
            .names(["psa"])
            .syntax("psa {message}")
            .short("Broadcast an announcement")
            .describe("Broadcasts a public service announcement to every chat the bot knows.")
            .example("psa The server restarts at noon")
            .admin(),
    )?;
    table.register(
        CommandDefinition::new("bug", Trigger::word("bug").params(r"\s+([\s\S]+)"))
            .names(["bug"])
            .syntax("bug {message}")
            .short("Report a problem")
            .describe("Sends a report directly to the maintainer, with context about this chat.")
            .example("bug stats shows the wrong total"),
    )?;
    table.register(
        CommandDefinition::new("echo", Trigger::any(["echo", "quote"]).params(r"\s+([\s\S]+)"))
            .names(["echo", "quote"])
            .syntax("(echo|quote) {message}")
            .short("Repeat a message")
            .describe("Echoes the message back, or quotes it with attribution and the date.")
            .example("quote Talk is cheap"),
    )?;
    table.register(
        CommandDefinition::new(
            "score",
            Trigger::word("score")
                .params(r"(?:\s+(board))?(?:\s+([A-Za-z]\w*))?(?:\s+(-?\d+))?"),
        )
        .names(["score", "score board"])
        .syntax("score (board) ({member}) ({new score})")
        .short("Points for members")
        .describe("Shows the scoreboard, looks up a member's score, or sets it outright.")
        .example("score board"),
    )?;
    table.register(
        CommandDefinition::new("vote", Trigger::word("vote").params(r"\s+(up|down)\s+(\w+)"))
            .names(["vote"])
            .syntax("vote (up|down) {member}")
            .short("Nudge a member's score")
            .describe("Moves a member's score up or down by one point.")
            .example("vote up alice"),
    )?;
    table.register(
        CommandDefinition::new("kick", Trigger::word("kick").params(r"\s+(\w+)(?:\s+(\d+))?"))
            .names(["kick"])
            .syntax("kick {member} ({seconds})")
            .short("Remove a member for a while")
            .describe("Removes a member from the group and adds them back after a delay.")
            .example("kick alice"),
    )?;
    // Hidden: dispatches but stays out of the help listing.
    table.register(
        CommandDefinition::new("purge", Trigger::word("purge"))
            .syntax("purge")
            .describe("Clears the whole room for a while, then restores everyone.")
            .admin(),
    )?;
    table.register(
        CommandDefinition::new("wakeup", Trigger::word("wakeup").params(r"\s+(\w+)"))
            .names(["wakeup", "wake up"])
            .syntax("wakeup {member}")
            .short("Message someone awake")
            .describe("Sends a member a burst of direct messages they cannot ignore.")
            .example("wakeup alice"),
    )?;
    table.register(
        CommandDefinition::new(
            "addsearch",
            Trigger::any(["add", "search"]).params(r"(?:\s+(\d+))?\s+(.+)"),
        )
        .names(["add", "search"])
        .syntax("(add|search) ({results}) {name}")
        .short("Find people on the platform")
        .describe(
            "Searches the platform's directory for a user; add pulls the best match into the \
             group.",
        )
        .example("search 3 john smith")
        .experimental(),
    )?;
    table.register(
        CommandDefinition::new(
            "setnick",
            Trigger::word("setnick").params(r"\s+(\w+)\s+([\s\S]+)"),
        )
        .names(["setnick"])
        .syntax("setnick {member} {nickname}")
        .short("Set a nickname")
        .example("setnick alice Allie"),
    )?;
    table.register(
        CommandDefinition::new("clearnick", Trigger::word("clearnick").params(r"\s+(\w+)"))
            .names(["clearnick"])
            .syntax("clearnick {member}")
            .short("Clear a nickname"),
    )?;
    // Hidden: renames the bot itself.
    table.register(
        CommandDefinition::new("christen", Trigger::word("christen").params(r"\s+([\s\S]+)"))
            .syntax("christen {name}")
            .describe("Renames the bot within this chat.")
            .admin(),
    )?;
    table.register(
        CommandDefinition::new("title", Trigger::word("title").params(r"\s+([\s\S]+)"))
            .names(["title"])
            .syntax("title {text}")
            .short("Set the chat title")
            .example("title The Council"),
    )?;
    table.register(
        CommandDefinition::new(
            "poll",
            Trigger::word("poll").params(r#"\s+"([^"]+)"(?:\s+([\s\S]+))?"#),
        )
        .names(["poll"])
        .syntax("poll \"{title}\" {option1},{option2},…")
        .short("Create a poll")
        .describe("Creates a group poll with the given title and comma-separated options.")
        .example("poll \"Lunch?\" pizza,salad,sushi"),
    )?;
    table.register(
        CommandDefinition::new("emoji", Trigger::word("emoji").params(r"\s+(\S+)"))
            .names(["emoji"])
            .syntax("emoji {emoji}")
            .short("Set the chat emoji"),
    )?;
    table.register(
        CommandDefinition::new("color", Trigger::word("color").params(r"(?:\s+(.+))?"))
            .names(["color"])
            .syntax("color ({name|hex|random})")
            .short("Set the chat color")
            .describe(
                "Shows the current chat color, or sets a new one by palette name, hex value, or \
                 at random.",
            )
            .example("color random"),
    )?;
    table.register(
        CommandDefinition::new("photo", Trigger::word("photo"))
            .names(["photo"])
            .syntax("photo")
            .short("Set the group image")
            .describe("Sets the group image to the attached photo.")
            .attachment(),
    )?;
    table.register(
        CommandDefinition::new("pin", Trigger::word("pin").params(r"(?:\s+([\s\S]+))?"))
            .names(["pin"])
            .syntax("pin ({message})")
            .short("Pin a message")
            .describe("Shows the pinned message, or pins a new one with attribution and date.")
            .example("pin Rent is due on the 1st"),
    )?;
    table.register(
        CommandDefinition::new(
            "tab",
            Trigger::word("tab")
                .params(r"(?:\s+(add|subtract|split|clear))?(?:\s+(-?\d+(?:\.\d+)?))?"),
        )
        .names(["tab"])
        .syntax("tab (add|subtract|split|clear) ({amount})")
        .short("Group running tab")
        .describe("Keeps a running dollar tab for the group and splits it on request.")
        .example("tab add 12.50"),
    )?;
    table.register(
        CommandDefinition::new("mute", Trigger::any(["mute", "unmute"]))
            .names(["mute", "unmute"])
            .syntax("(un)mute")
            .short("Silence the bot"),
    )?;
    table.register(
        CommandDefinition::new(
            "alias",
            Trigger::word("alias").params(r"(?:\s+(clear))?\s+(\w+)(?:\s+([\s\S]+))?"),
        )
        .names(["alias"])
        .syntax("alias (clear) {member} ({new alias})")
        .short("Alternate member names")
        .describe("Shows, sets, or clears an alternate name a member can be addressed by.")
        .example("alias alice al"),
    )?;
    table.register(
        CommandDefinition::new(
            "spotsearch",
            Trigger::any(["song", "artist"]).params(r"\s+search\s+(.+)"),
        )
        .names(["song search", "artist search"])
        .syntax("(song|artist) search {query}")
        .short("Search the music catalog")
        .describe("Finds the best matching track or artist and shares it with the chat.")
        .example("song search take five"),
    )?;
    table.register(
        CommandDefinition::new("song", Trigger::word("song").params(r"(?:\s+(\w+))?"))
            .names(["song"])
            .syntax("song ({member})")
            .short("A track from a stored playlist")
            .describe(
                "Grabs a random track from the named member's playlist, or from a random stored \
                 one.",
            )
            .example("song alice"),
    )?;
    table.register(
        CommandDefinition::new(
            "playlist",
            Trigger::word("playlist").params(r"(?:\s+(\w+)(?:\s+(\S+)\s+(\S+))?)?"),
        )
        .names(["playlist", "playlists"])
        .syntax("playlist ({member} {owner} {URI})")
        .short("Stored group playlists")
        .describe(
            "Lists the group's stored playlists, or stores a new one for a member from a \
             music-service owner and URI.",
        )
        .example("playlist alice spotifyuser spotify:playlist:37i9dQZF1DXcBWIGoYBM5M"),
    )?;
    table.register(
        CommandDefinition::new("wiki", Trigger::word("wiki").params(r"\s+(.+)"))
            .names(["wiki"])
            .syntax("wiki {query}")
            .short("Search the wiki")
            .example("wiki rust programming language"),
    )?;
    table.register(
        CommandDefinition::new(
            "xkcd",
            Trigger::word("xkcd").params(r"(?:\s+(new|search|\d+))?(?:\s+(.+))?"),
        )
        .names(["xkcd"])
        .syntax("xkcd (new|{number}|search {query})")
        .short("Fetch a comic")
        .describe(
            "Links a random comic by default; the latest with \"new\", a specific number, or a \
             search result.",
        )
        .example("xkcd search standards"),
    )?;
    table.register(
        CommandDefinition::new("weather", Trigger::word("weather").params(r"\s+(.+)"))
            .names(["weather"])
            .syntax("weather {city}")
            .short("Current conditions")
            .example("weather College Park"),
    )?;
    table.register(
        CommandDefinition::new("google", Trigger::word("google").params(r"\s+(.+)"))
            .names(["google"])
            .syntax("google {query}")
            .short("Hand a search off")
            .example("google how to exit vim"),
    )?;
    table.register(
        CommandDefinition::new(
            "remind",
            Trigger::word("remind").params(r"\s+(\d+)\s+([\s\S]+)"),
        )
        .names(["remind", "reminder"])
        .syntax("remind {minutes} {message}")
        .short("Delayed reminder")
        .describe("Mentions you with the message after the given number of minutes.")
        .example("remind 10 check the oven"),
    )?;
    table.register(
        CommandDefinition::new(
            "rng",
            Trigger::word("rng").params(r"(?:\s+(\d+))?(?:\s+(\d+))?"),
        )
        .names(["rng", "random"])
        .syntax("rng ({lower}) ({upper})")
        .short("Random number")
        .describe("Draws a random number, with configurable default bounds.")
        .example("rng 1 6"),
    )?;
    table.register(
        CommandDefinition::new("choose", Trigger::word("choose").params(r"\s+(.+)"))
            .names(["choose"])
            .syntax("choose {option1},{option2},…")
            .short("Pick one for me")
            .example("choose pizza,salad"),
    )?;
    table.register(
        CommandDefinition::new("answer", Trigger::any(["answer", "ask"]).params(r"\s+([\s\S]+)"))
            .names(["answer", "ask"])
            .syntax("(answer|ask) {question}")
            .short("Answers any yes/no question")
            .example("ask will it rain tomorrow"),
    )?;

    // "song search x" must not also fire the bare song command, and
    // "help stats" / "stats help" fire only whichever came first.
    table.exclude("spotsearch", "song")?;
    table.exclude("help", "stats")?;

    Ok(())
}

/// Binds a handler to every key [`register`] installed.
///
/// # Errors
///
/// [`TableError::UnknownCommand`] or [`TableError::DuplicateKey`] here means
/// roster and handlers drifted apart; the runtime treats it as fatal.
pub fn bind(dispatcher: &mut Dispatcher, deps: &CommandDeps) -> Result<(), TableError> {
    dispatcher.bind("help", meta::Help::new(deps))?;
    dispatcher.bind("stats", meta::Stats::new(deps))?;
    dispatcher.bind("clearstats", meta::ClearStats::new(deps))?;
    dispatcher.bind("psa", meta::Psa::new(deps))?;
    dispatcher.bind("bug", meta::Bug::new(deps))?;
    dispatcher.bind("echo", fun::Echo)?;
    dispatcher.bind("score", members::Score)?;
    dispatcher.bind("vote", members::Vote)?;
    dispatcher.bind("kick", members::Kick::new(deps))?;
    dispatcher.bind("purge", members::Purge::new(deps))?;
    dispatcher.bind("wakeup", members::Wakeup::new(deps))?;
    dispatcher.bind("addsearch", members::AddSearch)?;
    dispatcher.bind("setnick", members::SetNick)?;
    dispatcher.bind("clearnick", members::ClearNick)?;
    dispatcher.bind("christen", members::Christen::new(deps))?;
    dispatcher.bind("title", group::Title)?;
    dispatcher.bind("poll", group::Poll)?;
    dispatcher.bind("emoji", group::Emoji)?;
    dispatcher.bind("color", group::Color)?;
    dispatcher.bind("photo", group::Photo)?;
    dispatcher.bind("pin", group::Pin)?;
    dispatcher.bind("tab", group::Tab)?;
    dispatcher.bind("mute", group::Mute)?;
    dispatcher.bind("alias", group::Alias)?;
    dispatcher.bind("spotsearch", music::SpotSearch::new(deps))?;
    dispatcher.bind("song", music::Song::new(deps))?;
    dispatcher.bind("playlist", music::Playlists::new(deps))?;
    dispatcher.bind("wiki", search::Wiki)?;
    dispatcher.bind("xkcd", search::Xkcd)?;
    dispatcher.bind("weather", search::Weather)?;
    dispatcher.bind("google", fun::Google)?;
    dispatcher.bind("remind", fun::Remind)?;
    dispatcher.bind("rng", fun::Rng::new(deps))?;
    dispatcher.bind("choose", fun::Choose)?;
    dispatcher.bind("answer", fun::Answer::new(deps))?;
    Ok(())
}

/// A fully wired roster: shared table, usage log, and a dispatcher with
/// every handler bound.
pub struct Roster {
    pub table: Arc<PatternTable>,
    pub stats: Arc<UsageLog>,
    pub dispatcher: Dispatcher,
}

/// Registers the whole roster and binds every handler in one call.
///
/// This is the front door the runtime uses: it composes [`register`] and
/// [`bind`] around freshly built table, log, and dispatcher instances.
///
/// # Errors
///
/// Any [`TableError`] means the roster is internally inconsistent and
/// startup must fail.
pub fn install(
    settings: RosterSettings,
    store: Arc<dyn UsageStore>,
    services: Capabilities,
) -> Result<Roster, TableError> {
    let mut table = PatternTable::new();
    register(&mut table)?;
    let table = Arc::new(table);

    let stats = Arc::new(UsageLog::new(
        Arc::clone(&table),
        store,
        settings.query_timeout,
    ));
    let mut dispatcher = Dispatcher::new(Arc::clone(&table), Arc::clone(&stats), services);
    let deps = CommandDeps {
        table: Arc::clone(&table),
        stats: Arc::clone(&stats),
        settings,
    };
    bind(&mut dispatcher, &deps)?;

    Ok(Roster {
        table,
        stats,
        dispatcher,
    })
}
