//! Diversions: echoes and quotes, search handoffs, reminders, and the random
//! generators.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Local;
use rand::Rng as _;
use rand::seq::SliceRandom;
use steward_core::{CommandError, CommandHandler, DispatchContext, Mention, OutboundMessage};
use tracing::warn;

use crate::{CommandDeps, RosterSettings};

// ─── echo / quote ────────────────────────────────────────────────────────────

/// `echo {message}` repeats verbatim; `quote {message}` adds attribution.
pub struct Echo;

#[async_trait]
impl CommandHandler for Echo {
    async fn handle(&self, ctx: DispatchContext) -> Result<(), CommandError> {
        let word = ctx.captures.group(1).unwrap_or("echo");
        let message = ctx.captures.non_empty(2).unwrap_or_default();
        let text = if word.eq_ignore_ascii_case("quote") {
            format!(
                "\"{message}\" – {}\n{}",
                ctx.sender_name(),
                Local::now().format("%A, %B %-d, %Y")
            )
        } else {
            message.to_string()
        };
        ctx.reply(text).await?;
        Ok(())
    }
}

// ─── google ──────────────────────────────────────────────────────────────────

/// `google {query}`: hands the query off as a search link.
pub struct Google;

#[async_trait]
impl CommandHandler for Google {
    async fn handle(&self, ctx: DispatchContext) -> Result<(), CommandError> {
        let query = ctx.captures.non_empty(1).unwrap_or_default();
        let url = format!(
            "https://www.google.com/search?q={}",
            query.split_whitespace().collect::<Vec<_>>().join("+")
        );
        ctx.send(OutboundMessage::link(url.clone(), url)).await?;
        Ok(())
    }
}

// ─── remind ──────────────────────────────────────────────────────────────────

/// `remind {minutes} {message}`: mentions the sender after the delay.
pub struct Remind;

#[async_trait]
impl CommandHandler for Remind {
    async fn handle(&self, ctx: DispatchContext) -> Result<(), CommandError> {
        let minutes = ctx.captures.int_or(1, 1).max(0);
        let message = ctx.captures.non_empty(2).unwrap_or_default().to_string();

        let wait = if minutes == 1 {
            "1 minute".to_string()
        } else {
            format!("{minutes} minutes")
        };
        ctx.reply(format!("I'll remind you in {wait}.")).await?;

        // The timer outlives the dispatch; only the messenger handle rides
        // along.
        let messenger = Arc::clone(&ctx.services.messenger);
        let thread = ctx.thread_id().to_string();
        let user = ctx.sender().to_string();
        let handle = format!("@{}", ctx.sender_name());
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(minutes as u64 * 60)).await;
            let body = format!("Reminder for {handle}: {message}");
            let mention = Mention {
                user,
                handle: handle.clone(),
            };
            if let Err(err) = messenger.send_with_mentions(body, vec![mention], &thread).await {
                warn!(error = %err, "reminder undeliverable");
            }
        });
        Ok(())
    }
}

// ─── rng ─────────────────────────────────────────────────────────────────────

/// `rng ({lower}) ({upper})` with configured default bounds.
pub struct Rng {
    settings: RosterSettings,
}

impl Rng {
    pub fn new(deps: &CommandDeps) -> Self {
        Self {
            settings: deps.settings.clone(),
        }
    }
}

#[async_trait]
impl CommandHandler for Rng {
    async fn handle(&self, ctx: DispatchContext) -> Result<(), CommandError> {
        let lower = ctx.captures.int_or(1, self.settings.rng_lower);
        let upper = ctx.captures.int_or(2, self.settings.rng_upper);
        let (lower, upper) = if lower <= upper { (lower, upper) } else { (upper, lower) };

        let value = rand::thread_rng().gen_range(lower..=upper);
        let range = (upper - lower + 1) as f64;
        let chance = (1.0 / range * 100.0 * 100.0).round() / 100.0;
        ctx.reply(format!(
            "{value}\n\nWith bounds of ({lower}, {upper}), the chances of receiving this result \
             were {chance}%"
        ))
        .await?;
        Ok(())
    }
}

// ─── choose ──────────────────────────────────────────────────────────────────

/// `choose {option1},{option2},…`
pub struct Choose;

#[async_trait]
impl CommandHandler for Choose {
    async fn handle(&self, ctx: DispatchContext) -> Result<(), CommandError> {
        let list = ctx.captures.non_empty(1).unwrap_or_default();
        let options: Vec<&str> = list
            .split(',')
            .map(str::trim)
            .filter(|option| !option.is_empty())
            .collect();
        let pick = options
            .choose(&mut rand::thread_rng())
            .ok_or_else(|| {
                CommandError::user("Give me some comma-separated options to choose from.")
            })?;
        ctx.reply(*pick).await?;
        Ok(())
    }
}

// ─── answer ──────────────────────────────────────────────────────────────────

/// `(answer|ask) {question}`: draws from the configured phrase list.
pub struct Answer {
    settings: RosterSettings,
}

impl Answer {
    pub fn new(deps: &CommandDeps) -> Self {
        Self {
            settings: deps.settings.clone(),
        }
    }
}

#[async_trait]
impl CommandHandler for Answer {
    async fn handle(&self, ctx: DispatchContext) -> Result<(), CommandError> {
        let pick = self
            .settings
            .answers
            .choose(&mut rand::thread_rng())
            .cloned()
            .unwrap_or_else(|| "Ask again later.".to_string());
        ctx.reply(pick).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Harness;

    #[tokio::test]
    async fn echo_repeats_verbatim() {
        let harness = Harness::new();
        harness.run("echo Hello there").await;
        assert_eq!(harness.messenger.last_body(), "Hello there");
    }

    #[tokio::test]
    async fn quote_adds_attribution_and_date() {
        let harness = Harness::new();
        harness.run("quote Talk is cheap").await;

        let body = harness.messenger.last_body();
        assert!(body.starts_with("\"Talk is cheap\" – Charlie Fox\n"));
        // Second line is the long-form date.
        assert!(body.lines().nth(1).is_some_and(|line| line.contains(", 2")));
    }

    #[tokio::test]
    async fn google_links_the_query() {
        let harness = Harness::new();
        harness.run("google how to exit vim").await;

        let sent = harness.messenger.sent();
        assert!(matches!(
            &sent[0].message,
            OutboundMessage::Link { url, .. }
                if url == "https://www.google.com/search?q=how+to+exit+vim"
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn remind_confirms_then_mentions_later() {
        let harness = Harness::new();
        harness.run("remind 1 check the oven").await;
        assert_eq!(harness.messenger.last_body(), "I'll remind you in 1 minute.");

        tokio::time::sleep(Duration::from_secs(61)).await;

        let sent = harness.messenger.sent();
        let last = sent.last().expect("reminder should have fired");
        assert_eq!(last.thread, "t1");
        assert_eq!(
            last.message,
            OutboundMessage::Text("Reminder for @Charlie Fox: check the oven".into())
        );
        assert_eq!(last.mentions.len(), 1);
        assert_eq!(last.mentions[0].user, "100");
        assert_eq!(last.mentions[0].handle, "@Charlie Fox");
    }

    #[tokio::test]
    async fn rng_with_pinned_bounds_is_deterministic() {
        let harness = Harness::new();
        harness.run("rng 5 5").await;
        assert_eq!(
            harness.messenger.last_body(),
            "5\n\nWith bounds of (5, 5), the chances of receiving this result were 100%"
        );
    }

    #[tokio::test]
    async fn rng_defaults_to_the_configured_bounds() {
        let harness = Harness::new();
        harness.run("rng").await;

        let body = harness.messenger.last_body();
        let value: i64 = body
            .lines()
            .next()
            .and_then(|line| line.parse().ok())
            .expect("first line should be the drawn number");
        assert!((1..=100).contains(&value));
        assert!(body.ends_with(
            "With bounds of (1, 100), the chances of receiving this result were 1%"
        ));
    }

    #[tokio::test]
    async fn choose_picks_one_of_the_options() {
        let harness = Harness::new();
        harness.run("choose pizza").await;
        assert_eq!(harness.messenger.last_body(), "pizza");

        harness.run("choose salad, sushi").await;
        let body = harness.messenger.last_body();
        assert!(body == "salad" || body == "sushi");
    }

    #[tokio::test]
    async fn answer_draws_from_the_configured_phrases() {
        let harness = Harness::new();
        harness.run("ask will it rain tomorrow").await;
        let body = harness.messenger.last_body();
        assert!(harness.settings.answers.contains(&body));
    }
}
