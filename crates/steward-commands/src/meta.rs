//! Commands about the bot itself: the help system, usage statistics, owner
//! announcements, and bug reports.
//!
//! Help and stats read the same pattern table the matcher runs on, so their
//! listings can never drift from what actually dispatches.

use async_trait::async_trait;
use chrono::Local;
use steward_core::framework::command::CommandDefinition;
use steward_core::{CommandError, CommandHandler, DispatchContext, OutboundMessage};
use tracing::warn;

use crate::CommandDeps;

fn pretty_name(def: &CommandDefinition) -> &str {
    def.display_names()
        .first()
        .map(String::as_str)
        .unwrap_or(def.key())
}

fn times(n: u64) -> &'static str {
    if n == 1 { "time" } else { "times" }
}

// ─── help ────────────────────────────────────────────────────────────────────

/// `help ({command})`
pub struct Help {
    deps: CommandDeps,
}

impl Help {
    pub fn new(deps: &CommandDeps) -> Self {
        Self { deps: deps.clone() }
    }

    async fn entry(&self, query: &str) -> Result<String, CommandError> {
        let def = self
            .deps
            .table
            .find_by_alias(query)
            .ok_or_else(|| CommandError::user(format!("Help entry not found for \"{query}\"")))?;

        let pretty = pretty_name(&def);
        let trigger = &self.deps.settings.trigger_word;
        let description = if def.description().is_empty() {
            def.short_description().unwrap_or_default()
        } else {
            def.description()
        };

        let mut text = format!(
            "Entry for command \"{pretty}\":\n{description}\n\nSyntax: {trigger} {}",
            def.syntax_text()
        );

        match def.examples() {
            [] => {}
            [example] => {
                text.push_str(&format!("\n\nExample: {trigger} {example}"));
            }
            examples => {
                let lines: Vec<String> =
                    examples.iter().map(|e| format!("{trigger} {e}")).collect();
                text.push_str(&format!("\n\nExamples:\n{}", lines.join("\n")));
            }
        }

        // The entry stays useful without its usage numbers.
        match self.deps.stats.stats(def.key()).await {
            Ok(stats) => {
                text.push_str(&format!(
                    "\n\nThis command has been used {} {}, representing {:.3}% of all invocations.",
                    stats.count,
                    times(stats.count),
                    stats.percentage()
                ));
            }
            Err(err) => warn!(command = %def.key(), error = %err, "usage numbers unavailable"),
        }

        if def.requires_attachment() {
            text.push_str("\n\n(This command accepts attachments)");
        }
        if def.requires_admin() {
            text.push_str("\n\n(This command requires admin privileges)");
        }
        if def.is_experimental() {
            text.push_str("\n\n(This command is experimental)");
        }
        Ok(text)
    }

    fn listing(&self) -> String {
        let settings = &self.deps.settings;
        let trigger = &settings.trigger_word;
        let mut text = format!(
            "Quick help for {}:\n\nPrecede these commands with \"{trigger}\":\n",
            settings.bot_short_name
        );
        for def in self.deps.table.all().filter(|def| def.is_listed()) {
            text.push_str(def.syntax_text());
            if let Some(short) = def.short_description() {
                text.push_str(&format!(": {short}"));
            }
            if def.requires_admin() {
                text.push_str(" [ADMIN]");
            }
            text.push_str("\n------------------\n");
        }
        text.push_str(&format!(
            "Contact {} with any questions, or use \"{trigger} bug\" to report bugs directly.\n\n\
             Tip: for more detailed descriptions, use \"{trigger} help {{command}}\"",
            settings.owner_name
        ));
        text
    }
}

#[async_trait]
impl CommandHandler for Help {
    async fn handle(&self, ctx: DispatchContext) -> Result<(), CommandError> {
        let text = match ctx.captures.non_empty(1) {
            Some(query) => self.entry(query).await?,
            None => self.listing(),
        };
        ctx.reply(text).await?;
        Ok(())
    }
}

// ─── stats ───────────────────────────────────────────────────────────────────

/// `stats ({command})`
pub struct Stats {
    deps: CommandDeps,
}

impl Stats {
    pub fn new(deps: &CommandDeps) -> Self {
        Self { deps: deps.clone() }
    }

    async fn single(&self, ctx: &DispatchContext, query: &str) -> Result<String, CommandError> {
        let def = self
            .deps
            .table
            .find_by_alias(query)
            .ok_or_else(|| CommandError::user(format!("Entry not found for {query}")))?;
        let aggregate = self.deps.stats.aggregate(def.key()).await?;

        let calls = if aggregate.total == 1 { "call" } else { "calls" };
        let mut text = format!(
            "'{}' has been used {} {} out of a total of {} {calls}, representing {:.3}% of all \
             bot invocations.\n\nIt was used {} {} within the last day and {} {} within the last \
             month.",
            pretty_name(&def),
            aggregate.count,
            times(aggregate.count),
            aggregate.total,
            aggregate.perc,
            aggregate.day,
            times(aggregate.day),
            aggregate.month,
            times(aggregate.month),
        );
        if let Some(top) = aggregate.top_user() {
            let name = ctx.group.display_name(&top.user).unwrap_or("not in this chat");
            text.push_str(&format!("\n\nIts most prolific user is {name}."));
        }
        Ok(text)
    }

    async fn listing(&self) -> String {
        let mut rows = self.deps.stats.all_stats().await;
        rows.sort_by(|a, b| {
            b.1.perc
                .partial_cmp(&a.1.perc)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut text = String::from("Command: % of total usage | # today | # this month");
        for (key, aggregate) in rows {
            let pretty = self
                .deps
                .table
                .lookup(&key)
                .map(|def| pretty_name(&def).to_string())
                .unwrap_or(key);
            text.push_str(&format!(
                "\n{pretty}: {:.3}% | {} | {}",
                aggregate.perc, aggregate.day, aggregate.month
            ));
        }
        text
    }
}

#[async_trait]
impl CommandHandler for Stats {
    async fn handle(&self, ctx: DispatchContext) -> Result<(), CommandError> {
        let text = match ctx.captures.non_empty(1) {
            Some(query) => self.single(&ctx, query).await?,
            None => self.listing().await,
        };
        ctx.reply(text).await?;
        Ok(())
    }
}

// ─── clearstats ──────────────────────────────────────────────────────────────

/// `clearstats`, admin-only.
pub struct ClearStats {
    deps: CommandDeps,
}

impl ClearStats {
    pub fn new(deps: &CommandDeps) -> Self {
        Self { deps: deps.clone() }
    }
}

#[async_trait]
impl CommandHandler for ClearStats {
    async fn handle(&self, ctx: DispatchContext) -> Result<(), CommandError> {
        self.deps.stats.reset_all().await?;
        ctx.reply("Usage statistics cleared.").await?;
        Ok(())
    }
}

// ─── psa ─────────────────────────────────────────────────────────────────────

/// `psa {message}`, admin-only broadcast to every known thread.
pub struct Psa {
    deps: CommandDeps,
}

impl Psa {
    pub fn new(deps: &CommandDeps) -> Self {
        Self { deps: deps.clone() }
    }
}

#[async_trait]
impl CommandHandler for Psa {
    async fn handle(&self, ctx: DispatchContext) -> Result<(), CommandError> {
        let message = ctx.captures.non_empty(1).unwrap_or_default();
        let body = format!(
            "\"{message}\"\n\nThis has been a public service announcement from {}.",
            self.deps.settings.owner_short_name
        );
        // One unreachable thread must not silence the rest.
        for thread in ctx.services.groups.known_threads().await? {
            if let Err(err) = ctx
                .services
                .messenger
                .send(OutboundMessage::text(body.clone()), &thread)
                .await
            {
                warn!(thread = %thread, error = %err, "announcement undeliverable");
            }
        }
        Ok(())
    }
}

// ─── bug ─────────────────────────────────────────────────────────────────────

/// `bug {message}`: forwards the report with chat context to the owner.
pub struct Bug {
    deps: CommandDeps,
}

impl Bug {
    pub fn new(deps: &CommandDeps) -> Self {
        Self { deps: deps.clone() }
    }
}

#[async_trait]
impl CommandHandler for Bug {
    async fn handle(&self, ctx: DispatchContext) -> Result<(), CommandError> {
        let message = ctx.captures.non_empty(1).unwrap_or_default();
        let now = Local::now();
        let info = serde_json::to_string(&ctx.group).unwrap_or_default();
        let report = format!(
            "-------BUG-------\nMessage: {message}\nSender: {}\nTime: {} ({})\nGroup: {}\nID: \
             {}\nInfo: {info}",
            ctx.sender_name(),
            now.format("%-I:%M %p"),
            now.format("%A, %B %-d"),
            ctx.group.name,
            ctx.thread_id(),
        );

        let settings = &self.deps.settings;
        let reply = match ctx
            .services
            .messenger
            .send(OutboundMessage::text(report), &settings.owner_thread)
            .await
        {
            Ok(()) => format!("Report sent to {}.", settings.owner_short_name),
            Err(err) => {
                warn!(error = %err, "bug report undeliverable");
                format!(
                    "Report could not be sent; please message {} directly.",
                    settings.owner_short_name
                )
            }
        };
        ctx.reply(reply).await?;
        Ok(())
    }
}
