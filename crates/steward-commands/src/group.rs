//! Commands that shape the chat itself: titles, polls, appearance, pinned
//! messages, the shared tab, and member aliases.
//!
//! Mutations go through the platform handle or the group store; the handler
//! only ever reads the snapshot it was dispatched with.

use async_trait::async_trait;
use chrono::Local;
use rand::seq::SliceRandom;
use steward_core::foundation::capitalize;
use steward_core::{Attachment, CommandError, CommandHandler, DispatchContext};
use tracing::warn;

/// Hex value threads start out with before anyone customizes them.
const DEFAULT_COLOR: &str = "#0084ff";

// ─── title ───────────────────────────────────────────────────────────────────

/// `title {text}`
pub struct Title;

#[async_trait]
impl CommandHandler for Title {
    async fn handle(&self, ctx: DispatchContext) -> Result<(), CommandError> {
        if !ctx.group.is_group {
            return Err(CommandError::user("Cannot set title for non-group chats."));
        }
        let title = ctx.captures.non_empty(1).unwrap_or_default();
        ctx.services.platform.set_title(title, ctx.thread_id()).await?;
        Ok(())
    }
}

// ─── poll ────────────────────────────────────────────────────────────────────

/// `poll "{title}" {option1},{option2},…`
pub struct Poll;

#[async_trait]
impl CommandHandler for Poll {
    async fn handle(&self, ctx: DispatchContext) -> Result<(), CommandError> {
        if !ctx.group.is_group {
            return Err(CommandError::user("Cannot create a poll in a non-group chat."));
        }
        let title = ctx.captures.non_empty(1).unwrap_or_default();
        let options: Vec<String> = ctx
            .captures
            .non_empty(2)
            .map(|list| {
                list.split(',')
                    .map(|option| option.trim().to_string())
                    .filter(|option| !option.is_empty())
                    .collect()
            })
            .unwrap_or_default();
        ctx.services
            .platform
            .create_poll(title, &options, ctx.thread_id())
            .await?;
        Ok(())
    }
}

// ─── emoji ───────────────────────────────────────────────────────────────────

/// `emoji {emoji}`
///
/// The platform rejects invalid emoji; when that happens the stored one is
/// put back so the thread never ends up without an icon.
pub struct Emoji;

#[async_trait]
impl CommandHandler for Emoji {
    async fn handle(&self, ctx: DispatchContext) -> Result<(), CommandError> {
        let emoji = ctx.captures.non_empty(1).unwrap_or_default();
        if let Err(err) = ctx.services.platform.set_emoji(emoji, ctx.thread_id()).await {
            warn!(error = %err, "emoji change rejected, restoring the stored one");
            if let Some(stored) = &ctx.group.emoji {
                ctx.services.platform.set_emoji(stored, ctx.thread_id()).await?;
            }
        }
        Ok(())
    }
}

// ─── color ───────────────────────────────────────────────────────────────────

/// `color ({name|hex|random})`
pub struct Color;

#[async_trait]
impl CommandHandler for Color {
    async fn handle(&self, ctx: DispatchContext) -> Result<(), CommandError> {
        let palette = ctx.services.platform.palette();
        match ctx.captures.non_empty(1) {
            None => {
                let hex = ctx
                    .group
                    .color
                    .clone()
                    .unwrap_or_else(|| DEFAULT_COLOR.to_string());
                let name = palette
                    .iter()
                    .find(|swatch| swatch.code.eq_ignore_ascii_case(&hex))
                    .map(|swatch| swatch.name.clone())
                    .unwrap_or_else(|| "unnamed".to_string());
                ctx.reply(format!("The current chat color is {name} (hex value: {hex})")).await?;
            }
            Some(input) => {
                let code = if input.eq_ignore_ascii_case("random") {
                    palette
                        .choose(&mut rand::thread_rng())
                        .map(|swatch| swatch.code.clone())
                } else if input.starts_with('#') {
                    Some(input.to_string())
                } else {
                    palette
                        .iter()
                        .find(|swatch| swatch.name.eq_ignore_ascii_case(input))
                        .map(|swatch| swatch.code.clone())
                };
                let Some(code) = code else {
                    return Err(CommandError::user(
                        "Couldn't find this color. See help for accepted values.",
                    ));
                };
                let previous = ctx
                    .group
                    .color
                    .clone()
                    .unwrap_or_else(|| DEFAULT_COLOR.to_string());
                ctx.services.platform.set_color(&code, ctx.thread_id()).await?;
                ctx.reply(format!("Last color was {previous}.")).await?;
            }
        }
        Ok(())
    }
}

// ─── photo ───────────────────────────────────────────────────────────────────

/// `photo` with an attached image: replaces the group image.
pub struct Photo;

#[async_trait]
impl CommandHandler for Photo {
    async fn handle(&self, ctx: DispatchContext) -> Result<(), CommandError> {
        let Some(Attachment::Photo { url }) = ctx.message.first_photo() else {
            return Err(CommandError::user("This command only accepts photo attachments"));
        };
        ctx.services
            .platform
            .set_group_image(url, ctx.thread_id())
            .await?;
        Ok(())
    }
}

// ─── pin ─────────────────────────────────────────────────────────────────────

/// `pin ({message})`: shows the pinned message, or replaces it.
pub struct Pin;

#[async_trait]
impl CommandHandler for Pin {
    async fn handle(&self, ctx: DispatchContext) -> Result<(), CommandError> {
        match ctx.captures.non_empty(1) {
            None => {
                let text = ctx
                    .group
                    .pinned
                    .clone()
                    .unwrap_or_else(|| "No pinned messages in this chat.".to_string());
                ctx.reply(text).await?;
            }
            Some(message) => {
                let stored = format!(
                    "\"{message}\" – {} on {}",
                    ctx.sender_name(),
                    Local::now().format("%-m/%-d/%y")
                );
                ctx.services
                    .groups
                    .set_property("pinned", serde_json::Value::String(stored), &ctx.group)
                    .await?;
                ctx.reply(format!("Pinned new message to the chat: \"{message}\"")).await?;
            }
        }
        Ok(())
    }
}

// ─── tab ─────────────────────────────────────────────────────────────────────

/// `tab (add|subtract|split|clear) ({amount})`
pub struct Tab;

#[async_trait]
impl CommandHandler for Tab {
    async fn handle(&self, ctx: DispatchContext) -> Result<(), CommandError> {
        let current = ctx.group.tab;
        let amount = ctx.captures.float_or(2, 1.0);

        match ctx.captures.non_empty(1).map(str::to_lowercase).as_deref() {
            None => {
                let members = ctx.group.member_count().max(1) as f64;
                ctx.reply(format!(
                    "${current:.2} (${:.2} per person in this group)",
                    current / members
                ))
                .await?;
            }
            Some("split") => {
                let people = if ctx.captures.non_empty(2).is_some() {
                    amount.max(1.0)
                } else {
                    ctx.group.member_count().max(1) as f64
                };
                let word = if people == 1.0 { "person" } else { "people" };
                ctx.reply(format!(
                    "${current:.2}: ${:.2} per person for {people} {word}",
                    current / people
                ))
                .await?;
            }
            Some("clear") => {
                ctx.services
                    .groups
                    .set_property("tab", serde_json::Value::from(0.0), &ctx.group)
                    .await?;
                ctx.reply("Tab cleared.").await?;
            }
            Some(action) => {
                let next = if action == "subtract" {
                    current - amount
                } else {
                    current + amount
                };
                ctx.services
                    .groups
                    .set_property("tab", serde_json::Value::from(next), &ctx.group)
                    .await?;
                ctx.reply(format!("Tab updated to ${next:.2}.")).await?;
            }
        }
        Ok(())
    }
}

// ─── mute ────────────────────────────────────────────────────────────────────

/// `(un)mute`: flips the per-thread muted flag.
pub struct Mute;

#[async_trait]
impl CommandHandler for Mute {
    async fn handle(&self, ctx: DispatchContext) -> Result<(), CommandError> {
        let word = ctx.captures.group(1).unwrap_or("mute");
        let muted = word.eq_ignore_ascii_case("mute");
        ctx.services
            .groups
            .set_property("muted", serde_json::Value::Bool(muted), &ctx.group)
            .await?;
        ctx.reply(if muted { "Bot muted" } else { "Bot unmuted" }).await?;
        Ok(())
    }
}

// ─── alias ───────────────────────────────────────────────────────────────────

/// `alias (clear) {member} ({new alias})`
pub struct Alias;

#[async_trait]
impl CommandHandler for Alias {
    async fn handle(&self, ctx: DispatchContext) -> Result<(), CommandError> {
        let name = ctx.captures.user(2).unwrap_or_default();
        let display = capitalize(&name);
        if ctx.group.member_id(&name).is_none() {
            return Err(CommandError::user(format!("User {display} not found")));
        }

        if ctx.captures.non_empty(1).is_some() {
            let mut aliases = ctx.group.aliases.clone();
            aliases.remove(&name);
            let value = serde_json::to_value(&aliases).unwrap_or_default();
            ctx.services
                .groups
                .set_property("aliases", value, &ctx.group)
                .await?;
            ctx.reply(format!("Alias cleared for {display}.")).await?;
            return Ok(());
        }

        match ctx.captures.non_empty(3) {
            Some(alias) => {
                let mut aliases = ctx.group.aliases.clone();
                aliases.insert(name.clone(), alias.to_lowercase());
                let value = serde_json::to_value(&aliases).unwrap_or_default();
                ctx.services
                    .groups
                    .set_property("aliases", value, &ctx.group)
                    .await?;
                ctx.reply(format!("{display} can now be called \"{alias}\".")).await?;
            }
            None => {
                let text = match ctx.group.aliases.get(&name) {
                    Some(alias) => format!("{display} can also be called \"{alias}\"."),
                    None => format!("{display} does not have an alias."),
                };
                ctx.reply(text).await?;
            }
        }
        Ok(())
    }
}
