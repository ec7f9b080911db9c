//! Commands aimed at members: scores and votes, temporary removals, wake-up
//! bursts, directory search, and nicknames.
//!
//! Member captures arrive lowercased and resolve through the group snapshot,
//! so aliases work everywhere a first name does.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use steward_core::foundation::capitalize;
use steward_core::{CommandError, CommandHandler, DispatchContext, OutboundMessage};
use tracing::warn;

use crate::{CommandDeps, RosterSettings};

// ─── score ───────────────────────────────────────────────────────────────────

/// `score (board) ({member}) ({new score})`
pub struct Score;

impl Score {
    async fn board(ctx: &DispatchContext) -> Result<(), CommandError> {
        let mut rows: Vec<(String, i64)> = Vec::new();
        for (member, id) in &ctx.group.members {
            let score = ctx
                .services
                .groups
                .score(ctx.thread_id(), id)
                .await?
                .unwrap_or(0);
            let name = ctx
                .group
                .display_name(id)
                .map(str::to_string)
                .unwrap_or_else(|| capitalize(member));
            rows.push((name, score));
        }
        rows.sort_by(|a, b| b.1.cmp(&a.1));

        let mut text = format!("Rankings for {}:", ctx.group.name);
        for (place, (name, score)) in rows.iter().enumerate() {
            text.push_str(&format!("\n{}. {name}: {score}", place + 1));
        }
        ctx.reply(text).await?;
        Ok(())
    }

    async fn member(ctx: &DispatchContext) -> Result<(), CommandError> {
        let (id, display) = match ctx.captures.user(2) {
            Some(name) => {
                let id = ctx
                    .group
                    .member_id(&name)
                    .ok_or_else(|| {
                        CommandError::user(format!("User {} not found", capitalize(&name)))
                    })?
                    .clone();
                (id, capitalize(&name))
            }
            None => (ctx.sender().to_string(), ctx.sender_name().to_string()),
        };

        if ctx.captures.non_empty(3).is_some() {
            let points = ctx.captures.int_or(3, 0);
            ctx.services
                .groups
                .set_score(ctx.thread_id(), &id, points)
                .await?;
            ctx.reply(format!("{display}'s score updated to {points}.")).await?;
        } else {
            let current = ctx
                .services
                .groups
                .score(ctx.thread_id(), &id)
                .await?
                .unwrap_or(0);
            ctx.reply(format!("{display}'s current score is {current}.")).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl CommandHandler for Score {
    async fn handle(&self, ctx: DispatchContext) -> Result<(), CommandError> {
        if ctx.captures.non_empty(1).is_some() {
            Self::board(&ctx).await
        } else {
            Self::member(&ctx).await
        }
    }
}

// ─── vote ────────────────────────────────────────────────────────────────────

/// `vote (up|down) {member}`: moves a score by one point.
pub struct Vote;

#[async_trait]
impl CommandHandler for Vote {
    async fn handle(&self, ctx: DispatchContext) -> Result<(), CommandError> {
        let delta = match ctx.captures.group(1) {
            Some(direction) if direction.eq_ignore_ascii_case("down") => -1,
            _ => 1,
        };
        let name = ctx.captures.user(2).unwrap_or_default();
        let display = capitalize(&name);
        let id = ctx
            .group
            .member_id(&name)
            .ok_or_else(|| CommandError::user(format!("User {display} not found")))?
            .clone();

        let current = ctx
            .services
            .groups
            .score(ctx.thread_id(), &id)
            .await?
            .unwrap_or(0);
        let next = current + delta;
        match ctx.services.groups.set_score(ctx.thread_id(), &id, next).await {
            Ok(()) => {
                ctx.reply(format!("{display}'s current score is now {next}.")).await?;
            }
            Err(err) => {
                warn!(user = %id, error = %err, "score update failed");
                ctx.reply("Score update failed.").await?;
            }
        }
        Ok(())
    }
}

// ─── kick ────────────────────────────────────────────────────────────────────

/// `kick {member} ({seconds})`: removes, then re-adds after the delay.
pub struct Kick {
    settings: RosterSettings,
}

impl Kick {
    pub fn new(deps: &CommandDeps) -> Self {
        Self {
            settings: deps.settings.clone(),
        }
    }
}

#[async_trait]
impl CommandHandler for Kick {
    async fn handle(&self, ctx: DispatchContext) -> Result<(), CommandError> {
        let name = ctx.captures.user(1).unwrap_or_default();
        let id = ctx
            .group
            .member_id(&name)
            .ok_or_else(|| CommandError::user(format!("User {name} not recognized")))?
            .clone();
        let seconds = ctx
            .captures
            .int_or(2, self.settings.kick_revive_secs as i64)
            .max(0) as u64;

        ctx.services
            .platform
            .remove_member(&id, ctx.thread_id())
            .await?;

        let platform = Arc::clone(&ctx.services.platform);
        let thread = ctx.thread_id().to_string();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(seconds)).await;
            if let Err(err) = platform.add_member(&id, &thread).await {
                warn!(user = %id, error = %err, "could not restore kicked member");
            }
        });
        Ok(())
    }
}

// ─── purge ───────────────────────────────────────────────────────────────────

/// `purge` (admin, unlisted): empties the room, then restores everyone.
pub struct Purge {
    settings: RosterSettings,
}

impl Purge {
    pub fn new(deps: &CommandDeps) -> Self {
        Self {
            settings: deps.settings.clone(),
        }
    }
}

#[async_trait]
impl CommandHandler for Purge {
    async fn handle(&self, ctx: DispatchContext) -> Result<(), CommandError> {
        if !ctx.group.is_group {
            ctx.reply("There's nothing to purge here.").await?;
            return Ok(());
        }

        ctx.reply("This room will now be purged. Order will be restored shortly.").await?;
        tokio::time::sleep(Duration::from_secs(2)).await;

        let mut removed = Vec::new();
        for id in ctx.group.members.values() {
            if *id == self.settings.bot_id {
                continue;
            }
            match ctx.services.platform.remove_member(id, ctx.thread_id()).await {
                Ok(()) => removed.push(id.clone()),
                Err(err) => warn!(user = %id, error = %err, "purge removal failed"),
            }
        }

        let platform = Arc::clone(&ctx.services.platform);
        let messenger = Arc::clone(&ctx.services.messenger);
        let thread = ctx.thread_id().to_string();
        let revive = self.settings.purge_revive_secs;
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(revive)).await;
            for id in &removed {
                if let Err(err) = platform.add_member(id, &thread).await {
                    warn!(user = %id, error = %err, "could not restore purged member");
                }
            }
            if let Err(err) = messenger
                .send(OutboundMessage::text("Order has been restored."), &thread)
                .await
            {
                warn!(error = %err, "restoration notice undeliverable");
            }
        });
        Ok(())
    }
}

// ─── wakeup ──────────────────────────────────────────────────────────────────

/// `wakeup {member}`: a burst of direct messages, half a second apart.
pub struct Wakeup {
    settings: RosterSettings,
}

impl Wakeup {
    pub fn new(deps: &CommandDeps) -> Self {
        Self {
            settings: deps.settings.clone(),
        }
    }
}

#[async_trait]
impl CommandHandler for Wakeup {
    async fn handle(&self, ctx: DispatchContext) -> Result<(), CommandError> {
        let name = ctx.captures.user(1).unwrap_or_default();
        let display = capitalize(&name);
        let id = ctx
            .group
            .member_id(&name)
            .ok_or_else(|| CommandError::user(format!("User {display} not found")))?
            .clone();

        let repeats = self.settings.wakeup_repeats;
        for _ in 0..repeats {
            // A member's direct thread shares their user id.
            ctx.services
                .messenger
                .send(OutboundMessage::text("Wake up"), &id)
                .await?;
            tokio::time::sleep(Duration::from_millis(500)).await;
        }
        ctx.reply(format!("Messaged {display} {repeats} times")).await?;
        Ok(())
    }
}

// ─── add / search ────────────────────────────────────────────────────────────

/// `(add|search) ({results}) {name}`: directory search; add pulls the best
/// match into the group.
pub struct AddSearch;

#[async_trait]
impl CommandHandler for AddSearch {
    async fn handle(&self, ctx: DispatchContext) -> Result<(), CommandError> {
        let action = ctx.captures.group(1).unwrap_or("search").to_lowercase();
        let query = ctx.captures.non_empty(3).unwrap_or_default();

        let matches = ctx.services.platform.search_users(query).await?;
        if matches.is_empty() {
            return Err(CommandError::user(format!("No users found for \"{query}\"")));
        }

        if action == "add" {
            let best = &matches[0];
            ctx.services
                .platform
                .add_member(&best.id, ctx.thread_id())
                .await?;
            ctx.reply(format!("Added {}.", best.name)).await?;
        } else {
            let shown = ctx.captures.int_or(2, 1).max(1) as usize;
            let mut text = format!("Matches for \"{query}\":");
            for profile in matches.iter().take(shown) {
                text.push_str(&format!("\n{} ({})", profile.name, profile.id));
            }
            ctx.reply(text).await?;
        }
        Ok(())
    }
}

// ─── setnick / clearnick ─────────────────────────────────────────────────────

/// `setnick {member} {nickname}`
pub struct SetNick;

#[async_trait]
impl CommandHandler for SetNick {
    async fn handle(&self, ctx: DispatchContext) -> Result<(), CommandError> {
        let name = ctx.captures.user(1).unwrap_or_default();
        let id = ctx
            .group
            .member_id(&name)
            .ok_or_else(|| CommandError::user(format!("User {} not found", capitalize(&name))))?;
        let nickname = ctx.captures.non_empty(2).unwrap_or_default();
        ctx.services
            .platform
            .set_nickname(nickname, ctx.thread_id(), id)
            .await?;
        Ok(())
    }
}

/// `clearnick {member}`
pub struct ClearNick;

#[async_trait]
impl CommandHandler for ClearNick {
    async fn handle(&self, ctx: DispatchContext) -> Result<(), CommandError> {
        let name = ctx.captures.user(1).unwrap_or_default();
        let id = ctx
            .group
            .member_id(&name)
            .ok_or_else(|| CommandError::user(format!("User {} not found", capitalize(&name))))?;
        ctx.services
            .platform
            .set_nickname("", ctx.thread_id(), id)
            .await?;
        Ok(())
    }
}

// ─── christen ────────────────────────────────────────────────────────────────

/// `christen {name}` (admin, unlisted): renames the bot in this chat.
pub struct Christen {
    settings: RosterSettings,
}

impl Christen {
    pub fn new(deps: &CommandDeps) -> Self {
        Self {
            settings: deps.settings.clone(),
        }
    }
}

#[async_trait]
impl CommandHandler for Christen {
    async fn handle(&self, ctx: DispatchContext) -> Result<(), CommandError> {
        let name = ctx.captures.non_empty(1).unwrap_or_default();
        ctx.services
            .platform
            .set_nickname(name, ctx.thread_id(), &self.settings.bot_id)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Harness, PlatformCall};
    use steward_core::{DispatchOutcome, UserProfile};

    fn removals(harness: &Harness) -> Vec<String> {
        harness
            .platform
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                PlatformCall::RemoveMember { user, .. } => Some(user),
                _ => None,
            })
            .collect()
    }

    fn additions(harness: &Harness) -> Vec<String> {
        harness
            .platform
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                PlatformCall::AddMember { user, .. } => Some(user),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn score_board_ranks_members_by_points() {
        let harness = Harness::new();
        harness.groups.seed_score("t1", "100", 5);
        harness.groups.seed_score("t1", "200", 9);
        harness.groups.seed_score("t1", "300", 7);

        harness.run("score board").await;
        assert_eq!(
            harness.messenger.last_body(),
            "Rankings for The Test Bench:\n1. Alice Quinn: 9\n2. Bob Stone: 7\n3. Charlie Fox: 5"
        );
    }

    #[tokio::test]
    async fn score_lookup_defaults_to_zero() {
        let harness = Harness::new();
        harness.run("score alice").await;
        assert_eq!(harness.messenger.last_body(), "Alice's current score is 0.");
    }

    #[tokio::test]
    async fn score_set_overwrites_the_stored_points() {
        let harness = Harness::new();
        harness.run("score alice 42").await;
        assert_eq!(harness.messenger.last_body(), "Alice's score updated to 42.");
        assert_eq!(harness.groups.stored_score("t1", "200"), Some(42));
    }

    #[tokio::test]
    async fn bare_score_reads_the_sender() {
        let harness = Harness::new();
        harness.groups.seed_score("t1", "100", 3);
        harness.run("score").await;
        assert_eq!(harness.messenger.last_body(), "Charlie Fox's current score is 3.");
    }

    #[tokio::test]
    async fn vote_up_and_down_move_by_one() {
        let harness = Harness::new();
        harness.groups.seed_score("t1", "200", 5);

        harness.run("vote up alice").await;
        assert_eq!(harness.messenger.last_body(), "Alice's current score is now 6.");

        harness.run("vote down bob").await;
        assert_eq!(harness.messenger.last_body(), "Bob's current score is now -1.");
    }

    #[tokio::test]
    async fn vote_rejects_unknown_members() {
        let harness = Harness::new();
        let report = harness.run("vote up zed").await;
        assert!(matches!(report.outcome("vote"), Some(DispatchOutcome::Failed(_))));
        assert_eq!(harness.messenger.last_body(), "User Zed not found");
    }

    #[tokio::test(start_paused = true)]
    async fn kick_removes_then_restores_after_the_default_delay() {
        let harness = Harness::new();
        harness.run("kick alice").await;
        assert_eq!(removals(&harness), vec!["200".to_string()]);
        assert!(additions(&harness).is_empty());

        tokio::time::sleep(Duration::from_secs(harness.settings.kick_revive_secs + 1)).await;
        assert_eq!(additions(&harness), vec!["200".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn kick_honors_an_explicit_delay() {
        let harness = Harness::new();
        harness.run("kick bob 120").await;
        assert_eq!(removals(&harness), vec!["300".to_string()]);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(additions(&harness).is_empty());

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(additions(&harness), vec!["300".to_string()]);
    }

    #[tokio::test]
    async fn kick_resolves_aliases() {
        let harness = Harness::new();
        harness.run("kick al").await;
        assert_eq!(removals(&harness), vec!["200".to_string()]);
    }

    #[tokio::test]
    async fn kick_rejects_unknown_members() {
        let harness = Harness::new();
        let report = harness.run("kick zed").await;
        assert!(matches!(report.outcome("kick"), Some(DispatchOutcome::Failed(_))));
        assert_eq!(harness.messenger.last_body(), "User zed not recognized");
        assert!(removals(&harness).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn purge_empties_the_room_then_restores_everyone() {
        let harness = Harness::new();
        harness.run_admin("purge").await;

        assert_eq!(
            harness.messenger.bodies()[0],
            "This room will now be purged. Order will be restored shortly."
        );
        let mut removed = removals(&harness);
        removed.sort();
        assert_eq!(removed, ["100", "200", "300"]);
        assert!(additions(&harness).is_empty());

        tokio::time::sleep(Duration::from_secs(harness.settings.purge_revive_secs + 1)).await;
        let mut restored = additions(&harness);
        restored.sort();
        assert_eq!(restored, ["100", "200", "300"]);
        assert_eq!(harness.messenger.last_body(), "Order has been restored.");
    }

    #[tokio::test]
    async fn purge_needs_admin_rights() {
        let harness = Harness::new();
        let report = harness.run("purge").await;
        assert_eq!(report.outcome("purge"), Some(&DispatchOutcome::Denied));
        assert!(removals(&harness).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn wakeup_sends_the_configured_burst() {
        let harness = Harness::new();
        harness.run("wakeup alice").await;

        let sent = harness.messenger.sent();
        let burst: Vec<_> = sent.iter().filter(|s| s.thread == "200").collect();
        assert_eq!(burst.len(), harness.settings.wakeup_repeats as usize);
        assert_eq!(harness.messenger.last_body(), "Messaged Alice 10 times");
    }

    #[tokio::test]
    async fn search_lists_directory_matches() {
        let harness = Harness::new();
        *harness.platform.directory.lock() = vec![
            UserProfile {
                id: "900".into(),
                name: "John Smith".into(),
            },
            UserProfile {
                id: "901".into(),
                name: "Johnny B".into(),
            },
        ];

        harness.run("search 2 john").await;
        assert_eq!(
            harness.messenger.last_body(),
            "Matches for \"john\":\nJohn Smith (900)\nJohnny B (901)"
        );
    }

    #[tokio::test]
    async fn add_pulls_the_best_match_into_the_group() {
        let harness = Harness::new();
        *harness.platform.directory.lock() = vec![UserProfile {
            id: "900".into(),
            name: "John Smith".into(),
        }];

        harness.run("add john smith").await;
        assert_eq!(additions(&harness), vec!["900".to_string()]);
        assert_eq!(harness.messenger.last_body(), "Added John Smith.");
    }

    #[tokio::test]
    async fn search_with_no_matches_is_a_user_error() {
        let harness = Harness::new();
        let report = harness.run("search john").await;
        assert!(matches!(report.outcome("addsearch"), Some(DispatchOutcome::Failed(_))));
        assert_eq!(harness.messenger.last_body(), "No users found for \"john\"");
    }

    #[tokio::test]
    async fn setnick_targets_the_resolved_member() {
        let harness = Harness::new();
        harness.run("setnick alice Allie the Great").await;
        assert_eq!(
            harness.platform.calls(),
            vec![PlatformCall::Nickname {
                nickname: "Allie the Great".into(),
                thread: "t1".into(),
                user: "200".into(),
            }]
        );
    }

    #[tokio::test]
    async fn clearnick_sets_an_empty_nickname() {
        let harness = Harness::new();
        harness.run("clearnick bob").await;
        assert_eq!(
            harness.platform.calls(),
            vec![PlatformCall::Nickname {
                nickname: String::new(),
                thread: "t1".into(),
                user: "300".into(),
            }]
        );
    }

    #[tokio::test]
    async fn christen_renames_the_bot_itself() {
        let harness = Harness::new();
        harness.run_admin("christen Jeeves").await;
        assert_eq!(
            harness.platform.calls(),
            vec![PlatformCall::Nickname {
                nickname: "Jeeves".into(),
                thread: "t1".into(),
                user: harness.settings.bot_id.clone(),
            }]
        );
    }
}
