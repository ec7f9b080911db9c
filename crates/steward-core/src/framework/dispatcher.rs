//! Command dispatcher for the Steward core.
//!
//! The dispatcher walks a [`MatchSet`] in registration order and, for every
//! matched command:
//!
//! 1. Applies the admin and attachment gates (a failed gate soft-denies the
//!    command and moves on, it never aborts the message)
//! 2. Records a usage event (a failing statistics store is logged and
//!    swallowed, the handler still runs)
//! 3. Builds an owned [`DispatchContext`] and collects the handler's future
//!
//! The collected futures then run side by side, so one handler awaiting a
//! slow service never delays its siblings. Each handler failure is caught at
//! the boundary, rendered into a user-facing line on the originating thread,
//! and reported; the other commands of the same message are unaffected.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use tracing::{Level, debug, error, span, warn};

use crate::foundation::context::{DispatchContext, MessageContext};
use crate::foundation::error::{
    AttachmentRequiredError, AuthorizationError, CommandError, TableError,
};
use crate::framework::matcher::MatchSet;
use crate::framework::stats::UsageLog;
use crate::framework::table::PatternTable;
use crate::integration::{Capabilities, OutboundMessage};

/// Sent to the thread when a non-admin invokes an admin-only command.
const ADMIN_DENIAL: &str = "You need admin rights to use that command.";

/// Sent to the thread when an attachment-gated command arrives bare.
const ATTACHMENT_PROMPT: &str = "This command requires a photo attachment.";

/// The business logic of one command.
///
/// Handlers receive an owned context snapshot and report failure through
/// [`CommandError`]; the dispatcher takes care of logging and the user-facing
/// error line.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Executes the command.
    async fn handle(&self, ctx: DispatchContext) -> Result<(), CommandError>;
}

/// How a single matched command ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The handler ran to completion.
    Completed,
    /// The admin gate stopped the command.
    Denied,
    /// The attachment gate stopped the command.
    MissingAttachment,
    /// The handler returned an error (already rendered to the thread).
    Failed(String),
}

/// Per-command outcomes for one dispatched message, in dispatch order.
#[derive(Debug, Clone, Default)]
pub struct DispatchReport {
    outcomes: Vec<(String, DispatchOutcome)>,
}

impl DispatchReport {
    /// Returns `true` if nothing was dispatched.
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Number of commands dispatched.
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Iterates (key, outcome) pairs in dispatch order.
    pub fn iter(&self) -> impl Iterator<Item = &(String, DispatchOutcome)> {
        self.outcomes.iter()
    }

    /// The outcome recorded for a command key.
    pub fn outcome(&self, key: &str) -> Option<&DispatchOutcome> {
        self.outcomes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, o)| o)
    }

    /// Number of commands that ran to completion.
    pub fn completed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| *o == DispatchOutcome::Completed)
            .count()
    }
}

/// Routes matched commands through gates, usage recording, and handlers.
pub struct Dispatcher {
    table: Arc<PatternTable>,
    stats: Arc<UsageLog>,
    services: Capabilities,
    handlers: HashMap<String, Arc<dyn CommandHandler>>,
}

impl Dispatcher {
    /// Creates a dispatcher over a finished table.
    pub fn new(table: Arc<PatternTable>, stats: Arc<UsageLog>, services: Capabilities) -> Self {
        Self {
            table,
            stats,
            services,
            handlers: HashMap::new(),
        }
    }

    /// Binds a handler to a registered command key.
    ///
    /// # Errors
    ///
    /// [`TableError::UnknownCommand`] if the key is unregistered;
    /// [`TableError::DuplicateKey`] if the key is already bound.
    pub fn bind(
        &mut self,
        key: impl Into<String>,
        handler: impl CommandHandler + 'static,
    ) -> Result<(), TableError> {
        let key = key.into();
        if !self.table.contains(&key) {
            return Err(TableError::UnknownCommand { key });
        }
        if self.handlers.contains_key(&key) {
            return Err(TableError::DuplicateKey { key });
        }
        self.handlers.insert(key, Arc::new(handler));
        Ok(())
    }

    /// Registered keys that no handler has been bound to.
    ///
    /// The runtime treats a non-empty answer as a startup failure.
    pub fn unbound_keys(&self) -> Vec<String> {
        self.table
            .all()
            .filter(|def| !self.handlers.contains_key(def.key()))
            .map(|def| def.key().to_string())
            .collect()
    }

    /// Dispatches every match of one message.
    pub async fn dispatch(&self, matches: &MatchSet, ctx: &MessageContext) -> DispatchReport {
        let span = span!(
            Level::DEBUG,
            "dispatch",
            thread = %ctx.message.thread_id,
            matches = matches.len()
        );
        let _enter = span.enter();

        let mut slots: Vec<(String, Option<DispatchOutcome>)> = Vec::with_capacity(matches.len());
        let mut jobs: Vec<(usize, Arc<dyn CommandHandler>, DispatchContext)> = Vec::new();

        for result in matches.iter() {
            let key = result.command();
            let definition = match self.table.lookup(key) {
                Ok(def) => def,
                Err(err) => {
                    warn!(command = %key, error = %err, "match for unregistered command");
                    slots.push((key.to_string(), Some(DispatchOutcome::Failed(err.to_string()))));
                    continue;
                }
            };

            if definition.requires_admin() && !ctx.is_admin {
                let denial = AuthorizationError {
                    key: key.to_string(),
                };
                debug!(sender = %ctx.message.sender, error = %denial, "admin gate denied");
                self.notify(ctx, ADMIN_DENIAL).await;
                slots.push((key.to_string(), Some(DispatchOutcome::Denied)));
                continue;
            }

            if definition.requires_attachment() && ctx.message.first_photo().is_none() {
                let denial = AttachmentRequiredError {
                    key: key.to_string(),
                };
                debug!(error = %denial, "attachment gate denied");
                self.notify(ctx, ATTACHMENT_PROMPT).await;
                slots.push((key.to_string(), Some(DispatchOutcome::MissingAttachment)));
                continue;
            }

            // Recorded before the handler runs and regardless of how it ends;
            // a failing store never stops the command.
            if let Err(err) = self.stats.record(key, &ctx.message.sender).await {
                warn!(command = %key, error = %err, "usage recording failed");
            }

            let handler = match self.handlers.get(key) {
                Some(h) => Arc::clone(h),
                None => {
                    warn!(command = %key, "no handler bound");
                    slots.push((
                        key.to_string(),
                        Some(DispatchOutcome::Failed("no handler bound".into())),
                    ));
                    continue;
                }
            };

            let dctx = DispatchContext {
                command: key.to_string(),
                captures: result.clone(),
                message: ctx.message.clone(),
                group: ctx.group.clone(),
                is_admin: ctx.is_admin,
                services: self.services.clone(),
            };
            slots.push((key.to_string(), None));
            jobs.push((slots.len() - 1, handler, dctx));
        }

        let settled = join_all(jobs.into_iter().map(|(slot, handler, dctx)| {
            let messenger = Arc::clone(&self.services.messenger);
            let thread = ctx.message.thread_id.clone();
            async move {
                let key = dctx.command.clone();
                let outcome = match handler.handle(dctx).await {
                    Ok(()) => DispatchOutcome::Completed,
                    Err(err) => {
                        error!(command = %key, error = %err, "command failed");
                        let note = err.user_message();
                        if let Err(send_err) =
                            messenger.send(OutboundMessage::text(note), &thread).await
                        {
                            warn!(command = %key, error = %send_err, "error notice undeliverable");
                        }
                        DispatchOutcome::Failed(err.to_string())
                    }
                };
                (slot, outcome)
            }
        }))
        .await;

        for (slot, outcome) in settled {
            slots[slot].1 = Some(outcome);
        }

        DispatchReport {
            outcomes: slots
                .into_iter()
                .map(|(key, outcome)| {
                    let outcome = outcome
                        .unwrap_or_else(|| DispatchOutcome::Failed("handler never settled".into()));
                    (key, outcome)
                })
                .collect(),
        }
    }

    async fn notify(&self, ctx: &MessageContext, body: &str) {
        if let Err(err) = self
            .services
            .messenger
            .send(OutboundMessage::text(body), &ctx.message.thread_id)
            .await
        {
            warn!(error = %err, "notice undeliverable");
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("command_count", &self.table.len())
            .field("handler_count", &self.handlers.len())
            .finish()
    }
}
