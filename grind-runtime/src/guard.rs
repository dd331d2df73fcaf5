//! Inbound handlers that run ahead of operator commands: inbound logging and the challenge guard.

use async_trait::async_trait;
use grind_core::{Handler, HandlerResponse, Message, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

use crate::challenge::{ClassifierCache, Verdict};
use crate::context::AutomationContext;
use crate::events::EventKind;
use crate::notifier::NotifierSet;
use crate::stats::Counter;

/// Logs each inbound message in before() and the chain's outcome in after(); always continues.
pub struct LoggingHandler;

#[async_trait]
impl Handler for LoggingHandler {
    #[instrument(skip(self, message))]
    async fn before(&self, message: &Message) -> Result<bool> {
        debug!(
            author_id = %message.author.id,
            channel_id = %message.channel.id,
            content = %message.content,
            embeds = message.embeds.len(),
            attachments = message.attachments.len(),
            "Received message"
        );
        Ok(true)
    }

    #[instrument(skip(self, message, response))]
    async fn after(&self, message: &Message, response: &HandlerResponse) -> Result<()> {
        debug!(message_id = %message.id, response = ?response, "Processed message");
        Ok(())
    }
}

/// Watches messages from the game bot for verification challenges and halts the identity.
///
/// Entering ChallengeDetected counts a detection and notifies the operator (best-effort). With a
/// solver configured and an image attached, the code is submitted and the identity resumes after
/// the settle delay; otherwise it stays halted until a manual resume.
pub struct ChallengeGuard {
    ctx: Arc<AutomationContext>,
    notifiers: NotifierSet,
    classifier: ClassifierCache,
}

impl ChallengeGuard {
    pub fn new(ctx: Arc<AutomationContext>, notifiers: NotifierSet) -> Self {
        Self {
            ctx,
            notifiers,
            classifier: ClassifierCache::new(),
        }
    }

    async fn on_challenge(&self, message: &Message, reason: &str) {
        let ctx = &self.ctx;
        let config = ctx.config().await;

        if ctx.interrupt.detect_challenge() {
            ctx.stats.incr(Counter::CaptchasDetected);
            error!(
                identity = %ctx.identity.id,
                reason = %reason,
                "Challenge detected, automations paused"
            );
            ctx.events
                .push(EventKind::ChallengeDetected, format!("challenge detected: {}", reason));

            let excerpt: String = message.content.chars().take(100).collect();
            let text = format!(
                "CHALLENGE DETECTED\nAccount: {}\nReason: {}\n{}",
                ctx.identity.shown_name(),
                reason,
                excerpt
            );
            self.notifiers.notify_all(&text).await;
        } else {
            debug!(identity = %ctx.identity.id, "Challenge already detected, ignoring repeat");
            return;
        }

        if !config.challenge.use_solver {
            return;
        }
        let Some(solver) = ctx.solver.as_ref() else {
            warn!("No challenge solver configured, waiting for manual resume");
            return;
        };
        let Some(image_url) = message.first_attachment_url() else {
            warn!("No image attached to challenge, waiting for manual resume");
            return;
        };

        info!(solver = solver.name(), "step: solving challenge");
        let Some(code) = solver.solve(image_url).await else {
            warn!(solver = solver.name(), "Solver returned no code, waiting for manual resume");
            return;
        };

        let command = format!("{} verify {}", config.game_prefix, code);
        if let Err(e) = ctx.send(&message.channel, &command).await {
            error!(error = %e, "Failed to submit challenge code");
            return;
        }
        ctx.stats.incr(Counter::CaptchasSolved);
        ctx.events.push(EventKind::ChallengeSolved, "challenge code submitted");
        ctx.interrupt
            .clear_challenge_after(Duration::from_secs(config.challenge.settle_secs));
    }
}

#[async_trait]
impl Handler for ChallengeGuard {
    #[instrument(skip(self, message), fields(identity = %self.ctx.identity.id))]
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        let config = self.ctx.config().await;
        if !message.is_from(&config.game_bot_id) {
            return Ok(HandlerResponse::Continue);
        }

        let classifier = self.classifier.get(&config.challenge);
        match classifier.classify(message, &self.ctx.identity) {
            Verdict::Challenge { reason } => {
                self.on_challenge(message, &reason).await;
                Ok(HandlerResponse::Stop)
            }
            Verdict::Clear | Verdict::NotAddressed => Ok(HandlerResponse::Continue),
        }
    }
}
