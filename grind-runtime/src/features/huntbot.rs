//! Unattended hunting sub-bot.
//!
//! Per eligible cycle: `Idle -> Checking -> AlreadyActive | NeedsStart`, and for NeedsStart
//! `AwaitingChallenge -> Solving -> Started`. Cross-cycle state (`next_eligible_at`,
//! `processing`) lives in [`HuntingStates`](crate::hunt_state::HuntingStates); the
//! [`HuntGuard`](crate::hunt_state::HuntGuard) releases `processing` on every exit path.

use async_trait::async_trait;
use grind_core::{Channel, Message, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info, instrument, warn};

use super::{channel_of, from_game};
use crate::config::AccountConfig;
use crate::context::AutomationContext;
use crate::pacing::CooldownWindow;
use crate::scheduler::Automation;
use crate::stats::Counter;

const STATUS_TIMEOUT: Duration = Duration::from_secs(10);
const CHALLENGE_TIMEOUT: Duration = Duration::from_secs(15);
const BEFORE_START: Duration = Duration::from_secs(2);
/// Slack added after the remaining hunt time before checking again.
const RECHECK_JITTER: CooldownWindow = CooldownWindow::from_secs(60, 300);
/// Longest remaining time taken at face value; anything beyond counts as unreadable.
const MAX_REMAINING: Duration = Duration::from_secs(30 * 24 * 3600);

static EMBED_REMAINING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)IN\s((\d+)H\s)?(\d+)M").expect("remaining pattern is valid")
});
static TEXT_REMAINING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)IN\s*(?:(\d+)\s*H\s*)?(\d+)\s*M").expect("remaining pattern is valid")
});
static ESSENCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)essence\D{0,20}([\d,]+)").expect("essence pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HuntPhase {
    Idle,
    Checking,
    AlreadyActive,
    NeedsStart,
    AwaitingChallenge,
    Solving,
    Started,
}

impl fmt::Display for HuntPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// What a status reply says about the sub-bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HuntStatus {
    Active { remaining: Duration },
    /// Hunting, but the remaining time could not be read.
    ActiveUnknown,
    Inactive,
}

fn remaining_from(caps: regex::Captures<'_>, hours: usize, minutes: usize) -> Option<Duration> {
    let h: u64 = caps
        .get(hours)
        .map_or(Ok(0), |m| m.as_str().parse())
        .ok()?;
    let m: u64 = caps.get(minutes)?.as_str().parse().ok()?;
    let secs = h.checked_mul(3600)?.checked_add(m.checked_mul(60)?)?;
    Some(Duration::from_secs(secs)).filter(|d| *d <= MAX_REMAINING)
}

/// Reads a status reply. An embed with a "currently hunting" field, or plain text containing
/// "I AM STILL HUNTING", means active.
pub fn parse_hunt_status(message: &Message) -> HuntStatus {
    if let Some(embed) = message.embeds.first() {
        let Some(field) = embed.field_containing("currently hunting") else {
            return HuntStatus::Inactive;
        };
        return EMBED_REMAINING_RE
            .captures(&field.value)
            .and_then(|caps| remaining_from(caps, 2, 3))
            .map_or(HuntStatus::ActiveUnknown, |remaining| HuntStatus::Active { remaining });
    }
    if message.content.contains("I AM STILL HUNTING") {
        return TEXT_REMAINING_RE
            .captures(&message.content)
            .and_then(|caps| remaining_from(caps, 1, 2))
            .map_or(HuntStatus::ActiveUnknown, |remaining| HuntStatus::Active { remaining });
    }
    HuntStatus::Inactive
}

/// Essence balance shown in a status reply, if any.
pub fn parse_essence(message: &Message) -> Option<u64> {
    let text = format!("{}\n{}", message.content, message.embed_text());
    let caps = ESSENCE_RE.captures(&text)?;
    caps.get(1)?.as_str().replace(',', "").parse().ok()
}

pub struct HuntBotAutomation {
    window: CooldownWindow,
}

impl HuntBotAutomation {
    pub fn new(window: CooldownWindow) -> Self {
        Self { window }
    }
}

fn phase(identity: &str, phase: HuntPhase) {
    debug!(identity = %identity, phase = %phase, "huntbot phase");
}

/// Best-effort: spends essence on the configured trait. Failures are logged only.
async fn upgrade_trait(
    ctx: &AutomationContext,
    config: &AccountConfig,
    channel: &Channel,
    status: &Message,
) {
    let Some(trait_name) = config.huntbot.upgrade_trait.as_deref() else {
        return;
    };
    let Some(essence) = parse_essence(status).filter(|e| *e > 0) else {
        debug!("No essence to spend");
        return;
    };
    let command = format!("{} upgrade {} {}", config.game_prefix, trait_name, essence);
    if let Err(e) = ctx.send(channel, &command).await {
        warn!(error = %e, "Essence upgrade failed");
    }
}

#[async_trait]
impl Automation for HuntBotAutomation {
    fn name(&self) -> &str {
        "huntbot"
    }

    fn enabled(&self, config: &AccountConfig) -> bool {
        config.huntbot.enabled
    }

    fn cooldown(&self) -> Duration {
        self.window.sample()
    }

    #[instrument(skip(self, ctx), fields(identity = %ctx.identity.id))]
    async fn run(&self, ctx: &AutomationContext) -> Result<()> {
        let id = ctx.identity.id.as_str();
        let Some(guard) = ctx.hunt_states.try_begin(id, Instant::now()) else {
            debug!("Hunting sub-bot not eligible yet");
            return Ok(());
        };
        let config = ctx.config().await;
        let channel = channel_of(&config)?;
        let prefix = &config.game_prefix;

        phase(id, HuntPhase::Checking);
        let username = config.username.clone();
        let display_name = config.display_name.clone().unwrap_or_default();
        let status = ctx
            .send_and_await(
                &channel,
                &format!("{}hb", prefix),
                from_game(&config.game_bot_id, move |m| {
                    m.names(&username) || m.names(&display_name)
                }),
                STATUS_TIMEOUT,
            )
            .await?;
        let Some(status) = status else {
            warn!("No reply to status check");
            return Ok(());
        };

        match parse_hunt_status(&status) {
            HuntStatus::Active { remaining } => {
                phase(id, HuntPhase::AlreadyActive);
                let Some(next) = Instant::now().checked_add(remaining + RECHECK_JITTER.sample())
                else {
                    warn!(remaining_secs = remaining.as_secs(), "Remaining time out of range");
                    return Ok(());
                };
                guard.defer_until(next);
                info!(
                    remaining_secs = remaining.as_secs(),
                    "Hunting sub-bot busy, deferring"
                );
                return Ok(());
            }
            HuntStatus::ActiveUnknown => {
                warn!("Hunting sub-bot busy but remaining time unreadable");
                return Ok(());
            }
            HuntStatus::Inactive => phase(id, HuntPhase::NeedsStart),
        }

        upgrade_trait(ctx, &config, &channel, &status).await;

        tokio::time::sleep(BEFORE_START).await;
        phase(id, HuntPhase::AwaitingChallenge);
        let start = format!("{}hb {}", prefix, config.huntbot.duration);
        let challenge = ctx
            .send_and_await(
                &channel,
                &start,
                from_game(&config.game_bot_id, Message::has_attachments),
                CHALLENGE_TIMEOUT,
            )
            .await?;
        let Some(image_url) = challenge
            .as_deref()
            .and_then(Message::first_attachment_url)
            .map(str::to_string)
        else {
            warn!("No start challenge received");
            return Ok(());
        };

        if !config.huntbot.use_solver {
            warn!("Start challenge solving disabled");
            return Ok(());
        }
        let Some(solver) = ctx.huntbot_solver.as_ref() else {
            warn!("No solver configured for start challenge");
            return Ok(());
        };

        phase(id, HuntPhase::Solving);
        let Some(code) = solver.solve(&image_url).await else {
            error!(solver = solver.name(), "Start challenge not solved");
            return Ok(());
        };
        ctx.send(&channel, &format!("{} {}", start, code)).await?;
        ctx.stats.incr(Counter::HuntBots);
        phase(id, HuntPhase::Started);
        info!("Hunting sub-bot started");
        Ok(())
    }
}
