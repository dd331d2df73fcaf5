//! Coinflip and slots, guarded by a minimum-balance check.

use async_trait::async_trait;
use grind_core::{Channel, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Duration;
use tracing::{info, warn};

use super::{channel_of, from_game};
use crate::config::AccountConfig;
use crate::context::AutomationContext;
use crate::pacing::CooldownWindow;
use crate::scheduler::Automation;

const BALANCE_TIMEOUT: Duration = Duration::from_secs(5);
/// Larger numbers are user or message ids, not balances.
const MAX_PLAUSIBLE_BALANCE: u64 = 1_000_000_000_000_000;

static HAVE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)have\s+(\d+)\s*cowoncy").expect("balance pattern is valid"));
static ANY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+)\s*cowoncy").expect("balance pattern is valid"));

/// Balance from a cash reply such as `**alice**, you currently have **__20,206__** cowoncy!`.
pub fn parse_balance(content: &str) -> Option<u64> {
    let clean: String = content
        .chars()
        .filter(|c| !matches!(c, '*' | '|' | ',' | '_'))
        .collect();
    let captured = HAVE_RE
        .captures(&clean)
        .or_else(|| ANY_RE.captures(&clean))?;
    let balance: u64 = captured.get(1)?.as_str().parse().ok()?;
    (balance <= MAX_PLAUSIBLE_BALANCE).then_some(balance)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GambleKind {
    Coinflip,
    Slots,
}

impl GambleKind {
    fn name(self) -> &'static str {
        match self {
            GambleKind::Coinflip => "coinflip",
            GambleKind::Slots => "slots",
        }
    }

    fn verb(self) -> &'static str {
        match self {
            GambleKind::Coinflip => "cf",
            GambleKind::Slots => "slots",
        }
    }
}

pub struct GambleAutomation {
    kind: GambleKind,
    window: CooldownWindow,
}

impl GambleAutomation {
    pub fn new(kind: GambleKind, window: CooldownWindow) -> Self {
        Self { kind, window }
    }

    fn amount(&self, config: &AccountConfig) -> u64 {
        let amount = match self.kind {
            GambleKind::Coinflip => config.gamble.coinflip_amount,
            GambleKind::Slots => config.gamble.slots_amount,
        };
        amount.max(1)
    }
}

/// True when betting `cost` keeps the balance at or above the configured minimum.
/// No reply or an unparseable reply means no.
async fn has_safe_balance(
    ctx: &AutomationContext,
    config: &AccountConfig,
    channel: &Channel,
    cost: u64,
) -> Result<bool> {
    let min = config.gamble.min_gamble_balance;
    if min == 0 {
        return Ok(true);
    }
    let reply = ctx
        .send_and_await(
            channel,
            &format!("{} cash", config.game_prefix),
            from_game(&config.game_bot_id, |m| {
                let text = m.content.to_lowercase();
                text.contains("cowoncy") || text.contains("balance")
            }),
            BALANCE_TIMEOUT,
        )
        .await?;
    let Some(reply) = reply else {
        warn!("No balance reply, skipping gamble");
        return Ok(false);
    };
    let Some(balance) = parse_balance(&reply.content) else {
        warn!(content = %reply.content, "Could not parse balance, skipping gamble");
        return Ok(false);
    };
    let safe = balance.checked_sub(cost).is_some_and(|left| left >= min);
    if !safe {
        warn!(balance, cost, min, "Gamble skipped, balance too low");
    }
    Ok(safe)
}

#[async_trait]
impl Automation for GambleAutomation {
    fn name(&self) -> &str {
        self.kind.name()
    }

    fn enabled(&self, config: &AccountConfig) -> bool {
        match self.kind {
            GambleKind::Coinflip => config.gamble.coinflip,
            GambleKind::Slots => config.gamble.slots,
        }
    }

    fn cooldown(&self) -> Duration {
        self.window.sample()
    }

    async fn run(&self, ctx: &AutomationContext) -> Result<()> {
        let config = ctx.config().await;
        let channel = channel_of(&config)?;
        let amount = self.amount(&config);
        if !has_safe_balance(ctx, &config, &channel, amount).await? {
            return Ok(());
        }
        ctx.send(
            &channel,
            &format!("{} {} {}", config.game_prefix, self.kind.verb(), amount),
        )
        .await?;
        info!(kind = self.kind.name(), amount, "Gambled");
        Ok(())
    }
}
