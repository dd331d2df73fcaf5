//! Hunting: `<p>h`, then activate missing gems from the inventory.

use async_trait::async_trait;
use grind_core::{Channel, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use super::gems::{parse_inventory, select_gems, use_command, GemNeeds, GemPolicy};
use super::{channel_of, from_game};
use crate::config::AccountConfig;
use crate::context::AutomationContext;
use crate::pacing::CooldownWindow;
use crate::scheduler::Automation;
use crate::stats::Counter;

const HUNT_REPLY_TIMEOUT: Duration = Duration::from_secs(6);
const INVENTORY_TIMEOUT: Duration = Duration::from_secs(12);
const LOOTBOX_PAUSE: Duration = Duration::from_secs(3);

static HUNT_REPLY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"hunt is empowered by|spent 5 .+ and caught a").expect("hunt reply pattern is valid")
});

pub struct HuntAutomation {
    window: CooldownWindow,
}

impl HuntAutomation {
    pub fn new(window: CooldownWindow) -> Self {
        Self { window }
    }
}

#[async_trait]
impl Automation for HuntAutomation {
    fn name(&self) -> &str {
        "hunt"
    }

    fn enabled(&self, config: &AccountConfig) -> bool {
        config.hunt
    }

    fn cooldown(&self) -> Duration {
        self.window.sample()
    }

    #[instrument(skip(self, ctx), fields(identity = %ctx.identity.id))]
    async fn run(&self, ctx: &AutomationContext) -> Result<()> {
        let config = ctx.config().await;
        let channel = channel_of(&config)?;

        let reply = ctx
            .send_and_await(
                &channel,
                &format!("{}h", config.game_prefix),
                from_game(&config.game_bot_id, |m| HUNT_REPLY_RE.is_match(&m.content)),
                HUNT_REPLY_TIMEOUT,
            )
            .await?;
        let Some(reply) = reply else {
            debug!("No hunt reply");
            return Ok(());
        };
        ctx.stats.incr(Counter::Hunts);

        use_gems(ctx, &config, &channel, &reply.content).await
    }
}

/// Checks which gem slots are unsatisfied after a hunt and activates gems for them.
async fn use_gems(
    ctx: &AutomationContext,
    config: &AccountConfig,
    channel: &Channel,
    hunt_reply: &str,
) -> Result<()> {
    let gems = &config.gems;
    if gems.policy == GemPolicy::Off {
        return Ok(());
    }
    let needs = GemNeeds::from_hunt_reply(hunt_reply, gems.use_special);
    debug!(?needs, "Gem needs");
    if !needs.any() {
        return Ok(());
    }

    info!("step: gems missing, checking inventory");
    let reply = ctx
        .send_and_await(
            channel,
            &format!("{} inv", config.game_prefix),
            from_game(&config.game_bot_id, |m| m.content.contains("Inventory")),
            INVENTORY_TIMEOUT,
        )
        .await?;
    let Some(reply) = reply else {
        warn!("No inventory reply");
        return Ok(());
    };
    let inventory = parse_inventory(&reply.content);
    let has = |token: &str| inventory.iter().any(|t| t == token);

    if gems.lootbox && has("050") {
        ctx.send(channel, &format!("{} lb all", config.game_prefix)).await?;
        tokio::time::sleep(LOOTBOX_PAUSE).await;
        return Ok(());
    }
    if gems.fabled_lootbox && has("049") {
        ctx.send(channel, &format!("{} lb fabled", config.game_prefix)).await?;
        tokio::time::sleep(LOOTBOX_PAUSE).await;
        return Ok(());
    }

    let chosen = select_gems(&inventory, &needs, &gems.tiers, gems.policy);
    match use_command(&config.game_prefix, &chosen) {
        Some(command) => {
            ctx.send(channel, &command).await?;
            ctx.stats.add(Counter::GemsUsed, chosen.len() as u64);
            info!(gems = ?chosen, "Gems used");
        }
        None => warn!("Gems needed but none eligible in inventory"),
    }
    Ok(())
}
