//! Fire-and-forget automations: one command per cycle, no reply awaited.

use async_trait::async_trait;
use grind_core::Result;
use rand::seq::IndexedRandom;
use std::time::Duration;
use tracing::info;

use super::channel_of;
use crate::config::{AccountConfig, PrayTarget};
use crate::context::AutomationContext;
use crate::pacing::CooldownWindow;
use crate::scheduler::Automation;
use crate::stats::Counter;

/// Words sent by the leveling automation when quotes are off.
pub const LEVEL_WORDS: &[&str] = &[
    "owo", "uwu", "meow", "nyan", "hello", "hi", "bot", "leveling", "xp", "grind", "discord",
    "gamble", "coinflip", "slots", "daily", "hunt", "battle", "pray",
];

pub struct BattleAutomation {
    window: CooldownWindow,
}

impl BattleAutomation {
    pub fn new(window: CooldownWindow) -> Self {
        Self { window }
    }
}

#[async_trait]
impl Automation for BattleAutomation {
    fn name(&self) -> &str {
        "battle"
    }

    fn enabled(&self, config: &AccountConfig) -> bool {
        config.battle
    }

    fn cooldown(&self) -> Duration {
        self.window.sample()
    }

    async fn run(&self, ctx: &AutomationContext) -> Result<()> {
        let config = ctx.config().await;
        let channel = channel_of(&config)?;
        ctx.send(&channel, &format!("{}b", config.game_prefix)).await?;
        ctx.stats.incr(Counter::Battles);
        Ok(())
    }
}

/// `<p> pray` / `<p> curse`, with `<@id>` appended when targeting another user.
pub fn pray_command(config: &AccountConfig) -> Option<(String, bool)> {
    let kind = config.pray_curse.first()?;
    let mut command = format!("{} {}", config.game_prefix, kind);
    if config.pray_curse_target == PrayTarget::Other {
        if let Some(target) = &config.pray_curse_target_id {
            command.push_str(&format!(" <@{}>", target));
        }
    }
    Some((command, kind == "curse"))
}

pub struct PrayAutomation {
    window: CooldownWindow,
}

impl PrayAutomation {
    pub fn new(window: CooldownWindow) -> Self {
        Self { window }
    }
}

#[async_trait]
impl Automation for PrayAutomation {
    fn name(&self) -> &str {
        "pray"
    }

    fn enabled(&self, config: &AccountConfig) -> bool {
        !config.pray_curse.is_empty()
    }

    fn cooldown(&self) -> Duration {
        self.window.sample()
    }

    async fn run(&self, ctx: &AutomationContext) -> Result<()> {
        let config = ctx.config().await;
        let Some((command, is_curse)) = pray_command(&config) else {
            return Ok(());
        };
        let channel = channel_of(&config)?;
        ctx.send(&channel, &command).await?;
        ctx.stats.incr(if is_curse {
            Counter::Curses
        } else {
            Counter::Prays
        });
        Ok(())
    }
}

/// `<p> quote` when quotes are on, else a random word from [`LEVEL_WORDS`].
pub fn level_text(config: &AccountConfig) -> String {
    if config.quote {
        return format!("{} quote", config.game_prefix);
    }
    LEVEL_WORDS
        .choose(&mut rand::rng())
        .map(|w| w.to_string())
        .unwrap_or_else(|| "owo".to_string())
}

pub struct LevelAutomation {
    window: CooldownWindow,
}

impl LevelAutomation {
    pub fn new(window: CooldownWindow) -> Self {
        Self { window }
    }
}

#[async_trait]
impl Automation for LevelAutomation {
    fn name(&self) -> &str {
        "level"
    }

    fn enabled(&self, config: &AccountConfig) -> bool {
        config.level || config.quote
    }

    fn cooldown(&self) -> Duration {
        self.window.sample()
    }

    async fn run(&self, ctx: &AutomationContext) -> Result<()> {
        let config = ctx.config().await;
        let channel = channel_of(&config)?;
        let text = level_text(&config);
        ctx.send(&channel, &text).await?;
        info!(text = %text, "Leveling message sent");
        Ok(())
    }
}

pub struct CookieAutomation {
    window: CooldownWindow,
}

impl CookieAutomation {
    pub fn new(window: CooldownWindow) -> Self {
        Self { window }
    }
}

#[async_trait]
impl Automation for CookieAutomation {
    fn name(&self) -> &str {
        "cookie"
    }

    fn enabled(&self, config: &AccountConfig) -> bool {
        config.cookie
    }

    fn cooldown(&self) -> Duration {
        self.window.sample()
    }

    async fn run(&self, ctx: &AutomationContext) -> Result<()> {
        let config = ctx.config().await;
        let channel = channel_of(&config)?;
        let target = config
            .interaction_target_id
            .clone()
            .unwrap_or_else(|| config.user_id.clone());
        ctx.send(&channel, &format!("{} cookie {}", config.game_prefix, target))
            .await?;
        Ok(())
    }
}

pub struct CloverAutomation {
    window: CooldownWindow,
}

impl CloverAutomation {
    pub fn new(window: CooldownWindow) -> Self {
        Self { window }
    }
}

#[async_trait]
impl Automation for CloverAutomation {
    fn name(&self) -> &str {
        "clover"
    }

    fn enabled(&self, config: &AccountConfig) -> bool {
        config.clover
    }

    fn cooldown(&self) -> Duration {
        self.window.sample()
    }

    async fn run(&self, ctx: &AutomationContext) -> Result<()> {
        let config = ctx.config().await;
        let channel = channel_of(&config)?;
        ctx.send(&channel, &format!("{} use clover", config.game_prefix))
            .await?;
        Ok(())
    }
}

pub struct QuestAutomation {
    window: CooldownWindow,
}

impl QuestAutomation {
    pub fn new(window: CooldownWindow) -> Self {
        Self { window }
    }
}

#[async_trait]
impl Automation for QuestAutomation {
    fn name(&self) -> &str {
        "quest"
    }

    fn enabled(&self, config: &AccountConfig) -> bool {
        config.quest
    }

    fn cooldown(&self) -> Duration {
        self.window.sample()
    }

    async fn run(&self, ctx: &AutomationContext) -> Result<()> {
        let config = ctx.config().await;
        let channel = channel_of(&config)?;
        ctx.send(&channel, &format!("{} quest", config.game_prefix))
            .await?;
        Ok(())
    }
}
