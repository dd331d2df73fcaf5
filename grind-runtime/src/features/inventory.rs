//! Selling or sacrificing animals by rarity.

use async_trait::async_trait;
use grind_core::Result;
use std::time::Duration;
use tracing::info;

use super::channel_of;
use crate::config::AccountConfig;
use crate::context::AutomationContext;
use crate::pacing::CooldownWindow;
use crate::scheduler::Automation;

const BETWEEN_COMMANDS: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InventoryAction {
    Sell,
    Sacrifice,
}

impl InventoryAction {
    fn name(self) -> &'static str {
        match self {
            InventoryAction::Sell => "sell",
            InventoryAction::Sacrifice => "sacrifice",
        }
    }
}

pub struct InventoryAutomation {
    action: InventoryAction,
    window: CooldownWindow,
}

impl InventoryAutomation {
    pub fn new(action: InventoryAction, window: CooldownWindow) -> Self {
        Self { action, window }
    }

    fn rarities<'a>(&self, config: &'a AccountConfig) -> &'a [String] {
        match self.action {
            InventoryAction::Sell => &config.sell_rarities,
            InventoryAction::Sacrifice => &config.sacrifice_rarities,
        }
    }
}

#[async_trait]
impl Automation for InventoryAutomation {
    fn name(&self) -> &str {
        self.action.name()
    }

    fn enabled(&self, config: &AccountConfig) -> bool {
        match self.action {
            InventoryAction::Sell => config.sell,
            InventoryAction::Sacrifice => config.sacrifice,
        }
    }

    fn cooldown(&self) -> Duration {
        self.window.sample()
    }

    /// One command per rarity, spaced out.
    async fn run(&self, ctx: &AutomationContext) -> Result<()> {
        let config = ctx.config().await;
        let channel = channel_of(&config)?;
        for (i, rarity) in self.rarities(&config).iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(BETWEEN_COMMANDS).await;
            }
            ctx.send(
                &channel,
                &format!("{} {} {}", config.game_prefix, self.action.name(), rarity),
            )
            .await?;
            info!(action = self.action.name(), rarity = %rarity, "Inventory command sent");
        }
        Ok(())
    }
}
