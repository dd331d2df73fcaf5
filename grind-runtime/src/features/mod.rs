//! Concrete automations and the helpers they share.

pub mod gamble;
pub mod gems;
pub mod hunt;
pub mod huntbot;
pub mod inventory;
pub mod routine;

use grind_core::{Channel, GrindError, Message, Result};
use std::sync::Arc;

use crate::config::AccountConfig;
use crate::context::AutomationContext;
use crate::scheduler::Automation;

pub use gamble::{parse_balance, GambleAutomation, GambleKind};
pub use gems::{
    parse_inventory, select_gems, use_command, GemNeeds, GemPolicy, GemSlot, GemTier,
};
pub use hunt::HuntAutomation;
pub use huntbot::{parse_essence, parse_hunt_status, HuntBotAutomation, HuntPhase, HuntStatus};
pub use inventory::{InventoryAction, InventoryAutomation};
pub use routine::{
    BattleAutomation, CloverAutomation, CookieAutomation, LevelAutomation, PrayAutomation,
    QuestAutomation,
};

/// Every automation, in registration order. Cooldown windows are read from `config` once;
/// enabled checks are re-evaluated against the live config each cycle.
pub fn default_automations(config: &AccountConfig) -> Vec<Arc<dyn Automation>> {
    let cd = &config.cooldowns;
    vec![
        Arc::new(HuntAutomation::new(cd.hunt)),
        Arc::new(BattleAutomation::new(cd.battle)),
        Arc::new(PrayAutomation::new(cd.pray)),
        Arc::new(HuntBotAutomation::new(cd.huntbot)),
        Arc::new(GambleAutomation::new(GambleKind::Coinflip, cd.gamble)),
        Arc::new(GambleAutomation::new(GambleKind::Slots, cd.gamble)),
        Arc::new(InventoryAutomation::new(InventoryAction::Sell, cd.inventory)),
        Arc::new(InventoryAutomation::new(InventoryAction::Sacrifice, cd.inventory)),
        Arc::new(LevelAutomation::new(cd.level)),
        Arc::new(CookieAutomation::new(cd.cookie)),
        Arc::new(CloverAutomation::new(cd.clover)),
        Arc::new(QuestAutomation::new(cd.quest)),
    ]
}

/// The game channel, or a config error when none is set.
pub(crate) fn channel_of(config: &AccountConfig) -> Result<Channel> {
    AutomationContext::game_channel(config)
        .ok_or_else(|| GrindError::Config("no channel configured".to_string()))
}

/// Filter accepting messages from the game bot that satisfy `pred`.
pub(crate) fn from_game<P>(game_bot_id: &str, pred: P) -> impl Fn(&Message) -> bool + Send
where
    P: Fn(&Message) -> bool + Send,
{
    let game_bot_id = game_bot_id.to_string();
    move |m: &Message| m.is_from(&game_bot_id) && pred(m)
}
