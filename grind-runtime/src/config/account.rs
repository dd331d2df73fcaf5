//! Typed per-account configuration. Every recognized toggle is a field; serde defaults let a
//! partial JSON file load.

use anyhow::{bail, Context, Result};
use grind_core::User;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::features::gems::{GemPolicy, GemTier};
use crate::pacing::{parse_duration, CooldownWindow};

/// Whole config file: the main account, an optional second account, process settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    pub main: AccountConfig,
    pub extra: Option<AccountConfig>,
    pub settings: Settings,
}

impl GlobalConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let config: GlobalConfig = serde_json::from_str(&raw)
            .with_context(|| format!("parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Validates every configured account. Call after load() to fail fast before start.
    pub fn validate(&self) -> Result<()> {
        self.main.validate().context("main account")?;
        if let Some(extra) = &self.extra {
            extra.validate().context("extra account")?;
        }
        Ok(())
    }

    /// Accounts to drive, main first.
    pub fn accounts(&self) -> Vec<&AccountConfig> {
        std::iter::once(&self.main).chain(self.extra.iter()).collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Number of events kept in the rolling event feed.
    pub event_buffer: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self { event_buffer: 200 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrayTarget {
    #[default]
    #[serde(rename = "self")]
    Own,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountConfig {
    pub user_id: String,
    pub username: String,
    pub display_name: Option<String>,
    pub channel_ids: Vec<String>,
    /// Operator allowed to issue control commands and notified on challenges.
    pub admin_id: Option<String>,
    /// Prefix for operator commands (`.pause`).
    pub prefix: String,
    pub game_bot_id: String,
    /// Prefix for game commands (`owo`).
    pub game_prefix: String,

    pub hunt: bool,
    pub battle: bool,
    /// `pray` and/or `curse`; the first entry is used.
    pub pray_curse: Vec<String>,
    pub pray_curse_target: PrayTarget,
    pub pray_curse_target_id: Option<String>,

    pub gamble: GambleConfig,
    pub gems: GemConfig,

    pub sell: bool,
    pub sell_rarities: Vec<String>,
    pub sacrifice: bool,
    pub sacrifice_rarities: Vec<String>,

    pub level: bool,
    pub quote: bool,

    pub cookie: bool,
    pub clover: bool,
    pub interaction_target_id: Option<String>,

    pub quest: bool,

    pub huntbot: HuntBotConfig,
    pub challenge: ChallengeConfig,
    pub notifications: NotificationConfig,
    pub cooldowns: CooldownConfig,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            user_id: String::new(),
            username: String::new(),
            display_name: None,
            channel_ids: Vec::new(),
            admin_id: None,
            prefix: ".".to_string(),
            game_bot_id: "408785106942164992".to_string(),
            game_prefix: "owo".to_string(),
            hunt: false,
            battle: false,
            pray_curse: Vec::new(),
            pray_curse_target: PrayTarget::Own,
            pray_curse_target_id: None,
            gamble: GambleConfig::default(),
            gems: GemConfig::default(),
            sell: false,
            sell_rarities: vec!["common".to_string(), "uncommon".to_string()],
            sacrifice: false,
            sacrifice_rarities: vec!["common".to_string(), "uncommon".to_string()],
            level: false,
            quote: false,
            cookie: false,
            clover: false,
            interaction_target_id: None,
            quest: false,
            huntbot: HuntBotConfig::default(),
            challenge: ChallengeConfig::default(),
            notifications: NotificationConfig::default(),
            cooldowns: CooldownConfig::default(),
        }
    }
}

impl AccountConfig {
    /// The automated identity as a core [`User`].
    pub fn identity(&self) -> User {
        User {
            id: self.user_id.clone(),
            username: self.username.clone(),
            display_name: self.display_name.clone(),
            bot: false,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.user_id.trim().is_empty() {
            bail!("user_id is required");
        }
        if self.channel_ids.is_empty() {
            bail!("at least one channel id is required");
        }
        if self.game_bot_id.trim().is_empty() {
            bail!("game_bot_id must not be empty");
        }
        for (name, window) in self.cooldowns.entries() {
            if !window.is_valid() {
                bail!(
                    "cooldown window '{}' has min {}ms > max {}ms",
                    name,
                    window.min_ms,
                    window.max_ms
                );
            }
        }
        if let Some(kind) = self.pray_curse.first() {
            if kind != "pray" && kind != "curse" {
                bail!("pray_curse entries must be 'pray' or 'curse', got '{}'", kind);
            }
        }
        if self.pray_curse_target == PrayTarget::Other && self.pray_curse_target_id.is_none() {
            bail!("pray_curse_target is 'other' but pray_curse_target_id is not set");
        }
        if parse_duration(&self.huntbot.duration).is_none() {
            bail!("huntbot.duration '{}' is not a duration like 24h", self.huntbot.duration);
        }
        for pattern in &self.challenge.patterns {
            Regex::new(pattern)
                .with_context(|| format!("challenge pattern '{}' does not compile", pattern))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GambleConfig {
    pub coinflip: bool,
    pub slots: bool,
    pub coinflip_amount: u64,
    pub slots_amount: u64,
    /// Gambling is skipped when it would leave less than this. 0 disables the balance check.
    pub min_gamble_balance: u64,
}

impl Default for GambleConfig {
    fn default() -> Self {
        Self {
            coinflip: false,
            slots: false,
            coinflip_amount: 1,
            slots_amount: 1,
            min_gamble_balance: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GemConfig {
    pub policy: GemPolicy,
    pub tiers: Vec<GemTier>,
    pub use_special: bool,
    pub lootbox: bool,
    pub fabled_lootbox: bool,
}

impl Default for GemConfig {
    fn default() -> Self {
        Self {
            policy: GemPolicy::Off,
            tiers: GemTier::ALL.to_vec(),
            use_special: false,
            lootbox: false,
            fabled_lootbox: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HuntBotConfig {
    pub enabled: bool,
    /// Hunt length passed to the start command.
    pub duration: String,
    /// Trait to spend essence on before starting a new hunt.
    pub upgrade_trait: Option<String>,
    pub use_solver: bool,
}

impl Default for HuntBotConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            duration: "24h".to_string(),
            upgrade_trait: None,
            use_solver: false,
        }
    }
}

/// Phrase lists used to classify challenge messages. Treated as configuration, not contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChallengeConfig {
    pub keywords: Vec<String>,
    pub exclusions: Vec<String>,
    pub embed_keywords: Vec<String>,
    pub patterns: Vec<String>,
    pub settle_secs: u64,
    pub use_solver: bool,
}

impl Default for ChallengeConfig {
    fn default() -> Self {
        Self {
            keywords: ["captcha", "verify", "human", "banned"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            exclusions: ["verified that you are human", "thank you"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            embed_keywords: ["captcha", "verify that you are human"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            patterns: vec![
                r"are you a real human|(check|verify) that you are.{1,3}human!".to_string(),
            ],
            settle_secs: 5,
            use_solver: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// DM the admin on challenge detection.
    pub dm: bool,
    pub webhook_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CooldownConfig {
    pub hunt: CooldownWindow,
    pub battle: CooldownWindow,
    pub pray: CooldownWindow,
    pub huntbot: CooldownWindow,
    pub gamble: CooldownWindow,
    pub inventory: CooldownWindow,
    pub level: CooldownWindow,
    pub cookie: CooldownWindow,
    pub clover: CooldownWindow,
    pub quest: CooldownWindow,
}

impl Default for CooldownConfig {
    fn default() -> Self {
        Self {
            hunt: CooldownWindow::from_secs(15, 25),
            battle: CooldownWindow::from_secs(15, 25),
            pray: CooldownWindow::from_secs(300, 310),
            huntbot: CooldownWindow::from_secs(60, 120),
            gamble: CooldownWindow::from_secs(16, 22),
            inventory: CooldownWindow::from_secs(600, 900),
            level: CooldownWindow::from_secs(20, 40),
            cookie: CooldownWindow::from_secs(300, 600),
            clover: CooldownWindow::from_secs(60, 120),
            quest: CooldownWindow::from_secs(300, 600),
        }
    }
}

impl CooldownConfig {
    pub fn entries(&self) -> [(&'static str, CooldownWindow); 10] {
        [
            ("hunt", self.hunt),
            ("battle", self.battle),
            ("pray", self.pray),
            ("huntbot", self.huntbot),
            ("gamble", self.gamble),
            ("inventory", self.inventory),
            ("level", self.level),
            ("cookie", self.cookie),
            ("clover", self.clover),
            ("quest", self.quest),
        ]
    }
}
