//! Runtime configuration: BaseConfig (paths from env) + GlobalConfig (per-account JSON file).

mod account;
mod base;


pub use account::{
    AccountConfig, ChallengeConfig, CooldownConfig, GambleConfig, GemConfig, GlobalConfig,
    HuntBotConfig, NotificationConfig, PrayTarget, Settings,
};
pub use base::BaseConfig;

use std::sync::Arc;
use tokio::sync::RwLock;

/// Account config shared between the scheduler, the inbound handlers, and any external settings editor.
/// Readers take a snapshot per cycle, so an update applies from the next cycle on.
#[derive(Clone)]
pub struct SharedConfig {
    inner: Arc<RwLock<AccountConfig>>,
}

impl SharedConfig {
    pub fn new(config: AccountConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    pub async fn snapshot(&self) -> AccountConfig {
        self.inner.read().await.clone()
    }

    pub async fn replace(&self, config: AccountConfig) {
        *self.inner.write().await = config;
    }
}
