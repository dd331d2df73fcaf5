//! Base config: config file location and log file. Loaded from env.

use anyhow::Result;
use std::env;

/// Process-level settings that do not belong to any one account.
#[derive(Debug, Clone)]
pub struct BaseConfig {
    /// GRIND_CONFIG
    pub config_path: String,
    /// LOG_FILE
    pub log_file: String,
}

impl BaseConfig {
    /// Load from environment variables. `config_path` overrides GRIND_CONFIG if provided.
    pub fn load(config_path: Option<String>) -> Result<Self> {
        let config_path = config_path
            .or_else(|| env::var("GRIND_CONFIG").ok())
            .unwrap_or_else(|| "config.json".to_string());
        let log_file = env::var("LOG_FILE").unwrap_or_else(|_| "logs/grindbot.log".to_string());

        Ok(Self {
            config_path,
            log_file,
        })
    }
}
