//! CLI parser and the offline gem-selection helper.

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use grind_runtime::features::gems::{
    parse_inventory, select_gems, use_command, GemNeeds, GemPolicy, GemTier,
};
use grind_runtime::BaseConfig;

#[derive(Parser)]
#[command(name = "grindbot")]
#[command(about = "Chat game automation runner", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run every configured account against the console transport (config path can override GRIND_CONFIG).
    Run {
        #[arg(short, long)]
        config: Option<String>,
    },
    /// Load and validate the config file, then print the accounts it drives.
    CheckConfig {
        #[arg(short, long)]
        config: Option<String>,
    },
    /// Print the use command gem selection would send for an inventory reply.
    Gems {
        /// Inventory ids, comma separated (`051,065`) or a raw reply with back-ticked ids.
        #[arg(short, long)]
        inventory: String,
        /// Comma separated allowed tiers.
        #[arg(short, long, default_value = "common,uncommon,rare,epic,mythical,legendary,fabled")]
        tiers: String,
        /// Comma separated needed slot markers (gem1,gem3,gem4,star).
        #[arg(short, long, default_value = "gem1,gem3,gem4")]
        needs: String,
        /// Pick the lowest eligible id instead of the highest.
        #[arg(long)]
        min: bool,
        #[arg(long, default_value = "owo")]
        prefix: String,
    },
}

/// Load BaseConfig from environment. If `config` is provided it overrides GRIND_CONFIG.
pub fn load_base(config: Option<String>) -> Result<BaseConfig> {
    BaseConfig::load(config)
}

pub fn parse_tiers(raw: &str) -> Result<Vec<GemTier>> {
    raw.split(',')
        .filter(|t| !t.trim().is_empty())
        .map(|t| t.parse::<GemTier>().map_err(|e| anyhow!(e)))
        .collect()
}

fn inventory_tokens(raw: &str) -> Vec<String> {
    if raw.contains('`') {
        return parse_inventory(raw);
    }
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Runs the `gems` subcommand; `None` when nothing would be used.
pub fn gem_command(
    inventory: &str,
    tiers: &str,
    needs: &str,
    min: bool,
    prefix: &str,
) -> Result<Option<String>> {
    let tiers = parse_tiers(tiers)?;
    let needs = GemNeeds::from_markers(needs.split(','));
    let policy = if min { GemPolicy::Min } else { GemPolicy::Max };
    let tokens = inventory_tokens(inventory);
    let chosen = select_gems(&tokens, &needs, &tiers, policy);
    Ok(use_command(prefix, &chosen))
}
