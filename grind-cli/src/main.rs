//! grindbot CLI: run the configured accounts, validate a config file, preview gem selection.

use anyhow::{Context, Result};
use clap::Parser;
use grind_cli::{gem_command, load_base, pump_stdin, Cli, Commands, ConsoleTransport};
use grind_core::init_tracing;
use grind_runtime::{GlobalConfig, GrindBot, HuntingStates};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config } => handle_run(config).await,
        Commands::CheckConfig { config } => handle_check_config(config),
        Commands::Gems {
            inventory,
            tiers,
            needs,
            min,
            prefix,
        } => {
            match gem_command(&inventory, &tiers, &needs, min, &prefix)? {
                Some(command) => println!("{}", command),
                None => println!("No gem to use."),
            }
            Ok(())
        }
    }
}

fn load_global(path: &str) -> Result<GlobalConfig> {
    let global = GlobalConfig::load(path)?;
    global
        .validate()
        .with_context(|| format!("invalid config {}", path))?;
    Ok(global)
}

fn handle_check_config(config: Option<String>) -> Result<()> {
    let base = load_base(config)?;
    let global = load_global(&base.config_path)?;
    for account in global.accounts() {
        println!(
            "{} ({}) channels: {}",
            account.username,
            account.user_id,
            account.channel_ids.join(", ")
        );
    }
    println!("Config OK: {}", base.config_path);
    Ok(())
}

/// Builds one bot per account (they share the hunting sub-bot table and the shutdown token),
/// runs them until `stop` or Ctrl-C, and feeds stdin lines to every bot.
async fn handle_run(config: Option<String>) -> Result<()> {
    let base = load_base(config)?;
    init_tracing(&base.log_file)?;
    let global = load_global(&base.config_path)?;

    let shutdown = CancellationToken::new();
    let hunt_states = HuntingStates::new();

    let mut bots = Vec::new();
    for account in global.accounts() {
        let transport = Arc::new(ConsoleTransport::new(account.username.clone()));
        let bot = GrindBot::builder(account.clone(), transport)
            .hunt_states(hunt_states.clone())
            .event_capacity(global.settings.event_buffer)
            .shutdown_token(shutdown.clone())
            .build()
            .with_context(|| format!("build bot for {}", account.username))?;
        bots.push(Arc::new(bot));
    }
    info!(accounts = bots.len(), config = %base.config_path, "Starting");

    let ctrl_c = shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl-C");
            return;
        }
        info!("Ctrl-C received");
        ctrl_c.cancel();
    });

    let channel_id = global.main.channel_ids.first().cloned().unwrap_or_default();
    tokio::spawn(pump_stdin(
        bots.clone(),
        global.main.identity(),
        channel_id,
        shutdown.clone(),
    ));

    let runners: Vec<_> = bots
        .into_iter()
        .map(|bot| tokio::spawn(async move { bot.run_until_shutdown().await }))
        .collect();
    for runner in runners {
        if let Err(e) = runner.await {
            error!(error = %e, "Bot task failed");
        }
    }
    info!("Stopped");
    Ok(())
}
