//! Operator commands typed into chat by the automated identity itself or the configured admin.
//!
//! `.pause [1h]`, `.resume`, `.stop`, `.status`, `.uptime`, `.ping`, `.say`, `.send <user> <amount>`.
//! Each command replies into the channel it came from. Failures are logged, never propagated.

use async_trait::async_trait;
use chrono::Utc;
use grind_core::{ButtonStyle, Channel, Handler, HandlerError, HandlerResponse, Message, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

use crate::context::AutomationContext;
use crate::events::EventKind;
use crate::interrupt::RunState;
use crate::pacing::{format_duration, parse_duration};
use crate::stats::Counter;

const TRANSFER_CONFIRM_TIMEOUT: Duration = Duration::from_secs(15);

static CHANNEL_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{17,19}$").expect("channel id pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `None` pauses until resumed.
    Pause(Option<Duration>),
    Resume,
    Stop,
    Status,
    Uptime,
    Ping,
    Say {
        channel_id: Option<String>,
        text: String,
    },
    Send {
        user: String,
        amount: String,
    },
}

impl Command {
    /// `Ok(None)` when `content` is not a known command.
    pub fn parse(prefix: &str, content: &str) -> std::result::Result<Option<Command>, HandlerError> {
        let Some(rest) = content.strip_prefix(prefix) else {
            return Ok(None);
        };
        let mut args = rest.split_whitespace();
        let Some(name) = args.next() else {
            return Ok(None);
        };
        let args: Vec<&str> = args.collect();

        let command = match name.to_lowercase().as_str() {
            "pause" => match args.first() {
                None => Command::Pause(None),
                Some(arg) => Command::Pause(Some(parse_duration(arg).ok_or_else(|| {
                    HandlerError::InvalidCommand(format!("'{}' is not a duration like 30m", arg))
                })?)),
            },
            "resume" | "start" | "unpause" => Command::Resume,
            "stop" | "shutdown" | "kill" => Command::Stop,
            "status" | "stats" | "info" => Command::Status,
            "uptime" => Command::Uptime,
            "ping" => Command::Ping,
            "say" => {
                let (channel_id, words) = match args.split_first() {
                    Some((first, rest)) if CHANNEL_ID_RE.is_match(first) => {
                        (Some(first.to_string()), rest)
                    }
                    _ => (None, args.as_slice()),
                };
                if words.is_empty() {
                    return Err(HandlerError::InvalidCommand("usage: say [channel_id] <text>".into()));
                }
                Command::Say {
                    channel_id,
                    text: words.join(" "),
                }
            }
            "send" => match args.as_slice() {
                [user, amount, ..] => Command::Send {
                    user: user.to_string(),
                    amount: amount.to_string(),
                },
                _ => return Err(HandlerError::InvalidCommand("usage: send <user> <amount>".into())),
            },
            _ => return Ok(None),
        };
        Ok(Some(command))
    }
}

pub struct CommandHandler {
    ctx: Arc<AutomationContext>,
    shutdown: CancellationToken,
}

impl CommandHandler {
    pub fn new(ctx: Arc<AutomationContext>, shutdown: CancellationToken) -> Self {
        Self { ctx, shutdown }
    }

    async fn reply(&self, channel: &Channel, text: &str) {
        if let Err(e) = self.ctx.send(channel, text).await {
            error!(error = %e, "Failed to send command reply");
        }
    }

    async fn execute(&self, message: &Message, command: Command) -> Result<()> {
        let ctx = &self.ctx;
        let channel = &message.channel;
        match command {
            Command::Pause(duration) => {
                if ctx.interrupt.is_halted() {
                    self.reply(channel, "Bot is already paused.").await;
                    return Ok(());
                }
                match duration {
                    Some(duration) => {
                        let Some(timer) = ctx.interrupt.pause_for(duration) else {
                            self.reply(channel, "Bot is already paused.").await;
                            return Ok(());
                        };
                        let ctx = Arc::clone(ctx);
                        let announce = channel.clone();
                        tokio::spawn(async move {
                            if let Ok(true) = timer.await {
                                ctx.events.push(EventKind::StateChanged, "auto-resumed");
                                if let Err(e) = ctx.send(&announce, "Bot auto-resumed.").await {
                                    warn!(error = %e, "Failed to announce auto-resume");
                                }
                            }
                        });
                        self.reply(
                            channel,
                            &format!("Bot paused for {}.", format_duration(duration)),
                        )
                        .await;
                    }
                    None => {
                        ctx.interrupt.pause();
                        self.reply(channel, "Bot paused indefinitely. Use resume to start.")
                            .await;
                    }
                }
                warn!(identity = %ctx.identity.id, "Paused by operator");
                ctx.events.push(EventKind::StateChanged, "paused by operator");
            }
            Command::Resume => {
                if !ctx.interrupt.is_halted() {
                    self.reply(channel, "Bot is running.").await;
                    return Ok(());
                }
                let previous = ctx.interrupt.resume();
                info!(identity = %ctx.identity.id, ?previous, "Resumed by operator");
                ctx.events
                    .push(EventKind::StateChanged, format!("resumed from {:?}", previous));
                self.reply(channel, "Bot resumed.").await;
            }
            Command::Stop => {
                self.reply(channel, "Shutting down...").await;
                warn!(identity = %ctx.identity.id, "Stop requested by operator");
                ctx.events.push(EventKind::StateChanged, "stop requested");
                self.shutdown.cancel();
            }
            Command::Status => {
                let stats = &ctx.stats;
                let state = match ctx.interrupt.state() {
                    RunState::Running => "RUNNING",
                    RunState::Paused => "PAUSED",
                    RunState::ChallengeDetected => "CHALLENGE",
                };
                let text = [
                    "**Bot Statistics**".to_string(),
                    format!("**Uptime:** {}", format_duration(ctx.uptime())),
                    format!("**Hunts:** {}", stats.get(Counter::Hunts)),
                    format!("**Battles:** {}", stats.get(Counter::Battles)),
                    format!(
                        "**Captchas:** {} (Solved: {})",
                        stats.get(Counter::CaptchasDetected),
                        stats.get(Counter::CaptchasSolved)
                    ),
                    format!("**Status:** {}", state),
                ]
                .join("\n");
                self.reply(channel, &text).await;
            }
            Command::Uptime => {
                self.reply(channel, &format!("Uptime: **{}**", format_duration(ctx.uptime())))
                    .await;
            }
            Command::Ping => {
                let latency = (Utc::now() - message.created_at).num_milliseconds().max(0);
                self.reply(channel, &format!("Pong! Latency: `{}ms`", latency))
                    .await;
            }
            Command::Say { channel_id, text } => {
                let target = channel_id.map(Channel::guild).unwrap_or_else(|| channel.clone());
                ctx.send(&target, &text).await?;
            }
            Command::Send { user, amount } => self.transfer(message, &user, &amount).await?,
        }
        Ok(())
    }

    /// Gives currency to `user` and clicks the game's confirmation button.
    async fn transfer(&self, message: &Message, user: &str, amount: &str) -> Result<()> {
        let ctx = &self.ctx;
        let config = ctx.config().await;
        let game_bot_id = config.game_bot_id.clone();
        let wanted = amount.to_string();
        let confirm = ctx
            .send_and_await(
                &message.channel,
                &format!("{} give {} {}", config.game_prefix, user, amount),
                move |m: &Message| {
                    m.is_from(&game_bot_id)
                        && !m.components.is_empty()
                        && m.embeds
                            .first()
                            .and_then(|e| e.description.as_deref())
                            .is_some_and(|d| d.contains(&wanted))
                },
                TRANSFER_CONFIRM_TIMEOUT,
            )
            .await?;
        let Some(confirm) = confirm else {
            warn!(user = %user, "No transfer confirmation received");
            return Ok(());
        };
        let Some(button) = confirm.components.iter().find(|c| {
            c.style == ButtonStyle::Success || c.label.as_deref() == Some("Confirm")
        }) else {
            warn!("Transfer confirmation has no confirm button");
            return Ok(());
        };
        ctx.transport.click(&confirm, &button.id).await?;
        info!(user = %user, amount = %amount, "Transfer confirmed");
        Ok(())
    }
}

#[async_trait]
impl Handler for CommandHandler {
    #[instrument(skip(self, message), fields(identity = %self.ctx.identity.id))]
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        let config = self.ctx.config().await;
        let authorized = message.is_from(&config.user_id)
            || config.admin_id.as_deref().is_some_and(|a| message.is_from(a));
        if !authorized {
            return Ok(HandlerResponse::Continue);
        }

        let command = match Command::parse(&config.prefix, &message.content) {
            Ok(Some(command)) => command,
            Ok(None) => return Ok(HandlerResponse::Continue),
            Err(e) => {
                warn!(error = %e, "Invalid command");
                self.reply(&message.channel, &e.to_string()).await;
                return Ok(HandlerResponse::Stop);
            }
        };

        info!(command = ?command, author_id = %message.author.id, "Executing command");
        self.ctx
            .events
            .push(EventKind::Command, format!("{:?}", command));
        if let Err(e) = self.execute(message, command).await {
            error!(error = %e, "Command failed");
        }
        Ok(HandlerResponse::Stop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!(Command::parse(".", ".unpause").unwrap(), Some(Command::Resume));
        assert_eq!(Command::parse(".", ".KILL").unwrap(), Some(Command::Stop));
        assert_eq!(Command::parse(".", ".info").unwrap(), Some(Command::Status));
        assert_eq!(Command::parse(".", "owo hunt").unwrap(), None);
        assert_eq!(Command::parse(".", ".dance").unwrap(), None);
        assert_eq!(Command::parse(".", ".").unwrap(), None);
    }

    #[test]
    fn test_parse_pause_duration() {
        assert_eq!(Command::parse(".", ".pause").unwrap(), Some(Command::Pause(None)));
        assert_eq!(
            Command::parse(".", ".pause 30m").unwrap(),
            Some(Command::Pause(Some(Duration::from_secs(1800))))
        );
        assert!(Command::parse(".", ".pause soon").is_err());
    }

    #[test]
    fn test_parse_say_and_send() {
        assert_eq!(
            Command::parse("!", "!say 123456789012345678 hello there").unwrap(),
            Some(Command::Say {
                channel_id: Some("123456789012345678".to_string()),
                text: "hello there".to_string()
            })
        );
        assert_eq!(
            Command::parse("!", "!say hi").unwrap(),
            Some(Command::Say {
                channel_id: None,
                text: "hi".to_string()
            })
        );
        assert_eq!(
            Command::parse(".", ".send <@42> 1000").unwrap(),
            Some(Command::Send {
                user: "<@42>".to_string(),
                amount: "1000".to_string()
            })
        );
        assert!(Command::parse(".", ".send <@42>").is_err());
    }
}
