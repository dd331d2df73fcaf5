//! Console transport: outbound traffic is printed, inbound traffic is read from stdin.
//!
//! Each stdin line is either a full JSON [`Message`] or plain text, which is treated as typed by
//! the main account in its first channel (handy for `.status`, `.pause 10m`).

use async_trait::async_trait;
use grind_core::{Channel, Message, Result, SentMessage, ToCoreMessage, Transport, User};
use grind_runtime::GrindBot;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub struct ConsoleTransport {
    label: String,
    next_id: AtomicU64,
}

impl ConsoleTransport {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            next_id: AtomicU64::new(1),
        }
    }

    fn next_id(&self) -> String {
        format!("console-{}", self.next_id.fetch_add(1, Ordering::Relaxed))
    }
}

#[async_trait]
impl Transport for ConsoleTransport {
    fn is_ready(&self) -> bool {
        true
    }

    async fn send(&self, channel: &Channel, text: &str) -> Result<SentMessage> {
        println!("[{}] #{} > {}", self.label, channel.id, text);
        Ok(SentMessage {
            id: self.next_id(),
            channel_id: channel.id.clone(),
        })
    }

    async fn click(&self, message: &Message, component_id: &str) -> Result<()> {
        println!("[{}] click {} on {}", self.label, component_id, message.id);
        Ok(())
    }

    async fn send_direct(&self, user_id: &str, text: &str) -> Result<()> {
        println!("[{}] dm @{} > {}", self.label, user_id, text);
        Ok(())
    }
}

/// A plain text line typed at the console.
pub struct TypedLine {
    pub id: String,
    pub author: User,
    pub channel_id: String,
    pub text: String,
}

impl ToCoreMessage for TypedLine {
    fn to_core(&self) -> Message {
        Message::text(
            self.id.clone(),
            self.author.clone(),
            Channel::guild(self.channel_id.clone()),
            self.text.clone(),
        )
    }
}

/// Turns one stdin line into a message. Empty lines yield `None`.
pub fn parse_line(line: &str, author: &User, channel_id: &str, seq: u64) -> Option<Message> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    if line.starts_with('{') {
        match serde_json::from_str::<Message>(line) {
            Ok(message) => return Some(message),
            Err(e) => warn!(error = %e, "Console line looks like JSON but is not a message; sending as text"),
        }
    }
    let typed = TypedLine {
        id: format!("stdin-{}", seq),
        author: author.clone(),
        channel_id: channel_id.to_string(),
        text: line.to_string(),
    };
    Some(typed.to_core())
}

/// Reads stdin until EOF or `shutdown`, dispatching every line to every bot.
pub async fn pump_stdin(
    bots: Vec<Arc<GrindBot>>,
    author: User,
    channel_id: String,
    shutdown: CancellationToken,
) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut seq = 0u64;
    loop {
        let line = tokio::select! {
            _ = shutdown.cancelled() => break,
            line = lines.next_line() => line,
        };
        match line {
            Ok(Some(line)) => {
                seq += 1;
                let Some(message) = parse_line(&line, &author, &channel_id, seq) else {
                    continue;
                };
                debug!(message_id = %message.id, "Console message");
                for bot in &bots {
                    bot.dispatch(message.clone());
                }
            }
            Ok(None) => {
                info!("Console input closed");
                break;
            }
            Err(e) => {
                warn!(error = %e, "Console read failed");
                break;
            }
        }
    }
}
