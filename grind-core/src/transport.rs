//! Outbound side of the chat platform.
//!
//! [`Transport`] is platform-agnostic: automations and inbound handlers only ever talk to the
//! channel through it. Inbound messages are pushed into the runtime by whoever owns the
//! platform connection (see `GrindBot::dispatch` in grind-runtime).

use crate::error::Result;
use crate::types::{Channel, Message};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Reference to a message the transport just posted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentMessage {
    pub id: String,
    pub channel_id: String,
}

/// Abstraction for talking to the remote chat platform. Implementations map to a concrete client.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Whether the connection is logged in and usable. Scheduler cycles idle while this is false.
    fn is_ready(&self) -> bool;

    /// Sends plain text to a channel.
    async fn send(&self, channel: &Channel, text: &str) -> Result<SentMessage>;

    /// Clicks an interactive component (button) on a received message.
    async fn click(&self, message: &Message, component_id: &str) -> Result<()>;

    /// Sends a direct message to a user, out of band of the game channel.
    async fn send_direct(&self, user_id: &str, text: &str) -> Result<()>;
}
