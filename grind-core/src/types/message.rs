//! Message type for the core model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    channel::Channel,
    embed::{Attachment, Component, Embed},
    user::User,
};

/// The message this one replies to, with its author when the transport could resolve it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageReference {
    pub message_id: String,
    #[serde(default)]
    pub author_id: Option<String>,
}

/// A single inbound message: author, channel, text, and the rich parts reply matching looks at.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub author: User,
    pub channel: Channel,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub embeds: Vec<Embed>,
    #[serde(default)]
    pub components: Vec<Component>,
    /// Ids of users explicitly mentioned.
    #[serde(default)]
    pub mentions: Vec<String>,
    #[serde(default)]
    pub reference: Option<MessageReference>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Plain text message with no rich parts.
    pub fn text(id: impl Into<String>, author: User, channel: Channel, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            author,
            channel,
            content: content.into(),
            attachments: Vec::new(),
            embeds: Vec::new(),
            components: Vec::new(),
            mentions: Vec::new(),
            reference: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_from(&self, user_id: &str) -> bool {
        self.author.id == user_id
    }

    pub fn is_direct(&self) -> bool {
        self.channel.is_direct()
    }

    pub fn has_attachments(&self) -> bool {
        !self.attachments.is_empty()
    }

    pub fn first_attachment_url(&self) -> Option<&str> {
        self.attachments.first().map(|a| a.url.as_str())
    }

    pub fn mentions_user(&self, user_id: &str) -> bool {
        self.mentions.iter().any(|m| m == user_id)
    }

    pub fn is_reply_to_user(&self, user_id: &str) -> bool {
        self.reference
            .as_ref()
            .and_then(|r| r.author_id.as_deref())
            .is_some_and(|a| a == user_id)
    }

    /// Text of every embed, joined.
    pub fn embed_text(&self) -> String {
        self.embeds
            .iter()
            .map(Embed::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// True when `needle` appears in the content or in the first embed's author line or description.
    pub fn names(&self, needle: &str) -> bool {
        if needle.is_empty() {
            return false;
        }
        if self.content.contains(needle) {
            return true;
        }
        self.embeds.first().is_some_and(|e| {
            e.author_name.as_deref().is_some_and(|a| a.contains(needle))
                || e.description.as_deref().is_some_and(|d| d.contains(needle))
        })
    }
}
