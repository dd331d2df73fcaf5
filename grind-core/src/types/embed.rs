//! Rich content carried by a message: embeds, attachments, interactive components.

use serde::{Deserialize, Serialize};

/// A named field inside an embed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
}

/// Structured embed (title, description, author line, named fields).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embed {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub fields: Vec<EmbedField>,
}

impl Embed {
    /// All textual parts joined with newlines, in title/author/description/fields order.
    pub fn text(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        if let Some(t) = &self.title {
            parts.push(t);
        }
        if let Some(a) = &self.author_name {
            parts.push(a);
        }
        if let Some(d) = &self.description {
            parts.push(d);
        }
        for f in &self.fields {
            parts.push(&f.name);
            parts.push(&f.value);
        }
        parts.join("\n")
    }

    /// First field whose name contains `needle` (case-insensitive).
    pub fn field_containing(&self, needle: &str) -> Option<&EmbedField> {
        let needle = needle.to_lowercase();
        self.fields
            .iter()
            .find(|f| f.name.to_lowercase().contains(&needle))
    }
}

/// File attached to a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub url: String,
    #[serde(default)]
    pub filename: Option<String>,
}

/// Visual style of a button component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonStyle {
    #[default]
    Primary,
    Secondary,
    Success,
    Danger,
    Link,
}

/// Interactive component (button). Action rows are flattened by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub style: ButtonStyle,
}
