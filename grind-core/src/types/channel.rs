//! Channel identity type for core messages.

use serde::{Deserialize, Serialize};

/// Kind of channel a message arrived in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    #[default]
    Guild,
    Direct,
}

/// Channel (guild text channel or direct message) identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    #[serde(default)]
    pub kind: ChannelKind,
}

impl Channel {
    pub fn guild(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: ChannelKind::Guild,
        }
    }

    pub fn direct(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: ChannelKind::Direct,
        }
    }

    pub fn is_direct(&self) -> bool {
        self.kind == ChannelKind::Direct
    }
}
