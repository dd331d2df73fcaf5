//! Classifies inbound game messages as anti-automation challenges.
//!
//! Matching runs on normalized text (invisible formatting stripped, lowercased, whitespace
//! collapsed). A message is considered only if it is addressed to this identity. The phrase
//! lists come from [`ChallengeConfig`] and are heuristics, not a contract.

use grind_core::{Message, User};
use parking_lot::Mutex;
use regex::{Regex, RegexBuilder};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::ChallengeConfig;

const INVISIBLE: &[char] = &[
    '\u{200B}', '\u{200C}', '\u{200D}', '\u{200E}', '\u{200F}', '\u{2060}', '\u{2061}',
    '\u{2062}', '\u{2063}', '\u{2064}', '\u{FEFF}', '\u{00AD}',
];

/// Strips zero-width and markdown emphasis characters, lowercases, collapses whitespace.
pub fn normalize(text: &str) -> String {
    let stripped: String = text
        .chars()
        .filter(|c| !INVISIBLE.contains(c) && *c != '*')
        .collect();
    stripped
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether `message` is for `me`: a DM, a reply to one of `me`'s messages, an explicit mention,
/// or normalized text naming `me` by username, display name or id.
pub fn is_addressed_to(message: &Message, me: &User) -> bool {
    if message.is_direct() || message.is_reply_to_user(&me.id) || message.mentions_user(&me.id) {
        return true;
    }
    let text = normalize(&message.content);
    let names = [
        Some(me.username.as_str()),
        me.display_name.as_deref(),
        Some(me.id.as_str()),
    ];
    names
        .into_iter()
        .flatten()
        .map(normalize)
        .any(|name| !name.is_empty() && text.contains(&name))
}

fn normalize_all(list: &[String]) -> Vec<String> {
    list.iter()
        .map(|s| normalize(s))
        .filter(|s| !s.is_empty())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Not for this identity; ignored.
    NotAddressed,
    Clear,
    Challenge { reason: String },
}

impl Verdict {
    pub fn is_challenge(&self) -> bool {
        matches!(self, Verdict::Challenge { .. })
    }
}

pub struct ChallengeClassifier {
    keywords: Vec<String>,
    exclusions: Vec<String>,
    embed_keywords: Vec<String>,
    patterns: Vec<Regex>,
}

impl ChallengeClassifier {
    /// Builds from config. Patterns that fail to compile are logged and skipped
    /// (config validation rejects them earlier).
    pub fn from_config(config: &ChallengeConfig) -> Self {
        let patterns = config
            .patterns
            .iter()
            .filter_map(|p| {
                match RegexBuilder::new(p).case_insensitive(true).multi_line(true).build() {
                    Ok(re) => Some(re),
                    Err(e) => {
                        warn!(pattern = %p, error = %e, "Skipping invalid challenge pattern");
                        None
                    }
                }
            })
            .collect();
        Self {
            keywords: normalize_all(&config.keywords),
            exclusions: normalize_all(&config.exclusions),
            embed_keywords: normalize_all(&config.embed_keywords),
            patterns,
        }
    }

    pub fn classify(&self, message: &Message, me: &User) -> Verdict {
        if !is_addressed_to(message, me) {
            return Verdict::NotAddressed;
        }

        let text = normalize(&message.content);
        let embed = normalize(&message.embed_text());
        let excluded = |t: &str| self.exclusions.iter().any(|e| t.contains(e.as_str()));

        if !excluded(&text) {
            if let Some(k) = self.keywords.iter().find(|k| text.contains(k.as_str())) {
                return Verdict::Challenge {
                    reason: format!("keyword '{}'", k),
                };
            }
        }
        if !embed.is_empty() && !excluded(&embed) {
            if let Some(k) = self.embed_keywords.iter().find(|k| embed.contains(k.as_str())) {
                return Verdict::Challenge {
                    reason: format!("embed keyword '{}'", k),
                };
            }
        }
        if message.is_direct() && (text.contains("link") || message.has_attachments()) {
            return Verdict::Challenge {
                reason: "suspicious direct message".to_string(),
            };
        }
        if self.patterns.iter().any(|re| re.is_match(&text)) {
            return Verdict::Challenge {
                reason: "challenge phrase".to_string(),
            };
        }
        Verdict::Clear
    }
}

/// The classifier built from the last seen [`ChallengeConfig`]; rebuilt only when it changes.
#[derive(Default)]
pub struct ClassifierCache {
    cached: Mutex<Option<(ChallengeConfig, Arc<ChallengeClassifier>)>>,
}

impl ClassifierCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, config: &ChallengeConfig) -> Arc<ChallengeClassifier> {
        let mut cached = self.cached.lock();
        if let Some((seen, classifier)) = cached.as_ref() {
            if seen == config {
                return Arc::clone(classifier);
            }
        }
        debug!("Building challenge classifier");
        let classifier = Arc::new(ChallengeClassifier::from_config(config));
        *cached = Some((config.clone(), Arc::clone(&classifier)));
        classifier
    }
}
