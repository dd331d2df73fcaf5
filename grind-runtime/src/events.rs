//! Rolling event feed for the dashboard: a bounded history plus a live broadcast.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::VecDeque;
use tokio::sync::broadcast;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    StateChanged,
    ChallengeDetected,
    ChallengeSolved,
    AutomationFailed,
    Command,
    Info,
}

#[derive(Debug, Clone, Serialize)]
pub struct BotEvent {
    pub at: DateTime<Utc>,
    pub identity: String,
    pub kind: EventKind,
    pub message: String,
}

pub struct EventFeed {
    identity: String,
    capacity: usize,
    history: Mutex<VecDeque<BotEvent>>,
    live: broadcast::Sender<BotEvent>,
}

impl EventFeed {
    pub fn new(identity: impl Into<String>, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (live, _) = broadcast::channel(capacity);
        Self {
            identity: identity.into(),
            capacity,
            history: Mutex::new(VecDeque::with_capacity(capacity)),
            live,
        }
    }

    pub fn push(&self, kind: EventKind, message: impl Into<String>) {
        let event = BotEvent {
            at: Utc::now(),
            identity: self.identity.clone(),
            kind,
            message: message.into(),
        };
        {
            let mut history = self.history.lock();
            if history.len() == self.capacity {
                history.pop_front();
            }
            history.push_back(event.clone());
        }
        // No live subscribers is fine.
        let _ = self.live.send(event);
    }

    /// Oldest first.
    pub fn recent(&self) -> Vec<BotEvent> {
        self.history.lock().iter().cloned().collect()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BotEvent> {
        self.live.subscribe()
    }
}
