//! Cross-cycle hunting sub-state, one entry per automated identity.
//!
//! `processing` is owned by a [`HuntGuard`]; dropping the guard clears it, so every exit path of
//! a hunting cycle (early return, `?`, panic) releases the slot.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HuntingSubState {
    /// Not eligible before this instant. `None` means eligible now.
    pub next_eligible_at: Option<Instant>,
    pub processing: bool,
}

impl HuntingSubState {
    pub fn is_eligible(&self, now: Instant) -> bool {
        !self.processing && self.next_eligible_at.map_or(true, |at| now >= at)
    }
}

#[derive(Clone, Default)]
pub struct HuntingStates {
    states: Arc<Mutex<HashMap<String, HuntingSubState>>>,
}

impl HuntingStates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, identity: &str) -> HuntingSubState {
        self.states.lock().get(identity).copied().unwrap_or_default()
    }

    /// Marks `identity` as processing if it is eligible at `now`.
    pub fn try_begin(&self, identity: &str, now: Instant) -> Option<HuntGuard> {
        let mut states = self.states.lock();
        let state = states.entry(identity.to_string()).or_default();
        if !state.is_eligible(now) {
            return None;
        }
        state.processing = true;
        Some(HuntGuard {
            states: self.clone(),
            identity: identity.to_string(),
        })
    }

    pub fn set_next_eligible(&self, identity: &str, at: Instant) {
        self.states
            .lock()
            .entry(identity.to_string())
            .or_default()
            .next_eligible_at = Some(at);
    }

    fn release(&self, identity: &str) {
        if let Some(state) = self.states.lock().get_mut(identity) {
            state.processing = false;
        }
    }
}

/// Held for the duration of one hunting cycle.
pub struct HuntGuard {
    states: HuntingStates,
    identity: String,
}

impl HuntGuard {
    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn defer_until(&self, at: Instant) {
        self.states.set_next_eligible(&self.identity, at);
    }
}

impl Drop for HuntGuard {
    fn drop(&mut self) {
        self.states.release(&self.identity);
    }
}
