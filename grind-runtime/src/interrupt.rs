//! Running / Paused / ChallengeDetected gate consulted by every scheduler cycle.
//!
//! Both flags live behind one lock so readers always see a consistent pair.
//! `challenge_detected` implies `paused`. Every transition bumps an epoch; delayed transitions
//! (timed resume, post-solve settle) only apply if no other transition happened meanwhile.

use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Running,
    Paused,
    ChallengeDetected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InterruptSnapshot {
    pub paused: bool,
    pub challenge_detected: bool,
}

impl InterruptSnapshot {
    pub fn state(&self) -> RunState {
        if self.challenge_detected {
            RunState::ChallengeDetected
        } else if self.paused {
            RunState::Paused
        } else {
            RunState::Running
        }
    }
}

#[derive(Debug, Default)]
struct Flags {
    paused: bool,
    challenge_detected: bool,
    epoch: u64,
}

#[derive(Debug, Default)]
pub struct InterruptState {
    flags: Mutex<Flags>,
}

impl InterruptState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> InterruptSnapshot {
        let flags = self.flags.lock();
        InterruptSnapshot {
            paused: flags.paused,
            challenge_detected: flags.challenge_detected,
        }
    }

    pub fn state(&self) -> RunState {
        self.snapshot().state()
    }

    /// True in Paused and ChallengeDetected.
    pub fn is_halted(&self) -> bool {
        self.flags.lock().paused
    }

    /// Manual pause. Returns false if already paused.
    pub fn pause(&self) -> bool {
        self.pause_with_epoch().is_some()
    }

    fn pause_with_epoch(&self) -> Option<u64> {
        let mut flags = self.flags.lock();
        if flags.paused {
            return None;
        }
        flags.paused = true;
        flags.epoch += 1;
        Some(flags.epoch)
    }

    /// Pauses now and schedules `Paused -> Running` after `duration`.
    /// The automatic resume is dropped if anything else transitions the state first.
    /// Returns `None` if already paused.
    pub fn pause_for(self: &Arc<Self>, duration: Duration) -> Option<JoinHandle<bool>> {
        let epoch = self.pause_with_epoch()?;
        let state = Arc::clone(self);
        Some(tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            let mut flags = state.flags.lock();
            if flags.epoch == epoch && flags.paused && !flags.challenge_detected {
                flags.paused = false;
                flags.epoch += 1;
                info!("Auto-resumed after timed pause");
                true
            } else {
                false
            }
        }))
    }

    /// Clears both flags in one step. Returns the state that was left.
    pub fn resume(&self) -> RunState {
        let mut flags = self.flags.lock();
        let previous = InterruptSnapshot {
            paused: flags.paused,
            challenge_detected: flags.challenge_detected,
        }
        .state();
        flags.paused = false;
        flags.challenge_detected = false;
        flags.epoch += 1;
        previous
    }

    /// Enters ChallengeDetected (forcing paused). Returns true only when the state was not
    /// already ChallengeDetected.
    pub fn detect_challenge(&self) -> bool {
        let mut flags = self.flags.lock();
        let entered = !flags.challenge_detected;
        flags.challenge_detected = true;
        flags.paused = true;
        flags.epoch += 1;
        entered
    }

    /// After `settle`, clears both flags if the state is still the ChallengeDetected this call saw.
    pub fn clear_challenge_after(self: &Arc<Self>, settle: Duration) -> JoinHandle<bool> {
        let epoch = self.flags.lock().epoch;
        let state = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(settle).await;
            let mut flags = state.flags.lock();
            if flags.epoch == epoch && flags.challenge_detected {
                flags.challenge_detected = false;
                flags.paused = false;
                flags.epoch += 1;
                info!("Resumed after challenge solve");
                true
            } else {
                warn!("Challenge state changed during settle delay, not resuming");
                false
            }
        })
    }
}
