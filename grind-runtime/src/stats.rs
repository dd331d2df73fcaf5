//! Per-identity counters exposed to the dashboard as read-only snapshots.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    Hunts,
    Battles,
    Prays,
    Curses,
    HuntBots,
    GemsUsed,
    CaptchasDetected,
    CaptchasSolved,
}

#[derive(Debug, Default)]
pub struct Stats {
    hunts: AtomicU64,
    battles: AtomicU64,
    prays: AtomicU64,
    curses: AtomicU64,
    huntbots: AtomicU64,
    gems_used: AtomicU64,
    captchas_detected: AtomicU64,
    captchas_solved: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub hunts: u64,
    pub battles: u64,
    pub prays: u64,
    pub curses: u64,
    pub huntbots: u64,
    pub gems_used: u64,
    pub captchas_detected: u64,
    pub captchas_solved: u64,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, counter: Counter) -> &AtomicU64 {
        match counter {
            Counter::Hunts => &self.hunts,
            Counter::Battles => &self.battles,
            Counter::Prays => &self.prays,
            Counter::Curses => &self.curses,
            Counter::HuntBots => &self.huntbots,
            Counter::GemsUsed => &self.gems_used,
            Counter::CaptchasDetected => &self.captchas_detected,
            Counter::CaptchasSolved => &self.captchas_solved,
        }
    }

    pub fn incr(&self, counter: Counter) {
        self.add(counter, 1);
    }

    pub fn add(&self, counter: Counter, amount: u64) {
        self.slot(counter).fetch_add(amount, Ordering::Relaxed);
    }

    pub fn get(&self, counter: Counter) -> u64 {
        self.slot(counter).load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            hunts: self.get(Counter::Hunts),
            battles: self.get(Counter::Battles),
            prays: self.get(Counter::Prays),
            curses: self.get(Counter::Curses),
            huntbots: self.get(Counter::HuntBots),
            gems_used: self.get(Counter::GemsUsed),
            captchas_detected: self.get(Counter::CaptchasDetected),
            captchas_solved: self.get(Counter::CaptchasSolved),
        }
    }
}
