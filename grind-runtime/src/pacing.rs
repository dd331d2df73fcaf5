//! Randomized pacing: cooldown windows, random sleeps, and human-readable durations.

use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Inclusive `[min_ms, max_ms]` window. Every [`sample`](Self::sample) draws a fresh uniform value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CooldownWindow {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl CooldownWindow {
    pub const fn from_millis(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    pub const fn from_secs(min: u64, max: u64) -> Self {
        Self {
            min_ms: min * 1000,
            max_ms: max * 1000,
        }
    }

    pub fn min(&self) -> Duration {
        Duration::from_millis(self.min_ms)
    }

    pub fn max(&self) -> Duration {
        Duration::from_millis(self.max_ms)
    }

    pub fn is_valid(&self) -> bool {
        self.min_ms <= self.max_ms
    }

    /// Uniform random duration in the window. A degenerate window (min >= max) yields min.
    pub fn sample(&self) -> Duration {
        if self.max_ms <= self.min_ms {
            return self.min();
        }
        let ms = rand::rng().random_range(self.min_ms..=self.max_ms);
        Duration::from_millis(ms)
    }
}

/// Sleeps for a random duration drawn from `window`.
pub async fn sleep_between(window: CooldownWindow) {
    tokio::time::sleep(window.sample()).await;
}

static DURATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+)([smhd])$").expect("duration pattern is valid")
});

/// Parses `45s`, `30m`, `1h`, `2d`. Anything else is `None`.
pub fn parse_duration(text: &str) -> Option<Duration> {
    let caps = DURATION_RE.captures(text.trim())?;
    let value: u64 = caps[1].parse().ok()?;
    let secs = match &caps[2] {
        "s" => value,
        "m" => value.checked_mul(60)?,
        "h" => value.checked_mul(3600)?,
        "d" => value.checked_mul(86_400)?,
        _ => return None,
    };
    Some(Duration::from_secs(secs))
}

/// `1h 2m 3s` style rendering, hours wrap at a day; zero renders as `0s`.
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    let s = total % 60;
    let m = (total / 60) % 60;
    let h = (total / 3600) % 24;

    let mut parts = Vec::new();
    if h > 0 {
        parts.push(format!("{}h", h));
    }
    if m > 0 {
        parts.push(format!("{}m", m));
    }
    if s > 0 {
        parts.push(format!("{}s", s));
    }
    if parts.is_empty() {
        "0s".to_string()
    } else {
        parts.join(" ")
    }
}
