//! Independent, self-rescheduling cycle per registered automation.
//!
//! Each cycle: idle-poll while halted or the transport is not ready; otherwise run the
//! automation if enabled (errors and panics are contained to that run), then sleep a freshly
//! drawn cooldown. First runs are staggered so automations never fire together at startup.

use async_trait::async_trait;
use futures::FutureExt;
use grind_core::{GrindError, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::AccountConfig;
use crate::context::AutomationContext;
use crate::events::EventKind;
use crate::pacing::CooldownWindow;

/// One repeating unit of work.
#[async_trait]
pub trait Automation: Send + Sync {
    /// Unique within a scheduler.
    fn name(&self) -> &str;

    fn enabled(&self, config: &AccountConfig) -> bool;

    /// Delay before the next cycle; drawn fresh on every call.
    fn cooldown(&self) -> Duration;

    async fn run(&self, ctx: &AutomationContext) -> Result<()>;
}

#[derive(Debug, Clone, Copy)]
pub struct SchedulerConfig {
    /// Random base delay before an automation's first cycle.
    pub initial_jitter: CooldownWindow,
    /// Added per registration index on top of the jitter.
    pub stagger_step: Duration,
    /// Re-check interval while halted or not ready. Does not consume a cooldown.
    pub poll_interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            initial_jitter: CooldownWindow::from_millis(1000, 3000),
            stagger_step: Duration::from_secs(4),
            poll_interval: Duration::from_secs(5),
        }
    }
}

impl SchedulerConfig {
    pub fn initial_delay(&self, index: usize) -> Duration {
        self.initial_jitter.sample() + self.stagger_step * index as u32
    }
}

pub struct Scheduler {
    ctx: Arc<AutomationContext>,
    config: SchedulerConfig,
    automations: Vec<Arc<dyn Automation>>,
    cycles: Mutex<HashMap<String, JoinHandle<()>>>,
    token: Mutex<CancellationToken>,
}

impl Scheduler {
    pub fn new(ctx: Arc<AutomationContext>, config: SchedulerConfig) -> Self {
        Self {
            ctx,
            config,
            automations: Vec::new(),
            cycles: Mutex::new(HashMap::new()),
            token: Mutex::new(CancellationToken::new()),
        }
    }

    /// Adds a definition. Names must be unique.
    pub fn register(&mut self, automation: Arc<dyn Automation>) -> Result<()> {
        if self.automations.iter().any(|a| a.name() == automation.name()) {
            return Err(GrindError::Config(format!(
                "automation '{}' registered twice",
                automation.name()
            )));
        }
        self.automations.push(automation);
        Ok(())
    }

    pub fn names(&self) -> Vec<String> {
        self.automations.iter().map(|a| a.name().to_string()).collect()
    }

    /// Number of live cycle handles.
    pub fn live_cycles(&self) -> usize {
        self.cycles
            .lock()
            .values()
            .filter(|handle| !handle.is_finished())
            .count()
    }

    /// Launches one cycle per registered automation that has no live cycle yet.
    ///
    /// After a `stop`, a cycle whose last run is still in flight is replaced by one that first
    /// waits for that run to return, so one name never has two runs at once.
    pub fn start(&self) {
        let (token, restarted) = {
            let mut token = self.token.lock();
            let restarted = token.is_cancelled();
            if restarted {
                *token = CancellationToken::new();
            }
            (token.clone(), restarted)
        };

        let mut cycles = self.cycles.lock();
        for (index, automation) in self.automations.iter().enumerate() {
            let name = automation.name().to_string();
            let previous = match cycles.remove(&name) {
                Some(handle) if !handle.is_finished() => {
                    if !restarted {
                        cycles.insert(name, handle);
                        continue;
                    }
                    Some(handle)
                }
                _ => None,
            };
            let delay = self.config.initial_delay(index);
            info!(
                identity = %self.ctx.identity.id,
                automation = %name,
                "[scheduler] Scheduled {} to start in {:.1}s",
                name,
                delay.as_secs_f64()
            );
            let cycle = run_cycle(
                Arc::clone(automation),
                Arc::clone(&self.ctx),
                self.config,
                token.clone(),
                delay,
            );
            let label = name.clone();
            let handle = tokio::spawn(async move {
                if let Some(previous) = previous {
                    debug!(automation = %label, "Waiting for the stopped cycle to finish");
                    if let Err(e) = previous.await {
                        warn!(automation = %label, error = %e, "Stopped cycle ended abnormally");
                    }
                }
                cycle.await;
            });
            cycles.insert(name, handle);
        }
    }

    /// Cancels every pending cycle. In-flight runs finish; nothing is scheduled after. Idempotent.
    pub fn stop(&self) {
        self.token.lock().cancel();
        let mut cycles = self.cycles.lock();
        cycles.retain(|_, handle| !handle.is_finished());
        if !cycles.is_empty() {
            info!(
                identity = %self.ctx.identity.id,
                cycles = cycles.len(),
                "[scheduler] Stopped"
            );
        }
    }

    /// Like [`stop`](Self::stop), then waits for in-flight runs to return.
    pub async fn shutdown(&self) {
        self.token.lock().cancel();
        let drained: Vec<_> = self.cycles.lock().drain().collect();
        for (name, handle) in drained {
            if let Err(e) = handle.await {
                warn!(automation = %name, error = %e, "Cycle task ended abnormally");
            }
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.token.lock().cancel();
    }
}

/// Sleeps `delay`; false if cancelled first.
async fn sleep_or_cancel(token: &CancellationToken, delay: Duration) -> bool {
    tokio::select! {
        biased;
        _ = token.cancelled() => false,
        _ = tokio::time::sleep(delay) => !token.is_cancelled(),
    }
}

async fn run_cycle(
    automation: Arc<dyn Automation>,
    ctx: Arc<AutomationContext>,
    config: SchedulerConfig,
    token: CancellationToken,
    initial_delay: Duration,
) {
    if !sleep_or_cancel(&token, initial_delay).await {
        return;
    }
    loop {
        let Some(delay) = cycle_once(automation.as_ref(), &ctx, &config, &token).await else {
            return;
        };
        if !sleep_or_cancel(&token, delay).await {
            return;
        }
    }
}

/// One pass; returns the delay before the next, or `None` when cancelled.
async fn cycle_once(
    automation: &dyn Automation,
    ctx: &AutomationContext,
    config: &SchedulerConfig,
    token: &CancellationToken,
) -> Option<Duration> {
    if ctx.interrupt.is_halted() || !ctx.transport.is_ready() {
        debug!(automation = automation.name(), "Halted or not ready, polling");
        return Some(config.poll_interval);
    }

    let account = ctx.config().await;
    if automation.enabled(&account) {
        if token.is_cancelled() {
            return None;
        }
        let outcome = AssertUnwindSafe(automation.run(ctx)).catch_unwind().await;
        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                error!(
                    identity = %ctx.identity.id,
                    automation = automation.name(),
                    error = %e,
                    "Automation run failed"
                );
                ctx.events.push(
                    EventKind::AutomationFailed,
                    format!("{}: {}", automation.name(), e),
                );
            }
            Err(_) => {
                error!(
                    identity = %ctx.identity.id,
                    automation = automation.name(),
                    "Automation run panicked"
                );
                ctx.events.push(
                    EventKind::AutomationFailed,
                    format!("{}: panicked", automation.name()),
                );
            }
        }
    }

    Some(automation.cooldown())
}
