//! Integration tests for [`grind_runtime::Scheduler`].
//!
//! Covers: stop before first fire leaves no sends, cycles repeat within their cooldown window,
//! halted / not-ready identities poll without running, failures and panics stay isolated to
//! one automation, a restart never overlaps a stopped in-flight run, duplicate names are
//! rejected.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::mock_transport::{test_config, MockTransport, CHANNEL_ID};
use grind_core::{Channel, GrindError, Result};
use grind_runtime::{
    AccountConfig, Automation, AutomationContext, CooldownWindow, EventKind, Scheduler,
    SchedulerConfig,
};

struct SendingAutomation {
    name: &'static str,
    window: CooldownWindow,
    enabled: bool,
    runs: Arc<AtomicUsize>,
}

impl SendingAutomation {
    fn new(name: &'static str, window: CooldownWindow) -> Self {
        Self {
            name,
            window,
            enabled: true,
            runs: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl Automation for SendingAutomation {
    fn name(&self) -> &str {
        self.name
    }

    fn enabled(&self, _config: &AccountConfig) -> bool {
        self.enabled
    }

    fn cooldown(&self) -> Duration {
        self.window.sample()
    }

    async fn run(&self, ctx: &AutomationContext) -> Result<()> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        ctx.send(&Channel::guild(CHANNEL_ID), self.name).await?;
        Ok(())
    }
}

struct FailingAutomation {
    panic: bool,
}

#[async_trait]
impl Automation for FailingAutomation {
    fn name(&self) -> &str {
        if self.panic {
            "panicking"
        } else {
            "failing"
        }
    }

    fn enabled(&self, _config: &AccountConfig) -> bool {
        true
    }

    fn cooldown(&self) -> Duration {
        Duration::from_millis(100)
    }

    async fn run(&self, _ctx: &AutomationContext) -> Result<()> {
        if self.panic {
            panic!("boom");
        }
        Err(GrindError::Parse("unexpected reply".to_string()))
    }
}

/// Takes a full second per run and records how many runs overlap.
#[derive(Default)]
struct SlowAutomation {
    active: AtomicUsize,
    peak: AtomicUsize,
    runs: AtomicUsize,
}

#[async_trait]
impl Automation for SlowAutomation {
    fn name(&self) -> &str {
        "slow"
    }

    fn enabled(&self, _config: &AccountConfig) -> bool {
        true
    }

    fn cooldown(&self) -> Duration {
        Duration::from_millis(100)
    }

    async fn run(&self, _ctx: &AutomationContext) -> Result<()> {
        let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now_active, Ordering::SeqCst);
        self.runs.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(1)).await;
        self.active.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}

fn immediate() -> SchedulerConfig {
    SchedulerConfig {
        initial_jitter: CooldownWindow::from_millis(0, 0),
        stagger_step: Duration::ZERO,
        poll_interval: Duration::from_secs(5),
    }
}

fn context(transport: &Arc<MockTransport>) -> Arc<AutomationContext> {
    Arc::new(AutomationContext::new(test_config(), transport.clone()))
}

/// **Test: stop() before any automation fires means zero sends, ever.**
///
/// **Setup:** Two automations with windows [100ms,150ms] and [1s,1.2s]; first run due at 60-80ms.
/// **Action:** start, stop at t=50ms, advance to t=2s.
/// **Expected:** no send recorded; no live cycles.
#[tokio::test(start_paused = true)]
async fn test_stop_before_first_fire_sends_nothing() {
    common::init_test_tracing();
    let transport = MockTransport::new();
    let config = SchedulerConfig {
        initial_jitter: CooldownWindow::from_millis(60, 80),
        stagger_step: Duration::ZERO,
        poll_interval: Duration::from_secs(5),
    };
    let mut scheduler = Scheduler::new(context(&transport), config);
    scheduler
        .register(Arc::new(SendingAutomation::new(
            "fast",
            CooldownWindow::from_millis(100, 150),
        )))
        .unwrap();
    scheduler
        .register(Arc::new(SendingAutomation::new(
            "slow",
            CooldownWindow::from_millis(1000, 1200),
        )))
        .unwrap();

    scheduler.start();
    tokio::time::sleep(Duration::from_millis(50)).await;
    scheduler.stop();
    tokio::time::sleep(Duration::from_millis(1950)).await;

    assert_eq!(transport.sent_count(), 0);
    assert_eq!(scheduler.live_cycles(), 0);

    // Idempotent.
    scheduler.stop();
}

/// **Test: stop() while cycles are running halts all future sends.**
///
/// **Setup:** One fast automation, started immediately.
/// **Action:** run 500ms, stop, record count, advance 2s.
/// **Expected:** some sends before stop; none after.
#[tokio::test(start_paused = true)]
async fn test_stop_mid_flight_cancels_future_cycles() {
    let transport = MockTransport::new();
    let mut scheduler = Scheduler::new(context(&transport), immediate());
    scheduler
        .register(Arc::new(SendingAutomation::new(
            "fast",
            CooldownWindow::from_millis(100, 150),
        )))
        .unwrap();

    scheduler.start();
    tokio::time::sleep(Duration::from_millis(500)).await;
    scheduler.stop();
    let before = transport.sent_count();
    assert!(before > 0);

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(transport.sent_count(), before);
}

/// **Test: restarting while a stopped run is still in flight never overlaps runs.**
///
/// **Setup:** One automation whose run takes 1s, started immediately.
/// **Action:** stop at 100ms (run still in flight), start again, advance 3s.
/// **Expected:** at most one run at a time; the restarted cycle runs after the old run returns;
/// one live cycle.
#[tokio::test(start_paused = true)]
async fn test_restart_waits_for_in_flight_run() {
    let transport = MockTransport::new();
    let automation = Arc::new(SlowAutomation::default());
    let mut scheduler = Scheduler::new(context(&transport), immediate());
    scheduler.register(automation.clone()).unwrap();

    scheduler.start();
    tokio::time::sleep(Duration::from_millis(100)).await;
    scheduler.stop();
    assert_eq!(scheduler.live_cycles(), 1);
    scheduler.start();

    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(automation.peak.load(Ordering::SeqCst), 1);
    assert!(automation.runs.load(Ordering::SeqCst) >= 2);
    assert_eq!(scheduler.live_cycles(), 1);
    scheduler.shutdown().await;
}

/// **Test: start() on a running scheduler does not add a second cycle.**
#[tokio::test(start_paused = true)]
async fn test_start_twice_keeps_one_cycle() {
    let transport = MockTransport::new();
    let automation = Arc::new(SlowAutomation::default());
    let mut scheduler = Scheduler::new(context(&transport), immediate());
    scheduler.register(automation.clone()).unwrap();

    scheduler.start();
    tokio::time::sleep(Duration::from_millis(100)).await;
    scheduler.start();
    tokio::time::sleep(Duration::from_secs(3)).await;

    assert_eq!(automation.peak.load(Ordering::SeqCst), 1);
    assert_eq!(scheduler.live_cycles(), 1);
    scheduler.shutdown().await;
}

/// **Test: a cycle reschedules itself with a cooldown inside its window.**
///
/// **Setup:** One automation, window [100ms,150ms], no initial delay.
/// **Action:** run for 1s.
/// **Expected:** between 7 and 11 runs.
#[tokio::test(start_paused = true)]
async fn test_cycle_repeats_within_window() {
    let transport = MockTransport::new();
    let automation = Arc::new(SendingAutomation::new(
        "fast",
        CooldownWindow::from_millis(100, 150),
    ));
    let runs = automation.runs.clone();
    let mut scheduler = Scheduler::new(context(&transport), immediate());
    scheduler.register(automation).unwrap();

    scheduler.start();
    tokio::time::sleep(Duration::from_millis(1000)).await;
    scheduler.shutdown().await;

    let runs = runs.load(Ordering::SeqCst);
    assert!((7..=11).contains(&runs), "runs = {}", runs);
}

/// **Test: a paused identity polls without running; resume lets cycles run again.**
///
/// **Setup:** Paused InterruptState, one fast automation.
/// **Action:** advance 3s; resume; advance past the poll interval.
/// **Expected:** zero runs while paused; runs after resume.
#[tokio::test(start_paused = true)]
async fn test_paused_identity_does_not_run() {
    let transport = MockTransport::new();
    let ctx = context(&transport);
    ctx.interrupt.pause();

    let automation = Arc::new(SendingAutomation::new(
        "fast",
        CooldownWindow::from_millis(100, 150),
    ));
    let runs = automation.runs.clone();
    let mut scheduler = Scheduler::new(ctx.clone(), immediate());
    scheduler.register(automation).unwrap();
    scheduler.start();

    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(runs.load(Ordering::SeqCst), 0);

    ctx.interrupt.resume();
    tokio::time::sleep(Duration::from_secs(6)).await;
    assert!(runs.load(Ordering::SeqCst) > 0);
    scheduler.stop();
}

/// **Test: nothing runs while the transport is not ready.**
#[tokio::test(start_paused = true)]
async fn test_not_ready_transport_polls() {
    let transport = MockTransport::new();
    transport.set_ready(false);
    let mut scheduler = Scheduler::new(context(&transport), immediate());
    scheduler
        .register(Arc::new(SendingAutomation::new(
            "fast",
            CooldownWindow::from_millis(100, 150),
        )))
        .unwrap();
    scheduler.start();

    tokio::time::sleep(Duration::from_secs(12)).await;
    assert_eq!(transport.sent_count(), 0);

    transport.set_ready(true);
    tokio::time::sleep(Duration::from_secs(6)).await;
    assert!(transport.sent_count() > 0);
    scheduler.stop();
}

/// **Test: a disabled automation keeps its cycle but never runs.**
#[tokio::test(start_paused = true)]
async fn test_disabled_automation_skips_run() {
    let transport = MockTransport::new();
    let mut automation = SendingAutomation::new("off", CooldownWindow::from_millis(100, 150));
    automation.enabled = false;
    let mut scheduler = Scheduler::new(context(&transport), immediate());
    scheduler.register(Arc::new(automation)).unwrap();
    scheduler.start();

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(transport.sent_count(), 0);
    assert_eq!(scheduler.live_cycles(), 1);
    scheduler.stop();
}

/// **Test: errors and panics in one automation never stop another.**
///
/// **Setup:** A failing, a panicking, and a healthy automation.
/// **Action:** run 1s.
/// **Expected:** healthy one keeps sending; failures show up in the event feed; all cycles alive.
#[tokio::test(start_paused = true)]
async fn test_failures_are_isolated() {
    let transport = MockTransport::new();
    let ctx = context(&transport);
    let mut scheduler = Scheduler::new(ctx.clone(), immediate());
    scheduler
        .register(Arc::new(FailingAutomation { panic: false }))
        .unwrap();
    scheduler
        .register(Arc::new(FailingAutomation { panic: true }))
        .unwrap();
    scheduler
        .register(Arc::new(SendingAutomation::new(
            "healthy",
            CooldownWindow::from_millis(100, 150),
        )))
        .unwrap();

    scheduler.start();
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert!(transport.sent_count() >= 5);
    assert_eq!(scheduler.live_cycles(), 3);
    let failures: Vec<_> = ctx
        .events
        .recent()
        .into_iter()
        .filter(|e| e.kind == EventKind::AutomationFailed)
        .collect();
    assert!(failures.iter().any(|e| e.message.starts_with("failing")));
    assert!(failures.iter().any(|e| e.message.starts_with("panicking")));
    scheduler.stop();
}

/// **Test: a send failure is contained like any other error.**
#[tokio::test(start_paused = true)]
async fn test_transport_error_does_not_kill_cycle() {
    let transport = MockTransport::new();
    transport.set_fail_sends(true);
    let automation = Arc::new(SendingAutomation::new(
        "fast",
        CooldownWindow::from_millis(100, 150),
    ));
    let runs = automation.runs.clone();
    let mut scheduler = Scheduler::new(context(&transport), immediate());
    scheduler.register(automation).unwrap();
    scheduler.start();

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(runs.load(Ordering::SeqCst) >= 3);
    scheduler.stop();
}

#[tokio::test]
async fn test_duplicate_names_rejected() {
    let transport = MockTransport::new();
    let mut scheduler = Scheduler::new(context(&transport), SchedulerConfig::default());
    let window = CooldownWindow::from_millis(100, 150);
    scheduler
        .register(Arc::new(SendingAutomation::new("hunt", window)))
        .unwrap();
    let err = scheduler
        .register(Arc::new(SendingAutomation::new("hunt", window)))
        .unwrap_err();
    assert!(err.to_string().contains("hunt"));
    assert_eq!(scheduler.names(), vec!["hunt".to_string()]);
}
