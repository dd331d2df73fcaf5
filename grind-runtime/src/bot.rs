//! GrindBot: one automated identity wired together (context, scheduler, inbound handler chain).

use grind_core::{Message, Result, Transport};
use handler_chain::HandlerChain;
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument};

use crate::config::AccountConfig;
use crate::context::AutomationContext;
use crate::events::{BotEvent, EventKind};
use crate::features::default_automations;
use crate::guard::{ChallengeGuard, LoggingHandler};
use crate::commands::CommandHandler;
use crate::hunt_state::HuntingStates;
use crate::interrupt::RunState;
use crate::notifier::NotifierSet;
use crate::scheduler::{Automation, Scheduler, SchedulerConfig};
use crate::solver::ChallengeSolver;
use crate::stats::StatsSnapshot;

/// Read-only snapshot for a dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct BotStatus {
    pub identity: String,
    pub username: String,
    pub state: RunState,
    pub paused: bool,
    pub challenge_detected: bool,
    pub stats: StatsSnapshot,
    pub uptime_secs: u64,
    pub automations: Vec<String>,
}

/// Builds the inbound chain: logging, then the challenge guard, then operator commands.
pub fn build_handler_chain(
    ctx: &Arc<AutomationContext>,
    notifiers: NotifierSet,
    shutdown: CancellationToken,
) -> HandlerChain {
    HandlerChain::new()
        .add_handler(Arc::new(LoggingHandler))
        .add_handler(Arc::new(ChallengeGuard::new(Arc::clone(ctx), notifiers)))
        .add_handler(Arc::new(CommandHandler::new(Arc::clone(ctx), shutdown)))
}

pub struct GrindBotBuilder {
    config: AccountConfig,
    transport: Arc<dyn Transport>,
    solver: Option<Arc<dyn ChallengeSolver>>,
    huntbot_solver: Option<Arc<dyn ChallengeSolver>>,
    hunt_states: Option<HuntingStates>,
    event_capacity: Option<usize>,
    scheduler_config: SchedulerConfig,
    automations: Option<Vec<Arc<dyn Automation>>>,
    notifiers: Option<NotifierSet>,
    shutdown: Option<CancellationToken>,
}

impl GrindBotBuilder {
    pub fn solver(mut self, solver: Arc<dyn ChallengeSolver>) -> Self {
        self.solver = Some(solver);
        self
    }

    pub fn huntbot_solver(mut self, solver: Arc<dyn ChallengeSolver>) -> Self {
        self.huntbot_solver = Some(solver);
        self
    }

    /// Store shared between identities (keyed by identity id).
    pub fn hunt_states(mut self, states: HuntingStates) -> Self {
        self.hunt_states = Some(states);
        self
    }

    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = Some(capacity);
        self
    }

    pub fn scheduler_config(mut self, config: SchedulerConfig) -> Self {
        self.scheduler_config = config;
        self
    }

    /// Replaces the default automation set.
    pub fn automations(mut self, automations: Vec<Arc<dyn Automation>>) -> Self {
        self.automations = Some(automations);
        self
    }

    /// Replaces the notifiers derived from config.
    pub fn notifiers(mut self, notifiers: NotifierSet) -> Self {
        self.notifiers = Some(notifiers);
        self
    }

    /// Token cancelled by the `stop` command. Share one token to stop several bots together.
    pub fn shutdown_token(mut self, token: CancellationToken) -> Self {
        self.shutdown = Some(token);
        self
    }

    pub fn build(self) -> Result<GrindBot> {
        let automations = self
            .automations
            .unwrap_or_else(|| default_automations(&self.config));
        let notifiers = self
            .notifiers
            .unwrap_or_else(|| NotifierSet::from_config(&self.config, Arc::clone(&self.transport)));

        let mut ctx = AutomationContext::new(self.config, self.transport);
        if let Some(solver) = self.solver {
            ctx = ctx.with_solver(solver);
        }
        if let Some(solver) = self.huntbot_solver {
            ctx = ctx.with_huntbot_solver(solver);
        }
        if let Some(states) = self.hunt_states {
            ctx = ctx.with_hunt_states(states);
        }
        if let Some(capacity) = self.event_capacity {
            ctx = ctx.with_event_capacity(capacity);
        }
        let ctx = Arc::new(ctx);

        let mut scheduler = Scheduler::new(Arc::clone(&ctx), self.scheduler_config);
        for automation in automations {
            scheduler.register(automation)?;
        }

        let shutdown = self.shutdown.unwrap_or_default();
        let chain = build_handler_chain(&ctx, notifiers, shutdown.clone());

        Ok(GrindBot {
            ctx,
            scheduler,
            chain: Arc::new(chain),
            shutdown,
        })
    }
}

pub struct GrindBot {
    ctx: Arc<AutomationContext>,
    scheduler: Scheduler,
    chain: Arc<HandlerChain>,
    shutdown: CancellationToken,
}

impl GrindBot {
    pub fn builder(config: AccountConfig, transport: Arc<dyn Transport>) -> GrindBotBuilder {
        GrindBotBuilder {
            config,
            transport,
            solver: None,
            huntbot_solver: None,
            hunt_states: None,
            event_capacity: None,
            scheduler_config: SchedulerConfig::default(),
            automations: None,
            notifiers: None,
            shutdown: None,
        }
    }

    pub fn context(&self) -> &Arc<AutomationContext> {
        &self.ctx
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    #[instrument(skip(self), fields(identity = %self.ctx.identity.id))]
    pub fn start(&self) {
        info!(automations = ?self.scheduler.names(), "Bot started");
        self.ctx.events.push(EventKind::Info, "started");
        self.scheduler.start();
    }

    /// Cancels future cycles; in-flight runs finish on their own.
    pub fn stop(&self) {
        self.scheduler.stop();
        self.ctx.events.push(EventKind::Info, "stopped");
    }

    /// Operator pause without a duration.
    pub fn pause(&self) -> bool {
        let paused = self.ctx.interrupt.pause();
        if paused {
            self.ctx.events.push(EventKind::StateChanged, "paused");
        }
        paused
    }

    pub fn pause_for(&self, duration: std::time::Duration) -> bool {
        let paused = self.ctx.interrupt.pause_for(duration).is_some();
        if paused {
            self.ctx.events.push(EventKind::StateChanged, "paused (timed)");
        }
        paused
    }

    pub fn resume(&self) -> RunState {
        let previous = self.ctx.interrupt.resume();
        self.ctx
            .events
            .push(EventKind::StateChanged, format!("resumed from {:?}", previous));
        previous
    }

    /// Feeds one inbound message: correlation waiters first, then the handler chain.
    pub async fn handle_message(&self, message: Message) {
        let message = Arc::new(message);
        self.ctx.correlator.publish(Arc::clone(&message));
        if let Err(e) = self.chain.handle(&message).await {
            error!(error = %e, message_id = %message.id, "Handler chain failed");
        }
    }

    /// Like [`handle_message`](Self::handle_message) but runs the chain on its own task, so a
    /// slow handler (solver, transfer confirmation) never blocks the inbound pump.
    pub fn dispatch(&self, message: Message) {
        let message = Arc::new(message);
        self.ctx.correlator.publish(Arc::clone(&message));
        let chain = Arc::clone(&self.chain);
        tokio::spawn(async move {
            if let Err(e) = chain.handle(&message).await {
                error!(error = %e, message_id = %message.id, "Handler chain failed");
            }
        });
    }

    pub fn status(&self) -> BotStatus {
        let snapshot = self.ctx.interrupt.snapshot();
        BotStatus {
            identity: self.ctx.identity.id.clone(),
            username: self.ctx.identity.username.clone(),
            state: snapshot.state(),
            paused: snapshot.paused,
            challenge_detected: snapshot.challenge_detected,
            stats: self.ctx.stats.snapshot(),
            uptime_secs: self.ctx.uptime().as_secs(),
            automations: self.scheduler.names(),
        }
    }

    pub fn recent_events(&self) -> Vec<BotEvent> {
        self.ctx.events.recent()
    }

    /// Starts, waits for the shutdown token, then drains the scheduler.
    pub async fn run_until_shutdown(&self) {
        self.start();
        self.shutdown.cancelled().await;
        info!(identity = %self.ctx.identity.id, "Shutting down");
        self.scheduler.shutdown().await;
    }
}
