//! Everything one automation cycle (or inbound handler) of one identity may touch.

use grind_core::{Channel, Message, Result, SentMessage, Transport, User};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::info;

use crate::config::{AccountConfig, SharedConfig};
use crate::correlator::ResponseCorrelator;
use crate::events::EventFeed;
use crate::hunt_state::HuntingStates;
use crate::interrupt::InterruptState;
use crate::solver::ChallengeSolver;
use crate::stats::Stats;

pub struct AutomationContext {
    pub identity: User,
    pub config: SharedConfig,
    pub transport: Arc<dyn Transport>,
    pub correlator: Arc<ResponseCorrelator>,
    pub interrupt: Arc<InterruptState>,
    pub stats: Arc<Stats>,
    pub events: Arc<EventFeed>,
    /// Solver for the global verification challenge.
    pub solver: Option<Arc<dyn ChallengeSolver>>,
    /// Solver for the hunting sub-bot's start password.
    pub huntbot_solver: Option<Arc<dyn ChallengeSolver>>,
    pub hunt_states: HuntingStates,
    pub started_at: Instant,
}

impl AutomationContext {
    pub fn new(config: AccountConfig, transport: Arc<dyn Transport>) -> Self {
        let identity = config.identity();
        Self {
            events: Arc::new(EventFeed::new(identity.id.clone(), 200)),
            identity,
            config: SharedConfig::new(config),
            transport,
            correlator: Arc::new(ResponseCorrelator::default()),
            interrupt: Arc::new(InterruptState::new()),
            stats: Arc::new(Stats::new()),
            solver: None,
            huntbot_solver: None,
            hunt_states: HuntingStates::new(),
            started_at: Instant::now(),
        }
    }

    pub fn with_solver(mut self, solver: Arc<dyn ChallengeSolver>) -> Self {
        self.solver = Some(solver);
        self
    }

    pub fn with_huntbot_solver(mut self, solver: Arc<dyn ChallengeSolver>) -> Self {
        self.huntbot_solver = Some(solver);
        self
    }

    pub fn with_hunt_states(mut self, states: HuntingStates) -> Self {
        self.hunt_states = states;
        self
    }

    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.events = Arc::new(EventFeed::new(self.identity.id.clone(), capacity));
        self
    }

    pub async fn config(&self) -> AccountConfig {
        self.config.snapshot().await
    }

    /// The channel automations play in (first configured channel).
    pub fn game_channel(config: &AccountConfig) -> Option<Channel> {
        config.channel_ids.first().map(Channel::guild)
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    pub async fn send(&self, channel: &Channel, text: &str) -> Result<SentMessage> {
        let sent = self.transport.send(channel, text).await?;
        info!(
            identity = %self.identity.id,
            channel_id = %channel.id,
            text = %text,
            "Sent"
        );
        Ok(sent)
    }

    /// Starts listening for `filter`, sends `text`, then waits at most `timeout` for the reply.
    /// Only messages posted in `channel` can answer.
    pub async fn send_and_await<F>(
        &self,
        channel: &Channel,
        text: &str,
        filter: F,
        timeout: Duration,
    ) -> Result<Option<Arc<Message>>>
    where
        F: Fn(&Message) -> bool + Send,
    {
        let channel_id = channel.id.clone();
        let pending = self
            .correlator
            .listen(move |m: &Message| m.channel.id == channel_id && filter(m), timeout);
        self.send(channel, text).await?;
        Ok(pending.wait().await)
    }
}
