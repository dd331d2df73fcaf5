//! # grind-runtime
//!
//! The automation core: a [`Scheduler`] of independent [`Automation`] cycles gated by an
//! [`InterruptState`], a [`ResponseCorrelator`] that turns sends into awaited replies, the
//! challenge guard and operator commands on the inbound side, and [`GrindBot`] wiring them
//! together for one identity.

pub mod bot;
pub mod challenge;
pub mod commands;
pub mod config;
pub mod context;
pub mod correlator;
pub mod events;
pub mod features;
pub mod guard;
pub mod hunt_state;
pub mod interrupt;
pub mod notifier;
pub mod pacing;
pub mod scheduler;
pub mod solver;
pub mod stats;

pub use bot::{build_handler_chain, BotStatus, GrindBot, GrindBotBuilder};
pub use challenge::{is_addressed_to, normalize, ChallengeClassifier, ClassifierCache, Verdict};
pub use commands::{Command, CommandHandler};
pub use config::{AccountConfig, BaseConfig, GlobalConfig, SharedConfig};
pub use context::AutomationContext;
pub use correlator::{PendingReply, ResponseCorrelator};
pub use events::{BotEvent, EventFeed, EventKind};
pub use guard::{ChallengeGuard, LoggingHandler};
pub use hunt_state::{HuntGuard, HuntingStates, HuntingSubState};
pub use interrupt::{InterruptSnapshot, InterruptState, RunState};
pub use notifier::{DirectMessageNotifier, Notifier, NotifierSet, WebhookNotifier};
pub use pacing::{format_duration, parse_duration, CooldownWindow};
pub use scheduler::{Automation, Scheduler, SchedulerConfig};
pub use solver::ChallengeSolver;
pub use stats::{Counter, Stats, StatsSnapshot};
