//! Integration tests for the inbound challenge path ([`grind_runtime::ChallengeGuard`] inside a
//! [`grind_runtime::GrindBot`] handler chain).
//!
//! Covers: detection forces pause and counts once, operator notification, solver success
//! resumes after the settle delay, solver absence keeps the identity halted, manual resume
//! clears both flags, messages not for this identity are ignored.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::mock_transport::{game_message, test_config, MockTransport, ADMIN_ID, SELF_ID};
use grind_core::{Attachment, Channel};
use grind_runtime::{ChallengeSolver, Counter, EventKind, GrindBot, RunState};

struct FixedSolver {
    code: Option<&'static str>,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl ChallengeSolver for FixedSolver {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn solve(&self, _image_url: &str) -> Option<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.code.map(str::to_string)
    }
}

fn bot(transport: &Arc<MockTransport>) -> GrindBot {
    let mut config = test_config();
    config.notifications.dm = true;
    GrindBot::builder(config, transport.clone())
        .automations(Vec::new())
        .build()
        .unwrap()
}

/// **Test: "Please verify that you are human" mentioning this identity enters ChallengeDetected.**
///
/// **Setup:** Running bot, no solver.
/// **Action:** handle the game message with a mention of self.
/// **Expected:** ChallengeDetected with paused=true; detection counter +1; admin DM sent.
#[tokio::test]
async fn test_mention_verify_human_enters_challenge() {
    common::init_test_tracing();
    let transport = MockTransport::new();
    let bot = bot(&transport);
    assert_eq!(bot.status().state, RunState::Running);

    let mut message = game_message("Please verify that you are human");
    message.mentions.push(SELF_ID.to_string());
    bot.handle_message(message).await;

    let status = bot.status();
    assert_eq!(status.state, RunState::ChallengeDetected);
    assert!(status.paused);
    assert!(status.challenge_detected);
    assert_eq!(status.stats.captchas_detected, 1);

    let directs = transport.directs();
    assert_eq!(directs.len(), 1);
    assert_eq!(directs[0].0, ADMIN_ID);
    assert!(directs[0].1.contains("CHALLENGE DETECTED"));
    assert!(bot
        .recent_events()
        .iter()
        .any(|e| e.kind == EventKind::ChallengeDetected));
}

/// **Test: a repeated challenge while already detected does not count again.**
#[tokio::test]
async fn test_repeat_detection_counts_once() {
    let transport = MockTransport::new();
    let bot = bot(&transport);

    for _ in 0..3 {
        bot.handle_message(game_message("**alice**, are you a real human?"))
            .await;
    }
    assert_eq!(bot.context().stats.get(Counter::CaptchasDetected), 1);
    assert_eq!(transport.directs().len(), 1);
}

/// **Test: detection from Paused also lands in ChallengeDetected.**
#[tokio::test]
async fn test_detect_from_paused() {
    let transport = MockTransport::new();
    let bot = bot(&transport);
    assert!(bot.pause());
    bot.handle_message(game_message("alice, solve this captcha"))
        .await;
    assert_eq!(bot.status().state, RunState::ChallengeDetected);
}

/// **Test: messages for other users or from other authors are ignored.**
#[tokio::test]
async fn test_not_addressed_is_ignored() {
    let transport = MockTransport::new();
    let bot = bot(&transport);

    bot.handle_message(game_message("bob, please verify that you are human"))
        .await;
    let mut impostor = game_message("alice, please verify");
    impostor.author.id = "12345".to_string();
    bot.handle_message(impostor).await;
    bot.handle_message(game_message("alice, you have verified that you are human, thank you"))
        .await;

    assert_eq!(bot.status().state, RunState::Running);
    assert_eq!(bot.status().stats.captchas_detected, 0);
}

/// **Test: solved challenge submits the code and resumes after the settle delay.**
///
/// **Setup:** Solver returning "abc12"; challenge.use_solver on; challenge carries an image.
/// **Action:** handle message; advance 4s; advance past 5s.
/// **Expected:** `owo verify abc12` sent; still halted at 4s; Running after settle; solved +1.
#[tokio::test(start_paused = true)]
async fn test_solver_success_resumes_after_settle() {
    let transport = MockTransport::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let mut config = test_config();
    config.challenge.use_solver = true;
    let bot = GrindBot::builder(config, transport.clone())
        .automations(Vec::new())
        .solver(Arc::new(FixedSolver {
            code: Some("abc12"),
            calls: calls.clone(),
        }))
        .build()
        .unwrap();

    let mut message = game_message("alice, please complete this captcha");
    message.attachments.push(Attachment {
        url: "https://cdn.example/c.png".to_string(),
        filename: Some("captcha.png".to_string()),
    });
    bot.handle_message(message).await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(transport.sent_texts(), vec!["owo verify abc12".to_string()]);
    assert_eq!(bot.status().stats.captchas_solved, 1);

    tokio::time::sleep(Duration::from_secs(4)).await;
    assert_eq!(bot.status().state, RunState::ChallengeDetected);

    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(bot.status().state, RunState::Running);
}

/// **Test: solver failure leaves the identity halted until a manual resume.**
#[tokio::test(start_paused = true)]
async fn test_solver_failure_stays_halted() {
    let transport = MockTransport::new();
    let mut config = test_config();
    config.challenge.use_solver = true;
    let bot = GrindBot::builder(config, transport.clone())
        .automations(Vec::new())
        .solver(Arc::new(FixedSolver {
            code: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }))
        .build()
        .unwrap();

    let mut message = game_message("alice captcha");
    message.channel = Channel::direct("dm");
    message.attachments.push(Attachment {
        url: "https://cdn.example/c.png".to_string(),
        filename: None,
    });
    bot.handle_message(message).await;

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(bot.status().state, RunState::ChallengeDetected);
    assert!(transport.sent_texts().is_empty());

    assert_eq!(bot.resume(), RunState::ChallengeDetected);
    let status = bot.status();
    assert!(!status.paused);
    assert!(!status.challenge_detected);
}

/// **Test: a manual resume during the settle delay is not undone or repeated by the timer.**
#[tokio::test(start_paused = true)]
async fn test_resume_during_settle_then_pause_survives_timer() {
    let transport = MockTransport::new();
    let mut config = test_config();
    config.challenge.use_solver = true;
    let bot = GrindBot::builder(config, transport.clone())
        .automations(Vec::new())
        .solver(Arc::new(FixedSolver {
            code: Some("x"),
            calls: Arc::new(AtomicUsize::new(0)),
        }))
        .build()
        .unwrap();

    let mut message = game_message("alice captcha");
    message.attachments.push(Attachment {
        url: "https://cdn.example/c.png".to_string(),
        filename: None,
    });
    bot.handle_message(message).await;

    bot.resume();
    bot.pause();
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(bot.status().state, RunState::Paused);
}
