//! Integration tests for operator commands through [`grind_runtime::GrindBot`].
//!
//! Covers: timed pause with auto-resume, pause/resume replies, resume clearing a challenge,
//! authorization, status text, stop cancelling the shutdown token, say, and the transfer
//! confirmation click.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::mock_transport::{
    game_message, test_config, MockTransport, ADMIN_ID, CHANNEL_ID, SELF_ID,
};
use grind_core::{ButtonStyle, Channel, Component, Embed, Message, User};
use grind_runtime::{GrindBot, RunState};

fn bot(transport: &Arc<MockTransport>) -> GrindBot {
    GrindBot::builder(test_config(), transport.clone())
        .automations(Vec::new())
        .build()
        .unwrap()
}

fn from(author_id: &str, content: &str) -> Message {
    Message::text(
        "cmd",
        User::new(author_id, "someone"),
        Channel::guild(CHANNEL_ID),
        content,
    )
}

/// **Test: `.pause 30m` pauses, replies, and auto-resumes after 30 minutes.**
#[tokio::test(start_paused = true)]
async fn test_timed_pause_auto_resumes() {
    common::init_test_tracing();
    let transport = MockTransport::new();
    let bot = bot(&transport);

    bot.handle_message(from(SELF_ID, ".pause 30m")).await;
    assert_eq!(bot.status().state, RunState::Paused);
    assert_eq!(transport.sent_texts(), vec!["Bot paused for 30m.".to_string()]);

    tokio::time::sleep(Duration::from_secs(29 * 60)).await;
    assert_eq!(bot.status().state, RunState::Paused);

    tokio::time::sleep(Duration::from_secs(2 * 60)).await;
    assert_eq!(bot.status().state, RunState::Running);
    assert!(transport
        .sent_texts()
        .contains(&"Bot auto-resumed.".to_string()));
}

/// **Test: a challenge during a timed pause is not cleared by the pause timer.**
#[tokio::test(start_paused = true)]
async fn test_timed_pause_never_clears_challenge() {
    let transport = MockTransport::new();
    let bot = bot(&transport);

    bot.handle_message(from(SELF_ID, ".pause 1m")).await;
    bot.handle_message(game_message("alice, captcha time")).await;
    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(bot.status().state, RunState::ChallengeDetected);
}

/// **Test: pause while paused and resume while running only reply.**
#[tokio::test]
async fn test_pause_resume_replies() {
    let transport = MockTransport::new();
    let bot = bot(&transport);

    bot.handle_message(from(SELF_ID, ".resume")).await;
    bot.handle_message(from(SELF_ID, ".pause")).await;
    bot.handle_message(from(SELF_ID, ".pause")).await;
    bot.handle_message(from(ADMIN_ID, ".unpause")).await;

    assert_eq!(
        transport.sent_texts(),
        vec![
            "Bot is running.".to_string(),
            "Bot paused indefinitely. Use resume to start.".to_string(),
            "Bot is already paused.".to_string(),
            "Bot resumed.".to_string(),
        ]
    );
    assert_eq!(bot.status().state, RunState::Running);
}

/// **Test: `.resume` during ChallengeDetected clears both flags at once.**
#[tokio::test]
async fn test_resume_clears_challenge() {
    let transport = MockTransport::new();
    let bot = bot(&transport);

    bot.handle_message(game_message("alice, please verify that you are human"))
        .await;
    assert_eq!(bot.status().state, RunState::ChallengeDetected);

    bot.handle_message(from(ADMIN_ID, ".start")).await;
    let status = bot.status();
    assert!(!status.paused);
    assert!(!status.challenge_detected);
}

/// **Test: commands from anyone but self or admin are ignored.**
#[tokio::test]
async fn test_unauthorized_author_ignored() {
    let transport = MockTransport::new();
    let bot = bot(&transport);

    bot.handle_message(from("31337", ".pause")).await;
    assert_eq!(bot.status().state, RunState::Running);
    assert_eq!(transport.sent_count(), 0);
}

/// **Test: `.status` reports counters and the current state.**
#[tokio::test]
async fn test_status_reply() {
    let transport = MockTransport::new();
    let bot = bot(&transport);

    bot.handle_message(from(SELF_ID, ".stats")).await;
    let sent = transport.sent_texts();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains("**Hunts:** 0"));
    assert!(sent[0].contains("**Captchas:** 0 (Solved: 0)"));
    assert!(sent[0].contains("**Status:** RUNNING"));
}

/// **Test: `.stop` cancels the shutdown token.**
#[tokio::test]
async fn test_stop_cancels_shutdown() {
    let transport = MockTransport::new();
    let bot = bot(&transport);
    let token = bot.shutdown_token();

    bot.handle_message(from(SELF_ID, ".shutdown")).await;
    assert!(token.is_cancelled());
    assert_eq!(transport.sent_texts(), vec!["Shutting down...".to_string()]);
}

/// **Test: invalid arguments reply with the problem instead of acting.**
#[tokio::test]
async fn test_invalid_pause_duration() {
    let transport = MockTransport::new();
    let bot = bot(&transport);

    bot.handle_message(from(SELF_ID, ".pause later")).await;
    assert_eq!(bot.status().state, RunState::Running);
    assert!(transport.sent_texts()[0].contains("not a duration"));
}

/// **Test: `.say` relays text to the current or a named channel.**
#[tokio::test]
async fn test_say() {
    let transport = MockTransport::new();
    let bot = bot(&transport);

    bot.handle_message(from(SELF_ID, ".say hello world")).await;
    bot.handle_message(from(SELF_ID, ".say 123456789012345678 over there"))
        .await;
    assert_eq!(
        transport.sent_texts(),
        vec!["hello world".to_string(), "over there".to_string()]
    );
}

/// **Test: `.send` gives currency and clicks the confirm button of the matching embed.**
#[tokio::test]
async fn test_send_clicks_confirm() {
    let transport = MockTransport::new();
    let bot = bot(&transport);
    transport.respond_with(bot.context().correlator.clone(), |text| {
        if !text.starts_with("owo give") {
            return Vec::new();
        }
        let mut confirm = game_message("");
        confirm.id = "confirm-msg".to_string();
        confirm.embeds.push(Embed {
            description: Some("alice will give 1000 cowoncy to bob".to_string()),
            ..Embed::default()
        });
        confirm.components = vec![
            Component {
                id: "decline".to_string(),
                label: Some("Cancel".to_string()),
                style: ButtonStyle::Danger,
            },
            Component {
                id: "accept".to_string(),
                label: Some("Confirm".to_string()),
                style: ButtonStyle::Success,
            },
        ];
        vec![confirm]
    });

    bot.handle_message(from(SELF_ID, ".send <@42> 1000")).await;

    assert_eq!(transport.sent_texts(), vec!["owo give <@42> 1000".to_string()]);
    assert_eq!(
        transport.clicks(),
        vec![("confirm-msg".to_string(), "accept".to_string())]
    );
}
