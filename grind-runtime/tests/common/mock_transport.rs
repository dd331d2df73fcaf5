//! In-memory [`Transport`] for integration tests.
//!
//! Records every send, click and direct message. An optional responder turns a sent text into
//! inbound replies, published straight into a correlator so `send_and_await` sees them.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use grind_core::{Channel, GrindError, Message, Result, SentMessage, Transport, User};
use grind_runtime::ResponseCorrelator;

type Responder = Box<dyn Fn(&str) -> Vec<Message> + Send + Sync>;

pub struct MockTransport {
    ready: AtomicBool,
    fail_sends: AtomicBool,
    sent: Mutex<Vec<(String, String)>>,
    clicks: Mutex<Vec<(String, String)>>,
    directs: Mutex<Vec<(String, String)>>,
    responder: Mutex<Option<Responder>>,
    correlator: Mutex<Option<Arc<ResponseCorrelator>>>,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self {
            ready: AtomicBool::new(true),
            fail_sends: AtomicBool::new(false),
            sent: Mutex::new(Vec::new()),
            clicks: Mutex::new(Vec::new()),
            directs: Mutex::new(Vec::new()),
            responder: Mutex::new(None),
            correlator: Mutex::new(None),
        }
    }
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    pub fn set_fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    /// Replies produced by `responder` for each sent text are published into `correlator`.
    pub fn respond_with<F>(&self, correlator: Arc<ResponseCorrelator>, responder: F)
    where
        F: Fn(&str) -> Vec<Message> + Send + Sync + 'static,
    {
        *self.correlator.lock().unwrap() = Some(correlator);
        *self.responder.lock().unwrap() = Some(Box::new(responder));
    }

    /// Sent texts, in order.
    pub fn sent_texts(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|(_, t)| t.clone()).collect()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn clicks(&self) -> Vec<(String, String)> {
        self.clicks.lock().unwrap().clone()
    }

    pub fn directs(&self) -> Vec<(String, String)> {
        self.directs.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    async fn send(&self, channel: &Channel, text: &str) -> Result<SentMessage> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(GrindError::Transport("send failed".to_string()));
        }
        let id = {
            let mut sent = self.sent.lock().unwrap();
            sent.push((channel.id.clone(), text.to_string()));
            sent.len().to_string()
        };

        let replies = match self.responder.lock().unwrap().as_ref() {
            Some(responder) => responder(text),
            None => Vec::new(),
        };
        if let Some(correlator) = self.correlator.lock().unwrap().as_ref() {
            for reply in replies {
                correlator.publish(Arc::new(reply));
            }
        }

        Ok(SentMessage {
            id,
            channel_id: channel.id.clone(),
        })
    }

    async fn click(&self, message: &Message, component_id: &str) -> Result<()> {
        self.clicks
            .lock()
            .unwrap()
            .push((message.id.clone(), component_id.to_string()));
        Ok(())
    }

    async fn send_direct(&self, user_id: &str, text: &str) -> Result<()> {
        self.directs
            .lock()
            .unwrap()
            .push((user_id.to_string(), text.to_string()));
        Ok(())
    }
}

pub const GAME_ID: &str = "408785106942164992";
pub const SELF_ID: &str = "111";
pub const ADMIN_ID: &str = "999";
pub const CHANNEL_ID: &str = "555";

pub fn game_user() -> User {
    User {
        id: GAME_ID.to_string(),
        username: "OwO".to_string(),
        display_name: None,
        bot: true,
    }
}

/// Plain game message in the test channel.
pub fn game_message(content: &str) -> Message {
    Message::text("g1", game_user(), Channel::guild(CHANNEL_ID), content)
}

/// Account config for the test identity with everything off.
pub fn test_config() -> grind_runtime::AccountConfig {
    grind_runtime::AccountConfig {
        user_id: SELF_ID.to_string(),
        username: "alice".to_string(),
        display_name: Some("Ally".to_string()),
        channel_ids: vec![CHANNEL_ID.to_string()],
        admin_id: Some(ADMIN_ID.to_string()),
        ..Default::default()
    }
}
