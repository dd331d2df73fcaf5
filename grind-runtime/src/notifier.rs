//! Out-of-band operator notifications (direct message, webhook). Best-effort: a failing
//! notifier is logged and never affects the caller.

use async_trait::async_trait;
use grind_core::{GrindError, Result, Transport};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};

use crate::config::AccountConfig;

#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &str;
    async fn notify(&self, text: &str) -> Result<()>;
}

/// Direct message to a user through the chat transport.
pub struct DirectMessageNotifier {
    transport: Arc<dyn Transport>,
    user_id: String,
}

impl DirectMessageNotifier {
    pub fn new(transport: Arc<dyn Transport>, user_id: impl Into<String>) -> Self {
        Self {
            transport,
            user_id: user_id.into(),
        }
    }
}

#[async_trait]
impl Notifier for DirectMessageNotifier {
    fn name(&self) -> &str {
        "dm"
    }

    async fn notify(&self, text: &str) -> Result<()> {
        self.transport.send_direct(&self.user_id, text).await
    }
}

/// POSTs `{"content": text}` to a webhook URL.
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn notify(&self, text: &str) -> Result<()> {
        let response = self
            .client
            .post(&self.url)
            .json(&json!({ "content": text }))
            .send()
            .await
            .map_err(|e| GrindError::Transport(e.to_string()))?;
        if !response.status().is_success() {
            return Err(GrindError::Transport(format!(
                "webhook returned {}",
                response.status()
            )));
        }
        Ok(())
    }
}

/// All notifiers enabled for one account.
#[derive(Clone, Default)]
pub struct NotifierSet {
    notifiers: Vec<Arc<dyn Notifier>>,
}

impl NotifierSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifiers.push(notifier);
        self
    }

    /// DM notifier when `notifications.dm` and an admin are set; webhook notifier when a URL is set.
    pub fn from_config(config: &AccountConfig, transport: Arc<dyn Transport>) -> Self {
        let mut set = Self::new();
        if config.notifications.dm {
            if let Some(admin) = &config.admin_id {
                set = set.with(Arc::new(DirectMessageNotifier::new(transport, admin.clone())));
            }
        }
        if let Some(url) = config.notifications.webhook_url.as_ref().filter(|u| !u.is_empty()) {
            set = set.with(Arc::new(WebhookNotifier::new(url.clone())));
        }
        set
    }

    pub fn len(&self) -> usize {
        self.notifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }

    /// Sends to every notifier; returns how many succeeded.
    pub async fn notify_all(&self, text: &str) -> usize {
        let mut delivered = 0;
        for notifier in &self.notifiers {
            match notifier.notify(text).await {
                Ok(()) => {
                    delivered += 1;
                    info!(notifier = notifier.name(), "Operator notified");
                }
                Err(e) => {
                    error!(notifier = notifier.name(), error = %e, "Operator notification failed");
                }
            }
        }
        delivered
    }
}
