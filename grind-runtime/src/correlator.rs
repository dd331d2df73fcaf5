//! Turns fire-and-forget sends into awaited replies.
//!
//! Every inbound message is published once into a broadcast channel. A caller opens a
//! [`PendingReply`] (which subscribes immediately, before the command is sent, so a fast reply
//! cannot slip past), then awaits it. The first message passing the filter resolves it; the
//! deadline is a hard upper bound and resolves it to `None`. The subscription is dropped on
//! both paths.

use grind_core::Message;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::time::Instant;
use tracing::{debug, warn};

pub struct ResponseCorrelator {
    inbound: broadcast::Sender<Arc<Message>>,
}

impl ResponseCorrelator {
    /// `capacity` bounds how far a slow waiter may lag before it skips messages.
    pub fn new(capacity: usize) -> Self {
        let (inbound, _) = broadcast::channel(capacity.max(1));
        Self { inbound }
    }

    /// Feeds one inbound message to every open waiter. Returns the number of waiters reached.
    pub fn publish(&self, message: Arc<Message>) -> usize {
        self.inbound.send(message).unwrap_or(0)
    }

    pub fn waiters(&self) -> usize {
        self.inbound.receiver_count()
    }

    /// Starts listening now; resolve with [`PendingReply::wait`].
    pub fn listen<F>(&self, filter: F, timeout: Duration) -> PendingReply<F>
    where
        F: Fn(&Message) -> bool + Send,
    {
        PendingReply {
            rx: self.inbound.subscribe(),
            filter,
            deadline: Instant::now() + timeout,
        }
    }

    /// First message matching `filter` within `timeout`, else `None`.
    pub async fn await_match<F>(&self, filter: F, timeout: Duration) -> Option<Arc<Message>>
    where
        F: Fn(&Message) -> bool + Send,
    {
        self.listen(filter, timeout).wait().await
    }
}

impl Default for ResponseCorrelator {
    fn default() -> Self {
        Self::new(256)
    }
}

/// One in-flight correlation. Resolves exactly once.
pub struct PendingReply<F> {
    rx: broadcast::Receiver<Arc<Message>>,
    filter: F,
    deadline: Instant,
}

impl<F> PendingReply<F>
where
    F: Fn(&Message) -> bool + Send,
{
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub async fn wait(self) -> Option<Arc<Message>> {
        let PendingReply {
            mut rx,
            filter,
            deadline,
        } = self;

        let matched = tokio::time::timeout_at(deadline, async move {
            loop {
                match rx.recv().await {
                    Ok(message) => {
                        if filter(&message) {
                            return Some(message);
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Reply waiter lagged behind inbound stream");
                    }
                    Err(RecvError::Closed) => {
                        // Stream gone: nothing can match, hold until the deadline.
                        tokio::time::sleep_until(deadline).await;
                        return None;
                    }
                }
            }
        })
        .await
        .unwrap_or(None);

        if matched.is_none() {
            debug!("Reply wait timed out");
        }
        matched
    }
}
