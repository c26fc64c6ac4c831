use super::{Notification, Operation, Outcome};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, error, info, warn};

/// Receives operation reports. Delivery is fire-and-forget.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: &Notification);
}

/// Writes notifications to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn notify(&self, n: &Notification) {
        match n.outcome {
            Outcome::Success => info!(id = %n.id, operation = %n.operation, "{}", n.message),
            Outcome::Warning => warn!(id = %n.id, operation = %n.operation, "{}", n.message),
            Outcome::Failure => error!(id = %n.id, operation = %n.operation, "{}", n.message),
        }
    }
}

/// Forwards notifications to a channel, typically drained by a UI task.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    /// Creates the notifier and the receiving end of its channel.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl Notifier for ChannelNotifier {
    async fn notify(&self, notification: &Notification) {
        if self.tx.send(notification.clone()).is_err() {
            debug!(id = %notification.id, "Notification dropped, receiver closed");
        }
    }
}

/// Sends every notification to each inner notifier in order.
#[derive(Default, Clone)]
pub struct MultiNotifier {
    notifiers: Vec<Arc<dyn Notifier>>,
}

impl MultiNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifiers.push(notifier);
        self
    }

    pub fn len(&self) -> usize {
        self.notifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }
}

#[async_trait]
impl Notifier for MultiNotifier {
    async fn notify(&self, notification: &Notification) {
        for notifier in &self.notifiers {
            notifier.notify(notification).await;
        }
    }
}

/// Keeps every notification in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    history: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn history(&self) -> Vec<Notification> {
        self.history.lock().await.clone()
    }

    /// Number of recorded notifications for `operation` with `outcome`.
    pub async fn count(&self, operation: Operation, outcome: Outcome) -> usize {
        self.history
            .lock()
            .await
            .iter()
            .filter(|n| n.operation == operation && n.outcome == outcome)
            .count()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: &Notification) {
        self.history.lock().await.push(notification.clone());
    }
}
