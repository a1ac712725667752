//! Async delivery of risk updates to slow sinks

use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{error, warn};

use crate::models::{Alert, RiskMetrics, RiskUpdate};
use crate::traits::event_handler::{AlertNotifier, RiskEventHandler};

/// Notification types
#[derive(Debug, Clone)]
pub enum Notification {
    RiskUpdate(RiskUpdate),
    Error(String),
    Shutdown,
}

/// Notification queue for async processing
///
/// Registered with the monitor as a plain [`RiskEventHandler`]; updates are
/// forwarded to the wrapped [`AlertNotifier`] from a dedicated task.
pub struct NotificationQueue {
    sender: UnboundedSender<Notification>,
    notifier: Arc<dyn AlertNotifier>,
}

impl NotificationQueue {
    /// Create a new notification queue; must be called inside a tokio runtime
    pub fn new(notifier: Arc<dyn AlertNotifier>) -> anyhow::Result<Self> {
        let handle = Handle::try_current()
            .map_err(|e| anyhow::anyhow!("NotificationQueue requires a tokio runtime: {}", e))?;
        let (sender, receiver) = unbounded_channel();

        // Spawn a dedicated task for processing notifications
        handle.spawn(Self::process_notifications(receiver, notifier.clone()));

        Ok(Self { sender, notifier })
    }

    /// Process notifications in a separate task
    async fn process_notifications(
        mut receiver: UnboundedReceiver<Notification>,
        notifier: Arc<dyn AlertNotifier>,
    ) {
        while let Some(notification) = receiver.recv().await {
            match notification {
                Notification::RiskUpdate(update) => {
                    notifier.notify(update).await;
                }
                Notification::Error(err_msg) => {
                    let err = anyhow::anyhow!("{}", err_msg);
                    notifier.handle_error(&err).await;
                }
                Notification::Shutdown => {
                    warn!("Notification processor shutting down");
                    break;
                }
            }
        }
    }

    /// Queue a risk update (non-blocking)
    pub fn notify_update(&self, update: RiskUpdate) {
        if let Err(e) = self.sender.send(Notification::RiskUpdate(update)) {
            error!("Failed to queue risk update notification: {}", e);
        }
    }

    /// Queue an error notification (non-blocking)
    pub fn notify_error(&self, error: &anyhow::Error) {
        if let Err(e) = self.sender.send(Notification::Error(error.to_string())) {
            error!("Failed to queue error notification: {}", e);
        }
    }

    /// Stop the processing task once queued notifications are drained
    pub fn shutdown(&self) {
        let _ = self.sender.send(Notification::Shutdown);
    }

    /// True once the processing task has exited
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

impl RiskEventHandler for NotificationQueue {
    fn handle_risk_update(&self, alerts: Vec<Alert>, metrics: RiskMetrics) {
        self.notify_update(RiskUpdate { alerts, metrics });
    }

    fn handle_error(&self, error: &anyhow::Error) {
        self.notify_error(error);
    }
}

impl Clone for NotificationQueue {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            notifier: self.notifier.clone(),
        }
    }
}
