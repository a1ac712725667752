use async_trait::async_trait;

use crate::models::{Alert, RiskMetrics, RiskUpdate};

/// Receives every published `(alerts, metrics)` snapshot.
///
/// Called synchronously on the monitor's thread in registration order; each
/// handler gets its own copy. Long-running work belongs behind a
/// [`NotificationQueue`](crate::notifications::NotificationQueue).
pub trait RiskEventHandler: Send + Sync {
    fn handle_risk_update(&self, alerts: Vec<Alert>, metrics: RiskMetrics);

    /// A rule failed during the last evaluation; ignored by default
    fn handle_error(&self, _error: &anyhow::Error) {}
}

impl<F> RiskEventHandler for F
where
    F: Fn(Vec<Alert>, RiskMetrics) + Send + Sync,
{
    fn handle_risk_update(&self, alerts: Vec<Alert>, metrics: RiskMetrics) {
        self(alerts, metrics)
    }
}

/// Asynchronous sink for risk updates (chat bots, webhooks)
#[async_trait]
pub trait AlertNotifier: Send + Sync {
    /// Handle a published update
    async fn notify(&self, update: RiskUpdate);

    /// Report a failure that happened upstream of this sink
    async fn handle_error(&self, error: &anyhow::Error);
}
