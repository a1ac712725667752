use std::collections::BTreeSet;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::{info, warn};

use crate::models::{Alert, AlertKind, AlertSeverity, RiskUpdate};
use crate::telegram_notifier::TelegramNotifier;
use crate::traits::event_handler::AlertNotifier;
use crate::utils::helper::format_address;

type AlertDigest = BTreeSet<(AlertKind, AlertSeverity, Option<String>)>;

/// Telegram notification event handler
pub struct TelegramEventHandler {
    notifier: TelegramNotifier,
    wallet_address: String,
    min_severity: AlertSeverity,
    last_sent: Mutex<Option<AlertDigest>>,
}

impl TelegramEventHandler {
    /// Create a new Telegram event handler
    pub fn new(notifier: TelegramNotifier, wallet_address: impl Into<String>) -> Self {
        Self {
            notifier,
            wallet_address: wallet_address.into(),
            min_severity: AlertSeverity::Medium,
            last_sent: Mutex::new(None),
        }
    }

    /// Only forward alerts at or above `severity`
    pub fn with_min_severity(mut self, severity: AlertSeverity) -> Self {
        self.min_severity = severity;
        self
    }

    /// Check if Telegram is enabled
    pub fn is_enabled(&self) -> bool {
        self.notifier.is_enabled()
    }

    fn relevant<'a>(&self, update: &'a RiskUpdate) -> Vec<&'a Alert> {
        update
            .alerts
            .iter()
            .filter(|a| !a.is_read && a.severity >= self.min_severity)
            .collect()
    }

    /// The digest of `alerts` when it differs from the last delivered one
    fn pending_digest(&self, alerts: &[&Alert]) -> Option<AlertDigest> {
        let digest: AlertDigest = alerts
            .iter()
            .map(|a| (a.kind, a.severity, a.token_symbol.clone()))
            .collect();

        if self.last_sent.lock().as_ref() == Some(&digest) {
            None
        } else {
            Some(digest)
        }
    }

    fn commit_digest(&self, digest: AlertDigest) {
        *self.last_sent.lock() = Some(digest);
    }

    /// Format an alert summary as Telegram HTML
    pub fn format_update(&self, alerts: &[&Alert], update: &RiskUpdate) -> String {
        let timestamp = update.metrics.last_updated.format("%Y-%m-%d %H:%M:%S");
        let metrics = &update.metrics;

        let mut message = format!(
            "🛡 <b>Portfolio Risk Alert</b>\n\n\
             ⏰ <b>Time:</b> {}\n\
             👛 <b>Wallet:</b> <code>{}</code>\n\
             📊 <b>Risk score:</b> {} • <b>Concentration:</b> {} • <b>Liquidity:</b> {}\n\n",
            timestamp,
            format_address(&self.wallet_address),
            metrics.portfolio_risk_score,
            metrics.concentration_risk,
            metrics.liquidity_score
        );

        for alert in alerts {
            message.push_str(&format!(
                "{} <b>{}</b>",
                alert.severity.emoji(),
                escape_html(&alert.title)
            ));
            if let Some(symbol) = &alert.token_symbol {
                message.push_str(&format!(" ({})", escape_html(symbol)));
            }
            message.push('\n');
            message.push_str(&format!("{}\n", escape_html(&alert.message)));
            message.push_str(&format!("<i>{}</i>\n\n", escape_html(&alert.recommendation)));
        }

        message
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

#[async_trait]
impl AlertNotifier for TelegramEventHandler {
    async fn notify(&self, update: RiskUpdate) {
        let alerts = self.relevant(&update);
        let Some(digest) = self.pending_digest(&alerts) else {
            return;
        };
        if alerts.is_empty() {
            self.commit_digest(digest);
            return;
        }

        let message = self.format_update(&alerts, &update);
        // Only a delivered digest suppresses later cycles
        match self.notifier.send_notification(&message).await {
            Ok(()) => {
                self.commit_digest(digest);
                info!("Sent {} alert(s) to Telegram", alerts.len());
            }
            Err(e) => warn!("Failed to send Telegram notification, will retry next cycle: {:#}", e),
        }
    }

    async fn handle_error(&self, error: &anyhow::Error) {
        let message = format!(
            "❌ <b>Risk monitor error</b>\n\n<code>{}</code>",
            escape_html(&format!("{:#}", error))
        );
        if let Err(e) = self.notifier.send_notification(&message).await {
            warn!("Failed to send Telegram error notification: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RiskMetrics;

    fn handler() -> TelegramEventHandler {
        TelegramEventHandler::new(TelegramNotifier::new(None, None), "0x742d35Cc6634C0532925a3b844Bc454e4438f44e")
    }

    fn update(alerts: Vec<Alert>) -> RiskUpdate {
        RiskUpdate { alerts, metrics: RiskMetrics::zero() }
    }

    fn alert(kind: AlertKind, severity: AlertSeverity) -> Alert {
        Alert::new(kind, severity, "Title <x>", "Body & more", "Do something").with_token("SHIB")
    }

    #[test]
    fn filters_by_severity_and_read_state() {
        let handler = handler().with_min_severity(AlertSeverity::High);
        let mut read = alert(AlertKind::SecurityThreat, AlertSeverity::Critical);
        read.is_read = true;
        let update = update(vec![
            alert(AlertKind::PriceVolatility, AlertSeverity::Medium),
            alert(AlertKind::ConcentrationRisk, AlertSeverity::High),
            read,
        ]);

        let relevant = handler.relevant(&update);
        assert_eq!(relevant.len(), 1);
        assert_eq!(relevant[0].kind, AlertKind::ConcentrationRisk);
    }

    #[test]
    fn digest_suppresses_repeats() {
        let handler = handler();
        let first = update(vec![alert(AlertKind::PriceVolatility, AlertSeverity::Medium)]);
        // Fresh ids, same content
        let second = update(vec![alert(AlertKind::PriceVolatility, AlertSeverity::Medium)]);
        let third = update(vec![alert(AlertKind::PriceVolatility, AlertSeverity::High)]);

        let digest = handler.pending_digest(&handler.relevant(&first)).unwrap();
        handler.commit_digest(digest);
        assert!(handler.pending_digest(&handler.relevant(&second)).is_none());
        assert!(handler.pending_digest(&handler.relevant(&third)).is_some());
    }

    #[tokio::test]
    async fn delivered_alerts_are_not_resent() {
        // Disabled notifier: send is a successful no-op
        let handler = handler();
        let first = update(vec![alert(AlertKind::ConcentrationRisk, AlertSeverity::High)]);
        handler.notify(first).await;

        let again = update(vec![alert(AlertKind::ConcentrationRisk, AlertSeverity::High)]);
        assert!(handler.pending_digest(&handler.relevant(&again)).is_none());
    }

    #[tokio::test]
    async fn failed_delivery_is_retried_next_cycle() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let notifier = TelegramNotifier::new(Some("t".into()), Some("c".into()))
            .with_api_base(format!("http://{}", addr));
        let handler = TelegramEventHandler::new(notifier, "0xowner");

        let first = update(vec![alert(AlertKind::ConcentrationRisk, AlertSeverity::High)]);
        handler.notify(first).await;

        let again = update(vec![alert(AlertKind::ConcentrationRisk, AlertSeverity::High)]);
        assert!(handler.pending_digest(&handler.relevant(&again)).is_some());
    }

    #[test]
    fn message_is_escaped_html() {
        let handler = handler();
        let update = update(vec![alert(AlertKind::PriceVolatility, AlertSeverity::Medium)]);
        let relevant = handler.relevant(&update);
        let message = handler.format_update(&relevant, &update);

        assert!(message.contains("Title &lt;x&gt;"));
        assert!(message.contains("Body &amp; more"));
        assert!(message.contains("(SHIB)"));
        assert!(message.contains("0x742d...f44e"));
    }
}
