use tracing::{info, warn};

use crate::models::{Alert, AlertSeverity, RiskMetrics};
use crate::traits::event_handler::RiskEventHandler;

/// Console logging event handler
pub struct ConsoleEventHandler;

impl ConsoleEventHandler {
    /// Create a new console event handler
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleEventHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl RiskEventHandler for ConsoleEventHandler {
    fn handle_risk_update(&self, alerts: Vec<Alert>, metrics: RiskMetrics) {
        info!("Risk update at {}:", metrics.last_updated.format("%Y-%m-%d %H:%M:%S"));
        info!("{}", "-".repeat(80));
        info!("  Portfolio risk:   {}", metrics.portfolio_risk_score);
        info!("  Volatility index: {}", metrics.volatility_index);
        info!("  Liquidity score:  {}", metrics.liquidity_score);
        info!("  Concentration:    {}", metrics.concentration_risk);
        info!("  Security score:   {}", metrics.security_score);
        info!("  Diversification:  {}", metrics.diversification_score);

        if alerts.is_empty() {
            info!("  No active alerts");
        }

        for alert in alerts.iter().filter(|a| !a.is_read) {
            let token = alert.token_symbol.as_deref().unwrap_or("-");
            if alert.severity >= AlertSeverity::High {
                warn!("  [{}] {} ({}): {}", alert.severity, alert.title, token, alert.message);
            } else {
                info!("  [{}] {} ({}): {}", alert.severity, alert.title, token, alert.message);
            }
            info!("     -> {}", alert.recommendation);
        }

        info!("{}", "=".repeat(80));
    }

    fn handle_error(&self, error: &anyhow::Error) {
        warn!("Risk evaluation error: {:#}", error);
    }
}
