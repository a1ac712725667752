use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::alert::Alert;

/// Portfolio-level risk figures, all in `[0, 100]`.
///
/// Derived from a portfolio snapshot and recomputed wholesale on every evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskMetrics {
    pub portfolio_risk_score: u8,
    pub volatility_index: u8,
    pub liquidity_score: u8,
    pub concentration_risk: u8,
    pub security_score: u8,
    /// Entropy-normalised spread of value across tokens
    pub diversification_score: u8,
    pub last_updated: DateTime<Utc>,
}

impl RiskMetrics {
    /// Metrics of a portfolio with nothing in it
    pub fn zero() -> Self {
        Self {
            portfolio_risk_score: 0,
            volatility_index: 0,
            liquidity_score: 0,
            concentration_risk: 0,
            security_score: 0,
            diversification_score: 0,
            last_updated: Utc::now(),
        }
    }
}

/// The `(alerts, metrics)` pair published after each evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskUpdate {
    pub alerts: Vec<Alert>,
    pub metrics: RiskMetrics,
}
