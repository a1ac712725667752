use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which rule produced an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    PriceVolatility,
    ConcentrationRisk,
    LiquidityDrop,
    SecurityThreat,
    MarketCrash,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::PriceVolatility => "price_volatility",
            AlertKind::ConcentrationRisk => "concentration_risk",
            AlertKind::LiquidityDrop => "liquidity_drop",
            AlertKind::SecurityThreat => "security_threat",
            AlertKind::MarketCrash => "market_crash",
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordinal urgency used for UI emphasis: `Low < Medium < High < Critical`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AlertSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertSeverity::Low => "low",
            AlertSeverity::Medium => "medium",
            AlertSeverity::High => "high",
            AlertSeverity::Critical => "critical",
        }
    }

    /// Emoji used by chat notifiers
    pub fn emoji(&self) -> &'static str {
        match self {
            AlertSeverity::Low => "ℹ️",
            AlertSeverity::Medium => "⚠️",
            AlertSeverity::High => "🔶",
            AlertSeverity::Critical => "🚨",
        }
    }
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertSeverity {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(AlertSeverity::Low),
            "medium" => Ok(AlertSeverity::Medium),
            "high" => Ok(AlertSeverity::High),
            "critical" => Ok(AlertSeverity::Critical),
            other => Err(anyhow::anyhow!("Unknown alert severity: {}", other)),
        }
    }
}

/// A single alert emitted by the rule engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub severity: AlertSeverity,
    pub title: String,
    pub message: String,
    pub recommendation: String,
    pub timestamp: DateTime<Utc>,
    pub is_read: bool,
    pub token_symbol: Option<String>,
    pub current_value: Option<f64>,
    pub threshold_value: Option<f64>,
}

impl Alert {
    /// Create a new unread alert with a fresh id
    pub fn new(
        kind: AlertKind,
        severity: AlertSeverity,
        title: impl Into<String>,
        message: impl Into<String>,
        recommendation: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            severity,
            title: title.into(),
            message: message.into(),
            recommendation: recommendation.into(),
            timestamp: Utc::now(),
            is_read: false,
            token_symbol: None,
            current_value: None,
            threshold_value: None,
        }
    }

    /// Attach the offending token
    pub fn with_token(mut self, symbol: impl Into<String>) -> Self {
        self.token_symbol = Some(symbol.into());
        self
    }

    /// Attach the observed value and the threshold it crossed
    pub fn with_values(mut self, current: f64, threshold: f64) -> Self {
        self.current_value = Some(current);
        self.threshold_value = Some(threshold);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_ordering() {
        assert!(AlertSeverity::Low < AlertSeverity::Medium);
        assert!(AlertSeverity::Medium < AlertSeverity::High);
        assert!(AlertSeverity::High < AlertSeverity::Critical);
    }

    #[test]
    fn ids_are_unique() {
        let a = Alert::new(AlertKind::MarketCrash, AlertSeverity::Critical, "t", "m", "r");
        let b = Alert::new(AlertKind::MarketCrash, AlertSeverity::Critical, "t", "m", "r");
        assert_ne!(a.id, b.id);
        assert!(!a.is_read);
    }

    #[test]
    fn kind_serializes_snake_case() {
        let json = serde_json::to_string(&AlertKind::PriceVolatility).unwrap();
        assert_eq!(json, "\"price_volatility\"");
        assert_eq!(AlertKind::LiquidityDrop.to_string(), "liquidity_drop");
    }

    #[test]
    fn alert_kind_is_written_as_type() {
        let alert = Alert::new(AlertKind::PriceVolatility, AlertSeverity::Medium, "t", "m", "r");
        let json = serde_json::to_value(&alert).unwrap();
        assert_eq!(json["type"], "price_volatility");
        assert!(json.get("kind").is_none());

        let back: Alert = serde_json::from_value(json).unwrap();
        assert_eq!(back, alert);
    }

    #[test]
    fn severity_parses_case_insensitively() {
        assert_eq!("HIGH".parse::<AlertSeverity>().unwrap(), AlertSeverity::High);
        assert!("urgent".parse::<AlertSeverity>().is_err());
    }
}
