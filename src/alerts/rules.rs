//! Built-in alert rules.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{AlertThresholds, MarketCrashSimulation};
use crate::models::{Alert, AlertKind, AlertSeverity, Token};
use crate::traits::alert_rule::{AlertRule, RuleContext};

/// Fires when any token moved more than the threshold over 24h
pub struct PriceVolatilityRule {
    threshold_pct: f64,
    high_count: usize,
}

impl PriceVolatilityRule {
    pub fn new(threshold_pct: f64, high_count: usize) -> Self {
        Self { threshold_pct, high_count }
    }
}

impl AlertRule for PriceVolatilityRule {
    fn kind(&self) -> AlertKind {
        AlertKind::PriceVolatility
    }

    fn evaluate(&mut self, ctx: &RuleContext<'_>) -> anyhow::Result<Option<Alert>> {
        if !ctx.portfolio.has_value() {
            return Ok(None);
        }

        let mut volatile: Vec<&Token> = ctx
            .portfolio
            .tokens
            .iter()
            .filter(|t| t.change_24h.is_finite() && t.change_24h.abs() > self.threshold_pct)
            .collect();

        if volatile.is_empty() {
            return Ok(None);
        }

        volatile.sort_by(|a, b| {
            b.change_24h
                .abs()
                .partial_cmp(&a.change_24h.abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let severity = if volatile.len() > self.high_count {
            AlertSeverity::High
        } else {
            AlertSeverity::Medium
        };
        let symbols: Vec<&str> = volatile.iter().map(|t| t.symbol.as_str()).collect();
        let worst = volatile[0];

        let alert = Alert::new(
            AlertKind::PriceVolatility,
            severity,
            "High Price Volatility Detected",
            format!(
                "{} token(s) moved more than {:.0}% in 24h: {} (largest move {} {:+.2}%)",
                volatile.len(),
                self.threshold_pct,
                symbols.join(", "),
                worst.symbol,
                worst.change_24h
            ),
            "Consider reducing exposure to volatile assets or setting stop-loss levels.",
        )
        .with_token(worst.symbol.clone())
        .with_values(worst.change_24h.abs(), self.threshold_pct);

        Ok(Some(alert))
    }
}

/// Fires when value is concentrated in few tokens
pub struct ConcentrationRule {
    warn: u8,
    high: u8,
}

impl ConcentrationRule {
    pub fn new(warn: u8, high: u8) -> Self {
        Self { warn, high }
    }
}

impl AlertRule for ConcentrationRule {
    fn kind(&self) -> AlertKind {
        AlertKind::ConcentrationRisk
    }

    fn evaluate(&mut self, ctx: &RuleContext<'_>) -> anyhow::Result<Option<Alert>> {
        let concentration = ctx.metrics.concentration_risk;
        if !ctx.portfolio.has_value() || concentration <= self.warn {
            return Ok(None);
        }

        let severity = if concentration > self.high {
            AlertSeverity::High
        } else {
            AlertSeverity::Medium
        };

        let mut alert = Alert::new(
            AlertKind::ConcentrationRisk,
            severity,
            "Portfolio Concentration Risk",
            format!(
                "Concentration index is {} (threshold {}); most of the value sits in few positions.",
                concentration, self.warn
            ),
            "Diversify across more assets to lower single-asset exposure.",
        )
        .with_values(concentration as f64, self.warn as f64);

        if let Some(largest) = ctx.portfolio.largest_holding() {
            let share = largest.value / ctx.portfolio.total_value * 100.0;
            alert.message.push_str(&format!(" Largest holding: {} at {:.1}%.", largest.symbol, share));
            alert = alert.with_token(largest.symbol.clone());
        }

        Ok(Some(alert))
    }
}

/// Fires when the liquidity proxy falls below the threshold
pub struct LiquidityRule {
    warn: u8,
    high: u8,
}

impl LiquidityRule {
    pub fn new(warn: u8, high: u8) -> Self {
        Self { warn, high }
    }
}

impl AlertRule for LiquidityRule {
    fn kind(&self) -> AlertKind {
        AlertKind::LiquidityDrop
    }

    fn evaluate(&mut self, ctx: &RuleContext<'_>) -> anyhow::Result<Option<Alert>> {
        let liquidity = ctx.metrics.liquidity_score;
        if !ctx.portfolio.has_value() || liquidity >= self.warn {
            return Ok(None);
        }

        let severity = if liquidity < self.high {
            AlertSeverity::High
        } else {
            AlertSeverity::Medium
        };

        Ok(Some(
            Alert::new(
                AlertKind::LiquidityDrop,
                severity,
                "Low Portfolio Liquidity",
                format!(
                    "Liquidity score dropped to {} (threshold {}). Positions are small or unstable.",
                    liquidity, self.warn
                ),
                "Keep part of the portfolio in large, stable assets that can be exited quickly.",
            )
            .with_values(liquidity as f64, self.warn as f64),
        ))
    }
}

/// Fires when the average token security score is low
pub struct SecurityRule {
    warn: u8,
    critical: u8,
}

impl SecurityRule {
    pub fn new(warn: u8, critical: u8) -> Self {
        Self { warn, critical }
    }
}

impl AlertRule for SecurityRule {
    fn kind(&self) -> AlertKind {
        AlertKind::SecurityThreat
    }

    fn evaluate(&mut self, ctx: &RuleContext<'_>) -> anyhow::Result<Option<Alert>> {
        let security = ctx.metrics.security_score;
        if !ctx.portfolio.has_value() || security >= self.warn {
            return Ok(None);
        }

        let severity = if security < self.critical {
            AlertSeverity::Critical
        } else {
            AlertSeverity::High
        };

        let mut alert = Alert::new(
            AlertKind::SecurityThreat,
            severity,
            "Security Threat Detected",
            format!(
                "Average token security score is {} (threshold {}).",
                security, self.warn
            ),
            "Review unverified contracts and revoke token approvals you no longer need.",
        )
        .with_values(security as f64, self.warn as f64);

        let weakest = ctx.portfolio.tokens.iter().min_by_key(|t| t.risk_score);
        if let Some(token) = weakest {
            alert = alert.with_token(token.symbol.clone());
        }

        Ok(Some(alert))
    }
}

/// Synthetic crash alert drawn at random; demo builds only
pub struct MarketCrashRule {
    probability: f64,
    rng: StdRng,
}

impl MarketCrashRule {
    pub fn new(probability: f64, rng: StdRng) -> Self {
        Self {
            probability: if probability.is_finite() { probability.clamp(0.0, 1.0) } else { 0.0 },
            rng,
        }
    }

    /// Build from configuration, seeding the RNG when a seed is given
    pub fn from_config(config: &MarketCrashSimulation) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::new(config.probability, rng)
    }
}

impl AlertRule for MarketCrashRule {
    fn kind(&self) -> AlertKind {
        AlertKind::MarketCrash
    }

    fn evaluate(&mut self, _ctx: &RuleContext<'_>) -> anyhow::Result<Option<Alert>> {
        if !self.rng.gen_bool(self.probability) {
            return Ok(None);
        }

        Ok(Some(Alert::new(
            AlertKind::MarketCrash,
            AlertSeverity::Critical,
            "Market Crash Simulation",
            "Simulated market-wide drawdown. This alert is generated for demonstration only.",
            "Review stop-loss levels and stablecoin reserves before real volatility hits.",
        )))
    }
}

/// The threshold rules for a given configuration
pub fn default_rules(thresholds: &AlertThresholds) -> Vec<Box<dyn AlertRule>> {
    vec![
        Box::new(PriceVolatilityRule::new(
            thresholds.price_change_pct,
            thresholds.volatile_token_count_high,
        )),
        Box::new(ConcentrationRule::new(
            thresholds.concentration_warn,
            thresholds.concentration_high,
        )),
        Box::new(LiquidityRule::new(thresholds.liquidity_warn, thresholds.liquidity_high)),
        Box::new(SecurityRule::new(thresholds.security_warn, thresholds.security_critical)),
    ]
}
