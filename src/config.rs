//! Monitor configuration: evaluation interval, alert thresholds and the
//! demo-only market crash simulation.

use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Default re-evaluation period
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(30_000);

/// Thresholds used by the built-in alert rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertThresholds {
    /// |24h change| in percent above which a token counts as volatile
    pub price_change_pct: f64,
    /// More volatile tokens than this escalate to high severity
    pub volatile_token_count_high: usize,
    pub concentration_warn: u8,
    pub concentration_high: u8,
    pub liquidity_warn: u8,
    pub liquidity_high: u8,
    pub security_warn: u8,
    pub security_critical: u8,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            price_change_pct: 20.0,
            volatile_token_count_high: 2,
            concentration_warn: 70,
            concentration_high: 85,
            liquidity_warn: 30,
            liquidity_high: 15,
            security_warn: 40,
            security_critical: 20,
        }
    }
}

/// Synthetic market crash alert, for demos only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketCrashSimulation {
    pub enabled: bool,
    /// Chance per evaluation, in `[0, 1]`
    pub probability: f64,
    /// Fixed seed for reproducible runs; entropy-seeded when `None`
    pub seed: Option<u64>,
}

impl Default for MarketCrashSimulation {
    fn default() -> Self {
        Self {
            enabled: false,
            probability: 0.05,
            seed: None,
        }
    }
}

/// Configuration owned by a [`RiskMonitor`](crate::tracker::RiskMonitor)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorConfig {
    pub interval: Duration,
    pub thresholds: AlertThresholds,
    pub market_crash: MarketCrashSimulation,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            thresholds: AlertThresholds::default(),
            market_crash: MarketCrashSimulation::default(),
        }
    }
}

impl MonitorConfig {
    /// Load overrides from the environment (call `dotenvy::dotenv()` first)
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Some(ms) = env_parse::<u64>("RISK_MONITOR_INTERVAL_MS")? {
            config.interval = Duration::from_millis(ms);
        }
        if let Some(enabled) = env_parse::<bool>("RISK_SIMULATE_MARKET_CRASH")? {
            config.market_crash.enabled = enabled;
        }
        if let Some(p) = env_parse::<f64>("RISK_MARKET_CRASH_PROBABILITY")? {
            config.market_crash.probability = p;
        }
        if let Some(seed) = env_parse::<u64>("RISK_MARKET_CRASH_SEED")? {
            config.market_crash.seed = Some(seed);
        }
        if let Some(pct) = env_parse::<f64>("RISK_VOLATILITY_THRESHOLD")? {
            config.thresholds.price_change_pct = pct;
        }
        if let Some(v) = env_parse::<u8>("RISK_CONCENTRATION_THRESHOLD")? {
            config.thresholds.concentration_warn = v;
        }
        if let Some(v) = env_parse::<u8>("RISK_LIQUIDITY_THRESHOLD")? {
            config.thresholds.liquidity_warn = v;
        }
        if let Some(v) = env_parse::<u8>("RISK_SECURITY_THRESHOLD")? {
            config.thresholds.security_warn = v;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the monitor cannot run with
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.interval.is_zero() {
            anyhow::bail!("Monitor interval must be greater than zero");
        }
        if !(0.0..=1.0).contains(&self.market_crash.probability) {
            anyhow::bail!(
                "Market crash probability must be within [0, 1], got {}",
                self.market_crash.probability
            );
        }
        if !self.thresholds.price_change_pct.is_finite() || self.thresholds.price_change_pct < 0.0 {
            anyhow::bail!("Volatility threshold must be a non-negative number");
        }

        let t = &self.thresholds;
        if t.concentration_warn >= t.concentration_high {
            anyhow::bail!(
                "Concentration threshold {} must be below the high tier {}",
                t.concentration_warn,
                t.concentration_high
            );
        }
        if t.liquidity_warn <= t.liquidity_high {
            anyhow::bail!(
                "Liquidity threshold {} must be above the high tier {}",
                t.liquidity_warn,
                t.liquidity_high
            );
        }
        if t.security_warn <= t.security_critical {
            anyhow::bail!(
                "Security threshold {} must be above the critical tier {}",
                t.security_warn,
                t.security_critical
            );
        }
        Ok(())
    }
}

fn env_parse<T>(key: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) if raw.trim().is_empty() => Ok(None),
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("{}", e))
            .with_context(|| format!("Invalid value for {}: {:?}", key, raw)),
        Err(_) => Ok(None),
    }
}
