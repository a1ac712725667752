use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, error, warn};

use crate::config::MonitorConfig;
use crate::models::{Alert, Portfolio, RiskMetrics};
use crate::traits::alert_rule::{AlertRule, RuleContext};

use super::rules::{default_rules, MarketCrashRule};

/// Runs every registered rule against a portfolio and its metrics.
///
/// Each call returns a fresh alert list; nothing is carried over between
/// calls. A rule that errors or panics is logged and skipped, and the failure
/// is kept until [`AlertEngine::take_failures`].
pub struct AlertEngine {
    rules: Vec<Box<dyn AlertRule>>,
    failures: Vec<anyhow::Error>,
}

impl AlertEngine {
    /// Create an engine with an explicit rule set
    pub fn with_rules(rules: Vec<Box<dyn AlertRule>>) -> Self {
        Self {
            rules,
            failures: Vec::new(),
        }
    }

    /// Built-in rules for the configuration; the crash simulation only when enabled
    pub fn from_config(config: &MonitorConfig) -> Self {
        let mut rules = default_rules(&config.thresholds);
        if config.market_crash.enabled {
            warn!(
                "Market crash simulation enabled (p = {}); alerts of this kind are synthetic",
                config.market_crash.probability
            );
            rules.push(Box::new(MarketCrashRule::from_config(&config.market_crash)));
        }
        Self::with_rules(rules)
    }

    /// Number of registered rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if there are any rules
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Evaluate all rules and collect the alerts that fired
    pub fn evaluate(&mut self, portfolio: &Portfolio, metrics: &RiskMetrics) -> Vec<Alert> {
        let ctx = RuleContext { portfolio, metrics };
        let mut alerts = Vec::new();
        self.failures.clear();

        for rule in self.rules.iter_mut() {
            let kind = rule.kind();
            match panic::catch_unwind(AssertUnwindSafe(|| rule.evaluate(&ctx))) {
                Ok(Ok(Some(alert))) => {
                    debug!("Rule {} fired ({})", kind, alert.severity);
                    alerts.push(alert);
                }
                Ok(Ok(None)) => {}
                Ok(Err(e)) => {
                    warn!("Rule {} failed, skipping: {:#}", kind, e);
                    self.failures.push(e.context(format!("Rule {} failed", kind)));
                }
                Err(_) => {
                    error!("Rule {} panicked, skipping", kind);
                    self.failures.push(anyhow::anyhow!("Rule {} panicked", kind));
                }
            }
        }

        alerts
    }

    /// Failures from the last [`evaluate`](Self::evaluate) pass
    pub fn take_failures(&mut self) -> Vec<anyhow::Error> {
        std::mem::take(&mut self.failures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AlertKind, AlertSeverity, Token};
    use crate::risk::RiskAggregator;

    struct FailingRule;

    impl AlertRule for FailingRule {
        fn kind(&self) -> AlertKind {
            AlertKind::SecurityThreat
        }

        fn evaluate(&mut self, _ctx: &RuleContext<'_>) -> anyhow::Result<Option<Alert>> {
            Err(anyhow::anyhow!("price feed missing"))
        }
    }

    struct PanickingRule;

    impl AlertRule for PanickingRule {
        fn kind(&self) -> AlertKind {
            AlertKind::LiquidityDrop
        }

        fn evaluate(&mut self, _ctx: &RuleContext<'_>) -> anyhow::Result<Option<Alert>> {
            panic!("boom")
        }
    }

    struct AlwaysRule;

    impl AlertRule for AlwaysRule {
        fn kind(&self) -> AlertKind {
            AlertKind::MarketCrash
        }

        fn evaluate(&mut self, _ctx: &RuleContext<'_>) -> anyhow::Result<Option<Alert>> {
            Ok(Some(Alert::new(AlertKind::MarketCrash, AlertSeverity::Critical, "t", "m", "r")))
        }
    }

    fn holding(symbol: &str, value: f64, change: f64, score: u8) -> Token {
        Token::new(symbol, symbol, value, 1.0, change, None, false).with_risk_score(score)
    }

    #[test]
    fn empty_portfolio_raises_nothing() {
        let mut engine = AlertEngine::from_config(&MonitorConfig::default());
        let portfolio = Portfolio::new("0x", vec![]);
        let metrics = RiskAggregator::compute(&portfolio);
        assert!(engine.evaluate(&portfolio, &metrics).is_empty());
    }

    #[test]
    fn zero_value_portfolio_raises_nothing() {
        let mut engine = AlertEngine::from_config(&MonitorConfig::default());
        let portfolio = Portfolio::new("0x", vec![holding("A", 0.0, 50.0, 5)]);
        let metrics = RiskAggregator::compute(&portfolio);
        assert!(engine.evaluate(&portfolio, &metrics).is_empty());
    }

    #[test]
    fn failing_rules_do_not_block_others() {
        let mut engine = AlertEngine::with_rules(vec![
            Box::new(FailingRule),
            Box::new(PanickingRule),
            Box::new(AlwaysRule),
        ]);
        let portfolio = Portfolio::new("0x", vec![holding("A", 10.0, 0.0, 50)]);
        let metrics = RiskAggregator::compute(&portfolio);
        let alerts = engine.evaluate(&portfolio, &metrics);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::MarketCrash);
    }

    #[test]
    fn failures_are_kept_for_one_pass() {
        let mut engine = AlertEngine::with_rules(vec![Box::new(FailingRule), Box::new(PanickingRule)]);
        let portfolio = Portfolio::new("0x", vec![holding("A", 10.0, 0.0, 50)]);
        let metrics = RiskAggregator::compute(&portfolio);

        engine.evaluate(&portfolio, &metrics);
        let failures = engine.take_failures();
        assert_eq!(failures.len(), 2);
        assert!(format!("{:#}", failures[0]).contains("price feed missing"));
        assert!(failures[1].to_string().contains("panicked"));
        assert!(engine.take_failures().is_empty());

        let mut healthy = AlertEngine::with_rules(vec![Box::new(AlwaysRule)]);
        healthy.evaluate(&portfolio, &metrics);
        assert!(healthy.take_failures().is_empty());
    }

    #[test]
    fn several_rules_fire_together() {
        let mut engine = AlertEngine::from_config(&MonitorConfig::default());
        // one small, volatile, low-score holding trips every threshold rule
        let portfolio = Portfolio::new("0x", vec![holding("RUG", 50.0, -60.0, 10)]);
        let metrics = RiskAggregator::compute(&portfolio);
        let kinds: Vec<AlertKind> = engine.evaluate(&portfolio, &metrics).iter().map(|a| a.kind).collect();
        assert_eq!(
            kinds,
            vec![
                AlertKind::PriceVolatility,
                AlertKind::ConcentrationRisk,
                AlertKind::LiquidityDrop,
                AlertKind::SecurityThreat,
            ]
        );
    }

    #[test]
    fn crash_rule_only_when_enabled() {
        assert_eq!(AlertEngine::from_config(&MonitorConfig::default()).len(), 4);

        let mut config = MonitorConfig::default();
        config.market_crash.enabled = true;
        config.market_crash.probability = 1.0;
        config.market_crash.seed = Some(1);
        let mut engine = AlertEngine::from_config(&config);
        assert_eq!(engine.len(), 5);

        let portfolio = Portfolio::new("0x", vec![]);
        let metrics = RiskAggregator::compute(&portfolio);
        let alerts = engine.evaluate(&portfolio, &metrics);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::MarketCrash);
    }

    #[test]
    fn alert_ids_differ_between_passes() {
        let mut engine = AlertEngine::with_rules(vec![Box::new(AlwaysRule)]);
        let portfolio = Portfolio::new("0x", vec![]);
        let metrics = RiskAggregator::compute(&portfolio);
        let first = engine.evaluate(&portfolio, &metrics);
        let second = engine.evaluate(&portfolio, &metrics);
        assert_ne!(first[0].id, second[0].id);
    }
}
