use crate::models::{Alert, AlertKind, Portfolio, RiskMetrics};

/// Everything a rule may look at during one evaluation pass
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub portfolio: &'a Portfolio,
    pub metrics: &'a RiskMetrics,
}

/// A single threshold check run by the alert engine
pub trait AlertRule: Send {
    /// Kind of alert this rule emits
    fn kind(&self) -> AlertKind;

    /// Evaluate the rule; `Ok(None)` when it does not fire.
    ///
    /// An `Err` only skips this rule for the current pass.
    fn evaluate(&mut self, ctx: &RuleContext<'_>) -> anyhow::Result<Option<Alert>>;
}
