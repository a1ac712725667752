//! Core traits for the risk monitor

pub mod alert_rule;
pub mod price_provider;
pub mod event_handler;

// Re-export for convenience
pub use alert_rule::{AlertRule, RuleContext};
pub use price_provider::{PriceProvider, PriceQuote};
pub use event_handler::{AlertNotifier, RiskEventHandler};
