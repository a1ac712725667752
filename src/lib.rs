//! Portfolio Risk Monitor Library
//!
//! Values multi-chain crypto holdings, aggregates them into portfolio-level
//! risk metrics, raises threshold alerts and re-evaluates on a fixed interval,
//! fanning results out to subscribers.

// Public modules - these are the API surface
pub mod models;
pub mod risk;
pub mod alerts;
pub mod traits;
pub mod providers;
pub mod aggregation;
pub mod handlers;
pub mod notifications;
pub mod tracker;
pub mod config;
pub mod resources;
pub mod yields;
pub mod utils;
pub mod telegram_notifier;

// Re-export commonly used items for easier access
pub use models::{Alert, AlertKind, AlertSeverity, Portfolio, RiskMetrics, RiskUpdate, Token};
pub use risk::{valuate, RiskAggregator};
pub use alerts::AlertEngine;
pub use traits::{AlertNotifier, AlertRule, PriceProvider, PriceQuote, RiskEventHandler, RuleContext};
pub use providers::StaticPriceProvider;
pub use aggregation::{ChainBalance, PortfolioAggregator};
pub use handlers::{ConsoleEventHandler, TelegramEventHandler};
pub use notifications::NotificationQueue;
pub use tracker::{RiskMonitor, ScheduledTask, Subscription};
pub use config::{AlertThresholds, MarketCrashSimulation, MonitorConfig};
pub use resources::{risk_prevention_tips, risk_support_resources, SupportResource};
pub use yields::{suggest_yields, YieldOpportunity, YieldRisk, YieldSuggestion};
pub use telegram_notifier::TelegramNotifier;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result type alias for library functions
pub type Result<T> = std::result::Result<T, anyhow::Error>;
