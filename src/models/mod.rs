//! Data models for the risk monitor

pub mod token;
pub mod portfolio;
pub mod risk;
pub mod alert;

// Re-export for convenience
pub use token::Token;
pub use portfolio::Portfolio;
pub use risk::{RiskMetrics, RiskUpdate};
pub use alert::{Alert, AlertKind, AlertSeverity};
