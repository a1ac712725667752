//! Token valuation and portfolio risk aggregation

pub mod valuation;
pub mod aggregator;

pub use valuation::{risk_score, valuate, TokenRiskSignals, Valuation};
pub use aggregator::RiskAggregator;
