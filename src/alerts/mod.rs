//! Threshold-based alert generation

pub mod rules;
pub mod engine;

pub use engine::AlertEngine;
pub use rules::{
    default_rules, ConcentrationRule, LiquidityRule, MarketCrashRule, PriceVolatilityRule,
    SecurityRule,
};
