//! DeFi yield suggestions for idle holdings

use serde::{Deserialize, Serialize};

use crate::models::Portfolio;

/// Risk level of a yield venue
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum YieldRisk {
    Low,
    Medium,
    High,
}

/// A known place to earn yield on an asset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YieldOpportunity {
    pub protocol: &'static str,
    pub chain: &'static str,
    pub asset: &'static str,
    /// Annual percentage yield in percent
    pub apy: f64,
    pub risk_level: YieldRisk,
}

/// An opportunity matched to a holding
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YieldSuggestion {
    pub opportunity: YieldOpportunity,
    pub holding_value: f64,
    pub estimated_annual_yield: f64,
}

const OPPORTUNITIES: &[YieldOpportunity] = &[
    YieldOpportunity { protocol: "Lido", chain: "ethereum", asset: "ETH", apy: 3.2, risk_level: YieldRisk::Low },
    YieldOpportunity { protocol: "Rocket Pool", chain: "ethereum", asset: "ETH", apy: 3.0, risk_level: YieldRisk::Low },
    YieldOpportunity { protocol: "Aave", chain: "ethereum", asset: "USDC", apy: 4.5, risk_level: YieldRisk::Low },
    YieldOpportunity { protocol: "Compound", chain: "ethereum", asset: "USDT", apy: 4.1, risk_level: YieldRisk::Low },
    YieldOpportunity { protocol: "Spark", chain: "ethereum", asset: "DAI", apy: 5.0, risk_level: YieldRisk::Low },
    YieldOpportunity { protocol: "Aave", chain: "arbitrum", asset: "WBTC", apy: 0.8, risk_level: YieldRisk::Low },
    YieldOpportunity { protocol: "Curve", chain: "ethereum", asset: "USDC", apy: 6.8, risk_level: YieldRisk::Medium },
    YieldOpportunity { protocol: "GMX", chain: "arbitrum", asset: "ETH", apy: 11.5, risk_level: YieldRisk::Medium },
    YieldOpportunity { protocol: "Aave", chain: "polygon", asset: "MATIC", apy: 2.9, risk_level: YieldRisk::Medium },
    YieldOpportunity { protocol: "Pendle", chain: "arbitrum", asset: "ARB", apy: 18.0, risk_level: YieldRisk::High },
    YieldOpportunity { protocol: "ShibaSwap", chain: "ethereum", asset: "SHIB", apy: 24.0, risk_level: YieldRisk::High },
];

/// Opportunities for held assets up to `max_risk`, best estimated yield first
pub fn suggest_yields(portfolio: &Portfolio, max_risk: YieldRisk) -> Vec<YieldSuggestion> {
    let mut suggestions: Vec<YieldSuggestion> = portfolio
        .tokens
        .iter()
        .filter(|token| token.value.is_finite() && token.value > 0.0)
        .flat_map(|token| {
            OPPORTUNITIES
                .iter()
                .filter(move |o| o.risk_level <= max_risk && o.asset.eq_ignore_ascii_case(&token.symbol))
                .map(move |o| YieldSuggestion {
                    opportunity: o.clone(),
                    holding_value: token.value,
                    estimated_annual_yield: token.value * o.apy / 100.0,
                })
        })
        .collect();

    suggestions.sort_by(|a, b| b.estimated_annual_yield.total_cmp(&a.estimated_annual_yield));
    suggestions
}
