//! Portfolio-level risk metrics.
//!
//! Every metric is a pure function of `(tokens, total_value)` and collapses to
//! 0 for an empty list or a non-positive total, never NaN.

use chrono::Utc;
use tracing::debug;

use crate::models::{Portfolio, RiskMetrics, Token};
use crate::utils::helper::clamp_score;

const LIQUIDITY_VALUE_UNIT: f64 = 1000.0;
const LIQUIDITY_VALUE_WEIGHT: f64 = 50.0;
const LIQUIDITY_STABILITY_BASE: f64 = 50.0;
const VOLATILITY_MULTIPLIER: f64 = 2.0;

/// Computes [`RiskMetrics`] for a portfolio snapshot
pub struct RiskAggregator;

impl RiskAggregator {
    /// Evaluate all metrics for a portfolio
    pub fn compute(portfolio: &Portfolio) -> RiskMetrics {
        let tokens = &portfolio.tokens;
        let total = portfolio.total_value;

        let metrics = RiskMetrics {
            portfolio_risk_score: weighted_risk(tokens, total),
            volatility_index: volatility_index(tokens, total),
            liquidity_score: liquidity_score(tokens, total),
            concentration_risk: concentration_risk(tokens, total),
            security_score: security_score(tokens, total),
            diversification_score: diversification_score(tokens, total),
            last_updated: Utc::now(),
        };

        debug!(
            "Risk metrics for {}: risk={} volatility={} liquidity={} concentration={} security={} diversification={}",
            portfolio.address,
            metrics.portfolio_risk_score,
            metrics.volatility_index,
            metrics.liquidity_score,
            metrics.concentration_risk,
            metrics.security_score,
            metrics.diversification_score,
        );

        metrics
    }
}

fn is_degenerate(tokens: &[Token], total_value: f64) -> bool {
    tokens.is_empty() || !total_value.is_finite() || total_value <= 0.0
}

fn shares(tokens: &[Token], total_value: f64) -> impl Iterator<Item = f64> + '_ {
    tokens.iter().map(move |t| t.value / total_value)
}

fn mean_abs_change(tokens: &[Token]) -> f64 {
    let sum: f64 = tokens
        .iter()
        .map(|t| if t.change_24h.is_finite() { t.change_24h.abs() } else { 0.0 })
        .sum();
    sum / tokens.len() as f64
}

/// Value-weighted mean of per-token risk scores
pub fn weighted_risk(tokens: &[Token], total_value: f64) -> u8 {
    if is_degenerate(tokens, total_value) {
        return 0;
    }
    let weighted: f64 = tokens
        .iter()
        .map(|t| (t.value / total_value) * t.risk_score as f64)
        .sum();
    clamp_score(weighted)
}

/// Herfindahl-Hirschman index over value shares, in `[1/n, 1]`
pub fn herfindahl_index(tokens: &[Token], total_value: f64) -> f64 {
    if is_degenerate(tokens, total_value) {
        return 0.0;
    }
    shares(tokens, total_value).map(|s| s * s).sum()
}

// Same formula as `concentration_risk`, tracked as its own metric.
fn diversification_risk(tokens: &[Token], total_value: f64) -> u8 {
    clamp_score((herfindahl_index(tokens, total_value) * 100.0).min(100.0))
}

/// HHI scaled to `[0, 100]`
pub fn concentration_risk(tokens: &[Token], total_value: f64) -> u8 {
    clamp_score((herfindahl_index(tokens, total_value) * 100.0).min(100.0))
}

/// Shannon entropy of value shares normalised by `log2(n)`, scaled to `[0, 100]`
pub fn diversification_score(tokens: &[Token], total_value: f64) -> u8 {
    if is_degenerate(tokens, total_value) || tokens.len() <= 1 {
        return 0;
    }
    let entropy: f64 = shares(tokens, total_value)
        .filter(|p| *p > 0.0)
        .map(|p| -p * p.log2())
        .sum();
    clamp_score(entropy / (tokens.len() as f64).log2() * 100.0)
}

/// Mean absolute 24h change, doubled and capped at 100
pub fn volatility_index(tokens: &[Token], total_value: f64) -> u8 {
    if is_degenerate(tokens, total_value) {
        return 0;
    }
    clamp_score((mean_abs_change(tokens) * VOLATILITY_MULTIPLIER).min(100.0))
}

/// Blend of average position size and price stability.
///
/// A coarse proxy: no order-book or volume data is consulted.
pub fn liquidity_score(tokens: &[Token], total_value: f64) -> u8 {
    if is_degenerate(tokens, total_value) {
        return 0;
    }
    let avg_value = total_value / tokens.len() as f64;
    let size_component = (avg_value / LIQUIDITY_VALUE_UNIT * LIQUIDITY_VALUE_WEIGHT).min(100.0);
    let stability_component =
        (LIQUIDITY_STABILITY_BASE - mean_abs_change(tokens) * VOLATILITY_MULTIPLIER).max(0.0);
    clamp_score((size_component + stability_component) / 2.0)
}

/// Mean of per-token risk scores
pub fn security_score(tokens: &[Token], total_value: f64) -> u8 {
    if is_degenerate(tokens, total_value) {
        return 0;
    }
    let sum: f64 = tokens.iter().map(|t| t.risk_score as f64).sum();
    clamp_score(sum / tokens.len() as f64)
}

/// HHI-based diversification risk of a portfolio
pub fn portfolio_diversification_risk(portfolio: &Portfolio) -> u8 {
    diversification_risk(&portfolio.tokens, portfolio.total_value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn holding(symbol: &str, value: f64, change: f64, score: u8) -> Token {
        Token::new(symbol, symbol, value, 1.0, change, None, false).with_risk_score(score)
    }

    fn portfolio(tokens: Vec<Token>) -> Portfolio {
        Portfolio::new("0xtest", tokens)
    }

    #[test]
    fn empty_portfolio_is_all_zero() {
        let m = RiskAggregator::compute(&portfolio(vec![]));
        assert_eq!(m.portfolio_risk_score, 0);
        assert_eq!(m.volatility_index, 0);
        assert_eq!(m.liquidity_score, 0);
        assert_eq!(m.concentration_risk, 0);
        assert_eq!(m.security_score, 0);
        assert_eq!(m.diversification_score, 0);
    }

    #[test]
    fn zero_total_value_is_all_zero() {
        let p = portfolio(vec![holding("A", 0.0, 40.0, 90), holding("B", 0.0, -12.0, 70)]);
        assert_eq!(p.total_value, 0.0);
        let m = RiskAggregator::compute(&p);
        assert_eq!(
            [m.portfolio_risk_score, m.volatility_index, m.liquidity_score, m.concentration_risk, m.security_score],
            [0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn weighted_risk_matches_weighted_mean() {
        let tokens = vec![holding("ETH", 8000.0, 5.0, 80), holding("SHIB", 2000.0, 35.0, 20)];
        assert_eq!(weighted_risk(&tokens, 10_000.0), 68);
    }

    #[test]
    fn single_token_is_fully_concentrated() {
        let tokens = vec![holding("ETH", 500.0, 1.0, 70)];
        assert_eq!(concentration_risk(&tokens, 500.0), 100);
        assert_eq!(diversification_score(&tokens, 500.0), 0);
    }

    #[test]
    fn equal_tokens_concentration_is_hundred_over_n() {
        for n in 2..=12usize {
            let tokens: Vec<Token> = (0..n).map(|i| holding(&format!("T{i}"), 100.0, 0.0, 50)).collect();
            let total = 100.0 * n as f64;
            let expected = (100.0 / n as f64).round() as u8;
            assert_eq!(concentration_risk(&tokens, total), expected, "n = {n}");
        }
    }

    #[test]
    fn even_four_token_portfolio() {
        let tokens: Vec<Token> = ["A", "B", "C", "D"].iter().map(|s| holding(s, 250.0, 0.0, 50)).collect();
        assert_eq!(diversification_score(&tokens, 1000.0), 100);
        assert_eq!(concentration_risk(&tokens, 1000.0), 25);
    }

    #[test]
    fn skewed_portfolio_scores_independently() {
        let tokens = vec![holding("A", 900.0, 0.0, 50), holding("B", 100.0, 0.0, 50)];
        // HHI = 0.81 + 0.01
        assert_eq!(concentration_risk(&tokens, 1000.0), 82);
        // H = -(0.9 log2 0.9 + 0.1 log2 0.1) ≈ 0.469
        assert_eq!(diversification_score(&tokens, 1000.0), 47);
    }

    #[test]
    fn diversification_risk_tracks_concentration() {
        let p = portfolio(vec![holding("A", 700.0, 0.0, 50), holding("B", 300.0, 0.0, 50)]);
        assert_eq!(portfolio_diversification_risk(&p), 58);
        assert_eq!(concentration_risk(&p.tokens, p.total_value), 58);
    }

    #[test]
    fn volatility_index_doubles_mean_move_and_caps() {
        let calm = vec![holding("A", 1.0, 5.0, 50), holding("B", 1.0, -15.0, 50)];
        assert_eq!(volatility_index(&calm, 2.0), 20);
        let wild = vec![holding("A", 1.0, 80.0, 50)];
        assert_eq!(volatility_index(&wild, 1.0), 100);
    }

    #[test]
    fn liquidity_blends_size_and_stability() {
        // avg value 5000 -> size 100 (capped), mean move 20 -> stability 10
        let tokens = vec![holding("ETH", 8000.0, 5.0, 80), holding("SHIB", 2000.0, 35.0, 20)];
        assert_eq!(liquidity_score(&tokens, 10_000.0), 55);

        // avg value 100 -> size 5, mean move 30 -> stability 0
        let small = vec![holding("PEPE", 100.0, 30.0, 50)];
        assert_eq!(liquidity_score(&small, 100.0), 3);
    }

    #[test]
    fn security_is_mean_token_score() {
        let tokens = vec![holding("A", 10.0, 0.0, 90), holding("B", 10.0, 0.0, 30), holding("C", 10.0, 0.0, 61)];
        assert_eq!(security_score(&tokens, 30.0), 60);
    }

    proptest! {
        #[test]
        fn weighted_risk_stays_in_bounds(
            holdings in prop::collection::vec((0.0f64..1e7, 0u8..=100), 1..20)
        ) {
            let tokens: Vec<Token> = holdings
                .iter()
                .enumerate()
                .map(|(i, (value, score))| holding(&format!("T{i}"), *value, 0.0, *score))
                .collect();
            let total: f64 = tokens.iter().map(|t| t.value).sum();
            let risk = weighted_risk(&tokens, total);
            prop_assert!(risk <= 100);

            if total > 0.0 {
                let expected: f64 = tokens.iter().map(|t| t.value / total * t.risk_score as f64).sum();
                prop_assert_eq!(risk, expected.round().clamp(0.0, 100.0) as u8);
                let min = tokens.iter().filter(|t| t.value > 0.0).map(|t| t.risk_score).min().unwrap_or(0);
                let max = tokens.iter().filter(|t| t.value > 0.0).map(|t| t.risk_score).max().unwrap_or(100);
                prop_assert!(risk >= min.saturating_sub(1) && risk <= max.saturating_add(1).min(100));
            } else {
                prop_assert_eq!(risk, 0);
            }
        }

        #[test]
        fn concentration_and_diversification_in_bounds(
            values in prop::collection::vec(0.0f64..1e6, 0..16)
        ) {
            let tokens: Vec<Token> = values
                .iter()
                .enumerate()
                .map(|(i, v)| holding(&format!("T{i}"), *v, 0.0, 50))
                .collect();
            let total: f64 = tokens.iter().map(|t| t.value).sum();
            prop_assert!(concentration_risk(&tokens, total) <= 100);
            prop_assert!(diversification_score(&tokens, total) <= 100);
        }
    }
}
