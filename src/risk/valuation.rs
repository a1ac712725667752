//! Token valuation and the per-token risk heuristic.
//!
//! Scores are relative ranking hints, not probabilities.

use serde::{Deserialize, Serialize};

use crate::utils::helper::{clamp_score, is_zero_address};

const BASE_SCORE: f64 = 50.0;
const PRICE_SIGNAL_BONUS: f64 = 20.0;
const CONTRACT_BONUS: f64 = 15.0;
const MATERIALITY_BONUS: f64 = 10.0;
const MATERIALITY_THRESHOLD: f64 = 1000.0;
const MATURE_CONTRACT_DAYS: u32 = 365;
const MATURE_CONTRACT_BONUS: f64 = 15.0;
const ESTABLISHED_CONTRACT_DAYS: u32 = 90;
const ESTABLISHED_CONTRACT_BONUS: f64 = 10.0;

/// Human-readable balance and its quote-currency value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Valuation {
    pub balance: f64,
    pub value: f64,
}

/// Inputs to [`risk_score`]
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenRiskSignals<'a> {
    pub change_24h: Option<f64>,
    pub contract_address: Option<&'a str>,
    pub value: f64,
    pub contract_age_days: Option<u32>,
}

/// Convert a raw on-chain amount into a balance and value.
///
/// A zero, negative or non-finite price values the holding at zero.
pub fn valuate(raw_balance: u128, decimals: u8, price: f64) -> Valuation {
    let balance = raw_balance as f64 / 10f64.powi(decimals as i32);
    let price = if price.is_finite() && price > 0.0 { price } else { 0.0 };

    Valuation {
        balance,
        value: balance * price,
    }
}

/// Heuristic score in `[0, 100]`
pub fn risk_score(signals: &TokenRiskSignals<'_>) -> u8 {
    let mut score = BASE_SCORE;

    if let Some(change) = signals.change_24h {
        if change.is_finite() && change != 0.0 {
            score += PRICE_SIGNAL_BONUS;
        }
    }

    if let Some(address) = signals.contract_address {
        if !is_zero_address(address) {
            score += CONTRACT_BONUS;
        }
    }

    if signals.value > MATERIALITY_THRESHOLD {
        score += MATERIALITY_BONUS;
    }

    match signals.contract_age_days {
        Some(days) if days > MATURE_CONTRACT_DAYS => score += MATURE_CONTRACT_BONUS,
        Some(days) if days > ESTABLISHED_CONTRACT_DAYS => score += ESTABLISHED_CONTRACT_BONUS,
        _ => {}
    }

    clamp_score(score)
}
