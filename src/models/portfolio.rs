use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::token::Token;

/// Snapshot of a wallet's holdings, rebuilt on every refresh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    pub address: String,
    pub tokens: Vec<Token>,
    pub total_value: f64,
    /// Absolute quote-currency change over 24h
    pub change_24h: f64,
    pub change_24h_percent: f64,
    pub last_updated: DateTime<Utc>,
}

impl Portfolio {
    /// Create a new snapshot; totals are derived from the tokens
    pub fn new(address: impl Into<String>, tokens: Vec<Token>) -> Self {
        let total_value: f64 = tokens.iter().map(|t| t.value).sum();
        let change_24h: f64 = tokens.iter().map(value_change_24h).sum();
        let previous_value = total_value - change_24h;
        let change_24h_percent = if previous_value > 0.0 {
            change_24h / previous_value * 100.0
        } else {
            0.0
        };

        Self {
            address: address.into(),
            tokens,
            total_value,
            change_24h,
            change_24h_percent,
            last_updated: Utc::now(),
        }
    }

    /// Build one portfolio out of per-chain token lists.
    ///
    /// Tokens sharing `(contract address, symbol)` are merged by summing
    /// balance and value; the first occurrence keeps its metadata.
    pub fn merge_chains(address: impl Into<String>, chains: Vec<Vec<Token>>) -> Self {
        let mut merged: Vec<Token> = Vec::new();
        let mut index: HashMap<(Option<String>, String), usize> = HashMap::new();

        for token in chains.into_iter().flatten() {
            match index.get(&token.merge_key()) {
                Some(&i) => {
                    let existing = &mut merged[i];
                    existing.balance += token.balance;
                    existing.value += token.value;
                    if existing.balance > 0.0 {
                        existing.price = existing.value / existing.balance;
                    }
                    existing.refresh_risk_score();
                }
                None => {
                    index.insert(token.merge_key(), merged.len());
                    merged.push(token);
                }
            }
        }

        Self::new(address, merged)
    }

    /// Get a token by symbol
    pub fn get_token(&self, symbol: &str) -> Option<&Token> {
        self.tokens.iter().find(|t| t.symbol.eq_ignore_ascii_case(symbol))
    }

    /// Largest holding by value
    pub fn largest_holding(&self) -> Option<&Token> {
        self.tokens
            .iter()
            .max_by(|a, b| a.value.partial_cmp(&b.value).unwrap_or(std::cmp::Ordering::Equal))
    }

    /// Check if snapshot is empty (no tokens)
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Number of tokens in portfolio
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    /// True when there is something to assess: at least one token and a positive total
    pub fn has_value(&self) -> bool {
        !self.tokens.is_empty() && self.total_value.is_finite() && self.total_value > 0.0
    }
}

/// Quote-currency change implied by the token's percent move
fn value_change_24h(token: &Token) -> f64 {
    let factor = 1.0 + token.change_24h / 100.0;
    if !token.change_24h.is_finite() || factor <= 0.0 {
        return 0.0;
    }
    token.value - token.value / factor
}
