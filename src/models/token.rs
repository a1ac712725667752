use serde::{Deserialize, Serialize};

use crate::risk::valuation::{self, TokenRiskSignals};

/// A single holding inside a portfolio snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub symbol: String,
    pub name: String,
    pub balance: f64,
    pub price: f64,
    pub value: f64,
    /// 24h price change in percent
    pub change_24h: f64,
    pub risk_score: u8,
    pub contract_address: Option<String>,
    pub is_native: bool,
    #[serde(default)]
    pub contract_age_days: Option<u32>,
}

impl Token {
    /// Create a new token, deriving value and heuristic risk score
    pub fn new(
        symbol: impl Into<String>,
        name: impl Into<String>,
        balance: f64,
        price: f64,
        change_24h: f64,
        contract_address: Option<String>,
        is_native: bool,
    ) -> Self {
        let balance = if balance.is_finite() { balance.max(0.0) } else { 0.0 };
        let price = if price.is_finite() { price.max(0.0) } else { 0.0 };
        let change_24h = if change_24h.is_finite() { change_24h } else { 0.0 };

        let mut token = Self {
            symbol: symbol.into(),
            name: name.into(),
            balance,
            price,
            value: balance * price,
            change_24h,
            risk_score: 0,
            contract_address,
            is_native,
            contract_age_days: None,
        };
        token.refresh_risk_score();
        token
    }

    /// Attach the contract age and rescore
    pub fn with_contract_age(mut self, days: u32) -> Self {
        self.contract_age_days = Some(days);
        self.refresh_risk_score();
        self
    }

    /// Override the heuristic score with an externally supplied one
    pub fn with_risk_score(mut self, score: u8) -> Self {
        self.risk_score = score.min(100);
        self
    }

    /// Override the quote-currency value (balance and price untouched)
    pub fn with_value(mut self, value: f64) -> Self {
        self.value = if value.is_finite() { value.max(0.0) } else { 0.0 };
        self
    }

    /// Recompute `risk_score` from the current fields
    pub fn refresh_risk_score(&mut self) {
        self.risk_score = valuation::risk_score(&self.risk_signals());
    }

    /// Signals fed into the valuation heuristic
    pub fn risk_signals(&self) -> TokenRiskSignals<'_> {
        TokenRiskSignals {
            change_24h: Some(self.change_24h),
            contract_address: self.contract_address.as_deref(),
            value: self.value,
            contract_age_days: self.contract_age_days,
        }
    }

    /// Key used to merge the same asset held on several chains
    pub fn merge_key(&self) -> (Option<String>, String) {
        (
            self.contract_address.as_ref().map(|a| a.to_lowercase()),
            self.symbol.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_is_balance_times_price() {
        let token = Token::new("ETH", "Ether", 2.5, 3000.0, 1.2, None, true);
        assert!((token.value - 7500.0).abs() < 1e-9);
    }

    #[test]
    fn negative_inputs_are_floored() {
        let token = Token::new("BAD", "Bad", -1.0, f64::NAN, 0.0, None, false);
        assert_eq!(token.balance, 0.0);
        assert_eq!(token.price, 0.0);
        assert_eq!(token.value, 0.0);
    }

    #[test]
    fn non_finite_change_is_zeroed() {
        let token = Token::new("ODD", "Odd", 1.0, 1.0, f64::NAN, None, false);
        assert_eq!(token.change_24h, 0.0);
        let infinite = Token::new("ODD", "Odd", 1.0, 1.0, f64::INFINITY, None, false);
        assert_eq!(infinite.change_24h, 0.0);

        let json = serde_json::to_string(&token).unwrap();
        let back: Token = serde_json::from_str(&json).unwrap();
        assert_eq!(back.change_24h, 0.0);
    }

    #[test]
    fn merge_key_ignores_address_case() {
        let a = Token::new("USDC", "USD Coin", 1.0, 1.0, 0.0, Some("0xABC".into()), false);
        let b = Token::new("USDC", "USD Coin", 1.0, 1.0, 0.0, Some("0xabc".into()), false);
        assert_eq!(a.merge_key(), b.merge_key());
    }

    #[test]
    fn contract_age_raises_score() {
        let young = Token::new("UNI", "Uniswap", 10.0, 5.0, 2.0, Some("0x1f98".into()), false);
        let old = young.clone().with_contract_age(400);
        assert_eq!(old.risk_score, young.risk_score + 15);
    }

    #[test]
    fn explicit_score_is_capped() {
        let token = Token::new("X", "X", 1.0, 1.0, 0.0, None, false).with_risk_score(150);
        assert_eq!(token.risk_score, 100);
    }
}
