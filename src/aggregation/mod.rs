//! Multi-chain portfolio aggregation.
//!
//! Turns raw per-chain balances into a priced [`Portfolio`], merging the same
//! asset held on several chains.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::models::{Portfolio, Token};
use crate::risk::valuation::valuate;
use crate::traits::price_provider::PriceProvider;

/// Raw balance of one asset on one chain, as reported by a chain-data API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainBalance {
    pub chain: String,
    pub symbol: String,
    pub name: String,
    pub contract_address: Option<String>,
    pub raw_balance: u128,
    pub decimals: u8,
    pub is_native: bool,
    #[serde(default)]
    pub contract_age_days: Option<u32>,
}

/// Prices balances and folds them into a single portfolio
pub struct PortfolioAggregator {
    price_provider: Arc<dyn PriceProvider>,
}

impl PortfolioAggregator {
    /// Create a new aggregator
    pub fn new(price_provider: Arc<dyn PriceProvider>) -> Self {
        Self { price_provider }
    }

    /// Value one balance; an unknown price values it at zero
    pub async fn price_balance(&self, balance: &ChainBalance) -> Token {
        let quote = self.price_provider.get_quote(&balance.symbol).await;
        if quote.is_none() {
            debug!("No price for {} on {}, valuing at 0", balance.symbol, balance.chain);
        }
        let (price, change_24h) = quote.map_or((0.0, 0.0), |q| (q.price, q.change_24h));
        let valuation = valuate(balance.raw_balance, balance.decimals, price);

        let token = Token::new(
            balance.symbol.clone(),
            balance.name.clone(),
            valuation.balance,
            price,
            change_24h,
            balance.contract_address.clone(),
            balance.is_native,
        );
        match balance.contract_age_days {
            Some(days) => token.with_contract_age(days),
            None => token,
        }
    }

    /// Build the merged portfolio for `address`; zero balances are skipped
    pub async fn aggregate(&self, address: &str, balances: &[ChainBalance]) -> Portfolio {
        let mut per_chain: BTreeMap<&str, Vec<Token>> = BTreeMap::new();

        for balance in balances.iter().filter(|b| b.raw_balance > 0) {
            let token = self.price_balance(balance).await;
            per_chain.entry(balance.chain.as_str()).or_default().push(token);
        }

        let chain_count = per_chain.len();
        let portfolio = Portfolio::merge_chains(address, per_chain.into_values().collect());

        info!(
            "Aggregated {} tokens across {} chain(s) for {}: ${:.2}",
            portfolio.token_count(),
            chain_count,
            address,
            portfolio.total_value
        );

        portfolio
    }
}
