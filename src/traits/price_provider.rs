use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Spot price and 24h move for one asset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub price: f64,
    /// 24h change in percent
    pub change_24h: f64,
}

/// Trait for price feed providers
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Get the quote for a token symbol in USD
    async fn get_quote(&self, symbol: &str) -> Option<PriceQuote>;

    /// Get quotes for multiple symbols (optimized batch request)
    async fn get_batch_quotes(&self, symbols: &[String]) -> Vec<Option<PriceQuote>> {
        let mut quotes = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            quotes.push(self.get_quote(symbol).await);
        }
        quotes
    }
}
