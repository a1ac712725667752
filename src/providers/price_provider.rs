use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use crate::traits::price_provider::{PriceProvider, PriceQuote};

/// Known quotes for demos and tests; stands in for a market-data API
const KNOWN_QUOTES: &[(&str, f64, f64)] = &[
    ("ETH", 3200.0, 2.4),
    ("WETH", 3200.0, 2.4),
    ("BTC", 64000.0, 1.1),
    ("WBTC", 64000.0, 1.1),
    ("USDC", 1.0, 0.01),
    ("USDT", 1.0, -0.02),
    ("DAI", 1.0, 0.0),
    ("MATIC", 0.72, -3.5),
    ("ARB", 1.05, -4.8),
    ("LINK", 14.2, 5.6),
    ("UNI", 7.9, 3.1),
    ("AAVE", 92.0, 6.3),
    ("SHIB", 0.000024, 35.0),
    ("PEPE", 0.0000081, -28.0),
];

/// Price provider backed by a fixed quote table with caching
pub struct StaticPriceProvider {
    quote_cache: Arc<DashMap<String, PriceQuote>>,
}

impl StaticPriceProvider {
    /// Create a new provider seeded with the built-in quotes
    pub fn new() -> Self {
        let provider = Self::empty();
        for (symbol, price, change_24h) in KNOWN_QUOTES {
            provider.quote_cache.insert(
                symbol.to_string(),
                PriceQuote {
                    price: *price,
                    change_24h: *change_24h,
                },
            );
        }
        provider
    }

    /// Create a provider with no quotes
    pub fn empty() -> Self {
        Self {
            quote_cache: Arc::new(DashMap::new()),
        }
    }

    /// Add or replace a quote
    pub fn with_quote(self, symbol: &str, price: f64, change_24h: f64) -> Self {
        self.set_quote(symbol, price, change_24h);
        self
    }

    /// Add or replace a quote in place
    pub fn set_quote(&self, symbol: &str, price: f64, change_24h: f64) {
        self.quote_cache
            .insert(symbol.to_ascii_uppercase(), PriceQuote { price, change_24h });
    }

    /// Number of known symbols
    pub fn len(&self) -> usize {
        self.quote_cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quote_cache.is_empty()
    }
}

impl Default for StaticPriceProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PriceProvider for StaticPriceProvider {
    async fn get_quote(&self, symbol: &str) -> Option<PriceQuote> {
        let key = symbol.to_ascii_uppercase();
        match self.quote_cache.get(&key) {
            Some(quote) => Some(*quote),
            None => {
                debug!("No quote for {}", symbol);
                None
            }
        }
    }
}
