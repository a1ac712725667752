//! Price providers

pub mod price_provider;

// Re-export for convenience
pub use price_provider::StaticPriceProvider;
