//! Marketplace Domain Concerns

pub mod listings;
pub mod market_prices;
