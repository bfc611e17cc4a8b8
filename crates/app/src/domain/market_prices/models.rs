//! Market price models.

use mandi::listings::MarketPriceSnapshot;
use serde::Serialize;

/// Number of records requested from the price API when no limit is given.
pub const DEFAULT_LIMIT: u32 = 10;

/// Upper bound on the number of records requested from the price API.
pub const MAX_LIMIT: u32 = 100;

/// Filters for a mandi price lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketPriceQuery {
    pub commodity: String,
    pub state: Option<String>,
    pub district: Option<String>,
    pub market: Option<String>,
    pub limit: u32,
}

impl MarketPriceQuery {
    /// Lookup for `commodity` with the default limit and no other filters.
    #[must_use]
    pub fn for_commodity(commodity: impl Into<String>) -> Self {
        Self {
            commodity: commodity.into(),
            state: None,
            district: None,
            market: None,
            limit: DEFAULT_LIMIT,
        }
    }

    /// Restrict the lookup to one market.
    #[must_use]
    pub fn in_market(mut self, market: impl Into<String>) -> Self {
        self.market = Some(market.into());
        self
    }

    /// Set the record limit, clamped to `1..=MAX_LIMIT`.
    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit.clamp(1, MAX_LIMIT);
        self
    }
}

/// Where a quote came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Freshness {
    /// Fetched from the price API for this request.
    Live,

    /// The snapshot stored on the listing, served because the API was unavailable.
    Cached,
}

/// A mandi price for one listing.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceQuote {
    pub snapshot: MarketPriceSnapshot,
    pub freshness: Freshness,
}
