//! Listing Responses

use mandi::{
    filter::ListingFilter,
    listings::{Listing, QuantityUnit},
    projection::{ListingView, MarketPriceView},
    ranking::Ranked,
    search::{BuyerBreakdown, SearchResults},
};
use mandi_app::domain::market_prices::models::{Freshness, PriceQuote};
use salvo::oapi::ToSchema;
use serde::Serialize;

/// Listing Response
#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ListingResponse {
    #[salvo(schema(value_type = Object))]
    pub listing: ListingView,
}

impl From<Listing> for ListingResponse {
    fn from(listing: Listing) -> Self {
        Self {
            listing: listing.into(),
        }
    }
}

impl From<Ranked> for ListingResponse {
    fn from(ranked: Ranked) -> Self {
        Self {
            listing: ranked.into(),
        }
    }
}

/// Listings Response
#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ListingsResponse {
    #[salvo(schema(value_type = Vec<Object>))]
    pub listings: Vec<ListingView>,
}

/// Buyer Breakdown Response
#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct BuyerBreakdownResponse {
    /// Published listings grouped by the buyer categories that can see them
    #[salvo(schema(value_type = Object))]
    pub breakdown: BuyerBreakdown,
}

/// Marketplace Search Response
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchResponse {
    #[salvo(schema(value_type = Vec<Object>))]
    pub results: Vec<ListingView>,

    pub page: u32,

    pub size: u32,

    /// Matches across every page
    pub total_count: usize,

    /// Distinct units across every page
    #[salvo(schema(value_type = Vec<String>))]
    pub available_units: Vec<QuantityUnit>,

    #[salvo(schema(value_type = Object))]
    pub filters_applied: ListingFilter,
}

impl From<SearchResults> for SearchResponse {
    fn from(results: SearchResults) -> Self {
        Self {
            results: results.page.items,
            page: results.page.page,
            size: results.page.size,
            total_count: results.page.total,
            available_units: results.available_units,
            filters_applied: results.filters_applied,
        }
    }
}

/// Market Price Response
#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct MarketPriceResponse {
    /// live when fetched just now, cached when served from the stored snapshot
    #[salvo(schema(value_type = String))]
    pub freshness: Freshness,

    #[salvo(schema(value_type = Object))]
    pub price: MarketPriceView,
}

impl From<PriceQuote> for MarketPriceResponse {
    fn from(quote: PriceQuote) -> Self {
        Self {
            freshness: quote.freshness,
            price: quote.snapshot.into(),
        }
    }
}

/// Market Prices Response
#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct MarketPricesResponse {
    #[salvo(schema(value_type = Vec<Object>))]
    pub records: Vec<MarketPriceView>,
}
