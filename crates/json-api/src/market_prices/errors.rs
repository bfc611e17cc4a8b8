//! Market Price Errors

use mandi_app::domain::market_prices::MarketPricesError;
use salvo::http::StatusError;
use tracing::warn;

use crate::listings::errors as listings;

pub(crate) fn into_status_error(error: MarketPricesError) -> StatusError {
    match error {
        MarketPricesError::ListingNotFound => StatusError::not_found().brief("Listing not found"),
        MarketPricesError::NotMarketLinked => {
            StatusError::not_found().brief("Listing is not market linked")
        }
        MarketPricesError::NoQuote => StatusError::not_found().brief("No market price available"),
        MarketPricesError::UpstreamUnavailable(source) => {
            warn!("mandi price service unavailable: {source}");

            StatusError::service_unavailable().brief("Market price service unavailable")
        }
        MarketPricesError::Listings(error) => listings::into_status_error(error),
    }
}
