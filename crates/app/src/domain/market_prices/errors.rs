//! Market price errors.

use thiserror::Error;

use crate::domain::listings::ListingsServiceError;

/// Errors that can occur when talking to the mandi price API.
#[derive(Debug, Error)]
pub enum MandiClientError {
    /// An HTTP transport or deserialization error occurred.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned a non-2xx response.
    #[error("unexpected response from mandi price API: {0}")]
    UnexpectedResponse(String),
}

#[derive(Debug, Error)]
pub enum MarketPricesError {
    #[error("listing not found")]
    ListingNotFound,

    #[error("listing is not market linked")]
    NotMarketLinked,

    #[error("no market price available")]
    NoQuote,

    #[error("market price service unavailable")]
    UpstreamUnavailable(#[source] MandiClientError),

    #[error(transparent)]
    Listings(ListingsServiceError),
}

impl From<ListingsServiceError> for MarketPricesError {
    fn from(error: ListingsServiceError) -> Self {
        match error {
            ListingsServiceError::NotFound => Self::ListingNotFound,
            error => Self::Listings(error),
        }
    }
}
