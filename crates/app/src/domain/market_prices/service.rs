//! Market prices service.

use std::sync::Arc;

use async_trait::async_trait;
use mandi::{
    buyers::Viewer,
    listings::{ListingUuid, MarketPriceSnapshot, PriceType},
};
use mockall::automock;

use crate::domain::{
    listings::ListingsService,
    market_prices::{
        client::{MandiPriceSource, latest},
        errors::{MandiClientError, MarketPricesError},
        models::{Freshness, MarketPriceQuery, PriceQuote},
    },
};

#[derive(Clone)]
pub struct ProxyMarketPricesService {
    source: Arc<dyn MandiPriceSource>,
    listings: Arc<dyn ListingsService>,
}

impl ProxyMarketPricesService {
    #[must_use]
    pub fn new(source: Arc<dyn MandiPriceSource>, listings: Arc<dyn ListingsService>) -> Self {
        Self { source, listings }
    }
}

#[async_trait]
impl MarketPricesService for ProxyMarketPricesService {
    async fn latest_prices(
        &self,
        query: MarketPriceQuery,
    ) -> Result<Vec<MarketPriceSnapshot>, MarketPricesError> {
        self.source.fetch_prices(&query).await.map_err(|error| {
            tracing::warn!(
                commodity = %query.commodity,
                error = %error,
                "mandi price lookup failed"
            );

            MarketPricesError::UpstreamUnavailable(error)
        })
    }

    async fn listing_market_price(
        &self,
        viewer: Viewer,
        listing: ListingUuid,
    ) -> Result<PriceQuote, MarketPricesError> {
        let listing = self
            .listings
            .get_available_listing(viewer, listing, None)
            .await?
            .listing;

        let (PriceType::MarketLinked, Some(market)) =
            (listing.price_type, listing.market_price_source.as_deref())
        else {
            return Err(MarketPricesError::NotMarketLinked);
        };

        let query = MarketPriceQuery::for_commodity(listing.crop.as_str()).in_market(market);
        let live = self.source.fetch_prices(&query).await.map(latest);

        let quote = resolve_quote(live, listing.market_price)?;

        if quote.freshness == Freshness::Live {
            if let Err(error) = self
                .listings
                .record_market_price(listing.uuid, quote.snapshot.clone())
                .await
            {
                tracing::warn!(
                    listing = %listing.uuid,
                    error = %error,
                    "failed to store market price snapshot"
                );
            }
        }

        Ok(quote)
    }
}

/// Pick the live price when there is one, otherwise the cached snapshot.
///
/// # Errors
///
/// Returns [`MarketPricesError::UpstreamUnavailable`] when the lookup failed and nothing is
/// cached, or [`MarketPricesError::NoQuote`] when the lookup found nothing and nothing is
/// cached.
pub fn resolve_quote(
    live: Result<Option<MarketPriceSnapshot>, MandiClientError>,
    cached: Option<MarketPriceSnapshot>,
) -> Result<PriceQuote, MarketPricesError> {
    let cached_quote = |snapshot| PriceQuote {
        snapshot,
        freshness: Freshness::Cached,
    };

    match live {
        Ok(Some(snapshot)) => Ok(PriceQuote {
            snapshot,
            freshness: Freshness::Live,
        }),
        Ok(None) => cached.map(cached_quote).ok_or(MarketPricesError::NoQuote),
        Err(error) => match cached {
            Some(snapshot) => {
                tracing::warn!(
                    error = %error,
                    arrival_date = %snapshot.arrival_date,
                    "mandi price lookup failed, serving cached snapshot"
                );

                Ok(cached_quote(snapshot))
            }
            None => {
                tracing::warn!(error = %error, "mandi price lookup failed with no cached snapshot");

                Err(MarketPricesError::UpstreamUnavailable(error))
            }
        },
    }
}

#[automock]
#[async_trait]
pub trait MarketPricesService: Send + Sync {
    /// Current mandi prices matching `query`.
    async fn latest_prices(
        &self,
        query: MarketPriceQuery,
    ) -> Result<Vec<MarketPriceSnapshot>, MarketPricesError>;

    /// The mandi price for a market linked listing on offer to `viewer`.
    async fn listing_market_price(
        &self,
        viewer: Viewer,
        listing: ListingUuid,
    ) -> Result<PriceQuote, MarketPricesError>;
}
