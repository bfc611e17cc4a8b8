//! Search Marketplace Handler

use std::sync::Arc;

use mandi::{
    filter::FilterParams,
    search::{SearchParams, SearchQuery},
};
use salvo::{oapi::ToParameters, prelude::*};
use serde::Deserialize;

use crate::{
    extensions::*,
    listings::{
        errors::{into_status_error, validation_error},
        responses::SearchResponse,
    },
    observability::observe_search,
    state::State,
};

/// Marketplace search query string.
///
/// Numeric bounds that do not parse are ignored; unknown enumerated values are rejected.
#[derive(Debug, Default, Deserialize, ToParameters)]
#[salvo(parameters(default_parameter_in = Query))]
pub(crate) struct MarketplaceQuery {
    /// Free text matched against title, description, crop and variety
    search: Option<String>,

    category: Option<String>,

    crop: Option<String>,

    /// fixed, negotiable or market_linked
    price_type: Option<String>,

    /// kg, quintal, tonne, piece or box
    unit: Option<String>,

    min_price: Option<String>,

    max_price: Option<String>,

    min_quantity: Option<String>,

    /// mandi_owner, shopkeeper or community
    buyer_category: Option<String>,

    /// distance, price or created_at
    sort: Option<String>,

    /// Origin latitude for distances
    lat: Option<f64>,

    /// Origin longitude for distances
    lon: Option<f64>,

    /// Distance cap in meters, needs an origin
    max_distance: Option<u64>,

    page: Option<u32>,

    size: Option<u32>,
}

impl From<MarketplaceQuery> for SearchParams {
    fn from(query: MarketplaceQuery) -> Self {
        Self {
            filter: FilterParams {
                search: query.search,
                category: query.category,
                crop: query.crop,
                price_type: query.price_type,
                unit: query.unit,
                min_price: query.min_price,
                max_price: query.max_price,
                min_quantity: query.min_quantity,
                buyer_category: query.buyer_category,
            },
            sort: query.sort,
            latitude: query.lat,
            longitude: query.lon,
            max_distance: query.max_distance,
            page: query.page,
            size: query.size,
        }
    }
}

/// Search Marketplace Handler
#[endpoint(
    tags("marketplace"),
    summary = "Search Listings",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "One page of matching listings"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Invalid token"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    query: MarketplaceQuery,
    depot: &mut Depot,
) -> Result<Json<SearchResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let viewer = depot.viewer();

    let query = SearchQuery::parse(&SearchParams::from(query))
        .map_err(|error| validation_error(&error))?;

    let results = state
        .app
        .listings
        .search_listings(viewer, query)
        .await
        .map_err(into_status_error)?;

    observe_search(viewer);

    Ok(Json(results.into()))
}

#[cfg(test)]
mod tests {
    use mandi::{
        buyers::Viewer,
        filter::ListingFilter,
        listings::{ListingUuid, QuantityUnit},
        projection::ListingView,
        ranking::{Page, SortKey},
        search::SearchResults,
    };
    use mandi_app::domain::listings::MockListingsService;
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::Value;
    use testresult::TestResult;

    use crate::test_helpers::{make_listing, marketplace_service};

    use super::*;

    fn make_service(listings: MockListingsService) -> Service {
        marketplace_service(listings, Router::with_path("marketplace/listings").get(handler))
    }

    #[tokio::test]
    async fn test_search_parses_query_and_shapes_response() -> TestResult {
        let uuid = ListingUuid::new();

        let mut listings = MockListingsService::new();

        listings
            .expect_search_listings()
            .once()
            .withf(|viewer, query| {
                *viewer == Viewer::Anonymous
                    && query.filter.crop.as_deref() == Some("onion")
                    && query.filter.min_price.is_none()
                    && query.rank.sort == Some(SortKey::Price)
                    && query.page.page == 2
                    && query.page.size == 5
            })
            .return_once(move |_, query| {
                Ok(SearchResults {
                    page: Page {
                        items: vec![ListingView::from(make_listing(uuid))],
                        page: query.page.page,
                        size: query.page.size,
                        total: 6,
                    },
                    available_units: vec![QuantityUnit::Quintal],
                    filters_applied: query.filter,
                })
            });

        let mut res = TestClient::get(
            "http://example.com/marketplace/listings?crop=onion&min_price=cheap&sort=price&page=2&size=5",
        )
        .send(&make_service(listings))
        .await;

        let body: Value = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body["results"][0]["id"], uuid.to_string());
        assert_eq!(body["page"], 2);
        assert_eq!(body["size"], 5);
        assert_eq!(body["totalCount"], 6);
        assert_eq!(body["availableUnits"][0], "quintal");
        assert_eq!(body["filtersApplied"]["crop"], "onion");

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_buyer_category_returns_400() -> TestResult {
        let mut listings = MockListingsService::new();

        listings.expect_search_listings().never();

        let mut res =
            TestClient::get("http://example.com/marketplace/listings?buyer_category=wholesaler")
                .send(&make_service(listings))
                .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
        assert!(res.take_string().await?.contains("buyer_category"));

        Ok(())
    }

    #[tokio::test]
    async fn test_max_distance_without_origin_returns_400() -> TestResult {
        let mut listings = MockListingsService::new();

        listings.expect_search_listings().never();

        let res = TestClient::get("http://example.com/marketplace/listings?max_distance=5000")
            .send(&make_service(listings))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_empty_query_uses_defaults() -> TestResult {
        let mut listings = MockListingsService::new();

        listings
            .expect_search_listings()
            .once()
            .withf(|_, query| *query == SearchQuery::default())
            .return_once(|_, query| {
                Ok(SearchResults {
                    page: Page {
                        items: Vec::new(),
                        page: query.page.page,
                        size: query.page.size,
                        total: 0,
                    },
                    available_units: Vec::new(),
                    filters_applied: ListingFilter::default(),
                })
            });

        let mut res = TestClient::get("http://example.com/marketplace/listings")
            .send(&make_service(listings))
            .await;

        let body: Value = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body["page"], 1);
        assert_eq!(body["size"], 20);
        assert_eq!(body["filtersApplied"], serde_json::json!({}));

        Ok(())
    }
}
