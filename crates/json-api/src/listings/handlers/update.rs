//! Replace Listing Handler

use std::sync::Arc;

use mandi_app::domain::listings::data::ListingUpdate;
use salvo::{
    oapi::extract::{JsonBody, PathParam},
    prelude::*,
};
use uuid::Uuid;

use crate::{
    extensions::*,
    listings::{
        errors::{into_status_error, validation_error},
        requests::ReplaceListingRequest,
        responses::ListingResponse,
    },
    state::State,
};

/// Replace Listing Handler
#[endpoint(
    tags("listings"),
    summary = "Replace Listing",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Listing updated"),
        (status_code = StatusCode::NOT_FOUND, description = "Listing not found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Missing or invalid token"),
        (status_code = StatusCode::FORBIDDEN, description = "Not allowed to manage this listing"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "listings.replace",
    skip(listing, json, depot),
    fields(
        seller_uuid = tracing::field::Empty,
        listing_uuid = tracing::field::Empty
    ),
    err
)]
pub(crate) async fn handler(
    listing: PathParam<Uuid>,
    json: JsonBody<ReplaceListingRequest>,
    depot: &mut Depot,
) -> Result<Json<ListingResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;
    let listing = listing.into_inner();

    let span = tracing::Span::current();

    span.record("seller_uuid", tracing::field::display(actor.user));
    span.record("listing_uuid", tracing::field::display(listing));

    let update =
        ListingUpdate::try_from(json.into_inner()).map_err(|error| validation_error(&error))?;

    let listing = state
        .app
        .listings
        .update_listing(actor, listing.into(), update)
        .await
        .map_err(into_status_error)?;

    tracing::info!(listing_uuid = %listing.uuid, "replaced listing");

    Ok(Json(listing.into()))
}

#[cfg(test)]
mod tests {
    use mandi::listings::{ListingStatus, ListingUuid};
    use mandi_app::domain::listings::{ListingsServiceError, MockListingsService};
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::{Value, json};
    use testresult::TestResult;

    use crate::test_helpers::{TEST_SELLER, listings_service, make_listing};

    use super::*;

    fn make_service(listings: MockListingsService) -> Service {
        listings_service(listings, Router::with_path("listings/{listing}").put(handler))
    }

    fn body() -> Value {
        json!({
            "title": "Red onions, grade A",
            "category": "vegetables",
            "crop": "onion",
            "availableQuantity": 35,
            "quantityUnit": "quintal",
            "pricePerUnit": 1900,
            "status": "inactive"
        })
    }

    #[tokio::test]
    async fn test_replace_listing_success() -> TestResult {
        let uuid = ListingUuid::new();

        let mut listings = MockListingsService::new();

        listings
            .expect_update_listing()
            .once()
            .withf(move |actor, listing, update| {
                *actor == TEST_SELLER
                    && *listing == uuid
                    && update.title.as_deref() == Some("Red onions, grade A")
                    && update.status == Some(ListingStatus::Inactive)
                    && update.variety == Some(None)
                    && update.images.is_none()
            })
            .return_once(move |_, _, _| {
                Ok(mandi::listings::Listing {
                    status: ListingStatus::Inactive,
                    ..make_listing(uuid)
                })
            });

        let mut res = TestClient::put(format!("http://example.com/listings/{uuid}"))
            .json(&body())
            .send(&make_service(listings))
            .await;

        let body: Value = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body["listing"]["status"], "inactive");

        Ok(())
    }

    #[tokio::test]
    async fn test_replace_listing_of_another_seller_returns_403() -> TestResult {
        let mut listings = MockListingsService::new();

        listings
            .expect_update_listing()
            .once()
            .return_once(|_, _, _| Err(ListingsServiceError::Forbidden));

        let res = TestClient::put(format!("http://example.com/listings/{}", ListingUuid::new()))
            .json(&body())
            .send(&make_service(listings))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));

        Ok(())
    }

    #[tokio::test]
    async fn test_deleted_status_is_rejected() -> TestResult {
        let mut listings = MockListingsService::new();

        listings.expect_update_listing().never();

        let res = TestClient::put(format!("http://example.com/listings/{}", ListingUuid::new()))
            .json(&json!({
                "title": "Red onions",
                "category": "vegetables",
                "crop": "onion",
                "availableQuantity": 35,
                "pricePerUnit": 1900,
                "status": "archived"
            }))
            .send(&make_service(listings))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
