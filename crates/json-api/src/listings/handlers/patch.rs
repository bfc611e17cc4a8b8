//! Patch Listing Handler

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
        requests::PatchListingRequest,
        responses::ListingResponse,
    },
    state::State,
};

/// Patch Listing Handler
#[endpoint(
    tags("listings"),
    summary = "Update Listing Fields",
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
    name = "listings.patch",
    skip(listing, json, depot),
    fields(
        seller_uuid = tracing::field::Empty,
        listing_uuid = tracing::field::Empty
    ),
    err
)]
pub(crate) async fn handler(
    listing: PathParam<Uuid>,
    json: JsonBody<PatchListingRequest>,
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

    tracing::info!(listing_uuid = %listing.uuid, "updated listing");

    Ok(Json(listing.into()))
}

#[cfg(test)]
mod tests {
    use mandi::{
        errors::ValidationError,
        listings::{Listing, ListingUuid},
    };
    use mandi_app::domain::listings::{
        ListingsServiceError, MockListingsService, data::ListingUpdate,
    };
    use rust_decimal::Decimal;
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::{Value, json};
    use testresult::TestResult;

    use crate::test_helpers::{listings_service, make_listing};

    use super::*;

    fn make_service(listings: MockListingsService) -> Service {
        listings_service(listings, Router::with_path("listings/{listing}").patch(handler))
    }

    #[tokio::test]
    async fn test_patch_only_sends_present_fields() -> TestResult {
        let uuid = ListingUuid::new();

        let mut listings = MockListingsService::new();

        listings
            .expect_update_listing()
            .once()
            .withf(move |_, listing, update| {
                *listing == uuid
                    && *update
                        == ListingUpdate {
                            price_per_unit: Some(Decimal::new(1_925, 0)),
                            ..ListingUpdate::default()
                        }
            })
            .return_once(move |_, _, _| {
                Ok(Listing {
                    price_per_unit: Decimal::new(1_925, 0),
                    ..make_listing(uuid)
                })
            });

        let mut res = TestClient::patch(format!("http://example.com/listings/{uuid}"))
            .json(&json!({ "pricePerUnit": "1925" }))
            .send(&make_service(listings))
            .await;

        let body: Value = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body["listing"]["pricePerUnit"], "1925");

        Ok(())
    }

    #[tokio::test]
    async fn test_patch_with_one_coordinate_returns_400() -> TestResult {
        let mut listings = MockListingsService::new();

        listings.expect_update_listing().never();

        let res = TestClient::patch(format!("http://example.com/listings/{}", ListingUuid::new()))
            .json(&json!({ "latitude": 19.99 }))
            .send(&make_service(listings))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_patch_breaking_an_invariant_returns_400() -> TestResult {
        let mut listings = MockListingsService::new();

        listings
            .expect_update_listing()
            .once()
            .return_once(|_, _, _| {
                Err(ListingsServiceError::Validation(ValidationError::NegativeQuantity))
            });

        let mut res =
            TestClient::patch(format!("http://example.com/listings/{}", ListingUuid::new()))
                .json(&json!({ "availableQuantity": -1 }))
                .send(&make_service(listings))
                .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
        assert!(res.take_string().await?.contains("available_quantity"));

        Ok(())
    }
}
