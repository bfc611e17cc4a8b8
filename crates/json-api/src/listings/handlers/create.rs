//! Create Listing Handler

use std::sync::Arc;

use mandi_app::domain::listings::data::NewListing;
use salvo::{http::header::LOCATION, oapi::extract::JsonBody, prelude::*};

use crate::{
    extensions::*,
    listings::{
        errors::{into_status_error, validation_error},
        requests::CreateListingRequest,
        responses::ListingResponse,
    },
    state::State,
};

/// Create Listing Handler
#[endpoint(
    tags("listings"),
    summary = "Create Listing",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Listing created"),
        (status_code = StatusCode::CONFLICT, description = "Listing already exists"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Missing or invalid token"),
        (status_code = StatusCode::FORBIDDEN, description = "Caller cannot sell"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "listings.create",
    skip(json, depot, res),
    fields(
        seller_uuid = tracing::field::Empty,
        listing_uuid = tracing::field::Empty,
        images_count = tracing::field::Empty
    ),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<CreateListingRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<ListingResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;

    let new = NewListing::try_from(json.into_inner()).map_err(|error| validation_error(&error))?;

    let span = tracing::Span::current();

    span.record("seller_uuid", tracing::field::display(actor.user));
    span.record("listing_uuid", tracing::field::display(new.uuid));
    span.record("images_count", tracing::field::display(new.images.len()));

    let listing = state
        .app
        .listings
        .create_listing(actor, new)
        .await
        .map_err(into_status_error)?;

    res.add_header(LOCATION, format!("/listings/{}", listing.uuid), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    tracing::info!(listing_uuid = %listing.uuid, "created listing");

    Ok(Json(listing.into()))
}

#[cfg(test)]
mod tests {
    use mandi::{
        errors::ValidationError,
        listings::{ListingUuid, PriceType, QuantityUnit},
    };
    use mandi_app::domain::listings::{ListingsServiceError, MockListingsService};
    use rust_decimal::Decimal;
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::{Value, json};
    use testresult::TestResult;

    use crate::test_helpers::{TEST_SELLER, listings_service, make_listing};

    use super::*;

    fn make_service(listings: MockListingsService) -> Service {
        listings_service(listings, Router::with_path("listings").post(handler))
    }

    #[tokio::test]
    async fn test_create_listing_success() -> TestResult {
        let uuid = ListingUuid::new();

        let mut listings = MockListingsService::new();

        listings
            .expect_create_listing()
            .once()
            .withf(move |actor, new| {
                *actor == TEST_SELLER
                    && new.uuid == uuid
                    && new.quantity_unit == QuantityUnit::Quintal
                    && new.price_type == PriceType::Fixed
                    && new.price_per_unit == Decimal::new(1_850, 0)
                    && new.images.len() == 1
            })
            .return_once(move |_, _| Ok(make_listing(uuid)));

        let mut res = TestClient::post("http://example.com/listings")
            .json(&json!({
                "uuid": uuid.into_uuid(),
                "title": "Red onions",
                "category": "vegetables",
                "crop": "onion",
                "availableQuantity": "40",
                "quantityUnit": "quintal",
                "pricePerUnit": "1850",
                "images": [{ "reference": "s3://produce/onions.jpg" }]
            }))
            .send(&make_service(listings))
            .await;

        let body: Value = res.take_json().await?;
        let location = res.headers().get("location").and_then(|v| v.to_str().ok());

        assert_eq!(res.status_code, Some(StatusCode::CREATED));
        assert_eq!(location, Some(format!("/listings/{uuid}").as_str()));
        assert_eq!(body["listing"]["id"], uuid.to_string());

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_unit_returns_400_without_calling_service() -> TestResult {
        let listings = MockListingsService::new();

        let res = TestClient::post("http://example.com/listings")
            .json(&json!({
                "title": "Red onions",
                "category": "vegetables",
                "crop": "onion",
                "availableQuantity": 40,
                "quantityUnit": "bushel",
                "pricePerUnit": 1850
            }))
            .send(&make_service(listings))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_service_validation_error_returns_400() -> TestResult {
        let mut listings = MockListingsService::new();

        listings
            .expect_create_listing()
            .once()
            .return_once(|_, _| {
                Err(ListingsServiceError::Validation(
                    ValidationError::MissingMarketPriceSource,
                ))
            });

        let res = TestClient::post("http://example.com/listings")
            .json(&json!({
                "title": "Red onions",
                "category": "vegetables",
                "crop": "onion",
                "availableQuantity": 40,
                "pricePerUnit": 1850,
                "priceType": "market_linked"
            }))
            .send(&make_service(listings))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_listing_returns_409() -> TestResult {
        let mut listings = MockListingsService::new();

        listings
            .expect_create_listing()
            .once()
            .return_once(|_, _| Err(ListingsServiceError::AlreadyExists));

        let res = TestClient::post("http://example.com/listings")
            .json(&json!({
                "uuid": ListingUuid::new().into_uuid(),
                "title": "Red onions",
                "category": "vegetables",
                "crop": "onion",
                "availableQuantity": 40,
                "pricePerUnit": 1850
            }))
            .send(&make_service(listings))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));

        Ok(())
    }
}
