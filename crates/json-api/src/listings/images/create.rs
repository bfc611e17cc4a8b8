//! Add Listing Images Handler

use std::sync::Arc;

use salvo::{
    oapi::extract::{JsonBody, PathParam},
    prelude::*,
};
use uuid::Uuid;

use crate::{
    extensions::*,
    listings::{
        errors::{into_status_error, validation_error},
        requests::AddImagesRequest,
        responses::ListingResponse,
    },
    state::State,
};

/// Add Listing Images Handler
#[endpoint(
    tags("listings"),
    summary = "Add Listing Images",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Images appended"),
        (status_code = StatusCode::NOT_FOUND, description = "Listing not found"),
        (status_code = StatusCode::CONFLICT, description = "Image already exists"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Missing or invalid token"),
        (status_code = StatusCode::FORBIDDEN, description = "Not allowed to manage this listing"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "listings.images.create",
    skip(listing, json, depot, res),
    fields(
        listing_uuid = tracing::field::Empty,
        images_count = tracing::field::Empty
    ),
    err
)]
pub(crate) async fn handler(
    listing: PathParam<Uuid>,
    json: JsonBody<AddImagesRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<ListingResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;
    let listing = listing.into_inner();

    let images = json
        .into_inner()
        .into_new_images()
        .map_err(|error| validation_error(&error))?;

    let span = tracing::Span::current();

    span.record("listing_uuid", tracing::field::display(listing));
    span.record("images_count", tracing::field::display(images.len()));

    let listing = state
        .app
        .listings
        .add_images(actor, listing.into(), images)
        .await
        .map_err(into_status_error)?;

    res.status_code(StatusCode::CREATED);

    Ok(Json(listing.into()))
}

#[cfg(test)]
mod tests {
    use mandi::listings::{Listing, ListingImage, ListingImageUuid, ListingUuid};
    use mandi_app::domain::listings::{ListingsServiceError, MockListingsService};
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::{Value, json};
    use testresult::TestResult;

    use crate::test_helpers::{TEST_SELLER, listings_service, make_listing};

    use super::*;

    fn make_service(listings: MockListingsService) -> Service {
        listings_service(
            listings,
            Router::with_path("listings/{listing}/images").post(handler),
        )
    }

    #[tokio::test]
    async fn test_add_images_success() -> TestResult {
        let uuid = ListingUuid::new();
        let image = ListingImageUuid::new();

        let mut listings = MockListingsService::new();

        listings
            .expect_add_images()
            .once()
            .withf(move |actor, listing, images| {
                *actor == TEST_SELLER
                    && *listing == uuid
                    && images.len() == 1
                    && images[0].uuid == image
                    && images[0].caption.as_deref() == Some("Sorted and bagged")
            })
            .return_once(move |_, _, _| {
                Ok(Listing {
                    images: vec![ListingImage {
                        uuid: image,
                        reference: "s3://produce/onions.jpg".to_string(),
                        caption: Some("Sorted and bagged".to_string()),
                    }],
                    ..make_listing(uuid)
                })
            });

        let mut res = TestClient::post(format!("http://example.com/listings/{uuid}/images"))
            .json(&json!({
                "images": [{
                    "uuid": image.into_uuid(),
                    "reference": "s3://produce/onions.jpg",
                    "caption": "Sorted and bagged"
                }]
            }))
            .send(&make_service(listings))
            .await;

        let body: Value = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::CREATED));
        assert_eq!(body["listing"]["images"][0]["id"], image.to_string());

        Ok(())
    }

    #[tokio::test]
    async fn test_blank_reference_returns_400() -> TestResult {
        let mut listings = MockListingsService::new();

        listings.expect_add_images().never();

        let res = TestClient::post(format!(
            "http://example.com/listings/{}/images",
            ListingUuid::new()
        ))
        .json(&json!({ "images": [{ "reference": "" }] }))
        .send(&make_service(listings))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_empty_image_list_returns_400() -> TestResult {
        let mut listings = MockListingsService::new();

        listings.expect_add_images().never();

        let mut res = TestClient::post(format!(
            "http://example.com/listings/{}/images",
            ListingUuid::new()
        ))
        .json(&json!({ "images": [] }))
        .send(&make_service(listings))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
        assert!(
            res.take_string().await?.contains("images: must not be blank"),
            "brief names the field"
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_add_images_to_missing_listing_returns_404() -> TestResult {
        let mut listings = MockListingsService::new();

        listings
            .expect_add_images()
            .once()
            .return_once(|_, _, _| Err(ListingsServiceError::NotFound));

        let res = TestClient::post(format!(
            "http://example.com/listings/{}/images",
            ListingUuid::new()
        ))
        .json(&json!({ "images": [{ "reference": "s3://produce/onions.jpg" }] }))
        .send(&make_service(listings))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }
}
