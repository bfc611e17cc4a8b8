//! Delete Listing Image Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{extensions::*, listings::errors::into_status_error, state::State};

/// Delete Listing Image Handler
#[endpoint(
    tags("listings"),
    summary = "Delete Listing Image",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::NO_CONTENT, description = "Image removed"),
        (status_code = StatusCode::NOT_FOUND, description = "Listing or image not found"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Missing or invalid token"),
        (status_code = StatusCode::FORBIDDEN, description = "Not allowed to manage this listing"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "listings.images.delete",
    skip(listing, image, depot),
    fields(
        listing_uuid = tracing::field::Empty,
        image_uuid = tracing::field::Empty
    ),
    err
)]
pub(crate) async fn handler(
    listing: PathParam<Uuid>,
    image: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<StatusCode, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;
    let listing = listing.into_inner();
    let image = image.into_inner();

    let span = tracing::Span::current();

    span.record("listing_uuid", tracing::field::display(listing));
    span.record("image_uuid", tracing::field::display(image));

    state
        .app
        .listings
        .delete_image(actor, listing.into(), image.into())
        .await
        .map_err(into_status_error)?;

    Ok(StatusCode::NO_CONTENT)
}
