//! Delete Listing Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{extensions::*, listings::errors::into_status_error, state::State};

/// Delete Listing Handler
///
/// Soft delete: the listing disappears from every read but its row is kept.
#[endpoint(
    tags("listings"),
    summary = "Delete Listing",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::NO_CONTENT, description = "Listing deleted"),
        (status_code = StatusCode::NOT_FOUND, description = "Listing not found"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Missing or invalid token"),
        (status_code = StatusCode::FORBIDDEN, description = "Not allowed to manage this listing"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "listings.delete",
    skip(listing, depot),
    fields(
        seller_uuid = tracing::field::Empty,
        listing_uuid = tracing::field::Empty
    ),
    err
)]
pub(crate) async fn handler(
    listing: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<StatusCode, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;
    let listing = listing.into_inner();

    let span = tracing::Span::current();

    span.record("seller_uuid", tracing::field::display(actor.user));
    span.record("listing_uuid", tracing::field::display(listing));

    state
        .app
        .listings
        .delete_listing(actor, listing.into())
        .await
        .map_err(into_status_error)?;

    tracing::info!(listing_uuid = %listing, "deleted listing");

    Ok(StatusCode::NO_CONTENT)
}
