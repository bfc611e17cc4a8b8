//! Get Seller Listing Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    extensions::*,
    listings::{errors::into_status_error, responses::ListingResponse},
    state::State,
};

/// Get Seller Listing Handler
#[endpoint(
    tags("listings"),
    summary = "Get Own Listing",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Listing found"),
        (status_code = StatusCode::NOT_FOUND, description = "Listing not found"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Missing or invalid token"),
        (status_code = StatusCode::FORBIDDEN, description = "Caller cannot sell"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    listing: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<ListingResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;

    let listing = state
        .app
        .listings
        .get_seller_listing(actor, listing.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(listing.into()))
}
