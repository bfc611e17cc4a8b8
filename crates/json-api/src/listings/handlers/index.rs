//! List Seller Listings Handler

use std::sync::Arc;

use mandi::projection::ListingView;
use salvo::prelude::*;

use crate::{
    extensions::*,
    listings::{errors::into_status_error, responses::ListingsResponse},
    state::State,
};

/// List Seller Listings Handler
#[endpoint(
    tags("listings"),
    summary = "List Own Listings",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Listings, newest first"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Missing or invalid token"),
        (status_code = StatusCode::FORBIDDEN, description = "Caller cannot sell"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<ListingsResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;

    let listings = state
        .app
        .listings
        .list_seller_listings(actor)
        .await
        .map_err(into_status_error)?
        .into_iter()
        .map(ListingView::from)
        .collect();

    Ok(Json(ListingsResponse { listings }))
}
