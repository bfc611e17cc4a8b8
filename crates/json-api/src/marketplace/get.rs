//! Get Marketplace Listing Handler

use std::sync::Arc;

use mandi::listings::coordinates_from_parts;
use salvo::{
    oapi::extract::{PathParam, QueryParam},
    prelude::*,
};
use uuid::Uuid;

use crate::{
    extensions::*,
    listings::{
        errors::{into_status_error, validation_error},
        responses::ListingResponse,
    },
    state::State,
};

/// Get Marketplace Listing Handler
///
/// `lat` and `lon` together attach the distance from that point.
#[endpoint(
    tags("marketplace"),
    summary = "Get Listing",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Listing found"),
        (status_code = StatusCode::NOT_FOUND, description = "Listing not found or not visible"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Invalid token"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    listing: PathParam<Uuid>,
    lat: QueryParam<f64, false>,
    lon: QueryParam<f64, false>,
    depot: &mut Depot,
) -> Result<Json<ListingResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let viewer = depot.viewer();

    let origin = coordinates_from_parts(lat.into_inner(), lon.into_inner())
        .map_err(|error| validation_error(&error))?;

    let ranked = state
        .app
        .listings
        .get_available_listing(viewer, listing.into_inner().into(), origin)
        .await
        .map_err(into_status_error)?;

    Ok(Json(ranked.into()))
}
