//! Listings By Buyer Category Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    extensions::*,
    listings::{errors::into_status_error, responses::BuyerBreakdownResponse},
    state::State,
};

/// Listings By Buyer Category Handler
#[endpoint(
    tags("listings"),
    summary = "Group Own Listings By Buyer Category",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Published listings per buyer category"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Missing or invalid token"),
        (status_code = StatusCode::FORBIDDEN, description = "Caller cannot sell"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    depot: &mut Depot,
) -> Result<Json<BuyerBreakdownResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;

    let breakdown = state
        .app
        .listings
        .listings_by_buyer_category(actor)
        .await
        .map_err(into_status_error)?;

    Ok(Json(BuyerBreakdownResponse { breakdown }))
}
