//! Listing Market Price Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    extensions::*,
    listings::responses::MarketPriceResponse,
    market_prices::errors::into_status_error,
    observability::{QuoteOutcome, observe_quote},
    state::State,
};

/// Listing Market Price Handler
///
/// Live mandi price for a market linked listing, or the last stored snapshot when the price
/// service is unavailable.
#[endpoint(
    tags("marketplace"),
    summary = "Get Listing Market Price",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Current market price"),
        (status_code = StatusCode::NOT_FOUND, description = "Listing not found, not market linked, or no price known"),
        (status_code = StatusCode::SERVICE_UNAVAILABLE, description = "Price service unavailable and nothing cached"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Invalid token"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    listing: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<MarketPriceResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let viewer = depot.viewer();

    let result = state
        .app
        .market_prices
        .listing_market_price(viewer, listing.into_inner().into())
        .await;

    if let Some(outcome) = QuoteOutcome::of(&result) {
        observe_quote(outcome);
    }

    Ok(Json(result.map_err(into_status_error)?.into()))
}
