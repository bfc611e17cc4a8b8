//! Market Prices Handler

use std::sync::Arc;

use mandi::projection::MarketPriceView;
use mandi_app::domain::market_prices::models::MarketPriceQuery;
use salvo::{oapi::extract::QueryParam, prelude::*};

use crate::{
    extensions::*,
    listings::responses::MarketPricesResponse,
    market_prices::errors::into_status_error,
    state::State,
};

/// Market Prices Handler
///
/// Proxies the government mandi price API.
#[endpoint(
    tags("market-prices"),
    summary = "Current Mandi Prices",
    responses(
        (status_code = StatusCode::OK, description = "Matching price records"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::SERVICE_UNAVAILABLE, description = "Price service unavailable"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    commodity: QueryParam<String, true>,
    state: QueryParam<String, false>,
    district: QueryParam<String, false>,
    market: QueryParam<String, false>,
    limit: QueryParam<u32, false>,
    depot: &mut Depot,
) -> Result<Json<MarketPricesResponse>, StatusError> {
    let app_state = depot.obtain_or_500::<Arc<State>>()?;

    let commodity = commodity.into_inner();

    if commodity.trim().is_empty() {
        return Err(StatusError::bad_request().brief("commodity: must not be blank"));
    }

    let mut query = MarketPriceQuery::for_commodity(commodity);

    query.state = state.into_inner();
    query.district = district.into_inner();
    query.market = market.into_inner();

    if let Some(limit) = limit.into_inner() {
        query = query.with_limit(limit);
    }

    let records = app_state
        .app
        .market_prices
        .latest_prices(query)
        .await
        .map_err(into_status_error)?
        .into_iter()
        .map(MarketPriceView::from)
        .collect();

    Ok(Json(MarketPricesResponse { records }))
}
