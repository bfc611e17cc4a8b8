//! App Router

use salvo::Router;

use crate::{
    auth, healthcheck,
    listings::{self, images},
    market_prices, marketplace,
    observability::metrics_handler,
};

/// Every API route. State must be injected by the caller.
pub(crate) fn app_router() -> Router {
    Router::new()
        .push(Router::with_path("healthcheck").get(healthcheck::handler))
        .push(Router::with_path("metrics").get(metrics_handler))
        .push(
            Router::with_path("listings")
                .hoop(auth::middleware::required)
                .get(listings::index::handler)
                .post(listings::create::handler)
                .push(Router::with_path("by-buyer-category").get(listings::breakdown::handler))
                .push(
                    Router::with_path("{listing}")
                        .get(listings::get::handler)
                        .put(listings::update::handler)
                        .patch(listings::patch::handler)
                        .delete(listings::delete::handler)
                        .push(
                            Router::with_path("images")
                                .post(images::create::handler)
                                .push(Router::with_path("{image}").delete(images::delete::handler)),
                        ),
                ),
        )
        .push(
            Router::new()
                .hoop(auth::middleware::optional)
                .push(
                    Router::with_path("marketplace/listings")
                        .get(marketplace::index::handler)
                        .push(
                            Router::with_path("{listing}")
                                .get(marketplace::get::handler)
                                .push(
                                    Router::with_path("market-price")
                                        .get(marketplace::market_price::handler),
                                ),
                        ),
                )
                .push(Router::with_path("market-prices").get(market_prices::index::handler)),
        )
}
