//! App Context

use std::sync::Arc;

use thiserror::Error;

use crate::{
    auth::{AuthService, JwtAuthService, JwtConfig},
    database::{self, Db},
    domain::{
        listings::{ListingsService, PgListingsService},
        market_prices::{
            MarketPricesService, MandiClientError, ProxyMarketPricesService,
            client::{MandiApiConfig, MandiPriceClient},
        },
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("failed to build mandi price client")]
    MandiClient(#[source] MandiClientError),
}

#[derive(Clone)]
pub struct AppContext {
    pub listings: Arc<dyn ListingsService>,
    pub market_prices: Arc<dyn MarketPricesService>,
    pub auth: Arc<dyn AuthService>,
}

impl AppContext {
    /// Build application context from a database URL and service configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection or building the price
    /// client fails.
    pub async fn from_config(
        database_url: &str,
        jwt: &JwtConfig,
        mandi: MandiApiConfig,
    ) -> Result<Self, AppInitError> {
        let pool = database::connect(database_url)
            .await
            .map_err(AppInitError::Database)?;

        let listings: Arc<dyn ListingsService> = Arc::new(PgListingsService::new(Db::new(pool)));
        let prices = MandiPriceClient::new(mandi).map_err(AppInitError::MandiClient)?;

        Ok(Self {
            market_prices: Arc::new(ProxyMarketPricesService::new(
                Arc::new(prices),
                Arc::clone(&listings),
            )),
            listings,
            auth: Arc::new(JwtAuthService::new(jwt)),
        })
    }
}
