//! Market Prices Config

use std::time::Duration;

use clap::Args;
use mandi_app::domain::market_prices::client::MandiApiConfig;

/// Mandi price API settings.
#[derive(Debug, Args)]
pub struct MarketPricesConfig {
    /// Base URL of the open data API
    #[arg(long, env = "MANDI_API_URL", default_value = "https://api.data.gov.in")]
    pub mandi_api_url: String,

    /// API key for the open data API
    #[arg(long, env = "MANDI_API_KEY", hide_env_values = true)]
    pub mandi_api_key: String,

    /// Resource id of the daily mandi price dataset
    #[arg(long, env = "MANDI_RESOURCE_ID")]
    pub mandi_resource_id: String,

    /// Upstream request timeout in seconds
    #[arg(long, env = "MANDI_API_TIMEOUT_SECONDS", default_value_t = 5_u64)]
    pub mandi_api_timeout_seconds: u64,
}

impl MarketPricesConfig {
    /// Client settings for the app layer.
    #[must_use]
    pub fn mandi_api(&self) -> MandiApiConfig {
        MandiApiConfig {
            base_url: self.mandi_api_url.clone(),
            api_key: self.mandi_api_key.clone(),
            resource_id: self.mandi_resource_id.clone(),
            timeout: Duration::from_secs(self.mandi_api_timeout_seconds),
        }
    }
}
