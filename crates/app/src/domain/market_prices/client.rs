//! Mandi price API client.

use std::{fmt, str::FromStr, time::Duration};

use async_trait::async_trait;
use jiff::{Timestamp, civil::Date};
use mandi::listings::MarketPriceSnapshot;
use mockall::automock;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use crate::domain::market_prices::{errors::MandiClientError, models::MarketPriceQuery};

/// Configuration for the mandi price API.
#[derive(Clone)]
pub struct MandiApiConfig {
    /// API base URL, e.g. `"https://api.data.gov.in"`.
    pub base_url: String,

    /// API key sent with every request.
    pub api_key: String,

    /// Dataset holding daily mandi prices.
    pub resource_id: String,

    /// Request timeout.
    pub timeout: Duration,
}

impl fmt::Debug for MandiApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MandiApiConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("resource_id", &self.resource_id)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[automock]
#[async_trait]
pub trait MandiPriceSource: Send + Sync {
    /// Fetch the price records matching `query`.
    async fn fetch_prices(
        &self,
        query: &MarketPriceQuery,
    ) -> Result<Vec<MarketPriceSnapshot>, MandiClientError>;
}

/// HTTP client for the mandi price dataset.
#[derive(Debug, Clone)]
pub struct MandiPriceClient {
    config: MandiApiConfig,
    http: Client,
}

impl MandiPriceClient {
    /// Create a new client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be built.
    pub fn new(config: MandiApiConfig) -> Result<Self, MandiClientError> {
        let http = Client::builder().timeout(config.timeout).build()?;

        Ok(Self { config, http })
    }

    fn url(&self) -> String {
        format!(
            "{}/resource/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.resource_id
        )
    }
}

#[async_trait]
impl MandiPriceSource for MandiPriceClient {
    async fn fetch_prices(
        &self,
        query: &MarketPriceQuery,
    ) -> Result<Vec<MarketPriceSnapshot>, MandiClientError> {
        let response = self
            .http
            .get(self.url())
            .query(&query_pairs(&self.config.api_key, query))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();

            return Err(MandiClientError::UnexpectedResponse(format!(
                "price request failed with status {status}: {text}"
            )));
        }

        let parsed: RecordsResponse = response.json().await?;
        let fetched_at = Timestamp::now();

        Ok(parsed
            .records
            .into_iter()
            .filter_map(|record| record.into_snapshot(fetched_at))
            .collect())
    }
}

fn query_pairs(api_key: &str, query: &MarketPriceQuery) -> Vec<(&'static str, String)> {
    let mut pairs = vec![
        ("api-key", api_key.to_string()),
        ("format", "json".to_string()),
        ("limit", query.limit.to_string()),
        ("filters[commodity]", query.commodity.clone()),
    ];

    let optional = [
        ("filters[state]", &query.state),
        ("filters[district]", &query.district),
        ("filters[market]", &query.market),
    ];

    for (key, value) in optional {
        if let Some(value) = value {
            pairs.push((key, value.clone()));
        }
    }

    pairs
}

/// The record with the most recent arrival date, falling back to the first one when no
/// date parses.
#[must_use]
pub fn latest(records: Vec<MarketPriceSnapshot>) -> Option<MarketPriceSnapshot> {
    let mut records = records.into_iter();
    let first = records.next()?;
    let first_date = arrival_date(&first);

    let (latest, _) = records.fold((first, first_date), |(best, best_date), record| {
        let date = arrival_date(&record);

        if date > best_date {
            (record, date)
        } else {
            (best, best_date)
        }
    });

    Some(latest)
}

fn arrival_date(snapshot: &MarketPriceSnapshot) -> Option<Date> {
    Date::strptime("%d/%m/%Y", &snapshot.arrival_date).ok()
}

#[derive(Debug, Deserialize)]
struct RecordsResponse {
    #[serde(default)]
    records: Vec<PriceRecord>,
}

#[derive(Debug, Deserialize)]
struct PriceRecord {
    state: String,
    district: String,
    market: String,
    commodity: String,
    #[serde(default)]
    variety: Option<String>,
    #[serde(default)]
    grade: Option<String>,
    #[serde(default)]
    arrival_date: String,
    #[serde(default)]
    min_price: Value,
    #[serde(default)]
    max_price: Value,
    #[serde(default)]
    modal_price: Value,
}

impl PriceRecord {
    fn into_snapshot(self, fetched_at: Timestamp) -> Option<MarketPriceSnapshot> {
        let (Some(min_price), Some(max_price), Some(modal_price)) = (
            price(&self.min_price),
            price(&self.max_price),
            price(&self.modal_price),
        ) else {
            tracing::debug!(
                market = %self.market,
                commodity = %self.commodity,
                "skipping price record with unparseable prices"
            );

            return None;
        };

        Some(MarketPriceSnapshot {
            commodity: self.commodity,
            state: self.state,
            district: self.district,
            market: self.market,
            variety: self.variety.filter(|variety| !variety.is_empty()),
            grade: self.grade.filter(|grade| !grade.is_empty()),
            arrival_date: self.arrival_date,
            min_price,
            max_price,
            modal_price,
            fetched_at,
        })
    }
}

fn price(value: &Value) -> Option<Decimal> {
    match value {
        Value::String(text) => Decimal::from_str(text.trim()).ok(),
        Value::Number(number) => Decimal::from_str(&number.to_string()).ok(),
        _ => None,
    }
}
