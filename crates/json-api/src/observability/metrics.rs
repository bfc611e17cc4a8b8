//! Prometheus metrics for HTTP traffic, marketplace searches and mandi price quotes.

use std::sync::OnceLock;

use mandi::buyers::Viewer;
use mandi_app::domain::market_prices::{
    MarketPricesError,
    models::{Freshness, PriceQuote},
};
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
    core::Collector,
};
use salvo::{
    Request, Response, handler,
    http::{
        StatusCode,
        header::{CONTENT_TYPE, HeaderValue},
    },
};
use tracing::error;

const NAMESPACE: &str = "mandi_json";

#[derive(Debug)]
struct Metrics {
    registry: Registry,
    requests_total: IntCounterVec,
    request_duration_seconds: HistogramVec,
    requests_in_flight: IntGauge,
    marketplace_searches_total: IntCounterVec,
    market_price_quotes_total: IntCounterVec,
}

static METRICS: OnceLock<Option<Metrics>> = OnceLock::new();

/// How a listing market price request was answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum QuoteOutcome {
    /// Fresh from the mandi price API.
    Live,

    /// The stored snapshot, because the API failed or had nothing.
    Cached,

    /// The API had no record and nothing was stored.
    Missing,

    /// The API failed and nothing was stored.
    Unavailable,
}

impl QuoteOutcome {
    /// The outcome of a lookup, or `None` when no lookup was attempted.
    pub(crate) fn of(result: &Result<PriceQuote, MarketPricesError>) -> Option<Self> {
        match result {
            Ok(quote) => Some(match quote.freshness {
                Freshness::Live => Self::Live,
                Freshness::Cached => Self::Cached,
            }),
            Err(MarketPricesError::NoQuote) => Some(Self::Missing),
            Err(MarketPricesError::UpstreamUnavailable(_)) => Some(Self::Unavailable),
            Err(
                MarketPricesError::ListingNotFound
                | MarketPricesError::NotMarketLinked
                | MarketPricesError::Listings(_),
            ) => None,
        }
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Cached => "cached",
            Self::Missing => "missing",
            Self::Unavailable => "unavailable",
        }
    }
}

#[derive(Debug)]
pub(super) struct InFlightRequestGuard {
    tracked: bool,
}

impl InFlightRequestGuard {
    pub(super) fn track() -> Self {
        let tracked = metrics().is_some_and(|metrics| {
            metrics.requests_in_flight.inc();

            true
        });

        Self { tracked }
    }
}

impl Drop for InFlightRequestGuard {
    fn drop(&mut self) {
        if self.tracked
            && let Some(metrics) = metrics()
        {
            metrics.requests_in_flight.dec();
        }
    }
}

/// Build the registry up front so a broken metric definition fails startup.
pub(super) fn install() -> bool {
    metrics().is_some()
}

pub(super) fn observe_request(method: &str, route: &str, status_code: u16, duration_seconds: f64) {
    let Some(metrics) = metrics() else {
        return;
    };

    let status_code = status_code.to_string();

    metrics
        .requests_total
        .with_label_values(&[method, route, status_class(&status_code), status_code.as_str()])
        .inc();

    metrics
        .request_duration_seconds
        .with_label_values(&[method, route])
        .observe(duration_seconds);
}

/// Count a marketplace search by the kind of viewer that ran it.
pub(crate) fn observe_search(viewer: Viewer) {
    if let Some(metrics) = metrics() {
        metrics
            .marketplace_searches_total
            .with_label_values(&[viewer_label(viewer)])
            .inc();
    }
}

/// Count how a listing market price request was answered.
pub(crate) fn observe_quote(outcome: QuoteOutcome) {
    if let Some(metrics) = metrics() {
        metrics
            .market_price_quotes_total
            .with_label_values(&[outcome.as_str()])
            .inc();
    }
}

#[handler]
pub(crate) async fn metrics_handler(_req: &mut Request, res: &mut Response) {
    let Some(metrics) = metrics() else {
        res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
        return;
    };

    let encoder = TextEncoder::new();
    let mut encoded = Vec::new();

    if let Err(source) = encoder.encode(&metrics.registry.gather(), &mut encoded) {
        error!("failed to encode metrics response: {source}");
        res.status_code(StatusCode::INTERNAL_SERVER_ERROR);

        return;
    }

    match HeaderValue::from_str(encoder.format_type()) {
        Ok(content_type) => {
            res.headers_mut().insert(CONTENT_TYPE, content_type);
            res.render(String::from_utf8_lossy(&encoded).into_owned());
        }
        Err(source) => {
            error!("failed to encode metrics content type header: {source}");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
        }
    }
}

fn metrics() -> Option<&'static Metrics> {
    METRICS
        .get_or_init(|| {
            build_metrics()
                .inspect_err(|source| error!("failed to build metrics registry: {source}"))
                .ok()
        })
        .as_ref()
}

fn build_metrics() -> Result<Metrics, prometheus::Error> {
    let registry = Registry::new_custom(Some(NAMESPACE.to_owned()), None)?;

    let requests_total = register(
        &registry,
        IntCounterVec::new(
            Opts::new(
                "http_requests_total",
                "HTTP requests by method, route, status class and status code.",
            ),
            &["method", "route", "status_class", "status_code"],
        )?,
    )?;

    let request_duration_seconds = register(
        &registry,
        HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "HTTP request duration in seconds by method and route.",
            )
            .buckets(vec![
                0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ]),
            &["method", "route"],
        )?,
    )?;

    let requests_in_flight = register(
        &registry,
        IntGauge::with_opts(Opts::new(
            "http_requests_in_flight",
            "HTTP requests currently being served.",
        ))?,
    )?;

    let marketplace_searches_total = register(
        &registry,
        IntCounterVec::new(
            Opts::new(
                "marketplace_searches_total",
                "Marketplace searches by viewer (anonymous, staff or buyer category).",
            ),
            &["viewer"],
        )?,
    )?;

    let market_price_quotes_total = register(
        &registry,
        IntCounterVec::new(
            Opts::new(
                "market_price_quotes_total",
                "Listing market price answers by outcome (live, cached, missing, unavailable).",
            ),
            &["outcome"],
        )?,
    )?;

    Ok(Metrics {
        registry,
        requests_total,
        request_duration_seconds,
        requests_in_flight,
        marketplace_searches_total,
        market_price_quotes_total,
    })
}

fn register<M>(registry: &Registry, metric: M) -> Result<M, prometheus::Error>
where
    M: Collector + Clone + 'static,
{
    registry.register(Box::new(metric.clone()))?;

    Ok(metric)
}

pub(super) fn viewer_label(viewer: Viewer) -> &'static str {
    match viewer {
        Viewer::Staff => "staff",
        Viewer::Anonymous => "anonymous",
        Viewer::Buyer(category) => category.as_str(),
    }
}

fn status_class(status_code: &str) -> &'static str {
    match status_code.as_bytes().first() {
        Some(b'1') => "1xx",
        Some(b'2') => "2xx",
        Some(b'3') => "3xx",
        Some(b'4') => "4xx",
        Some(b'5') => "5xx",
        _ => "other",
    }
}
