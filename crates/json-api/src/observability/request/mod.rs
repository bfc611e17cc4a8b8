//! Request span, request IDs, completion logging and HTTP metrics.

mod parent_context;
mod request_ids;
mod spans;

use std::time::{Duration, Instant};

use salvo::{
    Request, handler,
    http::StatusCode,
    prelude::{Depot, FlowCtrl, Response},
};
use tracing::{Instrument as _, Span, error, info, warn};
use tracing_opentelemetry::OpenTelemetrySpanExt as _;

use crate::extensions::*;

use super::{metrics, settings};

const REQUEST_ID_DEPOT_KEY: &str = "request_id";

/// Paths polled by infrastructure. They are served without a span or metrics.
const UNTRACED_PATHS: [&str; 2] = ["/metrics", "/healthcheck"];

#[handler]
pub(crate) async fn request_logging(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    if UNTRACED_PATHS.contains(&req.uri().path()) {
        ctrl.call_next(req, depot, res).await;
        return;
    }

    let started = Instant::now();

    let request_id =
        request_ids::resolve_request_id(req.header::<String>(request_ids::REQUEST_ID_HEADER));

    depot.insert(REQUEST_ID_DEPOT_KEY, request_id.clone());

    request_ids::set_request_id_header(res, &request_id);

    let method = req.method().to_string();
    let path = req.uri().path().to_owned();
    let names = spans::request_span_name(&method, &path);
    let _in_flight_request = metrics::InFlightRequestGuard::track();

    let span = tracing::info_span!(
        parent: None,
        "http.request",
        otel.name = %names.otel_span_name,
        otel.kind = "server",
        request_id = %request_id,
        method = %method,
        route = %names.route,
        path = %path,
        remote_addr = %req.remote_addr(),
        viewer = tracing::field::Empty,
        user_uuid = tracing::field::Empty,
        status = tracing::field::Empty,
        duration_ms = tracing::field::Empty
    );

    if settings::otel_parent_propagation_enabled()
        && let Some(parent_context) = parent_context::extract_parent_context(req.headers())
        && let Err(source) = span.set_parent(parent_context)
    {
        warn!("failed to set parent context on request span: {source}");
    }

    ctrl.call_next(req, depot, res)
        .instrument(span.clone())
        .await;

    let status = request_ids::response_status_or_ok(res.status_code);
    let duration = started.elapsed();

    metrics::observe_request(&method, &names.route, status.as_u16(), duration.as_secs_f64());

    record_caller(&span, depot);

    span.in_scope(|| log_completion(status, duration));
}

/// The auth hoops run inside this one, so the caller is known only once the handler is done.
fn record_caller(span: &Span, depot: &Depot) {
    span.record("viewer", metrics::viewer_label(depot.viewer()));

    if let Ok(actor) = depot.actor_or_401() {
        span.record("user_uuid", tracing::field::display(actor.user));
    }
}

/// Method, path and request id come from the enclosing span.
fn log_completion(status: StatusCode, duration: Duration) {
    let status = status.as_u16();
    let duration_ms = duration.as_millis();
    let threshold_ms = u128::from(settings::slow_request_threshold_ms());

    Span::current().record("status", status);
    Span::current().record("duration_ms", duration_ms);

    info!(status, duration_ms, "request.completed");

    if (500..600).contains(&status) {
        error!(status, "server error response");
    } else if (400..500).contains(&status) {
        warn!(status, "client error response");
    }

    if duration_ms > threshold_ms {
        warn!(duration_ms, threshold_ms, "slow request detected");
    }
}

#[cfg(test)]
mod tests {
    use salvo::{Router, Service, test::TestClient};

    use super::*;

    #[handler]
    async fn listings(res: &mut Response) {
        res.render("[]");
    }

    fn make_service(path: &str) -> Service {
        Service::new(
            Router::new()
                .hoop(request_logging)
                .push(Router::with_path(path).get(listings)),
        )
    }

    #[tokio::test]
    async fn traced_requests_get_a_request_id() {
        let res = TestClient::get("http://example.com/marketplace/listings")
            .send(&make_service("marketplace/listings"))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert!(
            res.headers().contains_key(request_ids::REQUEST_ID_HEADER),
            "request id header is set"
        );
    }

    #[tokio::test]
    async fn incoming_request_ids_are_echoed() {
        let res = TestClient::get("http://example.com/marketplace/listings")
            .add_header(request_ids::REQUEST_ID_HEADER, "mandi-trace-7", true)
            .send(&make_service("marketplace/listings"))
            .await;

        assert_eq!(
            res.headers()
                .get(request_ids::REQUEST_ID_HEADER)
                .and_then(|value| value.to_str().ok()),
            Some("mandi-trace-7")
        );
    }

    #[tokio::test]
    async fn healthchecks_are_not_traced() {
        let res = TestClient::get("http://example.com/healthcheck")
            .send(&make_service("healthcheck"))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert!(
            !res.headers().contains_key(request_ids::REQUEST_ID_HEADER),
            "healthchecks bypass request tracing"
        );
    }
}
