//! HTTP span names.
//!
//! Request paths become route templates so that spans and metric labels stay low
//! cardinality: the id after `listings` becomes `{listing}` and the id after `images`
//! becomes `{image}`, matching the router's parameter names.

use uuid::Uuid;

#[derive(Debug, Clone)]
pub(super) struct RequestSpanName {
    pub(super) route: String,
    pub(super) otel_span_name: String,
}

pub(super) fn request_span_name(method: &str, path: &str) -> RequestSpanName {
    let route = route_template(path);
    let otel_span_name = format!("{method} {route}");

    RequestSpanName {
        route,
        otel_span_name,
    }
}

fn route_template(path: &str) -> String {
    let mut previous = "";

    let segments: Vec<&str> = path
        .trim_start_matches('/')
        .split('/')
        .map(|segment| {
            let template = if Uuid::parse_str(segment).is_ok() {
                parameter_for(previous)
            } else {
                segment
            };

            previous = segment;

            template
        })
        .collect();

    format!("/{}", segments.join("/"))
}

fn parameter_for(collection: &str) -> &'static str {
    match collection {
        "listings" => "{listing}",
        "images" => "{image}",
        _ => "{uuid}",
    }
}
