//! Logging subscriber initialisation.

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing_subscriber::{
    EnvFilter, Registry,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::observability::{LogFormat, LoggingConfig};

use super::ObservabilityError;

/// Targets that follow the configured level. Everything else logs warnings only.
const SERVICE_TARGETS: [&str; 3] = ["mandi", "mandi_app", "mandi_json"];

pub(super) fn init_subscriber(
    config: &LoggingConfig,
    tracer: Option<(&SdkTracerProvider, &str)>,
) -> Result<(), ObservabilityError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&config.log_level)));

    match config.log_format {
        LogFormat::Compact => init_with_layer(
            filter,
            tracing_subscriber::fmt::layer()
                .compact()
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
            tracer,
        ),
        LogFormat::Json => init_with_layer(
            filter,
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_target(true),
            tracer,
        ),
    }
}

/// Directives used when `RUST_LOG` holds no valid filter: the service crates log at
/// `level`, salvo at info so startup and bind messages show, the rest at warn.
fn default_directives(level: &str) -> String {
    let services = SERVICE_TARGETS
        .map(|target| format!("{target}={level}"))
        .join(",");

    format!("warn,salvo_core=info,{services}")
}

fn init_with_layer<L>(
    filter: EnvFilter,
    fmt_layer: L,
    tracer: Option<(&SdkTracerProvider, &str)>,
) -> Result<(), ObservabilityError>
where
    L: Layer<Registry> + Send + Sync + 'static,
{
    let subscriber = tracing_subscriber::registry().with(fmt_layer).with(filter);

    if let Some((provider, service_name)) = tracer {
        let tracer = provider.tracer(service_name.to_owned());

        subscriber
            .with(tracing_opentelemetry::layer().with_tracer(tracer))
            .try_init()?;
    } else {
        subscriber.try_init()?;
    }

    Ok(())
}
