//! OTLP trace export.

use std::time::Duration;

use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    Resource,
    trace::{RandomIdGenerator, Sampler, SdkTracerProvider},
};

use crate::config::observability::ObservabilityConfig;

use super::ObservabilityError;

/// Groups the API with the other marketplace services in trace backends.
const SERVICE_NAMESPACE: &str = "mandi";

pub(super) fn build_tracer_provider(
    config: &ObservabilityConfig,
) -> Result<SdkTracerProvider, ObservabilityError> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(config.otel_exporter_otlp_endpoint.clone())
        .with_timeout(Duration::from_secs(
            config.otel_exporter_otlp_timeout_seconds,
        ))
        .build()?;

    // Follow the caller's sampling decision when a parent was propagated.
    let sampler = Sampler::ParentBased(Box::new(Sampler::TraceIdRatioBased(
        config.otel_trace_sample_ratio,
    )));

    Ok(SdkTracerProvider::builder()
        .with_sampler(sampler)
        .with_id_generator(RandomIdGenerator::default())
        .with_resource(service_resource(config))
        .with_batch_exporter(exporter)
        .build())
}

fn service_resource(config: &ObservabilityConfig) -> Resource {
    Resource::builder_empty()
        .with_service_name(config.otel_service_name.clone())
        .with_attributes([
            KeyValue::new("service.namespace", SERVICE_NAMESPACE),
            KeyValue::new("service.version", config.otel_service_version.clone()),
            KeyValue::new(
                "deployment.environment.name",
                config.otel_deployment_environment.clone(),
            ),
        ])
        .build()
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use opentelemetry::{Key, Value};
    use testresult::TestResult;

    use super::*;

    #[derive(Debug, Parser)]
    struct Args {
        #[command(flatten)]
        observability: ObservabilityConfig,
    }

    #[test]
    fn resource_describes_the_service() -> TestResult {
        let args = Args::try_parse_from([
            "mandi-json",
            "--otel-service-name",
            "mandi-json-canary",
            "--otel-deployment-environment",
            "staging",
        ])?;

        let resource = service_resource(&args.observability);

        assert_eq!(
            resource.get(&Key::new("service.name")),
            Some(Value::from("mandi-json-canary"))
        );
        assert_eq!(
            resource.get(&Key::new("service.namespace")),
            Some(Value::from("mandi"))
        );
        assert_eq!(
            resource.get(&Key::new("deployment.environment.name")),
            Some(Value::from("staging"))
        );

        Ok(())
    }
}
