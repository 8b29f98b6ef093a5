use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::errors::{AppError, Result};

/// Installs the global subscriber: an env-filtered fmt layer on stderr and,
/// when built with `otel` and given an endpoint, an OTLP span exporter.
///
/// `RUST_LOG` takes precedence over `default_level`. Calling this twice is a
/// no-op so tests and binaries can share it.
pub fn init_tracing(
    service_name: &str,
    default_level: &str,
    otlp_endpoint: Option<&str>,
) -> Result<()> {
    if tracing::dispatcher::has_been_set() {
        return Ok(());
    }

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let fmt_layer = fmt::layer().with_writer(std::io::stderr);

    #[cfg(feature = "otel")]
    {
        if let Some(endpoint) = otlp_endpoint {
            let tracer = otlp_tracer(service_name, endpoint)?;
            return tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .with(tracing_opentelemetry::layer().with_tracer(tracer))
                .try_init()
                .map_err(AppError::telemetry);
        }
    }

    #[cfg(not(feature = "otel"))]
    let _ = (service_name, otlp_endpoint);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(AppError::telemetry)
}

#[cfg(feature = "otel")]
fn otlp_tracer(service_name: &str, endpoint: &str) -> Result<opentelemetry_sdk::trace::Tracer> {
    use opentelemetry::KeyValue;
    use opentelemetry_otlp::WithExportConfig;
    use opentelemetry_sdk::{trace, Resource};

    opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(
            opentelemetry_otlp::new_exporter()
                .tonic()
                .with_endpoint(endpoint),
        )
        .with_trace_config(trace::config().with_resource(Resource::new(vec![KeyValue::new(
            "service.name",
            service_name.to_string(),
        )])))
        .install_batch(opentelemetry_sdk::runtime::Tokio)
        .map_err(AppError::telemetry)
}

/// Flushes pending spans. No-op without the `otel` feature.
pub fn shutdown_tracer_provider() {
    #[cfg(feature = "otel")]
    opentelemetry::global::shutdown_tracer_provider();
}
