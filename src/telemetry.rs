use opentelemetry::trace::TracerProvider;
use tracing_subscriber::{
    EnvFilter, fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::{
    config::Config,
    otel::{self, Providers, SERVICE_NAME},
};

const DEFAULT_FILTER: &str = "info";

/// Installs the global tracing subscriber.
///
/// Log lines always go to stdout. When OTLP export is enabled the same
/// spans are forwarded to the collector, and the returned providers must be
/// shut down before exit to flush them.
pub fn init_telemetry(config: &Config) -> anyhow::Result<Option<Providers>> {
    let providers = if config.otel_enabled {
        Some(otel::init_providers()?)
    } else {
        None
    };

    let otel_layer = providers
        .as_ref()
        .map(|p| tracing_opentelemetry::layer().with_tracer(p.tracer.tracer(SERVICE_NAME)));
    let fmt_layer =
        tracing_subscriber::fmt::layer().with_span_events(FmtSpan::NEW | FmtSpan::CLOSE);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into()))
        .with(fmt_layer)
        .with(otel_layer)
        .try_init()?;

    Ok(providers)
}
