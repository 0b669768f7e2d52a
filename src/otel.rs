use anyhow::Context;
use opentelemetry::global;
use opentelemetry_otlp::{MetricExporter, SpanExporter};
use opentelemetry_sdk::{
    Resource, metrics::SdkMeterProvider, propagation::TraceContextPropagator,
    trace::SdkTracerProvider,
};

pub const SERVICE_NAME: &str = "peopler";

pub struct Providers {
    pub tracer: SdkTracerProvider,
    pub meter: SdkMeterProvider,
}

/// Builds OTLP (gRPC) trace and metric providers and installs them as the
/// process-wide globals. The endpoint comes from the standard
/// `OTEL_EXPORTER_OTLP_*` variables.
pub fn init_providers() -> anyhow::Result<Providers> {
    let resource = Resource::builder().with_service_name(SERVICE_NAME).build();

    let span_exporter = SpanExporter::builder()
        .with_tonic()
        .build()
        .context("Failed to create OTLP span exporter")?;

    let tracer = SdkTracerProvider::builder()
        .with_batch_exporter(span_exporter)
        .with_resource(resource.clone())
        .build();

    let metric_exporter = MetricExporter::builder()
        .with_tonic()
        .build()
        .context("Failed to create OTLP metric exporter")?;

    let meter = SdkMeterProvider::builder()
        .with_periodic_exporter(metric_exporter)
        .with_resource(resource)
        .build();

    global::set_text_map_propagator(TraceContextPropagator::new());
    global::set_tracer_provider(tracer.clone());
    global::set_meter_provider(meter.clone());

    Ok(Providers { tracer, meter })
}

impl Providers {
    /// Flushes pending spans and metrics.
    pub fn shutdown(self) -> anyhow::Result<()> {
        self.tracer
            .shutdown()
            .context("Failed to shut down tracer provider")?;
        self.meter
            .shutdown()
            .context("Failed to shut down meter provider")?;
        Ok(())
    }
}
