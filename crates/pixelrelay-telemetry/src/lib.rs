//! Logging and optional OTLP trace export for pixelrelay

mod metadata;

use opentelemetry::global;
use opentelemetry::trace::TracerProvider;
use opentelemetry_sdk::trace::{Sampler, SdkTracerProvider};
use pixelrelay_config::{ExportProtocol, ExporterConfig, LogFormat, TelemetryConfig};

/// Guard that flushes and shuts down trace export on drop
pub struct TelemetryGuard {
    tracer_provider: Option<SdkTracerProvider>,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.tracer_provider.take()
            && let Err(e) = provider.shutdown()
        {
            eprintln!("failed to shutdown tracer provider: {e}");
        }
    }
}

/// Initialize logging and, when an exporter is configured, trace export
///
/// Returns a guard that must be held for the lifetime of the application.
///
/// # Errors
///
/// Returns an error if the OTLP exporter cannot be built or a global
/// subscriber is already installed
pub fn init(config: Option<&TelemetryConfig>, log_filter: &str) -> anyhow::Result<TelemetryGuard> {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_new(log_filter).unwrap_or_else(|_| EnvFilter::new("info"));

    let json = config.is_some_and(|c| c.log_format == LogFormat::Json);
    let text_layer = (!json).then(|| tracing_subscriber::fmt::layer().with_target(true));
    let json_layer = json.then(|| tracing_subscriber::fmt::layer().json().with_target(true));

    let tracer_provider = match config {
        Some(telemetry_config) => telemetry_config
            .exporter
            .as_ref()
            .map(|exporter| init_tracer(telemetry_config, exporter))
            .transpose()?,
        None => None,
    };

    let otel_layer = tracer_provider.as_ref().map(|provider| {
        global::set_tracer_provider(provider.clone());
        tracing_opentelemetry::layer().with_tracer(provider.tracer("pixelrelay"))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(text_layer)
        .with(json_layer)
        .with(otel_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))?;

    Ok(TelemetryGuard { tracer_provider })
}

/// Initialize OTLP trace export
fn init_tracer(config: &TelemetryConfig, exporter_config: &ExporterConfig) -> anyhow::Result<SdkTracerProvider> {
    let exporter = build_span_exporter(exporter_config)?;

    let sampler = if config.sampling_rate >= 1.0 {
        Sampler::AlwaysOn
    } else if config.sampling_rate <= 0.0 {
        Sampler::AlwaysOff
    } else {
        Sampler::TraceIdRatioBased(config.sampling_rate)
    };

    Ok(SdkTracerProvider::builder()
        .with_resource(metadata::build_resource(config))
        .with_sampler(Sampler::ParentBased(Box::new(sampler)))
        .with_batch_exporter(exporter)
        .build())
}

/// Build OTLP span exporter based on protocol
fn build_span_exporter(config: &ExporterConfig) -> anyhow::Result<opentelemetry_otlp::SpanExporter> {
    use opentelemetry_otlp::{SpanExporter, WithExportConfig};

    let exporter = match config.protocol {
        ExportProtocol::Grpc => SpanExporter::builder()
            .with_tonic()
            .with_endpoint(config.endpoint.as_str())
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build gRPC span exporter: {e}"))?,
        ExportProtocol::HttpProto => SpanExporter::builder()
            .with_http()
            .with_endpoint(config.endpoint.as_str())
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build HTTP span exporter: {e}"))?,
    };

    Ok(exporter)
}
