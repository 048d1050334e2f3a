//! # Paygate Application
//!
//! Binary that wires together all the components:
//! - Load configuration from environment
//! - Resolve the active payment provider through the registry
//! - Create the audited payment service over the transaction log
//! - Start the HTTP server

mod config;

use std::sync::Arc;
use std::time::Duration;

use opentelemetry::global;
use opentelemetry_sdk::{propagation::TraceContextPropagator, trace as sdktrace};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use paygate_hex::{
    PaymentService,
    inbound::{AppState, HttpServer},
    security::{FieldCipher, fingerprint},
};
use paygate_providers::ProviderRegistry;
use paygate_repo::InMemoryTransactionRepository;
use paygate_types::TransactionRepository;

fn init_tracer() -> anyhow::Result<(sdktrace::Tracer, sdktrace::SdkTracerProvider)> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    // Use gRPC exporter with batch processing (non-blocking)
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .build()?;

    let provider = sdktrace::SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .build();

    global::set_tracer_provider(provider.clone());

    use opentelemetry::trace::TracerProvider as _;
    Ok((provider.tracer("paygate-service"), provider))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize OpenTelemetry tracing
    let (otel_tracer, otel_provider) = init_tracer()?;
    let telemetry = tracing_opentelemetry::layer().with_tracer(otel_tracer);

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "info,paygate_app=debug,paygate_hex=debug,paygate_providers=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(telemetry)
        .init();

    // Load configuration
    let config = config::from_env()?;

    tracing::info!(
        provider = %config.provider,
        port = config.server.port,
        "Starting payment gateway server"
    );
    match &config.security.webhook_token {
        Some(token) => tracing::info!(fingerprint = %fingerprint(token), "Webhook token configured"),
        None => tracing::warn!("PAYMENT_WEBHOOK_TOKEN not set; webhook deliveries are not authenticated"),
    }
    // A malformed key must stop startup rather than fail on first use
    if let Some(key) = &config.security.encryption_key {
        FieldCipher::from_hex_key(key)
            .map_err(|err| anyhow::anyhow!("PAYMENT_ENCRYPTION_KEY: {err}"))?;
        tracing::info!(fingerprint = %fingerprint(key), "Field encryption key loaded");
    }

    // Resolve the provider; misconfiguration stops startup here
    let registry = ProviderRegistry::new();
    let provider = registry.provider(&config)?;

    let repository: Arc<dyn TransactionRepository> = Arc::new(
        InMemoryTransactionRepository::with_max_entries(config.audit.max_entries),
    );
    let service = PaymentService::new(provider, Some(repository));

    let state = AppState::new(service).with_webhook_token(config.security.webhook_token.clone());
    let server = HttpServer::with_rate_limit(
        state,
        config.security.rate_limit_max_requests,
        Duration::from_millis(config.security.rate_limit_window_ms),
    );
    let addr = format!("0.0.0.0:{}", config.server.port);

    server.run(&addr).await?;

    // Ensure traces are flushed before exit
    let _ = otel_provider.shutdown();
    Ok(())
}
