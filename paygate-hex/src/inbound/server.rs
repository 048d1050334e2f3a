//! HTTP Server configuration and startup.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use super::handlers::{self, AppState};
use super::rate_limit::{RateLimiterState, rate_limit_middleware};

/// HTTP Server for the payment gateway API.
pub struct HttpServer {
    state: Arc<AppState>,
    rate_limiter: Arc<RateLimiterState>,
}

impl HttpServer {
    /// Creates a new HTTP server with the default rate limit (100 req/min per tenant).
    pub fn new(state: AppState) -> Self {
        Self {
            state: Arc::new(state),
            rate_limiter: Arc::new(RateLimiterState::default()),
        }
    }

    /// Creates a new HTTP server allowing `max_requests` per `window` per tenant.
    pub fn with_rate_limit(state: AppState, max_requests: u32, window: Duration) -> Self {
        Self {
            state: Arc::new(state),
            rate_limiter: Arc::new(RateLimiterState::new(max_requests, window)),
        }
    }

    /// Builds the Axum router with all routes.
    pub fn router(&self) -> Router {
        // Build HTTP metrics layer (uses globally set MeterProvider)
        let metrics = axum_otel_metrics::HttpMetricsLayerBuilder::new().build();

        Router::new()
            .route("/health", get(handlers::health))
            .route(
                "/api/customers",
                post(handlers::create_customer).get(handlers::find_customer),
            )
            .route(
                "/api/payments",
                post(handlers::create_payment).get(handlers::find_payment),
            )
            .route("/api/payments/{id}", get(handlers::get_payment))
            .route("/api/payments/{id}/refund", post(handlers::refund_payment))
            .route("/api/payments/{id}/cancel", post(handlers::cancel_payment))
            .route(
                "/api/payments/{id}/simulate/{action}",
                post(handlers::simulate_payment),
            )
            .route("/api/webhooks", post(handlers::receive_webhook))
            .route("/api/transactions", get(handlers::list_transactions))
            .layer(metrics)
            .layer(middleware::from_fn_with_state(
                self.rate_limiter.clone(),
                rate_limit_middleware,
            ))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Runs the server on the given address with graceful shutdown.
    pub async fn run(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!(
            provider = %self.state.service.active_provider(),
            "Server listening on {}",
            listener.local_addr()?
        );

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
