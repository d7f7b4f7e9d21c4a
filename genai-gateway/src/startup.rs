//! Application startup and lifecycle management.

use crate::config::GatewayConfig;
use crate::handlers::{generate::generate, health::health_check, metrics::metrics, not_found};
use crate::services::metrics::init_metrics;
use crate::services::providers::{CompletionProvider, GroqProvider};
use crate::services::CompletionService;
use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::{panic_response, AppError};
use service_core::middleware::{make_request_span, request_id_middleware};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub completion: CompletionService,
}

impl AppState {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self {
            completion: CompletionService::new(provider),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    init_metrics();

    Router::new()
        .route("/generative-ai/health", get(health_check))
        .route("/generative-ai/generate", post(generate))
        .route("/metrics", get(metrics))
        .fallback(not_found)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span::<axum::body::Body>))
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the Groq provider described by `config`.
    pub async fn build(config: GatewayConfig) -> Result<Self, AppError> {
        if config.groq.api_key.is_none() {
            tracing::warn!("GROQ_API_KEY is not set; generation requests will fail until it is");
        }

        let provider = GroqProvider::new(config.groq.clone()).inspect_err(|e| {
            tracing::error!("Failed to initialize Groq provider: {}", e);
        })?;

        tracing::info!(
            model = %config.groq.model,
            base_url = %config.groq.base_url,
            "Initialized Groq completion provider"
        );

        Self::build_with_provider(config, Arc::new(provider)).await
    }

    /// Build the application around an already constructed provider.
    pub async fn build_with_provider(
        config: GatewayConfig,
        provider: Arc<dyn CompletionProvider>,
    ) -> Result<Self, AppError> {
        let state = AppState::new(provider);

        // port 0 = random port for testing
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("GenAI gateway listening on port {}", port);

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until a shutdown signal arrives.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, build_router(self.state))
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
