//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, timeout, request ID)
//! - Resolve short links and run the affiliate pre-redirect hook
//! - Mount the admin API when enabled
//! - Bind server to listener and shut down gracefully

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin;
use crate::affiliate::{self, Rewrite};
use crate::config::{AdminConfig, ServiceConfig};
use crate::http::request::{request_id_of, UuidRequestId};
use crate::http::response;
use crate::observability::metrics;
use crate::routing::LinkTable;
use crate::settings::{SettingsHandle, SettingsStore};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub settings: SettingsHandle,
    pub store: Arc<dyn SettingsStore>,
    pub links: Arc<LinkTable>,
    pub admin: AdminConfig,
}

/// HTTP host for short-link redirects.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
}

impl HttpServer {
    /// Create a new HTTP server over the given settings snapshot and store.
    pub fn new(config: ServiceConfig, store: Arc<dyn SettingsStore>, settings: SettingsHandle) -> Self {
        let state = AppState {
            settings,
            store,
            links: Arc::new(LinkTable::from_config(&config.links)),
            admin: config.admin.clone(),
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServiceConfig, state: AppState) -> Router {
        let mut router = Router::new()
            .route("/health", get(health))
            .route("/{code}", get(resolve_link))
            .with_state(state.clone());

        if config.admin.enabled {
            router = router.merge(admin::setup_admin_router(state));
        }

        router
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %req.method(),
                    uri = %req.uri(),
                    request_id = %request_id_of(req),
                )
            }))
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
    }

    /// The fully layered router, for serving or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            admin = self.config.admin.enabled,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn health() -> &'static str {
    "ok"
}

/// Resolve a short code, then let the affiliate hook either take over the
/// response or fall through to the plain redirect.
async fn resolve_link(State(state): State<AppState>, Path(code): Path<String>) -> Response {
    let Some(destination) = state.links.resolve(&code) else {
        tracing::debug!(code = %code, "Unknown short link");
        metrics::record_request(404);
        return (StatusCode::NOT_FOUND, "Unknown short link").into_response();
    };

    // One snapshot for the whole request.
    let settings = state.settings.load();

    match affiliate::rewrite(&destination.written, &settings) {
        Rewrite::Rewritten(payload) => {
            metrics::record_request(200);
            response::affiliate_page(payload)
        }
        Rewrite::NotApplicable => {
            metrics::record_request(302);
            response::plain_redirect(&destination.url)
        }
    }
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
