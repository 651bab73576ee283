use axum::{
    Router,
    http::HeaderName,
    routing::{any, get},
};
use std::sync::Arc;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Session core: persistence tiers, the session store and the route guard.
pub mod session;
pub mod storage;

// Navigation surface (route table grouped by access, plus the guard).
pub mod routes;

// Backend access: HTTP client wrapper, user service and session lifecycle.
pub mod auth;
pub mod client;
pub mod service;

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;

// --- Public Re-exports ---

pub use auth::AuthClient;
pub use client::ApiClient;
pub use config::{AppConfig, ProxyTarget};
pub use error::{ApiError, StorageError};
pub use models::Role;
pub use routes::{Navigation, RouteTable, guard::GuardDecision};
pub use service::{HttpUserService, MockUserService, UserService, UserServiceState};
pub use session::{SessionSnapshot, SessionStore, Tier};

/// AppState
///
/// Shared state of the development server. Everything in here is immutable
/// after startup and cheap to clone per request.
#[derive(Clone)]
pub struct AppState {
    /// Configuration: the loaded, immutable environment configuration.
    pub config: AppConfig,
    /// Where `/api/v1` traffic is forwarded, derived from `config`.
    pub proxy: ProxyTarget,
    /// Outbound client used by the proxy (shares one connection pool).
    pub http: reqwest::Client,
    /// The application's route table, used for the history fallback.
    pub routes: Arc<RouteTable>,
}

impl AppState {
    /// Fails only if the outbound HTTP client cannot be built (TLS backend init).
    pub fn new(config: AppConfig) -> Result<Self, reqwest::Error> {
        // The proxy hands backend redirects to the browser instead of following them.
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self {
            proxy: config.proxy_target(),
            config,
            http,
            routes: Arc::new(RouteTable::default()),
        })
    }
}

/// create_router
///
/// Assembles the development server: health check, the API proxy and the
/// history fallback, wrapped in the request-id, tracing and CORS layers.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for Request Correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        // GET /health
        .route("/health", get(|| async { "ok" }))
        // /api/v1 and everything below it goes to the backend.
        .route("/api/v1", any(handlers::proxy_api))
        .route("/api/v1/{*rest}", any(handlers::proxy_api))
        // Application routes (and unknown paths) fall through to the shell.
        .fallback(handlers::spa_fallback)
        .with_state(state);

    // 3. Observability and Correlation Layers
    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS Layer
        .layer(cors)
}

/// trace_span_logger
///
/// Builds the per-request span, carrying the `x-request-id` so every log line
/// of one request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
