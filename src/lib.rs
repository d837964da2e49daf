use axum::{
    Router,
    extract::{FromRef, Request, State},
    http::HeaderName,
    middleware::{self, Next},
    response::{IntoResponse, Redirect, Response},
};

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod config;
pub mod directory;
pub mod gate;
pub mod handlers;
pub mod models;
pub mod session;

// Module for routing segregation (Public, Staff, Admin).
pub mod routes;
use gate::Decision;
use routes::{admin, public, staff};

// --- Public Re-exports ---

// Makes core state types easily accessible to the main application entry point (main.rs).
pub use config::AppConfig;
pub use directory::{DirectoryState, PostgresDirectory};
pub use session::{HttpSessionProvider, SessionState};

/// AppState
///
/// The single, thread-safe, immutable container holding the services the
/// access gate consults on every request, shared across all incoming
/// requests.
#[derive(Clone)]
pub struct AppState {
    /// User directory: resolves a directory username to its stored role.
    pub directory: DirectoryState,
    /// Session provider: resolves an access token to a live session.
    pub sessions: SessionState,
    /// Configuration: the loaded, immutable environment configuration,
    /// including the gate policy.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

// These implementations allow handlers and middleware to selectively pull
// components from the shared AppState.

impl FromRef<AppState> for DirectoryState {
    fn from_ref(app_state: &AppState) -> DirectoryState {
        app_state.directory.clone()
    }
}

impl FromRef<AppState> for SessionState {
    fn from_ref(app_state: &AppState) -> SessionState {
        app_state.sessions.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// access_gate
///
/// Middleware enforcing the access policy on every request, in order:
///
/// 1. Matcher exclusions (static assets, favicon, public files) skip the
///    gate entirely, including the session fetch.
/// 2. The access token is read from the request (Bearer header or session
///    cookie) and the session is fetched from the provider once. A provider
///    failure is logged and treated as "no session", so protected paths
///    fail closed below.
/// 3. The decision function settles the request: pass through on `Allow`,
///    or short-circuit with a 307 redirect to the decided location.
async fn access_gate(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();

    if state.config.gate.is_bypassed(&path) {
        return next.run(request).await;
    }

    let session = match session::request_token(request.headers(), &state.config.session_cookie) {
        Some(token) => match state.sessions.get_session(&token).await {
            Ok(session) => session,
            Err(e) => {
                tracing::error!(%path, error = %e, "session fetch failed");
                None
            }
        },
        None => None,
    };

    match state
        .config
        .gate
        .decide(&path, session.as_ref(), state.directory.as_ref())
        .await
    {
        Decision::Allow => next.run(request).await,
        Decision::Redirect { location, reason } => {
            tracing::info!(%path, ?reason, %location, "request redirected");
            Redirect::temporary(&location).into_response()
        }
    }
}

/// create_router
///
/// Assembles the application's routing structure, applies the access gate
/// and the global observability layers, and registers the application state.
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
        // Public Routes: login page and health check.
        .merge(public::public_routes())
        // Staff area, nested under the staff prefix.
        .nest("/staff", staff::staff_routes())
        // Admin area, nested under the admin prefix.
        .nest("/admin", admin::admin_routes())
        // The access gate wraps every route. The gate itself knows which
        // prefixes are protected, so public paths pass straight through and
        // the route modules carry no per-handler role checks.
        .layer(middleware::from_fn_with_state(state.clone(), access_gate))
        // Apply the Unified State to all routes.
        .with_state(state);

    // 3. Observability and Correlation Layers (Applied outermost/first)
    base_router
        .layer(
            ServiceBuilder::new()
                // 3a. Request ID Generation: a unique UUID for every incoming request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // 3b. Request Tracing: wraps the request/response lifecycle in a
                // tracing span carrying the generated request ID.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 3c. Request ID Propagation: returns the x-request-id header to
                // the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS Layer
        .layer(cors)
}

/// trace_span_logger
///
/// Helper used by `TraceLayer` to customize span creation. Extracts the
/// `x-request-id` header (if present) and includes it in the structured
/// logging metadata alongside the HTTP method and URI, so every log line
/// for a single request is correlated by a unique ID.
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
