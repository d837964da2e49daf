use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Defines endpoints that are **unauthenticated** and accessible to any
/// client. The access gate classifies these paths as unprotected and lets
/// them through regardless of session state, so they are reachable both by
/// anonymous visitors and by signed-in users who were redirected here.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // A simple, unauthenticated endpoint used for monitoring and load
        // balancer checks. Returns "ok" immediately.
        .route("/health", get(|| async { "ok" }))
        // GET /
        // The sign-in page. Doubles as the target of every fail-closed
        // redirect issued by the access gate; the optional `redirectedFrom`
        // query parameter records where the visitor was headed.
        .route("/", get(handlers::login_page))
}
