use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Staff Router Module
///
/// Defines the routes nested under the staff prefix.
///
/// Access Control:
/// The access gate middleware fronts this entire router. A request only
/// reaches these handlers when it carries a session whose directory role is
/// exactly `staff`; anonymous requests are redirected to login and sessions
/// with any other role are redirected to the admin dashboard.
pub fn staff_routes() -> Router<AppState> {
    Router::new()
        // GET /staff/dashboard
        // Landing page of the staff area, and the destination for
        // non-admin sessions that attempt to enter the admin area.
        .route("/dashboard", get(handlers::staff_dashboard))
}
