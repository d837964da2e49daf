use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Admin Router Module
///
/// Defines the routes nested under the admin prefix.
///
/// Access Control:
/// The access gate middleware fronts this entire router. A request only
/// reaches these handlers when it carries a session whose directory role is
/// exactly `admin`; anonymous requests are redirected to login and sessions
/// with any other role are redirected to the staff dashboard.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /admin/dashboard
        // Landing page of the admin area, and the destination for non-staff
        // sessions that attempt to enter the staff area.
        .route("/dashboard", get(handlers::admin_dashboard))
}
