use axum::{extract::Query, response::Html};
use serde::Deserialize;

// --- Filter Structs ---

/// LoginQuery
///
/// Accepted query parameters for the login page (GET /). `redirectedFrom`
/// is attached by the access gate when an unauthenticated request hits a
/// protected path, so the client can resume navigation after signing in.
#[derive(Deserialize)]
pub struct LoginQuery {
    #[serde(rename = "redirectedFrom")]
    pub redirected_from: Option<String>,
}

/// Minimal HTML escape for user-influenced text interpolated into pages.
fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

// --- Handlers ---

/// login_page
///
/// [Public Route] The portal's sign-in page, served at `/`. Every
/// fail-closed redirect issued by the access gate lands here. When the gate
/// attached a `redirectedFrom` parameter, the page surfaces the original
/// destination so the client can return there after authentication.
pub async fn login_page(Query(query): Query<LoginQuery>) -> Html<String> {
    let notice = match query.redirected_from.as_deref() {
        Some(from) => format!(
            "<p>Sign in to continue to <code>{}</code>.</p>",
            escape_html(from)
        ),
        None => String::new(),
    };

    Html(format!("<h1>Staff Portal</h1>\n<p>Please sign in.</p>\n{notice}"))
}

/// staff_dashboard
///
/// [Staff Route] Landing page of the staff area. The access gate guarantees
/// that requests reaching this handler carry a session whose directory role
/// is `staff`; no further check happens here.
pub async fn staff_dashboard() -> Html<&'static str> {
    Html("<h1>Staff Dashboard</h1>")
}

/// admin_dashboard
///
/// [Admin Route] Landing page of the admin area. Reached only by sessions
/// whose directory role is `admin`.
pub async fn admin_dashboard() -> Html<&'static str> {
    Html("<h1>Admin Dashboard</h1>")
}
