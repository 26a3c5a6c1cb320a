use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Roles allowed through the admin routes.
pub const ADMIN_ROLES: [&str; 1] = ["admin"];

/// Admin Router Module
///
/// Must be layered with the guard using `ADMIN_ROLES`. A valid token with any
/// other role is sent to the default view, not to login.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /settings
        .route("/settings", get(handlers::settings))
        // GET /admin
        .route("/admin", get(handlers::admin_view))
}
