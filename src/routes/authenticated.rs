use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Authenticated Router Module
///
/// Views any caller with a decodable token may see. Guarded with no policy,
/// so the role is never consulted here.
pub fn authenticated_routes() -> Router<AppState> {
    Router::new()
        // GET /dashboard
        // Also the default view that role mismatches are sent to.
        .route("/dashboard", get(handlers::dashboard))
}
