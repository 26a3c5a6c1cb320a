use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Endpoints that never pass through the guard. The login view must live here,
/// otherwise a failed check would redirect into another failed check.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /
        // The backend's greeting.
        .route("/", get(handlers::greeting))
        // GET /health
        // Liveness check for monitoring and load balancers.
        .route("/health", get(|| async { "ok" }))
        // GET /login?redirect=...
        // Target of every RedirectLogin decision.
        .route("/login", get(handlers::login_view))
        // GET /api/placeholder
        // The value the landing page fetches and renders.
        .route("/api/placeholder", get(handlers::get_placeholder))
}
