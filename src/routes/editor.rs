use crate::{AppState, handlers};
use axum::{Router, routing::get};

pub const EDITOR_ROLES: [&str; 2] = ["admin", "editor"];

/// Editor Router Module
///
/// Content editing, guarded with `EDITOR_ROLES`.
pub fn editor_routes() -> Router<AppState> {
    Router::new()
        // GET /editor
        .route("/editor", get(handlers::editor_view))
}
