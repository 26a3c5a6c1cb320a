use crate::{
    auth::Claims,
    models::{LoginQuery, LoginView, PlaceholderValue, ViewResponse},
    placeholder::PlaceholderState,
};
use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;

// --- Public Handlers ---

/// greeting
///
/// [Public Route] The backend's single greeting.
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Greeting", body = String))
)]
pub async fn greeting() -> &'static str {
    "Hello World!"
}

/// get_placeholder
///
/// [Public Route] Fetches the placeholder value from the configured source and
/// stamps it with the fetch time. Upstream failures surface as 502.
#[utoipa::path(
    get,
    path = "/api/placeholder",
    responses(
        (status = 200, description = "Placeholder value", body = PlaceholderValue),
        (status = 502, description = "Upstream unavailable")
    )
)]
pub async fn get_placeholder(State(source): State<PlaceholderState>) -> impl IntoResponse {
    match source.fetch().await {
        Ok(value) => {
            let body = PlaceholderValue {
                value,
                fetched_at: Utc::now(),
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Placeholder fetch failed");
            (StatusCode::BAD_GATEWAY, "Failed").into_response()
        }
    }
}

/// login_view
///
/// [Public Route] Where the guard sends callers without usable credentials.
/// Echoes the remembered location so the client can return after login.
#[utoipa::path(
    get,
    path = "/login",
    params(LoginQuery),
    responses((status = 200, description = "Login view", body = LoginView))
)]
pub async fn login_view(Query(query): Query<LoginQuery>) -> Json<LoginView> {
    Json(LoginView {
        view: "login".to_string(),
        redirect: query.redirect,
    })
}

// --- Protected Handlers ---
// The guard middleware inserts the resolved `Claims` before these run.

fn render(view: &str, claims: Claims) -> Json<ViewResponse> {
    Json(ViewResponse {
        view: view.to_string(),
        role: claims.role,
        subject: claims.sub,
    })
}

/// dashboard
///
/// [Authenticated Route] Default landing view; any role may see it.
#[utoipa::path(
    get,
    path = "/dashboard",
    responses(
        (status = 200, description = "Dashboard", body = ViewResponse),
        (status = 303, description = "Redirect to login")
    )
)]
pub async fn dashboard(Extension(claims): Extension<Claims>) -> Json<ViewResponse> {
    render("dashboard", claims)
}

/// settings
///
/// [Admin Route] Application settings.
#[utoipa::path(
    get,
    path = "/settings",
    responses(
        (status = 200, description = "Settings", body = ViewResponse),
        (status = 303, description = "Redirect to login or dashboard")
    )
)]
pub async fn settings(Extension(claims): Extension<Claims>) -> Json<ViewResponse> {
    render("settings", claims)
}

/// admin_view
///
/// [Admin Route] Administration area.
#[utoipa::path(
    get,
    path = "/admin",
    responses(
        (status = 200, description = "Admin", body = ViewResponse),
        (status = 303, description = "Redirect to login or dashboard")
    )
)]
pub async fn admin_view(Extension(claims): Extension<Claims>) -> Json<ViewResponse> {
    render("admin", claims)
}

/// editor_view
///
/// [Editor Route] Content editing, open to admins and editors.
#[utoipa::path(
    get,
    path = "/editor",
    responses(
        (status = 200, description = "Editor", body = ViewResponse),
        (status = 303, description = "Redirect to login or dashboard")
    )
)]
pub async fn editor_view(Extension(claims): Extension<Claims>) -> Json<ViewResponse> {
    render("editor", claims)
}
