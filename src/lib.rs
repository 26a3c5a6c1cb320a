use axum::{Router, extract::FromRef, http::HeaderName, middleware::from_fn_with_state};
use sqlx::PgPool;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// The access guard and the collaborators it reads from.
pub mod auth;
pub mod guard;
pub mod token_store;

// HTTP surface and the thin I/O collaborators behind it.
pub mod config;
pub mod database;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod placeholder;

// Module for routing segregation (Public, Authenticated, Admin, Editor).
pub mod routes;
use routes::{admin, authenticated, editor, public};

// --- Public Re-exports ---

pub use auth::{AuthSession, Claims, ClaimsSource, ClaimsSourceState, DecodeError, UnverifiedDecoder};
pub use config::AppConfig;
pub use guard::{AccessDenied, AccessGuard, AccessPolicy, Location, NavigationTarget, check, evaluate};
pub use middleware::ProtectedView;
pub use placeholder::{HttpPlaceholderSource, MockPlaceholderSource, PlaceholderState};
pub use token_store::{MemoryTokenStore, RequestTokens, TokenSource, TokenSourceState, TokenStore};

/// ApiDoc
///
/// OpenAPI documentation, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::greeting, handlers::get_placeholder, handlers::login_view,
        handlers::dashboard, handlers::settings, handlers::admin_view, handlers::editor_view
    ),
    components(
        schemas(
            models::PlaceholderValue, models::ViewResponse, models::LoginView, auth::Claims,
        )
    ),
    tags(
        (name = "guarded-portal", description = "Guarded Portal API")
    )
)]
struct ApiDoc;

/// AppState
///
/// Implements the **Unified State Pattern**: one cloneable container with every
/// service the handlers and the guard middleware need.
#[derive(Clone)]
pub struct AppState {
    /// Configuration: the loaded, immutable environment configuration.
    pub config: AppConfig,
    /// Where the guard gets claims from.
    pub claims: ClaimsSourceState,
    /// Upstream of the placeholder value.
    pub placeholder: PlaceholderState,
    /// Database pool, absent when the connection failed or none was configured.
    pub db: Option<PgPool>,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

impl FromRef<AppState> for ClaimsSourceState {
    fn from_ref(app_state: &AppState) -> ClaimsSourceState {
        app_state.claims.clone()
    }
}

impl FromRef<AppState> for PlaceholderState {
    fn from_ref(app_state: &AppState) -> PlaceholderState {
        app_state.placeholder.clone()
    }
}

/// create_router
///
/// Assembles the routing structure, puts each protected module behind the access
/// guard with its policy, and applies the observability layers.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let authenticated_view = ProtectedView::new(state.clone(), None);
    let admin_view = ProtectedView::new(
        state.clone(),
        Some(AccessPolicy::roles(admin::ADMIN_ROLES)),
    );
    let editor_view = ProtectedView::new(
        state.clone(),
        Some(AccessPolicy::roles(editor::EDITOR_ROLES)),
    );

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        // Each protected module carries its own guard layer and policy.
        .merge(
            authenticated::authenticated_routes()
                .route_layer(from_fn_with_state(authenticated_view, middleware::require_access)),
        )
        .merge(
            admin::admin_routes()
                .route_layer(from_fn_with_state(admin_view, middleware::require_access)),
        )
        .merge(
            editor::editor_routes()
                .route_layer(from_fn_with_state(editor_view, middleware::require_access)),
        )
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span for every request, correlated by the `x-request-id` set above.
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
