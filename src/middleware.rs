use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;

use crate::{
    AppState,
    config::AppConfig,
    guard::{AccessGuard, AccessPolicy, Location, NavigationTarget},
    token_store::RequestTokens,
};

/// ProtectedView
///
/// Middleware state for one group of guarded routes: the shared application
/// state plus the policy those routes demand (`None` = any authenticated caller).
#[derive(Clone)]
pub struct ProtectedView {
    pub state: AppState,
    pub policy: Option<AccessPolicy>,
}

impl ProtectedView {
    pub fn new(state: AppState, policy: Option<AccessPolicy>) -> Self {
        Self { state, policy }
    }
}

/// require_access
///
/// Runs the access guard against the token carried by the request and hands the
/// decision to the router: render (with the claims attached as an extension for
/// the handler) or redirect.
pub async fn require_access(
    State(view): State<ProtectedView>,
    mut request: Request,
    next: Next,
) -> Response {
    let config = &view.state.config;
    let location = Location::from(request.uri());

    let store = Arc::new(RequestTokens::from_headers(request.headers(), &config.token_key));
    let guard = AccessGuard::new(store, view.state.claims.clone(), config.token_key.clone());

    match guard.check(view.policy.as_ref()) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(denied) => {
            tracing::debug!(location = %location, reason = %denied, "Access denied");
            // A denial always folds into a redirect.
            navigate(denied.into_target(location), config)
                .unwrap_or_else(|| Redirect::to(&config.login_path).into_response())
        }
    }
}

/// navigate
///
/// Turns a redirect decision into a 303 response. `RenderContent` has no
/// response of its own; the caller runs the protected handler instead.
pub fn navigate(target: NavigationTarget, config: &AppConfig) -> Option<Response> {
    match target {
        NavigationTarget::RenderContent => None,
        NavigationTarget::RedirectLogin { remember } => {
            Some(Redirect::to(&login_redirect_url(&config.login_path, &remember)).into_response())
        }
        NavigationTarget::RedirectHome => Some(Redirect::to(&config.home_path).into_response()),
    }
}

/// login_redirect_url
///
/// `/login?redirect=%2Fsettings` for a caller who tried to reach `/settings`.
pub fn login_redirect_url(login_path: &str, remember: &Location) -> String {
    format!(
        "{}?redirect={}",
        login_path,
        urlencoding::encode(remember.as_str())
    )
}
