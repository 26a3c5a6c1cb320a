use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

use crate::{
    auth::{Claims, ClaimsSource, ClaimsSourceState, DecodeError},
    token_store::TokenSourceState,
};

/// Location
///
/// The path (and query, if any) the caller was trying to reach. Carried
/// through a login redirect so the caller can come back to it afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location(String);

impl Location {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Location {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<&axum::http::Uri> for Location {
    fn from(uri: &axum::http::Uri) -> Self {
        let path = uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or_else(|| uri.path());
        Self::new(path)
    }
}

/// AccessPolicy
///
/// The set of roles permitted to see a view. An empty set permits every
/// authenticated caller, same as having no policy at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessPolicy {
    roles: BTreeSet<String>,
}

impl AccessPolicy {
    pub fn roles<I, R>(roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        Self {
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    pub fn permits(&self, role: &str) -> bool {
        self.roles.is_empty() || self.roles.contains(role)
    }
}

/// NavigationTarget
///
/// The guard's only output. Handed to the router, which performs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationTarget {
    RenderContent,
    /// Re-authenticate, then come back to `remember`.
    RedirectLogin { remember: Location },
    /// Authenticated but not allowed here; logging in again would not help.
    RedirectHome,
}

/// AccessDenied
///
/// Why the guard refused. `MissingToken` and `DecodeFailure` look the same to
/// the caller (both go to login); `InsufficientRole` goes to the default view.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessDenied {
    #[error("no credential token in the store")]
    MissingToken,
    #[error("credential token could not be decoded: {0}")]
    DecodeFailure(#[from] DecodeError),
    #[error("role '{role}' is not permitted for this view")]
    InsufficientRole { role: String },
}

impl AccessDenied {
    pub fn into_target(self, current_location: Location) -> NavigationTarget {
        match self {
            AccessDenied::MissingToken | AccessDenied::DecodeFailure(_) => {
                NavigationTarget::RedirectLogin {
                    remember: current_location,
                }
            }
            AccessDenied::InsufficientRole { .. } => NavigationTarget::RedirectHome,
        }
    }
}

/// check
///
/// Runs the access decision and hands back the resolved claims on success.
/// Order matters: missing token, then decode, then role.
pub fn check<D>(
    token: Option<&str>,
    claims_decoder: &D,
    policy: Option<&AccessPolicy>,
) -> Result<Claims, AccessDenied>
where
    D: ClaimsSource + ?Sized,
{
    let token = token.ok_or(AccessDenied::MissingToken)?;
    let claims = claims_decoder.decode(token)?;

    if let Some(policy) = policy {
        if !policy.permits(&claims.role) {
            return Err(AccessDenied::InsufficientRole { role: claims.role });
        }
    }

    Ok(claims)
}

/// evaluate
///
/// `check`, folded into the navigation decision the router acts on.
pub fn evaluate<D>(
    token: Option<&str>,
    claims_decoder: &D,
    policy: Option<&AccessPolicy>,
    current_location: Location,
) -> NavigationTarget
where
    D: ClaimsSource + ?Sized,
{
    match check(token, claims_decoder, policy) {
        Ok(_) => NavigationTarget::RenderContent,
        Err(denied) => denied.into_target(current_location),
    }
}

/// AccessGuard
///
/// Binds the guard to its injected collaborators: the token store, the entry
/// name the token lives under, and the claims source. Each call reads the store
/// exactly once and never writes to it.
#[derive(Clone)]
pub struct AccessGuard {
    store: TokenSourceState,
    claims: ClaimsSourceState,
    token_key: String,
}

impl AccessGuard {
    pub fn new(store: TokenSourceState, claims: ClaimsSourceState, token_key: impl Into<String>) -> Self {
        Self {
            store,
            claims,
            token_key: token_key.into(),
        }
    }

    pub fn check(&self, policy: Option<&AccessPolicy>) -> Result<Claims, AccessDenied> {
        let token = self.store.get(&self.token_key);
        check(token.as_deref(), self.claims.as_ref(), policy)
    }

    pub fn evaluate(&self, policy: Option<&AccessPolicy>, current_location: Location) -> NavigationTarget {
        let token = self.store.get(&self.token_key);
        evaluate(token.as_deref(), self.claims.as_ref(), policy, current_location)
    }
}
