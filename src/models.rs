use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;
use utoipa::{IntoParams, ToSchema};

/// PlaceholderValue
///
/// What the landing page renders: the upstream document and when it was fetched.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct PlaceholderValue {
    #[ts(type = "unknown")]
    #[schema(value_type = Object)]
    pub value: Value,
    #[ts(type = "string")]
    pub fetched_at: DateTime<Utc>,
}

/// ViewResponse
///
/// Body of every protected view. Only reachable after the guard rendered it.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ViewResponse {
    pub view: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

/// LoginQuery
///
/// Query string of the login view; `redirect` is the location remembered by the guard.
#[derive(Debug, Deserialize, IntoParams)]
pub struct LoginQuery {
    pub redirect: Option<String>,
}

/// LoginView
///
/// The login view tells the client where to return after authenticating.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginView {
    pub view: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}
