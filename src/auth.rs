use base64::{
    Engine, alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};
use parking_lot::RwLock;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use ts_rs::TS;
use utoipa::ToSchema;

use crate::config::ClaimsMode;

/// Claims
///
/// The payload carried inside a credential token. Only `role` is required; the
/// remaining fields are validity metadata that the guard reads but never enforces,
/// so a value of an unexpected shape is dropped instead of failing the decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Claims {
    /// The RBAC field checked against an access policy (e.g. 'admin', 'editor', 'viewer').
    pub role: String,
    /// Subject (sub): identifier of the authenticated user. Numeric subjects are kept as text.
    #[serde(
        default,
        deserialize_with = "lenient_subject",
        skip_serializing_if = "Option::is_none"
    )]
    pub sub: Option<String>,
    /// Issued At (iat), NumericDate: seconds since the epoch, fractions allowed.
    #[serde(
        default,
        deserialize_with = "lenient_numeric_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub iat: Option<f64>,
    /// Expiration Time (exp), NumericDate. Not checked here.
    #[serde(
        default,
        deserialize_with = "lenient_numeric_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub exp: Option<f64>,
}

fn lenient_subject<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(sub) => Some(sub),
        Value::Number(sub) => Some(sub.to_string()),
        _ => None,
    })
}

fn lenient_numeric_date<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(date) => date.as_f64(),
        Value::String(date) => date.trim().parse().ok(),
        _ => None,
    })
}

impl Claims {
    /// Builds claims holding only a role. Mostly useful for tests and custom sources.
    pub fn with_role(role: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            sub: None,
            iat: None,
            exp: None,
        }
    }
}

/// DecodeError
///
/// Why a token could not be turned into usable claims.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Not a JWT, bad base64/JSON, or a payload without a `role`.
    #[error("malformed token: {0}")]
    Malformed(String),
    /// A custom claims source refused the token outright.
    #[error("token rejected by claims source")]
    Rejected,
}

/// ClaimsSource Contract
///
/// Where the guard gets claims from. Implementations must be pure from the
/// guard's point of view: the same token yields the same result.
pub trait ClaimsSource: Send + Sync {
    fn decode(&self, token: &str) -> Result<Claims, DecodeError>;
}

/// Plain functions and closures work as claims sources, which keeps tests short.
impl<F> ClaimsSource for F
where
    F: Fn(&str) -> Result<Claims, DecodeError> + Send + Sync,
{
    fn decode(&self, token: &str) -> Result<Claims, DecodeError> {
        self(token)
    }
}

/// ClaimsSourceState
///
/// The shared handle stored in `AppState`.
pub type ClaimsSourceState = Arc<dyn ClaimsSource>;

/// Base64url as found in JWT segments; padded and unpadded input both decode.
const SEGMENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

fn decode_segment(segment: &str, name: &str) -> Result<Vec<u8>, DecodeError> {
    SEGMENT
        .decode(segment)
        .map_err(|e| DecodeError::Malformed(format!("{name} is not base64url: {e}")))
}

/// UnverifiedDecoder
///
/// Extracts the claims segment of a compact JWT without any key. The header
/// must be a JSON object but its `alg` is never looked at, so HMAC, RSA, EC,
/// EdDSA and `none` tokens all decode alike. Signature, expiry and audience
/// are left to whoever issued the token.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnverifiedDecoder;

impl UnverifiedDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl ClaimsSource for UnverifiedDecoder {
    fn decode(&self, token: &str) -> Result<Claims, DecodeError> {
        let mut segments = token.split('.');
        let (Some(header), Some(payload), Some(_signature), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(DecodeError::Malformed(
                "expected three dot-separated segments".to_string(),
            ));
        };

        let header = decode_segment(header, "header")?;
        match serde_json::from_slice::<Value>(&header) {
            Ok(Value::Object(_)) => {}
            Ok(_) => return Err(DecodeError::Malformed("header is not a JSON object".to_string())),
            Err(e) => return Err(DecodeError::Malformed(format!("header: {e}"))),
        }

        let payload = decode_segment(payload, "payload")?;
        serde_json::from_slice::<Claims>(&payload)
            .map_err(|e| DecodeError::Malformed(format!("payload: {e}")))
    }
}

/// claims_source_for
///
/// The claims source the server wires into `AppState`, as selected by `CLAIMS_SOURCE`.
pub fn claims_source_for(mode: &ClaimsMode) -> ClaimsSourceState {
    match mode {
        ClaimsMode::Direct => Arc::new(UnverifiedDecoder::new()),
        ClaimsMode::Session => Arc::new(AuthSession::new(UnverifiedDecoder::new())),
    }
}

/// AuthSession
///
/// Cached authentication state. Remembers the last token it saw together with
/// its claims and only asks the inner source again once the token changes.
/// A failed decode forgets whatever was cached.
///
/// One slot only: meant for a process acting for a single user (a client holding
/// a `MemoryTokenStore`). A server with many concurrent users keeps swapping the
/// slot, which stays correct but saves nothing.
pub struct AuthSession<S> {
    source: S,
    observed: RwLock<Option<(String, Claims)>>,
}

impl<S: ClaimsSource> AuthSession<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            observed: RwLock::new(None),
        }
    }

    /// The claims of the currently observed session, if any.
    pub fn current(&self) -> Option<Claims> {
        self.observed
            .read()
            .as_ref()
            .map(|(_, claims)| claims.clone())
    }

    /// Drops the cached state, e.g. on logout.
    pub fn sign_out(&self) {
        *self.observed.write() = None;
    }
}

impl<S: ClaimsSource> ClaimsSource for AuthSession<S> {
    fn decode(&self, token: &str) -> Result<Claims, DecodeError> {
        if let Some((cached_token, claims)) = self.observed.read().as_ref() {
            if cached_token == token {
                return Ok(claims.clone());
            }
        }

        match self.source.decode(token) {
            Ok(claims) => {
                *self.observed.write() = Some((token.to_string(), claims.clone()));
                Ok(claims)
            }
            Err(err) => {
                self.sign_out();
                Err(err)
            }
        }
    }
}
