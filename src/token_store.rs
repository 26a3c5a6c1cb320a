use axum::http::{HeaderMap, header};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Name of the entry holding the current credential token.
pub const DEFAULT_TOKEN_KEY: &str = "token";

/// TokenSource Contract
///
/// Where the guard reads the current token from. Reading is all the guard
/// ever does, so this is the only capability it asks for.
pub trait TokenSource: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
}

/// TokenStore Contract
///
/// A token source that can also be written, at login and logout.
pub trait TokenStore: TokenSource {
    fn set(&self, key: &str, value: String);
    fn remove(&self, key: &str);
}

/// TokenSourceState
///
/// The shared handle type, mirroring how the other collaborators are passed around.
pub type TokenSourceState = Arc<dyn TokenSource>;

/// MemoryTokenStore
///
/// Process-wide store, one per running application.
#[derive(Default)]
pub struct MemoryTokenStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenSource for MemoryTokenStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }
}

impl TokenStore for MemoryTokenStore {
    fn set(&self, key: &str, value: String) {
        self.entries.write().insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) {
        self.entries.write().remove(key);
    }
}

/// RequestTokens
///
/// Read-only view of the token carried by a single HTTP request, answering
/// only for the configured token key.
///
/// Resolution order: the `Authorization: Bearer` header, then the cookie named
/// after the token key. Empty values count as absent.
#[derive(Debug, Clone)]
pub struct RequestTokens {
    token_key: String,
    token: Option<String>,
}

impl RequestTokens {
    pub fn from_headers(headers: &HeaderMap, token_key: &str) -> Self {
        let bearer = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty());

        let cookie = || {
            headers
                .get_all(header::COOKIE)
                .iter()
                .filter_map(|value| value.to_str().ok())
                .flat_map(|line| line.split(';'))
                .filter_map(|pair| pair.trim().split_once('='))
                .find(|(name, value)| *name == token_key && !value.is_empty())
                .map(|(_, value)| value)
        };

        Self {
            token_key: token_key.to_string(),
            token: bearer.or_else(cookie).map(str::to_string),
        }
    }
}

impl TokenSource for RequestTokens {
    fn get(&self, key: &str) -> Option<String> {
        if key == self.token_key {
            self.token.clone()
        } else {
            None
        }
    }
}
