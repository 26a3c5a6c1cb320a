use std::env;

use crate::token_store::DEFAULT_TOKEN_KEY;

/// AppConfig
///
/// Holds the application's entire configuration state. Immutable once loaded and
/// shared with handlers and middleware through `FromRef`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls log format and how strict loading is.
    pub env: Env,
    // Address the HTTP server binds to.
    pub bind_addr: String,
    // Postgres connection string. Optional locally: the server runs without a database.
    pub database_url: Option<String>,
    // Upstream queried by GET /api/placeholder.
    pub placeholder_url: String,
    // Name of the token entry (cookie name / store key).
    pub token_key: String,
    // Where unauthenticated callers are sent.
    pub login_path: String,
    // Default view for authenticated callers who lack the required role.
    pub home_path: String,
    // Which claims source the server wires in (CLAIMS_SOURCE).
    pub claims_mode: ClaimsMode,
}

/// Env
///
/// Defines the runtime context.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

/// ClaimsMode
///
/// `direct` decodes every token it is handed. `session` puts a single-slot
/// `AuthSession` cache in front of the decoder, for single-user deployments.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub enum ClaimsMode {
    #[default]
    Direct,
    Session,
}

impl ClaimsMode {
    fn from_env_value(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "session" => ClaimsMode::Session,
            _ => ClaimsMode::Direct,
        }
    }
}

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_PLACEHOLDER_URL: &str = "https://jsonplaceholder.typicode.com/todos/1";
const DEFAULT_LOGIN_PATH: &str = "/login";
const DEFAULT_HOME_PATH: &str = "/dashboard";

impl Default for AppConfig {
    /// default
    ///
    /// Safe, non-panicking values for test setup. No database, and a placeholder
    /// URL that tests are expected to replace with a mock source anyway.
    fn default() -> Self {
        Self {
            env: Env::Local,
            bind_addr: "127.0.0.1:0".to_string(),
            database_url: None,
            placeholder_url: DEFAULT_PLACEHOLDER_URL.to_string(),
            token_key: DEFAULT_TOKEN_KEY.to_string(),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            home_path: DEFAULT_HOME_PATH.to_string(),
            claims_mode: ClaimsMode::Direct,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables, failing fast.
    ///
    /// # Panics
    /// Panics in production when `DATABASE_URL` is missing, so a misconfigured
    /// deployment never starts serving.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let database_url = match env {
            Env::Production => Some(
                env::var("DATABASE_URL").expect("FATAL: DATABASE_URL required in prod"),
            ),
            Env::Local => env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
        };

        Self {
            env,
            bind_addr: var_or("BIND_ADDR", DEFAULT_BIND_ADDR),
            database_url,
            placeholder_url: var_or("PLACEHOLDER_URL", DEFAULT_PLACEHOLDER_URL),
            token_key: var_or("TOKEN_KEY", DEFAULT_TOKEN_KEY),
            login_path: var_or("LOGIN_PATH", DEFAULT_LOGIN_PATH),
            home_path: var_or("HOME_PATH", DEFAULT_HOME_PATH),
            claims_mode: ClaimsMode::from_env_value(&var_or("CLAIMS_SOURCE", "direct")),
        }
    }
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string())
}
