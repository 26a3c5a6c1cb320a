use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

// 1. PlaceholderSource Contract
/// PlaceholderSource
///
/// Where the placeholder value shown on the landing page comes from. Swappable
/// so the handler can be exercised without network access.
#[async_trait]
pub trait PlaceholderSource: Send + Sync {
    async fn fetch(&self) -> Result<Value, String>;
}

// 2. The Real Implementation (HTTP)
/// HttpPlaceholderSource
///
/// Fetches a JSON document from a fixed upstream URL with reqwest.
#[derive(Clone)]
pub struct HttpPlaceholderSource {
    client: reqwest::Client,
    url: String,
}

impl HttpPlaceholderSource {
    /// Fails when the HTTP client cannot be built (e.g. the TLS backend does
    /// not initialise), rather than falling back to a client without a timeout.
    pub fn new(url: &str) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl PlaceholderSource for HttpPlaceholderSource {
    async fn fetch(&self) -> Result<Value, String> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !response.status().is_success() {
            return Err(format!("upstream answered {}", response.status()));
        }

        response.json::<Value>().await.map_err(|e| e.to_string())
    }
}

// 3. The Mock Implementation (For Tests)
/// MockPlaceholderSource
///
/// Returns a fixed value, or a simulated failure.
#[derive(Clone)]
pub struct MockPlaceholderSource {
    pub value: Value,
    /// When true, every fetch fails.
    pub should_fail: bool,
}

impl MockPlaceholderSource {
    pub fn new(value: Value) -> Self {
        Self {
            value,
            should_fail: false,
        }
    }

    pub fn new_failing() -> Self {
        Self {
            value: Value::Null,
            should_fail: true,
        }
    }
}

#[async_trait]
impl PlaceholderSource for MockPlaceholderSource {
    async fn fetch(&self) -> Result<Value, String> {
        if self.should_fail {
            return Err("Mock Placeholder Error: Simulation requested".to_string());
        }
        Ok(self.value.clone())
    }
}

/// PlaceholderState
///
/// The concrete type used to share the placeholder source across the application state.
pub type PlaceholderState = Arc<dyn PlaceholderSource>;
