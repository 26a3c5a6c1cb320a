use guarded_portal::{
    AppState,
    auth::claims_source_for,
    config::{AppConfig, Env},
    create_router, database,
    placeholder::{HttpPlaceholderSource, PlaceholderState},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Entry point: configuration, logging, database, collaborators, HTTP server.
#[tokio::main]
async fn main() {
    // 1. Configuration & Environment Loading (Fail-Fast)
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging Filter Setup
    // RUST_LOG wins; otherwise debug for this crate so guard decisions are visible.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "guarded_portal=debug,tower_http=info".into());

    // 3. Pretty output locally, JSON for log aggregation in production.
    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // 4. Database: connect or log the error and carry on.
    let db = match config.database_url.as_deref() {
        Some(url) => database::connect(url).await,
        None => {
            tracing::warn!("DATABASE_URL not set, running without a database");
            None
        }
    };

    // 5. Collaborators
    tracing::info!("Claims source: {:?}", config.claims_mode);
    let claims = claims_source_for(&config.claims_mode);
    let placeholder = HttpPlaceholderSource::new(&config.placeholder_url)
        .expect("FATAL: Failed to build the placeholder HTTP client.");
    let placeholder = Arc::new(placeholder) as PlaceholderState;

    let bind_addr = config.bind_addr.clone();
    let app_state = AppState {
        config,
        claims,
        placeholder,
        db,
    };

    // 6. Router and Server Startup
    let app = create_router(app_state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .expect("FATAL: Failed to bind the HTTP listener. Check BIND_ADDR.");

    tracing::info!("Listening on {}", bind_addr);
    tracing::info!("API Documentation (Swagger UI) available at /swagger-ui");

    axum::serve(listener, app)
        .await
        .expect("FATAL: HTTP server terminated unexpectedly");
}
