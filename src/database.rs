use sqlx::{PgPool, postgres::PgPoolOptions};
use std::time::Duration;

/// connect
///
/// Opens the Postgres pool. A failure is logged and swallowed: the greeting and
/// guarded views do not need the database, so the server keeps running without it.
pub async fn connect(db_url: &str) -> Option<PgPool> {
    let result = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(5))
        .connect(db_url)
        .await;

    match result {
        Ok(pool) => {
            tracing::info!("Connected to database");
            Some(pool)
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to database");
            None
        }
    }
}
