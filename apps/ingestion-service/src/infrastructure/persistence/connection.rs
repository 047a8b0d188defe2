//! Connection pool creation.

use std::str::FromStr;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::{info, warn};

use super::PersistenceError;
use crate::infrastructure::config::DatabaseSettings;

/// Open a connection pool, retrying with a fixed delay.
///
/// Each attempt opens one connection eagerly so an unreachable store is
/// detected here rather than on the first request.
pub async fn connect(settings: &DatabaseSettings) -> Result<SqlitePool, PersistenceError> {
    let options = SqliteConnectOptions::from_str(&settings.url)?;
    let attempts = settings.connect_attempts.max(1);

    let mut attempt = 1;
    loop {
        match SqlitePoolOptions::new()
            .max_connections(settings.max_connections)
            .connect_with(options.clone())
            .await
        {
            Ok(pool) => {
                info!(
                    max_connections = settings.max_connections,
                    attempt, "SQLite connection pool initialized"
                );
                return Ok(pool);
            }
            Err(e) if attempt < attempts => {
                warn!(
                    attempt,
                    attempts,
                    retry_in_ms = settings.connect_retry_delay.as_millis(),
                    error = %e,
                    "Database connection failed, retrying"
                );
                tokio::time::sleep(settings.connect_retry_delay).await;
                attempt += 1;
            }
            Err(e) => {
                return Err(PersistenceError::Connection(format!(
                    "gave up after {attempts} attempts: {e}"
                )));
            }
        }
    }
}
