//! Persistence errors.

use thiserror::Error;

/// Errors from connecting to or migrating the store.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Database connection error.
    #[error("Database connection error: {0}")]
    Connection(String),

    /// Schema statement failed.
    #[error("Schema error on table {table}: {message}")]
    Schema {
        /// Table being created.
        table: &'static str,
        /// Driver message.
        message: String,
    },
}

impl From<sqlx::Error> for PersistenceError {
    fn from(err: sqlx::Error) -> Self {
        Self::Connection(err.to_string())
    }
}
