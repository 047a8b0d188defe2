//! Atomic Row Writer
//!
//! Writes a batch of rows in a single transaction: the insert statement is
//! prepared once, executed per row in input order, and committed only when
//! every row succeeded. Any failure rolls the transaction back before the
//! error is returned. There are no internal retries.
//!
//! The whole transaction runs under a deadline. When it expires the
//! in-flight transaction is dropped, which rolls it back.

use std::time::{Duration, Instant};

use sqlx::{Executor, Sqlite, SqlitePool, Statement, Transaction};
use tracing::{debug, instrument, warn};

use super::rows::TableRow;
use super::schema::TableHandle;
use crate::application::ports::WriteError;
use crate::infrastructure::metrics;

/// Transactional batch writer over a connection pool.
#[derive(Debug, Clone)]
pub struct AtomicRowWriter {
    pool: SqlitePool,
    deadline: Duration,
}

impl AtomicRowWriter {
    /// Create a writer whose batches must finish within `deadline`.
    #[must_use]
    pub const fn new(pool: SqlitePool, deadline: Duration) -> Self {
        Self { pool, deadline }
    }

    /// Write all rows into `table`, or none of them.
    ///
    /// An empty batch returns `Ok(0)` without opening a transaction.
    #[instrument(skip_all, fields(table = table.table(), rows = rows.len()))]
    pub async fn write_all<R: TableRow>(
        &self,
        rows: &[R],
        table: &TableHandle<R>,
    ) -> Result<usize, WriteError> {
        if rows.is_empty() {
            return Ok(0);
        }

        let started = Instant::now();
        let result = tokio::time::timeout(self.deadline, self.write_in_transaction(rows, table))
            .await
            .unwrap_or(Err(WriteError::DeadlineExceeded {
                deadline: self.deadline,
            }));

        match &result {
            Ok(written) => {
                metrics::record_write_duration(table.stream(), started.elapsed());
                debug!(written, "Batch committed");
            }
            Err(e) => {
                metrics::record_write_failure(table.stream(), e.stage());
                warn!(error = %e, "Batch rolled back");
            }
        }

        result
    }

    async fn write_in_transaction<R: TableRow>(
        &self,
        rows: &[R],
        table: &TableHandle<R>,
    ) -> Result<usize, WriteError> {
        let mut tx = self.pool.begin().await.map_err(|e| WriteError::Begin {
            message: e.to_string(),
        })?;

        let statement = match (&mut *tx).prepare(table.insert_sql()).await {
            Ok(statement) => statement,
            Err(e) => {
                rollback(tx).await;
                return Err(WriteError::Prepare {
                    message: e.to_string(),
                });
            }
        };

        for (index, row) in rows.iter().enumerate() {
            if let Err(e) = row.bind_columns(statement.query()).execute(&mut *tx).await {
                rollback(tx).await;
                return Err(WriteError::Execute {
                    index,
                    message: e.to_string(),
                });
            }
        }

        tx.commit().await.map_err(|e| WriteError::Commit {
            message: e.to_string(),
        })?;

        Ok(rows.len())
    }
}

async fn rollback(tx: Transaction<'static, Sqlite>) {
    if let Err(e) = tx.rollback().await {
        // The connection discards the transaction when it is returned.
        warn!(error = %e, "Explicit rollback failed");
    }
}
