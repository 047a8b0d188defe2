//! Row Sink Port (Driven Port)
//!
//! Interface for persisting a batch of rows as one all-or-nothing unit.

use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;

/// Failure of an atomic batch write.
///
/// Whatever the variant, the batch has been rolled back before the error is
/// returned and none of its rows are visible.
#[derive(Debug, Clone, thiserror::Error)]
pub enum WriteError {
    /// The transaction could not be opened.
    #[error("Failed to begin transaction: {message}")]
    Begin { message: String },

    /// The insert statement could not be prepared.
    #[error("Failed to prepare insert: {message}")]
    Prepare { message: String },

    /// A row was rejected by the store.
    #[error("Insert of row {index} failed: {message}")]
    Execute { index: usize, message: String },

    /// The transaction could not be committed.
    #[error("Failed to commit transaction: {message}")]
    Commit { message: String },

    /// The batch did not finish before its deadline.
    #[error("Write exceeded deadline of {deadline:?}")]
    DeadlineExceeded { deadline: Duration },
}

impl WriteError {
    /// Stage of the write that failed.
    #[must_use]
    pub const fn stage(&self) -> &'static str {
        match self {
            Self::Begin { .. } => "begin",
            Self::Prepare { .. } => "prepare",
            Self::Execute { .. } => "execute",
            Self::Commit { .. } => "commit",
            Self::DeadlineExceeded { .. } => "deadline",
        }
    }
}

/// Port for writing rows of one table atomically.
#[async_trait]
pub trait RowSink<R>: Send + Sync
where
    R: Send + Sync,
{
    /// Write every row in input order, or none of them.
    ///
    /// Returns the number of rows written.
    async fn write_all(&self, rows: &[R]) -> Result<usize, WriteError>;
}

/// In-memory sink for testing.
///
/// Keeps committed rows in a vector. `failing_at` makes every batch long
/// enough to reach the given index fail, leaving stored rows untouched.
#[derive(Debug)]
pub struct InMemoryRowSink<R> {
    rows: RwLock<Vec<R>>,
    fail_at: Option<usize>,
}

impl<R> Default for InMemoryRowSink<R> {
    fn default() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
            fail_at: None,
        }
    }
}

impl<R: Clone> InMemoryRowSink<R> {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sink that rejects the row at `index` of any batch.
    #[must_use]
    pub fn failing_at(index: usize) -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
            fail_at: Some(index),
        }
    }

    /// Snapshot of committed rows.
    pub fn rows(&self) -> Vec<R> {
        self.rows
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl<R> RowSink<R> for InMemoryRowSink<R>
where
    R: Clone + Send + Sync,
{
    async fn write_all(&self, rows: &[R]) -> Result<usize, WriteError> {
        if let Some(index) = self.fail_at.filter(|i| *i < rows.len()) {
            return Err(WriteError::Execute {
                index,
                message: "injected failure".to_string(),
            });
        }

        self.rows
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .extend_from_slice(rows);
        Ok(rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn in_memory_sink_keeps_rows_in_order() {
        let sink = InMemoryRowSink::new();

        let written = sink.write_all(&[1, 2, 3]).await.unwrap();

        assert_eq!(written, 3);
        assert_eq!(sink.rows(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn failing_sink_stores_nothing() {
        let sink = InMemoryRowSink::failing_at(2);

        let err = sink.write_all(&[1, 2, 3, 4]).await.unwrap_err();

        assert!(matches!(err, WriteError::Execute { index: 2, .. }));
        assert!(sink.rows().is_empty());
    }

    #[tokio::test]
    async fn short_batches_pass_a_failing_sink() {
        let sink = InMemoryRowSink::failing_at(5);

        assert_eq!(sink.write_all(&["a", "b"]).await.unwrap(), 2);
    }

    #[test]
    fn deadline_error_mentions_duration() {
        let err = WriteError::DeadlineExceeded {
            deadline: Duration::from_millis(250),
        };
        assert!(err.to_string().contains("250ms"));
    }
}
