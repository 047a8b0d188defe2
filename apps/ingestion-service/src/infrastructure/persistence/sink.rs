//! `RowSink` adapter over the atomic writer.

use async_trait::async_trait;

use super::rows::TableRow;
use super::schema::TableHandle;
use super::writer::AtomicRowWriter;
use crate::application::ports::{RowSink, WriteError};

/// Writes one row type into its stream's table.
#[derive(Debug, Clone)]
pub struct TableSink<R> {
    writer: AtomicRowWriter,
    table: TableHandle<R>,
}

impl<R: TableRow> TableSink<R> {
    /// Bind `writer` to the table behind `table`.
    #[must_use]
    pub const fn new(writer: AtomicRowWriter, table: TableHandle<R>) -> Self {
        Self { writer, table }
    }
}

#[async_trait]
impl<R: TableRow> RowSink<R> for TableSink<R> {
    async fn write_all(&self, rows: &[R]) -> Result<usize, WriteError> {
        self.writer.write_all(rows, &self.table).await
    }
}
