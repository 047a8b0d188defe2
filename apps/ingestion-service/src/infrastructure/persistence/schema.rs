//! Schema Owner
//!
//! Each stream owns exactly one table. `ensure_schema` creates it and its
//! ordering index if missing and hands back the handle the writer inserts
//! through. It runs once per stream at start-up and is safe to repeat.

use std::fmt;
use std::marker::PhantomData;

use sqlx::SqlitePool;
use tracing::info;

use super::PersistenceError;
use super::rows::TableRow;
use crate::domain::stream::Stream;

const EVENTS_DDL: &[&str] = &[
    r"
    CREATE TABLE IF NOT EXISTS events (
        timestamp TEXT NOT NULL,
        level     TEXT NOT NULL,
        source    TEXT NOT NULL,
        message   TEXT NOT NULL,
        context   TEXT NOT NULL DEFAULT '{}'
    )
    ",
    "CREATE INDEX IF NOT EXISTS events_source_timestamp ON events (source, timestamp)",
];

const MARKET_DATA_DDL: &[&str] = &[
    r"
    CREATE TABLE IF NOT EXISTS market_data (
        request_id          TEXT    NOT NULL,
        response_time       TEXT    NOT NULL,
        instrument          TEXT    NOT NULL,
        timestamp           TEXT    NOT NULL,
        last_trade_time     TEXT    NOT NULL,
        last_price          REAL    NOT NULL,
        close_price         REAL    NOT NULL,
        last_quantity       INTEGER NOT NULL,
        buy_quantity        REAL    NOT NULL,
        sell_quantity       REAL    NOT NULL,
        volume              INTEGER NOT NULL,
        average_price       REAL    NOT NULL,
        oi                  REAL    NOT NULL,
        poi                 REAL    NOT NULL,
        oi_day_high         REAL    NOT NULL,
        oi_day_low          REAL    NOT NULL,
        net_change          REAL    NOT NULL,
        lower_circuit_limit REAL    NOT NULL,
        upper_circuit_limit REAL    NOT NULL,
        yl                  REAL    NOT NULL,
        yh                  REAL    NOT NULL,
        ohlc_open           REAL    NOT NULL,
        ohlc_high           REAL    NOT NULL,
        ohlc_low            REAL    NOT NULL,
        ohlc_close          REAL    NOT NULL,
        ohlc_volume         INTEGER NOT NULL
    )
    ",
    "CREATE INDEX IF NOT EXISTS market_data_instrument_timestamp ON market_data (instrument, timestamp)",
];

const fn ddl(stream: Stream) -> &'static [&'static str] {
    match stream {
        Stream::Events => EVENTS_DDL,
        Stream::MarketData => MARKET_DATA_DDL,
    }
}

/// Proof that a stream's table exists, typed by the rows it accepts.
pub struct TableHandle<R> {
    insert_sql: String,
    _row: PhantomData<fn() -> R>,
}

impl<R: TableRow> TableHandle<R> {
    fn new() -> Self {
        let table = R::STREAM.table_name();
        let columns = R::COLUMNS.join(", ");
        let placeholders = vec!["?"; R::COLUMNS.len()].join(", ");

        Self {
            insert_sql: format!("INSERT INTO {table} ({columns}) VALUES ({placeholders})"),
            _row: PhantomData,
        }
    }

    /// Destination table name.
    #[must_use]
    pub const fn table(&self) -> &'static str {
        R::STREAM.table_name()
    }

    /// Stream that owns the table.
    #[must_use]
    pub const fn stream(&self) -> Stream {
        R::STREAM
    }

    pub(super) fn insert_sql(&self) -> &str {
        &self.insert_sql
    }
}

impl<R> Clone for TableHandle<R> {
    fn clone(&self) -> Self {
        Self {
            insert_sql: self.insert_sql.clone(),
            _row: PhantomData,
        }
    }
}

impl<R> fmt::Debug for TableHandle<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableHandle")
            .field("insert_sql", &self.insert_sql)
            .finish()
    }
}

/// Create the table and ordering index for `R`'s stream if missing.
pub async fn ensure_schema<R: TableRow>(
    pool: &SqlitePool,
) -> Result<TableHandle<R>, PersistenceError> {
    let table = R::STREAM.table_name();

    for statement in ddl(R::STREAM) {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| PersistenceError::Schema {
                table,
                message: e.to_string(),
            })?;
    }

    info!(table, stream = %R::STREAM, "Table ready for ingestion");
    Ok(TableHandle::new())
}
