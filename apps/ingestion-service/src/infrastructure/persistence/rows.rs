//! Column layout and parameter binding for each persisted row type.

use sqlx::Sqlite;
use sqlx::query::Query;
use sqlx::sqlite::SqliteArguments;
use sqlx::types::Json;

use crate::domain::events::Event;
use crate::domain::market::MarketRow;
use crate::domain::stream::Stream;

/// Insert query over borrowed row data.
pub type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

/// A row type with a fixed destination table.
pub trait TableRow: Send + Sync {
    /// Stream whose table receives this row.
    const STREAM: Stream;

    /// Insert columns, in bind order.
    const COLUMNS: &'static [&'static str];

    /// Bind one value per entry of `COLUMNS`, in the same order.
    fn bind_columns<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q>;
}

impl TableRow for Event {
    const STREAM: Stream = Stream::Events;

    const COLUMNS: &'static [&'static str] = &["timestamp", "level", "source", "message", "context"];

    fn bind_columns<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(self.timestamp)
            .bind(self.level.as_str())
            .bind(self.source.as_str())
            .bind(self.message.as_str())
            .bind(Json(&self.context))
    }
}

impl TableRow for MarketRow {
    const STREAM: Stream = Stream::MarketData;

    const COLUMNS: &'static [&'static str] = &[
        "request_id",
        "response_time",
        "instrument",
        "timestamp",
        "last_trade_time",
        "last_price",
        "close_price",
        "last_quantity",
        "buy_quantity",
        "sell_quantity",
        "volume",
        "average_price",
        "oi",
        "poi",
        "oi_day_high",
        "oi_day_low",
        "net_change",
        "lower_circuit_limit",
        "upper_circuit_limit",
        "yl",
        "yh",
        "ohlc_open",
        "ohlc_high",
        "ohlc_low",
        "ohlc_close",
        "ohlc_volume",
    ];

    fn bind_columns<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(self.request_id.as_str())
            .bind(self.response_time)
            .bind(self.instrument.as_str())
            .bind(self.timestamp)
            .bind(self.last_trade_time)
            .bind(self.last_price)
            .bind(self.close_price)
            .bind(self.last_quantity)
            .bind(self.buy_quantity)
            .bind(self.sell_quantity)
            .bind(self.volume)
            .bind(self.average_price)
            .bind(self.oi)
            .bind(self.poi)
            .bind(self.oi_day_high)
            .bind(self.oi_day_low)
            .bind(self.net_change)
            .bind(self.lower_circuit_limit)
            .bind(self.upper_circuit_limit)
            .bind(self.yl)
            .bind(self.yh)
            .bind(self.ohlc.open)
            .bind(self.ohlc.high)
            .bind(self.ohlc.low)
            .bind(self.ohlc.close)
            .bind(self.ohlc.volume)
    }
}
