//! Flattened market row.

use chrono::{DateTime, NaiveDateTime, Utc};

use super::envelope::Ohlc;

/// The five OHLC columns of a row.
///
/// The destination schema has no null representation for these, so an
/// absent upstream OHLC is stored as all zeros.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OhlcColumns {
    /// Open.
    pub open: f64,
    /// High.
    pub high: f64,
    /// Low.
    pub low: f64,
    /// Close.
    pub close: f64,
    /// Volume.
    pub volume: i64,
}

impl From<Ohlc> for OhlcColumns {
    fn from(ohlc: Ohlc) -> Self {
        Self {
            open: ohlc.open.unwrap_or_default(),
            high: ohlc.high.unwrap_or_default(),
            low: ohlc.low.unwrap_or_default(),
            close: ohlc.close.unwrap_or_default(),
            volume: ohlc.volume.unwrap_or_default(),
        }
    }
}

impl OhlcColumns {
    /// Whether every column is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

/// One fixed-width row per instrument per envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketRow {
    /// Envelope request id.
    pub request_id: String,
    /// Envelope response time.
    pub response_time: DateTime<Utc>,
    /// Instrument identifier.
    pub instrument: String,
    /// Parsed snapshot capture time.
    pub timestamp: NaiveDateTime,
    /// Parsed last trade time (sentinel-corrected).
    pub last_trade_time: NaiveDateTime,
    /// Last traded price.
    pub last_price: f64,
    /// Previous close.
    pub close_price: f64,
    /// Quantity of the last trade.
    pub last_quantity: i64,
    /// Buy-side quantity.
    pub buy_quantity: f64,
    /// Sell-side quantity.
    pub sell_quantity: f64,
    /// Traded volume.
    pub volume: i64,
    /// Average price.
    pub average_price: f64,
    /// Open interest.
    pub oi: f64,
    /// Previous open interest.
    pub poi: f64,
    /// Day's highest open interest.
    pub oi_day_high: f64,
    /// Day's lowest open interest.
    pub oi_day_low: f64,
    /// Change from previous close.
    pub net_change: f64,
    /// Lower circuit limit.
    pub lower_circuit_limit: f64,
    /// Upper circuit limit.
    pub upper_circuit_limit: f64,
    /// Year low.
    pub yl: f64,
    /// Year high.
    pub yh: f64,
    /// OHLC columns (zeros when absent upstream).
    pub ohlc: OhlcColumns,
    /// Whether the upstream snapshot carried an OHLC block. Not persisted.
    pub ohlc_present: bool,
}
