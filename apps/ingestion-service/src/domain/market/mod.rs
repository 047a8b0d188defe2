//! Market Data
//!
//! Third-party quote envelopes and the fixed-width rows they flatten into.
//!
//! # Data Flow
//!
//! ```text
//! JSON envelope ──► MarketEnvelope ──► flatten() ──► Vec<MarketRow>
//!                   (instrument → Snapshot)           (one per instrument)
//! ```

mod envelope;
mod flatten;
mod row;

pub use envelope::{EnvelopeError, MarketEnvelope, Ohlc, Snapshot};
pub use flatten::{
    FlattenError, NO_TRADE_SENTINEL, SNAPSHOT_TIME_FORMAT, flatten, unknown_last_trade_time,
};
pub use row::{MarketRow, OhlcColumns};
