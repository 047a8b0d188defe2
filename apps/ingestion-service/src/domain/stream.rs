//! Ingestion streams.
//!
//! Each stream owns exactly one destination table.

use std::fmt;

/// A logical ingestion stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stream {
    /// Free-form application events.
    Events,
    /// Flattened market-data snapshots.
    MarketData,
}

impl Stream {
    /// Stable label used in logs and metrics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Events => "events",
            Self::MarketData => "market_data",
        }
    }

    /// Name of the destination table owned by this stream.
    #[must_use]
    pub const fn table_name(self) -> &'static str {
        match self {
            Self::Events => "events",
            Self::MarketData => "market_data",
        }
    }
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
