#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::significant_drop_tightening,
        clippy::needless_pass_by_value
    )
)]

//! Market Poller
//!
//! Periodically fetches a batch of instrument quotes from the upstream API
//! while the market is open and forwards each response, unchanged, to the
//! ingestion service. Every cycle step is also reported to the ingestion
//! service as an application event.
//!
//! # Cycle
//!
//! ```text
//! gate ──closed──► event "Market is closed"
//!   │
//!   open ──► GET upstream ──200──► POST /ingest/marketdata ──202──► event "Successfully ingested"
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

/// Environment-driven configuration.
pub mod config;

/// Cycle errors.
pub mod error;

/// Best-effort event reporting.
pub mod events;

/// The fetch-and-forward cycle and its loop.
pub mod poller;

pub use config::PollerConfig;
pub use error::PollError;
pub use events::{EVENT_SOURCE, EventReporter};
pub use poller::{CycleOutcome, MarketPoller};
