#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::items_after_statements
    )
)]

//! Ingestion Service - Events and Market Data
//!
//! Accepts two heterogeneous streams over HTTP and writes each request
//! atomically to its own table.
//!
//! # Layers (inside → outside)
//!
//! - **Domain**: Records and pure transformations
//!   - `decoder`: single-or-batch JSON decoding
//!   - `events`: application event records
//!   - `market`: envelopes, snapshot flattening, fixed-width rows
//!   - `market_hours`: trading-window gate
//!
//! - **Application**: Use cases and port definitions
//!   - `ports`: the atomic `RowSink`
//!   - `use_cases`: ingest events, ingest market data
//!
//! - **Infrastructure**: Adapters and external integrations
//!   - `persistence`: SQLite schema owner and atomic writer
//!   - `http`: axum routes, health, metrics
//!   - `config`, `metrics`, `telemetry`
//!
//! # Data Flow
//!
//! ```text
//! payload ──► decoder ──► (market) flatten ──► atomic writer ──► store
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Domain layer - Records and pure transformations with no I/O.
pub mod domain;

/// Application layer - Use cases and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Re-exports
// =============================================================================

// Domain types
pub use domain::decoder::{DecodeError, PayloadShape, decode};
pub use domain::events::{Event, EventLevel};
pub use domain::market::{FlattenError, MarketEnvelope, MarketRow, Snapshot, flatten};
pub use domain::market_hours::{MarketHours, is_open};
pub use domain::stream::Stream;

// Application
pub use application::ports::{InMemoryRowSink, RowSink, WriteError};
pub use application::use_cases::{
    IngestError, IngestEventsUseCase, IngestMarketDataUseCase, IngestReport,
};

// Infrastructure
pub use infrastructure::config::{ConfigError, ServiceConfig};
pub use infrastructure::http::{AppState, HttpServer, create_router};
pub use infrastructure::metrics::init_metrics;
pub use infrastructure::persistence::{
    AtomicRowWriter, PersistenceError, TableHandle, TableSink, connect, ensure_schema,
};
pub use infrastructure::telemetry::{TelemetryConfig, init as init_telemetry};
