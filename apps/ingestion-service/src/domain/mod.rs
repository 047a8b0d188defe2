//! Domain Layer - Ingestion records and pure transformations.
//!
//! Everything in this layer is synchronous and free of I/O: decoding
//! payloads, flattening market snapshots into rows, and deciding whether
//! the market is open.

/// Flexible single-or-batch JSON decoding.
pub mod decoder;

/// Application event records.
pub mod events;

/// Market-data envelopes, snapshots, and flattened rows.
pub mod market;

/// Market-hours gate for polling cycles.
pub mod market_hours;

/// Stream identifiers shared by schema, metrics, and reports.
pub mod stream;
