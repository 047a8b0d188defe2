//! Persistence Adapters
//!
//! SQLite-backed storage via `sqlx`.
//!
//! # Components
//!
//! - `connection`: pool creation with retry-on-connect
//! - `schema`: idempotent per-stream table and index creation
//! - `rows`: column layout and parameter binding per row type
//! - `writer`: one-transaction, all-or-nothing batch inserts
//! - `sink`: `RowSink` adapter binding a writer to one table

mod connection;
mod error;
mod rows;
mod schema;
mod sink;
mod writer;

pub use connection::connect;
pub use error::PersistenceError;
pub use rows::TableRow;
pub use schema::{TableHandle, ensure_schema};
pub use sink::TableSink;
pub use writer::AtomicRowWriter;
