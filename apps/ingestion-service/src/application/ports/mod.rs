//! Application Ports
//!
//! Driven ports the use cases depend on. Infrastructure provides the real
//! adapters; the in-memory variants back unit tests.

mod row_sink_port;

pub use row_sink_port::{InMemoryRowSink, RowSink, WriteError};
