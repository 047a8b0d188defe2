//! Application Use Cases
//!
//! One use case per stream. Each takes the raw request body and returns a
//! report of what was committed.

mod ingest_events;
mod ingest_market_data;
mod report;

pub use ingest_events::IngestEventsUseCase;
pub use ingest_market_data::IngestMarketDataUseCase;
pub use report::{IngestError, IngestReport};
