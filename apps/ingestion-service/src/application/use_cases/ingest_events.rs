//! Ingest Events Use Case

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use super::report::{IngestError, IngestReport};
use crate::application::ports::RowSink;
use crate::domain::decoder::decode;
use crate::domain::events::Event;
use crate::domain::stream::Stream;

/// Use case for ingesting one or many events from a request body.
pub struct IngestEventsUseCase<S>
where
    S: RowSink<Event>,
{
    sink: Arc<S>,
}

impl<S> IngestEventsUseCase<S>
where
    S: RowSink<Event>,
{
    /// Create a new `IngestEventsUseCase`.
    pub const fn new(sink: Arc<S>) -> Self {
        Self { sink }
    }

    /// Decode the payload and write every event in one transaction.
    #[instrument(name = "ingest_events", skip_all, fields(bytes = payload.len()))]
    pub async fn execute(&self, payload: &[u8]) -> Result<IngestReport, IngestError> {
        let events: Vec<Event> = decode(payload).inspect_err(|e| {
            warn!(error = %e, "Rejected event payload");
        })?;

        if events.is_empty() {
            return Err(IngestError::NoRecords);
        }

        debug!(records = events.len(), "Decoded events");
        let ingested = self.sink.write_all(&events).await?;

        Ok(IngestReport::rows(Stream::Events, ingested))
    }
}
