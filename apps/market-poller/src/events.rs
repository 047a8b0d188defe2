//! Event Reporter
//!
//! Sends one application event per cycle step to the event ingest endpoint.
//! Reporting is best effort: delivery failures are logged at WARN and never
//! fail the cycle that produced them.

use ingestion_service::{Event, EventLevel};
use reqwest::{Client, StatusCode, Url};

/// Source recorded on every event the poller emits.
pub const EVENT_SOURCE: &str = "market-poller";

/// Posts events to the ingest service as one-element batches.
#[derive(Debug, Clone)]
pub struct EventReporter {
    client: Client,
    url: Url,
}

impl EventReporter {
    /// Create a reporter posting to `url`.
    #[must_use]
    pub const fn new(client: Client, url: Url) -> Self {
        Self { client, url }
    }

    /// Report an event with the given context entries.
    pub async fn report(&self, level: EventLevel, message: &str, context: &[(&str, String)]) {
        let event = context.iter().fold(
            Event::new(level, EVENT_SOURCE, message),
            |event, (key, value)| event.with_context(*key, value.clone()),
        );

        match self.client.post(self.url.clone()).json(&[event]).send().await {
            Ok(response) if response.status() == StatusCode::ACCEPTED => {}
            Ok(response) => {
                tracing::warn!(
                    status = response.status().as_u16(),
                    event = message,
                    "Events endpoint gave non-202 status"
                );
            }
            Err(e) => {
                tracing::warn!(error = %e, event = message, "Failed to post event");
            }
        }
    }
}
