//! Poller errors.

use thiserror::Error;

/// Failure of one fetch-and-forward cycle.
///
/// A failed cycle is logged and reported; the poller keeps running and
/// tries again on the next tick.
#[derive(Debug, Error)]
pub enum PollError {
    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The upstream quote request did not complete.
    #[error("upstream request failed: {0}")]
    Fetch(#[source] reqwest::Error),

    /// Upstream answered with something other than 200.
    #[error("upstream returned {status}: {body}")]
    UpstreamStatus {
        /// HTTP status code.
        status: u16,
        /// Response body, as text.
        body: String,
    },

    /// The envelope could not be delivered to the ingest endpoint.
    #[error("ingest request failed: {0}")]
    Ingest(#[source] reqwest::Error),

    /// The ingest endpoint answered with something other than 202.
    #[error("ingest endpoint returned {status}")]
    IngestStatus {
        /// HTTP status code.
        status: u16,
    },
}

impl PollError {
    /// HTTP status carried by the error, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::UpstreamStatus { status, .. } | Self::IngestStatus { status } => Some(*status),
            Self::Client(_) | Self::Fetch(_) | Self::Ingest(_) => None,
        }
    }
}
