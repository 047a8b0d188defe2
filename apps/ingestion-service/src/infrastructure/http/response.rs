//! HTTP response DTOs.

use serde::{Deserialize, Serialize};

/// Body of a successful ingest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestResponse {
    /// Always `"accepted"`.
    pub status: String,
    /// Rows committed.
    pub ingested: usize,
}

impl IngestResponse {
    /// Acceptance of `ingested` rows.
    #[must_use]
    pub fn accepted(ingested: usize) -> Self {
        Self {
            status: "accepted".to_string(),
            ingested,
        }
    }
}

/// Body of a refused request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable reason.
    pub error: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"healthy"` while the process serves requests.
    pub status: String,
    /// Service version.
    pub version: String,
    /// Seconds since start.
    pub uptime_secs: u64,
}
