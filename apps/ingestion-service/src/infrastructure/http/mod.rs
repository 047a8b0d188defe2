//! HTTP Adapter
//!
//! Inbound adapter exposing the ingest use cases, health checks, and
//! Prometheus metrics over axum.
//!
//! # Endpoints
//!
//! - `POST /ingest/events` - Single event object or array of events
//! - `POST /ingest/marketdata` - One market-data envelope
//! - `GET /health` - JSON status with version and uptime
//! - `GET /healthz` - Liveness probe (simple OK)
//! - `GET /metrics` - Prometheus text format

mod controller;
mod response;
mod server;

pub use controller::{AppState, create_router};
pub use response::{ErrorResponse, HealthResponse, IngestResponse};
pub use server::{HttpServer, ServerError};
