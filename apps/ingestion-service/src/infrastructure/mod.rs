//! Infrastructure Layer - Adapters and external integrations.
//!
//! Concrete implementations of the application ports plus process-level
//! concerns (configuration, metrics, logging).

/// Configuration loaded from the environment.
pub mod config;

/// Axum HTTP adapter for the ingest endpoints.
pub mod http;

/// Prometheus metrics instrumentation.
pub mod metrics;

/// SQLite storage: schema, atomic writer, and sinks.
pub mod persistence;

/// Tracing subscriber setup.
pub mod telemetry;
