//! HTTP Controller (Driver Adapter)
//!
//! Axum routes that hand raw request bodies to the ingest use cases.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use metrics_exporter_prometheus::PrometheusHandle;

use super::response::{ErrorResponse, HealthResponse, IngestResponse};
use crate::application::ports::RowSink;
use crate::application::use_cases::{
    IngestError, IngestEventsUseCase, IngestMarketDataUseCase, IngestReport,
};
use crate::domain::events::Event;
use crate::domain::market::MarketRow;
use crate::domain::stream::Stream;
use crate::infrastructure::metrics;

/// Application state shared across handlers.
pub struct AppState<E, M>
where
    E: RowSink<Event>,
    M: RowSink<MarketRow>,
{
    /// Use case for the events stream.
    pub ingest_events: Arc<IngestEventsUseCase<E>>,
    /// Use case for the market-data stream.
    pub ingest_market_data: Arc<IngestMarketDataUseCase<M>>,
    /// Prometheus handle; `None` disables `/metrics`.
    pub metrics: Option<PrometheusHandle>,
    /// Application version.
    pub version: String,
    /// Process start, for uptime.
    pub started_at: Instant,
}

impl<E, M> Clone for AppState<E, M>
where
    E: RowSink<Event>,
    M: RowSink<MarketRow>,
{
    fn clone(&self) -> Self {
        Self {
            ingest_events: Arc::clone(&self.ingest_events),
            ingest_market_data: Arc::clone(&self.ingest_market_data),
            metrics: self.metrics.clone(),
            version: self.version.clone(),
            started_at: self.started_at,
        }
    }
}

/// Create the HTTP router with all endpoints.
pub fn create_router<E, M>(state: AppState<E, M>) -> Router
where
    E: RowSink<Event> + 'static,
    M: RowSink<MarketRow> + 'static,
{
    Router::new()
        .route("/ingest/events", post(ingest_events::<E, M>))
        .route("/ingest/marketdata", post(ingest_market_data::<E, M>))
        .route("/health", get(health_check::<E, M>))
        .route("/healthz", get(liveness))
        .route("/metrics", get(render_metrics::<E, M>))
        .with_state(state)
}

async fn ingest_events<E, M>(State(state): State<AppState<E, M>>, body: Bytes) -> Response
where
    E: RowSink<Event>,
    M: RowSink<MarketRow>,
{
    let result = state.ingest_events.execute(&body).await;
    respond(Stream::Events, result)
}

async fn ingest_market_data<E, M>(State(state): State<AppState<E, M>>, body: Bytes) -> Response
where
    E: RowSink<Event>,
    M: RowSink<MarketRow>,
{
    let result = state.ingest_market_data.execute(&body).await;
    respond(Stream::MarketData, result)
}

fn respond(stream: Stream, result: Result<IngestReport, IngestError>) -> Response {
    match result {
        Ok(report) => {
            metrics::record_ingested(stream, report.ingested);
            tracing::info!(
                stream = %stream,
                ingested = report.ingested,
                missing_ohlc = report.missing_ohlc,
                "Batch accepted"
            );
            (
                StatusCode::ACCEPTED,
                Json(IngestResponse::accepted(report.ingested)),
            )
                .into_response()
        }
        Err(e) => {
            metrics::record_rejected(stream, e.reason());
            if !e.is_client_error() {
                tracing::error!(stream = %stream, error = %e, "Batch failed");
            }
            (
                status_for(&e),
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

const fn status_for(error: &IngestError) -> StatusCode {
    match error {
        IngestError::Decode(_) | IngestError::NoRecords => StatusCode::BAD_REQUEST,
        IngestError::Flatten(_) => StatusCode::UNPROCESSABLE_ENTITY,
        IngestError::Write(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

async fn health_check<E, M>(State(state): State<AppState<E, M>>) -> impl IntoResponse
where
    E: RowSink<Event>,
    M: RowSink<MarketRow>,
{
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        uptime_secs: state.started_at.elapsed().as_secs(),
    })
}

async fn liveness() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn render_metrics<E, M>(State(state): State<AppState<E, M>>) -> Response
where
    E: RowSink<Event>,
    M: RowSink<MarketRow>,
{
    state.metrics.as_ref().map_or_else(
        || (StatusCode::NOT_FOUND, "Metrics disabled").into_response(),
        |handle| {
            (
                StatusCode::OK,
                [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
                handle.render(),
            )
                .into_response()
        },
    )
}
