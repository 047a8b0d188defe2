//! Ingest End-to-End Tests
//!
//! Drives the HTTP router backed by a real SQLite store: request body in,
//! committed rows out.

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::float_cmp)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use ingestion_service::infrastructure::http::IngestResponse;
use ingestion_service::{
    AppState, AtomicRowWriter, Event, IngestEventsUseCase, IngestMarketDataUseCase, MarketRow,
    TableSink, create_router, ensure_schema,
};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

/// Load a raw fixture from the fixtures directory.
fn load_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests/fixtures");
    path.push(name);

    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {e}", path.display()))
}

async fn make_app() -> (Router, SqlitePool) {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();

    let events_table = ensure_schema::<Event>(&pool).await.unwrap();
    let market_table = ensure_schema::<MarketRow>(&pool).await.unwrap();
    let writer = AtomicRowWriter::new(pool.clone(), Duration::from_secs(5));

    let state = AppState {
        ingest_events: Arc::new(IngestEventsUseCase::new(Arc::new(TableSink::new(
            writer.clone(),
            events_table,
        )))),
        ingest_market_data: Arc::new(IngestMarketDataUseCase::new(Arc::new(TableSink::new(
            writer,
            market_table,
        )))),
        metrics: None,
        version: "e2e".to_string(),
        started_at: Instant::now(),
    };

    (create_router(state), pool)
}

fn post(uri: &str, body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap()
}

#[derive(Debug, sqlx::FromRow)]
struct StoredRow {
    request_id: String,
    response_time: DateTime<Utc>,
    instrument: String,
    last_trade_time: NaiveDateTime,
    close_price: f64,
    oi: f64,
    ohlc_open: f64,
    ohlc_high: f64,
    ohlc_low: f64,
    ohlc_close: f64,
    ohlc_volume: i64,
}

#[tokio::test]
async fn two_instrument_envelope_yields_two_rows() {
    let (app, pool) = make_app().await;

    let response = app
        .oneshot(post("/ingest/marketdata", load_fixture("two_instruments.json")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: IngestResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(body, IngestResponse::accepted(2));

    let rows: Vec<StoredRow> = sqlx::query_as(
        "SELECT request_id, response_time, instrument, last_trade_time, close_price, oi, \
         ohlc_open, ohlc_high, ohlc_low, ohlc_close, ohlc_volume \
         FROM market_data ORDER BY instrument",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].request_id, rows[1].request_id);
    assert_eq!(rows[0].response_time, rows[1].response_time);
    assert_eq!(rows[0].response_time.timestamp_millis(), 1_762_498_358_000);

    // "NSE_FO|52509" sorts before "NSE_INDEX|Nifty 50".
    let option = &rows[0];
    assert_eq!(option.instrument, "NSE_FO|52509");
    assert_eq!(
        (
            option.ohlc_open,
            option.ohlc_high,
            option.ohlc_low,
            option.ohlc_close,
            option.ohlc_volume
        ),
        (0.0, 0.0, 0.0, 0.0, 0)
    );
    assert_eq!(option.close_price, 152.35);
    assert_eq!(option.oi, 1200.0);
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    assert_eq!(option.last_trade_time, epoch);

    let index = &rows[1];
    assert_eq!(index.instrument, "NSE_INDEX|Nifty 50");
    assert_eq!(index.ohlc_open, 25433.8);
    assert_eq!(index.ohlc_high, 25551.25);
    assert_eq!(index.ohlc_low, 25318.45);
    assert_eq!(index.ohlc_close, 25492.3);
}

#[tokio::test]
async fn rejected_envelope_writes_nothing() {
    let (app, pool) = make_app().await;
    let broken = load_fixture("two_instruments.json").replace("2025-11-07 12:22:38", "soon");

    let response = app.oneshot(post("/ingest/marketdata", broken)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM market_data")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn single_event_and_batch_both_land() {
    let (app, pool) = make_app().await;

    let single = r#"{"timestamp":"2025-11-07T06:52:38Z","level":"INFO","source":"poller","message":"closed"}"#;
    let batch = r#"[
        {"timestamp":"2025-11-07T06:52:39Z","level":"WARN","source":"poller","message":"slow","context":{"ms":"900"}},
        {"timestamp":"2025-11-07T06:52:40Z","level":"ERROR","source":"poller","message":"down","context":null}
    ]"#;

    let first = app
        .clone()
        .oneshot(post("/ingest/events", single.to_string()))
        .await
        .unwrap();
    let second = app
        .oneshot(post("/ingest/events", batch.to_string()))
        .await
        .unwrap();

    assert_eq!(first.status(), StatusCode::ACCEPTED);
    assert_eq!(second.status(), StatusCode::ACCEPTED);

    let levels: Vec<String> = sqlx::query_scalar("SELECT level FROM events ORDER BY timestamp")
        .fetch_all(&pool)
        .await
        .unwrap();
    assert_eq!(levels, vec!["INFO", "WARN", "ERROR"]);
}

#[tokio::test]
async fn empty_event_array_is_rejected() {
    let (app, _pool) = make_app().await;

    let response = app
        .oneshot(post("/ingest/events", "[]".to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
