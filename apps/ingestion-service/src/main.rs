//! Ingestion Service Binary
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin ingestion-service
//! ```
//!
//! See `infrastructure::config` for environment variables. `RUST_LOG` and
//! `LOG_FORMAT` control logging.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use ingestion_service::infrastructure::config::load_dotenv;
use ingestion_service::{
    AppState, AtomicRowWriter, Event, HttpServer, IngestEventsUseCase, IngestMarketDataUseCase,
    MarketRow, ServiceConfig, TableSink, TelemetryConfig, connect, create_router, ensure_schema,
    init_metrics, init_telemetry,
};
use tokio::signal;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();
    init_telemetry(&TelemetryConfig::from_env("ingestion_service"))?;

    tracing::info!("Starting ingestion service");

    let config = ServiceConfig::from_env()?;
    tracing::info!(
        database_url = %config.database.url,
        http_port = config.server.http_port,
        write_timeout_ms = config.database.write_timeout.as_millis(),
        metrics_enabled = config.server.metrics_enabled,
        "Configuration loaded"
    );

    let metrics = if config.server.metrics_enabled {
        Some(init_metrics()?)
    } else {
        None
    };

    let pool = connect(&config.database)
        .await
        .context("could not reach the store")?;

    // Schema creation runs once per stream, before any request is served.
    let events_table = ensure_schema::<Event>(&pool).await?;
    let market_table = ensure_schema::<MarketRow>(&pool).await?;

    let writer = AtomicRowWriter::new(pool.clone(), config.database.write_timeout);
    let events_sink = Arc::new(TableSink::new(writer.clone(), events_table));
    let market_sink = Arc::new(TableSink::new(writer, market_table));

    let state = AppState {
        ingest_events: Arc::new(IngestEventsUseCase::new(events_sink)),
        ingest_market_data: Arc::new(IngestMarketDataUseCase::new(market_sink)),
        metrics,
        version: env!("CARGO_PKG_VERSION").to_string(),
        started_at: Instant::now(),
    };

    let shutdown_token = CancellationToken::new();
    let server = HttpServer::new(
        config.server.http_port,
        create_router(state),
        shutdown_token.clone(),
    );
    let mut server_task = tokio::spawn(server.run());

    tracing::info!("Ingestion service ready");

    // A server that dies on its own (bind failure) ends the process too.
    let finished_early = tokio::select! {
        () = await_shutdown(shutdown_token.clone()) => None,
        result = &mut server_task => Some(result),
    };
    let server_result = match finished_early {
        Some(result) => result,
        None => server_task.await,
    };
    server_result??;
    pool.close().await;

    tracing::info!("Ingestion service stopped");
    Ok(())
}

/// Wait for shutdown signal (SIGTERM or SIGINT).
#[allow(clippy::expect_used)]
async fn await_shutdown(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("signal handler installation is critical for graceful shutdown");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler installation is critical for graceful shutdown")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }

    shutdown_token.cancel();
}
