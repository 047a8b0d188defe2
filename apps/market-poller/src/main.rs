//! Market Poller Binary
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin market-poller
//! ```
//!
//! See `config` for environment variables. `RUST_LOG` and `LOG_FORMAT`
//! control logging.

use ingestion_service::TelemetryConfig;
use ingestion_service::infrastructure::config::load_dotenv;
use market_poller::{MarketPoller, PollerConfig};
use tokio::signal;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();
    ingestion_service::init_telemetry(&TelemetryConfig::from_env("market_poller"))?;

    tracing::info!("Starting market poller");

    let config = PollerConfig::from_env()?;
    tracing::info!(
        instruments = config.instruments.len(),
        interval_secs = config.interval.as_secs(),
        open = %config.hours.open,
        close = %config.hours.close,
        zone = %config.hours.zone,
        "Configuration loaded"
    );

    let poller = MarketPoller::new(config)?;

    let shutdown_token = CancellationToken::new();
    let poll_task = {
        let token = shutdown_token.clone();
        tokio::spawn(async move { poller.run(token).await })
    };

    await_shutdown(shutdown_token).await;
    poll_task.await?;

    tracing::info!("Market poller stopped");
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
