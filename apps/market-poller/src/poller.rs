//! Market Poller
//!
//! One cycle: gate on market hours, fetch every configured instrument from
//! upstream in a single request, and forward the response body unchanged to
//! the market ingest endpoint. Each step is reported as an event.

use chrono::{DateTime, Utc};
use ingestion_service::EventLevel;
use reqwest::header::{ACCEPT, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, StatusCode, Url};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{Span, info, instrument, warn};
use uuid::Uuid;

use crate::config::PollerConfig;
use crate::error::PollError;
use crate::events::EventReporter;

const ACCEPT_VALUE: &str = "application/json, text/plain, */*";
const USER_AGENT_VALUE: &str = concat!("market-poller/", env!("CARGO_PKG_VERSION"));
const REQUEST_ID_HEADER: &str = "X-Request-ID";

/// Result of a cycle that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Outside trading hours; nothing was fetched.
    Closed,
    /// The batch was fetched and accepted by the ingest service.
    Ingested {
        /// Instruments requested.
        instruments: usize,
    },
}

/// Fetch-and-forward loop.
#[derive(Debug)]
pub struct MarketPoller {
    config: PollerConfig,
    client: Client,
    reporter: EventReporter,
}

impl MarketPoller {
    /// Create a poller with one HTTP client shared by all calls.
    pub fn new(config: PollerConfig) -> Result<Self, PollError> {
        let client = Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(PollError::Client)?;
        let reporter = EventReporter::new(client.clone(), config.ingest_events_url.clone());

        Ok(Self {
            config,
            client,
            reporter,
        })
    }

    /// Upstream URL for the configured batch: `?i=<a,b,...>&interval=1m`.
    #[must_use]
    pub fn fetch_url(&self) -> Url {
        let mut url = self.config.upstream_url.clone();
        url.query_pairs_mut()
            .append_pair("i", &self.config.instruments.join(","))
            .append_pair("interval", "1m");
        url
    }

    /// Run cycles until `cancel` fires. The first cycle starts immediately.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            if let Err(e) = self.run_cycle(Utc::now()).await {
                warn!(error = %e, "Cycle failed");
            }
        }

        info!("Poller stopped");
    }

    /// Run one cycle as of `now`.
    #[instrument(name = "poll_cycle", skip_all, fields(request_id))]
    pub async fn run_cycle(&self, now: DateTime<Utc>) -> Result<CycleOutcome, PollError> {
        let request_id = format!("poller-{}", Uuid::new_v4());
        Span::current().record("request_id", request_id.as_str());

        if !self.config.hours.is_open(now) {
            info!("Market is closed. Sleeping.");
            self.reporter
                .report(
                    EventLevel::Info,
                    "Market is closed. Sleeping.",
                    &[("request_id", request_id)],
                )
                .await;
            return Ok(CycleOutcome::Closed);
        }

        let instruments = self.config.instruments.len();
        let url = self.fetch_url();
        info!(instruments, %url, "Market is open. Fetching batch");
        self.reporter
            .report(
                EventLevel::Info,
                "Attempting to fetch data",
                &[
                    ("instrument_count", instruments.to_string()),
                    ("url", url.to_string()),
                    ("request_id", request_id.clone()),
                ],
            )
            .await;

        if let Err(e) = self.fetch_and_forward(&request_id, &url).await {
            self.report_failure(&e, &request_id, &url).await;
            return Err(e);
        }

        info!(instruments, "Fetched and ingested batch");
        self.reporter
            .report(
                EventLevel::Info,
                "Successfully ingested data",
                &[
                    ("instrument_count", instruments.to_string()),
                    ("request_id", request_id),
                ],
            )
            .await;

        Ok(CycleOutcome::Ingested { instruments })
    }

    async fn fetch_and_forward(&self, request_id: &str, url: &Url) -> Result<(), PollError> {
        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, ACCEPT_VALUE)
            .header(USER_AGENT, USER_AGENT_VALUE)
            .header(REQUEST_ID_HEADER, request_id)
            .send()
            .await
            .map_err(PollError::Fetch)?;

        let status = response.status();
        let body = response.bytes().await.map_err(PollError::Fetch)?;

        if status != StatusCode::OK {
            return Err(PollError::UpstreamStatus {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        let ingest = self
            .client
            .post(self.config.ingest_market_url.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(PollError::Ingest)?;

        if ingest.status() != StatusCode::ACCEPTED {
            return Err(PollError::IngestStatus {
                status: ingest.status().as_u16(),
            });
        }

        Ok(())
    }

    async fn report_failure(&self, error: &PollError, request_id: &str, url: &Url) {
        let request_id = ("request_id", request_id.to_string());

        match error {
            PollError::UpstreamStatus { status, body } => {
                warn!(status, body = body.as_str(), "Non-OK response from upstream");
                self.reporter
                    .report(
                        EventLevel::Warn,
                        "Non-OK response from Upstox",
                        &[
                            ("http_status", status.to_string()),
                            ("url", url.to_string()),
                            ("body", body.clone()),
                            request_id,
                        ],
                    )
                    .await;
            }
            PollError::IngestStatus { status } => {
                tracing::error!(status, "Ingest service gave non-202 status");
                self.reporter
                    .report(
                        EventLevel::Error,
                        "Ingest service gave non-202 status",
                        &[("http_status", status.to_string()), request_id],
                    )
                    .await;
            }
            PollError::Fetch(e) => {
                tracing::error!(error = %e, "Failed to fetch batch data");
                self.reporter
                    .report(
                        EventLevel::Error,
                        "Failed to fetch batch data",
                        &[("error", e.to_string()), request_id],
                    )
                    .await;
            }
            PollError::Ingest(e) => {
                tracing::error!(error = %e, "Failed to ingest batch data");
                self.reporter
                    .report(
                        EventLevel::Error,
                        "Failed to ingest batch data",
                        &[("error", e.to_string()), request_id],
                    )
                    .await;
            }
            PollError::Client(_) => {}
        }
    }
}
