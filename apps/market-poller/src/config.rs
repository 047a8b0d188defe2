//! Poller Configuration
//!
//! # Environment Variables
//!
//! - `POLLER_INSTRUMENTS`: Comma-separated instrument keys (required)
//! - `UPSTOX_BASE_URL`: Quote endpoint (required)
//! - `POLLER_INGEST_MARKET_URL`: Market ingest endpoint (required)
//! - `POLLER_INGEST_EVENTS_URL`: Event ingest endpoint (required)
//! - `POLLER_INTERVAL_SECS`: Seconds between cycles (default: 60)
//! - `POLLER_TIMEZONE`: IANA zone of the exchange (default: `Asia/Kolkata`)
//! - `POLLER_START_TIME` / `POLLER_END_TIME`: `HH:MM` window (default: 09:15 / 15:30)
//! - `POLLER_HTTP_TIMEOUT_SECS`: Per-request timeout (default: 10)

use std::time::Duration;

use chrono::NaiveTime;
use chrono_tz::Tz;
use ingestion_service::MarketHours;
use ingestion_service::infrastructure::config::{ConfigError, parse_var};
use reqwest::Url;

const CLOCK_FORMAT: &str = "%H:%M";

/// Complete poller configuration.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Instruments fetched in one batch per cycle.
    pub instruments: Vec<String>,
    /// Upstream quote endpoint, without query.
    pub upstream_url: Url,
    /// Where fetched envelopes are forwarded.
    pub ingest_market_url: Url,
    /// Where cycle events are reported.
    pub ingest_events_url: Url,
    /// Time between cycles.
    pub interval: Duration,
    /// Trading window that gates fetching.
    pub hours: MarketHours,
    /// Timeout applied to every outbound request.
    pub http_timeout: Duration,
}

impl PollerConfig {
    /// Create configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let instruments: Vec<String> = lookup("POLLER_INSTRUMENTS")
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
            .collect();
        if instruments.is_empty() {
            return Err(ConfigError::MissingEnvVar("POLLER_INSTRUMENTS"));
        }

        let upstream_url = required_url(&lookup, "UPSTOX_BASE_URL")?;
        let ingest_market_url = required_url(&lookup, "POLLER_INGEST_MARKET_URL")?;
        let ingest_events_url = required_url(&lookup, "POLLER_INGEST_EVENTS_URL")?;

        let interval_secs: u64 = parse_var(&lookup, "POLLER_INTERVAL_SECS", 60)?;
        if interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "POLLER_INTERVAL_SECS",
                value: "0".to_string(),
            });
        }

        let defaults = MarketHours::default();
        let zone: Tz = parse_var(&lookup, "POLLER_TIMEZONE", defaults.zone)?;
        let open = parse_clock(&lookup, "POLLER_START_TIME", defaults.open)?;
        let close = parse_clock(&lookup, "POLLER_END_TIME", defaults.close)?;
        if open >= close {
            return Err(ConfigError::InvalidValue {
                key: "POLLER_END_TIME",
                value: close.format(CLOCK_FORMAT).to_string(),
            });
        }

        Ok(Self {
            instruments,
            upstream_url,
            ingest_market_url,
            ingest_events_url,
            interval: Duration::from_secs(interval_secs),
            hours: MarketHours::new(zone, open, close),
            http_timeout: Duration::from_secs(parse_var(&lookup, "POLLER_HTTP_TIMEOUT_SECS", 10)?),
        })
    }
}

fn required_url<F>(lookup: &F, key: &'static str) -> Result<Url, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::MissingEnvVar(key))?;
    Url::parse(raw.trim()).map_err(|_| ConfigError::InvalidValue { key, value: raw })
}

fn parse_clock<F>(lookup: &F, key: &'static str, default: NaiveTime) -> Result<NaiveTime, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).filter(|v| !v.trim().is_empty()) {
        None => Ok(default),
        Some(raw) => NaiveTime::parse_from_str(raw.trim(), CLOCK_FORMAT)
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
    }
}
