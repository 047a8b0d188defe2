//! Tracing Subscriber Setup
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Filter directives; replaces the built-in defaults when set
//! - `LOG_FORMAT`: `pretty` (default) or `json`
//!
//! # Usage
//!
//! ```ignore
//! use ingestion_service::infrastructure::telemetry::{self, TelemetryConfig};
//!
//! telemetry::init(&TelemetryConfig::from_env("ingestion_service"))?;
//! ```

use std::str::FromStr;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Output format of log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable, one line per event.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = TelemetryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(TelemetryError::UnknownFormat(other.to_string())),
        }
    }
}

/// Subscriber configuration.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Line format.
    pub format: LogFormat,
    /// Filter used when `RUST_LOG` is unset.
    pub default_filter: String,
}

impl TelemetryConfig {
    /// Build configuration for `crate_target`, reading `LOG_FORMAT`.
    ///
    /// An unrecognised `LOG_FORMAT` falls back to `pretty`.
    #[must_use]
    pub fn from_env(crate_target: &str) -> Self {
        let format = std::env::var("LOG_FORMAT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_default();

        Self {
            format,
            default_filter: default_filter(crate_target),
        }
    }
}

/// Telemetry setup errors.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// `LOG_FORMAT` names no known format.
    #[error("unknown log format: {0}")]
    UnknownFormat(String),
    /// A global subscriber is already installed.
    #[error("failed to install tracing subscriber: {0}")]
    Install(String),
}

fn default_filter(crate_target: &str) -> String {
    format!("{crate_target}=info,sqlx=warn,hyper=warn,reqwest=warn,tower_http=info")
}

/// Install the global tracing subscriber.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    let registry = tracing_subscriber::registry().with(env_filter);

    let result = match config.format {
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false),
            )
            .try_init(),
    };

    result.map_err(|e| TelemetryError::Install(e.to_string()))
}
