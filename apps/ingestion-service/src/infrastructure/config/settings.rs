//! Service Configuration Settings
//!
//! # Environment Variables
//!
//! - `INGEST_DATABASE_URL`: SQLite URL (default: `sqlite://ingest.db?mode=rwc`)
//! - `INGEST_HTTP_PORT`: HTTP port (default: 8080)
//! - `INGEST_METRICS_ENABLED`: Expose `/metrics` (default: true)
//! - `INGEST_WRITE_TIMEOUT_MS`: Per-batch write deadline (default: 10000)
//! - `INGEST_MAX_CONNECTIONS`: Pool size (default: 5)
//! - `INGEST_CONNECT_ATTEMPTS`: Connection attempts at start-up (default: 5)
//! - `INGEST_CONNECT_RETRY_DELAY_MS`: Delay between attempts (default: 3000)

use std::str::FromStr;
use std::time::Duration;

/// Store connection settings.
#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    /// SQLite connection URL.
    pub url: String,
    /// Maximum pooled connections.
    pub max_connections: u32,
    /// Connection attempts before giving up.
    pub connect_attempts: u32,
    /// Delay between connection attempts.
    pub connect_retry_delay: Duration,
    /// Deadline for one atomic batch write.
    pub write_timeout: Duration,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: "sqlite://ingest.db?mode=rwc".to_string(),
            max_connections: 5,
            connect_attempts: 5,
            connect_retry_delay: Duration::from_millis(3000),
            write_timeout: Duration::from_millis(10_000),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    /// Ingest and health HTTP port.
    pub http_port: u16,
    /// Whether `/metrics` is served.
    pub metrics_enabled: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            http_port: 8080,
            metrics_enabled: true,
        }
    }
}

/// Complete service configuration.
#[derive(Debug, Clone, Default)]
pub struct ServiceConfig {
    /// Store settings.
    pub database: DatabaseSettings,
    /// Server settings.
    pub server: ServerSettings,
}

impl ServiceConfig {
    /// Create configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let database = DatabaseSettings {
            url: lookup("INGEST_DATABASE_URL")
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.database.url),
            max_connections: parse_var(
                &lookup,
                "INGEST_MAX_CONNECTIONS",
                defaults.database.max_connections,
            )?,
            connect_attempts: parse_var(
                &lookup,
                "INGEST_CONNECT_ATTEMPTS",
                defaults.database.connect_attempts,
            )?,
            connect_retry_delay: Duration::from_millis(parse_var(
                &lookup,
                "INGEST_CONNECT_RETRY_DELAY_MS",
                3000,
            )?),
            write_timeout: Duration::from_millis(parse_var(
                &lookup,
                "INGEST_WRITE_TIMEOUT_MS",
                10_000,
            )?),
        };

        if database.max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                key: "INGEST_MAX_CONNECTIONS",
                value: "0".to_string(),
            });
        }

        let server = ServerSettings {
            http_port: parse_var(&lookup, "INGEST_HTTP_PORT", defaults.server.http_port)?,
            metrics_enabled: parse_flag(
                &lookup,
                "INGEST_METRICS_ENABLED",
                defaults.server.metrics_enabled,
            )?,
        };

        Ok(Self { database, server })
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(&'static str),
    /// Environment variable could not be parsed.
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue {
        /// Variable name.
        key: &'static str,
        /// Raw value.
        value: String,
    },
}

/// Parse an optional variable, falling back to `default` when unset or empty.
pub fn parse_var<T, F>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).filter(|v| !v.trim().is_empty()) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
    }
}

/// Parse an optional on/off flag (`true`/`false`, `1`/`0`, `yes`/`no`).
pub fn parse_flag<F>(lookup: &F, key: &'static str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).filter(|v| !v.trim().is_empty()) {
        None => Ok(default),
        Some(raw) => match raw.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => Err(ConfigError::InvalidValue { key, value: raw }),
        },
    }
}

/// Load `.env` from the current directory or the nearest ancestor holding one.
pub fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}
