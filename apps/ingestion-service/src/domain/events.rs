//! Application Events
//!
//! Structured log records sent by any producer. Events are immutable once
//! constructed and are written to the `events` table as-is.
//!
//! # Wire Format
//!
//! ```json
//! {
//!   "timestamp": "2025-11-07T06:52:38Z",
//!   "level": "INFO",
//!   "source": "market-poller",
//!   "message": "Market is closed. Sleeping.",
//!   "context": { "request_id": "poller-..." }
//! }
//! ```
//!
//! `context` may be absent or `null`; both decode to an empty map.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Severity of an event.
///
/// The four well-known levels get their own variants; anything else a
/// producer sends is preserved verbatim in `Custom`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventLevel {
    /// Diagnostic detail.
    Debug,
    /// Normal operation.
    Info,
    /// Something unexpected but recoverable.
    Warn,
    /// A failed operation.
    Error,
    /// Producer-defined level.
    Custom(String),
}

impl EventLevel {
    /// Wire representation of the level.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
            Self::Custom(level) => level,
        }
    }
}

impl From<String> for EventLevel {
    fn from(level: String) -> Self {
        match level.as_str() {
            "DEBUG" => Self::Debug,
            "INFO" => Self::Info,
            "WARN" => Self::Warn,
            "ERROR" => Self::Error,
            _ => Self::Custom(level),
        }
    }
}

impl From<EventLevel> for String {
    fn from(level: EventLevel) -> Self {
        match level {
            EventLevel::Custom(level) => level,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for EventLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structured application event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// When the event happened.
    pub timestamp: DateTime<Utc>,
    /// Severity.
    pub level: EventLevel,
    /// Logical owner of the event (service or component name).
    pub source: String,
    /// Human-readable message.
    pub message: String,
    /// Additional key/value data.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub context: BTreeMap<String, String>,
}

impl Event {
    /// Create an event stamped with the current time and an empty context.
    #[must_use]
    pub fn new(level: EventLevel, source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            source: source.into(),
            message: message.into(),
            context: BTreeMap::new(),
        }
    }

    /// Add a context entry.
    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<BTreeMap<String, String>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn known_levels_round_trip_through_strings() {
        for (raw, level) in [
            ("DEBUG", EventLevel::Debug),
            ("INFO", EventLevel::Info),
            ("WARN", EventLevel::Warn),
            ("ERROR", EventLevel::Error),
        ] {
            assert_eq!(EventLevel::from(raw.to_string()), level);
            assert_eq!(String::from(level), raw);
        }
    }

    #[test]
    fn custom_level_preserved_verbatim() {
        let level = EventLevel::from("audit".to_string());
        assert_eq!(level, EventLevel::Custom("audit".to_string()));
        assert_eq!(level.as_str(), "audit");
    }

    #[test]
    fn decodes_full_event() {
        let json = r#"{
            "timestamp": "2025-11-07T06:52:38Z",
            "level": "WARN",
            "source": "market-poller",
            "message": "Non-OK response",
            "context": {"http_status": "503"}
        }"#;

        let event: Event = serde_json::from_str(json).unwrap();

        assert_eq!(
            event.timestamp,
            Utc.with_ymd_and_hms(2025, 11, 7, 6, 52, 38).unwrap()
        );
        assert_eq!(event.level, EventLevel::Warn);
        assert_eq!(event.context.get("http_status").map(String::as_str), Some("503"));
    }

    #[test]
    fn missing_or_null_context_is_empty() {
        let absent = r#"{"timestamp":"2025-01-01T00:00:00Z","level":"INFO","source":"s","message":"m"}"#;
        let null = r#"{"timestamp":"2025-01-01T00:00:00Z","level":"INFO","source":"s","message":"m","context":null}"#;

        assert!(serde_json::from_str::<Event>(absent).unwrap().context.is_empty());
        assert!(serde_json::from_str::<Event>(null).unwrap().context.is_empty());
    }

    #[test]
    fn missing_message_is_rejected() {
        let json = r#"{"timestamp":"2025-01-01T00:00:00Z","level":"INFO","source":"s"}"#;
        assert!(serde_json::from_str::<Event>(json).is_err());
    }

    #[test]
    fn builder_adds_context() {
        let event = Event::new(EventLevel::Info, "poller", "hello").with_context("k", "v");
        assert_eq!(event.source, "poller");
        assert_eq!(event.context.len(), 1);
    }
}
