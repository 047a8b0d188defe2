//! Market Snapshot Flattener
//!
//! Turns one envelope into one fixed-width row per instrument. The whole
//! envelope succeeds or fails together: downstream consumers assume a
//! complete snapshot per envelope, so a single unparsable `timestamp`
//! produces an error and no rows.
//!
//! # Last Trade Time
//!
//! Upstream reports "no trade yet" as `1970-01-01 05:30:00`, which is the
//! UTC epoch rendered in IST. That exact string, and only that string, is
//! rewritten to `1970-01-01 00:00:00` before parsing.
//!
//! A last trade time that is absent or does not parse never fails the
//! envelope. The row keeps [`unknown_last_trade_time`] and a warning is
//! logged.

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;
use tracing::warn;

use super::envelope::{MarketEnvelope, Snapshot};
use super::row::{MarketRow, OhlcColumns};

/// Local-time format of snapshot timestamps.
pub const SNAPSHOT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Upstream encoding of "no trade time" (epoch midnight at UTC+05:30).
pub const NO_TRADE_SENTINEL: &str = "1970-01-01 05:30:00";

/// Replacement for the sentinel: epoch midnight.
const EPOCH_LOCAL_MIDNIGHT: &str = "1970-01-01 00:00:00";

/// Last trade time stored when upstream sends none or an unparsable one:
/// `0001-01-01 00:00:00`.
#[must_use]
pub fn unknown_last_trade_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1, 1, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

/// Errors from flattening an envelope.
#[derive(Debug, Error)]
pub enum FlattenError {
    /// Snapshot has no capture timestamp.
    #[error("instrument {instrument}: missing timestamp")]
    MissingTimestamp {
        /// Offending instrument.
        instrument: String,
    },

    /// Snapshot capture timestamp does not match `YYYY-MM-DD HH:MM:SS`.
    #[error("instrument {instrument}: invalid timestamp {value:?}: {source}")]
    InvalidTimestamp {
        /// Offending instrument.
        instrument: String,
        /// Raw value.
        value: String,
        /// Parse failure.
        #[source]
        source: chrono::ParseError,
    },
}

impl FlattenError {
    /// Instrument that failed the envelope.
    #[must_use]
    pub fn instrument(&self) -> &str {
        match self {
            Self::MissingTimestamp { instrument }
            | Self::InvalidTimestamp { instrument, .. } => instrument,
        }
    }
}

/// Flatten an envelope into one row per instrument, in instrument order.
///
/// # Errors
///
/// Returns the first `FlattenError` encountered; no rows are returned in
/// that case.
pub fn flatten(envelope: &MarketEnvelope) -> Result<Vec<MarketRow>, FlattenError> {
    envelope
        .token_data
        .iter()
        .map(|(instrument, snapshot)| flatten_snapshot(envelope, instrument, snapshot))
        .collect()
}

fn flatten_snapshot(
    envelope: &MarketEnvelope,
    instrument: &str,
    snapshot: &Snapshot,
) -> Result<MarketRow, FlattenError> {
    let timestamp = parse_timestamp(instrument, snapshot.timestamp.as_deref())?;
    let last_trade_time = parse_last_trade_time(instrument, snapshot.last_trade_time.as_deref());

    let ohlc = snapshot.ohlc.map(OhlcColumns::from).unwrap_or_default();

    Ok(MarketRow {
        request_id: envelope.request_id.clone(),
        response_time: envelope.response_time,
        instrument: instrument.to_string(),
        timestamp,
        last_trade_time,
        last_price: snapshot.last_price.unwrap_or_default(),
        close_price: snapshot.close_price.unwrap_or_default(),
        last_quantity: snapshot.last_quantity.unwrap_or_default(),
        buy_quantity: snapshot.buy_quantity.unwrap_or_default(),
        sell_quantity: snapshot.sell_quantity.unwrap_or_default(),
        volume: snapshot.volume.unwrap_or_default(),
        average_price: snapshot.average_price.unwrap_or_default(),
        oi: snapshot.oi.unwrap_or_default(),
        poi: snapshot.poi.unwrap_or_default(),
        oi_day_high: snapshot.oi_day_high.unwrap_or_default(),
        oi_day_low: snapshot.oi_day_low.unwrap_or_default(),
        net_change: snapshot.net_change.unwrap_or_default(),
        lower_circuit_limit: snapshot.lower_circuit_limit.unwrap_or_default(),
        upper_circuit_limit: snapshot.upper_circuit_limit.unwrap_or_default(),
        yl: snapshot.yl.unwrap_or_default(),
        yh: snapshot.yh.unwrap_or_default(),
        ohlc,
        ohlc_present: snapshot.ohlc.is_some(),
    })
}

fn parse_timestamp(instrument: &str, raw: Option<&str>) -> Result<NaiveDateTime, FlattenError> {
    let Some(value) = raw.filter(|v| !v.is_empty()) else {
        return Err(FlattenError::MissingTimestamp {
            instrument: instrument.to_string(),
        });
    };

    NaiveDateTime::parse_from_str(value, SNAPSHOT_TIME_FORMAT).map_err(|source| {
        FlattenError::InvalidTimestamp {
            instrument: instrument.to_string(),
            value: value.to_string(),
            source,
        }
    })
}

fn parse_last_trade_time(instrument: &str, raw: Option<&str>) -> NaiveDateTime {
    let Some(raw) = raw else {
        warn!(instrument, "Snapshot has no last trade time");
        return unknown_last_trade_time();
    };

    let value = if raw == NO_TRADE_SENTINEL {
        EPOCH_LOCAL_MIDNIGHT
    } else {
        raw
    };

    NaiveDateTime::parse_from_str(value, SNAPSHOT_TIME_FORMAT).unwrap_or_else(|e| {
        warn!(instrument, value, error = %e, "Unparsable last trade time");
        unknown_last_trade_time()
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::{DateTime, NaiveDate, Utc};

    use super::super::envelope::Ohlc;
    use super::*;

    fn ts(raw: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(raw, SNAPSHOT_TIME_FORMAT).unwrap()
    }

    fn snapshot(timestamp: &str) -> Snapshot {
        Snapshot {
            timestamp: Some(timestamp.to_string()),
            last_trade_time: Some("2025-11-07 04:00:00".to_string()),
            last_price: Some(100.5),
            volume: Some(42),
            ..Snapshot::default()
        }
    }

    fn envelope(token_data: Vec<(&str, Snapshot)>) -> MarketEnvelope {
        MarketEnvelope {
            request_id: "req-42".to_string(),
            response_time: DateTime::<Utc>::from_timestamp_millis(1_762_498_358_000).unwrap(),
            success: true,
            token_data: token_data
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    #[test]
    fn one_row_per_instrument() {
        let env = envelope(vec![
            ("A", snapshot("2025-11-07 06:52:38")),
            ("B", snapshot("2025-11-07 06:52:39")),
            ("C", snapshot("2025-11-07 06:52:40")),
        ]);

        let rows = flatten(&env).unwrap();

        assert_eq!(rows.len(), 3);
        let instruments: Vec<&str> = rows.iter().map(|r| r.instrument.as_str()).collect();
        assert_eq!(instruments, vec!["A", "B", "C"]);
        assert!(rows.iter().all(|r| r.request_id == "req-42"));
        assert!(rows.iter().all(|r| r.response_time == env.response_time));
    }

    #[test]
    fn one_bad_timestamp_fails_whole_envelope() {
        let env = envelope(vec![
            ("A", snapshot("2025-11-07 06:52:38")),
            ("B", snapshot("07/11/2025 06:52")),
            ("C", snapshot("2025-11-07 06:52:40")),
        ]);

        let err = flatten(&env).unwrap_err();

        assert!(matches!(err, FlattenError::InvalidTimestamp { .. }));
        assert_eq!(err.instrument(), "B");
    }

    #[test]
    fn missing_timestamp_fails_envelope() {
        let mut snap = snapshot("2025-11-07 06:52:38");
        snap.timestamp = None;
        let env = envelope(vec![("A", snap)]);

        let err = flatten(&env).unwrap_err();

        assert!(matches!(err, FlattenError::MissingTimestamp { .. }));
    }

    #[test]
    fn absent_ohlc_zeroes_only_that_instrument() {
        let mut with_ohlc = snapshot("2025-11-07 06:52:38");
        with_ohlc.ohlc = Some(Ohlc {
            open: Some(1.0),
            high: Some(2.0),
            low: Some(0.5),
            close: Some(1.5),
            volume: Some(900),
        });
        let without_ohlc = snapshot("2025-11-07 06:52:38");
        let env = envelope(vec![("WITH", with_ohlc), ("WITHOUT", without_ohlc)]);

        let rows = flatten(&env).unwrap();
        let with = rows.iter().find(|r| r.instrument == "WITH").unwrap();
        let without = rows.iter().find(|r| r.instrument == "WITHOUT").unwrap();

        assert!(with.ohlc_present);
        assert_eq!(with.ohlc.high, 2.0);
        assert_eq!(with.ohlc.volume, 900);
        assert!(!without.ohlc_present);
        assert!(without.ohlc.is_zero());
    }

    #[test]
    fn null_ohlc_values_become_zero() {
        let mut snap = snapshot("2025-11-07 06:52:38");
        snap.ohlc = Some(Ohlc {
            open: Some(1.0),
            high: None,
            ..Ohlc::default()
        });

        let rows = flatten(&envelope(vec![("A", snap)])).unwrap();

        assert!(rows[0].ohlc_present);
        assert_eq!(rows[0].ohlc.open, 1.0);
        assert_eq!(rows[0].ohlc.high, 0.0);
        assert_eq!(rows[0].ohlc.volume, 0);
    }

    #[test]
    fn absent_numerics_become_zero() {
        let snap = Snapshot {
            timestamp: Some("2025-11-07 06:52:38".to_string()),
            ..Snapshot::default()
        };
        let rows = flatten(&envelope(vec![("A", snap)])).unwrap();
        let row = &rows[0];

        assert_eq!(row.last_price, 0.0);
        assert_eq!(row.volume, 0);
        assert_eq!(row.oi_day_high, 0.0);
        assert_eq!(row.yh, 0.0);
    }

    #[test]
    fn sentinel_last_trade_time_is_epoch_midnight() {
        let mut snap = snapshot("2025-11-07 06:52:38");
        snap.last_trade_time = Some(NO_TRADE_SENTINEL.to_string());

        let rows = flatten(&envelope(vec![("A", snap)])).unwrap();

        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(rows[0].last_trade_time, epoch);
    }

    #[test]
    fn near_sentinel_values_are_not_rewritten() {
        let mut snap = snapshot("2025-11-07 06:52:38");
        snap.last_trade_time = Some("1970-01-01 05:30:01".to_string());

        let rows = flatten(&envelope(vec![("A", snap)])).unwrap();

        assert_eq!(rows[0].last_trade_time, ts("1970-01-01 05:30:01"));
    }

    #[test]
    fn absent_last_trade_time_is_unknown_not_epoch() {
        let mut snap = snapshot("2025-11-07 06:52:38");
        snap.last_trade_time = None;

        let rows = flatten(&envelope(vec![("A", snap)])).unwrap();

        assert_eq!(rows[0].last_trade_time, unknown_last_trade_time());
        assert_ne!(rows[0].last_trade_time, ts(EPOCH_LOCAL_MIDNIGHT));
    }

    #[test]
    fn malformed_last_trade_time_keeps_the_row() {
        let mut bad = snapshot("2025-11-07 06:52:38");
        bad.last_trade_time = Some("n/a".to_string());
        let good = snapshot("2025-11-07 06:52:39");

        let rows = flatten(&envelope(vec![("A", bad), ("B", good)])).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].last_trade_time, unknown_last_trade_time());
        assert_eq!(rows[0].last_price, 100.5);
        assert_eq!(rows[1].last_trade_time, ts("2025-11-07 04:00:00"));
    }

    #[test]
    fn empty_last_trade_time_is_unknown() {
        let mut snap = snapshot("2025-11-07 06:52:38");
        snap.last_trade_time = Some(String::new());

        let rows = flatten(&envelope(vec![("A", snap)])).unwrap();

        assert_eq!(rows[0].last_trade_time, unknown_last_trade_time());
    }

    #[test]
    fn empty_envelope_flattens_to_nothing() {
        assert!(flatten(&envelope(vec![])).unwrap().is_empty());
    }
}
