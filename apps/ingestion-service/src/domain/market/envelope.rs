//! Market quote envelope as delivered by the upstream quote API.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Daily OHLC block nested inside a snapshot.
///
/// Extra upstream keys (`interval`, `ts`) are ignored. Like the snapshot
/// numerics, each value may be absent or `null`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Ohlc {
    /// Day's opening price.
    pub open: Option<f64>,
    /// Day's high.
    pub high: Option<f64>,
    /// Day's low.
    pub low: Option<f64>,
    /// Current/last close.
    pub close: Option<f64>,
    /// Day's traded volume.
    pub volume: Option<i64>,
}

/// Per-instrument market fields inside an envelope.
///
/// Every numeric field is individually optional upstream; absent or `null`
/// values become zero when flattened.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Capture time, `YYYY-MM-DD HH:MM:SS` local.
    pub timestamp: Option<String>,
    /// Last trade time, same format; may be the no-trade sentinel.
    pub last_trade_time: Option<String>,
    /// Last traded price.
    pub last_price: Option<f64>,
    /// Previous close.
    pub close_price: Option<f64>,
    /// Quantity of the last trade.
    pub last_quantity: Option<i64>,
    /// Total buy-side quantity.
    pub buy_quantity: Option<f64>,
    /// Total sell-side quantity.
    pub sell_quantity: Option<f64>,
    /// Total traded volume.
    pub volume: Option<i64>,
    /// Volume-weighted average price.
    pub average_price: Option<f64>,
    /// Open interest.
    pub oi: Option<f64>,
    /// Previous open interest.
    pub poi: Option<f64>,
    /// Day's highest open interest.
    pub oi_day_high: Option<f64>,
    /// Day's lowest open interest.
    pub oi_day_low: Option<f64>,
    /// Change from previous close.
    pub net_change: Option<f64>,
    /// Lower circuit limit.
    pub lower_circuit_limit: Option<f64>,
    /// Upper circuit limit.
    pub upper_circuit_limit: Option<f64>,
    /// Year low.
    pub yl: Option<f64>,
    /// Year high.
    pub yh: Option<f64>,
    /// Daily OHLC, absent for some instruments.
    pub ohlc: Option<Ohlc>,
}

/// One market-data API response.
///
/// Decoded from the wire shape
/// `{ "data": { "request_id", "time_in_millis", "token_data" }, "success" }`.
/// `response_time` is when the envelope was produced upstream, not when the
/// market data was captured.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketEnvelope {
    /// Correlates one fetch call.
    pub request_id: String,
    /// Envelope response time.
    pub response_time: DateTime<Utc>,
    /// Upstream success flag.
    pub success: bool,
    /// Instrument identifier → snapshot, iterated in key order.
    pub token_data: BTreeMap<String, Snapshot>,
}

impl MarketEnvelope {
    /// Number of instruments in the envelope.
    #[must_use]
    pub fn len(&self) -> usize {
        self.token_data.len()
    }

    /// Whether the envelope carries no instruments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.token_data.is_empty()
    }

    fn from_wire(response: wire::ApiResponse) -> Result<Self, EnvelopeError> {
        let data = response.data;
        let response_time = DateTime::from_timestamp_millis(data.time_in_millis)
            .ok_or(EnvelopeError::ResponseTimeOutOfRange(data.time_in_millis))?;

        Ok(Self {
            request_id: data.request_id,
            response_time,
            success: response.success,
            token_data: data.token_data,
        })
    }
}

/// Envelope-level conversion errors.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// `time_in_millis` cannot be represented as an instant.
    #[error("time_in_millis {0} is out of range")]
    ResponseTimeOutOfRange(i64),
}

impl<'de> Deserialize<'de> for MarketEnvelope {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let response = wire::ApiResponse::deserialize(deserializer)?;
        Self::from_wire(response).map_err(serde::de::Error::custom)
    }
}

mod wire {
    use std::collections::BTreeMap;

    use serde::Deserialize;

    use super::Snapshot;

    #[derive(Debug, Deserialize)]
    pub struct ApiResponse {
        pub data: ApiData,
        #[serde(default)]
        pub success: bool,
    }

    #[derive(Debug, Deserialize)]
    pub struct ApiData {
        pub request_id: String,
        pub time_in_millis: i64,
        #[serde(default)]
        pub token_data: BTreeMap<String, Snapshot>,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENVELOPE: &str = r#"{
        "data": {
            "request_id": "req-1",
            "time_in_millis": 1762498358000,
            "token_data": {
                "NSE_INDEX|Nifty 50": {
                    "timestamp": "2025-11-07 06:52:38",
                    "lastTradeTime": "2025-11-07 04:00:00",
                    "lastPrice": 25492.3,
                    "closePrice": 25509.7,
                    "lastQuantity": 0,
                    "netChange": -17.4,
                    "yl": 21743.65,
                    "yh": 26104.2,
                    "ohlc": {
                        "interval": "1d",
                        "open": 25433.8,
                        "high": 25551.25,
                        "low": 25318.45,
                        "close": 25509.7,
                        "volume": 0,
                        "ts": 1762453800000
                    }
                }
            }
        },
        "success": true
    }"#;

    #[test]
    fn decodes_upstream_envelope() {
        let envelope: MarketEnvelope = serde_json::from_str(ENVELOPE).unwrap();

        assert_eq!(envelope.request_id, "req-1");
        assert!(envelope.success);
        assert_eq!(envelope.response_time.timestamp_millis(), 1_762_498_358_000);
        assert_eq!(envelope.len(), 1);

        let snapshot = &envelope.token_data["NSE_INDEX|Nifty 50"];
        assert_eq!(snapshot.last_price, Some(25492.3));
        assert_eq!(snapshot.oi, None);
        assert_eq!(snapshot.ohlc.and_then(|o| o.high), Some(25551.25));
    }

    #[test]
    fn null_numerics_and_missing_ohlc_are_none() {
        let json = r#"{"data":{"request_id":"r","time_in_millis":0,"token_data":{
            "X": {"timestamp": "2025-11-07 06:52:38", "lastPrice": null}
        }},"success":true}"#;

        let envelope: MarketEnvelope = serde_json::from_str(json).unwrap();
        let snapshot = &envelope.token_data["X"];

        assert_eq!(snapshot.last_price, None);
        assert!(snapshot.ohlc.is_none());
    }

    #[test]
    fn null_inside_ohlc_is_none() {
        let json = r#"{"data":{"request_id":"r","time_in_millis":0,"token_data":{
            "X": {"timestamp": "2025-11-07 06:52:38",
                  "ohlc": {"open": 1.0, "high": null, "low": 0.5, "close": 1.5}}
        }},"success":true}"#;

        let envelope: MarketEnvelope = serde_json::from_str(json).unwrap();
        let ohlc = envelope.token_data["X"].ohlc.unwrap();

        assert_eq!(ohlc.open, Some(1.0));
        assert_eq!(ohlc.high, None);
        assert_eq!(ohlc.volume, None);
    }

    #[test]
    fn missing_data_block_is_rejected() {
        assert!(serde_json::from_str::<MarketEnvelope>(r#"{"success":true}"#).is_err());
    }

    #[test]
    fn out_of_range_millis_is_rejected() {
        let json = format!(
            r#"{{"data":{{"request_id":"r","time_in_millis":{},"token_data":{{}}}},"success":true}}"#,
            i64::MAX
        );
        let err = serde_json::from_str::<MarketEnvelope>(&json).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }
}
