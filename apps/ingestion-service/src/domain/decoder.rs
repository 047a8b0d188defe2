//! Flexible Decoder
//!
//! Accepts a JSON payload that is either a single record object or an array
//! of record objects and normalizes it to a `Vec` of records, so every
//! downstream consumer works on a sequence.
//!
//! Decoding is two independent parse attempts, first success wins:
//!
//! 1. the payload as `[Record, ...]`
//! 2. the payload as a bare `Record`, wrapped into a one-element `Vec`
//!
//! When both fail, the diagnostic from the attempt matching the payload's
//! shape is reported: a payload starting with `[` reports the batch error
//! (one bad element), anything else reports the single-record error.
//!
//! An empty array decodes to an empty `Vec`. Rejecting it is the caller's
//! decision.

use std::fmt;

use serde::de::DeserializeOwned;
use thiserror::Error;

/// Shape of the payload a decode attempt expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    /// A JSON array of records.
    Batch,
    /// A single JSON record object.
    Single,
}

impl fmt::Display for PayloadShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Batch => f.write_str("batch"),
            Self::Single => f.write_str("single-record"),
        }
    }
}

/// Errors from the flexible decoder.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Payload has no content at all.
    #[error("payload is empty")]
    Empty,

    /// Payload is not valid JSON for the expected record shape.
    #[error("malformed {shape} payload: {source}")]
    Malformed {
        /// Shape the reported diagnostic was produced for.
        shape: PayloadShape,
        /// Underlying parse diagnostic.
        #[source]
        source: serde_json::Error,
    },
}

impl DecodeError {
    /// Shape of the failed attempt, if the payload was not empty.
    #[must_use]
    pub const fn shape(&self) -> Option<PayloadShape> {
        match self {
            Self::Empty => None,
            Self::Malformed { shape, .. } => Some(*shape),
        }
    }
}

/// Decode a payload holding either one record or an array of records.
///
/// # Errors
///
/// Returns `DecodeError::Empty` for a blank payload and
/// `DecodeError::Malformed` when neither shape parses.
pub fn decode<T: DeserializeOwned>(payload: &[u8]) -> Result<Vec<T>, DecodeError> {
    let Some(first) = first_significant_byte(payload) else {
        return Err(DecodeError::Empty);
    };

    let batch_error = match serde_json::from_slice::<Vec<T>>(payload) {
        Ok(records) => return Ok(records),
        Err(e) => e,
    };

    match serde_json::from_slice::<T>(payload) {
        Ok(record) => Ok(vec![record]),
        Err(_) if first == b'[' => Err(DecodeError::Malformed {
            shape: PayloadShape::Batch,
            source: batch_error,
        }),
        Err(single_error) => Err(DecodeError::Malformed {
            shape: PayloadShape::Single,
            source: single_error,
        }),
    }
}

/// Decode a payload that must hold exactly one record object.
///
/// # Errors
///
/// Returns `DecodeError::Empty` for a blank payload and
/// `DecodeError::Malformed` when the record does not parse.
pub fn decode_one<T: DeserializeOwned>(payload: &[u8]) -> Result<T, DecodeError> {
    if first_significant_byte(payload).is_none() {
        return Err(DecodeError::Empty);
    }

    serde_json::from_slice(payload).map_err(|source| DecodeError::Malformed {
        shape: PayloadShape::Single,
        source,
    })
}

fn first_significant_byte(payload: &[u8]) -> Option<u8> {
    payload.iter().copied().find(|b| !b.is_ascii_whitespace())
}
