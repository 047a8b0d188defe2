//! Ingest outcome types shared by both streams.

use crate::application::ports::WriteError;
use crate::domain::decoder::DecodeError;
use crate::domain::market::FlattenError;
use crate::domain::stream::Stream;

/// What a successful ingest committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestReport {
    /// Stream the rows went to.
    pub stream: Stream,
    /// Rows committed.
    pub ingested: usize,
    /// Instruments whose snapshot carried no OHLC block (market data only).
    pub missing_ohlc: usize,
}

impl IngestReport {
    /// Report for a stream with no OHLC concept.
    #[must_use]
    pub const fn rows(stream: Stream, ingested: usize) -> Self {
        Self {
            stream,
            ingested,
            missing_ohlc: 0,
        }
    }
}

/// Why a payload was not ingested.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// Payload could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Payload decoded to zero records.
    #[error("payload contains no records")]
    NoRecords,

    /// A market snapshot could not be flattened.
    #[error(transparent)]
    Flatten(#[from] FlattenError),

    /// The store rejected the batch.
    #[error(transparent)]
    Write(#[from] WriteError),
}

impl IngestError {
    /// Short label for metrics and logs.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::Decode(DecodeError::Empty) | Self::NoRecords => "empty",
            Self::Decode(_) => "decode",
            Self::Flatten(_) => "flatten",
            Self::Write(WriteError::DeadlineExceeded { .. }) => "deadline",
            Self::Write(_) => "write",
        }
    }

    /// Whether the caller sent a bad payload, as opposed to a store failure.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        !matches!(self, Self::Write(_))
    }
}
