//! Ingest Market Data Use Case

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use super::report::{IngestError, IngestReport};
use crate::application::ports::RowSink;
use crate::domain::decoder::decode_one;
use crate::domain::market::{MarketEnvelope, MarketRow, flatten};
use crate::domain::stream::Stream;

/// Use case for ingesting one market-data envelope.
pub struct IngestMarketDataUseCase<S>
where
    S: RowSink<MarketRow>,
{
    sink: Arc<S>,
}

impl<S> IngestMarketDataUseCase<S>
where
    S: RowSink<MarketRow>,
{
    /// Create a new `IngestMarketDataUseCase`.
    pub const fn new(sink: Arc<S>) -> Self {
        Self { sink }
    }

    /// Decode the envelope, flatten it, and write all rows in one transaction.
    ///
    /// An envelope with no instruments is accepted and writes nothing.
    #[instrument(name = "ingest_market_data", skip_all, fields(request_id, instruments))]
    pub async fn execute(&self, payload: &[u8]) -> Result<IngestReport, IngestError> {
        let envelope: MarketEnvelope = decode_one(payload).inspect_err(|e| {
            warn!(error = %e, "Rejected market envelope");
        })?;
        let span = tracing::Span::current();
        span.record("request_id", envelope.request_id.as_str());
        span.record("instruments", envelope.len());

        if !envelope.success {
            warn!("Upstream flagged envelope as unsuccessful; ingesting anyway");
        }

        if envelope.is_empty() {
            debug!("Envelope carries no instruments");
            return Ok(IngestReport::rows(Stream::MarketData, 0));
        }

        let rows = flatten(&envelope).inspect_err(|e| {
            warn!(instrument = e.instrument(), error = %e, "Envelope failed to flatten");
        })?;

        let missing_ohlc = rows.iter().filter(|r| !r.ohlc_present).count();
        if missing_ohlc > 0 {
            debug!(missing_ohlc, "Instruments without OHLC stored as zeros");
        }

        let ingested = self.sink.write_all(&rows).await?;

        Ok(IngestReport {
            stream: Stream::MarketData,
            ingested,
            missing_ohlc,
        })
    }
}
