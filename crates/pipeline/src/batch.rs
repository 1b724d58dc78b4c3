//! Batch generation: the same state machine run sequentially per URL
//! with a fixed pacing delay, aggregating per-URL outcomes. One URL's
//! failure never aborts the batch.

use schemagen_core::types::RecordId;
use serde::Serialize;

use crate::orchestrator::{GenerationRequest, Orchestrator};

/// One successfully generated URL in a batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSuccess {
    pub url: String,
    pub record_id: RecordId,
    pub score: Option<u8>,
}

/// One failed URL in a batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchError {
    pub url: String,
    pub error: String,
}

/// Aggregated outcomes of a batch run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    pub succeeded: Vec<BatchSuccess>,
    pub errors: Vec<BatchError>,
}

impl Orchestrator {
    /// Generate markup for each request in order.
    pub async fn generate_batch(&self, requests: Vec<GenerationRequest>) -> BatchSummary {
        let mut summary = BatchSummary::default();
        let total = requests.len();

        for (index, request) in requests.into_iter().enumerate() {
            let url = request.url.clone();
            match self.generate(request).await {
                Ok(outcome) => summary.succeeded.push(BatchSuccess {
                    url,
                    record_id: outcome.record.id,
                    score: outcome.record.score.as_ref().map(|s| s.overall_score),
                }),
                Err(e) => summary.errors.push(BatchError {
                    url,
                    error: e.to_string(),
                }),
            }

            // Pace requests; no delay after the last one.
            if index + 1 < total {
                tokio::time::sleep(self.config.batch_pacing).await;
            }
        }

        tracing::info!(
            total,
            succeeded = summary.succeeded.len(),
            failed = summary.errors.len(),
            "Batch generation finished",
        );
        summary
    }
}
