//! Refinement, re-scoring, and soft deletion.
//!
//! Refinements are pre-paid by the original generation, so nothing here
//! touches the ledger. Content and score are always written together
//! (a refinement that updates one without the other must not be
//! observable), and the write is optimistic so two concurrent
//! refinements cannot both pass the limit check.

use schemagen_core::billing::MAX_DELETIONS_PER_RECORD;
use schemagen_core::candidate::CandidateSchema;
use schemagen_core::refinement;
use schemagen_core::scoring::{score_candidate, SchemaScore};
use schemagen_core::types::RecordId;
use serde_json::Value;

use crate::error::PipelineError;
use crate::orchestrator::{classify_generator_error, Orchestrator};
use crate::record::{GenerationRecord, GenerationStatus};
use crate::store::StoreError;

/// A completed refinement pass.
#[derive(Debug, Clone)]
pub struct RefinementOutcome {
    pub record: GenerationRecord,
    /// What the refine operation changed, one entry per edit.
    pub change_summary: Vec<String>,
}

impl Orchestrator {
    /// Run one bounded refinement pass over a record's candidates.
    pub async fn refine(
        &self,
        record_id: RecordId,
        options: &Value,
    ) -> Result<RefinementOutcome, PipelineError> {
        let record = self.load(record_id).await?;

        if record.deleted {
            return Err(PipelineError::Conflict(
                "cannot refine a deleted markup".to_string(),
            ));
        }
        if record.status != GenerationStatus::Success {
            return Err(PipelineError::Conflict(
                "only successful generations can be refined".to_string(),
            ));
        }
        refinement::ensure_refinable(record.refinement_count)
            .map_err(|e| PipelineError::InvalidRequest(e.to_string()))?;

        let outcome = self
            .generator
            .refine(
                &record.candidates,
                &record.url,
                record.refinement_count,
                None,
                options,
            )
            .await
            .map_err(|e| {
                let (reason, stage) = classify_generator_error(&e);
                PipelineError::Generation {
                    reason,
                    stage,
                    message: e.to_string(),
                }
            })?;

        if outcome.candidates.is_empty() {
            return Err(PipelineError::InvalidRequest(
                "the refine operation returned no candidates".to_string(),
            ));
        }

        // Re-score the refined primary, then persist content + score +
        // incremented count in one conditional write.
        let compliance = self.compliance_report(&outcome.candidates[0]).await;
        let score = score_candidate(&outcome.candidates[0], compliance.as_ref());

        let updated = self
            .store
            .update_refinement(
                record_id,
                record.refinement_count,
                outcome.candidates,
                score,
            )
            .await
            .map_err(|e| match e {
                StoreError::Conflict(msg) => PipelineError::Conflict(msg),
                StoreError::NotFound(id) => PipelineError::NotFound(id),
                other => PipelineError::Internal(other.to_string()),
            })?;

        tracing::info!(
            record_id = %updated.id,
            refinement_count = updated.refinement_count,
            score = updated.score.as_ref().map(|s| s.overall_score).unwrap_or_default(),
            "Refinement applied",
        );

        Ok(RefinementOutcome {
            record: updated,
            change_summary: outcome.change_summary,
        })
    }

    /// Re-score hand-edited candidates and persist them with the new
    /// score in one write. Does not count as a refinement.
    pub async fn recalculate_score(
        &self,
        record_id: RecordId,
        candidates: Vec<CandidateSchema>,
    ) -> Result<SchemaScore, PipelineError> {
        if candidates.is_empty() {
            return Err(PipelineError::InvalidRequest(
                "at least one candidate is required to recalculate a score".to_string(),
            ));
        }

        let mut record = self.load(record_id).await?;

        let compliance = self.compliance_report(&candidates[0]).await;
        let score = score_candidate(&candidates[0], compliance.as_ref());

        record.candidates = candidates;
        record.score = Some(score.clone());
        record.updated_at = chrono::Utc::now();
        self.store
            .update(record)
            .await
            .map_err(|e| PipelineError::Internal(e.to_string()))?;

        Ok(score)
    }

    /// Soft-delete a record, freeing its url+type pair for exactly one
    /// regeneration.
    pub async fn soft_delete(&self, record_id: RecordId) -> Result<GenerationRecord, PipelineError> {
        let mut record = self.load(record_id).await?;

        if record.deleted {
            return Err(PipelineError::Conflict(
                "markup is already deleted".to_string(),
            ));
        }
        if record.deletion_count >= MAX_DELETIONS_PER_RECORD {
            return Err(PipelineError::Conflict(format!(
                "this URL and content type has already been regenerated; at most {MAX_DELETIONS_PER_RECORD} regeneration is allowed"
            )));
        }

        record.deleted = true;
        record.deletion_count += 1;
        record.updated_at = chrono::Utc::now();
        self.store
            .update(record.clone())
            .await
            .map_err(|e| PipelineError::Internal(e.to_string()))?;

        tracing::info!(
            record_id = %record.id,
            url = %record.url,
            content_type = %record.final_type,
            "Markup soft-deleted",
        );

        Ok(record)
    }

    async fn load(&self, record_id: RecordId) -> Result<GenerationRecord, PipelineError> {
        self.store.get(record_id).await.map_err(|e| match e {
            StoreError::NotFound(id) => PipelineError::NotFound(id),
            other => PipelineError::Internal(other.to_string()),
        })
    }
}
