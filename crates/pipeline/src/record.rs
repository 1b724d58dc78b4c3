//! The persisted outcome of one generation request.

use schemagen_core::candidate::CandidateSchema;
use schemagen_core::content_type::ContentType;
use schemagen_core::failure::{FailureReason, FailureStage};
use schemagen_core::scoring::SchemaScore;
use schemagen_core::types::{AccountId, RecordId, Timestamp};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// GenerationStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStatus {
    Pending,
    Success,
    Failed,
}

impl GenerationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationStatus::Pending => "pending",
            GenerationStatus::Success => "success",
            GenerationStatus::Failed => "failed",
        }
    }
}

// ---------------------------------------------------------------------------
// GenerationRecord
// ---------------------------------------------------------------------------

/// One generation, from pending through success or failure, plus any
/// refinement history. Records are never physically deleted by normal
/// flow; `deleted` is a soft flag and `deletion_count` caps regeneration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub id: RecordId,
    pub account_id: AccountId,
    pub url: String,
    pub requested_type: ContentType,
    /// The requested type, or the detected type of the first candidate
    /// when the request was `Auto`.
    pub final_type: ContentType,
    pub status: GenerationStatus,
    pub candidates: Vec<CandidateSchema>,
    pub score: Option<SchemaScore>,
    pub refinement_count: u32,
    /// Soft-delete flag. A deleted record frees its url+type pair for one
    /// regeneration.
    pub deleted: bool,
    /// How many times this url+type pair has been soft-deleted. Carried
    /// forward into the regenerated record so the cap holds across
    /// generations.
    pub deletion_count: u32,
    pub failure_reason: Option<FailureReason>,
    pub failure_stage: Option<FailureStage>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl GenerationRecord {
    /// Create a pending record at the start of the paid phase.
    pub fn new_pending(
        account_id: impl Into<AccountId>,
        url: impl Into<String>,
        requested_type: ContentType,
    ) -> Self {
        let now = chrono::Utc::now();
        Self {
            id: uuid::Uuid::new_v4(),
            account_id: account_id.into(),
            url: url.into(),
            final_type: requested_type.clone(),
            requested_type,
            status: GenerationStatus::Pending,
            candidates: Vec::new(),
            score: None,
            refinement_count: 0,
            deleted: false,
            deletion_count: 0,
            failure_reason: None,
            failure_stage: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Transition to success with the surviving candidates and score.
    pub fn mark_success(
        &mut self,
        final_type: ContentType,
        candidates: Vec<CandidateSchema>,
        score: SchemaScore,
    ) {
        self.final_type = final_type;
        self.candidates = candidates;
        self.score = Some(score);
        self.status = GenerationStatus::Success;
        self.failure_reason = None;
        self.failure_stage = None;
        self.updated_at = chrono::Utc::now();
    }

    /// Transition to failed with exactly one reason and one stage.
    pub fn mark_failed(&mut self, reason: FailureReason, stage: FailureStage) {
        self.status = GenerationStatus::Failed;
        self.failure_reason = Some(reason);
        self.failure_stage = Some(stage);
        self.updated_at = chrono::Utc::now();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_is_pending_and_undeleted() {
        let r = GenerationRecord::new_pending("acct-1", "https://example.com", ContentType::Auto);
        assert_eq!(r.status, GenerationStatus::Pending);
        assert!(!r.deleted);
        assert_eq!(r.deletion_count, 0);
        assert_eq!(r.refinement_count, 0);
        assert_eq!(r.final_type, ContentType::Auto);
    }

    #[test]
    fn mark_failed_sets_reason_and_stage() {
        let mut r =
            GenerationRecord::new_pending("acct-1", "https://example.com", ContentType::Auto);
        r.mark_failed(FailureReason::AiError, FailureStage::AiGeneration);
        assert_eq!(r.status, GenerationStatus::Failed);
        assert_eq!(r.failure_reason, Some(FailureReason::AiError));
        assert_eq!(r.failure_stage, Some(FailureStage::AiGeneration));
    }

    #[test]
    fn mark_success_clears_failure_fields() {
        let mut r =
            GenerationRecord::new_pending("acct-1", "https://example.com", ContentType::Auto);
        r.mark_failed(FailureReason::AiError, FailureStage::AiGeneration);
        r.mark_success(
            ContentType::Article,
            vec![],
            schemagen_core::scoring::score_candidate(
                &schemagen_core::candidate::CandidateSchema::new(serde_json::json!({})),
                None,
            ),
        );
        assert_eq!(r.status, GenerationStatus::Success);
        assert!(r.failure_reason.is_none());
        assert_eq!(r.final_type, ContentType::Article);
    }
}
