//! The generation orchestrator.
//!
//! Sequences one request through analysis, the compatibility gate, credit
//! reservation, AI generation, shape validation, and scoring. The credit
//! invariant holds on every path: each issued reservation is resolved by
//! exactly one commit or refund, and a failure to apply either is logged
//! and flagged for reconciliation rather than masking the original
//! outcome from the caller.

use std::sync::Arc;
use std::time::Duration;

use schemagen_core::billing::{BillingPolicy, GENERATION_CREDIT_COST, MAX_CONTENT_TYPES_PER_URL};
use schemagen_core::candidate::{CandidateSchema, ComplianceReport};
use schemagen_core::compatibility::{self, Compatibility};
use schemagen_core::content_type::ContentType;
use schemagen_core::failure::{classify_message, FailureReason, FailureStage};
use schemagen_core::fact_sheet::FactSheet;
use schemagen_core::scoring::score_candidate;
use schemagen_core::types::AccountId;
use schemagen_events::{
    EventBus, PlatformEvent, EVENT_BILLING_RECONCILIATION_REQUIRED, EVENT_GENERATION_FAILED,
    EVENT_GENERATION_SUCCEEDED,
};
use schemagen_ledger::{CreditLedger, LedgerError, ReservationToken};
use schemagen_providers::{
    AnalyzerError, ComplianceValidator, ContentAnalyzer, GeneratorError, SchemaGenerator,
    ShapeValidator, ValidatorError,
};
use serde_json::Value;

use crate::error::PipelineError;
use crate::record::GenerationRecord;
use crate::store::RecordStore;

// ---------------------------------------------------------------------------
// Request / outcome / config
// ---------------------------------------------------------------------------

/// One generation request. Immutable; constructed once per call.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Absolute http/https URL of the page to generate markup for.
    pub url: String,
    pub requested_type: ContentType,
    pub account_id: AccountId,
    /// Resolved billing policy for this account, passed in explicitly.
    pub billing: BillingPolicy,
    /// Opaque pass-through to the AI generator.
    pub options: Value,
}

/// A successful generation.
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    pub record: GenerationRecord,
    /// Whether a credit was consumed (false on exempt/already-paid work).
    pub charged: bool,
}

/// Tunables for the orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Upper bound on one content-analysis call.
    pub analyze_timeout: Duration,
    /// Delay between URLs in a batch run.
    pub batch_pacing: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            analyze_timeout: Duration::from_secs(30),
            batch_pacing: Duration::from_millis(500),
        }
    }
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Owns the collaborators and sequences the request lifecycle.
pub struct Orchestrator {
    analyzer: Arc<dyn ContentAnalyzer>,
    pub(crate) generator: Arc<dyn SchemaGenerator>,
    shape_validator: Arc<dyn ShapeValidator>,
    compliance_validator: Option<Arc<dyn ComplianceValidator>>,
    ledger: Arc<dyn CreditLedger>,
    pub(crate) store: Arc<dyn RecordStore>,
    bus: Arc<EventBus>,
    pub(crate) config: OrchestratorConfig,
}

impl Orchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        analyzer: Arc<dyn ContentAnalyzer>,
        generator: Arc<dyn SchemaGenerator>,
        shape_validator: Arc<dyn ShapeValidator>,
        compliance_validator: Option<Arc<dyn ComplianceValidator>>,
        ledger: Arc<dyn CreditLedger>,
        store: Arc<dyn RecordStore>,
        bus: Arc<EventBus>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            analyzer,
            generator,
            shape_validator,
            compliance_validator,
            ledger,
            store,
            bus,
            config,
        }
    }

    /// Run one request through the full state machine.
    pub async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationOutcome, PipelineError> {
        validate_request_url(&request.url)?;

        // Duplicate and per-URL type-cap checks: cheap store lookups,
        // before any network work.
        let inherited_deletions = self.check_url_type_budget(&request).await?;

        // Analysis, bounded by the configured timeout.
        let facts = self.analyze(&request.url).await?;

        // Compatibility gate. Runs before reservation so a mismatch never
        // consumes a billing unit.
        if let Compatibility::Incompatible {
            reason,
            alternatives,
        } = compatibility::check(&request.requested_type, &facts)
        {
            tracing::info!(
                url = %request.url,
                requested_type = %request.requested_type,
                "Compatibility gate rejected request",
            );
            return Err(PipelineError::Incompatible {
                reason,
                alternatives,
            });
        }

        // Reserve a credit unless this work is exempt or already paid.
        let token = self.reserve(&request).await?;
        let charged = token.is_some();

        // The paid phase begins: create the pending record.
        let mut record = GenerationRecord::new_pending(
            request.account_id.clone(),
            request.url.clone(),
            request.requested_type.clone(),
        );
        record.deletion_count = inherited_deletions;
        if let Err(e) = self.store.create(record.clone()).await {
            if let Some(token) = token.as_ref() {
                self.refund_or_flag(token, &record, "record_create_failed").await;
            }
            return Err(PipelineError::Internal(format!(
                "failed to create generation record: {e}"
            )));
        }

        // AI generation.
        let candidates = match self
            .generator
            .generate(&facts, &request.requested_type, &request.options)
            .await
        {
            Ok(candidates) => candidates,
            Err(e) => {
                let (reason, stage) = classify_generator_error(&e);
                return Err(self.fail(record, token, reason, stage, e.to_string()).await);
            }
        };
        if candidates.is_empty() {
            return Err(self
                .fail(
                    record,
                    token,
                    FailureReason::InsufficientContent,
                    FailureStage::AiGeneration,
                    "the AI generator returned no candidates".to_string(),
                )
                .await);
        }

        // Shape validation: keep structurally valid candidates only.
        let reports = match self.shape_validator.validate_batch(&candidates).await {
            Ok(reports) => reports,
            Err(e) => {
                let (reason, stage) = classify_validator_error(&e);
                return Err(self.fail(record, token, reason, stage, e.to_string()).await);
            }
        };
        let valid: Vec<CandidateSchema> = candidates
            .into_iter()
            .zip(reports.iter())
            .filter(|(_, report)| report.is_valid)
            .map(|(candidate, _)| candidate)
            .collect();
        if valid.is_empty() {
            return Err(self
                .fail(
                    record,
                    token,
                    FailureReason::ValidationError,
                    FailureStage::Validation,
                    "no candidates passed structural validation".to_string(),
                )
                .await);
        }

        // Score the primary candidate.
        let final_type = match &request.requested_type {
            ContentType::Auto => valid[0]
                .schema_type()
                .map(ContentType::parse)
                .unwrap_or(ContentType::Auto),
            other => other.clone(),
        };
        let compliance = self.compliance_report(&valid[0]).await;
        let score = score_candidate(&valid[0], compliance.as_ref());

        // Commit the reservation, then persist success.
        if let Some(token) = token.as_ref() {
            if let Err(e) = self.ledger.commit(token).await {
                // Completed work is never refunded; flag instead.
                tracing::error!(
                    record_id = %record.id,
                    account_id = %record.account_id,
                    error = %e,
                    "Failed to commit credit reservation",
                );
                self.flag_reconciliation(&record, "commit", token.amount, &e.to_string());
            }
        }

        record.mark_success(final_type, valid, score);
        if let Err(e) = self.store.update(record.clone()).await {
            tracing::error!(record_id = %record.id, error = %e, "Failed to persist successful record");
            return Err(PipelineError::Generation {
                reason: FailureReason::Unknown,
                stage: FailureStage::PostProcessing,
                message: "failed to persist the generation result".to_string(),
            });
        }

        tracing::info!(
            record_id = %record.id,
            account_id = %record.account_id,
            final_type = %record.final_type,
            score = record.score.as_ref().map(|s| s.overall_score).unwrap_or_default(),
            charged,
            "Generation succeeded",
        );

        self.bus.publish(
            PlatformEvent::new(EVENT_GENERATION_SUCCEEDED)
                .with_record(record.id)
                .with_account(record.account_id.clone())
                .with_payload(serde_json::json!({
                    "url": record.url,
                    "content_type": record.final_type.as_str(),
                    "score": record.score.as_ref().map(|s| s.overall_score),
                })),
        );

        Ok(GenerationOutcome { record, charged })
    }

    // -----------------------------------------------------------------------
    // Steps
    // -----------------------------------------------------------------------

    /// Reject duplicates and enforce the per-URL content-type cap.
    /// Returns the deletion count to carry into the new record.
    async fn check_url_type_budget(
        &self,
        request: &GenerationRequest,
    ) -> Result<u32, PipelineError> {
        let mut inherited_deletions = 0;

        if request.requested_type != ContentType::Auto {
            let existing = self
                .store
                .find_latest_for_url_type(
                    &request.account_id,
                    &request.url,
                    &request.requested_type,
                )
                .await
                .map_err(|e| PipelineError::Internal(e.to_string()))?;

            if let Some(existing) = existing {
                if !existing.deleted {
                    return Err(PipelineError::Conflict(format!(
                        "{} markup already exists for this URL; delete it to regenerate",
                        request.requested_type.as_str()
                    )));
                }
                inherited_deletions = existing.deletion_count;
            }
        }

        let type_count = self
            .store
            .count_types_for_url(&request.account_id, &request.url)
            .await
            .map_err(|e| PipelineError::Internal(e.to_string()))?;
        if type_count >= MAX_CONTENT_TYPES_PER_URL {
            return Err(PipelineError::Conflict(format!(
                "A URL is limited to {MAX_CONTENT_TYPES_PER_URL} content types"
            )));
        }

        Ok(inherited_deletions)
    }

    /// Run the content analyzer under the configured deadline. No record
    /// or reservation exists yet, so failures return directly.
    async fn analyze(&self, url: &str) -> Result<FactSheet, PipelineError> {
        match tokio::time::timeout(self.config.analyze_timeout, self.analyzer.analyze(url)).await {
            Ok(Ok(facts)) => Ok(facts),
            Ok(Err(e)) => {
                let (reason, stage) = classify_analyzer_error(&e);
                Err(PipelineError::Generation {
                    reason,
                    stage,
                    message: e.to_string(),
                })
            }
            Err(_) => Err(PipelineError::Generation {
                reason: FailureReason::Timeout,
                stage: FailureStage::Scraping,
                message: format!(
                    "content analysis exceeded {}s",
                    self.config.analyze_timeout.as_secs()
                ),
            }),
        }
    }

    /// Reserve one credit, or return `None` when this unit of work is not
    /// billable (exempt account, or the URL was already paid for by an
    /// earlier content-type).
    async fn reserve(
        &self,
        request: &GenerationRequest,
    ) -> Result<Option<ReservationToken>, PipelineError> {
        if request.billing.is_exempt() {
            tracing::debug!(account_id = %request.account_id, "Billing-exempt account; skipping reservation");
            return Ok(None);
        }

        let already_paid = self
            .store
            .has_successful_for_url(&request.account_id, &request.url)
            .await
            .map_err(|e| PipelineError::Internal(e.to_string()))?;
        if already_paid {
            tracing::debug!(
                account_id = %request.account_id,
                url = %request.url,
                "URL already paid for; skipping reservation",
            );
            return Ok(None);
        }

        match self
            .ledger
            .reserve(&request.account_id, GENERATION_CREDIT_COST)
            .await
        {
            Ok(token) => Ok(Some(token)),
            Err(e @ LedgerError::InsufficientFunds { .. }) => {
                Err(PipelineError::InsufficientCredits(e.to_string()))
            }
            Err(LedgerError::UnknownAccount(account)) => Err(PipelineError::InvalidRequest(
                format!("unknown billing account: {account}"),
            )),
            Err(e) => Err(PipelineError::Internal(e.to_string())),
        }
    }

    /// Fetch the optional compliance signal. Failures here degrade to
    /// "no signal" (the scoring default) and never fail the request.
    pub(crate) async fn compliance_report(
        &self,
        candidate: &CandidateSchema,
    ) -> Option<ComplianceReport> {
        let validator = self.compliance_validator.as_ref()?;
        match validator.check(candidate).await {
            Ok(report) => Some(report),
            Err(e) => {
                tracing::warn!(error = %e, "Compliance check failed; scoring without signal");
                None
            }
        }
    }

    // -----------------------------------------------------------------------
    // Failure path
    // -----------------------------------------------------------------------

    /// Terminal failure: refund (if reserved), mark the record failed,
    /// publish, and build the caller-facing error.
    async fn fail(
        &self,
        mut record: GenerationRecord,
        token: Option<ReservationToken>,
        reason: FailureReason,
        stage: FailureStage,
        message: String,
    ) -> PipelineError {
        tracing::warn!(
            record_id = %record.id,
            reason = reason.as_str(),
            stage = stage.as_str(),
            %message,
            "Generation failed",
        );

        // Refund first so no path can leave a dangling hold.
        if let Some(token) = token.as_ref() {
            self.refund_or_flag(token, &record, reason.as_str()).await;
        }

        record.mark_failed(reason, stage);
        if let Err(e) = self.store.update(record.clone()).await {
            tracing::error!(record_id = %record.id, error = %e, "Failed to persist failure state");
        }

        self.bus.publish(
            PlatformEvent::new(EVENT_GENERATION_FAILED)
                .with_record(record.id)
                .with_account(record.account_id.clone())
                .with_payload(serde_json::json!({
                    "url": record.url,
                    "reason": reason.as_str(),
                    "stage": stage.as_str(),
                })),
        );

        PipelineError::Generation {
            reason,
            stage,
            message,
        }
    }

    /// Refund a reservation; a refund failure is logged and flagged for
    /// manual reconciliation, never propagated.
    async fn refund_or_flag(
        &self,
        token: &ReservationToken,
        record: &GenerationRecord,
        reason: &str,
    ) {
        if let Err(e) = self.ledger.refund(token, reason).await {
            tracing::error!(
                record_id = %record.id,
                account_id = %record.account_id,
                error = %e,
                "Refund failed; flagging for reconciliation",
            );
            self.flag_reconciliation(record, "refund", token.amount, &e.to_string());
        }
    }

    fn flag_reconciliation(
        &self,
        record: &GenerationRecord,
        operation: &str,
        amount: i64,
        error: &str,
    ) {
        self.bus.publish(
            PlatformEvent::new(EVENT_BILLING_RECONCILIATION_REQUIRED)
                .with_record(record.id)
                .with_account(record.account_id.clone())
                .with_payload(serde_json::json!({
                    "operation": operation,
                    "amount": amount,
                    "error": error,
                })),
        );
    }

}

// ---------------------------------------------------------------------------
// Request validation and error classification
// ---------------------------------------------------------------------------

/// The URL must be absolute http/https.
fn validate_request_url(raw: &str) -> Result<(), PipelineError> {
    let parsed = url::Url::parse(raw)
        .map_err(|e| PipelineError::InvalidRequest(format!("invalid URL: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(PipelineError::InvalidRequest(format!(
            "URL scheme must be http or https, got {other}"
        ))),
    }
}

fn classify_analyzer_error(e: &AnalyzerError) -> (FailureReason, FailureStage) {
    match e {
        AnalyzerError::Timeout => (FailureReason::Timeout, FailureStage::Scraping),
        AnalyzerError::Unreachable(_) => (FailureReason::NetworkError, FailureStage::Scraping),
        AnalyzerError::RobotsDisallowed(_) | AnalyzerError::ParseError(_) => {
            (FailureReason::ScraperError, FailureStage::Scraping)
        }
    }
}

pub(crate) fn classify_generator_error(e: &GeneratorError) -> (FailureReason, FailureStage) {
    match e {
        GeneratorError::RateLimit => (FailureReason::RateLimit, FailureStage::AiGeneration),
        GeneratorError::Timeout => (FailureReason::Timeout, FailureStage::AiGeneration),
        // Free text from the provider: sniff the reason, but the stage is
        // known: we were inside the AI call.
        GeneratorError::Provider(message) => {
            let (reason, _) = classify_message(message);
            let reason = if reason == FailureReason::Unknown {
                FailureReason::AiError
            } else {
                reason
            };
            (reason, FailureStage::AiGeneration)
        }
    }
}

fn classify_validator_error(e: &ValidatorError) -> (FailureReason, FailureStage) {
    match e {
        ValidatorError::Timeout => (FailureReason::Timeout, FailureStage::Validation),
        ValidatorError::Service(_) => (FailureReason::ValidationError, FailureStage::Validation),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_validation_requires_absolute_http() {
        assert!(validate_request_url("https://example.com/page").is_ok());
        assert!(validate_request_url("http://example.com").is_ok());
        assert!(validate_request_url("ftp://example.com").is_err());
        assert!(validate_request_url("/relative/path").is_err());
        assert!(validate_request_url("not a url").is_err());
    }

    #[test]
    fn analyzer_errors_classify_to_scraping_stage() {
        let cases = [
            (AnalyzerError::Timeout, FailureReason::Timeout),
            (
                AnalyzerError::Unreachable("down".to_string()),
                FailureReason::NetworkError,
            ),
            (
                AnalyzerError::RobotsDisallowed("robots".to_string()),
                FailureReason::ScraperError,
            ),
            (
                AnalyzerError::ParseError("bad html".to_string()),
                FailureReason::ScraperError,
            ),
        ];
        for (err, expected) in cases {
            let (reason, stage) = classify_analyzer_error(&err);
            assert_eq!(reason, expected);
            assert_eq!(stage, FailureStage::Scraping);
        }
    }

    #[test]
    fn provider_text_is_sniffed_but_stage_stays_ai() {
        let (reason, stage) = classify_generator_error(&GeneratorError::Provider(
            "upstream rate limit exceeded".to_string(),
        ));
        assert_eq!(reason, FailureReason::RateLimit);
        assert_eq!(stage, FailureStage::AiGeneration);

        let (reason, stage) = classify_generator_error(&GeneratorError::Provider(
            "inscrutable vendor message".to_string(),
        ));
        assert_eq!(reason, FailureReason::AiError);
        assert_eq!(stage, FailureStage::AiGeneration);
    }
}
