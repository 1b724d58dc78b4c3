//! Shared fakes and harness setup for pipeline integration tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use schemagen_core::candidate::{CandidateSchema, ShapeReport};
use schemagen_core::content_type::ContentType;
use schemagen_core::fact_sheet::FactSheet;
use schemagen_events::EventBus;
use schemagen_ledger::{CreditLedger, InMemoryCreditLedger, LedgerError, ReservationToken};
use schemagen_pipeline::{InMemoryRecordStore, Orchestrator, OrchestratorConfig};
use schemagen_providers::{
    AnalyzerError, ContentAnalyzer, GeneratorError, RefineOutcome, SchemaGenerator, ShapeValidator,
    ValidatorError,
};
use serde_json::{json, Value};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A fact sheet for an ordinary article page: no FAQ/product/event/video
/// signals.
pub fn article_facts() -> FactSheet {
    FactSheet {
        url: "https://example.com/post".to_string(),
        title: "An example post".to_string(),
        description: "A post about examples".to_string(),
        word_count: 600,
        has_images: true,
        image_count: 2,
        ..Default::default()
    }
}

/// A well-formed article candidate.
pub fn article_candidate() -> CandidateSchema {
    CandidateSchema::new(json!({
        "@context": "https://schema.org",
        "@type": "Article",
        "headline": "An example post",
        "description": "A post about examples that is long enough to sit in the sweet spot.",
        "url": "https://example.com/post",
    }))
}

// ---------------------------------------------------------------------------
// FakeAnalyzer
// ---------------------------------------------------------------------------

pub enum AnalyzerMode {
    Ok(FactSheet),
    Unreachable,
    Slow(Duration, FactSheet),
}

pub struct FakeAnalyzer {
    pub mode: AnalyzerMode,
}

#[async_trait]
impl ContentAnalyzer for FakeAnalyzer {
    async fn analyze(&self, _url: &str) -> Result<FactSheet, AnalyzerError> {
        match &self.mode {
            AnalyzerMode::Ok(facts) => Ok(facts.clone()),
            AnalyzerMode::Unreachable => {
                Err(AnalyzerError::Unreachable("host is down".to_string()))
            }
            AnalyzerMode::Slow(delay, facts) => {
                tokio::time::sleep(*delay).await;
                Ok(facts.clone())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// FakeGenerator
// ---------------------------------------------------------------------------

pub enum GeneratorMode {
    Candidates(Vec<CandidateSchema>),
    Empty,
    RateLimited,
}

pub struct FakeGenerator {
    pub mode: GeneratorMode,
}

#[async_trait]
impl SchemaGenerator for FakeGenerator {
    async fn generate(
        &self,
        _facts: &FactSheet,
        _requested: &ContentType,
        _options: &Value,
    ) -> Result<Vec<CandidateSchema>, GeneratorError> {
        match &self.mode {
            GeneratorMode::Candidates(candidates) => Ok(candidates.clone()),
            GeneratorMode::Empty => Ok(Vec::new()),
            GeneratorMode::RateLimited => Err(GeneratorError::RateLimit),
        }
    }

    async fn refine(
        &self,
        candidates: &[CandidateSchema],
        _url: &str,
        _refinement_count: u32,
        _facts: Option<&FactSheet>,
        _options: &Value,
    ) -> Result<RefineOutcome, GeneratorError> {
        // Improve the primary candidate by filling in an author.
        let refined: Vec<CandidateSchema> = candidates
            .iter()
            .map(|c| {
                let mut value = c.clone().into_value();
                if let Some(obj) = value.as_object_mut() {
                    obj.insert(
                        "author".to_string(),
                        json!({"@type": "Person", "name": "Jo Writer"}),
                    );
                }
                CandidateSchema::new(value)
            })
            .collect();
        Ok(RefineOutcome {
            candidates: refined,
            change_summary: vec!["Added a structured author".to_string()],
        })
    }
}

// ---------------------------------------------------------------------------
// FakeShapeValidator
// ---------------------------------------------------------------------------

pub struct FakeShapeValidator {
    pub valid: bool,
}

#[async_trait]
impl ShapeValidator for FakeShapeValidator {
    async fn validate(&self, _candidate: &CandidateSchema) -> Result<ShapeReport, ValidatorError> {
        Ok(ShapeReport {
            is_valid: self.valid,
            errors: if self.valid {
                vec![]
            } else {
                vec!["missing @type".to_string()]
            },
            warnings: vec![],
        })
    }
}

// ---------------------------------------------------------------------------
// FailingRefundLedger
// ---------------------------------------------------------------------------

/// Delegates to an in-memory ledger but refuses refunds, for testing the
/// reconciliation path.
pub struct FailingRefundLedger {
    pub inner: InMemoryCreditLedger,
}

#[async_trait]
impl CreditLedger for FailingRefundLedger {
    async fn reserve(
        &self,
        account_id: &str,
        amount: i64,
    ) -> Result<ReservationToken, LedgerError> {
        self.inner.reserve(account_id, amount).await
    }

    async fn commit(&self, token: &ReservationToken) -> Result<(), LedgerError> {
        self.inner.commit(token).await
    }

    async fn refund(&self, _token: &ReservationToken, _reason: &str) -> Result<(), LedgerError> {
        Err(LedgerError::Unavailable("ledger offline".to_string()))
    }

    async fn balance(&self, account_id: &str) -> Result<i64, LedgerError> {
        self.inner.balance(account_id).await
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

pub struct Harness {
    pub orchestrator: Orchestrator,
    pub ledger: Arc<InMemoryCreditLedger>,
    pub store: Arc<InMemoryRecordStore>,
    pub bus: Arc<EventBus>,
}

/// Build an orchestrator wired to fakes and in-memory backends.
pub fn harness(analyzer: AnalyzerMode, generator: GeneratorMode, shapes_valid: bool) -> Harness {
    harness_with_config(analyzer, generator, shapes_valid, test_config())
}

pub fn harness_with_config(
    analyzer: AnalyzerMode,
    generator: GeneratorMode,
    shapes_valid: bool,
    config: OrchestratorConfig,
) -> Harness {
    let ledger = Arc::new(InMemoryCreditLedger::new());
    let store = Arc::new(InMemoryRecordStore::new());
    let bus = Arc::new(EventBus::default());

    let orchestrator = Orchestrator::new(
        Arc::new(FakeAnalyzer { mode: analyzer }),
        Arc::new(FakeGenerator { mode: generator }),
        Arc::new(FakeShapeValidator {
            valid: shapes_valid,
        }),
        None,
        ledger.clone(),
        store.clone(),
        bus.clone(),
        config,
    );

    Harness {
        orchestrator,
        ledger,
        store,
        bus,
    }
}

/// A metered request for the standard test account.
pub fn request(url: &str, requested_type: ContentType) -> schemagen_pipeline::GenerationRequest {
    schemagen_pipeline::GenerationRequest {
        url: url.to_string(),
        requested_type,
        account_id: "acct-1".to_string(),
        billing: schemagen_core::billing::BillingPolicy::Metered,
        options: json!({}),
    }
}

/// Fast pacing so batch tests stay quick.
pub fn test_config() -> OrchestratorConfig {
    OrchestratorConfig {
        analyze_timeout: Duration::from_secs(5),
        batch_pacing: Duration::from_millis(1),
    }
}
