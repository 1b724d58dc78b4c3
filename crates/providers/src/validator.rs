//! Schema validator interfaces and HTTP adapter.
//!
//! Two distinct signals come from the validation service: structural
//! shape validity (gates which candidates survive) and compliance counts
//! (feeds the scoring engine's bonus tier).

use async_trait::async_trait;
use schemagen_core::candidate::{CandidateSchema, ComplianceReport, ShapeReport};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ValidatorError {
    #[error("Validation timed out")]
    Timeout,

    #[error("Validation service error: {0}")]
    Service(String),
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Structural shape validation.
#[async_trait]
pub trait ShapeValidator: Send + Sync {
    async fn validate(&self, candidate: &CandidateSchema) -> Result<ShapeReport, ValidatorError>;

    /// Validate several candidates, preserving input order.
    async fn validate_batch(
        &self,
        candidates: &[CandidateSchema],
    ) -> Result<Vec<ShapeReport>, ValidatorError> {
        let mut reports = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            reports.push(self.validate(candidate).await?);
        }
        Ok(reports)
    }
}

/// Compliance error/warning counts for the scoring bonus.
#[async_trait]
pub trait ComplianceValidator: Send + Sync {
    async fn check(&self, candidate: &CandidateSchema)
        -> Result<ComplianceReport, ValidatorError>;
}

// ---------------------------------------------------------------------------
// HttpSchemaValidator
// ---------------------------------------------------------------------------

/// Client for the remote validation service; implements both traits.
pub struct HttpSchemaValidator {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSchemaValidator {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    async fn post<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        candidate: &CandidateSchema,
    ) -> Result<T, ValidatorError> {
        let endpoint = format!("{}{path}", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&endpoint)
            .json(candidate)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ValidatorError::Timeout
                } else {
                    ValidatorError::Service(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(ValidatorError::Service(format!(
                "status {}",
                response.status()
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ValidatorError::Service(format!("malformed response: {e}")))
    }
}

#[async_trait]
impl ShapeValidator for HttpSchemaValidator {
    async fn validate(&self, candidate: &CandidateSchema) -> Result<ShapeReport, ValidatorError> {
        self.post("/v1/validate", candidate).await
    }
}

#[async_trait]
impl ComplianceValidator for HttpSchemaValidator {
    async fn check(
        &self,
        candidate: &CandidateSchema,
    ) -> Result<ComplianceReport, ValidatorError> {
        self.post("/v1/compliance", candidate).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
