//! AI schema generator interface, provider selection, and HTTP adapter.

use std::time::Duration;

use async_trait::async_trait;
use schemagen_core::candidate::CandidateSchema;
use schemagen_core::content_type::ContentType;
use schemagen_core::fact_sheet::FactSheet;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Closed error-kind set raised by the generator.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    #[error("AI provider rate limit exceeded")]
    RateLimit,

    #[error("AI generation timed out")]
    Timeout,

    /// Anything else the provider reported; the message is free text from
    /// an uncooperative third party and is classified by keyword fallback.
    #[error("AI provider error: {0}")]
    Provider(String),
}

// ---------------------------------------------------------------------------
// Provider selection
// ---------------------------------------------------------------------------

/// Which AI backend serves this generator instance.
///
/// Selected by explicit configuration and injected at construction; two
/// orchestrators in one process can use different backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    OpenAi,
    Anthropic,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Anthropic => "anthropic",
        }
    }

    /// Parse a configured provider name. Unknown names default to
    /// `OpenAi` so a typo degrades loudly in logs, not to a crash.
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "anthropic" => ProviderKind::Anthropic,
            "openai" => ProviderKind::OpenAi,
            other => {
                tracing::warn!(provider = other, "Unknown AI provider, defaulting to openai");
                ProviderKind::OpenAi
            }
        }
    }
}

/// Connection settings for one generator instance.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub kind: ProviderKind,
    /// Base URL of the generation gateway.
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout: Duration,
}

// ---------------------------------------------------------------------------
// SchemaGenerator
// ---------------------------------------------------------------------------

/// Result of one refinement pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefineOutcome {
    pub candidates: Vec<CandidateSchema>,
    /// Human-readable summary of what changed, one entry per edit.
    pub change_summary: Vec<String>,
}

/// Generate and refine candidate schemas from analyzed page content.
///
/// `generate` may return an empty list; the orchestrator treats that as a
/// generation failure, not this trait.
#[async_trait]
pub trait SchemaGenerator: Send + Sync {
    async fn generate(
        &self,
        facts: &FactSheet,
        requested: &ContentType,
        options: &Value,
    ) -> Result<Vec<CandidateSchema>, GeneratorError>;

    async fn refine(
        &self,
        candidates: &[CandidateSchema],
        url: &str,
        refinement_count: u32,
        facts: Option<&FactSheet>,
        options: &Value,
    ) -> Result<RefineOutcome, GeneratorError>;
}

// ---------------------------------------------------------------------------
// HttpSchemaGenerator
// ---------------------------------------------------------------------------

/// Wire shape returned by the generation gateway.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Vec<CandidateSchema>,
}

/// Client for the remote generation gateway.
///
/// The gateway multiplexes AI backends; the configured [`ProviderKind`]
/// and model ride along in each request body.
pub struct HttpSchemaGenerator {
    client: reqwest::Client,
    config: GeneratorConfig,
}

impl HttpSchemaGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_default();
        Self { client, config }
    }

    async fn post(&self, path: &str, body: Value) -> Result<reqwest::Response, GeneratorError> {
        let endpoint = format!("{}{path}", self.config.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GeneratorError::Timeout
                } else {
                    GeneratorError::Provider(e.to_string())
                }
            })?;

        match response.status().as_u16() {
            200..=299 => Ok(response),
            429 => Err(GeneratorError::RateLimit),
            504 => Err(GeneratorError::Timeout),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(GeneratorError::Provider(format!("status {status}: {body}")))
            }
        }
    }
}

#[async_trait]
impl SchemaGenerator for HttpSchemaGenerator {
    async fn generate(
        &self,
        facts: &FactSheet,
        requested: &ContentType,
        options: &Value,
    ) -> Result<Vec<CandidateSchema>, GeneratorError> {
        let body = serde_json::json!({
            "provider": self.config.kind.as_str(),
            "model": self.config.model,
            "facts": facts,
            "requested_type": requested,
            "options": options,
        });

        let response = self.post("/v1/generate", body).await?;
        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| GeneratorError::Provider(format!("malformed gateway response: {e}")))?;

        tracing::debug!(
            provider = self.config.kind.as_str(),
            candidates = parsed.candidates.len(),
            "Generation gateway responded",
        );
        Ok(parsed.candidates)
    }

    async fn refine(
        &self,
        candidates: &[CandidateSchema],
        url: &str,
        refinement_count: u32,
        facts: Option<&FactSheet>,
        options: &Value,
    ) -> Result<RefineOutcome, GeneratorError> {
        let body = serde_json::json!({
            "provider": self.config.kind.as_str(),
            "model": self.config.model,
            "candidates": candidates,
            "url": url,
            "refinement_count": refinement_count,
            "facts": facts,
            "options": options,
        });

        let response = self.post("/v1/refine", body).await?;
        response
            .json::<RefineOutcome>()
            .await
            .map_err(|e| GeneratorError::Provider(format!("malformed gateway response: {e}")))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_kind_parse_known_names() {
        assert_eq!(ProviderKind::parse("openai"), ProviderKind::OpenAi);
        assert_eq!(ProviderKind::parse("Anthropic"), ProviderKind::Anthropic);
    }

    #[test]
    fn provider_kind_parse_unknown_defaults_to_openai() {
        assert_eq!(ProviderKind::parse("mystery"), ProviderKind::OpenAi);
    }

    #[test]
    fn provider_kind_serde_form() {
        let json = serde_json::to_string(&ProviderKind::Anthropic).unwrap();
        assert_eq!(json, "\"anthropic\"");
    }

    #[test]
    fn refine_outcome_deserializes_gateway_shape() {
        let outcome: RefineOutcome = serde_json::from_value(serde_json::json!({
            "candidates": [{"@type": "Article", "headline": "t"}],
            "change_summary": ["Added missing description"],
        }))
        .unwrap();
        assert_eq!(outcome.candidates.len(), 1);
        assert_eq!(outcome.change_summary.len(), 1);
    }
}
