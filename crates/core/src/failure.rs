//! Failure taxonomy for terminal generation failures.
//!
//! Every failed generation carries exactly one [`FailureReason`] and one
//! [`FailureStage`]. Collaborators raise closed typed error kinds that map
//! directly onto the taxonomy; [`classify_message`] is the keyword
//! fallback for free-text errors from uncooperative third-party calls.
//! Ties resolve toward the earliest applicable stage in the pipeline.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// FailureReason
// ---------------------------------------------------------------------------

/// Why a generation failed. This is the complete caller-facing set; raw
/// diagnostics never cross the API boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    Timeout,
    ScraperError,
    AiError,
    ValidationError,
    InsufficientContent,
    NetworkError,
    RateLimit,
    InsufficientCredits,
    ContentMismatch,
    Unknown,
}

impl FailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::Timeout => "timeout",
            FailureReason::ScraperError => "scraper_error",
            FailureReason::AiError => "ai_error",
            FailureReason::ValidationError => "validation_error",
            FailureReason::InsufficientContent => "insufficient_content",
            FailureReason::NetworkError => "network_error",
            FailureReason::RateLimit => "rate_limit",
            FailureReason::InsufficientCredits => "insufficient_credits",
            FailureReason::ContentMismatch => "content_mismatch",
            FailureReason::Unknown => "unknown",
        }
    }
}

// ---------------------------------------------------------------------------
// FailureStage
// ---------------------------------------------------------------------------

/// Which pipeline step a failure occurred in. `PostProcessing` covers
/// credit and record bookkeeping after the AI work itself succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    Scraping,
    AiGeneration,
    Validation,
    PostProcessing,
    Unknown,
}

impl FailureStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureStage::Scraping => "scraping",
            FailureStage::AiGeneration => "ai_generation",
            FailureStage::Validation => "validation",
            FailureStage::PostProcessing => "post_processing",
            FailureStage::Unknown => "unknown",
        }
    }
}

// ---------------------------------------------------------------------------
// Keyword fallback classification
// ---------------------------------------------------------------------------

/// Classify a free-text error message into the taxonomy.
///
/// Only used for errors that did not arrive as typed collaborator kinds.
/// Keyword groups are checked in pipeline order so ambiguous messages
/// resolve toward the earliest applicable stage.
pub fn classify_message(message: &str) -> (FailureReason, FailureStage) {
    let msg = message.to_ascii_lowercase();

    let contains_any = |needles: &[&str]| needles.iter().any(|n| msg.contains(n));

    if contains_any(&["timeout", "timed out", "deadline"]) {
        return (FailureReason::Timeout, FailureStage::Scraping);
    }
    if contains_any(&["robots", "scrape", "fetch", "unreachable", "404", "403"]) {
        return (FailureReason::ScraperError, FailureStage::Scraping);
    }
    if contains_any(&["network", "connection", "dns", "refused"]) {
        return (FailureReason::NetworkError, FailureStage::Scraping);
    }
    if contains_any(&["rate limit", "too many requests", "429"]) {
        return (FailureReason::RateLimit, FailureStage::AiGeneration);
    }
    if contains_any(&["model", "completion", "provider", "generation"]) {
        return (FailureReason::AiError, FailureStage::AiGeneration);
    }
    if contains_any(&["invalid", "validation", "schema", "malformed"]) {
        return (FailureReason::ValidationError, FailureStage::Validation);
    }
    if contains_any(&["credit", "balance", "quota"]) {
        return (FailureReason::InsufficientCredits, FailureStage::PostProcessing);
    }

    (FailureReason::Unknown, FailureStage::Unknown)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn as_str_matches_serde_form() {
        let json = serde_json::to_string(&FailureReason::ScraperError).unwrap();
        assert_eq!(json, format!("\"{}\"", FailureReason::ScraperError.as_str()));
        let json = serde_json::to_string(&FailureStage::AiGeneration).unwrap();
        assert_eq!(json, format!("\"{}\"", FailureStage::AiGeneration.as_str()));
    }

    #[test]
    fn timeout_classified_first() {
        let (reason, stage) = classify_message("request timed out after 30s");
        assert_eq!(reason, FailureReason::Timeout);
        assert_eq!(stage, FailureStage::Scraping);
    }

    #[test]
    fn rate_limit_classified_to_ai_stage() {
        let (reason, stage) = classify_message("upstream returned 429 Too Many Requests");
        assert_eq!(reason, FailureReason::RateLimit);
        assert_eq!(stage, FailureStage::AiGeneration);
    }

    #[test]
    fn ambiguous_message_resolves_to_earliest_stage() {
        // Mentions both fetching and validation; scraping wins.
        let (reason, stage) = classify_message("failed to fetch page for validation");
        assert_eq!(reason, FailureReason::ScraperError);
        assert_eq!(stage, FailureStage::Scraping);
    }

    #[test]
    fn unknown_message_falls_through() {
        let (reason, stage) = classify_message("something odd happened");
        assert_eq!(reason, FailureReason::Unknown);
        assert_eq!(stage, FailureStage::Unknown);
    }
}
