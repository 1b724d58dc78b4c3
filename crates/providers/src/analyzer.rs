//! Content analyzer interface and HTTP adapter.
//!
//! The analyzer turns a URL into a [`FactSheet`]. Fetching, robots
//! handling, and content extraction all happen service-side; this crate
//! only defines the contract and the thin client.

use std::time::Duration;

use async_trait::async_trait;
use schemagen_core::fact_sheet::FactSheet;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Closed error-kind set raised by the analyzer.
#[derive(Debug, thiserror::Error)]
pub enum AnalyzerError {
    #[error("URL unreachable: {0}")]
    Unreachable(String),

    #[error("Fetching disallowed by robots.txt: {0}")]
    RobotsDisallowed(String),

    #[error("Analysis timed out")]
    Timeout,

    #[error("Failed to parse page content: {0}")]
    ParseError(String),
}

// ---------------------------------------------------------------------------
// ContentAnalyzer
// ---------------------------------------------------------------------------

/// Turns one URL into a fact sheet, or fails with a typed kind.
#[async_trait]
pub trait ContentAnalyzer: Send + Sync {
    async fn analyze(&self, url: &str) -> Result<FactSheet, AnalyzerError>;
}

// ---------------------------------------------------------------------------
// HttpContentAnalyzer
// ---------------------------------------------------------------------------

/// Default analyzer service timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for a remote analyzer service.
///
/// `POST {base_url}/analyze` with `{"url": ...}`, expecting a
/// [`FactSheet`] JSON body on success.
pub struct HttpContentAnalyzer {
    client: reqwest::Client,
    base_url: String,
}

impl HttpContentAnalyzer {
    pub fn new(base_url: impl Into<String>, user_agent: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .user_agent(user_agent.to_string())
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl ContentAnalyzer for HttpContentAnalyzer {
    async fn analyze(&self, url: &str) -> Result<FactSheet, AnalyzerError> {
        let endpoint = format!("{}/analyze", self.base_url.trim_end_matches('/'));

        let response = self
            .client
            .post(&endpoint)
            .json(&serde_json::json!({ "url": url }))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AnalyzerError::Timeout
                } else {
                    AnalyzerError::Unreachable(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if let Some(err) = classify_status(status) {
            let body = response.text().await.unwrap_or_default();
            return Err(err(body));
        }

        response
            .json::<FactSheet>()
            .await
            .map_err(|e| AnalyzerError::ParseError(e.to_string()))
    }
}

/// Map an analyzer-service status code onto an error constructor.
///
/// The service mirrors its own typed kinds: 403 robots, 422 parse,
/// 504 timeout, other non-2xx unreachable.
fn classify_status(status: u16) -> Option<fn(String) -> AnalyzerError> {
    match status {
        200..=299 => None,
        403 => Some(AnalyzerError::RobotsDisallowed),
        422 => Some(AnalyzerError::ParseError),
        504 => Some(|_| AnalyzerError::Timeout),
        _ => Some(AnalyzerError::Unreachable),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
