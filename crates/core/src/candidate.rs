//! The candidate schema model and collaborator report types.
//!
//! A [`CandidateSchema`] wraps the raw JSON-LD object produced by the AI
//! generator. It stays `serde_json::Value` underneath (candidate shapes
//! vary by type), but the accessors the scoring engine and orchestrator
//! need are typed here in one place.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// CandidateSchema
// ---------------------------------------------------------------------------

/// One generated JSON-LD object (`@context`/`@type` plus properties).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateSchema(Value);

impl CandidateSchema {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// The `@context` declaration, when it is a plain string.
    pub fn context(&self) -> Option<&str> {
        self.0.get("@context").and_then(Value::as_str)
    }

    /// The declared `@type`. Arrays of types resolve to the first entry.
    pub fn schema_type(&self) -> Option<&str> {
        match self.0.get("@type") {
            Some(Value::String(s)) => Some(s.as_str()),
            Some(Value::Array(arr)) => arr.first().and_then(Value::as_str),
            _ => None,
        }
    }

    /// The display name: `name`, falling back to `headline`.
    pub fn name(&self) -> Option<&str> {
        self.property("name")
            .or_else(|| self.property("headline"))
            .and_then(Value::as_str)
    }

    /// Look up a top-level property.
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// True when the property exists and is neither `null` nor `""`.
    pub fn has_property(&self, key: &str) -> bool {
        match self.0.get(key) {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Array(arr)) => !arr.is_empty(),
            Some(_) => true,
        }
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

// ---------------------------------------------------------------------------
// Collaborator reports
// ---------------------------------------------------------------------------

/// Structural validity report from the shape validator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShapeReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Error/warning counts from the external compliance validator. Feeds the
/// scoring engine's bonus tier.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub error_count: u32,
    pub warning_count: u32,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accessors_on_typical_candidate() {
        let c = CandidateSchema::new(json!({
            "@context": "https://schema.org",
            "@type": "Article",
            "headline": "A headline",
            "description": "Some description",
        }));
        assert_eq!(c.context(), Some("https://schema.org"));
        assert_eq!(c.schema_type(), Some("Article"));
        assert_eq!(c.name(), Some("A headline"));
        assert!(c.has_property("description"));
        assert!(!c.has_property("author"));
    }

    #[test]
    fn type_array_resolves_to_first() {
        let c = CandidateSchema::new(json!({
            "@type": ["Product", "Thing"],
        }));
        assert_eq!(c.schema_type(), Some("Product"));
    }

    #[test]
    fn name_prefers_name_over_headline() {
        let c = CandidateSchema::new(json!({
            "name": "the name",
            "headline": "the headline",
        }));
        assert_eq!(c.name(), Some("the name"));
    }

    #[test]
    fn empty_and_null_properties_are_absent() {
        let c = CandidateSchema::new(json!({
            "description": "",
            "author": null,
            "keywords": [],
        }));
        assert!(!c.has_property("description"));
        assert!(!c.has_property("author"));
        assert!(!c.has_property("keywords"));
    }
}
