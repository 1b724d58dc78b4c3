//! The quality scoring engine.
//!
//! Pure function from one candidate schema (plus an optional compliance
//! signal) to an explainable 0-100 score. Identical inputs always produce
//! bit-identical output: all property tables are const slices, iteration
//! order is fixed, and no clock, randomness, or I/O is involved, so the
//! engine is safe to call speculatively (live preview) without touching
//! the ledger or record store.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::candidate::{CandidateSchema, ComplianceReport};

// ---------------------------------------------------------------------------
// Rubric weights
// ---------------------------------------------------------------------------

pub const WEIGHT_REQUIRED: f64 = 0.35;
pub const WEIGHT_RECOMMENDED: f64 = 0.25;
pub const WEIGHT_ADVANCED: f64 = 0.25;
pub const WEIGHT_CONTENT_QUALITY: f64 = 0.15;

/// Meta-description sweet spot, in characters.
pub const DESCRIPTION_SWEET_MIN: usize = 50;
pub const DESCRIPTION_SWEET_MAX: usize = 160;

/// Word count at which article-like content earns body-length credit.
pub const SUBSTANTIAL_WORD_COUNT: u64 = 250;

// ---------------------------------------------------------------------------
// Output value objects
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Critical,
    Important,
    NiceToHave,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Effort {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionCategory {
    Required,
    Recommended,
    Advanced,
    ContentQuality,
}

/// One actionable remediation step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionItem {
    /// Stable kebab-case identifier, e.g. `"add-description"`.
    pub id: String,
    pub description: String,
    pub priority: Priority,
    /// Estimated points gained by resolving this item.
    pub estimated_impact: u8,
    pub effort: Effort,
    pub category: ActionCategory,
}

/// Per-component sub-scores, each 0-100 before weighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub required: u8,
    pub recommended: u8,
    pub advanced: u8,
    pub content_quality: u8,
}

/// The full score for one candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaScore {
    pub overall_score: u8,
    pub breakdown: ScoreBreakdown,
    /// Additive compliance adjustment already folded into `overall_score`.
    pub compliance_bonus: i8,
    pub strengths: Vec<String>,
    pub suggestions: Vec<String>,
    pub action_items: Vec<ActionItem>,
}

// ---------------------------------------------------------------------------
// Compliance tiers
// ---------------------------------------------------------------------------

/// Six-tier bonus/penalty derived from the external compliance signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComplianceTier {
    Perfect,
    Good,
    Acceptable,
    MinorIssues,
    NonCompliant,
    SeverelyNonCompliant,
}

impl ComplianceTier {
    /// Classify a compliance report. An absent signal defaults to
    /// `Perfect`; upstream sanitization guarantees baseline compliance.
    pub fn from_report(report: Option<&ComplianceReport>) -> Self {
        let Some(r) = report else {
            return ComplianceTier::Perfect;
        };
        match (r.error_count, r.warning_count) {
            (0, 0) => ComplianceTier::Perfect,
            (0, w) if w <= 2 => ComplianceTier::Good,
            (0, _) => ComplianceTier::Acceptable,
            (1, _) => ComplianceTier::MinorIssues,
            (2..=3, _) => ComplianceTier::NonCompliant,
            _ => ComplianceTier::SeverelyNonCompliant,
        }
    }

    pub fn bonus(&self) -> i8 {
        match self {
            ComplianceTier::Perfect => 10,
            ComplianceTier::Good => 7,
            ComplianceTier::Acceptable => 5,
            ComplianceTier::MinorIssues => 0,
            ComplianceTier::NonCompliant => -5,
            ComplianceTier::SeverelyNonCompliant => -10,
        }
    }
}

// ---------------------------------------------------------------------------
// Property tables
// ---------------------------------------------------------------------------

struct RecommendedProperty {
    name: &'static str,
    priority: Priority,
    impact: u8,
    effort: Effort,
    remediation: &'static str,
}

/// The fixed recommended set. Order here is output order.
const RECOMMENDED_PROPERTIES: &[RecommendedProperty] = &[
    RecommendedProperty {
        name: "description",
        priority: Priority::Important,
        impact: 15,
        effort: Effort::Low,
        remediation: "Add a description summarizing the page in one or two sentences",
    },
    RecommendedProperty {
        name: "url",
        priority: Priority::NiceToHave,
        impact: 10,
        effort: Effort::Low,
        remediation: "Add the canonical URL of the page",
    },
    RecommendedProperty {
        name: "image",
        priority: Priority::Important,
        impact: 12,
        effort: Effort::Medium,
        remediation: "Add an image property pointing at a representative image",
    },
    RecommendedProperty {
        name: "author",
        priority: Priority::Important,
        impact: 12,
        effort: Effort::Medium,
        remediation: "Add an author with at least a name",
    },
    RecommendedProperty {
        name: "publisher",
        priority: Priority::Important,
        impact: 10,
        effort: Effort::Medium,
        remediation: "Add a publisher organization with a name",
    },
    RecommendedProperty {
        name: "datePublished",
        priority: Priority::NiceToHave,
        impact: 10,
        effort: Effort::Low,
        remediation: "Add datePublished in ISO 8601 format",
    },
    RecommendedProperty {
        name: "dateModified",
        priority: Priority::NiceToHave,
        impact: 10,
        effort: Effort::Low,
        remediation: "Add dateModified in ISO 8601 format",
    },
];

/// Advanced set for types with no topical extension.
const ADVANCED_BASE: &[&str] = &["mainEntityOfPage", "inLanguage", "keywords"];
/// Article-like types additionally get word-count and section credit.
const ADVANCED_ARTICLE: &[&str] = &[
    "mainEntityOfPage",
    "inLanguage",
    "keywords",
    "wordCount",
    "articleSection",
];
const ADVANCED_PRODUCT: &[&str] = &["offers", "aggregateRating", "brand", "sku", "review"];
const ADVANCED_EVENT: &[&str] = &["startDate", "endDate", "location", "offers", "organizer"];
const ADVANCED_FAQ: &[&str] = &["mainEntity"];
const ADVANCED_LOCAL_BUSINESS: &[&str] = &[
    "address",
    "telephone",
    "openingHoursSpecification",
    "geo",
    "priceRange",
];
const ADVANCED_VIDEO: &[&str] = &["thumbnailUrl", "uploadDate", "duration", "contentUrl"];
const ADVANCED_RECIPE: &[&str] = &[
    "recipeIngredient",
    "recipeInstructions",
    "cookTime",
    "recipeYield",
];

/// The advanced property set applicable to a declared `@type`. Scoring
/// must not penalize a type for properties that do not apply to it.
fn advanced_property_set(schema_type: Option<&str>) -> &'static [&'static str] {
    match schema_type {
        Some("Article") | Some("BlogPosting") | Some("NewsArticle") => ADVANCED_ARTICLE,
        Some("Product") => ADVANCED_PRODUCT,
        Some("Event") => ADVANCED_EVENT,
        Some("FAQPage") => ADVANCED_FAQ,
        Some("LocalBusiness") => ADVANCED_LOCAL_BUSINESS,
        Some("VideoObject") => ADVANCED_VIDEO,
        Some("Recipe") => ADVANCED_RECIPE,
        _ => ADVANCED_BASE,
    }
}

fn is_article_like(schema_type: Option<&str>) -> bool {
    matches!(
        schema_type,
        Some("Article") | Some("BlogPosting") | Some("NewsArticle")
    )
}

// ---------------------------------------------------------------------------
// score_candidate
// ---------------------------------------------------------------------------

/// Score one candidate against the weighted rubric.
pub fn score_candidate(
    candidate: &CandidateSchema,
    compliance: Option<&ComplianceReport>,
) -> SchemaScore {
    let mut strengths = Vec::new();
    let mut suggestions = Vec::new();
    let mut action_items = Vec::new();

    let required = score_required(candidate, &mut strengths, &mut action_items);
    let recommended = score_recommended(candidate, &mut strengths, &mut action_items);
    let advanced = score_advanced(candidate, &mut strengths, &mut suggestions);
    let content_quality = score_content_quality(candidate, &mut strengths, &mut suggestions);

    let tier = ComplianceTier::from_report(compliance);
    let compliance_bonus = tier.bonus();
    if compliance.is_some() && compliance_bonus > 0 {
        strengths.push("No structural compliance errors".to_string());
    }

    let weighted = f64::from(required) * WEIGHT_REQUIRED
        + f64::from(recommended) * WEIGHT_RECOMMENDED
        + f64::from(advanced) * WEIGHT_ADVANCED
        + f64::from(content_quality) * WEIGHT_CONTENT_QUALITY;
    let overall_score = (weighted.round() as i32 + i32::from(compliance_bonus)).clamp(0, 100) as u8;

    suggestions.insert(0, band_summary(overall_score).to_string());

    SchemaScore {
        overall_score,
        breakdown: ScoreBreakdown {
            required,
            recommended,
            advanced,
            content_quality,
        },
        compliance_bonus,
        strengths,
        suggestions,
        action_items,
    }
}

/// Leading summary suggestion chosen by score band.
fn band_summary(score: u8) -> &'static str {
    if score >= 90 {
        "Excellent structured data. Only minor refinements remain."
    } else if score >= 75 {
        "Good structured data. Address the important action items to reach excellent."
    } else if score >= 60 {
        "Fair structured data. Several important properties are missing."
    } else {
        "Structured data needs work. Start with the critical action items."
    }
}

// ---------------------------------------------------------------------------
// Sub-scores
// ---------------------------------------------------------------------------

/// Context, type, and name each contribute a third. Missing entries emit
/// critical action items worth their share of the weighted component.
fn score_required(
    candidate: &CandidateSchema,
    strengths: &mut Vec<String>,
    action_items: &mut Vec<ActionItem>,
) -> u8 {
    // A third of the 35-point component weight.
    const REQUIRED_SHARE_IMPACT: u8 = 12;

    let checks: [(&str, bool, &str); 3] = [
        (
            "add-context",
            candidate.context().is_some_and(|c| !c.is_empty()),
            "Declare @context as https://schema.org",
        ),
        (
            "add-type",
            candidate.schema_type().is_some_and(|t| !t.is_empty()),
            "Declare the @type of the markup",
        ),
        (
            "add-name",
            candidate.name().is_some_and(|n| !n.is_empty()),
            "Add a name or headline",
        ),
    ];

    let mut present = 0u32;
    for (id, ok, remediation) in checks {
        if ok {
            present += 1;
        } else {
            action_items.push(ActionItem {
                id: id.to_string(),
                description: remediation.to_string(),
                priority: Priority::Critical,
                estimated_impact: REQUIRED_SHARE_IMPACT,
                effort: Effort::Low,
                category: ActionCategory::Required,
            });
        }
    }

    if present == 3 {
        strengths.push("All required properties present (@context, @type, name)".to_string());
    }

    ((f64::from(present) / 3.0) * 100.0).round() as u8
}

/// Fraction present out of the fixed 7-property recommended set.
fn score_recommended(
    candidate: &CandidateSchema,
    strengths: &mut Vec<String>,
    action_items: &mut Vec<ActionItem>,
) -> u8 {
    let mut present = 0u32;
    for prop in RECOMMENDED_PROPERTIES {
        if candidate.has_property(prop.name) {
            present += 1;
        } else {
            action_items.push(ActionItem {
                id: format!("add-{}", prop.name.to_ascii_lowercase()),
                description: prop.remediation.to_string(),
                priority: prop.priority,
                estimated_impact: prop.impact,
                effort: prop.effort,
                category: ActionCategory::Recommended,
            });
        }
    }

    if present as usize >= RECOMMENDED_PROPERTIES.len() - 1 {
        strengths.push("Strong recommended property coverage".to_string());
    }

    ((f64::from(present) / RECOMMENDED_PROPERTIES.len() as f64) * 100.0).round() as u8
}

/// Fraction present out of the type-aware advanced set.
fn score_advanced(
    candidate: &CandidateSchema,
    strengths: &mut Vec<String>,
    suggestions: &mut Vec<String>,
) -> u8 {
    let schema_type = candidate.schema_type();
    let set = advanced_property_set(schema_type);
    let type_label = schema_type.unwrap_or("this type");

    let mut present = 0u32;
    for prop in set {
        if candidate.has_property(prop) {
            present += 1;
        } else {
            suggestions.push(format!("Consider adding {prop} for richer {type_label} markup"));
        }
    }

    if present as usize == set.len() {
        strengths.push(format!("Complete advanced property coverage for {type_label}"));
    }

    ((f64::from(present) / set.len() as f64) * 100.0).round() as u8
}

/// Point-accumulation rubric capped at 100. Structured values beat bare
/// strings everywhere they can appear.
fn score_content_quality(
    candidate: &CandidateSchema,
    strengths: &mut Vec<String>,
    suggestions: &mut Vec<String>,
) -> u8 {
    let mut points = 0u32;

    // Description length.
    if let Some(desc) = candidate.property("description").and_then(Value::as_str) {
        let len = desc.chars().count();
        if (DESCRIPTION_SWEET_MIN..=DESCRIPTION_SWEET_MAX).contains(&len) {
            points += 30;
            strengths.push("Description length is in the optimal 50-160 character range".to_string());
        } else if len > 0 {
            points += 12;
            suggestions.push("Keep the description between 50 and 160 characters".to_string());
        }
    }

    // Author: structured object beats bare string; linked profile is best.
    match candidate.property("author") {
        Some(Value::Object(obj)) => {
            if obj.contains_key("url") || obj.contains_key("sameAs") {
                points += 20;
                strengths.push("Author is structured with a linked profile".to_string());
            } else {
                points += 15;
            }
        }
        Some(Value::String(s)) if !s.is_empty() => {
            points += 8;
            suggestions.push("Represent the author as a Person object rather than plain text".to_string());
        }
        _ => {}
    }

    // Publisher: structured object beats bare string; logo is best.
    match candidate.property("publisher") {
        Some(Value::Object(obj)) => {
            if obj.contains_key("logo") {
                points += 20;
                strengths.push("Publisher is structured with a logo".to_string());
            } else {
                points += 15;
            }
        }
        Some(Value::String(s)) if !s.is_empty() => {
            points += 8;
            suggestions
                .push("Represent the publisher as an Organization with a logo".to_string());
        }
        _ => {}
    }

    // Image: structured ImageObject beats a bare URL.
    match candidate.property("image") {
        Some(Value::Object(_)) => {
            points += 20;
            strengths.push("Image is provided as structured ImageObject data".to_string());
        }
        Some(Value::Array(arr)) if arr.first().is_some_and(Value::is_object) => {
            points += 20;
            strengths.push("Image is provided as structured ImageObject data".to_string());
        }
        Some(Value::String(s)) if !s.is_empty() => {
            points += 10;
            suggestions.push("Provide the image as an ImageObject with dimensions".to_string());
        }
        _ => {}
    }

    // Non-trivial body length for content-like types.
    if is_article_like(candidate.schema_type()) {
        if let Some(wc) = candidate.property("wordCount").and_then(Value::as_u64) {
            if wc >= SUBSTANTIAL_WORD_COUNT {
                points += 10;
                strengths.push("Substantial article body word count".to_string());
            }
        }
    }

    points.min(100) as u8
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
