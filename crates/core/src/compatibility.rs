//! The pre-billing compatibility gate.
//!
//! Cheap plausibility check between a requested content-type and the
//! analyzed page, run after analysis and strictly before credit
//! reservation so a mismatch never consumes a billing unit. This is a
//! fast-fail heuristic, not a hard gate: `Auto`, the always-safe generic
//! types, and unrecognized types all pass.

use crate::content_type::ContentType;
use crate::fact_sheet::FactSheet;

// ---------------------------------------------------------------------------
// Compatibility
// ---------------------------------------------------------------------------

/// Outcome of the compatibility gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Compatibility {
    Compatible,
    /// The requested type cannot plausibly be generated from this page.
    /// Carries generically safe alternatives the caller can retry with.
    Incompatible {
        reason: String,
        alternatives: Vec<ContentType>,
    },
}

impl Compatibility {
    pub fn is_compatible(&self) -> bool {
        matches!(self, Compatibility::Compatible)
    }
}

/// Alternatives offered whenever a specific type is rejected.
fn safe_alternatives() -> Vec<ContentType> {
    vec![
        ContentType::Article,
        ContentType::WebPage,
        ContentType::BlogPosting,
    ]
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

/// Decide whether generating `requested` from `facts` is plausible.
///
/// Pure function, no I/O. Signal-gated types reject when their
/// corresponding fact-sheet signal is absent; everything else passes.
pub fn check(requested: &ContentType, facts: &FactSheet) -> Compatibility {
    if matches!(requested, ContentType::Auto) || requested.is_always_safe() {
        return Compatibility::Compatible;
    }

    let missing = match requested {
        ContentType::VideoObject if !facts.has_video => Some("no video content detected on the page"),
        ContentType::FaqPage if !facts.has_faq_blocks => {
            Some("no FAQ question/answer blocks detected on the page")
        }
        ContentType::Product if !facts.has_product_info => {
            Some("no product information (price, offers) detected on the page")
        }
        ContentType::Event if !facts.has_event_info => {
            Some("no event details (dates, venue) detected on the page")
        }
        ContentType::LocalBusiness if !facts.has_business_address => {
            Some("no business address detected on the page")
        }
        ContentType::ImageObject if !facts.has_images => Some("no images detected on the page"),
        ContentType::Recipe if !facts.mentions_recipe() => {
            Some("the URL and title do not look like a recipe page")
        }
        // Unknown types are attempted optimistically.
        _ => None,
    };

    match missing {
        Some(reason) => Compatibility::Incompatible {
            reason: format!("{} cannot be generated: {reason}", requested.as_str()),
            alternatives: safe_alternatives(),
        },
        None => Compatibility::Compatible,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
