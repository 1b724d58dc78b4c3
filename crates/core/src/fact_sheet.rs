//! The structured summary of a scraped page.
//!
//! Produced by the content analyzer, consumed by the compatibility gate and
//! the AI generator. A fact sheet lives only for the duration of one
//! request and is never persisted; only derived results are.

use serde::{Deserialize, Serialize};

/// Typed signals extracted from one page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FactSheet {
    /// The analyzed URL, normalized by the analyzer.
    pub url: String,
    /// Raw page title.
    pub title: String,
    /// Raw meta description (may be empty).
    pub description: String,
    /// Word count of the main content region.
    pub word_count: u32,
    pub has_video: bool,
    pub has_faq_blocks: bool,
    pub has_product_info: bool,
    pub has_event_info: bool,
    pub has_business_address: bool,
    pub has_images: bool,
    pub image_count: u32,
    pub video_count: u32,
}

impl FactSheet {
    /// True when the page looks like it hosts a recipe. The analyzer does
    /// not emit a dedicated recipe signal, so this falls back to URL and
    /// title inspection.
    pub fn mentions_recipe(&self) -> bool {
        let url = self.url.to_ascii_lowercase();
        let title = self.title.to_ascii_lowercase();
        url.contains("recipe") || title.contains("recipe")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recipe_detected_from_url_path() {
        let facts = FactSheet {
            url: "https://example.com/recipes/banana-bread".to_string(),
            ..Default::default()
        };
        assert!(facts.mentions_recipe());
    }

    #[test]
    fn recipe_detected_from_title() {
        let facts = FactSheet {
            url: "https://example.com/posts/42".to_string(),
            title: "The Best Banana Bread Recipe".to_string(),
            ..Default::default()
        };
        assert!(facts.mentions_recipe());
    }

    #[test]
    fn no_recipe_signal() {
        let facts = FactSheet {
            url: "https://example.com/about".to_string(),
            title: "About us".to_string(),
            ..Default::default()
        };
        assert!(!facts.mentions_recipe());
    }
}
