//! The closed set of schema.org content types the generator understands.
//!
//! `Auto` asks the AI generator to detect the best type from page content.
//! Unrecognized type strings round-trip through [`ContentType::Other`] so
//! that new schema.org types can flow through the pipeline without a code
//! change (the compatibility gate treats them optimistically).

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ContentType
// ---------------------------------------------------------------------------

/// A requested or detected structured-data content type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ContentType {
    /// Let the AI generator pick the best-fitting type.
    Auto,
    Article,
    BlogPosting,
    WebPage,
    WebSite,
    Organization,
    FaqPage,
    Product,
    Event,
    LocalBusiness,
    VideoObject,
    ImageObject,
    Recipe,
    /// Any type string not in the known set, passed through verbatim.
    Other(String),
}

impl ContentType {
    /// Parse a type string. Never fails; unknown strings become `Other`.
    ///
    /// Accepts the canonical schema.org spelling (`"FAQPage"`) as well as
    /// the lowercase form users tend to send (`"faqpage"`).
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "auto" => ContentType::Auto,
            "article" => ContentType::Article,
            "blogposting" => ContentType::BlogPosting,
            "webpage" => ContentType::WebPage,
            "website" => ContentType::WebSite,
            "organization" => ContentType::Organization,
            "faqpage" => ContentType::FaqPage,
            "product" => ContentType::Product,
            "event" => ContentType::Event,
            "localbusiness" => ContentType::LocalBusiness,
            "videoobject" => ContentType::VideoObject,
            "imageobject" => ContentType::ImageObject,
            "recipe" => ContentType::Recipe,
            _ => ContentType::Other(s.to_string()),
        }
    }

    /// Canonical schema.org spelling of this type.
    pub fn as_str(&self) -> &str {
        match self {
            ContentType::Auto => "Auto",
            ContentType::Article => "Article",
            ContentType::BlogPosting => "BlogPosting",
            ContentType::WebPage => "WebPage",
            ContentType::WebSite => "WebSite",
            ContentType::Organization => "Organization",
            ContentType::FaqPage => "FAQPage",
            ContentType::Product => "Product",
            ContentType::Event => "Event",
            ContentType::LocalBusiness => "LocalBusiness",
            ContentType::VideoObject => "VideoObject",
            ContentType::ImageObject => "ImageObject",
            ContentType::Recipe => "Recipe",
            ContentType::Other(s) => s,
        }
    }

    /// Generic types that apply to virtually any page. These never fail
    /// the compatibility gate and are offered as fallback alternatives.
    pub fn is_always_safe(&self) -> bool {
        matches!(
            self,
            ContentType::Article
                | ContentType::BlogPosting
                | ContentType::WebPage
                | ContentType::WebSite
                | ContentType::Organization
        )
    }

    /// Article-like types get word-count and section credit in scoring.
    pub fn is_article_like(&self) -> bool {
        matches!(self, ContentType::Article | ContentType::BlogPosting)
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for ContentType {
    fn from(s: String) -> Self {
        ContentType::parse(&s)
    }
}

impl From<ContentType> for String {
    fn from(ct: ContentType) -> Self {
        ct.as_str().to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_canonical_spellings() {
        assert_eq!(ContentType::parse("FAQPage"), ContentType::FaqPage);
        assert_eq!(ContentType::parse("Article"), ContentType::Article);
        assert_eq!(ContentType::parse("auto"), ContentType::Auto);
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(ContentType::parse("localbusiness"), ContentType::LocalBusiness);
        assert_eq!(ContentType::parse("VIDEOOBJECT"), ContentType::VideoObject);
    }

    #[test]
    fn unknown_strings_become_other() {
        let ct = ContentType::parse("HowTo");
        assert_eq!(ct, ContentType::Other("HowTo".to_string()));
        assert_eq!(ct.as_str(), "HowTo");
    }

    #[test]
    fn display_uses_canonical_spelling() {
        assert_eq!(ContentType::FaqPage.to_string(), "FAQPage");
        assert_eq!(ContentType::BlogPosting.to_string(), "BlogPosting");
    }

    #[test]
    fn always_safe_set() {
        assert!(ContentType::Article.is_always_safe());
        assert!(ContentType::WebPage.is_always_safe());
        assert!(!ContentType::Product.is_always_safe());
        assert!(!ContentType::Auto.is_always_safe());
    }

    #[test]
    fn article_like_types() {
        assert!(ContentType::Article.is_article_like());
        assert!(ContentType::BlogPosting.is_article_like());
        assert!(!ContentType::WebPage.is_article_like());
    }

    #[test]
    fn serde_round_trip() {
        let json = serde_json::to_string(&ContentType::FaqPage).unwrap();
        assert_eq!(json, "\"FAQPage\"");
        let back: ContentType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ContentType::FaqPage);
    }
}
