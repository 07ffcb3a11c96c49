//! HTML parser for extracting links and metadata
//!
//! This module handles parsing HTML content to extract:
//! - Every URL referenced by hyperlinks, stylesheets, images, scripts and
//!   media sources
//! - The page title, for log output

use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Elements that reference another resource, as one selector list so matches
/// come back in document order
const LINK_SELECTOR: &str =
    "a[href], link[href], img[src], script[src], source[src], video[src], audio[src]";

/// Extracted information from an HTML page
#[derive(Debug, Clone)]
pub struct ParsedPage {
    /// The page title (from <title> tag)
    pub title: Option<String>,

    /// Every referenced URL, absolute, in document order, without duplicates
    pub links: Vec<String>,
}

/// Parses HTML content and extracts links and metadata
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href>` and `<link href>` (stylesheets, icons, alternates)
/// - `<img src>`, `<script src>`
/// - `<source src>`, `<video src>`, `<audio src>`
///
/// **Exclude:**
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs
/// - Fragment-only references (same page anchors)
/// - Anything that does not resolve to HTTP(S)
///
/// Fragments on other references are kept; callers normalize before
/// deduplicating. The parser recovers from malformed markup the way browsers
/// do, so this never fails.
///
/// # Example
///
/// ```
/// use trawler::crawler::parse_html;
/// use url::Url;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let parsed = parse_html(html, &base_url);
/// assert_eq!(parsed.title, Some("Test".to_string()));
/// assert_eq!(parsed.links, vec!["https://example.com/page".to_string()]);
/// ```
pub fn parse_html(html: &str, base_url: &Url) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        title: extract_title(&document),
        links: collect_links(&document, base_url),
    }
}

/// Convenience function for extracting just the links from HTML
pub fn extract_links(html: &str, base_url: &Url) -> Vec<String> {
    parse_html(html, base_url).links
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Collects resolved links in document order, first occurrence wins
fn collect_links(document: &Html, base_url: &Url) -> Vec<String> {
    let Ok(selector) = Selector::parse(LINK_SELECTOR) else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    document
        .select(&selector)
        .filter_map(|element| {
            let element = element.value();
            let attr = match element.name() {
                "a" | "link" => "href",
                _ => "src",
            };
            element.attr(attr)
        })
        .filter_map(|reference| resolve_link(reference, base_url))
        .filter(|link| seen.insert(link.clone()))
        .collect()
}

/// Resolves a reference against the page URL
///
/// Returns None for references that never lead to a fetchable resource:
/// script and contact schemes, inline data, same-page anchors, and anything
/// that is not HTTP(S) once resolved.
fn resolve_link(reference: &str, base_url: &Url) -> Option<String> {
    const IGNORED_SCHEMES: &[&str] = &["javascript:", "mailto:", "tel:", "data:"];

    let reference = reference.trim();
    if reference.is_empty() || reference.starts_with('#') {
        return None;
    }

    let lower = reference.to_ascii_lowercase();
    if IGNORED_SCHEMES.iter().any(|scheme| lower.starts_with(scheme)) {
        return None;
    }

    let absolute = base_url.join(reference).ok()?;
    matches!(absolute.scheme(), "http" | "https").then(|| absolute.to_string())
}
