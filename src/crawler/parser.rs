//! HTML parser for extracting links and page metadata
//!
//! This is the crawl's pure extraction boundary: bytes in, candidate URLs
//! out. No state is retained between calls and malformed HTML degrades to
//! whatever the parser can salvage, never to an error.

use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    /// The page title (from <title> tag)
    pub title: Option<String>,

    /// Candidate link targets, absolute, fragment-stripped, http(s) only
    pub links: HashSet<Url>,

    /// Asset references on the page (stylesheets, images, scripts), for the
    /// sitemap output
    pub assets: Vec<Url>,
}

/// Parses HTML content and extracts links, assets, and the title
///
/// # Link Extraction Rules
///
/// **Include:** `<a href="...">` anywhere in the document.
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:` links and data URIs
/// - Fragment-only links (same-page anchors)
/// - Anything that does not resolve to an http(s) URL against the base
///
/// Fragments are stripped from every extracted URL and the result is a set:
/// a page linking to the same target five times yields one candidate.
///
/// # Example
///
/// ```
/// use trailmap::crawler::parse_html;
/// use url::Url;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let parsed = parse_html(html, &base_url);
/// assert_eq!(parsed.title, Some("Test".to_string()));
/// assert_eq!(parsed.links.len(), 1);
/// ```
pub fn parse_html(html: &str, base_url: &Url) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        title: extract_title(&document),
        links: extract_links(&document, base_url),
        assets: extract_assets(&document, base_url),
    }
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

/// Extracts all valid link targets from the HTML document
fn extract_links(document: &Html, base_url: &Url) -> HashSet<Url> {
    let mut links = HashSet::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            // Skip if it has the download attribute
            if element.value().attr("download").is_some() {
                continue;
            }

            if let Some(href) = element.value().attr("href") {
                if let Some(absolute_url) = resolve_link(href, base_url) {
                    links.insert(absolute_url);
                }
            }
        }
    }

    links
}

/// Extracts stylesheet, image, and script references for the sitemap
fn extract_assets(document: &Html, base_url: &Url) -> Vec<Url> {
    let mut assets = Vec::new();

    let selectors = [
        ("link[rel='stylesheet'][href]", "href"),
        ("img[src]", "src"),
        ("script[src]", "src"),
    ];

    for (selector_str, attr) in selectors {
        if let Ok(selector) = Selector::parse(selector_str) {
            for element in document.select(&selector) {
                if let Some(value) = element.value().attr(attr) {
                    if let Some(absolute_url) = resolve_link(value, base_url) {
                        assets.push(absolute_url);
                    }
                }
            }
        }
    }

    assets
}

/// Resolves an href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Fragment-only links
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    // Skip fragment-only links (same page anchors)
    if href.starts_with('#') {
        return None;
    }

    match base_url.join(href) {
        Ok(mut absolute_url) => {
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                absolute_url.set_fragment(None);
                Some(absolute_url)
            } else {
                None
            }
        }
        Err(_) => None,
    }
}
