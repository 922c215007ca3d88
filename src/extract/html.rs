// src/extract/html.rs
// =============================================================================
// This module turns a fetched HTML page into crawl output.
//
// For every page it produces:
// - at most one ContentRecord (only for URLs containing the content marker)
// - the root-relative links on the page, resolved against the base URL
//
// We use the `scraper` crate (html5ever underneath), which never fails on bad
// markup: it repairs what it can, so missing elements simply come back empty
// and we fall back to the "No Title" sentinel or an empty content string.
// =============================================================================

use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use url::Url;

/// Title used when a content page has no `<h1>`.
pub const NO_TITLE: &str = "No Title";

/// Marker substring that identifies article pages unless configured otherwise.
pub const DEFAULT_CONTENT_MARKER: &str = "news";

// One article scraped from a content page.
//
// Field order is the column order of the exported CSV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRecord {
    pub url: String,
    pub title: String,
    pub content: String,
}

// Everything the crawler learns from one page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Extraction {
    /// Present only when the URL matched the content marker
    pub record: Option<ContentRecord>,
    /// Same-origin links in document order, without duplicates
    pub links: Vec<Url>,
}

// Parses pages for one crawl.
//
// Selectors are compiled once here instead of on every page.
#[derive(Debug)]
pub struct Extractor {
    base: Url,
    marker: String,
    heading: Selector,
    paragraph: Selector,
    anchor: Selector,
}

impl Extractor {
    // Creates an extractor
    //
    // Parameters:
    //   base: the crawl's base URL, used to resolve root-relative hrefs
    //   marker: substring that marks a URL as an article page
    pub fn new(base: Url, marker: impl Into<String>) -> Self {
        // The selectors are constants, so parsing them can only fail on a
        // programming error.
        Self {
            base,
            marker: marker.into(),
            heading: Selector::parse("h1").expect("constant selector"),
            paragraph: Selector::parse("p").expect("constant selector"),
            anchor: Selector::parse("a[href]").expect("constant selector"),
        }
    }

    pub fn is_content_page(&self, url: &Url) -> bool {
        url.as_str().contains(&self.marker)
    }

    // Extracts the record (if any) and links from a page body.
    //
    // This is a pure function of (url, body): calling it twice on the same
    // input gives the same output.
    pub fn extract(&self, url: &Url, body: &str) -> Extraction {
        let document = Html::parse_document(body);

        let record = self
            .is_content_page(url)
            .then(|| self.content_record(url, &document));

        Extraction {
            record,
            links: self.discover_links(&document),
        }
    }

    fn content_record(&self, url: &Url, document: &Html) -> ContentRecord {
        let title = document
            .select(&self.heading)
            .next()
            .map(element_text)
            .unwrap_or_else(|| NO_TITLE.to_string());

        let content = document
            .select(&self.paragraph)
            .map(element_text)
            .collect::<Vec<_>>()
            .join("\n");

        ContentRecord {
            url: url.as_str().to_string(),
            title,
            content,
        }
    }

    fn discover_links(&self, document: &Html) -> Vec<Url> {
        let mut seen = HashSet::new();
        let mut links = Vec::new();

        for element in document.select(&self.anchor) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };

            if let Some(link) = self.resolve_root_relative(href.trim()) {
                if seen.insert(link.as_str().to_string()) {
                    links.push(link);
                }
            }
        }

        links
    }

    // Resolves an href against the base URL if it is a root-relative path
    //
    // Examples (base = "https://example.test/news/index"):
    //   "/news/a2"          -> Some("https://example.test/news/a2")
    //   "/news/a2#comments" -> Some("https://example.test/news/a2")
    //   "news/a2"           -> None (document-relative)
    //   "//cdn.test/x"      -> None (protocol-relative, another host)
    //   "https://other.test"-> None (absolute)
    //   "#top", "?page=2"   -> None
    fn resolve_root_relative(&self, href: &str) -> Option<Url> {
        if !href.starts_with('/') || href.starts_with("//") {
            return None;
        }

        let link = self.base.join(href).ok()?;
        if link.origin() != self.base.origin() {
            return None;
        }

        Some(normalize_url(link))
    }
}

// Canonical form used as the visited-set key.
//
// The url crate already lower-cases the host and resolves dot segments;
// fragments point inside the same document, so they are dropped.
pub fn normalize_url(mut url: Url) -> Url {
    url.set_fragment(None);
    url
}

// Text of an element with each text node trimmed, concatenated.
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .collect()
}
