// src/fetch/html.rs
// =============================================================================
// This module extracts raw links from HTML pages.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever (Mozilla's HTML parser)
//
// Unlike a classic "find all <a> tags" extractor we look at EVERY element
// carrying an href or a src attribute: <a>, <link>, <script>, <img>,
// <iframe>, <source>... The raw attribute values are returned untouched and
// in document order. Resolving and filtering happens later (crawl/filter.rs)
// and so does de-duplication (crawl/ledger.rs).
//
// Rust concepts:
// - Iterators: For walking the selected elements
// - Option chaining: For the optional <base href> element
// =============================================================================

use scraper::{Html, Selector};
use url::Url;

/// The links found on one page, plus the URL relative links resolve against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLinks {
    /// The page URL, or the document's <base href> if it has one
    pub base: Url,
    /// Raw href/src values, in document order, duplicates kept
    pub links: Vec<String>,
}

// Extracts all href and src values from HTML content
//
// Parameters:
//   html: the HTML content to parse (borrowed as &str)
//   page_url: the URL the HTML was fetched from
//
// Example:
//   html = "<a href='/docs'>Docs</a><img src='logo.png'>"
//   result.links = ["/docs", "logo.png"]
pub fn extract_links(html: &str, page_url: &Url) -> PageLinks {
    let document = Html::parse_document(html);

    // One selector for both attributes keeps the output in document order.
    // An element carrying both (rare, e.g. <a href src>) yields href first.
    let selector = Selector::parse("[href], [src]").expect("static selector is valid");

    let mut links = Vec::new();
    for element in document.select(&selector) {
        let element = element.value();
        if let Some(href) = element.attr("href") {
            links.push(href.to_string());
        }
        if let Some(src) = element.attr("src") {
            links.push(src.to_string());
        }
    }

    PageLinks {
        base: document_base(&document, page_url),
        links,
    }
}

// A <base href="..."> element changes what relative links are relative to.
// Only the first one counts, the way browsers treat it.
fn document_base(document: &Html, page_url: &Url) -> Url {
    let selector = Selector::parse("base[href]").expect("static selector is valid");

    document
        .select(&selector)
        .next()
        .and_then(|base| base.value().attr("href"))
        .and_then(|href| page_url.join(href).ok())
        .unwrap_or_else(|| page_url.clone())
}
