// src/crawl/filter.rs
// =============================================================================
// Turns raw href/src strings into absolute URLs and decides if they are in
// scope.
//
// Two steps, kept separate so each can be tested on its own:
// 1. resolve()  - "/docs", "../x", "//cdn.host/a.js", "#top" -> absolute Url
// 2. in_scope() - http(s) only, and the host must be one of the allowed ones
//
// Anything that fails either step is simply dropped. Pages are full of
// mailto:, javascript: and empty hrefs; none of that is worth reporting.
//
// Rust concepts:
// - Option<T>: "no URL" is a normal outcome here, not an error
// - Url::join: the same resolution rules a browser uses
// =============================================================================

use std::collections::HashSet;

use url::Url;

// Resolves a possibly-relative link against the page it was found on
//
// Examples (base = "https://example.com/docs/page"):
//   "/about"              -> https://example.com/about
//   "intro"               -> https://example.com/docs/intro
//   "//cdn.example.com/x" -> https://cdn.example.com/x
//   "#section"            -> https://example.com/docs/page#section
//   "http://[broken"      -> None
//
// A fragment-only link resolves back to the base page. The ledger strips
// fragments, so it is always seen as already visited.
pub fn resolve(base: &Url, raw: &str) -> Option<Url> {
    base.join(raw).ok()
}

// True iff the URL is http(s) and its host is exactly one of `allowed`
//
// No subdomain wildcarding: "docs.example.com" is NOT allowed by
// "example.com". The port is not part of the comparison.
pub fn in_scope(url: &Url, allowed: &HashSet<String>) -> bool {
    if url.scheme() != "http" && url.scheme() != "https" {
        return false;
    }

    match url.host_str() {
        Some(host) => allowed.contains(host),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.com/docs/page").unwrap()
    }

    fn allowed() -> HashSet<String> {
        HashSet::from(["example.com".to_string()])
    }

    #[test]
    fn test_resolve_relative_paths() {
        assert_eq!(resolve(&base(), "/about").unwrap().as_str(), "https://example.com/about");
        assert_eq!(resolve(&base(), "intro").unwrap().as_str(), "https://example.com/docs/intro");
        assert_eq!(resolve(&base(), "../up").unwrap().as_str(), "https://example.com/up");
    }

    #[test]
    fn test_resolve_protocol_relative() {
        let url = resolve(&base(), "//cdn.example.com/app.js").unwrap();
        assert_eq!(url.as_str(), "https://cdn.example.com/app.js");
    }

    #[test]
    fn test_resolve_fragment_only_points_at_base() {
        let url = resolve(&base(), "#section").unwrap();
        assert_eq!(url.as_str(), "https://example.com/docs/page#section");
    }

    #[test]
    fn test_resolve_rejects_garbage() {
        assert!(resolve(&base(), "http://[broken").is_none());
        assert!(resolve(&base(), "https://exa mple.com/").is_none());
    }

    #[test]
    fn test_in_scope_exact_host_only() {
        let allowed = allowed();
        assert!(in_scope(&Url::parse("http://example.com/a").unwrap(), &allowed));
        assert!(in_scope(&Url::parse("https://example.com:8443/a").unwrap(), &allowed));
        assert!(!in_scope(&Url::parse("https://docs.example.com/").unwrap(), &allowed));
        assert!(!in_scope(&Url::parse("https://other.com/").unwrap(), &allowed));
    }

    #[test]
    fn test_in_scope_rejects_other_schemes() {
        let allowed = allowed();
        let mailto = resolve(&base(), "mailto:team@example.com").unwrap();
        let js = resolve(&base(), "javascript:void(0)").unwrap();
        let ftp = resolve(&base(), "ftp://example.com/file").unwrap();

        assert!(!in_scope(&mailto, &allowed));
        assert!(!in_scope(&js, &allowed));
        assert!(!in_scope(&ftp, &allowed));
    }
}
