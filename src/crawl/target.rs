// src/crawl/target.rs
// =============================================================================
// A CrawlTarget is one URL waiting to be fetched.
//
// It remembers how it was found: the depth (link hops from the seed) and the
// referer (the page the link was on). Both travel with the value itself, so
// no shared per-request state is needed to know where a link came from.
// =============================================================================

use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTarget {
    pub url: Url,
    pub depth: usize,
    /// None only for the seed
    pub referer: Option<Url>,
}

impl CrawlTarget {
    pub fn seed(url: Url) -> Self {
        CrawlTarget {
            url,
            depth: 0,
            referer: None,
        }
    }

    /// A link found on this page, one hop deeper.
    pub fn child(&self, url: Url) -> Self {
        CrawlTarget {
            url,
            depth: self.depth + 1,
            referer: Some(self.url.clone()),
        }
    }
}
