// src/crawl/ledger.rs
// =============================================================================
// The visit ledger remembers every URL that has been dispatched.
//
// try_mark() is the only place duplicates are removed. It is called from many
// fetch tasks at once (each one submits the links found on its page), so the
// check-and-insert must be a single atomic step. DashSet::insert gives us
// exactly that: it returns true only for the caller that inserted the key.
//
// Keys are normalized first: the url crate already lowercases the scheme and
// host, drops default ports and turns an empty path into "/". We additionally
// strip the fragment, so "/about" and "/about#team" are the same page.
// =============================================================================

use dashmap::DashSet;
use url::Url;

#[derive(Debug, Default)]
pub struct VisitLedger {
    visited: DashSet<String>,
}

impl VisitLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `url` as visited. Returns false if it already was.
    pub fn try_mark(&self, url: &Url) -> bool {
        self.visited.insert(normalize(url))
    }

    /// Number of distinct URLs marked so far.
    pub fn len(&self) -> usize {
        self.visited.len()
    }
}

// scheme + host + port + path + query, without the fragment
pub fn normalize(url: &Url) -> String {
    let mut url = url.clone();
    url.set_fragment(None);
    url.into()
}
