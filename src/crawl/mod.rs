// src/crawl/mod.rs
// =============================================================================
// This module is the crawl engine.
//
// Submodules:
// - target: CrawlTarget, one URL plus its depth and referer
// - filter: resolving raw links and the scheme/domain scope check
// - ledger: the concurrent "already visited?" set
// - dispatcher: the frontier loop that spawns fetches and detects the end
//
// The engine never prints anything. Everything the user sees goes through a
// Reporter (see src/report/).
// =============================================================================

mod dispatcher;
mod filter;
mod ledger;
mod target;

// Re-export what the rest of the app uses
pub use dispatcher::Crawler;
pub use filter::in_scope;
pub use target::CrawlTarget;
