// src/report/mod.rs
// =============================================================================
// Crawl lifecycle events and the running tally.
//
// The crawl engine knows nothing about terminals or colors. It calls a
// Reporter at well-defined points:
//
//   on_visit_start    - a URL was dispatched (exactly once per URL)
//   on_visit_success  - a response came back (any status code)
//   on_visit_error    - the request never completed
//   on_summary        - once, after the last fetch settled
//
// Submodules:
// - terminal: the Reporter the CLI uses (colored lines + summary block)
//
// Rust concepts:
// - Traits: Reporter is an interface the dispatcher depends on abstractly
// - Send + Sync: reporters are called from many fetch tasks at once
// - Atomics: counters that can be bumped without a lock
// =============================================================================

mod terminal;

pub use terminal::TerminalReporter;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde::Serialize;
use url::Url;

use crate::error::FetchError;

/// Receives crawl lifecycle events.
///
/// Methods are called synchronously from the crawl's tasks, so they should
/// return quickly (printing a line is fine, blocking I/O on a socket is not).
pub trait Reporter: Send + Sync {
    fn on_visit_start(&self, url: &Url);

    fn on_visit_success(&self, url: &Url, status: u16);

    fn on_visit_error(&self, url: &Url, status: Option<u16>, error: &FetchError);

    fn on_summary(&self, summary: &CrawlSummary);
}

/// Success/error counters for one crawl run.
///
/// Created when the run starts and only ever incremented. Every dispatched
/// URL ends in exactly one of the two counters.
#[derive(Debug, Default)]
pub struct CrawlStats {
    dispatched: AtomicUsize,
    success: AtomicUsize,
    errors: AtomicUsize,
}

impl CrawlStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_dispatch(&self) {
        self.dispatched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_success(&self) {
        self.success.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Freezes the counters into a summary.
    ///
    /// Called after every task has been joined, so the Relaxed loads see
    /// all increments (joining a task synchronizes with its completion).
    pub fn summarize(&self, elapsed: Duration) -> CrawlSummary {
        CrawlSummary {
            dispatched: self.dispatched.load(Ordering::Relaxed),
            success: self.success.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            elapsed,
        }
    }
}

/// Final numbers of a crawl run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CrawlSummary {
    pub dispatched: usize,
    pub success: usize,
    pub errors: usize,
    #[serde(serialize_with = "serialize_secs")]
    pub elapsed: Duration,
}

impl CrawlSummary {
    pub fn total(&self) -> usize {
        self.success + self.errors
    }
}

fn serialize_secs<S: serde::Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(elapsed.as_secs_f64())
}
