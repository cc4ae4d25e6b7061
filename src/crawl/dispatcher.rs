// src/crawl/dispatcher.rs
// =============================================================================
// The crawl engine: dispatches targets, runs fetches concurrently and knows
// when the crawl is over.
//
// How it works:
// 1. The seed is marked in the ledger and dispatched at depth 0
// 2. Dispatching = emit "visit started" + spawn a fetch task on a JoinSet
// 3. Each task fetches its page, reports success/error, then resolves the
//    page's links, filters them (scheme, domain, depth) and tries to mark
//    each one in the ledger. The targets it managed to mark are returned.
// 4. The main loop joins tasks one by one and dispatches whatever they
//    returned, which may spawn more tasks
// 5. When the JoinSet is empty, no fetch is running and none is pending:
//    the crawl is finished
//
// Step 3 runs inside many tasks at once, which is why the ledger has to be
// atomic. Because a task hands its new targets back only when it finishes,
// "JoinSet is empty" also covers work discovered transitively.
//
// Concurrency is bounded by a semaphore (`--concurrency`). The per-request
// timeout lives in the HTTP client, so a hung server fails one task only.
//
// Rust concepts:
// - Arc: the shared state is owned jointly by the engine and every task
// - JoinSet: a growable group of spawned tasks we can wait on one by one
// - Semaphore: at most N permits, one per in-flight request
// =============================================================================

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, trace, warn};

use super::filter::{in_scope, resolve};
use super::ledger::VisitLedger;
use super::target::CrawlTarget;
use crate::config::CrawlConfig;
use crate::fetch::{FetchOutcome, Fetcher};
use crate::report::{CrawlStats, CrawlSummary, Reporter};

pub struct Crawler {
    shared: Arc<Shared>,
}

// Everything a fetch task needs, behind one Arc
struct Shared {
    config: CrawlConfig,
    fetcher: Fetcher,
    ledger: VisitLedger,
    stats: CrawlStats,
    reporter: Arc<dyn Reporter>,
    permits: Semaphore,
}

impl Crawler {
    pub fn new(config: CrawlConfig, reporter: Arc<dyn Reporter>) -> reqwest::Result<Self> {
        let fetcher = Fetcher::new(&config)?;
        let permits = Semaphore::new(config.concurrency);

        Ok(Crawler {
            shared: Arc::new(Shared {
                config,
                fetcher,
                ledger: VisitLedger::new(),
                stats: CrawlStats::new(),
                reporter,
                permits,
            }),
        })
    }

    /// Crawls from the seed until the frontier is exhausted.
    ///
    /// Never fails: individual fetch errors are reported and counted, the
    /// rest of the crawl carries on. The summary is also sent to the
    /// reporter before it is returned.
    pub async fn run(self) -> CrawlSummary {
        let started = Instant::now();
        let shared = self.shared;
        let mut tasks: JoinSet<Vec<CrawlTarget>> = JoinSet::new();

        info!(
            seed = %shared.config.seed,
            max_depth = shared.config.max_depth,
            concurrency = shared.config.concurrency,
            "starting crawl"
        );

        // The seed is not a discovered link: it skips the domain filter
        let seed = CrawlTarget::seed(shared.config.seed.clone());
        if shared.ledger.try_mark(&seed.url) {
            dispatch(&shared, seed, &mut tasks);
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(discovered) => {
                    for target in discovered {
                        dispatch(&shared, target, &mut tasks);
                    }
                }
                // A panicking task lost its outcome; nothing to dispatch from it
                Err(e) => warn!(error = %e, "fetch task did not complete"),
            }
        }

        let summary = shared.stats.summarize(started.elapsed());
        info!(
            visited = shared.ledger.len(),
            success = summary.success,
            errors = summary.errors,
            "crawl finished"
        );
        shared.reporter.on_summary(&summary);
        summary
    }
}

// Hands an admitted target to a fetch task
fn dispatch(shared: &Arc<Shared>, target: CrawlTarget, tasks: &mut JoinSet<Vec<CrawlTarget>>) {
    shared.stats.record_dispatch();
    shared.reporter.on_visit_start(&target.url);

    let shared = Arc::clone(shared);
    tasks.spawn(async move { shared.visit(target).await });
}

impl Shared {
    // Fetches one target and returns the new targets it led to
    async fn visit(&self, target: CrawlTarget) -> Vec<CrawlTarget> {
        // The semaphore is never closed, so acquire() only fails if it was
        let Ok(_permit) = self.permits.acquire().await else {
            return Vec::new();
        };

        match self.fetcher.fetch(&target).await {
            FetchOutcome::Success {
                url,
                final_url,
                status,
                page,
            } => {
                self.stats.record_success();
                self.reporter.on_visit_success(&url, status);

                // A redirect already fetched the page it landed on. Marking
                // it keeps a direct link to that page from fetching it again.
                if final_url != url && self.ledger.try_mark(&final_url) {
                    trace!(from = %url, to = %final_url, "marked redirect target");
                }

                page.links
                    .iter()
                    .filter_map(|raw| self.candidate(&target, &page.base, raw))
                    .filter_map(|candidate| self.submit(candidate))
                    .collect()
            }
            FetchOutcome::Failure { url, error } => {
                self.stats.record_error();
                self.reporter.on_visit_error(&url, error.status, &error);
                Vec::new()
            }
        }
    }

    // raw link -> in-scope CrawlTarget one hop below `page`
    fn candidate(&self, page: &CrawlTarget, base: &url::Url, raw: &str) -> Option<CrawlTarget> {
        let Some(url) = resolve(base, raw) else {
            debug!(link = raw, referer = %page.url, "dropping unparseable link");
            return None;
        };

        if !in_scope(&url, &self.config.allowed_domains) {
            debug!(%url, referer = %page.url, "dropping out-of-scope link");
            return None;
        }

        Some(page.child(url))
    }

    // Depth check, then the ledger. Returns the target if it should be
    // dispatched, None if it was dropped.
    fn submit(&self, target: CrawlTarget) -> Option<CrawlTarget> {
        if target.depth > self.config.max_depth {
            debug!(url = %target.url, depth = target.depth, "dropping link beyond max depth");
            return None;
        }

        if !self.ledger.try_mark(&target.url) {
            trace!(url = %target.url, "already visited");
            return None;
        }

        Some(target)
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is a JoinSet?
//    - A collection of spawned tasks that we can add to at any time
//    - join_next() waits for whichever task finishes first
//    - It returns None only when the set is empty, which is exactly our
//      "nothing running, nothing pending" stop condition
//
// 2. Why does a task return its new targets instead of spawning them?
//    - Only the main loop owns the JoinSet (it needs &mut to spawn)
//    - A task is still in the set until its result is taken out, so its
//      children are spawned before the set can become empty
//
// 3. Why Arc<Shared>?
//    - tokio::spawn needs 'static futures: they can't borrow from run()
//    - Each task gets its own Arc clone; the data lives until the last
//      clone is dropped
//
// 4. What does the Semaphore do?
//    - It hands out at most `concurrency` permits
//    - A task waits in acquire() until a permit is free
//    - The permit (_permit) is released automatically when it is dropped
//      at the end of visit()
//
// 5. Why is try_mark() inside the task and not in the main loop?
//    - Many tasks extract links at the same time
//    - The ledger's insert is atomic, so two pages linking to the same URL
//      can race and only one of them wins
// -----------------------------------------------------------------------------
