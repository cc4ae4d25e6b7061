// src/config.rs
// =============================================================================
// The crawl configuration.
//
// A CrawlConfig is built once, before the crawl starts, and never changes
// afterwards. The dispatcher owns it and lends it (&CrawlConfig) to the
// fetcher and the filter.
//
// Rust concepts:
// - Builder-style methods: `with_*` consume self and return the updated value
// - HashSet: allowed domains are looked up once per discovered link
// - Duration: typed timeouts instead of "seconds as an integer"
// =============================================================================

use std::collections::HashSet;
use std::time::Duration;

use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_MAX_DEPTH: usize = 2;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_CONCURRENCY: usize = 50;

#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Where the crawl starts (depth 0)
    pub seed: Url,
    /// Deepest depth that is still fetched, inclusive
    pub max_depth: usize,
    /// Hosts a discovered link must match exactly
    pub allowed_domains: HashSet<String>,
    /// Bound for each individual request, not the whole crawl
    pub request_timeout: Duration,
    /// Maximum number of requests in flight at once
    pub concurrency: usize,
    /// Send a HEAD first and skip the GET for non-HTML content
    pub check_head: bool,
}

impl CrawlConfig {
    // Validates the seed and fills every other field with its default
    //
    // allowed_domains defaults to the seed's own host, so a plain
    // `link-crawler https://example.com` stays on example.com.
    pub fn new(seed: &str) -> Result<Self, ConfigError> {
        let seed = parse_seed(seed)?;
        // http(s) URLs always have a host, Url::parse rejects "http://"
        let host = seed
            .host_str()
            .ok_or_else(|| ConfigError::InvalidUrl {
                url: seed.to_string(),
                source: url::ParseError::EmptyHost,
            })?
            .to_string();

        Ok(CrawlConfig {
            seed,
            max_depth: DEFAULT_MAX_DEPTH,
            allowed_domains: HashSet::from([host]),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            concurrency: DEFAULT_CONCURRENCY,
            check_head: true,
        })
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Replaces the allowed hosts.
    ///
    /// Entries are trimmed and lowercased (the url crate lowercases hosts
    /// too, so the exact-match check compares like with like). If nothing
    /// usable is left the seed host is kept.
    pub fn with_allowed_domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let domains: HashSet<String> = domains
            .into_iter()
            .map(|d| d.as_ref().trim().to_lowercase())
            .filter(|d| !d.is_empty())
            .collect();

        if !domains.is_empty() {
            self.allowed_domains = domains;
        }
        self
    }

    /// A zero timeout is rejected: reqwest would fail every request at once.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Result<Self, ConfigError> {
        if timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        self.request_timeout = timeout;
        Ok(self)
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Result<Self, ConfigError> {
        if concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        self.concurrency = concurrency;
        Ok(self)
    }

    pub fn with_check_head(mut self, check_head: bool) -> Self {
        self.check_head = check_head;
        self
    }
}

// Only http(s) seeds are accepted, checked before parsing so the user gets
// the friendlier "must start with http(s)://" message for "example.com"
fn parse_seed(raw: &str) -> Result<Url, ConfigError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ConfigError::MissingUrl);
    }

    let lowered = raw.to_ascii_lowercase();
    if !(lowered.starts_with("http://") || lowered.starts_with("https://")) {
        return Err(ConfigError::InvalidScheme(raw.to_string()));
    }

    Url::parse(raw).map_err(|source| ConfigError::InvalidUrl {
        url: raw.to_string(),
        source,
    })
}
