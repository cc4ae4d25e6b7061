// src/error.rs
// =============================================================================
// Typed errors for the crawler.
//
// Only two kinds of error ever leave a function in this crate:
// - ConfigError: the command line could not be turned into a CrawlConfig.
//   This is fatal and happens before any network activity.
// - FetchError: one request failed at the transport level (timeout, DNS,
//   refused connection, TLS...). It is reported for that URL and the crawl
//   keeps going.
//
// Links that fail to parse or fall out of scope are NOT errors. They are
// dropped silently by the filter (see crawl/filter.rs).
//
// Rust concepts:
// - thiserror: derive std::error::Error + Display from attributes
// - Enums with data: each variant carries what is needed to print it
// =============================================================================

use std::fmt;

use thiserror::Error;

/// Errors raised while validating the command line.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No seed URL was given
    #[error("URL is required")]
    MissingUrl,

    /// The seed does not start with http:// or https://
    #[error("URL must start with http(s)://. Your value: {0}")]
    InvalidScheme(String),

    /// The seed looked like a URL but could not be parsed
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// --timeout 0 would fail every request before it starts
    #[error("Timeout must be at least 1 second")]
    ZeroTimeout,

    /// --concurrency 0 would never fetch anything
    #[error("Concurrency must be at least 1")]
    ZeroConcurrency,

    /// Anything clap rejected (unknown flag, non-numeric --depth, ...)
    #[error("{0}")]
    Arguments(String),
}

/// Why a fetch failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    Timeout,
    Dns,
    Connect,
    Tls,
    TooManyRedirects,
    /// A redirect pointed at a host outside the allowed domains
    RedirectOutOfScope,
    /// Headers arrived but the body could not be read to the end
    Body,
    Other,
}

impl fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FetchErrorKind::Timeout => "timeout",
            FetchErrorKind::Dns => "dns error",
            FetchErrorKind::Connect => "connection failed",
            FetchErrorKind::Tls => "tls error",
            FetchErrorKind::TooManyRedirects => "too many redirects",
            FetchErrorKind::RedirectOutOfScope => "redirect out of scope",
            FetchErrorKind::Body => "body read failed",
            FetchErrorKind::Other => "request failed",
        };
        f.write_str(label)
    }
}

/// Raised from the redirect policy when a hop leaves the allowed domains.
///
/// reqwest wraps it in its own redirect error; from_reqwest() finds it again
/// by walking the source chain.
#[derive(Debug, Error)]
#[error("redirect to disallowed host {0}")]
pub struct RedirectBlocked(pub String);

/// A transport-level failure for a single URL.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FetchErrorKind,
    /// Only present when reqwest saw a status before failing (rare)
    pub status: Option<u16>,
    pub message: String,
}

impl FetchError {
    // Categorizes the different ways a reqwest call can fail
    //
    // reqwest exposes a few is_*() helpers; DNS and TLS problems have no
    // dedicated helper so we look at the underlying causes instead. The
    // outermost message is skipped on purpose, it contains the URL.
    pub fn from_reqwest(error: &reqwest::Error) -> Self {
        let message = error_chain(error);
        let lowered = std::error::Error::source(error)
            .map(|source| error_chain(source))
            .unwrap_or_default()
            .to_lowercase();

        let kind = if is_blocked_redirect(error) {
            FetchErrorKind::RedirectOutOfScope
        } else if error.is_timeout() {
            FetchErrorKind::Timeout
        } else if error.is_redirect() {
            FetchErrorKind::TooManyRedirects
        } else if lowered.contains("dns") || lowered.contains("failed to lookup address") {
            FetchErrorKind::Dns
        } else if lowered.contains("certificate") || lowered.contains("tls") || lowered.contains("ssl") {
            FetchErrorKind::Tls
        } else if error.is_connect() {
            FetchErrorKind::Connect
        } else if error.is_body() || error.is_decode() {
            FetchErrorKind::Body
        } else {
            FetchErrorKind::Other
        };

        FetchError {
            kind,
            status: error.status().map(|s| s.as_u16()),
            message,
        }
    }
}

fn is_blocked_redirect(error: &reqwest::Error) -> bool {
    let mut source = std::error::Error::source(error);
    while let Some(inner) = source {
        if inner.downcast_ref::<RedirectBlocked>().is_some() {
            return true;
        }
        source = inner.source();
    }
    false
}

// reqwest's Display only shows the outermost layer ("error sending request"),
// the useful part (e.g. "Connection refused") sits in the source chain
fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}
