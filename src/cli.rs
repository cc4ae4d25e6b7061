// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// clap is a popular Rust library for parsing command-line arguments.
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
// The CLI is only a front for CrawlConfig: crawl_config() turns the parsed
// flags into a validated configuration, or a ConfigError.
//
// Rust concepts:
// - Structs: Custom data types that group related data
// - Derive macros: Automatically generate code for our types
// - Option<T>: For arguments that may be absent
// =============================================================================

use std::time::Duration;

use clap::Parser;

use crate::config::{CrawlConfig, DEFAULT_CONCURRENCY, DEFAULT_MAX_DEPTH, DEFAULT_TIMEOUT_SECS};
use crate::error::ConfigError;

// This struct represents our entire CLI application
//
// #[derive(Parser)] tells clap to automatically generate parsing code
// The #[command(...)] attributes configure how the CLI behaves
#[derive(Parser, Debug)]
#[command(
    name = "link-crawler",
    version,
    about = "Recursively crawl a website and report which links are up or down",
    long_about = "link-crawler starts from a URL, follows every href and src it finds on the allowed \
                  domains up to a maximum depth, and reports each visited URL as up or down."
)]
pub struct Cli {
    /// URL to start crawling from (must start with http:// or https://)
    ///
    /// Optional for clap so that a missing URL is reported as a fatal
    /// configuration error like any other invalid URL.
    pub url: Option<String>,

    /// Max depth for recursive crawling (the start URL is depth 0)
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    pub depth: usize,

    /// Show visiting info
    #[arg(long)]
    pub info: bool,

    /// Show successful links
    #[arg(long)]
    pub success: bool,

    /// Allowed domains, separated by comma (default: the start URL's host)
    #[arg(long)]
    pub domains: Option<String>,

    /// Request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Maximum number of requests in flight at once
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Don't send a HEAD request before each GET
    #[arg(long)]
    pub no_head: bool,

    /// Print the final summary as JSON
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    pub fn crawl_config(&self) -> Result<CrawlConfig, ConfigError> {
        let url = self.url.as_deref().ok_or(ConfigError::MissingUrl)?;

        let mut config = CrawlConfig::new(url)?
            .with_max_depth(self.depth)
            .with_request_timeout(Duration::from_secs(self.timeout))?
            .with_check_head(!self.no_head)
            .with_concurrency(self.concurrency)?;

        if let Some(domains) = &self.domains {
            config = config.with_allowed_domains(domains.split(','));
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("link-crawler").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&["https://example.com"]);
        assert_eq!(cli.depth, 2);
        assert_eq!(cli.timeout, 10);
        assert!(!cli.info);
        assert!(!cli.success);

        let config = cli.crawl_config().unwrap();
        assert_eq!(config.max_depth, 2);
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert!(config.check_head);
        assert_eq!(config.allowed_domains, HashSet::from(["example.com".to_string()]));
    }

    #[test]
    fn test_all_flags() {
        let cli = parse(&[
            "--depth", "0", "--info", "--success", "--domains", "a.com,b.com",
            "--timeout", "3", "--concurrency", "8", "--no-head", "--json",
            "http://a.com/start",
        ]);
        let config = cli.crawl_config().unwrap();

        assert!(cli.info && cli.success && cli.json);
        assert_eq!(config.max_depth, 0);
        assert_eq!(config.request_timeout, Duration::from_secs(3));
        assert_eq!(config.concurrency, 8);
        assert!(!config.check_head);
        assert_eq!(
            config.allowed_domains,
            HashSet::from(["a.com".to_string(), "b.com".to_string()])
        );
    }

    #[test]
    fn test_missing_url_is_config_error() {
        let cli = parse(&["--depth", "3"]);
        assert!(matches!(cli.crawl_config(), Err(ConfigError::MissingUrl)));
    }

    #[test]
    fn test_bad_scheme_is_config_error() {
        let cli = parse(&["example.com"]);
        assert!(matches!(cli.crawl_config(), Err(ConfigError::InvalidScheme(_))));
    }

    #[test]
    fn test_zero_timeout_is_config_error() {
        let cli = parse(&["--timeout", "0", "https://example.com"]);
        assert!(matches!(cli.crawl_config(), Err(ConfigError::ZeroTimeout)));
    }

    #[test]
    fn test_non_numeric_depth_rejected_by_clap() {
        let result = Cli::try_parse_from(["link-crawler", "--depth", "deep", "https://example.com"]);
        assert!(result.is_err());
    }
}
