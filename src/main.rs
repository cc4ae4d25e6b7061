// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Set up logging (tracing, controlled by RUST_LOG, written to stderr)
// 2. Parse command-line arguments using clap and build a CrawlConfig
// 3. Run the crawl with a terminal reporter attached
// 4. Exit with proper code (0 = crawl finished, 1 = bad configuration,
//    2 = unexpected internal error)
//
// Note that broken links do NOT change the exit code: a crawl that ran to
// the end is a success, whatever it found.
//
// Rust concepts used:
// - async/await: Because we make many network requests concurrently
// - Result<T, E>: For error handling (T = success type, E = error type)
// - Arc<dyn Trait>: The crawler only knows it has "some Reporter"
// =============================================================================

// Module declarations - tells Rust about our other source files
mod cli;      // src/cli.rs - command-line parsing
mod config;   // src/config.rs - validated crawl settings
mod crawl;    // src/crawl/ - the crawl engine
mod error;    // src/error.rs - typed errors
mod fetch;    // src/fetch/ - HTTP requests and link extraction
mod report;   // src/report/ - lifecycle events, counters, terminal output

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser; // Parser trait enables the try_parse() method
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use crawl::Crawler;
use error::ConfigError;
use report::TerminalReporter;

// The #[tokio::main] attribute transforms our async main into a real main function
// It creates a tokio runtime and runs our async code inside it
#[tokio::main]
async fn main() {
    init_logging();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // Anything that isn't a configuration problem ends up here
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Returns:
//   Ok(0) = crawl ran to completion
//   Ok(1) = configuration was invalid, nothing was crawled
//   Err   = unexpected error
async fn run() -> Result<i32> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // --help and --version are not errors
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => return Ok(fatal(&ConfigError::Arguments(e.to_string()))),
    };

    let config = match cli.crawl_config() {
        Ok(config) => config,
        Err(e) => return Ok(fatal(&e)),
    };

    let reporter = Arc::new(TerminalReporter::new(cli.info, cli.success, cli.json));
    let crawler = Crawler::new(config, reporter).context("failed to build the HTTP client")?;

    // stdout must stay pure JSON with --json
    if !cli.json {
        println!();
    }
    crawler.run().await;

    Ok(0)
}

// Reports a configuration error the way the user expects it and
// returns the exit code to use
fn fatal(error: &ConfigError) -> i32 {
    println!();
    println!("{} {}", "Fatal:".red().bold(), error.to_string().trim_end());
    println!();
    1
}

// RUST_LOG=debug shows every dropped link, the default only shows warnings
fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why Arc<TerminalReporter> and not Box?
//    - The reporter is called from every fetch task, which all run at once
//    - Arc (Atomically Reference Counted) lets many owners share one value
//    - Crawler::new takes Arc<dyn Reporter>; the Arc<TerminalReporter> is
//      converted automatically (an "unsizing coercion")
//
// 2. Why try_parse() instead of parse()?
//    - parse() exits with code 2 on bad arguments
//    - We want every configuration problem to exit with code 1
//    - try_parse() hands us the error so we can decide
//
// 3. Why is logging on stderr?
//    - stdout carries the crawl report (possibly JSON with --json)
//    - Mixing diagnostics into it would break scripts reading the output
// -----------------------------------------------------------------------------
