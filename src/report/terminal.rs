// src/report/terminal.rs
// =============================================================================
// The Reporter used by the command line.
//
// Output looks like this:
//
//   Visiting https://example.com/            (only with --info)
//   [up:200] https://example.com/            (only with --success)
//   [down:0] https://example.com/slow        (always)
//
//   Error: 1
//   Success: 12
//   Total: 13
//   Duration: 2.41s
//
// With --json the summary block is replaced by one JSON object, and the
// per-URL lines move to stderr so stdout holds nothing but that object.
// Otherwise everything goes to stdout; it's the product of the tool, not logs.
// =============================================================================

use std::io::{self, Write};
use std::sync::Mutex;

use colored::Colorize;
use serde::Serialize;
use url::Url;

use super::{CrawlSummary, Reporter};
use crate::error::FetchError;

type Output = Mutex<Box<dyn Write + Send>>;

pub struct TerminalReporter {
    show_visit: bool,
    show_success: bool,
    json: bool,
    /// Visiting / up / down lines
    lines: Output,
    /// The summary block or JSON object
    report: Output,
}

impl TerminalReporter {
    pub fn new(show_visit: bool, show_success: bool, json: bool) -> Self {
        let lines: Box<dyn Write + Send> = if json {
            Box::new(io::stderr())
        } else {
            Box::new(io::stdout())
        };
        Self::with_writers(show_visit, show_success, json, lines, Box::new(io::stdout()))
    }

    fn with_writers(
        show_visit: bool,
        show_success: bool,
        json: bool,
        lines: Box<dyn Write + Send>,
        report: Box<dyn Write + Send>,
    ) -> Self {
        TerminalReporter {
            show_visit,
            show_success,
            json,
            lines: Mutex::new(lines),
            report: Mutex::new(report),
        }
    }

    fn line(&self, line: &str) {
        write_text(&self.lines, &format!("{}\n", line));
    }
}

// A closed pipe (e.g. `| head`) must not bring the crawl down, so write
// errors are only logged
fn write_text(output: &Output, text: &str) {
    let Ok(mut out) = output.lock() else {
        return;
    };
    if let Err(e) = out.write_all(text.as_bytes()).and_then(|_| out.flush()) {
        tracing::debug!(error = %e, "could not write report output");
    }
}

impl Reporter for TerminalReporter {
    fn on_visit_start(&self, url: &Url) {
        if self.show_visit {
            self.line(&visit_line(url));
        }
    }

    fn on_visit_success(&self, url: &Url, status: u16) {
        if self.show_success {
            self.line(&success_line(url, status));
        }
    }

    fn on_visit_error(&self, url: &Url, status: Option<u16>, error: &FetchError) {
        self.line(&error_line(url, status));
        tracing::debug!(%url, %error, "fetch failed");
    }

    fn on_summary(&self, summary: &CrawlSummary) {
        if self.json {
            match serde_json::to_string_pretty(&JsonSummary::from(summary)) {
                Ok(json) => write_text(&self.report, &format!("{}\n", json)),
                Err(e) => tracing::warn!(error = %e, "could not serialize summary"),
            }
        } else {
            write_text(
                &self.report,
                &format!("\n{}\n\nAll done!\n", summary_block(summary)),
            );
        }
    }
}

#[derive(Serialize)]
struct JsonSummary<'a> {
    #[serde(flatten)]
    summary: &'a CrawlSummary,
    total: usize,
}

impl<'a> From<&'a CrawlSummary> for JsonSummary<'a> {
    fn from(summary: &'a CrawlSummary) -> Self {
        JsonSummary {
            summary,
            total: summary.total(),
        }
    }
}

fn visit_line(url: &Url) -> String {
    format!("Visiting {}", url)
}

fn success_line(url: &Url, status: u16) -> String {
    let tag = format!("[up:{}]", status);
    format!("{} {}", tag.green().bold(), url)
}

// Transport failures have no status, shown as 0
fn error_line(url: &Url, status: Option<u16>) -> String {
    let tag = format!("[down:{}]", status.unwrap_or(0));
    format!("{} {}", tag.red().bold(), url)
}

fn summary_block(summary: &CrawlSummary) -> String {
    format!(
        "Error: {}\nSuccess: {}\nTotal: {}\nDuration: {:.2?}",
        summary.errors.to_string().red().bold(),
        summary.success.to_string().green().bold(),
        summary.total().to_string().blue().bold(),
        summary.elapsed,
    )
}
