//! Output module for console events and crawl summaries
//!
//! This module handles:
//! - The log/busy/finished event stream sent to the operator console
//! - The end-of-session report
//! - Exporting reports as markdown and logs as plain text

mod console;
mod markdown;
pub mod report;

pub use console::{ConsoleEvent, ConsoleSink};
pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use report::{print_report, CrawlReport, SessionOutcome};

use std::path::Path;

/// Writes log lines verbatim, one per line
pub fn export_log(lines: &[String], output_path: &Path) -> std::io::Result<()> {
    let mut content = lines.join("\n");
    if !content.is_empty() {
        content.push('\n');
    }
    std::fs::write(output_path, content)
}
