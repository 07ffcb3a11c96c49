//! Markdown summary generation
//!
//! This module renders a finished session as a markdown document listing the
//! visited pages and the saved files.

use crate::output::CrawlReport;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes a markdown summary of `report` to `output_path`
pub fn generate_markdown_summary(report: &CrawlReport, output_path: &Path) -> std::io::Result<()> {
    let markdown = format_markdown_summary(report);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a crawl report as markdown
pub fn format_markdown_summary(report: &CrawlReport) -> String {
    let mut md = String::new();

    md.push_str("# Trawler Crawl Summary\n\n");

    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Seed**: {}\n", report.seed));
    md.push_str(&format!("- **Started**: {}\n", report.started_at.to_rfc3339()));
    md.push_str(&format!(
        "- **Finished**: {}\n",
        report.finished_at.to_rfc3339()
    ));
    md.push_str(&format!(
        "- **Duration**: {} seconds\n",
        report.duration_seconds()
    ));
    md.push_str(&format!("- **Outcome**: {:?}\n\n", report.outcome));

    md.push_str("## Statistics\n\n");
    md.push_str("| Metric | Count |\n");
    md.push_str("|--------|-------|\n");
    md.push_str(&format!("| Pages visited | {} |\n", report.visited.len()));
    md.push_str(&format!("| Pages failed | {} |\n", report.pages_failed));
    md.push_str(&format!(
        "| Files downloaded | {} |\n",
        report.downloaded.len()
    ));
    md.push_str(&format!(
        "| Downloads failed | {} |\n\n",
        report.downloads_failed
    ));

    if !report.downloaded.is_empty() {
        md.push_str("## Downloaded Files\n\n");
        for url in &report.downloaded {
            md.push_str(&format!("- {}\n", url));
        }
        md.push('\n');
    }

    if !report.visited.is_empty() {
        md.push_str("## Visited Pages\n\n");
        for url in &report.visited {
            md.push_str(&format!("- {}\n", url));
        }
        md.push('\n');
    }

    md
}
