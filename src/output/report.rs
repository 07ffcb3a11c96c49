//! End-of-session report
//!
//! A finalized [`CrawlSession`](crate::state::CrawlSession) becomes a
//! `CrawlReport`, which the console can print or export.

use crate::state::CrawlPhase;
use chrono::{DateTime, Utc};

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionOutcome {
    /// Frontier exhausted or page budget reached
    Completed,
    /// Stop requested by the operator
    Stopped,
    /// The crawl task failed unexpectedly
    Aborted,
}

impl SessionOutcome {
    /// Exit phase the controller passes through for this outcome
    pub fn exit_phase(&self) -> CrawlPhase {
        match self {
            Self::Completed => CrawlPhase::Completed,
            Self::Stopped | Self::Aborted => CrawlPhase::Stopped,
        }
    }
}

/// Summary of one finished crawl session
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Normalized seed URL
    pub seed: String,

    /// How the session ended
    pub outcome: SessionOutcome,

    /// Pages dequeued for fetching, in visiting order
    pub visited: Vec<String>,

    /// URLs whose file was freshly and completely saved, in completion order
    pub downloaded: Vec<String>,

    /// Page fetches that failed (network or HTTP error)
    pub pages_failed: usize,

    /// Download tasks that failed
    pub downloads_failed: usize,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CrawlReport {
    /// Report for a session whose task died before returning its state
    pub fn aborted(seed: impl Into<String>, started_at: DateTime<Utc>) -> Self {
        Self {
            seed: seed.into(),
            outcome: SessionOutcome::Aborted,
            visited: Vec::new(),
            downloaded: Vec::new(),
            pages_failed: 0,
            downloads_failed: 0,
            started_at,
            finished_at: Utc::now(),
        }
    }

    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }
}

/// Prints a report to stdout in a formatted manner
pub fn print_report(report: &CrawlReport) {
    println!("=== Crawl Report ===\n");

    println!("Overview:");
    println!("  Seed: {}", report.seed);
    println!("  Outcome: {:?}", report.outcome);
    println!("  Duration: {}s", report.duration_seconds());
    println!();

    println!("Pages:");
    println!("  Visited: {}", report.visited.len());
    println!("  Failed: {}", report.pages_failed);
    println!();

    println!("Downloads ({}):", report.downloaded.len());
    for url in &report.downloaded {
        println!("  - {}", url);
    }
    if report.downloads_failed > 0 {
        println!("  Failed: {}", report.downloads_failed);
    }
}
