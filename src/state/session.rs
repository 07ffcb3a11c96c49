//! Per-run crawl session
//!
//! A `CrawlSession` is created by the controller on start, owned by the crawl
//! task for the duration of one run, and turned into a [`CrawlReport`] when
//! the run is finalized. Only the crawl task mutates it.

use crate::crawler::{CrawlControl, DownloadReport, Frontier};
use crate::output::{CrawlReport, SessionOutcome};
use crate::url::normalize_url;
use crate::UrlError;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use url::Url;

/// State of one crawl run
#[derive(Debug)]
pub struct CrawlSession {
    seed: Url,
    frontier: Frontier,

    /// Freshly saved URLs, in completion order
    downloaded_urls: Vec<String>,

    /// Target file names already handed to the pool
    claimed_names: HashSet<String>,

    /// Normalized URLs already handed to the pool
    claimed_urls: HashSet<String>,

    control: CrawlControl,
    started_at: DateTime<Utc>,
    pages_failed: usize,
    downloads_failed: usize,
}

impl CrawlSession {
    /// Creates a session with the seed queued at depth 0
    pub fn new(
        seed: &str,
        max_depth: u32,
        max_pages: u32,
        control: CrawlControl,
    ) -> Result<Self, UrlError> {
        let seed = normalize_url(seed)?;
        let mut frontier = Frontier::new(&seed, max_depth, max_pages, control.clone())?;
        frontier.enqueue(seed.as_str(), 0);

        Ok(Self {
            seed,
            frontier,
            downloaded_urls: Vec::new(),
            claimed_names: HashSet::new(),
            claimed_urls: HashSet::new(),
            control,
            started_at: Utc::now(),
            pages_failed: 0,
            downloads_failed: 0,
        })
    }

    pub fn seed(&self) -> &Url {
        &self.seed
    }

    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    pub fn frontier_mut(&mut self) -> &mut Frontier {
        &mut self.frontier
    }

    pub fn control(&self) -> &CrawlControl {
        &self.control
    }

    pub fn downloaded_urls(&self) -> &[String] {
        &self.downloaded_urls
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// True when a stop was requested or the page budget is spent
    pub fn should_stop(&self) -> bool {
        self.frontier.should_stop()
    }

    /// Reserves a download for this session
    ///
    /// Returns false when the URL, or another URL with the same target file
    /// name, was already handed to the pool. The first claimant wins.
    pub fn claim_download(&mut self, url: &Url, file_name: &str) -> bool {
        if self.claimed_urls.contains(url.as_str()) || self.claimed_names.contains(file_name) {
            return false;
        }
        self.claimed_urls.insert(url.to_string());
        self.claimed_names.insert(file_name.to_string());
        true
    }

    pub fn record_page_failure(&mut self) {
        self.pages_failed += 1;
    }

    /// Folds a finished download into the session
    ///
    /// Only fresh, complete saves are appended to the downloaded list.
    pub fn record_download(&mut self, report: &DownloadReport) {
        if report.is_saved() {
            self.downloaded_urls.push(report.url.to_string());
        } else if report.result.is_err() {
            self.downloads_failed += 1;
        }
    }

    /// Consumes the session into its final report
    pub fn into_report(self, outcome: SessionOutcome) -> CrawlReport {
        CrawlReport {
            seed: self.seed.to_string(),
            outcome,
            visited: self.frontier.into_visited(),
            downloaded: self.downloaded_urls,
            pages_failed: self.pages_failed,
            downloads_failed: self.downloads_failed,
            started_at: self.started_at,
            finished_at: Utc::now(),
        }
    }
}
