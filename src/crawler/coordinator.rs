//! Crawl controller - session lifecycle and the main crawl loop
//!
//! This module contains the controller the console drives and the crawl loop
//! it spawns, including:
//! - Validating start parameters before any session exists
//! - The Idle/Running/Paused/Stopped/Completed phase machine
//! - Coordinating fetching, parsing, link classification and download dispatch
//! - Finalizing every session exactly once, whatever ended it

use crate::config::Config;
use crate::crawler::classifier::Classifier;
use crate::crawler::control::{Checkpoint, CrawlControl};
use crate::crawler::downloader::Downloader;
use crate::crawler::fetcher::{build_http_client, FetchResult, Fetcher};
use crate::crawler::parser::parse_html;
use crate::crawler::pool::{DownloadPool, DownloadTask};
use crate::output::{ConsoleEvent, ConsoleSink, CrawlReport, SessionOutcome};
use crate::state::{CrawlPhase, CrawlSession};
use crate::url::{normalize_url, resolve_url};
use crate::TrawlError;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use url::Url;

const INVALID_SEED_MESSAGE: &str = "Please enter a valid URL starting with http or https.";

/// Parameters for one crawl session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartRequest {
    /// Absolute HTTP(S) URL the crawl starts from
    pub seed_url: String,

    /// Maximum link depth (0 = unlimited)
    pub max_depth: u32,

    /// Maximum pages to visit (0 = unlimited)
    pub max_pages: u32,

    /// Existing, writable directory downloads are saved into
    pub save_folder: PathBuf,
}

impl StartRequest {
    pub fn new(seed_url: impl Into<String>, save_folder: impl Into<PathBuf>) -> Self {
        Self {
            seed_url: seed_url.into(),
            max_depth: 0,
            max_pages: 0,
            save_folder: save_folder.into(),
        }
    }

    /// Builds a request from raw console text fields
    ///
    /// Blank limits mean unlimited. Anything else must be a non-negative integer.
    pub fn from_console_input(
        seed_url: &str,
        max_depth: &str,
        max_pages: &str,
        save_folder: impl Into<PathBuf>,
    ) -> Result<Self, TrawlError> {
        Ok(Self {
            seed_url: seed_url.trim().to_string(),
            max_depth: parse_limit("Max depth", max_depth)?,
            max_pages: parse_limit("Max pages", max_pages)?,
            save_folder: save_folder.into(),
        })
    }

    /// Checks the seed URL and the save folder
    ///
    /// # Errors
    ///
    /// `TrawlError::Validation` if the seed is not an absolute HTTP(S) URL with
    /// a host, or the save folder is missing, not a directory, or read-only.
    pub fn validate(&self) -> Result<(), TrawlError> {
        normalize_url(&self.seed_url)
            .map_err(|_| TrawlError::Validation(INVALID_SEED_MESSAGE.to_string()))?;

        let metadata = std::fs::metadata(&self.save_folder).map_err(|e| {
            TrawlError::Validation(format!(
                "Save folder {} is not accessible: {}",
                self.save_folder.display(),
                e
            ))
        })?;

        if !metadata.is_dir() {
            return Err(TrawlError::Validation(format!(
                "Save folder {} is not a directory",
                self.save_folder.display()
            )));
        }

        if metadata.permissions().readonly() {
            return Err(TrawlError::Validation(format!(
                "Save folder {} is read-only",
                self.save_folder.display()
            )));
        }

        Ok(())
    }
}

fn parse_limit(name: &str, raw: &str) -> Result<u32, TrawlError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(0);
    }
    raw.parse().map_err(|_| {
        TrawlError::Validation(format!(
            "{} must be a non-negative integer, got '{}'",
            name, raw
        ))
    })
}

/// State shared between the controller handle and the running session
#[derive(Debug)]
struct Shared {
    phase: watch::Sender<CrawlPhase>,
    control: Mutex<Option<CrawlControl>>,
    task: Mutex<Option<JoinHandle<CrawlReport>>>,
}

impl Shared {
    /// Moves the phase to `to` if the phase machine allows it
    fn transition(&self, to: CrawlPhase) -> Result<(), TrawlError> {
        let mut result = Ok(());
        self.phase.send_if_modified(|current| {
            if current.can_transition_to(to) {
                tracing::debug!("Phase {} -> {}", current, to);
                *current = to;
                true
            } else {
                result = Err(TrawlError::InvalidTransition { from: *current, to });
                false
            }
        });
        result
    }

    /// Flips the gate and the phase together under the control lock
    ///
    /// `undo` reverts the gate when the phase machine refuses the move.
    fn switch_gate(
        &self,
        to: CrawlPhase,
        apply: fn(&CrawlControl) -> bool,
        undo: fn(&CrawlControl) -> bool,
    ) -> Result<(), TrawlError> {
        let guard = self.control.lock().unwrap_or_else(PoisonError::into_inner);
        let control = guard.as_ref().ok_or(TrawlError::NotRunning)?;

        if control.is_stop_requested() || !apply(control) {
            return Err(TrawlError::NotRunning);
        }

        if let Err(e) = self.transition(to) {
            undo(control);
            return Err(e);
        }
        Ok(())
    }

    fn current_control(&self) -> Option<CrawlControl> {
        self.control
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_control(&self, control: Option<CrawlControl>) {
        *self.control.lock().unwrap_or_else(PoisonError::into_inner) = control;
    }
}

/// Owns the crawl lifecycle: one session at a time, always back to Idle
///
/// Clones share the same controller.
#[derive(Debug, Clone)]
pub struct CrawlController {
    config: Arc<Config>,
    console: ConsoleSink,
    shared: Arc<Shared>,
}

impl CrawlController {
    /// Creates an idle controller and the console event stream it reports to
    pub fn new(config: Config) -> (Self, mpsc::UnboundedReceiver<ConsoleEvent>) {
        let (console, events) = ConsoleSink::channel();
        (Self::with_console(config, console), events)
    }

    /// Creates an idle controller reporting to an existing sink
    pub fn with_console(config: Config, console: ConsoleSink) -> Self {
        let (phase, _) = watch::channel(CrawlPhase::Idle);

        Self {
            config: Arc::new(config),
            console,
            shared: Arc::new(Shared {
                phase,
                control: Mutex::new(None),
                task: Mutex::new(None),
            }),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Current phase
    pub fn phase(&self) -> CrawlPhase {
        *self.shared.phase.borrow()
    }

    /// Receiver that observes every phase change
    pub fn subscribe_phase(&self) -> watch::Receiver<CrawlPhase> {
        self.shared.phase.subscribe()
    }

    /// Starts a fresh session
    ///
    /// # Errors
    ///
    /// - `AlreadyRunning` when a session is active
    /// - `Validation` for a bad seed URL or save folder (no session is created)
    /// - `Reqwest` if the HTTP client cannot be built
    pub fn start(&self, request: StartRequest) -> Result<(), TrawlError> {
        let phase = self.phase();
        if phase != CrawlPhase::Idle {
            return Err(TrawlError::AlreadyRunning { phase });
        }

        request.validate()?;

        let control = CrawlControl::new();
        let session = CrawlSession::new(
            &request.seed_url,
            request.max_depth,
            request.max_pages,
            control.clone(),
        )?;

        let client = build_http_client(&self.config.user_agent)?;
        let classifier = Classifier::new(&self.config.download.extra_extensions);
        let fetcher = Fetcher::new(client.clone(), classifier.clone(), &self.config.crawler);
        let downloader = Downloader::new(client, &request.save_folder, &self.config.crawler);

        // Atomic Idle -> Running claim; a concurrent start loses here
        self.shared
            .transition(CrawlPhase::Running)
            .map_err(|_| TrawlError::AlreadyRunning {
                phase: self.phase(),
            })?;

        self.shared.set_control(Some(control.clone()));
        self.console.busy(true);

        tracing::info!(
            "Starting crawl of {} (max depth {}, max pages {}) into {}",
            session.seed(),
            request.max_depth,
            request.max_pages,
            request.save_folder.display()
        );
        self.console.log(format!("Crawling {}", session.seed()));

        let pool = DownloadPool::spawn(
            self.config.crawler.download_workers,
            downloader,
            control,
            self.console.clone(),
        );

        let crawl = CrawlLoop {
            classifier,
            fetcher,
            pool,
            console: self.console.clone(),
        };

        let handle = tokio::spawn(supervise(
            session,
            crawl,
            Arc::clone(&self.shared),
            self.console.clone(),
        ));

        *self
            .shared
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(handle);

        Ok(())
    }

    /// Closes the gate: pausable operations block until resumed
    ///
    /// Fails with `NotRunning` once a stop has been requested.
    pub fn pause(&self) -> Result<(), TrawlError> {
        self.require_active()?;
        self.shared.switch_gate(CrawlPhase::Paused, CrawlControl::pause, CrawlControl::resume)?;
        self.console.log("Crawl paused.");
        Ok(())
    }

    /// Reopens the gate
    pub fn resume(&self) -> Result<(), TrawlError> {
        self.require_active()?;
        self.shared.switch_gate(CrawlPhase::Running, CrawlControl::resume, CrawlControl::pause)?;
        self.console.log("Crawl resumed.");
        Ok(())
    }

    /// Pauses a running session or resumes a paused one
    pub fn toggle_pause(&self) -> Result<CrawlPhase, TrawlError> {
        match self.phase() {
            CrawlPhase::Running => self.pause().map(|_| CrawlPhase::Paused),
            CrawlPhase::Paused => self.resume().map(|_| CrawlPhase::Running),
            _ => Err(TrawlError::NotRunning),
        }
    }

    /// Requests a stop; the loop unwinds at its next checkpoint
    ///
    /// A paused session is released so it can unwind.
    pub fn stop(&self) -> Result<(), TrawlError> {
        self.require_active()?;
        let control = self
            .shared
            .current_control()
            .ok_or(TrawlError::NotRunning)?;

        if control.stop() {
            self.console.log("Stopping crawl...");
        }
        Ok(())
    }

    /// Waits for the current session to be finalized and returns its report
    ///
    /// Returns `None` if no session was started since the last `wait`.
    pub async fn wait(&self) -> Option<CrawlReport> {
        let handle = self
            .shared
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()?;

        match handle.await {
            Ok(report) => Some(report),
            Err(e) => {
                tracing::error!("Crawl supervisor failed: {}", e);
                None
            }
        }
    }

    fn require_active(&self) -> Result<(), TrawlError> {
        if self.phase().is_active() {
            Ok(())
        } else {
            Err(TrawlError::NotRunning)
        }
    }
}

/// Runs the crawl loop in its own task and finalizes the session on every
/// exit path, including a panic inside the loop
async fn supervise(
    session: CrawlSession,
    crawl: CrawlLoop,
    shared: Arc<Shared>,
    console: ConsoleSink,
) -> CrawlReport {
    let seed = session.seed().to_string();
    let started_at = session.started_at();
    let control = session.control().clone();

    let report = match tokio::spawn(crawl.run(session)).await {
        Ok((mut session, pool, outcome)) => {
            for report in pool.shutdown().await {
                session.record_download(&report);
            }
            session.into_report(outcome)
        }
        Err(e) => {
            // Queued downloads are told to stop; their results are lost with the loop
            control.stop();
            tracing::error!("Crawl task failed: {}", e);
            console.log(format!("Crawl aborted: {}", e));
            CrawlReport::aborted(seed, started_at)
        }
    };

    if let Err(e) = shared.transition(report.outcome.exit_phase()) {
        tracing::warn!("{}", e);
    }
    if let Err(e) = shared.transition(CrawlPhase::Idle) {
        tracing::warn!("{}", e);
    }
    shared.set_control(None);
    console.busy(false);

    tracing::info!(
        "Crawl of {} finished ({:?}): {} pages visited, {} files downloaded",
        report.seed,
        report.outcome,
        report.visited.len(),
        report.downloaded.len()
    );
    console.log("Crawling completed or stopped.");
    console.log(format!("Total files downloaded: {}", report.downloaded.len()));
    console.finished(report.clone());

    report
}

/// Everything the crawl task owns besides the session
struct CrawlLoop {
    classifier: Classifier,
    fetcher: Fetcher,
    pool: DownloadPool,
    console: ConsoleSink,
}

impl CrawlLoop {
    /// Consumes the frontier breadth-first
    ///
    /// # Loop
    ///
    /// 1. Fold in finished downloads
    /// 2. Checkpoint (blocks while paused)
    /// 3. Stop if requested or the page budget is spent
    /// 4. Dequeue; an empty frontier completes the session
    /// 5. Fetch, then honour a stop requested during the request
    /// 6. For a page, walk its links: downloadable ones go to the pool,
    ///    the rest are offered to the frontier at depth + 1
    async fn run(mut self, mut session: CrawlSession) -> (CrawlSession, DownloadPool, SessionOutcome) {
        let control = session.control().clone();

        loop {
            for report in self.pool.collect_ready() {
                session.record_download(&report);
            }

            if control.checkpoint().await == Checkpoint::Stop || session.should_stop() {
                break;
            }

            let Some(entry) = session.frontier_mut().dequeue() else {
                tracing::debug!("Frontier exhausted");
                break;
            };

            tracing::debug!(
                "Fetching {} (depth {}, {} visited, {} queued)",
                entry.url,
                entry.depth,
                session.frontier().visited().len(),
                session.frontier().pending()
            );
            let result = self.fetcher.fetch(&entry.url).await;

            if control.is_stop_requested() {
                break;
            }

            if result.is_failure() {
                session.record_page_failure();
            }

            match result {
                FetchResult::Page {
                    final_url, body, ..
                } => {
                    let page = parse_html(&body, &final_url);
                    match &page.title {
                        Some(title) => self.console.log(format!("Visited: {} ({})", entry.url, title)),
                        None => self.console.log(format!("Visited: {}", entry.url)),
                    }

                    for link in page.links {
                        if control.checkpoint().await == Checkpoint::Stop {
                            break;
                        }
                        self.follow_link(&mut session, &link, &final_url, entry.depth + 1);
                    }
                }
                FetchResult::Download { content_type, .. } => {
                    tracing::debug!("{} is a {} file", entry.url, content_type);
                    self.dispatch_download(&mut session, entry.url);
                }
                FetchResult::Skipped { content_type } => {
                    tracing::debug!("Skipping {} ({})", entry.url, content_type);
                }
                FetchResult::HttpError { status_code } => {
                    tracing::warn!("HTTP {} for {}", status_code, entry.url);
                }
                FetchResult::NetworkError { error } => {
                    tracing::warn!("Failed to fetch {}: {}", entry.url, error);
                }
            }
        }

        let outcome = if control.is_stop_requested() {
            SessionOutcome::Stopped
        } else {
            SessionOutcome::Completed
        };

        (session, self.pool, outcome)
    }

    fn follow_link(&self, session: &mut CrawlSession, link: &str, page: &Url, depth: u32) {
        let url = match resolve_url(link, page) {
            Ok(url) => url,
            Err(e) => {
                tracing::trace!("Ignoring {}: {}", link, e);
                return;
            }
        };

        if self.classifier.is_downloadable_url(&url) {
            self.dispatch_download(session, url);
        } else {
            let outcome = session.frontier_mut().enqueue(url.as_str(), depth);
            tracing::trace!("{} -> {:?}", url, outcome);
        }
    }

    /// Hands a URL to the pool unless this session already claimed it or its
    /// file name
    fn dispatch_download(&self, session: &mut CrawlSession, url: Url) {
        let file_name = match Downloader::file_name_for(&url) {
            Ok(name) => name,
            Err(e) => {
                self.console.log(format!("Failed to download {}: {}", url, e));
                return;
            }
        };

        if !session.claim_download(&url, &file_name) {
            tracing::debug!("{} already dispatched as {}", url, file_name);
            return;
        }

        if let Err(e) = self.pool.submit(DownloadTask { url }) {
            tracing::warn!("Could not queue download: {}", e);
        }
    }
}
