//! Bounded download worker pool
//!
//! The crawl loop submits [`DownloadTask`]s without waiting; a fixed number of
//! workers pull them from a shared queue. Workers log their own results and
//! send a [`DownloadReport`] back over one channel that only the crawl loop
//! reads, so the session's download list has a single writer.

use crate::crawler::control::CrawlControl;
use crate::crawler::downloader::{DownloadOutcome, Downloader};
use crate::output::ConsoleSink;
use crate::{DownloadError, TrawlError};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use url::Url;

/// A URL accepted for download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    pub url: Url,
}

/// Result of one download task
#[derive(Debug)]
pub struct DownloadReport {
    pub url: Url,
    pub result: Result<DownloadOutcome, DownloadError>,
}

impl DownloadReport {
    /// True when the body was freshly and completely written
    pub fn is_saved(&self) -> bool {
        matches!(&self.result, Ok(outcome) if outcome.is_saved())
    }
}

/// Fixed-size pool of download workers
pub struct DownloadPool {
    tasks: Option<mpsc::UnboundedSender<DownloadTask>>,
    reports: mpsc::UnboundedReceiver<DownloadReport>,
    workers: Vec<JoinHandle<()>>,
}

impl DownloadPool {
    /// Spawns `size` workers sharing one downloader
    pub fn spawn(
        size: usize,
        downloader: Downloader,
        control: CrawlControl,
        console: ConsoleSink,
    ) -> Self {
        let (task_tx, task_rx) = mpsc::unbounded_channel::<DownloadTask>();
        let (report_tx, report_rx) = mpsc::unbounded_channel();
        let task_rx = Arc::new(Mutex::new(task_rx));
        let downloader = Arc::new(downloader);

        let workers = (0..size.max(1))
            .map(|id| {
                let task_rx = Arc::clone(&task_rx);
                let downloader = Arc::clone(&downloader);
                let control = control.clone();
                let console = console.clone();
                let report_tx = report_tx.clone();

                tokio::spawn(async move {
                    loop {
                        // Hold the lock only while waiting for the next task
                        let task = { task_rx.lock().await.recv().await };
                        let Some(task) = task else {
                            break;
                        };

                        tracing::debug!("Worker {} downloading {}", id, task.url);
                        let result = downloader.download(&task.url, &control).await;
                        log_result(&console, &task.url, &result);

                        if report_tx
                            .send(DownloadReport {
                                url: task.url,
                                result,
                            })
                            .is_err()
                        {
                            break;
                        }
                    }
                    tracing::trace!("Worker {} finished", id);
                })
            })
            .collect();

        Self {
            tasks: Some(task_tx),
            reports: report_rx,
            workers,
        }
    }

    /// Queues a task without waiting for a worker
    pub fn submit(&self, task: DownloadTask) -> Result<(), TrawlError> {
        self.tasks
            .as_ref()
            .ok_or(TrawlError::PoolClosed)?
            .send(task)
            .map_err(|_| TrawlError::PoolClosed)
    }

    /// Returns the reports that are ready right now
    pub fn collect_ready(&mut self) -> Vec<DownloadReport> {
        let mut ready = Vec::new();
        while let Ok(report) = self.reports.try_recv() {
            ready.push(report);
        }
        ready
    }

    /// Closes the queue, waits for every worker to drain it, and returns
    /// all remaining reports
    pub async fn shutdown(mut self) -> Vec<DownloadReport> {
        self.tasks.take();

        for worker in self.workers.drain(..) {
            if let Err(e) = worker.await {
                tracing::error!("Download worker panicked: {}", e);
            }
        }

        let mut remaining = Vec::new();
        while let Some(report) = self.reports.recv().await {
            remaining.push(report);
        }
        remaining
    }
}

fn log_result(console: &ConsoleSink, url: &Url, result: &Result<DownloadOutcome, DownloadError>) {
    match result {
        Ok(DownloadOutcome::Saved { bytes, .. }) => {
            tracing::debug!("Saved {} ({} bytes)", url, bytes);
            console.log(format!("Downloaded: {}", url));
        }
        Ok(DownloadOutcome::AlreadyPresent { path }) => {
            console.log(format!("Already downloaded: {} ({})", url, path.display()));
        }
        Ok(DownloadOutcome::Interrupted { path, bytes }) => {
            console.log(format!(
                "Download stopped: {} ({} bytes kept in {})",
                url,
                bytes,
                path.display()
            ));
        }
        Err(e) => {
            tracing::warn!("Download of {} failed: {}", url, e);
            console.log(format!("Failed to download {}: {}", url, e));
        }
    }
}
