//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - The breadth-first frontier with depth and page bounds
//! - Throttled HTTP fetching and response classification
//! - HTML parsing and link extraction
//! - The download worker pool and chunked file writer
//! - The pause/stop gate and the session controller

mod classifier;
mod control;
mod coordinator;
mod downloader;
mod fetcher;
mod frontier;
mod parser;
mod pool;

pub use classifier::{Classification, Classifier, DEFAULT_EXTENSIONS, DOWNLOADABLE_MIME_PREFIXES};
pub use control::{Checkpoint, CrawlControl};
pub use coordinator::{CrawlController, StartRequest};
pub use downloader::{DownloadOutcome, Downloader};
pub use fetcher::{build_http_client, FetchResult, Fetcher, Throttle};
pub use frontier::{EnqueueOutcome, Frontier, FrontierEntry};
pub use parser::{extract_links, parse_html, ParsedPage};
pub use pool::{DownloadPool, DownloadReport, DownloadTask};
