//! Trawler: a polite single-host file crawler
//!
//! This crate walks a website breadth-first from a seed URL, stays on the
//! seed's network location, and downloads every linked document, image,
//! archive or media file it recognises into a local folder.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Trawler operations
#[derive(Debug, Error)]
pub enum TrawlError {
    #[error("Invalid start parameters: {0}")]
    Validation(String),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("A crawl session is already active ({phase:?})")]
    AlreadyRunning { phase: state::CrawlPhase },

    #[error("No crawl session is active")]
    NotRunning,

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::CrawlPhase,
        to: state::CrawlPhase,
    },

    #[error("Download pool is closed")]
    PoolClosed,
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Errors raised while saving a single file
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("Cannot derive a file name from {url}")]
    NoFileName { url: String },

    #[error("Request for {url} failed: {source}")]
    Request { url: String, source: reqwest::Error },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Failed writing {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Result type alias for Trawler operations
pub type Result<T> = std::result::Result<T, TrawlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlController, StartRequest};
pub use output::{ConsoleEvent, CrawlReport};
pub use state::{CrawlPhase, CrawlSession};
pub use crate::url::{network_location, normalize_url, resolve_url};
