//! File downloader
//!
//! Streams a response body into the save folder under the URL's basename.
//! Existing files are never re-fetched. The control gate is consulted before
//! every chunk write, so a pause parks the download and a stop ends it at the
//! next chunk boundary. Partial files are left on disk as-is.

use crate::config::CrawlerConfig;
use crate::crawler::control::{Checkpoint, CrawlControl};
use crate::url::path_basename;
use crate::DownloadError;
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use url::Url;

/// How a download ended, when it did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// The full body was written
    Saved { path: PathBuf, bytes: u64 },

    /// A file with the target name already existed; nothing was requested
    AlreadyPresent { path: PathBuf },

    /// A stop was requested before the body was complete
    Interrupted { path: PathBuf, bytes: u64 },
}

impl DownloadOutcome {
    /// True only for a completed fresh download
    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved { .. })
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::Saved { path, .. }
            | Self::AlreadyPresent { path }
            | Self::Interrupted { path, .. } => path,
        }
    }
}

/// Saves downloadable URLs into a folder
#[derive(Debug, Clone)]
pub struct Downloader {
    client: Client,
    save_folder: PathBuf,
    chunk_size: usize,
    timeout: Duration,
}

impl Downloader {
    pub fn new(client: Client, save_folder: impl Into<PathBuf>, config: &CrawlerConfig) -> Self {
        Self {
            client,
            save_folder: save_folder.into(),
            chunk_size: config.chunk_size.max(1),
            timeout: config.request_timeout(),
        }
    }

    /// Local file name for a URL: the last path segment, as it appears in the URL
    pub fn file_name_for(url: &Url) -> Result<String, DownloadError> {
        match path_basename(url) {
            Some(name) if name != "." && name != ".." => Ok(name.to_string()),
            _ => Err(DownloadError::NoFileName {
                url: url.to_string(),
            }),
        }
    }

    /// Full path the URL would be saved to
    pub fn target_path(&self, url: &Url) -> Result<PathBuf, DownloadError> {
        Ok(self.save_folder.join(Self::file_name_for(url)?))
    }

    /// Downloads `url` into the save folder
    ///
    /// # Flow
    ///
    /// 1. Derive the target path; an existing file → `AlreadyPresent`
    /// 2. Checkpoint, then send GET (time to headers bounded by the timeout)
    /// 3. Non-2xx → `HttpStatus`
    /// 4. Stream the body in `chunk_size` pieces, checkpointing before each
    ///    write; a stop → `Interrupted` with the bytes written so far
    pub async fn download(
        &self,
        url: &Url,
        control: &CrawlControl,
    ) -> Result<DownloadOutcome, DownloadError> {
        let path = self.target_path(url)?;

        if tokio::fs::metadata(&path).await.is_ok() {
            tracing::debug!("{} already present, skipping", path.display());
            return Ok(DownloadOutcome::AlreadyPresent { path });
        }

        if control.checkpoint().await == Checkpoint::Stop {
            return Ok(DownloadOutcome::Interrupted { path, bytes: 0 });
        }

        let request = self.client.get(url.as_str()).send();
        let mut response = match tokio::time::timeout(self.timeout, request).await {
            Ok(Ok(response)) => response,
            Ok(Err(source)) => {
                return Err(DownloadError::Request {
                    url: url.to_string(),
                    source,
                })
            }
            Err(_) => {
                return Err(DownloadError::Timeout {
                    url: url.to_string(),
                })
            }
        };

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let mut file = File::create(&path).await.map_err(|source| DownloadError::Io {
            path: path.clone(),
            source,
        })?;
        let mut bytes = 0u64;

        loop {
            let chunk = match response.chunk().await {
                Ok(Some(chunk)) => chunk,
                Ok(None) => break,
                Err(source) => {
                    let _ = file.flush().await;
                    return Err(DownloadError::Request {
                        url: url.to_string(),
                        source,
                    });
                }
            };

            for piece in chunk.chunks(self.chunk_size) {
                if control.checkpoint().await == Checkpoint::Stop {
                    let _ = file.flush().await;
                    tracing::debug!("Stopped {} after {} bytes", url, bytes);
                    return Ok(DownloadOutcome::Interrupted { path, bytes });
                }

                file.write_all(piece)
                    .await
                    .map_err(|source| DownloadError::Io {
                        path: path.clone(),
                        source,
                    })?;
                bytes += piece.len() as u64;
            }
        }

        file.flush().await.map_err(|source| DownloadError::Io {
            path: path.clone(),
            source,
        })?;

        Ok(DownloadOutcome::Saved { path, bytes })
    }
}
