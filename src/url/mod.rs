//! URL handling module for Trawler
//!
//! This module provides URL normalization and the network-location helpers
//! used for same-domain containment.

mod domain;
mod normalize;

// Re-export main functions
pub use domain::{network_location, same_network_location};
pub use normalize::{normalize_url, resolve_url};

use url::Url;

/// Returns the last path segment of a URL, unless it is empty
///
/// # Examples
///
/// ```
/// use url::Url;
/// use trawler::url::path_basename;
///
/// let url = Url::parse("https://example.com/files/report.pdf?v=2").unwrap();
/// assert_eq!(path_basename(&url), Some("report.pdf"));
///
/// let url = Url::parse("https://example.com/").unwrap();
/// assert_eq!(path_basename(&url), None);
/// ```
pub fn path_basename(url: &Url) -> Option<&str> {
    url.path_segments()?.last().filter(|s| !s.is_empty())
}
