use crate::UrlError;
use url::Url;

/// Normalizes an absolute URL so that equivalent URLs deduplicate
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Require an HTTP or HTTPS scheme
/// 3. Require a host
/// 4. Remove the fragment (everything after #)
///
/// Parsing already lowercases the host, drops default ports and resolves dot
/// segments, so the result is stable: normalizing a normalized URL returns it
/// unchanged.
///
/// # Examples
///
/// ```
/// use trawler::url::normalize_url;
///
/// let url = normalize_url("http://Example.com/docs/index.html#intro").unwrap();
/// assert_eq!(url.as_str(), "http://example.com/docs/index.html");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;
    finish(url)
}

/// Resolves a possibly relative reference against `base`, then normalizes it
///
/// # Examples
///
/// ```
/// use trawler::url::resolve_url;
/// use url::Url;
///
/// let base = Url::parse("http://example.com/docs/").unwrap();
/// let url = resolve_url("../files/a.pdf#page=2", &base).unwrap();
/// assert_eq!(url.as_str(), "http://example.com/files/a.pdf");
/// ```
pub fn resolve_url(href: &str, base: &Url) -> Result<Url, UrlError> {
    let url = base
        .join(href.trim())
        .map_err(|e| UrlError::Parse(e.to_string()))?;
    finish(url)
}

fn finish(mut url: Url) -> Result<Url, UrlError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingDomain);
    }

    url.set_fragment(None);
    Ok(url)
}
