use url::Url;

/// Returns the network location of a URL: `host` or `host:port`
///
/// The host is lowercased and the port only appears when it differs from the
/// scheme's default, so `http://Example.com:80/` and `http://example.com/`
/// share a network location.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use trawler::url::network_location;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(network_location(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("http://localhost:8080/").unwrap();
/// assert_eq!(network_location(&url), Some("localhost:8080".to_string()));
/// ```
pub fn network_location(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host,
    })
}

/// Returns true when both URLs have the same network location
pub fn same_network_location(a: &Url, b: &Url) -> bool {
    match (network_location(a), network_location(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}
