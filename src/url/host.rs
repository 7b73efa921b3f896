use url::Url;

/// Extracts the host from a URL
///
/// This function retrieves the host portion of a URL and converts it to
/// lowercase. The port is deliberately not part of the result: the crawl's
/// root restriction compares hosts, not authorities.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use trailmap::url::extract_host;
///
/// let url = Url::parse("https://example.com:8080/path").unwrap();
/// assert_eq!(extract_host(&url), Some("example.com".to_string()));
/// ```
pub fn extract_host(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Checks whether a URL belongs to the crawl's root host
///
/// `root_host` must be a normalized host (lowercase, no `www.` prefix), as
/// produced by [`extract_host`] on a normalized URL. Because normalization
/// strips `www.`, the comparison is exact: `www.example.com` and
/// `example.com` land on the same key, while numeric IP hosts only ever
/// match themselves.
pub fn host_matches_root(url: &Url, root_host: &str) -> bool {
    match extract_host(url) {
        Some(host) => host == root_host,
        None => false,
    }
}
