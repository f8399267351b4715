use url::Url;

/// Extracts the host from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
/// If the URL has no host (which shouldn't happen for valid HTTP(S) URLs), it returns None.
///
/// # Arguments
///
/// * `url` - The URL to extract the host from
///
/// # Returns
///
/// * `Some(String)` - The lowercase host
/// * `None` - If the URL has no host
///
/// # Examples
///
/// ```
/// use url::Url;
/// use web_census::url::extract_host;
///
/// let url = Url::parse("https://EXAMPLE.edu/path").unwrap();
/// assert_eq!(extract_host(&url), Some("example.edu".to_string()));
///
/// let url = Url::parse("https://sub.example.edu:8443/").unwrap();
/// assert_eq!(extract_host(&url), Some("sub.example.edu".to_string()));
/// ```
pub fn extract_host(url: &Url) -> Option<String> {
    url.host_str()
        .filter(|h| !h.is_empty())
        .map(|h| h.to_lowercase())
}

/// Returns the authority used to key per-host state: `host` or `host:port`
///
/// Default ports are omitted, so `https://a.edu/` and `https://a.edu:443/`
/// share a key while two local test servers on different ports do not.
pub fn host_key(url: &Url) -> Option<String> {
    let host = extract_host(url)?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host,
    })
}
