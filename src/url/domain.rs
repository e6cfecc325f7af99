use url::Url;

/// Extracts the host from a URL
///
/// The host is lowercased; the port is not included. Returns `None` for URLs
/// without a host (`mailto:`, `file:` without authority, ...).
///
/// # Examples
///
/// ```
/// use url::Url;
/// use utsushi::url::extract_host;
///
/// let url = Url::parse("https://EXAMPLE.COM:8080/path").unwrap();
/// assert_eq!(extract_host(&url), Some("example.com".to_string()));
/// ```
pub fn extract_host(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Same-host filter used by the frontier and the mirror writer
///
/// Two URLs are on the same site when their lowercase hosts are equal and
/// their explicit ports agree. The scheme is ignored, so `http://example.com/`
/// and `https://example.com/` belong to the same site. Subdomains are
/// different sites.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use utsushi::url::is_same_host;
///
/// let seed = Url::parse("https://example.com/").unwrap();
/// assert!(is_same_host(&seed, &Url::parse("http://example.com/about").unwrap()));
/// assert!(!is_same_host(&seed, &Url::parse("https://blog.example.com/").unwrap()));
/// ```
pub fn is_same_host(seed: &Url, candidate: &Url) -> bool {
    match (extract_host(seed), extract_host(candidate)) {
        (Some(a), Some(b)) => a == b && seed.port() == candidate.port(),
        _ => false,
    }
}
