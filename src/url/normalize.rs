use crate::UrlError;
use url::Url;

/// List of tracking query parameters to remove during normalization
const TRACKING_PARAMS: &[&str] = &[
    "fbclid", "gclid", "dclid", "msclkid", "mc_eid", "mc_cid", "_ga", "yclid",
];

/// Normalizes a URL into the canonical form used for deduplication
///
/// The normalized string is the key of both the visited set and the mirror
/// manifest, so two references to the same resource always agree.
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Require an HTTP(S) scheme and a host
/// 3. Lowercase the host (done by the parser) and drop default ports
/// 4. Collapse repeated slashes in the path; an empty path becomes `/`.
///    Trailing slashes are kept, they decide the mirror layout.
/// 5. Remove the fragment
/// 6. Remove tracking query parameters and sort the rest
/// 7. Remove an empty query string
///
/// # Examples
///
/// ```
/// use utsushi::url::normalize_url;
///
/// let url = normalize_url("HTTPS://Example.COM//docs//intro/?utm_source=x#top").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/docs/intro/");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;
    normalize_parsed(url)
}

/// Normalizes an already parsed URL (see [`normalize_url`])
pub fn normalize_parsed(mut url: Url) -> Result<Url, UrlError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    let normalized_path = normalize_path(url.path());
    if normalized_path != url.path() {
        url.set_path(&normalized_path);
    }

    url.set_fragment(None);

    if url.query().is_some() {
        let params = filter_and_sort_query_params(&url);
        if params.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(params);
        }
    }

    Ok(url)
}

/// Collapses empty segments, keeping a trailing slash when present
fn normalize_path(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    if segments.is_empty() {
        return "/".to_string();
    }

    let mut result = format!("/{}", segments.join("/"));
    if path.ends_with('/') {
        result.push('/');
    }
    result
}

/// Filters out tracking parameters and sorts remaining query parameters
fn filter_and_sort_query_params(url: &Url) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !is_tracking_param(key))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    params.sort();
    params
}

/// Checks if a query parameter is a tracking parameter
fn is_tracking_param(key: &str) -> bool {
    key.starts_with("utm_") || TRACKING_PARAMS.contains(&key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme_is_preserved() {
        let result = normalize_url("http://example.com/page").unwrap();
        assert_eq!(result.as_str(), "http://example.com/page");
    }

    #[test]
    fn test_www_is_preserved() {
        let result = normalize_url("https://www.example.com/").unwrap();
        assert_eq!(result.as_str(), "https://www.example.com/");
    }

    #[test]
    fn test_trailing_slash_is_preserved() {
        let result = normalize_url("https://example.com/docs/").unwrap();
        assert_eq!(result.as_str(), "https://example.com/docs/");

        let result = normalize_url("https://example.com/docs").unwrap();
        assert_eq!(result.as_str(), "https://example.com/docs");
    }

    #[test]
    fn test_remove_fragment() {
        let result = normalize_url("https://example.com/page#section").unwrap();
        assert_eq!(result.as_str(), "https://example.com/page");
    }

    #[test]
    fn test_remove_tracking_params() {
        let result = normalize_url("https://example.com/page?utm_source=twitter").unwrap();
        assert_eq!(result.as_str(), "https://example.com/page");
    }

    #[test]
    fn test_sort_query_params() {
        let result = normalize_url("https://example.com/page?b=2&a=1&fbclid=x").unwrap();
        assert_eq!(result.as_str(), "https://example.com/page?a=1&b=2");
    }

    #[test]
    fn test_dot_segments_resolved() {
        let result = normalize_url("https://example.com/a/../b/./c").unwrap();
        assert_eq!(result.as_str(), "https://example.com/b/c");
    }

    #[test]
    fn test_lowercase_host_only() {
        let result = normalize_url("https://EXAMPLE.COM/Page").unwrap();
        assert_eq!(result.as_str(), "https://example.com/Page");
    }

    #[test]
    fn test_default_port_dropped() {
        let result = normalize_url("https://example.com:443/").unwrap();
        assert_eq!(result.as_str(), "https://example.com/");

        let result = normalize_url("http://127.0.0.1:8080/x").unwrap();
        assert_eq!(result.as_str(), "http://127.0.0.1:8080/x");
    }

    #[test]
    fn test_empty_path_becomes_root() {
        let result = normalize_url("https://example.com").unwrap();
        assert_eq!(result.as_str(), "https://example.com/");
    }

    #[test]
    fn test_multiple_slashes() {
        let result = normalize_url("https://example.com///path//to///page").unwrap();
        assert_eq!(result.as_str(), "https://example.com/path/to/page");
    }

    #[test]
    fn test_invalid_scheme() {
        let result = normalize_url("ftp://example.com/page");
        assert!(matches!(result.unwrap_err(), UrlError::InvalidScheme(_)));

        let result = normalize_url("mailto:someone@example.com");
        assert!(matches!(result.unwrap_err(), UrlError::InvalidScheme(_)));
    }

    #[test]
    fn test_malformed_url() {
        assert!(matches!(
            normalize_url("not a url").unwrap_err(),
            UrlError::Parse(_)
        ));
    }

    #[test]
    fn test_equivalent_references_share_a_key() {
        let a = normalize_url("https://example.com/about#team").unwrap();
        let b = normalize_url("https://Example.com//about?utm_campaign=z").unwrap();
        assert_eq!(a, b);
    }
}
