/// Checks if a host matches a host pattern
///
/// Used by the social platform table. Two kinds of patterns are supported:
/// 1. Exact: "youtu.be" matches only "youtu.be"
/// 2. Wildcard: "*.facebook.com" matches "facebook.com", "www.facebook.com"
///    and "m.facebook.com"
///
/// Both sides are expected to be lowercase already.
///
/// # Examples
///
/// ```
/// use utsushi::url::matches_host_pattern;
///
/// assert!(matches_host_pattern("youtu.be", "youtu.be"));
/// assert!(!matches_host_pattern("youtu.be", "www.youtu.be"));
///
/// assert!(matches_host_pattern("*.x.com", "x.com"));
/// assert!(matches_host_pattern("*.x.com", "mobile.x.com"));
/// assert!(!matches_host_pattern("*.x.com", "box.com"));
/// ```
pub fn matches_host_pattern(pattern: &str, host: &str) -> bool {
    match pattern.strip_prefix("*.") {
        Some(base) => {
            host == base
                || host
                    .strip_suffix(base)
                    .is_some_and(|prefix| prefix.ends_with('.'))
        }
        None => host == pattern,
    }
}
