//! URL to local path mapping
//!
//! Mirror paths are relative to the mirror root and always use `/` as the
//! separator, so the same string works as a filesystem path and as a link
//! inside rewritten HTML.

use sha2::{Digest, Sha256};
use std::path::Path;
use url::Url;

/// File name of the generated navigation page, reserved in every mirror
pub const MIRROR_INDEX_FILE: &str = "mirror_index.html";

/// Characters that are illegal in file names on at least one common platform
const ILLEGAL_CHARS: &[char] = &['<', '>', ':', '"', '\\', '|', '?', '*', '/'];

/// How a URL is going to be stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    /// A navigable page; extension-less names get `.html`
    Page,
    /// A resource, stored under its path verbatim
    Resource,
}

/// Maps a URL to its mirror path
///
/// Scheme, host and query are dropped; directory segments are kept. A path
/// that is empty or ends in `/` gets `index.html`. An extension-less page
/// gets `.html`; an extension-less resource becomes `<name>/index`.
///
/// # Examples
///
/// ```
/// use utsushi::mirror::{local_path_for, PathKind};
/// use url::Url;
///
/// let url = Url::parse("https://example.com/docs/").unwrap();
/// assert_eq!(local_path_for(&url, PathKind::Page), "docs/index.html");
///
/// let url = Url::parse("https://example.com/about").unwrap();
/// assert_eq!(local_path_for(&url, PathKind::Page), "about.html");
///
/// let url = Url::parse("https://example.com/js/app.js?v=3").unwrap();
/// assert_eq!(local_path_for(&url, PathKind::Resource), "js/app.js");
///
/// let url = Url::parse("https://example.com/api/data").unwrap();
/// assert_eq!(local_path_for(&url, PathKind::Resource), "api/data/index");
/// ```
pub fn local_path_for(url: &Url, kind: PathKind) -> String {
    let path = url.path();

    let mut segments: Vec<String> = path
        .split('/')
        .filter(|s| !s.is_empty())
        .map(sanitize_segment)
        .filter(|s| !s.is_empty())
        .collect();

    if segments.is_empty() || path.ends_with('/') {
        segments.push("index.html".to_string());
    } else if segments
        .last()
        .is_some_and(|last| Path::new(last.as_str()).extension().is_none())
    {
        match kind {
            PathKind::Page => {
                if let Some(last) = segments.last_mut() {
                    last.push_str(".html");
                }
            }
            // Stored inside a directory of its own name, so `/api/data` and
            // `/api/data/x.js` can both exist
            PathKind::Resource => segments.push("index".to_string()),
        }
    }

    segments.join("/")
}

/// Decodes and sanitizes one path segment
fn sanitize_segment(raw: &str) -> String {
    let decoded = urlencoding::decode(raw)
        .map(|d| d.into_owned())
        .unwrap_or_else(|_| raw.to_string());

    if decoded == "." || decoded == ".." {
        return "_".to_string();
    }

    decoded
        .chars()
        .map(|c| {
            if c.is_control() || ILLEGAL_CHARS.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect()
}

/// Inserts a short hash of `url` before the extension of `path`'s file name
///
/// `blog/post.html` becomes `blog/post-1a2b3c4d.html`.
pub fn with_hash_suffix(path: &str, url: &str) -> String {
    let digest = hex::encode(Sha256::digest(url.as_bytes()));
    let tag = &digest[..8];

    let (dir, file) = match path.rfind('/') {
        Some(idx) => (&path[..=idx], &path[idx + 1..]),
        None => ("", path),
    };

    match file.rfind('.') {
        Some(dot) if dot > 0 => format!("{}{}-{}{}", dir, &file[..dot], tag, &file[dot..]),
        _ => format!("{}{}-{}", dir, file, tag),
    }
}

/// Path of `to` relative to the directory containing `from`
///
/// Both arguments are mirror paths.
pub fn relative_link(from: &str, to: &str) -> String {
    let from_dir = Path::new(from).parent().unwrap_or_else(|| Path::new(""));

    match pathdiff::diff_paths(Path::new(to), from_dir) {
        Some(relative) => relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/"),
        None => to.to_string(),
    }
}
