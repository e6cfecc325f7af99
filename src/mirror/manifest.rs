//! Mirror manifest
//!
//! Maps every remote URL referenced by the mirror to exactly one local path.
//! Entries are only ever appended; a URL keeps the path it was first given
//! for the rest of the run, and no two URLs share a path.

use crate::crawler::ResourceKind;
use crate::mirror::paths::{local_path_for, with_hash_suffix, PathKind, MIRROR_INDEX_FILE};
use crate::url::normalize_parsed;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use url::Url;

/// What a manifest entry stores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Page,
    Script,
    Stylesheet,
    Image,
    /// A resource referenced from markup whose exact kind is not known yet
    Asset,
}

impl EntryKind {
    pub fn path_kind(&self) -> PathKind {
        match self {
            Self::Page => PathKind::Page,
            _ => PathKind::Resource,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::Script => "script",
            Self::Stylesheet => "stylesheet",
            Self::Image => "image",
            Self::Asset => "asset",
        }
    }
}

impl From<ResourceKind> for EntryKind {
    fn from(kind: ResourceKind) -> Self {
        match kind {
            ResourceKind::Script => Self::Script,
            ResourceKind::Stylesheet => Self::Stylesheet,
            ResourceKind::Image => Self::Image,
        }
    }
}

/// Whether the entry's file exists on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    /// Path assigned, nothing written yet
    Pending,
    Stored,
    Failed,
}

/// One remote URL and its local path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestEntry {
    pub url: String,
    pub local_path: String,
    pub kind: EntryKind,
    pub status: EntryStatus,
}

impl ManifestEntry {
    pub fn is_stored(&self) -> bool {
        self.status == EntryStatus::Stored
    }
}

/// Append-only URL → local path mapping
#[derive(Debug)]
pub struct MirrorManifest {
    entries: Vec<ManifestEntry>,
    by_url: HashMap<String, usize>,
    claimed: HashSet<String>,
}

impl Default for MirrorManifest {
    fn default() -> Self {
        Self::new()
    }
}

impl MirrorManifest {
    pub fn new() -> Self {
        let mut claimed = HashSet::new();
        claimed.insert(MIRROR_INDEX_FILE.to_string());

        Self {
            entries: Vec::new(),
            by_url: HashMap::new(),
            claimed,
        }
    }

    /// Returns the local path for `url`, assigning one if needed
    ///
    /// A URL already in the manifest keeps its path regardless of `kind`.
    /// When the natural path is taken by another URL, a hash of the URL is
    /// inserted into the file name.
    pub fn assign(&mut self, url: &Url, kind: EntryKind) -> String {
        let key = manifest_key(url);

        if let Some(&idx) = self.by_url.get(&key) {
            let entry = &mut self.entries[idx];
            if entry.kind == EntryKind::Asset && kind != EntryKind::Asset {
                entry.kind = kind;
            }
            return entry.local_path.clone();
        }

        let natural = local_path_for(url, kind.path_kind());
        let local_path = self.unclaimed_path(natural, &key);

        tracing::debug!("Assigned {} -> {}", key, local_path);
        self.claimed.insert(local_path.clone());
        self.by_url.insert(key.clone(), self.entries.len());
        self.entries.push(ManifestEntry {
            url: key,
            local_path: local_path.clone(),
            kind,
            status: EntryStatus::Pending,
        });

        local_path
    }

    fn unclaimed_path(&self, natural: String, key: &str) -> String {
        if !self.claimed.contains(&natural) {
            return natural;
        }

        let mut candidate = with_hash_suffix(&natural, key);
        let mut attempt = 1;
        while self.claimed.contains(&candidate) {
            candidate = with_hash_suffix(&natural, &format!("{}#{}", key, attempt));
            attempt += 1;
        }
        candidate
    }

    pub fn get(&self, url: &Url) -> Option<&ManifestEntry> {
        self.by_url
            .get(&manifest_key(url))
            .map(|&idx| &self.entries[idx])
    }

    pub fn local_path(&self, url: &Url) -> Option<&str> {
        self.get(url).map(|e| e.local_path.as_str())
    }

    /// Updates the storage status of an existing entry
    pub fn set_status(&mut self, url: &Url, status: EntryStatus) {
        if let Some(&idx) = self.by_url.get(&manifest_key(url)) {
            self.entries[idx].status = status;
        }
    }

    /// Entries in assignment order
    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn manifest_key(url: &Url) -> String {
    normalize_parsed(url.clone())
        .map(|u| u.to_string())
        .unwrap_or_else(|_| url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_assign_is_stable() {
        let mut manifest = MirrorManifest::new();

        let first = manifest.assign(&url("https://example.com/about"), EntryKind::Page);
        let second = manifest.assign(&url("https://example.com/about#team"), EntryKind::Page);
        let third = manifest.assign(&url("https://example.com/about"), EntryKind::Image);

        assert_eq!(first, "about.html");
        assert_eq!(second, first);
        assert_eq!(third, first);
        assert_eq!(manifest.len(), 1);
    }

    #[test]
    fn test_collision_gets_hashed_name() {
        let mut manifest = MirrorManifest::new();

        let a = manifest.assign(&url("https://example.com/list?page=1"), EntryKind::Page);
        let b = manifest.assign(&url("https://example.com/list?page=2"), EntryKind::Page);

        assert_eq!(a, "list.html");
        assert_ne!(a, b);
        assert!(b.starts_with("list-"));
        assert!(b.ends_with(".html"));

        // Both keep their own paths afterwards
        assert_eq!(
            manifest.local_path(&url("https://example.com/list?page=2")),
            Some(b.as_str())
        );
    }

    #[test]
    fn test_index_file_is_reserved() {
        let mut manifest = MirrorManifest::new();
        let path = manifest.assign(
            &url("https://example.com/mirror_index.html"),
            EntryKind::Page,
        );
        assert_ne!(path, MIRROR_INDEX_FILE);
        assert!(path.starts_with("mirror_index-"));
    }

    #[test]
    fn test_paths_are_unique() {
        let mut manifest = MirrorManifest::new();
        for i in 0..20 {
            manifest.assign(
                &url(&format!("https://example.com/same?i={}", i)),
                EntryKind::Page,
            );
        }

        let paths: HashSet<_> = manifest.entries().iter().map(|e| &e.local_path).collect();
        assert_eq!(paths.len(), 20);
    }

    #[test]
    fn test_asset_kind_is_refined() {
        let mut manifest = MirrorManifest::new();
        let u = url("https://example.com/css/site.css");

        manifest.assign(&u, EntryKind::Asset);
        manifest.assign(&u, EntryKind::Stylesheet);

        assert_eq!(manifest.get(&u).unwrap().kind, EntryKind::Stylesheet);
    }

    #[test]
    fn test_extensionless_resource_leaves_room_for_children() {
        let mut manifest = MirrorManifest::new();

        let data = manifest.assign(&url("https://example.com/api/data"), EntryKind::Asset);
        let child = manifest.assign(&url("https://example.com/api/data/x.js"), EntryKind::Script);

        assert_eq!(data, "api/data/index");
        assert_eq!(child, "api/data/x.js");
    }

    #[test]
    fn test_status_updates() {
        let mut manifest = MirrorManifest::new();
        let u = url("https://example.com/");
        manifest.assign(&u, EntryKind::Page);

        assert_eq!(manifest.get(&u).unwrap().status, EntryStatus::Pending);
        manifest.set_status(&u, EntryStatus::Stored);
        assert!(manifest.get(&u).unwrap().is_stored());
    }
}
