//! Offline mirror
//!
//! This module writes visited pages and their same-host resources under a
//! mirror root, including:
//! - URL to local path mapping with filesystem sanitization
//! - An append-only manifest that keeps every URL on one path
//! - Link rewriting to page-relative paths
//! - A generated navigation index

mod manifest;
mod paths;
mod rewrite;
mod writer;

pub use manifest::{EntryKind, EntryStatus, ManifestEntry, MirrorManifest};
pub use paths::{local_path_for, relative_link, with_hash_suffix, PathKind, MIRROR_INDEX_FILE};
pub use rewrite::{rewrite_links, LinkHint};
pub use writer::MirrorWriter;
