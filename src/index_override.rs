//! Index override handling
//!
//! An override replaces the online content of matching pages with a local
//! file. The replacement is what gets parsed for link discovery and what gets
//! written to the mirror; matching pages are never fetched.

use crate::url::{normalize_parsed, normalize_url};
use crate::OverrideError;
use std::path::{Path, PathBuf};
use url::Url;

/// Which pages an override applies to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverrideTarget {
    /// Every page processed in the session
    AllPages,
    /// Only the page whose normalized URL equals this one
    Url(Url),
}

impl OverrideTarget {
    /// Interprets a configured scope
    ///
    /// `"seed"` targets the seed URL, `"all"` targets every page, anything
    /// else must be an absolute HTTP(S) URL.
    pub fn from_scope(scope: &str, seed: &Url) -> Result<Self, OverrideError> {
        match scope.trim() {
            s if s.eq_ignore_ascii_case("all") => Ok(Self::AllPages),
            s if s.is_empty() || s.eq_ignore_ascii_case("seed") => normalize_parsed(seed.clone())
                .map(Self::Url)
                .map_err(|e| OverrideError::InvalidTarget(format!("{}: {}", seed, e))),
            s => normalize_url(s)
                .map(Self::Url)
                .map_err(|e| OverrideError::InvalidTarget(format!("{}: {}", s, e))),
        }
    }
}

/// A loaded override: target plus file content
#[derive(Debug, Clone)]
pub struct IndexOverride {
    path: PathBuf,
    content: String,
    target: OverrideTarget,
}

impl IndexOverride {
    /// Loads the override file
    ///
    /// A missing or unreadable file is an error; the session must not start
    /// when an explicitly requested override cannot be honored.
    pub fn load(path: &Path, target: OverrideTarget) -> Result<Self, OverrideError> {
        if !path.exists() {
            return Err(OverrideError::Missing(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path).map_err(|source| OverrideError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        if content.trim().is_empty() {
            tracing::warn!("Index override file {} is empty", path.display());
        }

        tracing::info!(
            "Loaded index override from {} ({} bytes, target: {})",
            path.display(),
            content.len(),
            match &target {
                OverrideTarget::AllPages => "all pages".to_string(),
                OverrideTarget::Url(u) => u.to_string(),
            }
        );

        Ok(Self {
            path: path.to_path_buf(),
            content,
            target,
        })
    }

    /// Override content for `url`, or `None` if the page should be fetched
    pub fn resolve(&self, url: &Url) -> Option<&str> {
        match &self.target {
            OverrideTarget::AllPages => Some(&self.content),
            OverrideTarget::Url(target) => {
                let candidate = normalize_parsed(url.clone()).ok()?;
                (candidate == *target).then_some(self.content.as_str())
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn target(&self) -> &OverrideTarget {
        &self.target
    }
}
