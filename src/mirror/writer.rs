//! Mirror writer
//!
//! Persists pages and resources under the mirror root, rewriting links so
//! the copy browses offline, and emits the navigation index at the end of
//! the run.

use crate::crawler::{ExtractionRules, Fetcher, ResourceKind};
use crate::mirror::manifest::{EntryKind, EntryStatus, ManifestEntry, MirrorManifest};
use crate::mirror::paths::{relative_link, MIRROR_INDEX_FILE};
use crate::mirror::rewrite::{rewrite_links, LinkHint};
use crate::output::MirrorReport;
use crate::url::is_same_host;
use crate::MirrorError;
use std::path::{Path, PathBuf};
use url::Url;

/// Writes one mirror session to disk
#[derive(Debug)]
pub struct MirrorWriter {
    root: PathBuf,
    seed: Url,
    rules: ExtractionRules,
    manifest: MirrorManifest,
}

impl MirrorWriter {
    /// Creates a writer rooted at `root`; only `seed`'s host is mirrored
    pub fn new(root: impl Into<PathBuf>, seed: Url) -> Self {
        Self {
            root: root.into(),
            seed,
            rules: ExtractionRules::default(),
            manifest: MirrorManifest::new(),
        }
    }

    /// Uses `rules` to decide which attributes hold links when rewriting
    pub fn with_rules(mut self, rules: ExtractionRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifest(&self) -> &MirrorManifest {
        &self.manifest
    }

    /// Returns true if `url` belongs to the mirrored site
    pub fn is_mirrored_host(&self, url: &Url) -> bool {
        is_same_host(&self.seed, url)
    }

    /// Rewrites and stores a page, returning its mirror path
    ///
    /// `base_url` resolves relative references in `content` (the final URL
    /// after redirects); `url` decides where the page is stored. Same-host
    /// references are assigned manifest paths on the fly, so links point to
    /// their intended location even before (or without) the target being
    /// stored.
    pub async fn mirror_page(
        &mut self,
        url: &Url,
        base_url: &Url,
        content: &str,
    ) -> Result<String, MirrorError> {
        let local_path = self.manifest.assign(url, EntryKind::Page);

        let seed = &self.seed;
        let manifest = &mut self.manifest;
        let rewritten = rewrite_links(content, base_url, &self.rules, |target, hint| {
            if !is_same_host(seed, target) {
                return None;
            }
            let kind = match hint {
                LinkHint::Page => EntryKind::Page,
                LinkHint::Resource => EntryKind::Asset,
            };
            let target_path = manifest.assign(target, kind);
            Some(relative_link(&local_path, &target_path))
        });

        self.store(url, &local_path, rewritten.as_bytes()).await?;
        Ok(local_path)
    }

    /// Stores a navigable non-HTML body verbatim
    pub async fn mirror_raw(&mut self, url: &Url, body: &[u8]) -> Result<String, MirrorError> {
        let local_path = self.manifest.assign(url, EntryKind::Page);
        self.store(url, &local_path, body).await?;
        Ok(local_path)
    }

    /// Downloads a resource once and stores it, returning its mirror path
    ///
    /// A resource that was already attempted (stored or failed) is not
    /// fetched again; its assigned path is returned as is.
    pub async fn mirror_resource(
        &mut self,
        fetcher: &Fetcher,
        url: &Url,
        kind: ResourceKind,
    ) -> Result<String, MirrorError> {
        let local_path = self.manifest.assign(url, kind.into());

        if self.already_attempted(url) {
            tracing::debug!("Resource {} already handled", url);
            return Ok(local_path);
        }

        tracing::debug!("Downloading {} {}", kind, url);
        let fetched = match fetcher.fetch(url).await {
            Ok(fetched) => fetched,
            Err(e) => {
                self.manifest.set_status(url, EntryStatus::Failed);
                return Err(MirrorError::Download(e));
            }
        };

        self.store(url, &local_path, &fetched.body).await?;
        Ok(local_path)
    }

    /// Returns true if `url` has a stored or failed manifest entry
    pub fn already_attempted(&self, url: &Url) -> bool {
        self.manifest
            .get(url)
            .map(|e| e.status != EntryStatus::Pending)
            .unwrap_or(false)
    }

    async fn store(&mut self, url: &Url, local_path: &str, bytes: &[u8]) -> Result<(), MirrorError> {
        let path = self.root.join(local_path);
        match write_file(&path, bytes).await {
            Ok(()) => {
                tracing::debug!("Wrote {}", path.display());
                self.manifest.set_status(url, EntryStatus::Stored);
                Ok(())
            }
            Err(source) => {
                self.manifest.set_status(url, EntryStatus::Failed);
                Err(MirrorError::Write { path, source })
            }
        }
    }

    /// Writes the navigation page listing every manifest entry
    pub async fn write_index(&self) -> Result<PathBuf, MirrorError> {
        let path = self.root.join(MIRROR_INDEX_FILE);
        let html = render_index(&self.seed, self.manifest.entries());

        write_file(&path, html.as_bytes())
            .await
            .map_err(|source| MirrorError::Write {
                path: path.clone(),
                source,
            })?;

        tracing::info!(
            "Wrote mirror index with {} entries to {}",
            self.manifest.len(),
            path.display()
        );
        Ok(path)
    }

    /// Plain snapshot of the mirror for the crawl result
    pub fn report(&self, index_path: Option<PathBuf>) -> MirrorReport {
        MirrorReport {
            root: self.root.clone(),
            index_path,
            manifest: self.manifest.entries().to_vec(),
        }
    }
}

async fn write_file(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, bytes).await
}

/// Human-readable label for a manifest entry
fn entry_label(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return url.to_string();
    };

    let path = urlencoding::decode(parsed.path())
        .map(|p| p.into_owned())
        .unwrap_or_else(|_| parsed.path().to_string());
    let trimmed = path.trim_matches('/');

    let mut label = if trimmed.is_empty() {
        "Home".to_string()
    } else {
        trimmed.to_string()
    };
    if let Some(query) = parsed.query() {
        label.push('?');
        label.push_str(query);
    }
    label
}

fn render_index(seed: &Url, entries: &[ManifestEntry]) -> String {
    let mut html = String::new();
    let title = format!("Mirror of {}", seed.host_str().unwrap_or(seed.as_str()));

    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", escape_html(&title)));
    html.push_str("</head>\n<body>\n");
    html.push_str(&format!("<h1>{}</h1>\n", escape_html(&title)));

    for (heading, pages) in [("Pages", true), ("Resources", false)] {
        let section: Vec<_> = entries
            .iter()
            .filter(|e| (e.kind == EntryKind::Page) == pages)
            .collect();
        if section.is_empty() {
            continue;
        }

        html.push_str(&format!("<h2>{}</h2>\n<ul>\n", heading));
        for entry in section {
            let status = if entry.is_stored() { "" } else { " (not stored)" };
            html.push_str(&format!(
                "<li><a href=\"{}\">{}</a> <small>{} [{}]{}</small></li>\n",
                escape_html(&entry.local_path),
                escape_html(&entry_label(&entry.url)),
                escape_html(&entry.url),
                entry.kind.as_str(),
                status
            ));
        }
        html.push_str("</ul>\n");
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
