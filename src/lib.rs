//! Utsushi: a polite site crawler and offline mirror builder
//!
//! This crate walks a website breadth-first under depth and same-host
//! constraints, extracts links, resources and contact metadata from every
//! page, and can optionally write an internally link-consistent offline
//! mirror of what it visited.

pub mod config;
pub mod crawler;
pub mod index_override;
pub mod mirror;
pub mod output;
pub mod state;
pub mod url;

use output::FailureKind;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Utsushi operations
///
/// Only pre-flight problems (bad configuration, bad seed, unreadable override
/// file) surface through this type. Failures local to one page or resource are
/// recorded in the crawl result instead.
#[derive(Debug, Error)]
pub enum UtsushiError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid seed '{seed}': {source}")]
    InvalidSeed { seed: String, source: UrlError },

    #[error("Index override error: {0}")]
    Override(#[from] OverrideError),

    #[error("Failed to read document {path}: {source}")]
    Document {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::TaskState,
        to: state::TaskState,
    },

    #[error("Mirror error: {0}")]
    Mirror(#[from] MirrorError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid domain pattern: {0}")]
    InvalidPattern(String),
}

/// URL-specific errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// A single failed network retrieval
///
/// Both variants are non-fatal to a crawl: the frontier records them and moves
/// on to the next task. No retries are attempted.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// Transport-level failure (DNS, connection refused, TLS, timeout)
    #[error("Network error for {url}: {message}")]
    Network {
        url: String,
        message: String,
        timed_out: bool,
    },

    /// The server answered with a 4xx/5xx status
    #[error("HTTP {status} for {url}")]
    Http { url: String, status: u16 },
}

impl FetchError {
    /// The URL that failed
    pub fn url(&self) -> &str {
        match self {
            Self::Network { url, .. } | Self::Http { url, .. } => url,
        }
    }

    /// HTTP status, if the server responded at all
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Network { .. } => None,
        }
    }

    /// Failure category as recorded in the crawl result
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Network { .. } => FailureKind::Network,
            Self::Http { .. } => FailureKind::Http,
        }
    }
}

/// Errors loading an index override file
#[derive(Debug, Error)]
pub enum OverrideError {
    #[error("Override file not found: {0}")]
    Missing(PathBuf),

    #[error("Failed to read override file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid override target: {0}")]
    InvalidTarget(String),
}

/// Errors while persisting the mirror
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Download failed: {0}")]
    Download(#[from] FetchError),
}

impl MirrorError {
    /// Failure category as recorded in the crawl result
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Write { .. } => FailureKind::Write,
            Self::Download(e) => e.kind(),
        }
    }
}

/// Result type alias for Utsushi operations
pub type Result<T> = std::result::Result<T, UtsushiError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{parse_local_file, run_crawl, CrawlSession};
pub use index_override::{IndexOverride, OverrideTarget};
pub use mirror::{MirrorManifest, MirrorWriter};
pub use output::CrawlResult;
pub use state::TaskState;
pub use url::{extract_host, is_same_host, normalize_url};
