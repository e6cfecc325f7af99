//! URL handling module for Utsushi
//!
//! This module provides URL normalization, host extraction, the same-host
//! filter used by the frontier, and host pattern matching for the social
//! platform table.

mod domain;
mod matcher;
mod normalize;

// Re-export main functions
pub use domain::{extract_host, is_same_host};
pub use matcher::matches_host_pattern;
pub use normalize::{normalize_parsed, normalize_url};
