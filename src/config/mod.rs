//! Configuration module for Utsushi
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key has a default, so a crawl can also be configured from the command
//! line alone.
//!
//! # Example
//!
//! ```no_run
//! use utsushi::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("utsushi.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, LinkRuleEntry, MirrorConfig, OutputConfig, ReportFormat, SocialEntry,
    UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
