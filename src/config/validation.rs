use crate::config::types::{
    Config, CrawlerConfig, LinkRuleEntry, MirrorConfig, SocialEntry, UserAgentConfig,
};
use crate::crawler::LinkTarget;
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
///
/// Called after the TOML file and any command-line overrides have been merged.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_mirror_config(&config.mirror)?;
    validate_social_entries(&config.social)?;
    validate_link_rules(&config.link_rules)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    // max_depth >= 0 is always true for u32, so no check needed

    if !config.delay_seconds.is_finite() || config.delay_seconds < 0.0 {
        return Err(ConfigError::Validation(format!(
            "delay_seconds must be a non-negative number, got {}",
            config.delay_seconds
        )));
    }

    if config.request_timeout_seconds == 0 {
        return Err(ConfigError::Validation(
            "request_timeout_seconds must be >= 1".to_string(),
        ));
    }

    if config.max_pages == Some(0) {
        return Err(ConfigError::Validation(
            "max_pages must be >= 1 when set".to_string(),
        ));
    }

    if config.max_duration_seconds == Some(0) {
        return Err(ConfigError::Validation(
            "max_duration_seconds must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    if let Some(contact) = &config.contact_url {
        Url::parse(contact)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;
    }

    Ok(())
}

/// Validates mirror configuration
fn validate_mirror_config(config: &MirrorConfig) -> Result<(), ConfigError> {
    if config.enabled && config.root_dir.trim().is_empty() {
        return Err(ConfigError::Validation(
            "root_dir cannot be empty when mirroring is enabled".to_string(),
        ));
    }

    if let Some(path) = &config.index_override {
        if path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "index_override cannot be an empty path".to_string(),
            ));
        }
    }

    match config.override_scope.as_str() {
        "seed" | "all" => {}
        other => {
            let url = Url::parse(other).map_err(|e| {
                ConfigError::InvalidUrl(format!("Invalid override_scope '{}': {}", other, e))
            })?;
            if url.scheme() != "http" && url.scheme() != "https" {
                return Err(ConfigError::Validation(format!(
                    "override_scope URL '{}' must use HTTP or HTTPS",
                    other
                )));
            }
        }
    }

    Ok(())
}

/// Validates extra social platform entries
fn validate_social_entries(entries: &[SocialEntry]) -> Result<(), ConfigError> {
    for entry in entries {
        if entry.platform.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "Social entry for '{}' must name a platform",
                entry.domain
            )));
        }
        validate_domain_pattern(&entry.domain)?;
    }
    Ok(())
}

/// Validates extra tag/attribute classification rules
fn validate_link_rules(rules: &[LinkRuleEntry]) -> Result<(), ConfigError> {
    for rule in rules {
        if rule.tag.trim().is_empty() || rule.attribute.trim().is_empty() {
            return Err(ConfigError::Validation(
                "link rules need both a tag and an attribute".to_string(),
            ));
        }

        if LinkTarget::parse(&rule.kind).is_none() {
            return Err(ConfigError::Validation(format!(
                "Unknown link rule kind '{}' (expected navigation, script, stylesheet or image)",
                rule.kind
            )));
        }
    }
    Ok(())
}

/// Validates a domain pattern (supports wildcards)
fn validate_domain_pattern(pattern: &str) -> Result<(), ConfigError> {
    if pattern.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain pattern cannot be empty".to_string(),
        ));
    }

    // Check if it's a wildcard pattern
    if let Some(domain) = pattern.strip_prefix("*.") {
        // Validate the base domain part
        validate_domain_string(domain)?;
    } else {
        // Regular domain
        validate_domain_string(pattern)?;
    }

    Ok(())
}

/// Validates a domain string (without wildcard prefix)
fn validate_domain_string(domain: &str) -> Result<(), ConfigError> {
    if domain.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain cannot be empty".to_string(),
        ));
    }

    // Check for invalid characters
    if !domain
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' contains invalid characters",
            domain
        )));
    }

    // Check that it doesn't start or end with a dot or hyphen
    if domain.starts_with('.')
        || domain.ends_with('.')
        || domain.starts_with('-')
        || domain.ends_with('-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot start or end with '.' or '-'",
            domain
        )));
    }

    if domain.contains("..") {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot contain consecutive dots",
            domain
        )));
    }

    // Must contain at least one dot (e.g., example.com, not just "example")
    if !domain.contains('.') {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' must contain at least one dot (e.g., 'example.com')",
            domain
        )));
    }

    Ok(())
}
