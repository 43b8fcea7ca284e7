//! Configuration validation
//!
//! Error messages name the offending key as it appears in the TOML file.

use crate::config::types::{Config, CrawlerConfig, OutputConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler timeouts and probe limits
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    for (name, value) in [
        ("crawler.crawl-timeout-secs", config.crawl_timeout_secs),
        ("crawler.render-timeout-secs", config.render_timeout_secs),
        ("crawler.probe-timeout-secs", config.probe_timeout_secs),
    ] {
        if value < 1 {
            return Err(ConfigError::Validation(format!(
                "{} must be >= 1 second, got {}",
                name, value
            )));
        }
    }

    if config.crawl_timeout_secs < config.render_timeout_secs {
        return Err(ConfigError::Validation(format!(
            "crawler.crawl-timeout-secs ({}) must not be shorter than crawler.render-timeout-secs ({})",
            config.crawl_timeout_secs, config.render_timeout_secs
        )));
    }

    if config.max_concurrent_probes < 1 || config.max_concurrent_probes > 100 {
        return Err(ConfigError::Validation(format!(
            "crawler.max-concurrent-probes must be between 1 and 100, got {}",
            config.max_concurrent_probes
        )));
    }

    Ok(())
}

/// Checks the identity sent in the User-Agent header
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    let name = config.crawler_name.as_str();
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(ConfigError::Validation(format!(
            "user-agent.crawler-name must be non-empty ASCII letters, digits or hyphens, got '{}'",
            name
        )));
    }

    Url::parse(&config.contact_url).map_err(|e| {
        ConfigError::InvalidUrl(format!("user-agent.contact-url '{}': {}", config.contact_url, e))
    })?;

    if !looks_like_email(&config.contact_email) {
        return Err(ConfigError::Validation(format!(
            "user-agent.contact-email is not an email address: '{}'",
            config.contact_email
        )));
    }

    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "output.database-path must not be empty".to_string(),
        ));
    }

    Ok(())
}

/// One `@`, a non-empty local part, and a dotted domain
fn looks_like_email(address: &str) -> bool {
    match address.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.split('.').count() > 1
                && domain.split('.').all(|label| !label.is_empty())
        }
        None => false,
    }
}
