use crate::config::types::{Config, CrawlerConfig, OutputConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Upper bound for every configured duration, in seconds
const MAX_SECONDS: f64 = 3600.0;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    // max_depth >= 0 is always true for u32, so no check needed

    validate_domain_string(&config.target_domain)?;

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.concurrency < 1 || config.concurrency > 100 {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and 100, got {}",
            config.concurrency
        )));
    }

    validate_seconds("request_delay", config.request_delay, true)?;
    validate_seconds("page_timeout", config.page_timeout, false)?;
    validate_seconds("robots_timeout", config.robots_timeout, false)?;

    if config.max_body_bytes < 1 {
        return Err(ConfigError::Validation(
            "max_body_bytes must be >= 1".to_string(),
        ));
    }

    if config.robots_scheme != "http" && config.robots_scheme != "https" {
        return Err(ConfigError::Validation(format!(
            "robots_scheme must be 'http' or 'https', got '{}'",
            config.robots_scheme
        )));
    }

    validate_start_url(&config.effective_start_url())?;

    Ok(())
}

/// Validates a duration given in seconds
fn validate_seconds(name: &str, value: f64, allow_zero: bool) -> Result<(), ConfigError> {
    let lower_ok = if allow_zero { value >= 0.0 } else { value > 0.0 };
    if !value.is_finite() || !lower_ok || value > MAX_SECONDS {
        let bound = if allow_zero { ">= 0" } else { "> 0" };
        return Err(ConfigError::Validation(format!(
            "{} must be {} and <= {} seconds, got {}",
            name, bound, MAX_SECONDS, value
        )));
    }
    Ok(())
}

/// Validates the start URL: well-formed, http(s), with a host
fn validate_start_url(start_url: &str) -> Result<(), ConfigError> {
    let url = Url::parse(start_url).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid start URL '{}': {}", start_url, e))
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "Start URL '{}' must use the http or https scheme",
            start_url
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(ConfigError::InvalidUrl(format!(
            "Start URL '{}' has no host",
            start_url
        )));
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

    if config.robots_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "robots_agent cannot be empty".to_string(),
        ));
    }

    if let Some(contact) = &config.contact_url {
        Url::parse(contact)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if let Some(path) = config.text_log() {
        if path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "text_log_path cannot be blank".to_string(),
            ));
        }
    }
    Ok(())
}

/// Validates a domain string
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

    // Check for consecutive dots
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::new("example.edu")).is_ok());
    }

    #[test]
    fn test_validate_domain_string() {
        assert!(validate_domain_string("example.com").is_ok());
        assert!(validate_domain_string("sub.example.com").is_ok());
        assert!(validate_domain_string("127.0.0.1").is_ok());

        assert!(validate_domain_string("").is_err());
        assert!(validate_domain_string("example").is_err());
        assert!(validate_domain_string(".example.com").is_err());
        assert!(validate_domain_string("example.com.").is_err());
        assert!(validate_domain_string("example..com").is_err());
        assert!(validate_domain_string("https://example.com").is_err());
    }

    #[test]
    fn test_max_pages_must_be_positive() {
        let mut config = Config::new("example.edu");
        config.crawler.max_pages = 0;
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_concurrency_bounds() {
        let mut config = Config::new("example.edu");
        config.crawler.concurrency = 0;
        assert!(validate(&config).is_err());
        config.crawler.concurrency = 101;
        assert!(validate(&config).is_err());
        config.crawler.concurrency = 100;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_delay_bounds() {
        let mut config = Config::new("example.edu");
        config.crawler.request_delay = 0.0;
        assert!(validate(&config).is_ok());
        config.crawler.request_delay = -0.1;
        assert!(validate(&config).is_err());
        config.crawler.request_delay = f64::NAN;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_timeouts_must_be_positive() {
        let mut config = Config::new("example.edu");
        config.crawler.page_timeout = 0.0;
        assert!(validate(&config).is_err());

        let mut config = Config::new("example.edu");
        config.crawler.robots_timeout = f64::INFINITY;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_start_url_scheme_and_host() {
        assert!(validate_start_url("https://example.edu/").is_ok());
        assert!(validate_start_url("http://127.0.0.1:8080/").is_ok());

        assert!(matches!(
            validate_start_url("not a url"),
            Err(ConfigError::InvalidUrl(_))
        ));
        assert!(matches!(
            validate_start_url("ftp://example.edu/"),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_robots_scheme() {
        let mut config = Config::new("example.edu");
        config.crawler.robots_scheme = "http".to_string();
        assert!(validate(&config).is_ok());
        config.crawler.robots_scheme = "gopher".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_crawler_name_characters() {
        let mut config = Config::new("example.edu");
        config.user_agent.crawler_name = "Census Bot".to_string();
        assert!(validate(&config).is_err());
    }
}
