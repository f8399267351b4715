use crate::config::types::Config;
use crate::config::validation::validate;
use crate::url::{normalize_url, DomainMatch};
use crate::ConfigError;
use std::time::Duration;
use url::Url;

/// Immutable, validated limits for a single crawl run
///
/// `RunLimits` can only be obtained through [`RunLimits::from_config`], so
/// every instance satisfies the configuration invariants: at least one page,
/// a non-negative delay, a bounded worker count and an http(s) start URL.
#[derive(Debug, Clone)]
pub struct RunLimits {
    start_url: Url,
    target_domain: String,
    domain_match: DomainMatch,
    max_pages: usize,
    max_depth: u32,
    request_delay: Duration,
    concurrency: usize,
    page_timeout: Duration,
    robots_timeout: Duration,
    robots_scheme: String,
    robots_agent: String,
    max_body_bytes: usize,
}

impl RunLimits {
    /// Validates `config` and freezes it into run limits
    ///
    /// # Arguments
    ///
    /// * `config` - The loaded configuration
    ///
    /// # Returns
    ///
    /// * `Ok(RunLimits)` - The configuration is valid
    /// * `Err(ConfigError)` - A field is out of range or malformed
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        validate(config)?;

        let crawler = &config.crawler;
        let start_url = normalize_url(&crawler.effective_start_url())
            .map_err(|e| ConfigError::InvalidUrl(e.to_string()))?;

        Ok(Self {
            start_url,
            target_domain: crawler.target_domain.to_lowercase(),
            domain_match: crawler.domain_match,
            max_pages: crawler.max_pages,
            max_depth: crawler.max_depth,
            request_delay: Duration::from_secs_f64(crawler.request_delay),
            concurrency: crawler.concurrency,
            page_timeout: Duration::from_secs_f64(crawler.page_timeout),
            robots_timeout: Duration::from_secs_f64(crawler.robots_timeout),
            robots_scheme: crawler.robots_scheme.clone(),
            robots_agent: config.user_agent.robots_agent.trim().to_string(),
            max_body_bytes: crawler.max_body_bytes,
        })
    }

    pub fn start_url(&self) -> &Url {
        &self.start_url
    }

    pub fn target_domain(&self) -> &str {
        &self.target_domain
    }

    pub fn domain_match(&self) -> DomainMatch {
        self.domain_match
    }

    pub fn max_pages(&self) -> usize {
        self.max_pages
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    pub fn request_delay(&self) -> Duration {
        self.request_delay
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn page_timeout(&self) -> Duration {
        self.page_timeout
    }

    pub fn robots_timeout(&self) -> Duration {
        self.robots_timeout
    }

    pub fn robots_scheme(&self) -> &str {
        &self.robots_scheme
    }

    pub fn robots_agent(&self) -> &str {
        &self.robots_agent
    }

    pub fn max_body_bytes(&self) -> usize {
        self.max_body_bytes
    }
}
