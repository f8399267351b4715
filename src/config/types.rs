use crate::url::DomainMatch;
use serde::Deserialize;

/// Main configuration structure for web-census
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Creates a configuration with defaults for everything but the target domain
    pub fn new(target_domain: impl Into<String>) -> Self {
        Self {
            crawler: CrawlerConfig::new(target_domain),
            user_agent: UserAgentConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Domain whose pages are followed; matched against link hosts
    #[serde(rename = "target-domain")]
    pub target_domain: String,

    /// First URL to fetch. Defaults to `https://{target-domain}`
    #[serde(rename = "start-url", default)]
    pub start_url: Option<String>,

    /// Maximum number of pages fetched successfully in one run
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: usize,

    /// Maximum link distance from the start URL
    #[serde(rename = "max-depth", default = "default_max_depth")]
    pub max_depth: u32,

    /// Pause before every request, in seconds
    #[serde(rename = "request-delay", default = "default_request_delay")]
    pub request_delay: f64,

    /// Number of concurrent workers and simultaneous fetches
    #[serde(rename = "concurrency", default = "default_concurrency")]
    pub concurrency: usize,

    /// How a link host is compared with the target domain
    #[serde(rename = "domain-match", default)]
    pub domain_match: DomainMatch,

    /// Page request timeout, in seconds
    #[serde(rename = "page-timeout", default = "default_page_timeout")]
    pub page_timeout: f64,

    /// robots.txt request timeout, in seconds
    #[serde(rename = "robots-timeout", default = "default_robots_timeout")]
    pub robots_timeout: f64,

    /// Scheme used to reach `/robots.txt` on each host
    #[serde(rename = "robots-scheme", default = "default_robots_scheme")]
    pub robots_scheme: String,

    /// Largest response body accepted, in bytes
    #[serde(rename = "max-body-bytes", default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl CrawlerConfig {
    /// Creates a crawler configuration with default limits
    pub fn new(target_domain: impl Into<String>) -> Self {
        Self {
            target_domain: target_domain.into(),
            start_url: None,
            max_pages: default_max_pages(),
            max_depth: default_max_depth(),
            request_delay: default_request_delay(),
            concurrency: default_concurrency(),
            domain_match: DomainMatch::default(),
            page_timeout: default_page_timeout(),
            robots_timeout: default_robots_timeout(),
            robots_scheme: default_robots_scheme(),
            max_body_bytes: default_max_body_bytes(),
        }
    }

    /// Returns the configured start URL, or the target domain's root
    pub fn effective_start_url(&self) -> String {
        match &self.start_url {
            Some(url) => url.clone(),
            None => format!("https://{}", self.target_domain),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name", default = "default_crawler_name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version", default = "default_crawler_version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url", default)]
    pub contact_url: Option<String>,

    /// Agent name looked up in robots.txt groups
    #[serde(rename = "robots-agent", default = "default_robots_agent")]
    pub robots_agent: String,
}

impl UserAgentConfig {
    /// Formats the `User-Agent` header: `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(contact) => format!(
                "{}/{} (+{})",
                self.crawler_name, self.crawler_version, contact
            ),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: default_crawler_name(),
            crawler_version: default_crawler_version(),
            contact_url: None,
            robots_agent: default_robots_agent(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// File receiving the text of every fetched page. Empty disables it.
    #[serde(rename = "text-log-path", default = "default_text_log_path")]
    pub text_log_path: Option<String>,
}

impl OutputConfig {
    /// Returns the text log path unless it is unset or empty
    pub fn text_log(&self) -> Option<&str> {
        self.text_log_path.as_deref().filter(|p| !p.is_empty())
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            text_log_path: default_text_log_path(),
        }
    }
}

fn default_max_pages() -> usize {
    500
}

fn default_max_depth() -> u32 {
    3
}

fn default_request_delay() -> f64 {
    0.5
}

fn default_concurrency() -> usize {
    10
}

fn default_page_timeout() -> f64 {
    10.0
}

fn default_robots_timeout() -> f64 {
    5.0
}

fn default_robots_scheme() -> String {
    "https".to_string()
}

fn default_max_body_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_crawler_name() -> String {
    env!("CARGO_PKG_NAME").to_string()
}

fn default_crawler_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_robots_agent() -> String {
    "*".to_string()
}

fn default_text_log_path() -> Option<String> {
    Some("web_crawler_output.txt".to_string())
}
