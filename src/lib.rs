//! web-census: a polite single-domain census crawler
//!
//! This crate crawls one web domain breadth-first under bounded concurrency,
//! classifies every discovered link (internal page, external host, downloadable
//! file), respects robots.txt, and aggregates traversal statistics.

pub mod config;
pub mod crawler;
pub mod output;
pub mod robots;
pub mod state;
pub mod transport;
pub mod url;

use thiserror::Error;

/// Main error type for web-census operations
#[derive(Debug, Error)]
pub enum CensusError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),
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
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

// Re-export commonly used types
pub use config::{Config, RunLimits};
pub use crawler::{run_crawl, Crawler};
pub use output::{CrawlStats, StatsSnapshot};
pub use state::{JobOutcome, RunState};
pub use crate::url::{classify_link, extract_host, normalize_url, LinkKind};
