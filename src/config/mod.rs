//! Configuration module for web-census
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, and freezing them into [`RunLimits`] for a crawl run.
//!
//! # Example
//!
//! ```no_run
//! use web_census::config::{load_config, RunLimits};
//! use std::path::Path;
//!
//! let config = load_config(Path::new("census.toml")).unwrap();
//! let limits = RunLimits::from_config(&config).unwrap();
//! println!("Crawler will stop after {} pages", limits.max_pages());
//! ```

mod limits;
mod parser;
mod types;
mod validation;

// Re-export types
pub use limits::RunLimits;
pub use types::{Config, CrawlerConfig, OutputConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{load_config, parse_config};
pub use validation::validate;
