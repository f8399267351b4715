//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - The shared frontier with its visited set and page budget
//! - Politeness-checked page fetching
//! - HTML text and link extraction
//! - Link classification against the target domain
//! - Overall crawl coordination over a worker pool

mod classifier;
mod coordinator;
mod fetcher;
mod frontier;
mod parser;

pub use classifier::{ClassifiedLinks, LinkClassifier};
pub use coordinator::{run_crawl, Crawler};
pub use fetcher::{FetchError, PageFetcher};
pub use frontier::{Claim, CrawlJob, Frontier, InFlightJob, PageSlot};
pub use parser::{DocumentParser, HtmlDocumentParser, PageLink, ParseError, ParsedDocument};

pub use crate::transport::is_html_content_type;
