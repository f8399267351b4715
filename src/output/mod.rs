//! Output module for crawl results
//!
//! This module handles:
//! - Accumulating crawl statistics and snapshotting them
//! - Rendering statistics for the console or as JSON
//! - Sinking the extracted text of fetched pages

mod sink;
pub mod stats;
mod traits;

pub use sink::{format_record, FileTextSink, MemorySink, NullSink};
pub use stats::{print_statistics, CrawlStats, ExternalLinkStats, FileStats, StatsSnapshot};
pub use traits::{OutputError, OutputResult, PageTextSink};
