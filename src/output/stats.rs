//! Crawl statistics
//!
//! `CrawlStats` is the live, run-scoped aggregate that workers update under
//! a lock. `StatsSnapshot` is the immutable result handed back to callers,
//! with every set rendered as a sorted list.

use crate::output::traits::OutputResult;
use crate::url::FileKind;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;

/// Live crawl statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStats {
    /// Pages fetched successfully
    pub total_pages: usize,

    /// Links that resolved to an http(s) URL
    pub total_links: usize,

    /// Fetched pages whose host belongs to the target domain
    pub internal_pages: usize,

    /// Pages that failed with an HTTP error, timeout or network error
    pub broken_pages: usize,

    /// URLs of broken pages, in the order they failed
    pub error_links: Vec<String>,

    /// Internal hosts seen in links
    pub subdomains: BTreeSet<String>,

    /// External links seen, duplicates included
    pub external_total: usize,

    /// Distinct external hosts
    pub external_hosts: BTreeSet<String>,

    /// File links seen, duplicates included
    pub files_total: usize,
    pub pdf: usize,
    pub doc: usize,
    pub docx: usize,

    /// Distinct file URLs
    pub unique_files: BTreeSet<String>,
}

impl CrawlStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a successfully fetched page
    pub fn record_page(&mut self, internal: bool) {
        self.total_pages += 1;
        if internal {
            self.internal_pages += 1;
        }
    }

    /// Records a broken page
    pub fn record_broken(&mut self, url: &str) {
        self.broken_pages += 1;
        self.error_links.push(url.to_string());
    }

    /// Records a resolved link, before classification
    pub fn record_link(&mut self) {
        self.total_links += 1;
    }

    /// Records an internal host
    pub fn record_internal_host(&mut self, host: &str) {
        if !self.subdomains.contains(host) {
            self.subdomains.insert(host.to_string());
        }
    }

    /// Records an external link
    pub fn record_external(&mut self, host: &str) {
        self.external_total += 1;
        if !self.external_hosts.contains(host) {
            self.external_hosts.insert(host.to_string());
        }
    }

    /// Records a downloadable file link
    pub fn record_file(&mut self, kind: FileKind, url: &str) {
        self.files_total += 1;
        match kind {
            FileKind::Pdf => self.pdf += 1,
            FileKind::Doc => self.doc += 1,
            FileKind::Docx => self.docx += 1,
        }
        if !self.unique_files.contains(url) {
            self.unique_files.insert(url.to_string());
        }
    }

    /// Takes a deep copy suitable for reporting
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            total_pages: self.total_pages,
            total_links: self.total_links,
            internal_pages: self.internal_pages,
            broken_pages: self.broken_pages,
            error_links: self.error_links.clone(),
            subdomains: self.subdomains.iter().cloned().collect(),
            external_links: ExternalLinkStats {
                total: self.external_total,
                unique: self.external_hosts.iter().cloned().collect(),
            },
            files: FileStats {
                total: self.files_total,
                pdf: self.pdf,
                doc: self.doc,
                docx: self.docx,
                unique: self.unique_files.iter().cloned().collect(),
            },
            started_at: None,
            finished_at: None,
            error: None,
        }
    }
}

/// External link counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExternalLinkStats {
    pub total: usize,
    pub unique: Vec<String>,
}

/// Downloadable file counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileStats {
    pub total: usize,
    pub pdf: usize,
    pub doc: usize,
    pub docx: usize,
    pub unique: Vec<String>,
}

/// Final statistics for a crawl run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub total_pages: usize,
    pub total_links: usize,
    pub internal_pages: usize,
    pub broken_pages: usize,
    pub error_links: Vec<String>,
    pub subdomains: Vec<String>,
    pub external_links: ExternalLinkStats,
    pub files: FileStats,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Set when the run stopped on an unexpected failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StatsSnapshot {
    /// Wall-clock duration of the run, if both ends were recorded
    pub fn duration(&self) -> Option<chrono::Duration> {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }

    /// Renders the snapshot as pretty-printed JSON
    pub fn to_json(&self) -> OutputResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &StatsSnapshot) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Total pages fetched: {}", stats.total_pages);
    println!("  Internal pages: {}", stats.internal_pages);
    println!("  Total links found: {}", stats.total_links);
    println!("  Broken pages: {}", stats.broken_pages);
    if let Some(duration) = stats.duration() {
        println!("  Duration: {:.1}s", duration.num_milliseconds() as f64 / 1000.0);
    }
    println!();

    println!("Subdomains ({}):", stats.subdomains.len());
    for host in &stats.subdomains {
        println!("  - {}", host);
    }
    println!();

    println!(
        "External Links: {} total, {} unique hosts",
        stats.external_links.total,
        stats.external_links.unique.len()
    );
    for host in &stats.external_links.unique {
        println!("  - {}", host);
    }
    println!();

    println!(
        "Files: {} total (pdf: {}, doc: {}, docx: {}), {} unique",
        stats.files.total,
        stats.files.pdf,
        stats.files.doc,
        stats.files.docx,
        stats.files.unique.len()
    );
    println!();

    if !stats.error_links.is_empty() {
        println!("Error Links ({}):", stats.error_links.len());
        for url in &stats.error_links {
            println!("  - {}", url);
        }
        println!();
    }

    if let Some(error) = &stats.error {
        println!("Run ended with error: {}", error);
    }
}
