//! URL handling module for web-census
//!
//! This module provides link resolution, host extraction, target-domain
//! matching, and link classification.

mod domain;
mod matcher;
mod normalize;

use ::url::Url;
use serde::Serialize;
use std::fmt;

// Re-export main functions
pub use domain::{extract_host, host_key};
pub use matcher::DomainMatch;
pub use normalize::{normalize_url, resolve_link};

/// Downloadable document kinds that are counted but never fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Pdf,
    Doc,
    Docx,
}

impl FileKind {
    /// All recognised kinds
    pub const ALL: [FileKind; 3] = [FileKind::Pdf, FileKind::Doc, FileKind::Docx];

    /// The path extension, including the dot
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => ".pdf",
            Self::Doc => ".doc",
            Self::Docx => ".docx",
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.extension()[1..])
    }
}

/// Link classification, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkKind {
    /// Downloadable document - counted, never enqueued
    File(FileKind),
    /// Host belongs to the target domain
    Internal,
    /// Any other host
    External,
}

/// Returns the file kind when the URL path ends in a known extension
///
/// The query string does not take part: `/a.pdf?v=2` is a PDF and
/// `/view?file=a.pdf` is not.
pub fn file_kind(url: &Url) -> Option<FileKind> {
    let path = url.path().to_ascii_lowercase();
    FileKind::ALL
        .into_iter()
        .find(|kind| path.ends_with(kind.extension()))
}

/// Classifies a resolved link
///
/// File extensions take precedence over the host, so a PDF on the target
/// domain is a file link, not an internal page.
///
/// # Arguments
///
/// * `url` - The resolved, absolute link
/// * `target_domain` - The lowercase target domain
/// * `mode` - How hosts are matched against the target domain
///
/// # Examples
///
/// ```
/// use url::Url;
/// use web_census::url::{classify_link, DomainMatch, FileKind, LinkKind};
///
/// let classify = |s: &str| classify_link(&Url::parse(s).unwrap(), "x.edu", DomainMatch::Substring);
///
/// assert_eq!(classify("https://x.edu/report.PDF"), LinkKind::File(FileKind::Pdf));
/// assert_eq!(classify("https://lib.x.edu/"), LinkKind::Internal);
/// assert_eq!(classify("https://other.org/"), LinkKind::External);
/// ```
pub fn classify_link(url: &Url, target_domain: &str, mode: DomainMatch) -> LinkKind {
    if let Some(kind) = file_kind(url) {
        return LinkKind::File(kind);
    }

    match extract_host(url) {
        Some(host) if mode.matches(target_domain, &host) => LinkKind::Internal,
        _ => LinkKind::External,
    }
}
