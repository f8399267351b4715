//! Link classifier
//!
//! Resolves a page's raw links and sorts each one into a bucket:
//!
//! | Bucket | Stats effect | Enqueued |
//! |--------|--------------|----------|
//! | file (`.pdf`, `.doc`, `.docx`) | per-kind counter, unique file set | never |
//! | internal | subdomain set | when under the depth limit and unseen |
//! | external | external counter, unique host set | never |
//!
//! Hrefs that do not resolve to an http(s) URL are dropped without touching
//! the stats.

use crate::config::RunLimits;
use crate::crawler::frontier::CrawlJob;
use crate::crawler::parser::PageLink;
use crate::output::CrawlStats;
use crate::url::{classify_link, extract_host, resolve_link, DomainMatch, LinkKind};
use std::collections::HashSet;
use url::Url;

/// Per-page classification result
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifiedLinks {
    /// Internal links to queue, at `depth + 1`
    pub follow: Vec<CrawlJob>,

    /// Internal links not followed: depth limit, already seen, or repeated
    pub out_of_scope: usize,

    pub files: usize,
    pub external: usize,

    /// Hrefs that did not resolve to an http(s) URL
    pub unresolved: usize,
}

/// Classifies outbound links against the target domain
#[derive(Debug, Clone)]
pub struct LinkClassifier {
    target_domain: String,
    domain_match: DomainMatch,
    max_depth: u32,
}

impl LinkClassifier {
    pub fn new(target_domain: impl Into<String>, domain_match: DomainMatch, max_depth: u32) -> Self {
        Self {
            target_domain: target_domain.into().to_lowercase(),
            domain_match,
            max_depth,
        }
    }

    pub fn from_limits(limits: &RunLimits) -> Self {
        Self::new(limits.target_domain(), limits.domain_match(), limits.max_depth())
    }

    /// Returns true if the URL's host belongs to the target domain
    pub fn is_internal_url(&self, url: &Url) -> bool {
        extract_host(url)
            .map(|host| self.domain_match.matches(&self.target_domain, &host))
            .unwrap_or(false)
    }

    /// Classifies the links of one page and records them in `stats`
    ///
    /// # Arguments
    ///
    /// * `page_url` - Base URL for resolving relative hrefs
    /// * `depth` - Depth of the page the links were found on
    /// * `links` - Raw links from the parser
    /// * `stats` - Updated in place
    /// * `is_seen` - Whether a URL has already been queued or visited
    pub fn classify<F>(
        &self,
        page_url: &Url,
        depth: u32,
        links: &[PageLink],
        stats: &mut CrawlStats,
        is_seen: F,
    ) -> ClassifiedLinks
    where
        F: Fn(&str) -> bool,
    {
        let mut result = ClassifiedLinks::default();
        let mut queued_here = HashSet::new();
        let can_descend = depth < self.max_depth;

        for link in links {
            let Some(url) = resolve_link(page_url, &link.href) else {
                result.unresolved += 1;
                continue;
            };
            stats.record_link();

            match classify_link(&url, &self.target_domain, self.domain_match) {
                LinkKind::File(kind) => {
                    stats.record_file(kind, url.as_str());
                    result.files += 1;
                }
                LinkKind::Internal => {
                    if let Some(host) = extract_host(&url) {
                        stats.record_internal_host(&host);
                    }
                    let followable = can_descend
                        && !is_seen(url.as_str())
                        && queued_here.insert(url.as_str().to_string());
                    if followable {
                        result.follow.push(CrawlJob::new(url.as_str(), depth + 1));
                    } else {
                        result.out_of_scope += 1;
                    }
                }
                LinkKind::External => {
                    if let Some(host) = extract_host(&url) {
                        stats.record_external(&host);
                    }
                    result.external += 1;
                }
            }
        }

        result
    }
}
