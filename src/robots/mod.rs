//! Robots.txt handling module
//!
//! This module provides functionality for fetching, parsing, and caching
//! robots.txt files, and answers allow/deny questions for crawl targets.
//!
//! The policy fails open: a missing robots.txt, a non-200 answer or a
//! network failure all yield an empty rule set that allows every path.

mod cache;
mod parser;

pub use cache::{CachedRobots, RobotsCache, RobotsSource};
pub use parser::{AgentRules, RobotsRuleSet, WILDCARD_AGENT};

use crate::config::RunLimits;
use crate::transport::{Accept, HttpTransport};
use crate::url::host_key;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Per-run robots.txt policy engine
pub struct RobotsPolicy {
    transport: Arc<dyn HttpTransport>,
    cache: RobotsCache,
    scheme: String,
    timeout: Duration,
}

impl RobotsPolicy {
    /// Creates a policy engine with an empty cache
    ///
    /// # Arguments
    ///
    /// * `transport` - Used to request `/robots.txt`
    /// * `scheme` - `http` or `https`
    /// * `timeout` - Deadline for each robots.txt request
    pub fn new(transport: Arc<dyn HttpTransport>, scheme: impl Into<String>, timeout: Duration) -> Self {
        Self {
            transport,
            cache: RobotsCache::new(),
            scheme: scheme.into(),
            timeout,
        }
    }

    /// Creates a policy engine configured from run limits
    pub fn from_limits(transport: Arc<dyn HttpTransport>, limits: &RunLimits) -> Self {
        Self::new(transport, limits.robots_scheme(), limits.robots_timeout())
    }

    /// Checks whether `path` on `host` may be fetched by `user_agent`
    ///
    /// `host` is the URL authority (`host` or `host:port`).
    pub async fn allowed(&self, host: &str, path: &str, user_agent: &str) -> bool {
        let robots = self.rules_for(host).await;
        robots.is_allowed(path, user_agent)
    }

    /// Checks a full URL; the query string takes part in matching
    ///
    /// URLs without a host are allowed.
    pub async fn allowed_url(&self, url: &Url, user_agent: &str) -> bool {
        let Some(host) = host_key(url) else {
            return true;
        };
        let path = match url.query() {
            Some(query) => format!("{}?{}", url.path(), query),
            None => url.path().to_string(),
        };
        self.allowed(&host, &path, user_agent).await
    }

    /// Returns the cached rules for `host`, fetching them on first use
    pub async fn rules_for(&self, host: &str) -> CachedRobots {
        if let Some(cached) = self.cache.get(host) {
            tracing::trace!("Using cached robots.txt for {}", host);
            return cached;
        }
        self.cache
            .get_or_fetch(host, || self.fetch_rules(host))
            .await
    }

    /// Number of hosts whose robots.txt has been resolved
    pub fn cached_hosts(&self) -> usize {
        self.cache.len()
    }

    async fn fetch_rules(&self, host: &str) -> CachedRobots {
        let url = format!("{}://{}/robots.txt", self.scheme, host);
        tracing::debug!("Fetching robots.txt: {}", url);

        match self.transport.get(&url, self.timeout, Accept::Any).await {
            Ok(response) if response.status == 200 => {
                let content = String::from_utf8_lossy(&response.body);
                let rules = RobotsRuleSet::parse(&content);
                if rules.is_empty() {
                    tracing::info!("Loaded robots.txt for {} (no rules)", host);
                } else {
                    tracing::info!("Loaded robots.txt for {}", host);
                }
                CachedRobots::new(rules, RobotsSource::Fetched)
            }
            Ok(response) => {
                tracing::info!(
                    "No robots.txt for {} (HTTP {}), allowing all",
                    host,
                    response.status
                );
                CachedRobots::allow_all(RobotsSource::Missing {
                    status: response.status,
                })
            }
            Err(e) => {
                tracing::warn!("Failed to fetch robots.txt for {}: {}; allowing all", host, e);
                CachedRobots::allow_all(RobotsSource::Unreachable(e.to_string()))
            }
        }
    }
}
