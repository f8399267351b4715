//! Run-scoped robots.txt cache
//!
//! Each host gets one `OnceCell`. The first caller for a host runs the fetch;
//! concurrent callers for the same host wait on that cell instead of issuing
//! their own request. Entries are never refreshed within a run.

use crate::robots::RobotsRuleSet;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::OnceCell;

/// Where a cached rule set came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RobotsSource {
    /// robots.txt was fetched and parsed
    Fetched,
    /// The server answered with a non-200 status
    Missing { status: u16 },
    /// The request failed before a status was received
    Unreachable(String),
}

/// Cached robots.txt data for a host
#[derive(Debug, Clone)]
pub struct CachedRobots {
    /// The parsed rules
    pub rules: Arc<RobotsRuleSet>,

    /// How the rules were obtained
    pub source: RobotsSource,

    /// When the robots.txt was fetched
    pub fetched_at: DateTime<Utc>,
}

impl CachedRobots {
    /// Creates a new CachedRobots instance stamped with the current time
    pub fn new(rules: RobotsRuleSet, source: RobotsSource) -> Self {
        Self {
            rules: Arc::new(rules),
            source,
            fetched_at: Utc::now(),
        }
    }

    /// Creates a permissive entry, used whenever robots.txt is unavailable
    pub fn allow_all(source: RobotsSource) -> Self {
        Self::new(RobotsRuleSet::allow_all(), source)
    }

    /// Returns the age of the cached robots.txt
    pub fn age(&self) -> Duration {
        Utc::now() - self.fetched_at
    }

    /// Checks if a path is allowed according to the cached rules
    pub fn is_allowed(&self, path: &str, user_agent: &str) -> bool {
        self.rules.is_allowed(path, user_agent)
    }
}

/// Per-host cache of robots.txt rule sets
#[derive(Debug, Default)]
pub struct RobotsCache {
    entries: Mutex<HashMap<String, Arc<OnceCell<CachedRobots>>>>,
}

impl RobotsCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, host: &str) -> Arc<OnceCell<CachedRobots>> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.entry(host.to_string()).or_default().clone()
    }

    /// Returns the entry for `host`, running `fetch` if it is not cached yet
    ///
    /// At most one `fetch` runs per host. Callers that arrive while it is in
    /// flight wait for its result.
    pub async fn get_or_fetch<F, Fut>(&self, host: &str, fetch: F) -> CachedRobots
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = CachedRobots>,
    {
        // The map lock is released before awaiting the cell
        let slot = self.slot(host);
        slot.get_or_init(fetch).await.clone()
    }

    /// Returns the entry for `host` if it has been populated
    pub fn get(&self, host: &str) -> Option<CachedRobots> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.get(host).and_then(|cell| cell.get().cloned())
    }

    /// Number of hosts with a populated entry
    pub fn len(&self) -> usize {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.values().filter(|cell| cell.initialized()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
