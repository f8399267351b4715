//! Shared crawl frontier
//!
//! The frontier owns the FIFO job queue, the dedup record of every URL ever
//! queued or claimed, the count of unfinished jobs, and the page budget.
//! All of it lives behind one mutex so that check-and-insert steps are
//! atomic. The lock is never held across an `.await`.
//!
//! Two RAII guards tie bookkeeping to scope:
//! - [`InFlightJob`] marks its job done when dropped, on every path
//!   including unwinding, so [`Frontier::join`] cannot hang.
//! - [`PageSlot`] holds one unit of the page budget. [`PageSlot::commit`]
//!   turns it into a counted page; dropping it uncommitted gives it back.

use crate::state::RunState;
use std::collections::{HashSet, VecDeque};
use std::ops::Deref;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;

/// A unit of crawl work
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CrawlJob {
    /// Absolute URL to fetch
    pub url: String,

    /// Link distance from the start URL
    pub depth: u32,
}

impl CrawlJob {
    pub fn new(url: impl Into<String>, depth: u32) -> Self {
        Self {
            url: url.into(),
            depth,
        }
    }
}

/// Result of trying to claim a URL for fetching
#[derive(Debug)]
pub enum Claim<'a> {
    /// The URL is now visited and a budget slot is reserved for it
    Granted(PageSlot<'a>),

    /// Another job already claimed this URL
    AlreadyVisited,

    /// `max_pages` pages have already been fetched
    BudgetExhausted,
}

#[derive(Debug)]
struct FrontierInner {
    queue: VecDeque<CrawlJob>,
    enqueued: HashSet<String>,
    visited: HashSet<String>,
    /// Jobs queued or in flight
    pending: usize,
    pages_committed: usize,
    pages_reserved: usize,
    state: RunState,
}

/// Shared frontier for a single crawl run
#[derive(Debug)]
pub struct Frontier {
    inner: Mutex<FrontierInner>,
    max_pages: usize,
    changed: Notify,
}

impl Frontier {
    /// Creates an empty frontier with a page budget of `max_pages`
    pub fn new(max_pages: usize) -> Self {
        Self {
            inner: Mutex::new(FrontierInner {
                queue: VecDeque::new(),
                enqueued: HashSet::new(),
                visited: HashSet::new(),
                pending: 0,
                pages_committed: 0,
                pages_reserved: 0,
                state: RunState::Idle,
            }),
            max_pages,
            changed: Notify::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FrontierInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queues the start URL at depth 0
    pub fn seed(&self, url: impl Into<String>) -> bool {
        self.push(CrawlJob::new(url, 0))
    }

    /// Queues a job unless its URL was seen before or the budget is spent
    ///
    /// Returns true if the job was queued.
    pub fn push(&self, job: CrawlJob) -> bool {
        {
            let mut inner = self.lock();
            if inner.pages_committed >= self.max_pages
                || inner.enqueued.contains(&job.url)
                || inner.visited.contains(&job.url)
            {
                return false;
            }
            inner.enqueued.insert(job.url.clone());
            inner.queue.push_back(job);
            inner.pending += 1;
            if inner.state == RunState::Idle {
                inner.state = RunState::Seeded;
            }
        }
        self.changed.notify_waiters();
        true
    }

    /// Waits for the next job
    ///
    /// Returns `None` once the queue is empty and no job is in flight, which
    /// means no more work can appear.
    pub async fn next(&self) -> Option<InFlightJob<'_>> {
        loop {
            let notified = self.changed.notified();
            tokio::pin!(notified);
            // Register before checking so a wakeup between the check and the
            // await is not lost
            notified.as_mut().enable();

            {
                let mut inner = self.lock();
                if let Some(job) = inner.queue.pop_front() {
                    if inner.state == RunState::Seeded {
                        inner.state = RunState::Draining;
                    }
                    return Some(InFlightJob {
                        frontier: self,
                        job,
                    });
                }
                if inner.pending == 0 {
                    return None;
                }
            }

            notified.await;
        }
    }

    /// Atomically marks `url` visited and reserves a page budget slot
    ///
    /// When every remaining slot is reserved by in-flight fetches, this waits
    /// until one of them commits or is released.
    pub async fn claim(&self, url: &str) -> Claim<'_> {
        loop {
            let notified = self.changed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut inner = self.lock();
                if inner.visited.contains(url) {
                    return Claim::AlreadyVisited;
                }
                if inner.pages_committed >= self.max_pages {
                    return Claim::BudgetExhausted;
                }
                if inner.pages_committed + inner.pages_reserved < self.max_pages {
                    inner.visited.insert(url.to_string());
                    inner.pages_reserved += 1;
                    return Claim::Granted(PageSlot {
                        frontier: self,
                        committed: false,
                    });
                }
            }

            notified.await;
        }
    }

    /// Marks one job finished
    fn task_done(&self) {
        {
            let mut inner = self.lock();
            inner.pending = inner.pending.saturating_sub(1);
            if inner.pending == 0 && inner.queue.is_empty() {
                inner.state = RunState::Drained;
            }
        }
        self.changed.notify_waiters();
    }

    fn release_slot(&self, committed: bool) {
        {
            let mut inner = self.lock();
            inner.pages_reserved = inner.pages_reserved.saturating_sub(1);
            if committed {
                inner.pages_committed += 1;
            }
        }
        self.changed.notify_waiters();
    }

    /// Waits until every queued job, including ones queued meanwhile, is done
    pub async fn join(&self) {
        loop {
            let notified = self.changed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.lock().pending == 0 {
                return;
            }

            notified.await;
        }
    }

    /// Returns true if `url` has been claimed
    pub fn is_visited(&self, url: &str) -> bool {
        self.lock().visited.contains(url)
    }

    /// Returns true if `url` has been queued or claimed
    pub fn is_known(&self, url: &str) -> bool {
        let inner = self.lock();
        inner.enqueued.contains(url) || inner.visited.contains(url)
    }

    /// Jobs queued or in flight
    pub fn pending(&self) -> usize {
        self.lock().pending
    }

    /// Jobs waiting in the queue
    pub fn queued(&self) -> usize {
        self.lock().queue.len()
    }

    /// Pages committed against the budget
    pub fn pages_committed(&self) -> usize {
        self.lock().pages_committed
    }

    pub fn max_pages(&self) -> usize {
        self.max_pages
    }

    pub fn run_state(&self) -> RunState {
        self.lock().state
    }
}

/// A dequeued job; marks itself done when dropped
#[derive(Debug)]
pub struct InFlightJob<'a> {
    frontier: &'a Frontier,
    job: CrawlJob,
}

impl InFlightJob<'_> {
    pub fn job(&self) -> &CrawlJob {
        &self.job
    }
}

impl Deref for InFlightJob<'_> {
    type Target = CrawlJob;

    fn deref(&self) -> &CrawlJob {
        &self.job
    }
}

impl Drop for InFlightJob<'_> {
    fn drop(&mut self) {
        self.frontier.task_done();
    }
}

/// One reserved unit of the page budget
#[derive(Debug)]
pub struct PageSlot<'a> {
    frontier: &'a Frontier,
    committed: bool,
}

impl PageSlot<'_> {
    /// Counts the reserved page as fetched
    pub fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for PageSlot<'_> {
    fn drop(&mut self) {
        self.frontier.release_slot(self.committed);
    }
}
