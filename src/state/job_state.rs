/// Job and run state definitions for tracking crawl progress
///
/// A crawl job moves `queued -> in-flight -> outcome`. The run as a whole
/// moves `Idle -> Seeded -> Draining -> Drained`.
use std::fmt;

/// Lifecycle of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunState {
    /// Nothing has been queued yet
    Idle,

    /// The start URL is queued and no worker has picked it up
    Seeded,

    /// Workers are processing jobs
    Draining,

    /// Every queued job has been processed
    Drained,
}

impl RunState {
    /// Returns true once the frontier can produce no more work
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Drained)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Seeded => "seeded",
            Self::Draining => "draining",
            Self::Drained => "drained",
        };
        write!(f, "{}", s)
    }
}

/// What happened to a single crawl job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobOutcome {
    // ===== Counted pages =====
    /// Page fetched; `children` new jobs were queued
    Expanded { children: usize },

    /// Page fetched at the depth limit, or with nothing new to follow
    Leaf,

    // ===== Skips =====
    /// Another worker already claimed this URL
    SkippedVisited,

    /// The page budget was spent before this job ran
    SkippedBudget,

    /// robots.txt denies the URL
    RobotsDenied,

    /// Non-HTML or oversized response
    PolicySkip,

    // ===== Errors =====
    /// HTTP error, timeout or network failure; recorded as a broken page
    Broken,
}

impl JobOutcome {
    /// Returns true if the page counted towards `total_pages`
    pub fn is_page(&self) -> bool {
        matches!(self, Self::Expanded { .. } | Self::Leaf)
    }

    /// Returns true if the job was skipped without a counted fetch
    pub fn is_skipped(&self) -> bool {
        matches!(
            self,
            Self::SkippedVisited | Self::SkippedBudget | Self::RobotsDenied | Self::PolicySkip
        )
    }

    /// Returns true if this outcome is recorded as a broken page
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Broken)
    }

    /// Number of jobs queued as a result
    pub fn children(&self) -> usize {
        match self {
            Self::Expanded { children } => *children,
            _ => 0,
        }
    }
}

impl fmt::Display for JobOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expanded { children } => write!(f, "expanded ({} queued)", children),
            Self::Leaf => write!(f, "leaf"),
            Self::SkippedVisited => write!(f, "skipped (visited)"),
            Self::SkippedBudget => write!(f, "skipped (page budget)"),
            Self::RobotsDenied => write!(f, "denied by robots.txt"),
            Self::PolicySkip => write!(f, "skipped (content policy)"),
            Self::Broken => write!(f, "broken"),
        }
    }
}
