//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `JobOutcome`: What happened to an individual crawl job
//! - `RunState`: Where the run as a whole is in its lifecycle

mod job_state;

// Re-export main types
pub use job_state::{JobOutcome, RunState};
