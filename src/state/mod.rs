//! State module for tracking crawl job progress
//!
//! # Components
//!
//! - `JobState`: lifecycle of a single crawl job (queued, running, done, error, stopped)

mod job_state;

// Re-export main types
pub use job_state::JobState;
