//! Crawl job queue
//!
//! This module owns the lifecycle of crawl jobs:
//! - FIFO admission with de-duplication of live jobs
//! - a single lazily started worker that runs one analysis at a time
//! - per-job cancellation handles with a hard deadline
//! - recording terminal outcomes through a `CrawlStore`

mod manager;

pub use manager::{deadline_token, QueueManager, QueueOptions};

use crate::state::JobState;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Result of asking the queue to stop a job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// No running job for that URL; nothing changed
    NotRunning,
    /// The running job was canceled and marked with `recorded`
    Stopped { recorded: JobState },
}

impl fmt::Display for StopOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopOutcome::NotRunning => write!(f, "not running or already completed"),
            StopOutcome::Stopped { recorded } => {
                write!(f, "running task stopped and marked {}", recorded)
            }
        }
    }
}

/// Point-in-time snapshot of every known job
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StatusView {
    jobs: BTreeMap<String, JobState>,
}

impl StatusView {
    pub(crate) fn new(jobs: BTreeMap<String, JobState>) -> Self {
        Self { jobs }
    }

    /// State of one job, if the queue has ever seen it
    pub fn get(&self, url: &str) -> Option<JobState> {
        self.jobs.get(url).copied()
    }

    /// Number of jobs currently in `state`
    pub fn count(&self, state: JobState) -> usize {
        self.jobs.values().filter(|s| **s == state).count()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Iterates jobs in URL order
    pub fn iter(&self) -> impl Iterator<Item = (&str, JobState)> {
        self.jobs.iter().map(|(url, state)| (url.as_str(), *state))
    }
}

impl fmt::Display for StatusView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (url, state) in &self.jobs {
            writeln!(f, "{:<8} {}", state, url)?;
        }
        Ok(())
    }
}
