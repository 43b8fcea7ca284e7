/// Job state definitions for tracking crawl progress
///
/// This module defines every state a crawl job can be in between submission
/// and its terminal outcome.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents the current state of a crawl job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    // ===== Live States =====
    /// Job is waiting in the queue
    Queued,

    /// Job is being analyzed by the worker
    Running,

    // ===== Terminal States =====
    /// Analysis finished and produced a result
    Done,

    /// Analysis failed, was canceled, or was stopped under the error policy
    Error,

    /// Job was stopped by the user under the stopped policy
    Stopped,
}

impl JobState {
    /// Returns true while the job still occupies its URL's dedup slot
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Queued | Self::Running)
    }

    /// Returns true if this is a terminal state (a new enqueue is needed)
    pub fn is_terminal(&self) -> bool {
        !self.is_live()
    }

    /// Converts the job state to its database / status string
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Done => "done",
            Self::Error => "error",
            Self::Stopped => "stopped",
        }
    }

    /// Parses a job state from its database / status string
    ///
    /// Returns None if the string doesn't match any known state.
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "queued" => Some(Self::Queued),
            "running" => Some(Self::Running),
            "done" => Some(Self::Done),
            "error" => Some(Self::Error),
            "stopped" => Some(Self::Stopped),
            _ => None,
        }
    }

    /// Returns all possible job states
    pub fn all_states() -> [Self; 5] {
        [
            Self::Queued,
            Self::Running,
            Self::Done,
            Self::Error,
            Self::Stopped,
        ]
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}
