//! Statistics over recorded crawls
//!
//! This module provides functionality for extracting and displaying
//! crawl statistics from the storage layer.

use crate::state::JobState;
use crate::storage::{CrawlStore, StorageResult};
use std::collections::HashMap;

/// Crawl statistics summary
#[derive(Debug, Clone, Default)]
pub struct CrawlStatistics {
    /// Total number of recorded crawl attempts
    pub total_crawls: u64,

    /// Count of attempts by terminal state
    pub crawls_by_status: HashMap<JobState, u64>,

    /// Broken links across all successful attempts
    pub broken_links: u64,
}

impl CrawlStatistics {
    pub fn count(&self, state: JobState) -> u64 {
        self.crawls_by_status.get(&state).copied().unwrap_or(0)
    }

    /// Share of attempts that finished with a result, in percent
    pub fn success_rate(&self) -> f64 {
        if self.total_crawls == 0 {
            return 0.0;
        }
        self.count(JobState::Done) as f64 / self.total_crawls as f64 * 100.0
    }
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
pub fn load_statistics(storage: &dyn CrawlStore) -> StorageResult<CrawlStatistics> {
    let crawls_by_status = storage.count_by_status()?;
    let total_crawls = crawls_by_status.values().sum();
    let broken_links = storage.count_broken_links()?;

    Ok(CrawlStatistics {
        total_crawls,
        crawls_by_status,
        broken_links,
    })
}

/// Formats statistics as a plain-text report
pub fn format_statistics(stats: &CrawlStatistics) -> String {
    let mut out = String::new();

    out.push_str("=== Crawl Statistics ===\n\n");
    out.push_str(&format!("Total crawls recorded: {}\n\n", stats.total_crawls));

    out.push_str("Crawls by Status:\n");
    for state in JobState::all_states() {
        let count = stats.count(state);
        if count == 0 {
            continue;
        }
        let percentage = count as f64 / stats.total_crawls as f64 * 100.0;
        out.push_str(&format!("  {}: {} ({:.1}%)\n", state, count, percentage));
    }
    out.push('\n');

    out.push_str(&format!("Broken links found: {}\n", stats.broken_links));
    out.push_str(&format!(
        "Success Rate: {:.1}% ({} / {} crawls finished)\n",
        stats.success_rate(),
        stats.count(JobState::Done),
        stats.total_crawls
    ));

    out
}

/// Prints statistics to stdout
pub fn print_statistics(stats: &CrawlStatistics) {
    print!("{}", format_statistics(stats));
}
