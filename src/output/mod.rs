//! Output module for reporting recorded crawls
//!
//! This module handles:
//! - Listing recorded crawl results as text or JSON
//! - Summarizing crawl statistics

mod results;
pub mod stats;

pub use results::{format_results, results_to_json};
pub use stats::{format_statistics, load_statistics, print_statistics, CrawlStatistics};
