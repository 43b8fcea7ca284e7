//! PageScope main entry point
//!
//! This is the command-line interface for the PageScope page analyzer.

use anyhow::Context;
use clap::Parser;
use pagescope::config::{load_config_with_hash, Config};
use pagescope::output::{format_results, load_statistics, print_statistics, results_to_json};
use pagescope::storage::{open_storage, CrawlStore};
use pagescope::url::validate_submission;
use pagescope::{JobState, QueueManager, StatusView};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// PageScope: a queued web page analyzer
///
/// PageScope analyzes each submitted page one at a time: doctype, heading
/// counts, internal and external links, broken links, and whether the page
/// offers a login form. Every finished attempt is recorded in SQLite.
#[derive(Parser, Debug)]
#[command(name = "pagescope")]
#[command(version)]
#[command(about = "A queued web page analyzer", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Page URLs to analyze, in submission order
    #[arg(value_name = "URL", required_unless_present_any = ["results", "stats"])]
    urls: Vec<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// List recorded crawls, most recent first, and exit
    #[arg(long, conflicts_with_all = ["stats", "urls"])]
    results: bool,

    /// Print --results as JSON
    #[arg(long, requires = "results")]
    json: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with_all = ["results", "urls"])]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.results {
        handle_results(&config, cli.json)
    } else if cli.stats {
        handle_stats(&config)
    } else {
        handle_crawl(&config, &cli.urls).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("pagescope=info,warn"),
            1 => EnvFilter::new("pagescope=debug,info"),
            2 => EnvFilter::new("pagescope=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn open_database(config: &Config) -> anyhow::Result<pagescope::storage::SqliteStorage> {
    let path = Path::new(&config.output.database_path);
    open_storage(path).with_context(|| format!("failed to open database {}", path.display()))
}

/// Handles --results: lists recorded crawls
fn handle_results(config: &Config, json: bool) -> anyhow::Result<()> {
    let storage = open_database(config)?;
    let records = storage.list_crawls()?;

    if json {
        println!("{}", results_to_json(&records)?);
    } else {
        print!("{}", format_results(&records));
    }

    Ok(())
}

/// Handles --stats: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let storage = open_database(config)?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Queues every valid URL and waits for the worker to finish
///
/// The first Ctrl-C drops jobs that have not started and stops the running
/// one; the command then returns once that stop has been recorded.
async fn handle_crawl(config: &Config, urls: &[String]) -> anyhow::Result<()> {
    let storage: Arc<Mutex<dyn CrawlStore>> = Arc::new(Mutex::new(open_database(config)?));
    let queue = QueueManager::from_config(config, storage).context("failed to build HTTP client")?;

    let mut accepted = 0;
    for raw in urls {
        match validate_submission(raw) {
            Ok(url) => {
                if queue.enqueue(&url) {
                    accepted += 1;
                }
            }
            Err(e) => tracing::error!("Skipping {}: {}", raw, e),
        }
    }

    if accepted == 0 {
        anyhow::bail!("no valid URLs to crawl");
    }

    tracing::info!(
        "Crawling {} page(s) with a {}s deadline each",
        accepted,
        config.crawler.crawl_timeout_secs
    );

    let idle = queue.wait_until_idle();
    tokio::pin!(idle);
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    let mut interrupted = false;

    loop {
        tokio::select! {
            _ = &mut idle => break,
            _ = ticker.tick() => log_progress(&queue.status()),
            signal = tokio::signal::ctrl_c(), if !interrupted => {
                signal.context("failed to listen for Ctrl-C")?;
                interrupted = true;

                let dropped = queue.clear_pending();
                if !dropped.is_empty() {
                    tracing::warn!("Dropped {} pending job(s)", dropped.len());
                }
                for url in queue.running_urls() {
                    tracing::warn!("{}: {}", url, queue.stop(&url));
                }
            }
        }
    }

    let status = queue.status();
    print!("{}", status);
    tracing::info!(
        "Crawl finished: {} done, {} error, {} stopped",
        status.count(JobState::Done),
        status.count(JobState::Error),
        status.count(JobState::Stopped)
    );

    Ok(())
}

fn log_progress(status: &StatusView) {
    tracing::info!(
        "Progress: {} queued, {} running, {} finished",
        status.count(JobState::Queued),
        status.count(JobState::Running),
        status.len() - status.count(JobState::Queued) - status.count(JobState::Running)
    );
}
