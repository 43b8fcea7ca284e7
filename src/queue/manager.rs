//! Queue manager and its worker
//!
//! All queue bookkeeping lives in one `QueueState` behind one mutex. The
//! lock is never held across an `.await`; the analysis itself and the
//! database write both run with the lock released.

use crate::config::{Config, StopPolicy};
use crate::crawler::{CrawlPipeline, CrawlResult, PageAnalyzer};
use crate::queue::{StatusView, StopOutcome};
use crate::state::JobState;
use crate::storage::{CrawlStore, NewCrawl, StorageError};
use crate::CrawlOutcome;
use futures::FutureExt;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

/// Error message persisted for jobs ended by `stop`
const STOPPED_BY_USER: &str = "crawl stopped by user";

/// Tunables for a `QueueManager`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueOptions {
    /// Hard deadline for a single analysis
    pub crawl_timeout: Duration,
    /// State recorded when a running job is stopped
    pub stop_policy: StopPolicy,
}

impl QueueOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            crawl_timeout: Duration::from_secs(config.crawler.crawl_timeout_secs),
            stop_policy: config.queue.stop_policy,
        }
    }
}

impl Default for QueueOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Creates a cancellation token that fires on its own after `timeout`
///
/// The timer task exits early once the token is canceled by anyone else.
/// Must be called from within a Tokio runtime.
pub fn deadline_token(timeout: Duration) -> CancellationToken {
    let token = CancellationToken::new();
    let timer = token.clone();

    tokio::spawn(async move {
        tokio::select! {
            _ = tokio::time::sleep(timeout) => timer.cancel(),
            _ = timer.cancelled() => {}
        }
    });

    token
}

#[derive(Default)]
struct QueueState {
    pending: VecDeque<String>,
    jobs: HashMap<String, JobState>,
    cancels: HashMap<String, CancellationToken>,
    worker_active: bool,
}

struct Inner {
    state: Mutex<QueueState>,
    analyzer: Arc<dyn PageAnalyzer>,
    store: Arc<Mutex<dyn CrawlStore>>,
    options: QueueOptions,
    idle: Notify,
}

impl Inner {
    fn lock_state(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// FIFO crawl queue with a single background worker
///
/// Cloning yields another handle to the same queue.
#[derive(Clone)]
pub struct QueueManager {
    inner: Arc<Inner>,
}

impl QueueManager {
    /// Creates an idle queue
    ///
    /// # Arguments
    ///
    /// * `analyzer` - Runs one page analysis per job
    /// * `store` - Receives one record per finished job
    /// * `options` - Deadline and stop policy
    pub fn new(
        analyzer: Arc<dyn PageAnalyzer>,
        store: Arc<Mutex<dyn CrawlStore>>,
        options: QueueOptions,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(QueueState::default()),
                analyzer,
                store,
                options,
                idle: Notify::new(),
            }),
        }
    }

    /// Creates a queue backed by the standard `CrawlPipeline`
    pub fn from_config(
        config: &Config,
        store: Arc<Mutex<dyn CrawlStore>>,
    ) -> Result<Self, reqwest::Error> {
        let pipeline = CrawlPipeline::from_config(config)?;
        Ok(Self::new(
            Arc::new(pipeline),
            store,
            QueueOptions::from_config(config),
        ))
    }

    /// Submits a URL for analysis
    ///
    /// Does nothing while the URL is already queued or running. Starts the
    /// worker if it is not active. Must be called from within a Tokio runtime.
    ///
    /// # Returns
    ///
    /// `true` if a new job was queued
    pub fn enqueue(&self, url: &str) -> bool {
        let spawn_worker = {
            let mut state = self.inner.lock_state();

            if state.jobs.get(url).is_some_and(JobState::is_live) {
                tracing::debug!("{} is already queued or running", url);
                return false;
            }

            state.jobs.insert(url.to_string(), JobState::Queued);
            state.pending.push_back(url.to_string());

            let spawn = !state.worker_active;
            state.worker_active = true;
            spawn
        };

        tracing::info!("Queued {}", url);

        if spawn_worker {
            tracing::debug!("Starting queue worker");
            tokio::spawn(run_worker(Arc::clone(&self.inner)));
        }

        true
    }

    /// Stops the running job for `url`
    ///
    /// Queued jobs have no cancellation handle yet and are left alone.
    pub fn stop(&self, url: &str) -> StopOutcome {
        let mut state = self.inner.lock_state();

        let Some(token) = state.cancels.remove(url) else {
            return StopOutcome::NotRunning;
        };

        token.cancel();
        let recorded = self.inner.options.stop_policy.terminal_state();
        state.jobs.insert(url.to_string(), recorded);
        drop(state);

        tracing::warn!("Stopped {} (marked {})", url, recorded);
        StopOutcome::Stopped { recorded }
    }

    /// Drops every job that has not started yet
    ///
    /// Dropped jobs take the stop-policy state; nothing is persisted for
    /// them since no analysis was attempted.
    pub fn clear_pending(&self) -> Vec<String> {
        let mut state = self.inner.lock_state();
        let recorded = self.inner.options.stop_policy.terminal_state();
        let dropped: Vec<String> = state.pending.drain(..).collect();
        for url in &dropped {
            state.jobs.insert(url.clone(), recorded);
        }
        dropped
    }

    /// Snapshot of every job the queue has seen
    pub fn status(&self) -> StatusView {
        let state = self.inner.lock_state();
        let jobs: BTreeMap<String, JobState> = state
            .jobs
            .iter()
            .map(|(url, job)| (url.clone(), *job))
            .collect();
        StatusView::new(jobs)
    }

    /// URLs whose analysis is in progress
    pub fn running_urls(&self) -> Vec<String> {
        let state = self.inner.lock_state();
        let mut urls: Vec<String> = state
            .jobs
            .iter()
            .filter(|(_, job)| **job == JobState::Running)
            .map(|(url, _)| url.clone())
            .collect();
        urls.sort();
        urls
    }

    /// Returns true when no worker is active
    pub fn is_idle(&self) -> bool {
        !self.inner.lock_state().worker_active
    }

    /// Waits until the worker has drained the queue and recorded every job
    pub async fn wait_until_idle(&self) {
        loop {
            let notified = self.inner.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.is_idle() {
                return;
            }

            notified.await;
        }
    }

    #[cfg(test)]
    fn cancel_handle_urls(&self) -> Vec<String> {
        let state = self.inner.lock_state();
        let mut urls: Vec<String> = state.cancels.keys().cloned().collect();
        urls.sort();
        urls
    }
}

/// Processes queued jobs one at a time until the queue is empty
async fn run_worker(inner: Arc<Inner>) {
    loop {
        let (url, token) = {
            let mut state = inner.lock_state();

            let Some(url) = state.pending.pop_front() else {
                state.worker_active = false;
                drop(state);
                tracing::debug!("Queue drained, worker exiting");
                inner.idle.notify_waiters();
                return;
            };

            let token = deadline_token(inner.options.crawl_timeout);
            state.jobs.insert(url.clone(), JobState::Running);
            state.cancels.insert(url.clone(), token.clone());
            (url, token)
        };

        tracing::info!("Crawling {}", url);
        let outcome = analyze_guarded(&inner, &url, &token).await;
        let expired = token.is_cancelled();
        token.cancel();

        let record = {
            let mut state = inner.lock_state();
            // Only this worker registers handles, so a missing one means `stop` took it
            let stopped_by_user = state.cancels.remove(&url).is_none();

            if stopped_by_user {
                NewCrawl::failed(
                    &url,
                    inner.options.stop_policy.terminal_state(),
                    STOPPED_BY_USER,
                )
            } else {
                match outcome {
                    Ok(result) => {
                        state.jobs.insert(url.clone(), JobState::Done);
                        NewCrawl::done(result)
                    }
                    Err(message) => {
                        state.jobs.insert(url.clone(), JobState::Error);
                        NewCrawl::failed(&url, JobState::Error, message)
                    }
                }
            }
        };

        match record.status {
            JobState::Done if expired => {
                tracing::warn!("Crawl of {} hit its deadline, recorded partial result", url)
            }
            JobState::Done => tracing::info!("Finished {}", url),
            status => tracing::warn!(
                "Crawl of {} ended as {}: {}",
                url,
                status,
                record.error_message.as_deref().unwrap_or_default()
            ),
        }

        persist(Arc::clone(&inner.store), record).await;
    }
}

/// Runs the analyzer, turning a panic into an error message
async fn analyze_guarded(
    inner: &Inner,
    url: &str,
    token: &CancellationToken,
) -> Result<CrawlResult, String> {
    let analysis = AssertUnwindSafe(inner.analyzer.analyze(url, token)).catch_unwind();
    let outcome: Result<CrawlOutcome<CrawlResult>, _> = analysis.await;

    match outcome {
        Ok(Ok(result)) => Ok(result),
        Ok(Err(e)) => Err(e.to_string()),
        Err(_) => {
            tracing::error!("Analyzer panicked while crawling {}", url);
            Err(format!("analysis panicked for {}", url))
        }
    }
}

/// Writes a terminal record on a blocking thread
///
/// Failures are logged; the in-memory job state is already final.
async fn persist(store: Arc<Mutex<dyn CrawlStore>>, crawl: NewCrawl) {
    let url = crawl.url.clone();

    let written = tokio::task::spawn_blocking(move || {
        let mut store = store
            .lock()
            .map_err(|e| StorageError::Database(format!("Failed to lock storage: {}", e)))?;
        store.insert_crawl(&crawl)
    })
    .await;

    match written {
        Ok(Ok(id)) => tracing::debug!("Recorded crawl of {} as row {}", url, id),
        Ok(Err(e)) => tracing::error!("Failed to record crawl of {}: {}", url, e),
        Err(e) => tracing::error!("Storage task for {} failed: {}", url, e),
    }
}
