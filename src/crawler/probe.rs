//! Link health probing
//!
//! Each link found on a page gets a HEAD request with a short timeout.
//! Failures never abort the analysis; they become broken-link entries.

use crate::config::Config;
use crate::crawler::renderer::build_http_client;
use futures::future;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Why a single existence check produced no response
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("could not connect to {url}: {source}")]
    Connect { url: String, source: reqwest::Error },

    #[error("request to {url} failed: {source}")]
    Request { url: String, source: reqwest::Error },
}

impl ProbeError {
    fn from_reqwest(url: &Url, source: reqwest::Error) -> Self {
        let url = url.to_string();
        if source.is_timeout() {
            Self::Timeout { url }
        } else if source.is_connect() {
            Self::Connect { url, source }
        } else {
            Self::Request { url, source }
        }
    }
}

/// Result of checking one link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The server answered with a status below 400
    Alive { status_code: u16 },
    /// Error status, or no response at all (`status_code == 0`)
    Broken { status_code: u16 },
    /// Not an http(s) link; never checked
    Skipped,
    /// The crawl was canceled while the check was in flight
    Interrupted,
}

impl ProbeOutcome {
    pub fn is_broken(&self) -> bool {
        matches!(self, Self::Broken { .. })
    }
}

/// Issues existence checks over a shared HTTP client
#[derive(Debug, Clone)]
pub struct LinkProber {
    client: Client,
    max_concurrent: usize,
}

impl LinkProber {
    pub fn new(client: Client, max_concurrent: usize) -> Self {
        Self {
            client,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Builds a prober with its own client using the configured probe timeout
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let client = build_http_client(
            &config.user_agent,
            Duration::from_secs(config.crawler.probe_timeout_secs),
        )?;
        Ok(Self::new(client, config.crawler.max_concurrent_probes as usize))
    }

    /// Checks a single link
    pub async fn probe(&self, link: &Url, cancel: &CancellationToken) -> ProbeOutcome {
        if link.scheme() != "http" && link.scheme() != "https" {
            return ProbeOutcome::Skipped;
        }
        if cancel.is_cancelled() {
            return ProbeOutcome::Interrupted;
        }

        tokio::select! {
            _ = cancel.cancelled() => ProbeOutcome::Interrupted,
            checked = self.head(link) => match checked {
                Ok(status_code) if status_code >= 400 => ProbeOutcome::Broken { status_code },
                Ok(status_code) => ProbeOutcome::Alive { status_code },
                Err(e) => {
                    tracing::debug!("{}", e);
                    ProbeOutcome::Broken { status_code: 0 }
                }
            },
        }
    }

    /// Checks links concurrently, returning outcomes in input order
    ///
    /// No new checks start once `cancel` fires, so the returned vector may be
    /// shorter than `links`.
    pub async fn probe_all(
        &self,
        links: Vec<Url>,
        cancel: &CancellationToken,
    ) -> Vec<(Url, ProbeOutcome)> {
        stream::iter(links)
            .take_while(|_| future::ready(!cancel.is_cancelled()))
            .map(|link| async move {
                let outcome = self.probe(&link, cancel).await;
                (link, outcome)
            })
            .buffered(self.max_concurrent)
            .collect()
            .await
    }

    async fn head(&self, link: &Url) -> Result<u16, ProbeError> {
        let response = self
            .client
            .head(link.as_str())
            .send()
            .await
            .map_err(|e| ProbeError::from_reqwest(link, e))?;

        let status_code = response.status().as_u16();
        // Drain the body so the connection goes back to the pool
        let _ = response.bytes().await;

        Ok(status_code)
    }
}
