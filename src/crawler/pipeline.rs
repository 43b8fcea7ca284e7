//! Page analysis pipeline
//!
//! `CrawlPipeline` renders a page, inspects its DOM and probes its links,
//! producing one `CrawlResult`. Render and parse failures abort the whole
//! analysis; link failures and cancellation during the link scan only
//! shrink the result.

use crate::config::{CancelPolicy, Config};
use crate::crawler::parser::{classify_doctype, inspect_markup};
use crate::crawler::probe::{LinkProber, ProbeOutcome};
use crate::crawler::renderer::{HttpRenderer, Renderer};
use crate::crawler::types::{BrokenLink, CrawlResult};
use crate::url::{classify_link, extract_host, resolve_href, LinkClass};
use crate::{CrawlError, CrawlOutcome};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Anything that can turn a URL into a `CrawlResult`
///
/// The queue manager only depends on this trait, so tests can substitute
/// their own analyzers.
#[async_trait]
pub trait PageAnalyzer: Send + Sync {
    async fn analyze(&self, url: &str, cancel: &CancellationToken) -> CrawlOutcome<CrawlResult>;
}

/// Link counts and failures gathered from one page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkScan {
    pub internal: usize,
    pub external: usize,
    pub broken: Vec<BrokenLink>,
}

/// The standard analyzer: render, inspect, probe
pub struct CrawlPipeline {
    renderer: Arc<dyn Renderer>,
    prober: LinkProber,
    cancel_policy: CancelPolicy,
}

impl CrawlPipeline {
    pub fn new(renderer: Arc<dyn Renderer>, prober: LinkProber, cancel_policy: CancelPolicy) -> Self {
        Self {
            renderer,
            prober,
            cancel_policy,
        }
    }

    /// Builds a pipeline backed by `HttpRenderer`
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let renderer = HttpRenderer::from_config(
            &config.user_agent,
            Duration::from_secs(config.crawler.render_timeout_secs),
        )?;
        let prober = LinkProber::from_config(config)?;
        Ok(Self::new(
            Arc::new(renderer),
            prober,
            config.queue.cancel_policy,
        ))
    }

    /// Resolves, classifies and probes every href
    ///
    /// Unresolvable hrefs are skipped. Once `cancel` fires the scan stops and
    /// the counts cover only the links processed so far.
    pub async fn scan_links(
        &self,
        base: &Url,
        hrefs: &[String],
        cancel: &CancellationToken,
    ) -> LinkScan {
        let base_host = extract_host(base);
        let links: Vec<Url> = hrefs
            .iter()
            .filter_map(|href| resolve_href(base, href))
            .collect();

        let mut scan = LinkScan::default();
        for (link, outcome) in self.prober.probe_all(links, cancel).await {
            match classify_link(&link, &base_host) {
                LinkClass::Internal => scan.internal += 1,
                LinkClass::External => scan.external += 1,
            }
            if let ProbeOutcome::Broken { status_code } = outcome {
                scan.broken.push(BrokenLink {
                    url: link.to_string(),
                    status_code,
                });
            }
        }

        scan
    }
}

#[async_trait]
impl PageAnalyzer for CrawlPipeline {
    async fn analyze(&self, url: &str, cancel: &CancellationToken) -> CrawlOutcome<CrawlResult> {
        let page = self.renderer.render(url, cancel).await?;
        tracing::debug!("Rendered {} ({} bytes)", url, page.markup.len());

        let html_version = classify_doctype(&page.doctype);
        let base = Url::parse(url)
            .map_err(|e| CrawlError::parse(url, format!("invalid page URL: {}", e)))?;

        let facts = inspect_markup(url, &page.markup, cancel)?;
        let links = self.scan_links(&base, &facts.hrefs, cancel).await;

        if cancel.is_cancelled() {
            match self.cancel_policy {
                CancelPolicy::Discard => return Err(CrawlError::canceled(url)),
                CancelPolicy::KeepPartial => {
                    tracing::warn!("Analysis of {} was cut short, keeping partial result", url)
                }
            }
        }

        Ok(CrawlResult {
            url: url.to_string(),
            html_version,
            title: page.title,
            headings: facts.headings,
            internal_links: links.internal,
            external_links: links.external,
            broken_links: links.broken,
            has_login_form: facts.has_login_form,
        })
    }
}
