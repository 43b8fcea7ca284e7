//! Page rendering
//!
//! This module turns a page URL into the three things the analysis needs:
//! - the rendered document markup
//! - a doctype declaration rebuilt from the DOM's doctype node
//! - the document title
//!
//! The `Renderer` trait is the seam; `HttpRenderer` fetches the page with
//! reqwest and builds the DOM with scraper. It does not execute scripts.

use crate::config::UserAgentConfig;
use crate::{CrawlError, CrawlOutcome};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Output of a successful render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    /// Serialized root element of the rendered document
    pub markup: String,
    /// `<!DOCTYPE ...>` rebuilt from the DOM, empty when the page has none
    pub doctype: String,
    /// Document title with whitespace collapsed
    pub title: String,
}

/// Rendering collaborator consumed by the crawl pipeline
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Renders `url`, giving up with a render error once `cancel` fires
    async fn render(&self, url: &str, cancel: &CancellationToken) -> CrawlOutcome<RenderedPage>;
}

/// Builds an HTTP client for page and link requests
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Whole-request timeout applied to every request
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Renderer that fetches the page over HTTP and parses it in-process
#[derive(Debug, Clone)]
pub struct HttpRenderer {
    client: Client,
}

impl HttpRenderer {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a renderer with its own client
    pub fn from_config(
        config: &UserAgentConfig,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(config, timeout)?))
    }

    async fn fetch(&self, url: &str) -> CrawlOutcome<String> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                CrawlError::render(url, "navigation timeout")
            } else if e.is_connect() {
                CrawlError::render(url, format!("connection failed: {}", e))
            } else {
                CrawlError::render(url, e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("{} answered {}, rendering the error page", url, status);
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();

        if !content_type.is_empty() && !content_type.contains("html") {
            return Err(CrawlError::render(
                url,
                format!("expected HTML, got {}", content_type),
            ));
        }

        response
            .text()
            .await
            .map_err(|e| CrawlError::render(url, format!("failed to read body: {}", e)))
    }
}

#[async_trait]
impl Renderer for HttpRenderer {
    async fn render(&self, url: &str, cancel: &CancellationToken) -> CrawlOutcome<RenderedPage> {
        if cancel.is_cancelled() {
            return Err(CrawlError::render(url, "canceled before rendering"));
        }

        let body = tokio::select! {
            _ = cancel.cancelled() => {
                return Err(CrawlError::render(url, "canceled during rendering"));
            }
            fetched = self.fetch(url) => fetched?,
        };

        Ok(snapshot_document(&body))
    }
}

/// Builds the DOM for `source` and captures markup, doctype and title
pub fn snapshot_document(source: &str) -> RenderedPage {
    let document = Html::parse_document(source);

    RenderedPage {
        markup: document.root_element().html(),
        doctype: doctype_declaration(&document),
        title: document_title(&document),
    }
}

/// Rebuilds `<!DOCTYPE name PUBLIC "public-id" "system-id">` from the doctype node
fn doctype_declaration(document: &Html) -> String {
    let Some((name, public_id, system_id)) =
        document.tree.root().children().find_map(|node| {
            node.value().as_doctype().map(|doctype| {
                (
                    doctype.name().to_string(),
                    doctype.public_id().to_string(),
                    doctype.system_id().to_string(),
                )
            })
        })
    else {
        return String::new();
    };

    let mut declaration = format!("<!DOCTYPE {}", name);
    if !public_id.is_empty() {
        declaration.push_str(&format!(" PUBLIC \"{}\"", public_id));
    }
    if !system_id.is_empty() {
        declaration.push_str(&format!(" \"{}\"", system_id));
    }
    declaration.push('>');
    declaration
}

fn document_title(document: &Html) -> String {
    let Ok(selector) = Selector::parse("title") else {
        return String::new();
    };

    document
        .select(&selector)
        .next()
        .map(|element| {
            element
                .text()
                .collect::<String>()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html5_doctype() {
        let page = snapshot_document("<!DOCTYPE html><html><head></head><body></body></html>");
        assert_eq!(page.doctype, "<!DOCTYPE html>");
    }

    #[test]
    fn test_legacy_doctype_with_ids() {
        let source = r#"<!DOCTYPE html PUBLIC "-//W3C//DTD HTML 4.01//EN" "http://www.w3.org/TR/html4/strict.dtd"><html><body></body></html>"#;
        let page = snapshot_document(source);
        assert_eq!(
            page.doctype,
            r#"<!DOCTYPE html PUBLIC "-//W3C//DTD HTML 4.01//EN" "http://www.w3.org/TR/html4/strict.dtd">"#
        );
    }

    #[test]
    fn test_missing_doctype() {
        let page = snapshot_document("<html><body><p>hi</p></body></html>");
        assert_eq!(page.doctype, "");
    }

    #[test]
    fn test_title_whitespace_collapsed() {
        let page = snapshot_document("<html><head><title>\n  My   Page \n</title></head></html>");
        assert_eq!(page.title, "My Page");
    }

    #[test]
    fn test_missing_title() {
        let page = snapshot_document("<html><head></head><body></body></html>");
        assert_eq!(page.title, "");
    }

    #[test]
    fn test_markup_is_root_element() {
        let page = snapshot_document("<!DOCTYPE html><p>fragment</p>");
        assert!(page.markup.starts_with("<html>"));
        assert!(page.markup.contains("<p>fragment</p>"));
        assert!(!page.markup.contains("DOCTYPE"));
    }

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(5));
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_canceled_token_fails_render() {
        let renderer = HttpRenderer::from_config(&UserAgentConfig::default(), Duration::from_secs(5))
            .unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = renderer
            .render("https://example.com/", &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, CrawlError::Render { .. }));
    }
}
