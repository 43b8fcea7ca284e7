//! Shared fixtures for the integration tests

use pagescope::config::{CancelPolicy, UserAgentConfig};
use pagescope::crawler::{build_http_client, CrawlPipeline, HttpRenderer, LinkProber};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// An address nothing listens on
pub const UNREACHABLE: &str = "http://127.0.0.1:1/down";

pub fn test_user_agent() -> UserAgentConfig {
    UserAgentConfig {
        crawler_name: "TestBot".to_string(),
        crawler_version: "1.0.0".to_string(),
        contact_url: "https://example.com/contact".to_string(),
        contact_email: "test@example.com".to_string(),
    }
}

/// Pipeline over real HTTP with short timeouts
pub fn http_pipeline(cancel_policy: CancelPolicy) -> CrawlPipeline {
    let client = build_http_client(&test_user_agent(), Duration::from_secs(5))
        .expect("Failed to build client");
    CrawlPipeline::new(
        Arc::new(HttpRenderer::new(client.clone())),
        LinkProber::new(client, 4),
        cancel_policy,
    )
}

/// Serves `body` as HTML at `route`
pub async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html"))
        .mount(server)
        .await;
}

/// Answers HEAD requests for `route` with `status`
pub async fn mount_head(server: &MockServer, route: &str, status: u16) {
    Mock::given(method("HEAD"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// A page linking to a live page, a missing page, an unreachable host,
/// an external site and a mailto address
///
/// `external` must be reachable under a different host name than the page.
pub async fn mount_link_page(server: &MockServer, external: &MockServer) {
    let external_url = format!(
        "http://localhost:{}/about",
        external.address().port()
    );

    let body = format!(
        r#"<!DOCTYPE html>
<html>
<head><title>  Link
   Page </title></head>
<body>
  <h1>Links</h1>
  <h2>Inside</h2>
  <h2>Outside</h2>
  <a href="/ok">fine</a>
  <a href="/missing">gone</a>
  <a href="{unreachable}">down</a>
  <a href="{external_url}">partner</a>
  <a href="mailto:team@example.com">mail us</a>
</body>
</html>"#,
        unreachable = UNREACHABLE,
        external_url = external_url,
    );

    mount_page(server, "/", body).await;
    mount_head(server, "/ok", 200).await;
    mount_head(server, "/missing", 404).await;
    mount_head(external, "/about", 200).await;
}
