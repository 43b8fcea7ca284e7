//! End-to-end tests for page analysis over HTTP

use crate::support::{http_pipeline, mount_link_page, mount_page, UNREACHABLE};
use pagescope::config::CancelPolicy;
use pagescope::crawler::PageAnalyzer;
use pagescope::{BrokenLink, CrawlError};
use tokio_util::sync::CancellationToken;
use wiremock::MockServer;

#[tokio::test]
async fn test_full_analysis_of_linked_page() {
    let server = MockServer::start().await;
    let external = MockServer::start().await;
    mount_link_page(&server, &external).await;

    let pipeline = http_pipeline(CancelPolicy::KeepPartial);
    let url = format!("{}/", server.uri());
    let result = pipeline
        .analyze(&url, &CancellationToken::new())
        .await
        .expect("analysis failed");

    assert_eq!(result.url, url);
    assert_eq!(result.html_version, "HTML");
    assert_eq!(result.title, "Link Page");
    assert_eq!(result.headings.h1, 1);
    assert_eq!(result.headings.h2, 2);
    assert_eq!(result.headings.h3, 0);

    // /ok, /missing, the unreachable host and mailto share the page's host
    assert_eq!(result.internal_links, 4);
    assert_eq!(result.external_links, 1);

    assert_eq!(
        result.broken_links,
        vec![
            BrokenLink {
                url: format!("{}/missing", server.uri()),
                status_code: 404,
            },
            BrokenLink {
                url: UNREACHABLE.to_string(),
                status_code: 0,
            },
        ]
    );
    assert!(!result.has_login_form);
}

#[tokio::test]
async fn test_login_page_detected() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/signin",
        r#"<html><head><title>Account</title></head><body>
            <form><input type="text" name="user"><input type="PASSWORD" name="pw"></form>
        </body></html>"#
            .to_string(),
    )
    .await;

    let pipeline = http_pipeline(CancelPolicy::KeepPartial);
    let result = pipeline
        .analyze(
            &format!("{}/signin", server.uri()),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert!(result.has_login_form);
    assert_eq!(result.html_version, "Unknown");
    assert_eq!(result.internal_links + result.external_links, 0);
}

#[tokio::test]
async fn test_unreachable_page_is_render_error() {
    let pipeline = http_pipeline(CancelPolicy::KeepPartial);
    let err = pipeline
        .analyze(UNREACHABLE, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, CrawlError::Render { .. }));
}

#[tokio::test]
async fn test_canceled_token_fails_render() {
    let server = MockServer::start().await;
    mount_page(&server, "/", "<html><body></body></html>".to_string()).await;

    let cancel = CancellationToken::new();
    cancel.cancel();

    let pipeline = http_pipeline(CancelPolicy::Discard);
    let err = pipeline
        .analyze(&format!("{}/", server.uri()), &cancel)
        .await
        .unwrap_err();

    assert!(matches!(err, CrawlError::Render { .. }));
}
