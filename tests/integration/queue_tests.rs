//! Queue to SQLite round trips

use crate::support::{http_pipeline, mount_link_page, test_user_agent, UNREACHABLE};
use pagescope::config::{load_config, CancelPolicy};
use pagescope::queue::QueueOptions;
use pagescope::storage::{CrawlStore, SqliteStorage};
use pagescope::{JobState, QueueManager};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::timeout;
use wiremock::MockServer;

const WAIT: Duration = Duration::from_secs(30);

#[tokio::test]
async fn test_queue_records_results_in_database() {
    let server = MockServer::start().await;
    let external = MockServer::start().await;
    mount_link_page(&server, &external).await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("crawls.db");
    let store: Arc<Mutex<dyn CrawlStore>> =
        Arc::new(Mutex::new(SqliteStorage::new(&db_path).unwrap()));

    let queue = QueueManager::new(
        Arc::new(http_pipeline(CancelPolicy::KeepPartial)),
        store,
        QueueOptions::default(),
    );

    let page = format!("{}/", server.uri());
    assert!(queue.enqueue(&page));
    assert!(queue.enqueue(UNREACHABLE));
    timeout(WAIT, queue.wait_until_idle()).await.unwrap();

    let status = queue.status();
    assert_eq!(status.get(&page), Some(JobState::Done));
    assert_eq!(status.get(UNREACHABLE), Some(JobState::Error));

    // Read back through a fresh connection
    let storage = SqliteStorage::new(&db_path).unwrap();
    let records = storage.list_crawls().unwrap();
    assert_eq!(records.len(), 2);

    let done = storage.crawls_for_url(&page).unwrap().remove(0);
    let result = done.to_result().expect("done record has a result");
    assert_eq!(result.title, "Link Page");
    assert_eq!(result.headings.h2, 2);
    assert_eq!(result.internal_links, 4);
    assert_eq!(result.external_links, 1);
    assert_eq!(result.broken_links.len(), 2);
    assert_eq!(result.broken_links[0].status_code, 404);
    assert_eq!(result.broken_links[1].status_code, 0);

    let failed = storage.crawls_for_url(UNREACHABLE).unwrap().remove(0);
    assert_eq!(failed.status, JobState::Error);
    assert!(failed
        .error_message
        .as_deref()
        .unwrap_or_default()
        .starts_with("render failed for"));
}

#[tokio::test]
async fn test_queue_from_config_file() {
    let server = MockServer::start().await;
    let external = MockServer::start().await;
    mount_link_page(&server, &external).await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("configured.db");
    let config_path = dir.path().join("pagescope.toml");
    let agent = test_user_agent();
    std::fs::write(
        &config_path,
        format!(
            r#"
[crawler]
crawl-timeout-secs = 20
render-timeout-secs = 5
probe-timeout-secs = 5

[queue]
stop-policy = "stopped"

[user-agent]
crawler-name = "{}"
crawler-version = "{}"
contact-url = "{}"
contact-email = "{}"

[output]
database-path = "{}"
"#,
            agent.crawler_name,
            agent.crawler_version,
            agent.contact_url,
            agent.contact_email,
            db_path.display()
        ),
    )
    .unwrap();

    let config = load_config(&config_path).unwrap();
    let store: Arc<Mutex<dyn CrawlStore>> = Arc::new(Mutex::new(
        SqliteStorage::new(std::path::Path::new(&config.output.database_path)).unwrap(),
    ));
    let queue = QueueManager::from_config(&config, store).unwrap();

    let page = format!("{}/", server.uri());
    queue.enqueue(&page);
    timeout(WAIT, queue.wait_until_idle()).await.unwrap();

    let storage = SqliteStorage::new(&db_path).unwrap();
    let counts = storage.count_by_status().unwrap();
    assert_eq!(counts.get(&JobState::Done), Some(&1));
    assert_eq!(storage.count_broken_links().unwrap(), 2);
}
