use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use arachne_client::{StaticSource, crawl, crawl_with_config};
use arachne_core::testutil::SiteGraph;
use arachne_core::{CrawlConfig, CrawlOutcome, NullReporter};

use crate::common::{fixture_urls, serve_fixture, serve_site};

fn as_set(urls: &[String]) -> BTreeSet<String> {
    urls.iter().cloned().collect()
}

#[tokio::test]
async fn generated_site_over_http_returns_reachable_set() {
    for seed in [3u64, 77, 4096] {
        let graph = SiteGraph::generate(seed, 8, 5);
        let base = serve_site(graph.clone()).await;

        for max_depth in [0, 1, 3, 5] {
            let urls = crawl(&base, max_depth, false, false).await.unwrap();

            assert_eq!(as_set(&urls).len(), urls.len(), "duplicates in {urls:?}");
            assert_eq!(urls[0], base, "seed must come first");
            assert_eq!(
                as_set(&urls),
                graph.expected(&base, max_depth),
                "seed={seed} max_depth={max_depth}"
            );
        }
    }
}

#[tokio::test]
async fn failing_pages_do_not_fail_the_crawl() {
    let base = serve_fixture().await;
    let config = CrawlConfig::default()
        .with_max_depth(2)
        .with_fetch_timeout(Duration::from_secs(1))
        .with_deadline(Duration::from_secs(10));

    let report = crawl_with_config(&base, &config, false, Arc::new(NullReporter))
        .await
        .unwrap();

    assert_eq!(report.outcome, CrawlOutcome::Completed);
    assert_eq!(as_set(&report.urls), as_set(&fixture_urls(&base)));
    assert!(!report.urls.iter().any(|u| u.contains("example.invalid")));
    assert!(!report.urls.iter().any(|u| u.starts_with("mailto:")));
}

#[tokio::test]
async fn deadline_returns_partial_result_over_http() {
    let base = serve_fixture().await;
    let deadline = Duration::from_millis(300);
    let config = CrawlConfig::default()
        .with_max_depth(2)
        .with_deadline(deadline);

    let start = Instant::now();
    let report = crawl_with_config(&base, &config, false, Arc::new(NullReporter))
        .await
        .unwrap();
    let elapsed = start.elapsed();

    assert!(
        elapsed < deadline + Duration::from_secs(1),
        "crawl should return shortly after the deadline, took {elapsed:?}"
    );
    assert_eq!(report.outcome, CrawlOutcome::DeadlineExceeded);
    assert_eq!(report.urls[0], base);
    assert!(as_set(&report.urls).is_subset(&as_set(&fixture_urls(&base))));
}

#[tokio::test]
async fn unrestricted_crawl_records_foreign_links() {
    let base = serve_fixture().await;
    let config = CrawlConfig::default()
        .with_max_depth(1)
        .with_same_origin(false);

    let report = arachne_core::crawl(
        &base,
        &config,
        StaticSource::new().unwrap(),
        Arc::new(NullReporter),
    )
    .await
    .unwrap();

    assert!(report.urls.contains(&"http://example.invalid/x".to_string()));
    assert!(!report.urls.iter().any(|u| u.starts_with("mailto:")));
}

#[tokio::test]
async fn unreachable_seed_returns_only_seed() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}/", listener.local_addr().unwrap());
    drop(listener);

    let urls = crawl(&base, 3, true, false).await.unwrap();

    assert_eq!(urls, vec![base]);
}
