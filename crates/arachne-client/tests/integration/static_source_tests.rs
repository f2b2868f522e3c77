use std::time::Duration;

use arachne_client::StaticSource;
use arachne_core::AppError;
use arachne_core::traits::LinkSource;
use url::Url;

use crate::common::serve_fixture;

#[tokio::test]
async fn returns_raw_hrefs_including_empty() {
    let base = serve_fixture().await;
    let source = StaticSource::new().unwrap();

    let hrefs = source.links(&Url::parse(&base).unwrap()).await.unwrap();

    assert_eq!(
        hrefs,
        vec![
            "/docs/",
            "/missing",
            "/error",
            "/slow",
            "http://example.invalid/x",
            "mailto:owner@example.invalid",
            "",
        ]
    );
}

#[tokio::test]
async fn non_success_status_is_an_http_error() {
    let base = serve_fixture().await;
    let source = StaticSource::new().unwrap();

    for path in ["missing", "error"] {
        let url = Url::parse(&format!("{base}{path}")).unwrap();
        let err = source.links(&url).await.unwrap_err();
        assert!(matches!(err, AppError::HttpError(_)), "{path}: {err}");
    }

    let url = Url::parse(&format!("{base}error")).unwrap();
    let err = source.links(&url).await.unwrap_err();
    assert!(err.to_string().contains("HTTP 500"));
}

#[tokio::test]
async fn slow_page_times_out() {
    let base = serve_fixture().await;
    let source = StaticSource::with_timeout(Duration::from_secs(1)).unwrap();

    let url = Url::parse(&format!("{base}slow")).unwrap();
    let err = source.links(&url).await.unwrap_err();

    assert!(matches!(err, AppError::Timeout(1)), "{err}");
}

#[tokio::test]
async fn refused_connection_is_a_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = Url::parse(&format!("http://{}/", listener.local_addr().unwrap())).unwrap();
    drop(listener);

    let err = StaticSource::new().unwrap().links(&url).await.unwrap_err();

    assert!(
        matches!(err, AppError::NetworkError(_) | AppError::HttpError(_)),
        "{err}"
    );
}
