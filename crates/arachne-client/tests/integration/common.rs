use std::sync::Arc;
use std::time::Duration;

use arachne_core::testutil::SiteGraph;
use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use tokio::net::TcpListener;

/// Serve `router` on an ephemeral localhost port and return its base URL
/// (with a trailing slash).
pub async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Failed to read local address");

    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("Test server failed");
    });

    format!("http://{addr}/")
}

/// Serve a generated site: `/` is page 0, `/{n}` is page `n`.
pub async fn serve_site(graph: SiteGraph) -> String {
    let router = Router::new()
        .route("/", get(site_index))
        .route("/{num}", get(site_page))
        .with_state(Arc::new(graph));
    serve(router).await
}

async fn site_index(State(graph): State<Arc<SiteGraph>>) -> Response {
    render(&graph, 0)
}

async fn site_page(State(graph): State<Arc<SiteGraph>>, Path(num): Path<String>) -> Response {
    match num.parse::<usize>() {
        Ok(num) => render(&graph, num),
        Err(_) => StatusCode::NOT_FOUND.into_response(),
    }
}

fn render(graph: &SiteGraph, num: usize) -> Response {
    match graph.render(num) {
        Some(html) => Html(html).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Hand-written fixture with failing, slow, and foreign links.
///
/// ```text
/// /             -> /docs/, /missing, /error, /slow, http://example.invalid/x, mailto:, ""
/// /docs/        -> guide (relative), /
/// /docs/guide   -> /docs/guide/deep
/// /error        -> 500
/// /slow         -> sleeps 5 s
/// ```
pub async fn serve_fixture() -> String {
    let router = Router::new()
        .route(
            "/",
            get(|| async {
                Html(
                    r#"<html><body>
                    <a href="/docs/">docs</a>
                    <a href="/missing">missing</a>
                    <a href="/error">error</a>
                    <a href="/slow">slow</a>
                    <a href="http://example.invalid/x">foreign</a>
                    <a href="mailto:owner@example.invalid">mail</a>
                    <a href="">empty</a>
                    </body></html>"#,
                )
            }),
        )
        .route(
            "/docs/",
            get(|| async { Html(r#"<a href="guide">guide</a><a href="/">home</a>"#) }),
        )
        .route(
            "/docs/guide",
            get(|| async { Html(r#"<a href="/docs/guide/deep">deep</a>"#) }),
        )
        .route(
            "/error",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        )
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Html(r#"<a href="/after-sleep">late</a>"#)
            }),
        );
    serve(router).await
}

/// URLs the fixture yields at `max_depth = 2` under `base`.
pub fn fixture_urls(base: &str) -> Vec<String> {
    ["", "docs/", "missing", "error", "slow", "docs/guide"]
        .iter()
        .map(|path| format!("{base}{path}"))
        .collect()
}
