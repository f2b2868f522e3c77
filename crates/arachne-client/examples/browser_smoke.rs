/// Smoke-test for `BrowserSource`.
///
/// Launches a headless Chromium, reads the anchors of <https://example.com>,
/// and verifies the rendered page links to the IANA explanation page.
///
/// Run with:
///   cargo run --example browser_smoke --features browser
use arachne_client::BrowserSource;
use arachne_core::traits::LinkSource;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    println!("Launching headless browser…");
    let source = BrowserSource::new().await?;

    let url = url::Url::parse("https://example.com")?;
    println!("Querying anchors on {url} …");
    let hrefs = source.links(&url).await?;

    assert!(!hrefs.is_empty(), "Expected at least one anchor");
    assert!(
        hrefs.iter().any(|h| h.contains("iana.org")),
        "Expected a link to iana.org, got {hrefs:?}"
    );

    println!("OK — got {} hrefs", hrefs.len());
    for href in &hrefs {
        println!("  {href}");
    }
    Ok(())
}
