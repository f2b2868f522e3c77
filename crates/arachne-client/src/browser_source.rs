use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use arachne_core::error::AppError;
use arachne_core::traits::LinkSource;
use chromiumoxide::cdp::browser_protocol::browser::BrowserContextId;
use chromiumoxide::cdp::browser_protocol::target::{
    CreateBrowserContextParams, CreateTargetParams, DisposeBrowserContextParams,
};
use chromiumoxide::{Browser, BrowserConfig};
use futures::StreamExt;
use url::Url;

/// Collects the `href` attribute of every anchor in the live DOM.
const ANCHOR_QUERY: &str =
    "Array.from(document.querySelectorAll('a[href]'), (a) => a.getAttribute('href'))";

/// Headless-browser link source using Chromium via the Chrome DevTools
/// Protocol.
///
/// Unlike [`super::StaticSource`], this renders JavaScript before reading the
/// anchors, so links injected by SPAs (React, Angular, Vue) are found.
///
/// A single Chromium process is shared across all clones of this struct.
/// Each [`LinkSource::links`] call creates its own browser context, opens a
/// tab in it, queries the rendered DOM, then closes the tab and disposes the
/// context, so concurrent pages never share cookies or storage.
///
/// # Example
///
/// ```rust,no_run
/// use arachne_client::BrowserSource;
/// use arachne_core::traits::LinkSource;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let source = BrowserSource::new().await?;
/// let url = url::Url::parse("https://example.com")?;
/// for href in source.links(&url).await? {
///     println!("{href}");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct BrowserSource {
    browser: Arc<Browser>,
    timeout: Duration,
}

impl BrowserSource {
    /// Launches a headless Chromium browser with a **30 s** navigation timeout.
    ///
    /// Requires a Chromium / Chrome binary reachable via `$PATH` (or the
    /// default locations checked by `chromiumoxide`).
    pub async fn new() -> Result<Self, AppError> {
        Self::with_timeout(Duration::from_secs(30)).await
    }

    /// Launches a headless Chromium browser with a custom navigation timeout.
    pub async fn with_timeout(timeout: Duration) -> Result<Self, AppError> {
        let mut builder = BrowserConfig::builder();
        builder = builder.no_sandbox().disable_default_args();

        // Snap-packaged Chromium exposes a wrapper that rejects standard
        // Chrome CLI flags (--headless, --disable-gpu, …), so the real binary
        // inside the snap is preferred when present.
        if let Some(bin) = Self::find_chrome_binary() {
            tracing::info!("Using Chrome binary: {}", bin.display());
            builder = builder.chrome_executable(bin);
        }

        let config = builder
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--disable-popup-blocking")
            .arg("--no-first-run")
            .build()
            .map_err(|e| AppError::BrowserError(format!("Browser config error: {e}")))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| AppError::BrowserError(format!("Failed to launch browser: {e}")))?;

        // The CDP handler must be polled continuously for the connection to work.
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    tracing::warn!("Browser CDP handler error: {event:?}");
                    break;
                }
            }
        });

        Ok(Self {
            browser: Arc::new(browser),
            timeout,
        })
    }

    /// Tries to locate the real Chrome/Chromium binary.
    ///
    /// `CHROME_BIN` wins when it points at an existing file. Otherwise the
    /// snap-internal binary and well-known system paths are checked; `None`
    /// lets `chromiumoxide` do its own lookup.
    fn find_chrome_binary() -> Option<PathBuf> {
        let candidates: &[&str] = &[
            "/snap/chromium/current/usr/lib/chromium-browser/chrome",
            "/var/lib/flatpak/exports/bin/org.chromium.Chromium",
            "/usr/bin/google-chrome-stable",
            "/usr/bin/google-chrome",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
        ];

        if let Ok(p) = std::env::var("CHROME_BIN") {
            let path = PathBuf::from(&p);
            if path.exists() {
                return Some(path);
            }
        }

        candidates.iter().map(PathBuf::from).find(|p| p.exists())
    }

    /// Runs one page inside a fresh browser context and always disposes it.
    ///
    /// Creating the context, loading the page and disposing the context are
    /// each bounded by the navigation timeout.
    async fn links_isolated(&self, url: &Url) -> Result<Vec<String>, AppError> {
        let context = bounded(self.timeout, async {
            self.browser
                .execute(CreateBrowserContextParams::default())
                .await
                .map_err(|e| {
                    AppError::BrowserError(format!("Failed to create browser context: {e}"))
                })
        })
        .await?
        .result
        .browser_context_id;

        let result = bounded(self.timeout, self.links_in_context(url, context.clone())).await;

        let disposed = bounded(self.timeout, async {
            self.browser
                .execute(DisposeBrowserContextParams::new(context))
                .await
                .map_err(|e| AppError::BrowserError(e.to_string()))
        })
        .await;
        if let Err(e) = disposed {
            tracing::debug!(%url, error = %e, "Failed to dispose browser context");
        }

        result
    }

    async fn links_in_context(
        &self,
        url: &Url,
        context: BrowserContextId,
    ) -> Result<Vec<String>, AppError> {
        let target = CreateTargetParams::builder()
            .url(url.as_str())
            .browser_context_id(context)
            .build()
            .map_err(AppError::BrowserError)?;

        let page = self
            .browser
            .new_page(target)
            .await
            .map_err(|e| AppError::BrowserError(format!("Failed to navigate to {url}: {e}")))?;

        let hrefs = async {
            page.wait_for_navigation()
                .await
                .map_err(|e| AppError::BrowserError(format!("Navigation did not finish: {e}")))?;

            page.evaluate(ANCHOR_QUERY)
                .await
                .map_err(|e| AppError::BrowserError(format!("Anchor query failed: {e}")))?
                .into_value::<Vec<String>>()
                .map_err(|e| AppError::BrowserError(format!("Unexpected anchor query result: {e}")))
        }
        .await;

        // Close the tab to free browser resources.
        let _ = page.close().await;

        hrefs
    }
}

/// Fails with [`AppError::Timeout`] if `call` does not finish within `limit`.
async fn bounded<T>(
    limit: Duration,
    call: impl Future<Output = Result<T, AppError>>,
) -> Result<T, AppError> {
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| AppError::Timeout(limit.as_secs()))?
}

impl LinkSource for BrowserSource {
    async fn links(&self, url: &Url) -> Result<Vec<String>, AppError> {
        let hrefs = self.links_isolated(url).await?;
        tracing::debug!(%url, hrefs = hrefs.len(), "Queried rendered page");
        Ok(hrefs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bounded_passes_through_finished_calls() {
        let ok = bounded(Duration::from_secs(1), async { Ok::<_, AppError>(3) }).await;
        assert_eq!(ok.unwrap(), 3);

        let err = bounded(Duration::from_secs(1), async {
            Err::<(), _>(AppError::BrowserError("tab crashed".into()))
        })
        .await;
        assert!(matches!(err, Err(AppError::BrowserError(_))));
    }

    #[tokio::test]
    async fn bounded_times_out_hung_calls() {
        let start = std::time::Instant::now();

        let err = bounded(
            Duration::from_millis(20),
            std::future::pending::<Result<(), AppError>>(),
        )
        .await;

        assert!(matches!(err, Err(AppError::Timeout(0))));
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
