use std::sync::Arc;
use std::time::Duration;

use arachne_core::config::CrawlConfig;
use arachne_core::crawler::{self, parse_seed};
use arachne_core::error::AppError;
use arachne_core::models::CrawlReport;
use arachne_core::reporter::{CrawlReporter, TracingCrawlReporter};
use arachne_core::traits::LinkSource;
use url::Url;

#[cfg(feature = "browser")]
use crate::browser_source::BrowserSource;
use crate::static_source::StaticSource;

/// How pages are turned into links, fixed for the duration of a crawl.
#[derive(Clone)]
pub enum ContentSource {
    /// Plain HTTP GET, anchors read from the served HTML.
    Static(StaticSource),
    /// Headless Chromium, anchors read from the rendered DOM.
    #[cfg(feature = "browser")]
    Dynamic(BrowserSource),
}

impl ContentSource {
    /// Builds the static or the dynamic variant with a per-page `timeout`.
    ///
    /// Asking for dynamic rendering in a build without the `browser` feature
    /// is a configuration error.
    pub async fn new(dynamic: bool, timeout: Duration) -> Result<Self, AppError> {
        if dynamic {
            Self::dynamic(timeout).await
        } else {
            Ok(Self::Static(StaticSource::with_timeout(timeout)?))
        }
    }

    #[cfg(feature = "browser")]
    async fn dynamic(timeout: Duration) -> Result<Self, AppError> {
        Ok(Self::Dynamic(BrowserSource::with_timeout(timeout).await?))
    }

    #[cfg(not(feature = "browser"))]
    async fn dynamic(_timeout: Duration) -> Result<Self, AppError> {
        Err(AppError::ConfigError(
            "dynamic rendering requires building with the `browser` feature".to_string(),
        ))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ContentSource::Static(_) => "static",
            #[cfg(feature = "browser")]
            ContentSource::Dynamic(_) => "dynamic",
        }
    }
}

impl LinkSource for ContentSource {
    async fn links(&self, url: &Url) -> Result<Vec<String>, AppError> {
        match self {
            ContentSource::Static(source) => source.links(url).await,
            #[cfg(feature = "browser")]
            ContentSource::Dynamic(source) => source.links(url).await,
        }
    }
}

/// Crawl with the given config, building the content source first.
///
/// The seed is validated before a browser is launched, so an unusable seed
/// fails fast.
pub async fn crawl_with_config<R>(
    root_url: &str,
    config: &CrawlConfig,
    dynamic: bool,
    reporter: Arc<R>,
) -> Result<CrawlReport, AppError>
where
    R: CrawlReporter + 'static,
{
    config.validate()?;
    parse_seed(root_url)?;

    let source = ContentSource::new(dynamic, config.fetch_timeout).await?;
    tracing::debug!(kind = source.kind(), "Content source ready");

    crawler::crawl(root_url, config, source, reporter).await
}

/// Crawl `root_url` with default budgets and return the discovered URLs.
///
/// Per-page failures and an expired deadline still yield `Ok`; only an
/// unusable seed or a source that cannot be constructed is an error.
pub async fn crawl(
    root_url: &str,
    max_depth: usize,
    same_origin: bool,
    dynamic: bool,
) -> Result<Vec<String>, AppError> {
    let config = CrawlConfig::default()
        .with_max_depth(max_depth)
        .with_same_origin(same_origin);

    let report =
        crawl_with_config(root_url, &config, dynamic, Arc::new(TracingCrawlReporter)).await?;
    Ok(report.urls)
}
