use std::time::Duration;

use arachne_core::error::AppError;
use arachne_core::traits::LinkSource;
use reqwest::Client;
use url::Url;

use crate::extractor::HrefExtractor;

/// Link source that downloads the raw HTML with reqwest and parses it with
/// scraper. No JavaScript is executed.
///
/// Any non-2xx status, transport failure, or unreadable body is an error
/// for that page only.
#[derive(Clone)]
pub struct StaticSource {
    client: Client,
    timeout_secs: u64,
    extractor: HrefExtractor,
}

impl StaticSource {
    /// Creates a source with a **10 s** per-request timeout.
    pub fn new() -> Result<Self, AppError> {
        Self::with_timeout(Duration::from_secs(10))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent("Arachne/0.1 (link crawler)")
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::HttpError(e.to_string()))?;

        Ok(Self {
            client,
            timeout_secs: timeout.as_secs(),
            extractor: HrefExtractor::new()?,
        })
    }

    /// GET `url` and return the response body.
    pub async fn fetch(&self, url: &Url) -> Result<String, AppError> {
        let response = self.client.get(url.as_str()).send().await.map_err(|e| {
            if e.is_timeout() {
                AppError::Timeout(self.timeout_secs)
            } else if e.is_connect() {
                AppError::NetworkError(format!("Connection failed: {e}"))
            } else {
                AppError::HttpError(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::HttpError(format!(
                "HTTP {} for {}",
                status.as_u16(),
                url
            )));
        }

        response
            .text()
            .await
            .map_err(|e| AppError::HttpError(format!("Failed to read response body: {e}")))
    }
}

impl LinkSource for StaticSource {
    async fn links(&self, url: &Url) -> Result<Vec<String>, AppError> {
        let html = self.fetch(url).await?;
        let hrefs = self.extractor.extract(&html);
        tracing::debug!(%url, bytes = html.len(), hrefs = hrefs.len(), "Parsed static page");
        Ok(hrefs)
    }
}
