use thiserror::Error;

/// Application-wide error types for Arachne.
#[derive(Error, Debug)]
pub enum AppError {
    /// HTTP request failed (fetching a page).
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Request or navigation timed out.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Network/connection error.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// A URL could not be parsed or is not crawlable.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Headless browser launch, navigation, or DOM query failed.
    #[error("Browser error: {0}")]
    BrowserError(String),

    /// Response body could not be parsed as HTML.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Crawl configuration is unusable.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl AppError {
    /// Returns true if this error prevents a crawl from starting at all.
    ///
    /// Everything else is a per-page failure that the traversal absorbs.
    pub fn is_fatal(&self) -> bool {
        matches!(self, AppError::InvalidUrl(_) | AppError::ConfigError(_))
    }
}

impl From<url::ParseError> for AppError {
    fn from(e: url::ParseError) -> Self {
        AppError::InvalidUrl(e.to_string())
    }
}
