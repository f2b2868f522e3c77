use std::time::Duration;

use crate::error::AppError;

/// Parameters of a single crawl run.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Deepest link distance from the seed that is still fetched. `0` means
    /// only the seed itself.
    pub max_depth: usize,

    /// Follow only links that share the seed's origin.
    pub same_origin: bool,

    /// Wall-clock budget for the whole crawl. When it expires the partial
    /// result is returned.
    pub deadline: Duration,

    /// Per-page timeout handed to the content source.
    pub fetch_timeout: Duration,

    /// Maximum number of pages processed at once.
    pub max_concurrency: usize,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_depth: 1,
            same_origin: true,
            deadline: Duration::from_secs(60),
            fetch_timeout: Duration::from_secs(10),
            max_concurrency: 16,
        }
    }
}

impl CrawlConfig {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_same_origin(mut self, same_origin: bool) -> Self {
        self.same_origin = same_origin;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.max_concurrency == 0 {
            return Err(AppError::ConfigError(
                "max_concurrency must be at least 1".to_string(),
            ));
        }
        if self.fetch_timeout.is_zero() {
            return Err(AppError::ConfigError(
                "fetch_timeout must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}
