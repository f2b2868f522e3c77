use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use url::Url;
use uuid::Uuid;

/// One page awaiting processing, together with its link distance from the seed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    pub url: Url,
    pub depth: usize,
}

impl Unit {
    pub fn root(url: Url) -> Self {
        Self { url, depth: 0 }
    }

    /// A unit for a link discovered on this page.
    pub fn child(&self, url: Url) -> Self {
        Self {
            url,
            depth: self.depth + 1,
        }
    }
}

/// How a crawl ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CrawlOutcome {
    /// Every dispatched unit settled before the deadline.
    Completed,
    /// The deadline fired first; the result is partial.
    DeadlineExceeded,
}

impl CrawlOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            CrawlOutcome::Completed => "completed",
            CrawlOutcome::DeadlineExceeded => "deadline_exceeded",
        }
    }
}

impl fmt::Display for CrawlOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The finalized result of a crawl.
#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    pub session_id: Uuid,
    pub seed: String,
    /// Discovered URLs, de-duplicated, in discovery-completion order.
    pub urls: Vec<String>,
    pub outcome: CrawlOutcome,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: u64,
}

impl CrawlReport {
    pub fn is_partial(&self) -> bool {
        self.outcome == CrawlOutcome::DeadlineExceeded
    }
}
