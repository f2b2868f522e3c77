use uuid::Uuid;

use crate::models::CrawlOutcome;

/// Why a unit or a link was not followed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Unit lies beyond the configured maximum depth.
    TooDeep,
    /// URL was already claimed by another unit.
    AlreadyVisited,
    /// Href could not be resolved to a URL.
    Malformed,
    /// Resolved URL uses a scheme other than http/https.
    UnsupportedScheme,
    /// Resolved URL is outside the seed's origin.
    CrossOrigin,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::TooDeep => "too_deep",
            SkipReason::AlreadyVisited => "already_visited",
            SkipReason::Malformed => "malformed",
            SkipReason::UnsupportedScheme => "unsupported_scheme",
            SkipReason::CrossOrigin => "cross_origin",
        }
    }
}

/// Events emitted during a crawl for monitoring/logging.
#[derive(Debug, Clone)]
pub enum CrawlEvent<'a> {
    Started {
        session_id: Uuid,
        seed: &'a str,
        max_depth: usize,
    },
    UnitDropped {
        url: &'a str,
        depth: usize,
        reason: SkipReason,
    },
    PageClaimed {
        url: &'a str,
        depth: usize,
    },
    PageFetched {
        url: &'a str,
        depth: usize,
        hrefs: usize,
        followed: usize,
    },
    PageFailed {
        url: &'a str,
        depth: usize,
        error: &'a str,
    },
    LinkSkipped {
        page: &'a str,
        href: &'a str,
        reason: SkipReason,
    },
    DeadlineExceeded {
        session_id: Uuid,
        claimed: usize,
    },
    Finished {
        session_id: Uuid,
        outcome: CrawlOutcome,
        urls: usize,
        elapsed_ms: u64,
    },
}

/// Trait for receiving crawl events (decoupled logging).
pub trait CrawlReporter: Send + Sync {
    fn report(&self, event: CrawlEvent<'_>) {
        let _ = event;
    }
}

/// Reporter that uses the `tracing` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingCrawlReporter;

impl CrawlReporter for TracingCrawlReporter {
    fn report(&self, event: CrawlEvent<'_>) {
        match event {
            CrawlEvent::Started {
                session_id,
                seed,
                max_depth,
            } => {
                tracing::info!(%session_id, %seed, max_depth, "Crawl started");
            }
            CrawlEvent::UnitDropped { url, depth, reason } => {
                tracing::trace!(%url, depth, reason = reason.as_str(), "Unit dropped");
            }
            CrawlEvent::PageClaimed { url, depth } => {
                tracing::info!(%url, depth, "Crawling");
            }
            CrawlEvent::PageFetched {
                url,
                depth,
                hrefs,
                followed,
            } => {
                tracing::debug!(%url, depth, hrefs, followed, "Links extracted");
            }
            CrawlEvent::PageFailed { url, depth, error } => {
                tracing::warn!(%url, depth, %error, "Page failed");
            }
            CrawlEvent::LinkSkipped { page, href, reason } => {
                tracing::debug!(%page, %href, reason = reason.as_str(), "Link skipped");
            }
            CrawlEvent::DeadlineExceeded {
                session_id,
                claimed,
            } => {
                tracing::warn!(%session_id, claimed, "Deadline exceeded, returning partial result");
            }
            CrawlEvent::Finished {
                session_id,
                outcome,
                urls,
                elapsed_ms,
            } => {
                tracing::info!(%session_id, %outcome, urls, elapsed_ms, "Crawl finished");
            }
        }
    }
}

/// Reporter that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl CrawlReporter for NullReporter {}
