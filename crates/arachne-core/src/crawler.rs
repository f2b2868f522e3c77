//! Traversal coordinator and deadline supervisor.
//!
//! A crawl is driven by a dispatcher task that owns the frontier of pending
//! units and a [`JoinSet`] of the units currently being processed. Discovered
//! links are queued for the next depth level and only spawned while fewer
//! than `max_concurrency` units are in flight. The caller races the dispatcher
//! against the configured deadline and finalizes the session either way.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::config::CrawlConfig;
use crate::error::AppError;
use crate::links::{is_crawlable, resolve, same_origin};
use crate::models::{CrawlOutcome, CrawlReport, Unit};
use crate::reporter::{CrawlEvent, CrawlReporter, SkipReason};
use crate::session::CrawlSession;
use crate::traits::LinkSource;

/// Crawl from `seed` and return every URL discovered within the depth bound.
///
/// Per-page failures only end that page's branch. When `config.deadline`
/// expires the partial result is returned with
/// [`CrawlOutcome::DeadlineExceeded`]; units still in flight are left to
/// finish on their own and their updates are not part of the report.
///
/// # Errors
///
/// Returns [`AppError::InvalidUrl`] if the seed is not an absolute http(s)
/// URL and [`AppError::ConfigError`] if `config` is unusable.
pub async fn crawl<S, R>(
    seed: &str,
    config: &CrawlConfig,
    source: S,
    reporter: Arc<R>,
) -> Result<CrawlReport, AppError>
where
    S: LinkSource,
    R: CrawlReporter + 'static,
{
    config.validate()?;
    let seed = parse_seed(seed)?;

    let started_at = Utc::now();
    let clock = Instant::now();
    let session = Arc::new(CrawlSession::new());
    let session_id = session.id();

    reporter.report(CrawlEvent::Started {
        session_id,
        seed: seed.as_str(),
        max_depth: config.max_depth,
    });

    // Claimed here, before any fetch, so the seed survives even an
    // immediate deadline.
    session.try_claim(seed.as_str()).await;
    reporter.report(CrawlEvent::PageClaimed {
        url: seed.as_str(),
        depth: 0,
    });

    let traversal = Arc::new(Traversal {
        session: Arc::clone(&session),
        source,
        reporter: Arc::clone(&reporter),
        seed: seed.clone(),
        max_depth: config.max_depth,
        same_origin: config.same_origin,
    });
    let cancel = CancellationToken::new();
    let mut dispatcher = tokio::spawn(dispatch(
        traversal,
        Unit::root(seed.clone()),
        config.max_concurrency,
        cancel.clone(),
    ));

    let outcome = tokio::select! {
        joined = &mut dispatcher => {
            if let Err(e) = joined {
                tracing::error!(%session_id, error = %e, "Dispatcher task failed");
            }
            CrawlOutcome::Completed
        }
        () = tokio::time::sleep(config.deadline) => {
            cancel.cancel();
            reporter.report(CrawlEvent::DeadlineExceeded {
                session_id,
                claimed: session.len().await,
            });
            CrawlOutcome::DeadlineExceeded
        }
    };

    let urls = session.snapshot().await;
    let elapsed_ms = u64::try_from(clock.elapsed().as_millis()).unwrap_or(u64::MAX);
    reporter.report(CrawlEvent::Finished {
        session_id,
        outcome,
        urls: urls.len(),
        elapsed_ms,
    });

    Ok(CrawlReport {
        session_id,
        seed: seed.to_string(),
        urls,
        outcome,
        started_at,
        elapsed_ms,
    })
}

/// Parse the seed, accepting only absolute http(s) URLs.
pub fn parse_seed(seed: &str) -> Result<Url, AppError> {
    let url = Url::parse(seed.trim())
        .map_err(|e| AppError::InvalidUrl(format!("{seed}: {e}")))?;
    if !is_crawlable(&url) {
        return Err(AppError::InvalidUrl(format!(
            "{seed}: scheme '{}' is not supported (only http/https)",
            url.scheme()
        )));
    }
    Ok(url)
}

/// Drives the frontier until every unit has settled or `cancel` fires.
///
/// Units are dispatched one depth level at a time: children found at depth
/// `d` wait until every depth-`d` unit has settled. A URL is therefore always
/// claimed at its shortest distance from the seed, whatever the fetch timing.
async fn dispatch<S, R>(
    traversal: Arc<Traversal<S, R>>,
    root: Unit,
    max_concurrency: usize,
    cancel: CancellationToken,
) where
    S: LinkSource,
    R: CrawlReporter + 'static,
{
    let mut level: VecDeque<Unit> = VecDeque::new();
    let mut next_level: Vec<Unit> = Vec::new();
    // URLs already waiting in `next_level`.
    let mut queued: HashSet<String> = HashSet::new();
    let mut in_flight = JoinSet::new();
    in_flight.spawn(Arc::clone(&traversal).expand(root));

    loop {
        while in_flight.len() < max_concurrency {
            let Some(unit) = level.pop_front() else {
                break;
            };
            in_flight.spawn(Arc::clone(&traversal).visit(unit));
        }

        if in_flight.is_empty() {
            if next_level.is_empty() {
                return;
            }
            level.extend(next_level.drain(..));
            queued.clear();
            continue;
        }

        let joined = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                // In-flight units run to completion unobserved.
                in_flight.detach_all();
                tracing::debug!(
                    queued = level.len() + next_level.len(),
                    "Dispatcher cancelled"
                );
                return;
            }
            joined = in_flight.join_next() => joined,
        };

        match joined {
            Some(Ok(children)) => {
                for child in children {
                    if queued.insert(child.url.to_string()) {
                        next_level.push(child);
                    }
                }
            }
            Some(Err(e)) => tracing::error!(error = %e, "Traversal task failed"),
            None => {}
        }
    }
}

/// State shared by every unit of one crawl.
struct Traversal<S, R> {
    session: Arc<CrawlSession>,
    source: S,
    reporter: Arc<R>,
    seed: Url,
    max_depth: usize,
    same_origin: bool,
}

impl<S, R> Traversal<S, R>
where
    S: LinkSource,
    R: CrawlReporter + 'static,
{
    /// Depth check, then claim. Returns the units discovered on the page.
    async fn visit(self: Arc<Self>, unit: Unit) -> Vec<Unit> {
        if unit.depth > self.max_depth {
            self.drop_unit(&unit, SkipReason::TooDeep);
            return Vec::new();
        }
        if !self.session.try_claim(unit.url.as_str()).await {
            self.drop_unit(&unit, SkipReason::AlreadyVisited);
            return Vec::new();
        }

        self.reporter.report(CrawlEvent::PageClaimed {
            url: unit.url.as_str(),
            depth: unit.depth,
        });
        self.expand(unit).await
    }

    /// Fetch an already-claimed page and turn its hrefs into child units.
    async fn expand(self: Arc<Self>, unit: Unit) -> Vec<Unit> {
        // Children of a page at the depth limit would all be dropped.
        if unit.depth >= self.max_depth {
            return Vec::new();
        }

        let hrefs = match self.source.links(&unit.url).await {
            Ok(hrefs) => hrefs,
            Err(e) => {
                let error = e.to_string();
                self.reporter.report(CrawlEvent::PageFailed {
                    url: unit.url.as_str(),
                    depth: unit.depth,
                    error: &error,
                });
                return Vec::new();
            }
        };

        let mut children = Vec::new();
        for child in hrefs.iter().filter_map(|href| self.follow(&unit, href)) {
            // `try_claim` in `visit` remains the dedup gate.
            if self.session.is_visited(child.url.as_str()).await {
                self.drop_unit(&child, SkipReason::AlreadyVisited);
                continue;
            }
            children.push(child);
        }

        self.reporter.report(CrawlEvent::PageFetched {
            url: unit.url.as_str(),
            depth: unit.depth,
            hrefs: hrefs.len(),
            followed: children.len(),
        });
        children
    }

    /// Resolve and screen one href found on `page`.
    fn follow(&self, page: &Unit, href: &str) -> Option<Unit> {
        if href.trim().is_empty() {
            return None;
        }

        let skip = |reason: SkipReason| -> Option<Unit> {
            self.reporter.report(CrawlEvent::LinkSkipped {
                page: page.url.as_str(),
                href,
                reason,
            });
            None
        };

        let Some(url) = resolve(&page.url, href) else {
            return skip(SkipReason::Malformed);
        };
        if !is_crawlable(&url) {
            return skip(SkipReason::UnsupportedScheme);
        }
        if self.same_origin && !same_origin(&self.seed, &url) {
            return skip(SkipReason::CrossOrigin);
        }
        Some(page.child(url))
    }

    fn drop_unit(&self, unit: &Unit, reason: SkipReason) {
        self.reporter.report(CrawlEvent::UnitDropped {
            url: unit.url.as_str(),
            depth: unit.depth,
            reason,
        });
    }
}
