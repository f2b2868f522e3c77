//! Test utilities: mock link sources, a recording reporter, and a
//! deterministic site generator.
//!
//! Handwritten mocks for dependency injection in unit tests. All mocks use
//! `Arc<Mutex<_>>` for interior mutability, allowing test assertions on
//! recorded calls.

use std::collections::{BTreeSet, HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use url::Url;

use crate::error::AppError;
use crate::reporter::{CrawlEvent, CrawlReporter, SkipReason};
use crate::traits::LinkSource;

// ---------------------------------------------------------------------------
// MockSource
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum MockPage {
    Links(Vec<String>),
    Fail(String),
    Stall,
}

/// In-memory site: maps absolute URLs to the hrefs found on them.
///
/// Unknown URLs fail with an HTTP 404 error. Every call is counted per URL
/// and the peak number of concurrent calls is tracked.
#[derive(Clone, Default)]
pub struct MockSource {
    pages: Arc<Mutex<HashMap<String, MockPage>>>,
    latency: Duration,
    delays: Arc<Mutex<HashMap<String, Duration>>>,
    fetches: Arc<Mutex<HashMap<String, usize>>>,
    active: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Page at `url` links to `hrefs` (relative or absolute).
    pub fn page(self, url: &str, hrefs: &[&str]) -> Self {
        let hrefs = hrefs.iter().map(|h| h.to_string()).collect();
        self.pages
            .lock()
            .unwrap()
            .insert(url.to_string(), MockPage::Links(hrefs));
        self
    }

    /// Page at `url` fails with an HTTP error.
    pub fn failing(self, url: &str, message: &str) -> Self {
        self.pages
            .lock()
            .unwrap()
            .insert(url.to_string(), MockPage::Fail(message.to_string()));
        self
    }

    /// Page at `url` never responds.
    pub fn stalling(self, url: &str) -> Self {
        self.pages
            .lock()
            .unwrap()
            .insert(url.to_string(), MockPage::Stall);
        self
    }

    /// Every call sleeps for `latency` before answering.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Calls for `url` sleep for `delay` on top of the shared latency.
    pub fn slow(self, url: &str, delay: Duration) -> Self {
        self.delays
            .lock()
            .unwrap()
            .insert(url.to_string(), delay);
        self
    }

    pub fn fetch_count(&self, url: &str) -> usize {
        self.fetches.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    pub fn fetched_urls(&self) -> BTreeSet<String> {
        self.fetches.lock().unwrap().keys().cloned().collect()
    }

    /// Highest number of calls that were in progress at the same time.
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

impl LinkSource for MockSource {
    async fn links(&self, url: &Url) -> Result<Vec<String>, AppError> {
        *self
            .fetches
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default() += 1;

        let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now_active, Ordering::SeqCst);

        let delay = self.delays.lock().unwrap().get(url.as_str()).copied();
        let delay = self.latency + delay.unwrap_or_default();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let page = self.pages.lock().unwrap().get(url.as_str()).cloned();
        let result = match page {
            Some(MockPage::Links(hrefs)) => Ok(hrefs),
            Some(MockPage::Fail(message)) => Err(AppError::HttpError(message)),
            Some(MockPage::Stall) => std::future::pending().await,
            None => Err(AppError::HttpError(format!("HTTP 404 for {url}"))),
        };

        self.active.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

// ---------------------------------------------------------------------------
// RecordingReporter
// ---------------------------------------------------------------------------

/// Owned copy of the interesting [`CrawlEvent`]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedEvent {
    Claimed { url: String, depth: usize },
    Failed { url: String, error: String },
    Dropped { url: String, reason: SkipReason },
    Skipped { href: String, reason: SkipReason },
    DeadlineExceeded,
    Finished,
}

/// Reporter that keeps every event for later assertions.
#[derive(Clone, Default)]
pub struct RecordingReporter {
    pub events: Arc<Mutex<Vec<RecordedEvent>>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn claimed(&self) -> Vec<(String, usize)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                RecordedEvent::Claimed { url, depth } => Some((url, depth)),
                _ => None,
            })
            .collect()
    }
}

impl CrawlReporter for RecordingReporter {
    fn report(&self, event: CrawlEvent<'_>) {
        let recorded = match event {
            CrawlEvent::PageClaimed { url, depth } => RecordedEvent::Claimed {
                url: url.to_string(),
                depth,
            },
            CrawlEvent::PageFailed { url, error, .. } => RecordedEvent::Failed {
                url: url.to_string(),
                error: error.to_string(),
            },
            CrawlEvent::UnitDropped { url, reason, .. } => RecordedEvent::Dropped {
                url: url.to_string(),
                reason,
            },
            CrawlEvent::LinkSkipped { href, reason, .. } => RecordedEvent::Skipped {
                href: href.to_string(),
                reason,
            },
            CrawlEvent::DeadlineExceeded { .. } => RecordedEvent::DeadlineExceeded,
            CrawlEvent::Finished { .. } => RecordedEvent::Finished,
            CrawlEvent::Started { .. } | CrawlEvent::PageFetched { .. } => return,
        };
        self.events.lock().unwrap().push(recorded);
    }
}

// ---------------------------------------------------------------------------
// SiteGraph
// ---------------------------------------------------------------------------

/// One generated page. Page `0` is the index at level 0.
#[derive(Debug, Clone)]
pub struct SitePage {
    pub num: usize,
    pub level: usize,
    pub links: Vec<usize>,
}

/// Randomly shaped, reproducible site.
///
/// Each level `d` holds between 1 and `max_pages` pages, and every page at
/// level `d` is linked from at least one page at level `d - 1`. On top of
/// that tree-like skeleton pages get extra links to arbitrary pages: back to
/// the index, sideways, or forward past several levels. A page's distance
/// from the index can therefore be shorter than its level.
#[derive(Debug, Clone)]
pub struct SiteGraph {
    pub pages: Vec<SitePage>,
}

impl SiteGraph {
    pub fn generate(seed: u64, levels: usize, max_pages: usize) -> Self {
        let mut rng = XorShift::new(seed);
        let mut pages = vec![SitePage {
            num: 0,
            level: 0,
            links: Vec::new(),
        }];
        let mut parents = vec![0usize];

        for level in 1..=levels {
            let count = 1 + rng.below(max_pages);
            let mut members = Vec::with_capacity(count);
            for _ in 0..count {
                let num = pages.len();
                pages.push(SitePage {
                    num,
                    level,
                    links: Vec::new(),
                });
                let inbound = 1 + rng.below(parents.len());
                for &parent in &parents[..inbound] {
                    pages[parent].links.push(num);
                }
                members.push(num);
            }
            parents = members;
        }

        let total = pages.len();
        for page in &mut pages {
            for _ in 0..rng.below(3) {
                page.links.push(rng.below(total));
            }
        }

        Self { pages }
    }

    /// Shortest link distance from the index to every page, `None` when a
    /// page is unreachable.
    pub fn distances(&self) -> Vec<Option<usize>> {
        let mut dist = vec![None; self.pages.len()];
        let mut queue = VecDeque::from([0usize]);
        dist[0] = Some(0);
        while let Some(num) = queue.pop_front() {
            let next = dist[num].map(|d| d + 1);
            for &link in &self.pages[num].links {
                if dist[link].is_none() {
                    dist[link] = next;
                    queue.push_back(link);
                }
            }
        }
        dist
    }

    /// Absolute URL of page `num` under `base` (which ends with `/`).
    pub fn url(base: &str, num: usize) -> String {
        if num == 0 {
            base.to_string()
        } else {
            format!("{base}{num}")
        }
    }

    /// Root-relative href used on pages to link to `num`.
    pub fn href(num: usize) -> String {
        if num == 0 {
            "/".to_string()
        } else {
            format!("/{num}")
        }
    }

    /// URLs a crawl limited to `max_depth` must return: every page whose
    /// shortest distance from the index is within the bound.
    pub fn expected(&self, base: &str, max_depth: usize) -> BTreeSet<String> {
        self.distances()
            .into_iter()
            .enumerate()
            .filter(|(_, dist)| dist.is_some_and(|d| d <= max_depth))
            .map(|(num, _)| Self::url(base, num))
            .collect()
    }

    /// Serve the site from a [`MockSource`].
    pub fn to_source(&self, base: &str) -> MockSource {
        self.pages.iter().fold(MockSource::new(), |source, page| {
            let hrefs: Vec<String> = page.links.iter().map(|&n| Self::href(n)).collect();
            let hrefs: Vec<&str> = hrefs.iter().map(String::as_str).collect();
            source.page(&Self::url(base, page.num), &hrefs)
        })
    }

    /// Render page `num` as a minimal HTML document.
    pub fn render(&self, num: usize) -> Option<String> {
        let page = self.pages.get(num)?;
        let anchors: String = page
            .links
            .iter()
            .map(|&n| format!("<li><a href=\"{}\">page {n}</a></li>", Self::href(n)))
            .collect();
        Some(format!(
            "<!doctype html><html><head><title>Page {num}</title></head>\
             <body><h1>Page {num}</h1><ul>{anchors}</ul></body></html>"
        ))
    }
}

/// xorshift64: deterministic and dependency-free, not for cryptography.
struct XorShift(u64);

impl XorShift {
    fn new(seed: u64) -> Self {
        // xorshift never leaves the all-zero state.
        Self(seed.max(1))
    }

    fn next(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    /// Uniform-ish value in `[0, n)`.
    fn below(&mut self, n: usize) -> usize {
        (self.next() % n as u64) as usize
    }
}
