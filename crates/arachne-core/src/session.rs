use std::collections::HashSet;

use tokio::sync::RwLock;
use uuid::Uuid;

/// Shared mutable state of one crawl invocation.
///
/// Holds the visited set and the result accumulator behind a single lock.
/// A session is created per crawl, shared by every traversal task through an
/// `Arc`, and dropped once the final result has been taken.
#[derive(Debug)]
pub struct CrawlSession {
    id: Uuid,
    state: RwLock<SessionState>,
}

#[derive(Debug, Default)]
struct SessionState {
    visited: HashSet<String>,
    result: Vec<String>,
}

impl CrawlSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            state: RwLock::new(SessionState::default()),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Atomically mark `url` as visited.
    ///
    /// The membership test, the insert, and the append to the result list
    /// happen under one write-lock acquisition. Returns `false` if the URL
    /// had already been claimed.
    pub async fn try_claim(&self, url: &str) -> bool {
        let mut state = self.state.write().await;
        if !state.visited.insert(url.to_string()) {
            return false;
        }
        state.result.push(url.to_string());
        true
    }

    /// Append `url` to the result list without touching the visited set.
    pub async fn record(&self, url: &str) {
        self.state.write().await.result.push(url.to_string());
    }

    pub async fn is_visited(&self, url: &str) -> bool {
        self.state.read().await.visited.contains(url)
    }

    /// Number of claimed URLs.
    pub async fn len(&self) -> usize {
        self.state.read().await.visited.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// De-duplicated copy of the result list, first occurrence wins.
    pub async fn snapshot(&self) -> Vec<String> {
        let state = self.state.read().await;
        dedup_preserving_order(&state.result)
    }
}

impl Default for CrawlSession {
    fn default() -> Self {
        Self::new()
    }
}

fn dedup_preserving_order(items: &[String]) -> Vec<String> {
    let mut seen = HashSet::with_capacity(items.len());
    items
        .iter()
        .filter(|item| seen.insert(item.as_str()))
        .cloned()
        .collect()
}
