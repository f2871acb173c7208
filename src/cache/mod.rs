//! Cache module for lazily generated pages
//!
//! Pages are rendered on first access and kept in memory. An entry older
//! than the revalidation interval is still served, but the next request
//! that sees it triggers a fresh render. A key being rendered is marked
//! in-flight so that concurrent requests never start a second generation.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

/// A rendered page
#[derive(Debug, Clone)]
struct CachedPage {
    html: String,
    rendered_at: Instant,
}

/// Result of looking a page up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// Rendered within the revalidation interval
    Fresh(String),
    /// Rendered longer ago than the revalidation interval
    Stale(String),
    /// Never rendered
    Missing,
}

/// In-memory page cache with per-key generation tracking
#[derive(Debug)]
pub struct PageCache {
    /// Revalidation interval
    ttl: Duration,
    /// Rendered pages keyed by request path
    pages: RwLock<HashMap<String, CachedPage>>,
    /// Keys currently being rendered
    in_flight: Mutex<HashSet<String>>,
}

impl PageCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            pages: RwLock::new(HashMap::new()),
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Look up a page and classify it by age
    pub async fn lookup(&self, key: &str) -> Lookup {
        let pages = self.pages.read().await;
        match pages.get(key) {
            Some(page) if page.rendered_at.elapsed() < self.ttl => Lookup::Fresh(page.html.clone()),
            Some(page) => Lookup::Stale(page.html.clone()),
            None => Lookup::Missing,
        }
    }

    /// Claim the right to render `key`.
    ///
    /// Returns `None` when another caller is already rendering it. The
    /// claim is released when the returned [`Generation`] is dropped,
    /// whether or not a page was stored.
    pub fn begin(&self, key: &str) -> Option<Generation<'_>> {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if !in_flight.insert(key.to_string()) {
            tracing::debug!("Already generating {}", key);
            return None;
        }
        Some(Generation {
            cache: self,
            key: key.to_string(),
        })
    }

    /// Whether `key` is being rendered right now
    pub fn is_generating(&self, key: &str) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(key)
    }

    /// Store a page rendered outside of lazy generation
    pub async fn insert(&self, key: &str, html: String) {
        let page = CachedPage {
            html,
            rendered_at: Instant::now(),
        };
        self.pages.write().await.insert(key.to_string(), page);
    }

    /// Restart the age of a page without replacing it
    pub async fn touch(&self, key: &str) {
        if let Some(page) = self.pages.write().await.get_mut(key) {
            page.rendered_at = Instant::now();
        }
    }

    /// Drop a page, e.g. after its document disappeared
    pub async fn remove(&self, key: &str) {
        if self.pages.write().await.remove(key).is_some() {
            tracing::debug!("Evicted {}", key);
        }
    }

    pub async fn len(&self) -> usize {
        self.pages.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.pages.read().await.is_empty()
    }
}

/// Exclusive claim on rendering one key
#[derive(Debug)]
pub struct Generation<'a> {
    cache: &'a PageCache,
    key: String,
}

impl Generation<'_> {
    /// Store the rendered page and release the claim
    pub async fn finish(self, html: String) {
        self.cache.insert(&self.key, html).await;
        tracing::debug!("Cached {}", self.key);
    }

    /// Keep the current page for another full interval and release the claim
    pub async fn postpone(self) {
        self.cache.touch(&self.key).await;
        tracing::debug!("Postponed revalidation of {}", self.key);
    }

    /// Release the claim and forget any page stored under the key
    pub async fn discard(self) {
        self.cache.remove(&self.key).await;
    }
}

impl Drop for Generation<'_> {
    fn drop(&mut self) {
        self.cache
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}
