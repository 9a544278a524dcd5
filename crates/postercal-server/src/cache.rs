//! Feed cache with TTL (Time-To-Live) support.
//!
//! The proxy keeps the last upstream body in memory for the advertised
//! `max-age`, so a burst of page loads costs one upstream request.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::{debug, trace};

/// Cache entry containing the feed text and metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Cached feed body.
    pub text: Arc<str>,
    /// When the body was fetched.
    pub fetched_at: DateTime<Utc>,
    /// When the entry expires (monotonic clock).
    expires_at: Instant,
}

impl CacheEntry {
    /// Creates a new cache entry with the given TTL.
    pub fn new(text: impl Into<Arc<str>>, ttl: Duration) -> Self {
        Self {
            text: text.into(),
            fetched_at: Utc::now(),
            expires_at: Instant::now() + ttl,
        }
    }

    /// Returns true if the entry has expired.
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    /// Returns the time until expiration.
    pub fn time_until_expiry(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }
}

/// Single-entry feed cache.
#[derive(Debug)]
pub struct FeedCache {
    ttl: Duration,
    entry: Option<CacheEntry>,
}

impl Default for FeedCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(300)) // 5 minutes default
    }
}

impl FeedCache {
    /// Creates a new cache with the given TTL.
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entry: None }
    }

    /// Returns the TTL.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the entry, only if not expired.
    pub fn get_valid(&self) -> Option<&CacheEntry> {
        let entry = self.entry.as_ref().filter(|entry| !entry.is_expired());
        if let Some(entry) = entry {
            trace!(
                remaining_secs = entry.time_until_expiry().as_secs(),
                "Feed cache hit"
            );
        }
        entry
    }

    /// Returns the entry even if expired.
    pub fn get(&self) -> Option<&CacheEntry> {
        self.entry.as_ref()
    }

    /// Stores a freshly fetched body and returns it.
    pub fn insert(&mut self, text: impl Into<Arc<str>>) -> Arc<str> {
        let entry = CacheEntry::new(text, self.ttl);
        let text = Arc::clone(&entry.text);
        debug!(
            bytes = text.len(),
            ttl_secs = self.ttl.as_secs(),
            "Cached feed"
        );
        self.entry = Some(entry);
        text
    }

    /// Drops the cached body.
    pub fn clear(&mut self) {
        if self.entry.take().is_some() {
            debug!("Cleared feed cache");
        }
    }

    /// Returns true if a non-expired body is cached.
    pub fn is_valid(&self) -> bool {
        self.get_valid().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_cache() {
        let cache = FeedCache::default();
        assert_eq!(cache.ttl(), Duration::from_secs(300));
        assert!(cache.get().is_none());
        assert!(!cache.is_valid());
    }

    #[test]
    fn insert_and_get() {
        let mut cache = FeedCache::new(Duration::from_secs(60));
        let text = cache.insert("BEGIN:VCALENDAR");

        assert_eq!(&*text, "BEGIN:VCALENDAR");
        let entry = cache.get_valid().unwrap();
        assert_eq!(&*entry.text, "BEGIN:VCALENDAR");
        assert!(entry.time_until_expiry() > Duration::from_secs(50));
    }

    #[test]
    fn zero_ttl_expires_immediately() {
        let mut cache = FeedCache::new(Duration::ZERO);
        cache.insert("feed");

        assert!(cache.get().is_some());
        assert!(cache.get_valid().is_none());
        assert!(cache.get().unwrap().is_expired());
    }

    #[test]
    fn insert_replaces() {
        let mut cache = FeedCache::new(Duration::from_secs(60));
        cache.insert("old");
        cache.insert("new");
        assert_eq!(&*cache.get_valid().unwrap().text, "new");
    }

    #[test]
    fn clear() {
        let mut cache = FeedCache::new(Duration::from_secs(60));
        cache.insert("feed");
        cache.clear();
        assert!(cache.get().is_none());
    }
}
