//! Shared proxy state.

use std::sync::Arc;

use postercal_core::FeedParser;
use postercal_feed::{FeedResult, FeedSource};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::cache::FeedCache;
use crate::config::ServerConfig;

/// State shared by all request handlers.
///
/// The cache sits behind one async mutex that stays locked for the whole
/// upstream fetch, so at most one upstream request is in flight and
/// concurrent requests wait for its result.
#[derive(Clone)]
pub struct AppState {
    source: Arc<dyn FeedSource>,
    cache: Arc<Mutex<FeedCache>>,
    parser: Arc<FeedParser>,
    cache_control: Arc<str>,
}

impl AppState {
    /// Creates the state for the given source and configuration.
    pub fn new(source: Arc<dyn FeedSource>, config: &ServerConfig) -> Self {
        Self {
            source,
            cache: Arc::new(Mutex::new(FeedCache::new(config.cache_max_age))),
            parser: Arc::new(FeedParser::default()),
            cache_control: config.cache_control().into(),
        }
    }

    /// Returns the feed source.
    pub fn source(&self) -> &dyn FeedSource {
        self.source.as_ref()
    }

    /// Returns the parser used by the events endpoint.
    pub fn parser(&self) -> &FeedParser {
        &self.parser
    }

    /// `Cache-Control` header value for successful responses.
    pub fn cache_control(&self) -> &str {
        &self.cache_control
    }

    /// Returns the feed text, from the cache when still fresh.
    ///
    /// Failed fetches are not cached.
    pub async fn feed_text(&self) -> FeedResult<Arc<str>> {
        let mut cache = self.cache.lock().await;

        if let Some(entry) = cache.get_valid() {
            debug!(fetched_at = %entry.fetched_at, "Serving cached feed");
            return Ok(Arc::clone(&entry.text));
        }

        let text = self.source.fetch_feed_text().await?;
        info!(
            source = self.source.name(),
            bytes = text.len(),
            "Fetched upstream feed"
        );
        Ok(cache.insert(text))
    }

    /// Drops the cached feed so the next request goes upstream.
    pub async fn invalidate(&self) {
        self.cache.lock().await.clear();
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("source", &self.source.location())
            .field("cache_control", &self.cache_control)
            .finish_non_exhaustive()
    }
}
