//! Feed sources.
//!
//! A [`FeedSource`] produces the raw ICS text of the calendar. Two sources
//! ship with the crate:
//! - [`HttpFeedSource`]: GET on the configured upstream URL
//! - [`FileFeedSource`]: a local `.ics` file, for offline use and tests

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use tracing::{debug, trace, warn};

use crate::error::{FeedError, FeedResult};

#[cfg(feature = "http")]
use crate::config::FeedConfig;
#[cfg(feature = "http")]
use reqwest::{Client, Response, header};

/// A boxed future for async trait methods.
///
/// Keeps [`FeedSource`] object-safe so callers can hold a `Box<dyn FeedSource>`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Something that can produce the feed text.
pub trait FeedSource: Send + Sync {
    /// Short name used in logs (`http`, `file`).
    fn name(&self) -> &str;

    /// Where the feed comes from, for display.
    fn location(&self) -> String;

    /// Retrieves the complete feed text.
    ///
    /// # Errors
    ///
    /// Returns a `Config` error when the source is not configured and an
    /// `Upstream` error when retrieval fails.
    fn fetch_feed_text(&self) -> BoxFuture<'_, FeedResult<String>>;
}

/// Fetches the feed over HTTP(S).
#[cfg(feature = "http")]
#[derive(Debug)]
pub struct HttpFeedSource {
    client: Client,
    config: FeedConfig,
}

#[cfg(feature = "http")]
impl HttpFeedSource {
    /// Creates a new HTTP source with the given configuration.
    ///
    /// An unconfigured URL is accepted here and reported on fetch.
    pub fn new(config: FeedConfig) -> FeedResult<Self> {
        let mut builder = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent);
        if !config.system_proxy {
            builder = builder.no_proxy();
        }
        let client = builder.build().map_err(|e| {
            FeedError::config(format!("Failed to create HTTP client: {}", e)).with_source(e)
        })?;

        Ok(Self { client, config })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    async fn fetch(&self) -> FeedResult<String> {
        let Some(ref url) = self.config.url else {
            warn!("Feed fetch attempted without a configured URL");
            return Err(FeedError::missing_url());
        };

        trace!(url = %url, "Requesting feed");

        let response = self
            .client
            .get(url.clone())
            .header(header::ACCEPT, "text/calendar, text/plain;q=0.9, */*;q=0.1")
            .send()
            .await
            .map_err(|e| {
                warn!(url = %url, error = %e, "Feed request failed");
                FeedError::upstream(format!("Request failed: {}", e)).with_source(e)
            })?;

        self.handle_response(response).await
    }

    /// Maps the upstream response to the feed text or a status error.
    async fn handle_response(&self, response: Response) -> FeedResult<String> {
        let status = response.status();
        trace!(status = %status, "Received response");

        if status.is_success() {
            let text = response.text().await.map_err(|e| {
                FeedError::upstream(format!("Failed to read response: {}", e)).with_source(e)
            })?;
            debug!(bytes = text.len(), "Fetched feed");
            return Ok(text);
        }

        let reason = status
            .canonical_reason()
            .map(str::to_string)
            .unwrap_or_else(|| status.as_str().to_string());
        warn!(status = %status, "Upstream returned an error status");
        Err(FeedError::upstream_status(status.as_u16(), reason))
    }
}

#[cfg(feature = "http")]
impl FeedSource for HttpFeedSource {
    fn name(&self) -> &str {
        "http"
    }

    fn location(&self) -> String {
        self.config
            .url_str()
            .unwrap_or("<unconfigured>")
            .to_string()
    }

    fn fetch_feed_text(&self) -> BoxFuture<'_, FeedResult<String>> {
        Box::pin(self.fetch())
    }
}

/// Reads the feed from a local file.
#[derive(Debug, Clone)]
pub struct FileFeedSource {
    path: PathBuf,
}

impl FileFeedSource {
    /// Creates a source reading the given file on every fetch.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> FeedResult<String> {
        let text = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            warn!(path = %self.path.display(), error = %e, "Failed to read feed file");
            FeedError::upstream(format!("Failed to read {}: {}", self.path.display(), e))
                .with_source(e)
        })?;
        debug!(path = %self.path.display(), bytes = text.len(), "Read feed file");
        Ok(text)
    }
}

impl FeedSource for FileFeedSource {
    fn name(&self) -> &str {
        "file"
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn fetch_feed_text(&self) -> BoxFuture<'_, FeedResult<String>> {
        Box::pin(self.read())
    }
}
