//! Feed proxy: relays the upstream ICS feed with permissive CORS.
//!
//! Browsers cannot read most calendar feeds directly because the feed host
//! sends no CORS headers. This crate serves the feed from the same origin
//! as the calendar page (or from anywhere, with `Access-Control-Allow-Origin: *`):
//! - in-memory caching of the upstream body for `max-age` seconds
//! - one upstream request in flight at a time
//! - a parsed JSON view of the events
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use postercal_feed::{FeedConfig, HttpFeedSource};
//! use postercal_server::{ServerConfig, serve};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = HttpFeedSource::new(FeedConfig::from_env()?)?;
//!     serve(ServerConfig::default(), Arc::new(source)).await?;
//!     Ok(())
//! }
//! ```

mod cache;
mod config;
mod error;
mod routes;
mod signals;
mod state;

use std::sync::Arc;

use postercal_feed::FeedSource;
use tokio::net::TcpListener;
use tracing::info;

pub use cache::{CacheEntry, FeedCache};
pub use config::{DEFAULT_CACHE_MAX_AGE_SECS, DEFAULT_PORT, ServerConfig};
pub use error::{ProxyError, ServerError, ServerResult};
pub use routes::{CALENDAR_CONTENT_TYPE, EventsResponse, ICS_PATH, LEGACY_ICS_PATH, router};
pub use signals::shutdown_signal;
pub use state::AppState;

/// Runs the proxy until Ctrl+C or SIGTERM.
///
/// On Unix, SIGHUP drops the cached feed.
pub async fn serve(config: ServerConfig, source: Arc<dyn FeedSource>) -> ServerResult<()> {
    let state = AppState::new(source, &config);
    signals::spawn_reload_listener(state.clone());

    let listener = TcpListener::bind(config.bind)
        .await
        .map_err(|e| ServerError::bind(config.bind, e))?;

    info!(
        addr = %listener.local_addr()?,
        source = %state.source().location(),
        max_age_secs = config.cache_max_age.as_secs(),
        "Feed proxy listening"
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Feed proxy stopped");
    Ok(())
}
