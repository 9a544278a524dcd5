//! Feed retrieval for postercal.
//!
//! - [`FeedSource`]: the trait every feed source implements
//! - [`HttpFeedSource`]: GET on the configured upstream URL
//! - [`FileFeedSource`]: a local `.ics` file
//! - [`FeedError`]: `Config` and `Upstream` failures
//!
//! ```text
//! ┌───────────────┐   ┌───────────────┐
//! │ upstream .ics │   │  local file   │
//! └───────┬───────┘   └───────┬───────┘
//!         ▼                   ▼
//! ┌───────────────┐   ┌───────────────┐
//! │HttpFeedSource │   │FileFeedSource │
//! └───────┬───────┘   └───────┬───────┘
//!         └──── FeedSource ───┘
//!                   │ fetch_feed_text()
//!                   ▼
//!            ┌─────────────┐
//!            │ FeedParser  │  (postercal-core)
//!            └─────────────┘
//! ```

pub mod config;
pub mod error;
pub mod source;

pub use config::{FeedConfig, URL_ENV};
pub use error::{FeedError, FeedErrorCode, FeedResult, MISSING_URL_MESSAGE};
#[cfg(feature = "http")]
pub use source::HttpFeedSource;
pub use source::{BoxFuture, FeedSource, FileFeedSource};

use postercal_core::{DateConverter, FeedParser, ParsedFeed};
use tracing::info;

/// Fetches the feed from `source` and parses it.
///
/// Parse anomalies end up in [`ParsedFeed::warnings`]; only retrieval fails.
pub async fn fetch_and_parse<C: DateConverter>(
    source: &dyn FeedSource,
    parser: &FeedParser<C>,
) -> FeedResult<ParsedFeed> {
    let text = source.fetch_feed_text().await?;
    let parsed = parser.parse_with_warnings(&text);
    info!(
        source = source.name(),
        events = parsed.events.len(),
        warnings = parsed.warnings.len(),
        "Loaded feed"
    );
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use postercal_core::NaiveLocalConverter;
    use std::io::Write;

    #[tokio::test]
    async fn fetch_and_parse_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "BEGIN:VEVENT\nSUMMARY:Friday Night\nDTSTART:20240315T200000Z\nEND:VEVENT\nBEGIN:VEVENT\nDTSTART:garbage\nEND:VEVENT\n"
        )
        .unwrap();

        let source = FileFeedSource::new(file.path());
        let parser = FeedParser::new(NaiveLocalConverter::new(Utc));
        let parsed = fetch_and_parse(&source, &parser).await.unwrap();

        assert_eq!(parsed.events.len(), 2);
        assert_eq!(parsed.events[0].title, "Friday Night");
        assert_eq!(parsed.events[1].title, "Untitled");
        assert!(!parsed.warnings.is_empty());
    }

    #[tokio::test]
    async fn fetch_failure_propagates() {
        let source = FileFeedSource::new("/nonexistent/postercal/feed.ics");
        let parser = FeedParser::new(NaiveLocalConverter::new(Utc));
        let err = fetch_and_parse(&source, &parser).await.unwrap_err();
        assert_eq!(err.code(), FeedErrorCode::Upstream);
    }
}
