//! Feed source construction and event loading.

use std::sync::Arc;
use std::time::Duration;

use postercal_core::{Event, FeedParser};
use postercal_feed::{FeedConfig, FeedSource, FileFeedSource, HttpFeedSource, fetch_and_parse};
use tracing::debug;

use crate::config::FeedLocation;
use crate::error::{ClientError, ClientResult};

/// Builds the feed source for a resolved location.
pub fn build_source(location: &FeedLocation, timeout: Duration) -> ClientResult<Arc<dyn FeedSource>> {
    match location {
        FeedLocation::File(path) => Ok(Arc::new(FileFeedSource::new(path.clone()))),
        FeedLocation::Url(url) => {
            let config = FeedConfig::default()
                .with_url(url.clone())
                .with_timeout(timeout);
            Ok(Arc::new(HttpFeedSource::new(config)?))
        }
        FeedLocation::Unconfigured => {
            let config = FeedConfig::default().with_timeout(timeout);
            Ok(Arc::new(HttpFeedSource::new(config)?))
        }
    }
}

/// Fetches and parses the feed in the process-local timezone.
pub async fn load_events(source: &dyn FeedSource) -> ClientResult<Vec<Event>> {
    let parser: FeedParser = FeedParser::default();
    let parsed = fetch_and_parse(source, &parser)
        .await
        .map_err(ClientError::Feed)?;

    for warning in &parsed.warnings {
        debug!(warning = %warning, "Feed warning");
    }
    Ok(parsed.events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use url::Url;

    #[test]
    fn sources_by_location() {
        let timeout = Duration::from_secs(5);

        let file = build_source(&FeedLocation::File(PathBuf::from("feed.ics")), timeout).unwrap();
        assert_eq!(file.name(), "file");
        assert_eq!(file.location(), "feed.ics");

        let url = Url::parse("https://x.test/feed.ics").unwrap();
        let http = build_source(&FeedLocation::Url(url), timeout).unwrap();
        assert_eq!(http.name(), "http");
        assert_eq!(http.location(), "https://x.test/feed.ics");

        let unconfigured = build_source(&FeedLocation::Unconfigured, timeout).unwrap();
        assert_eq!(unconfigured.location(), "<unconfigured>");
    }

    #[tokio::test]
    async fn loads_events_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "BEGIN:VEVENT\r\nSUMMARY:Friday Night\r\nDTSTART:20240315T200000Z\r\nEND:VEVENT\r\n"
        )
        .unwrap();

        let source = build_source(
            &FeedLocation::File(file.path().to_path_buf()),
            Duration::from_secs(5),
        )
        .unwrap();
        let events = load_events(source.as_ref()).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Friday Night");
    }

    #[tokio::test]
    async fn unconfigured_feed_reports_missing_url() {
        let source = build_source(&FeedLocation::Unconfigured, Duration::from_secs(5)).unwrap();
        let err = load_events(source.as_ref()).await.unwrap_err();
        assert!(matches!(err, ClientError::Feed(ref e) if e.is_config()));
    }
}
