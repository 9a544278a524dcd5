//! Poster image detection.
//!
//! Feeds carry no dedicated image field, so the poster URL is guessed from
//! free text. [`PosterExtractor`] runs an ordered list of [`PosterMatcher`]
//! strategies and keeps the first hit:
//!
//! 1. [`PosterMarker`]: an explicit `Poster: <url>` line in the description
//! 2. [`ImageLink`]: the first image link (`.jpg`, `.jpeg`, `.png`, `.webp`)
//!    in the description
//! 3. [`EventUrl`]: the event's own `URL` field, when it is http(s)
//!
//! # Example
//!
//! ```
//! use postercal_core::poster::extract_poster;
//!
//! let description = "Doors at 8.\nPoster: https://x.test/a.jpg";
//! assert_eq!(
//!     extract_poster(description, ""),
//!     Some("https://x.test/a.jpg".to_string())
//! );
//! ```

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

/// Regex for an explicit `Poster: <url>` marker.
static POSTER_MARKER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Poster\s*:\s*(https?://\S+)").expect("Invalid poster marker regex")
});

/// Regex for the first http(s) link ending in an image extension.
static IMAGE_LINK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)https?://\S+\.(?:jpg|jpeg|png|webp)").expect("Invalid image link regex")
});

/// A single poster detection strategy.
pub trait PosterMatcher: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Returns a poster URL if this strategy finds one.
    fn find(&self, description: &str, url: &str) -> Option<String>;
}

/// Matches `Poster: https://...` anywhere in the description.
#[derive(Debug, Default, Clone, Copy)]
pub struct PosterMarker;

impl PosterMatcher for PosterMarker {
    fn name(&self) -> &'static str {
        "poster_marker"
    }

    fn find(&self, description: &str, _url: &str) -> Option<String> {
        POSTER_MARKER_REGEX
            .captures(description)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
    }
}

/// Matches the first image link in the description.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageLink;

impl PosterMatcher for ImageLink {
    fn name(&self) -> &'static str {
        "image_link"
    }

    fn find(&self, description: &str, _url: &str) -> Option<String> {
        IMAGE_LINK_REGEX
            .find(description)
            .map(|m| m.as_str().to_string())
    }
}

/// Falls back to the event URL when it is a well-formed http(s) URL.
#[derive(Debug, Default, Clone, Copy)]
pub struct EventUrl;

impl PosterMatcher for EventUrl {
    fn name(&self) -> &'static str {
        "event_url"
    }

    fn find(&self, _description: &str, url: &str) -> Option<String> {
        let parsed = Url::parse(url).ok()?;
        matches!(parsed.scheme(), "http" | "https").then(|| url.to_string())
    }
}

/// Ordered list of poster strategies; the first match wins.
pub struct PosterExtractor {
    matchers: Vec<Box<dyn PosterMatcher>>,
}

impl Default for PosterExtractor {
    fn default() -> Self {
        Self::new()
            .with_matcher(PosterMarker)
            .with_matcher(ImageLink)
            .with_matcher(EventUrl)
    }
}

impl fmt::Debug for PosterExtractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.matchers.iter().map(|m| m.name()))
            .finish()
    }
}

impl PosterExtractor {
    /// Creates an extractor with no strategies.
    pub fn new() -> Self {
        Self {
            matchers: Vec::new(),
        }
    }

    /// Builder: append a strategy at the lowest priority.
    pub fn with_matcher(mut self, matcher: impl PosterMatcher + 'static) -> Self {
        self.matchers.push(Box::new(matcher));
        self
    }

    /// Names of the strategies in priority order.
    pub fn matcher_names(&self) -> Vec<&'static str> {
        self.matchers.iter().map(|m| m.name()).collect()
    }

    /// Runs the strategies in order and returns the first poster found.
    pub fn extract(&self, description: &str, url: &str) -> Option<String> {
        self.matchers.iter().find_map(|matcher| {
            let found = matcher.find(description, url);
            if let Some(ref poster) = found {
                tracing::trace!(matcher = matcher.name(), poster = %poster, "Poster matched");
            }
            found
        })
    }
}

/// Runs the default strategy list.
///
/// See [`PosterExtractor`] for the order.
pub fn extract_poster(description: &str, url: &str) -> Option<String> {
    static DEFAULT: LazyLock<PosterExtractor> = LazyLock::new(PosterExtractor::default);
    DEFAULT.extract(description, url)
}

#[cfg(test)]
mod tests {
    use super::*;

    mod marker {
        use super::*;

        #[test]
        fn finds_marker() {
            let found = PosterMarker.find("Poster: https://x.test/a.jpg", "");
            assert_eq!(found, Some("https://x.test/a.jpg".to_string()));
        }

        #[test]
        fn case_insensitive_and_loose_spacing() {
            let found = PosterMarker.find("details\nPOSTER :   http://x.test/poster", "");
            assert_eq!(found, Some("http://x.test/poster".to_string()));
        }

        #[test]
        fn stops_at_whitespace() {
            let found = PosterMarker.find("Poster: https://x.test/a.jpg and more", "");
            assert_eq!(found, Some("https://x.test/a.jpg".to_string()));
        }

        #[test]
        fn ignores_non_http_schemes() {
            assert_eq!(PosterMarker.find("Poster: ftp://x.test/a.jpg", ""), None);
        }
    }

    mod image_link {
        use super::*;

        #[test]
        fn finds_first_image() {
            let text = "See https://x.test/page then https://x.test/b.PNG and https://x.test/c.jpg";
            assert_eq!(
                ImageLink.find(text, ""),
                Some("https://x.test/b.PNG".to_string())
            );
        }

        #[test]
        fn all_extensions() {
            for ext in ["jpg", "jpeg", "png", "webp"] {
                let text = format!("https://x.test/poster.{}", ext);
                assert_eq!(ImageLink.find(&text, ""), Some(text.clone()));
            }
        }

        #[test]
        fn ignores_other_links() {
            assert_eq!(ImageLink.find("https://x.test/poster.gif", ""), None);
            assert_eq!(ImageLink.find("no links here", ""), None);
        }
    }

    mod event_url {
        use super::*;

        #[test]
        fn accepts_http_and_https() {
            assert_eq!(
                EventUrl.find("", "https://x.test/event"),
                Some("https://x.test/event".to_string())
            );
            assert_eq!(
                EventUrl.find("", "http://x.test/event"),
                Some("http://x.test/event".to_string())
            );
        }

        #[test]
        fn rejects_other_values() {
            assert_eq!(EventUrl.find("", ""), None);
            assert_eq!(EventUrl.find("", "mailto:club@x.test"), None);
            assert_eq!(EventUrl.find("", "x.test/event"), None);
        }
    }

    mod extractor {
        use super::*;

        #[test]
        fn marker_wins_over_image_link() {
            let description = "https://x.test/other.png\nPoster: https://x.test/a.jpg";
            assert_eq!(
                extract_poster(description, "https://x.test/event"),
                Some("https://x.test/a.jpg".to_string())
            );
        }

        #[test]
        fn image_link_wins_over_url() {
            assert_eq!(
                extract_poster("https://x.test/b.webp", "https://x.test/event"),
                Some("https://x.test/b.webp".to_string())
            );
        }

        #[test]
        fn falls_back_to_url() {
            assert_eq!(
                extract_poster("no images", "https://x.test/event"),
                Some("https://x.test/event".to_string())
            );
        }

        #[test]
        fn nothing_found() {
            assert_eq!(extract_poster("", ""), None);
        }

        #[test]
        fn default_order() {
            let extractor = PosterExtractor::default();
            assert_eq!(
                extractor.matcher_names(),
                vec!["poster_marker", "image_link", "event_url"]
            );
        }

        #[test]
        fn custom_order() {
            let extractor = PosterExtractor::new()
                .with_matcher(EventUrl)
                .with_matcher(PosterMarker);
            assert_eq!(
                extractor.extract("Poster: https://x.test/a.jpg", "https://x.test/event"),
                Some("https://x.test/event".to_string())
            );
        }

        #[test]
        fn empty_extractor_finds_nothing() {
            assert_eq!(
                PosterExtractor::new().extract("Poster: https://x.test/a.jpg", ""),
                None
            );
        }
    }
}
