//! Event types for calendar feeds.
//!
//! This module provides the two record shapes the parser works with:
//! - [`RawRecord`]: the fields of one `VEVENT` block, exactly as tokenized
//! - [`Event`]: the normalized, display-ready event

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Title used when a block has no `SUMMARY`.
pub const UNTITLED: &str = "Untitled";

/// The fields of one `VEVENT` block.
///
/// Field names are stored uppercased and without parameters (`DTSTART;VALUE=DATE`
/// is stored as `DTSTART`). Insertion order is preserved. Repeated fields are
/// joined with a newline in order of appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    fields: Vec<(String, String)>,
}

impl RawRecord {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value for the given field name.
    ///
    /// If the field already exists with a non-empty value, the new value is
    /// joined to it with `\n`.
    pub fn append(&mut self, name: impl Into<String>, value: impl AsRef<str>) {
        let name = name.into().to_ascii_uppercase();
        let value = value.as_ref();

        if let Some((_, existing)) = self.fields.iter_mut().find(|(n, _)| *n == name) {
            if !existing.is_empty() {
                existing.push('\n');
            }
            existing.push_str(value);
        } else {
            self.fields.push((name, value.to_string()));
        }
    }

    /// Returns the value of a field, if present.
    ///
    /// The lookup is case-insensitive.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Iterates over the fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Number of distinct fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the record holds no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A normalized calendar event.
///
/// `title` is always set. `start_date` is `None` when the feed had no usable
/// `DTSTART`; such events are kept in the event list but never indexed by day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Event title (`SUMMARY`), trimmed.
    pub title: String,
    /// Description with escaped `\n` sequences turned into line breaks.
    pub description: String,
    /// Event URL, trimmed; empty if absent.
    pub url: String,
    /// Event location, trimmed; empty if absent.
    pub location: String,
    /// Poster image URL, if one could be derived.
    pub poster: Option<String>,
    /// `DTSTART` exactly as found in the feed.
    pub start_raw: Option<String>,
    /// `DTEND` exactly as found in the feed.
    pub end_raw: Option<String>,
    /// Parsed start instant.
    pub start_date: Option<DateTime<Utc>>,
    /// Parsed end instant.
    pub end_date: Option<DateTime<Utc>>,
}

impl Event {
    /// Creates an event with the given title and every other field empty.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            url: String::new(),
            location: String::new(),
            poster: None,
            start_raw: None,
            end_raw: None,
            start_date: None,
            end_date: None,
        }
    }

    /// Builder: set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Builder: set the URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Builder: set the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Builder: set the poster URL.
    pub fn with_poster(mut self, poster: impl Into<String>) -> Self {
        self.poster = Some(poster.into());
        self
    }

    /// Builder: set the start instant.
    pub fn with_start(mut self, start: DateTime<Utc>) -> Self {
        self.start_date = Some(start);
        self
    }

    /// Builder: set the end instant.
    pub fn with_end(mut self, end: DateTime<Utc>) -> Self {
        self.end_date = Some(end);
        self
    }

    /// Returns `true` if the event can be placed on a calendar day.
    pub fn is_dated(&self) -> bool {
        self.start_date.is_some()
    }

    /// Returns `true` if a poster URL was derived for this event.
    pub fn has_poster(&self) -> bool {
        self.poster.is_some()
    }
}
