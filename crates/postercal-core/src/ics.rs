//! ICS feed parsing.
//!
//! This module turns raw feed text into [`Event`]s in three steps:
//!
//! 1. [`unfold`] joins continuation lines (a line break followed by a space
//!    or tab) in a single pass over the whole text.
//! 2. [`tokenize`] groups the logical lines between `BEGIN:VEVENT` and
//!    `END:VEVENT` into [`RawRecord`]s.
//! 3. [`FeedParser::normalize`] maps each record to an [`Event`], converting
//!    dates and guessing a poster.
//!
//! Only a small subset of RFC 5545 is understood. Parsing never fails: bad
//! fields degrade to defaults and are reported as [`FieldWarning`]s.

use std::borrow::Cow;
use std::fmt;
use std::sync::LazyLock;

use chrono::Local;
use regex::Regex;
use tracing::{debug, warn};

use crate::event::{Event, RawRecord, UNTITLED};
use crate::poster::PosterExtractor;
use crate::time::{DateConverter, NaiveLocalConverter};

/// A line break followed by one folding whitespace character.
static FOLD_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r?\n[ \t]").expect("Invalid fold regex"));

const BEGIN_EVENT: &str = "BEGIN:VEVENT";
const END_EVENT: &str = "END:VEVENT";

/// Joins folded continuation lines.
///
/// Each line break (`\n` or `\r\n`) immediately followed by a space or tab is
/// removed together with that single whitespace character.
pub fn unfold(text: &str) -> Cow<'_, str> {
    FOLD_REGEX.replace_all(text, "")
}

/// Splits unfolded text into logical lines, accepting `\n` and `\r\n`.
pub fn logical_lines(unfolded: &str) -> impl Iterator<Item = &str> {
    unfolded
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
}

/// Splits a content line into its base field name and value.
///
/// The name is cut at the first `;` (dropping parameters) and uppercased.
/// Returns `None` for lines without a `:`.
pub fn split_content_line(line: &str) -> Option<(String, &str)> {
    let (key, value) = line.split_once(':')?;
    let name = key.split(';').next().unwrap_or(key);
    Some((name.to_ascii_uppercase(), value))
}

/// Result of grouping feed lines into event blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tokenized {
    /// One record per terminated `VEVENT` block, in feed order.
    pub records: Vec<RawRecord>,
    /// Number of blocks discarded because they were never terminated.
    pub dropped_blocks: usize,
}

/// Groups the lines of an ICS text into one [`RawRecord`] per `VEVENT`.
///
/// Lines outside a block are ignored, a stray `END:VEVENT` is ignored, and a
/// block that is not terminated (or is interrupted by another
/// `BEGIN:VEVENT`) is dropped.
pub fn tokenize(text: &str) -> Tokenized {
    let unfolded = unfold(text);
    let mut tokenized = Tokenized::default();
    let mut current: Option<RawRecord> = None;

    for raw_line in logical_lines(&unfolded) {
        let line = raw_line.trim();

        if line == BEGIN_EVENT {
            if current.replace(RawRecord::new()).is_some() {
                tokenized.dropped_blocks += 1;
            }
        } else if line == END_EVENT {
            if let Some(record) = current.take() {
                tokenized.records.push(record);
            }
        } else if let Some(record) = current.as_mut() {
            if let Some((name, value)) = split_content_line(line) {
                record.append(name, value);
            }
        }
    }

    if current.is_some() {
        tokenized.dropped_blocks += 1;
    }

    tokenized
}

/// A soft, field-level anomaly found while normalizing an event.
///
/// Warnings never stop parsing; the affected field falls back to its default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldWarning {
    /// The event had no `SUMMARY`; the title defaulted to "Untitled".
    MissingSummary { event: usize },
    /// The event had no `DTSTART`; it is kept but cannot be placed on a day.
    MissingStart { event: usize },
    /// A date field could not be parsed.
    UnparseableDate {
        event: usize,
        field: &'static str,
        raw: String,
    },
    /// A `VEVENT` block was never terminated and produced no event.
    UnterminatedBlock,
}

impl fmt::Display for FieldWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSummary { event } => write!(f, "event #{}: missing SUMMARY", event),
            Self::MissingStart { event } => write!(f, "event #{}: missing DTSTART", event),
            Self::UnparseableDate { event, field, raw } => {
                write!(f, "event #{}: unparseable {} '{}'", event, field, raw)
            }
            Self::UnterminatedBlock => write!(f, "unterminated VEVENT block dropped"),
        }
    }
}

/// Events parsed from one feed, with the warnings raised along the way.
#[derive(Debug, Clone, Default)]
pub struct ParsedFeed {
    /// Normalized events in feed order.
    pub events: Vec<Event>,
    /// Field-level anomalies.
    pub warnings: Vec<FieldWarning>,
}

/// Parses feed text into events using a [`DateConverter`] and a
/// [`PosterExtractor`].
#[derive(Debug)]
pub struct FeedParser<C = NaiveLocalConverter<Local>> {
    converter: C,
    posters: PosterExtractor,
}

impl Default for FeedParser {
    fn default() -> Self {
        Self::new(NaiveLocalConverter::default())
    }
}

impl<C: DateConverter> FeedParser<C> {
    /// Creates a parser with the default poster strategies.
    pub fn new(converter: C) -> Self {
        Self {
            converter,
            posters: PosterExtractor::default(),
        }
    }

    /// Builder: replace the poster strategies.
    pub fn with_posters(mut self, posters: PosterExtractor) -> Self {
        self.posters = posters;
        self
    }

    /// Returns the date converter.
    pub fn converter(&self) -> &C {
        &self.converter
    }

    /// Parses feed text into events.
    pub fn parse(&self, text: &str) -> Vec<Event> {
        self.parse_with_warnings(text).events
    }

    /// Parses feed text into events and collects field warnings.
    pub fn parse_with_warnings(&self, text: &str) -> ParsedFeed {
        let tokenized = tokenize(text);
        let mut warnings = Vec::new();

        if tokenized.dropped_blocks > 0 {
            warn!(
                dropped = tokenized.dropped_blocks,
                "Dropped unterminated VEVENT blocks"
            );
            warnings.extend(
                std::iter::repeat_n(FieldWarning::UnterminatedBlock, tokenized.dropped_blocks),
            );
        }

        let events = tokenized
            .records
            .iter()
            .enumerate()
            .map(|(index, record)| self.normalize_record(index, record, &mut warnings))
            .collect::<Vec<_>>();

        debug!(
            events = events.len(),
            warnings = warnings.len(),
            "Parsed ICS feed"
        );

        ParsedFeed { events, warnings }
    }

    /// Maps one record to an event.
    pub fn normalize(&self, record: &RawRecord) -> Event {
        self.normalize_record(0, record, &mut Vec::new())
    }

    fn normalize_record(
        &self,
        index: usize,
        record: &RawRecord,
        warnings: &mut Vec<FieldWarning>,
    ) -> Event {
        let title = match record.get("SUMMARY").map(str::trim) {
            Some(summary) if !summary.is_empty() => summary.to_string(),
            _ => {
                warnings.push(FieldWarning::MissingSummary { event: index });
                UNTITLED.to_string()
            }
        };
        let description = record
            .get("DESCRIPTION")
            .map(unescape_newlines)
            .unwrap_or_default();
        let url = record.get("URL").unwrap_or_default().trim().to_string();
        let location = record
            .get("LOCATION")
            .unwrap_or_default()
            .trim()
            .to_string();

        let start_raw = record.get("DTSTART").map(str::to_string);
        let end_raw = record.get("DTEND").map(str::to_string);

        if start_raw.is_none() {
            warnings.push(FieldWarning::MissingStart { event: index });
        }
        let start_date = self.convert_date(index, "DTSTART", start_raw.as_deref(), warnings);
        let end_date = self.convert_date(index, "DTEND", end_raw.as_deref(), warnings);

        let poster = self.posters.extract(&description, &url);

        let event = Event {
            title,
            description,
            url,
            location,
            poster,
            start_raw,
            end_raw,
            start_date,
            end_date,
        };

        debug!(
            index,
            title = %event.title,
            start = ?event.start_date,
            poster = ?event.poster,
            "Normalized event"
        );

        event
    }

    fn convert_date(
        &self,
        index: usize,
        field: &'static str,
        raw: Option<&str>,
        warnings: &mut Vec<FieldWarning>,
    ) -> Option<chrono::DateTime<chrono::Utc>> {
        let raw = raw?;
        let converted = self.converter.to_instant(raw);
        if converted.is_none() {
            debug!(index, field, raw, "Unparseable date");
            warnings.push(FieldWarning::UnparseableDate {
                event: index,
                field,
                raw: raw.to_string(),
            });
        }
        converted
    }
}

/// Replaces every literal `\n` escape with a real line break.
fn unescape_newlines(value: &str) -> String {
    value.replace("\\n", "\n")
}

/// Parses feed text with the process-local timezone and default poster
/// strategies.
pub fn parse_feed(text: &str) -> Vec<Event> {
    let parser: FeedParser = FeedParser::default();
    parser.parse(text)
}
