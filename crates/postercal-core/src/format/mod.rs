//! Output formatting for month views and events.
//!
//! This module provides formatters for displaying the calendar in various output formats:
//! - **TTY**: an agenda of the month, a compact day grid, or one event's details
//! - **JSON**: serializable structs for web renderers and scripts
//!
//! Every method has an `_in` variant taking the viewer timezone; the plain
//! variant uses the process-local timezone.
//!
//! # Example
//!
//! ```rust
//! use chrono::{NaiveDate, Utc};
//! use postercal_core::format::{FormatOptions, OutputFormatter};
//! use postercal_core::{DayIndex, FeedParser, MonthView, NaiveLocalConverter};
//!
//! let feed = "BEGIN:VEVENT\nSUMMARY:Friday Night\nDTSTART:20240315T200000Z\nEND:VEVENT";
//! let converter = NaiveLocalConverter::new(Utc);
//! let events = FeedParser::new(converter.clone()).parse(feed);
//! let index = DayIndex::build_with(&events, &converter);
//! let view = MonthView::build(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), &index);
//!
//! let formatter = OutputFormatter::new(FormatOptions::default());
//! let agenda = formatter.format_month_in(&view, &Utc);
//! assert!(agenda.contains("Friday Night"));
//! ```


use std::borrow::Cow;
use std::fmt;

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar::{DayCell, EventTag, MonthView, WEEKDAY_LABELS};
use crate::event::Event;
use crate::time::is_date_only;

/// Text shown in the detail view when an event has no description.
pub const NO_DETAILS_TEXT: &str = "Details to be announced.";

/// The output format for calendar display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Human-readable terminal output.
    #[default]
    Tty,
    /// Machine-readable JSON output.
    Json,
}

/// Time format preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeFormat {
    /// 24-hour clock (`20:00`).
    #[default]
    H24,
    /// 12-hour clock (`8:00 PM`).
    H12,
}

/// Configuration options for output formatting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatOptions {
    /// Maximum length for event titles (truncated with ellipsis).
    pub max_title_length: Option<usize>,
    /// Text shown in place of a missing poster.
    pub placeholder: String,
    /// Text shown when the month has no events.
    pub empty_text: String,
    /// Whether to wrap titles in OSC8 hyperlinks to the event URL.
    pub hyperlinks: bool,
    /// Clock format for start times.
    pub time_format: TimeFormat,
    /// Closing note appended to every detail view, e.g. admission terms.
    #[serde(default)]
    pub detail_note: Option<String>,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            max_title_length: None,
            placeholder: "TPC".to_string(),
            empty_text: "No screenings this month.".to_string(),
            hyperlinks: false,
            time_format: TimeFormat::H24,
            detail_note: None,
        }
    }
}

/// A single event in JSON format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonEvent {
    pub title: String,
    pub description: String,
    pub url: String,
    pub location: String,
    pub poster: Option<String>,
    pub tag: String,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub start_raw: Option<String>,
    pub end_raw: Option<String>,
    pub all_day: bool,
    /// Local start time, formatted (`None` for all-day or undated events).
    pub time_display: Option<String>,
}

/// One day of a month in JSON format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonDay {
    pub key: String,
    pub date: NaiveDate,
    pub in_month: bool,
    pub events: Vec<JsonEvent>,
}

/// A month view in JSON format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonMonth {
    pub title: String,
    pub year: i32,
    pub month: u32,
    pub days: Vec<JsonDay>,
}

/// Output formatter for month views and events.
#[derive(Debug, Clone)]
pub struct OutputFormatter {
    options: FormatOptions,
}

impl OutputFormatter {
    /// Creates a new formatter with the given options.
    pub fn new(options: FormatOptions) -> Self {
        Self { options }
    }

    /// Creates a formatter with default options.
    pub fn with_defaults() -> Self {
        Self::new(FormatOptions::default())
    }

    /// Returns the formatting options.
    pub fn options(&self) -> &FormatOptions {
        &self.options
    }

    /// Formats the month as an agenda in the local timezone.
    pub fn format_month(&self, view: &MonthView<'_>) -> String {
        self.format_month_in(view, &Local)
    }

    /// Formats the month as an agenda: one line per event of the displayed
    /// month, grouped by day.
    pub fn format_month_in<Tz: TimeZone<Offset: fmt::Display>>(
        &self,
        view: &MonthView<'_>,
        tz: &Tz,
    ) -> String {
        let mut lines = vec![view.title()];

        let mut any = false;
        for cell in view.busy_days() {
            any = true;
            for (position, placed) in cell.events.iter().enumerate() {
                let day_label = if position == 0 {
                    cell.date.format("%a %d").to_string()
                } else {
                    String::new()
                };
                let time = self
                    .time_display(placed.event, tz)
                    .unwrap_or_else(|| "all-day".to_string());
                let poster = placed
                    .event
                    .poster
                    .as_deref()
                    .unwrap_or(&self.options.placeholder);

                lines.push(format!(
                    "{:<7}{:<9}[{}] {}  {}",
                    day_label,
                    time,
                    placed.tag.as_str(),
                    self.title(placed.event),
                    poster
                ));
            }
        }

        if !any {
            lines.push(self.options.empty_text.clone());
        }

        lines.join("\n")
    }

    /// Formats the month as a compact 7-column grid.
    ///
    /// Days with events are marked with `*`; days outside the month are blank.
    pub fn format_grid(&self, view: &MonthView<'_>) -> String {
        let mut lines = vec![view.title(), WEEKDAY_LABELS.join(" ")];

        for week in view.weeks() {
            let row: String = week.iter().map(grid_cell).collect::<Vec<_>>().join("");
            lines.push(row.trim_end().to_string());
        }

        lines.join("\n")
    }

    /// Formats a flat list of events in the local timezone.
    pub fn format_events(&self, events: &[Event]) -> String {
        self.format_events_in(events, &Local)
    }

    /// Formats a flat list of events, undated ones included.
    pub fn format_events_in<Tz: TimeZone<Offset: fmt::Display>>(
        &self,
        events: &[Event],
        tz: &Tz,
    ) -> String {
        if events.is_empty() {
            return self.options.empty_text.clone();
        }

        events
            .iter()
            .map(|event| {
                let when = match event.start_date {
                    Some(start) => {
                        let date = start.with_timezone(tz).format("%Y-%m-%d").to_string();
                        match self.time_display(event, tz) {
                            Some(time) => format!("{} {}", date, time),
                            None => format!("{} all-day", date),
                        }
                    }
                    None => "undated".to_string(),
                };
                format!(
                    "{:<19}[{}] {}",
                    when,
                    EventTag::classify(&event.title).as_str(),
                    self.title(event)
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Formats one event's detail view in the local timezone.
    pub fn format_detail(&self, event: &Event) -> String {
        self.format_detail_in(event, &Local)
    }

    /// Formats one event's detail view: title, date, poster, location, link
    /// and description.
    pub fn format_detail_in<Tz: TimeZone<Offset: fmt::Display>>(
        &self,
        event: &Event,
        tz: &Tz,
    ) -> String {
        let mut lines = vec![event.title.clone()];

        let date_line = match event.start_date {
            Some(start) => {
                let day = start.with_timezone(tz).format("%A, %b %-d").to_string();
                match self.time_display(event, tz) {
                    Some(time) => format!("{} at {}", day, time),
                    None => day,
                }
            }
            None => "Date to be announced".to_string(),
        };
        lines.push(date_line);

        match event.poster {
            Some(ref poster) => lines.push(format!("Poster: {}", poster)),
            None => lines.push(format!("Poster: [{}]", self.options.placeholder)),
        }
        if !event.location.is_empty() {
            lines.push(format!("Location: {}", event.location));
        }
        if !event.url.is_empty() {
            lines.push(format!("Link: {}", event.url));
        }

        lines.push(String::new());
        if event.description.trim().is_empty() {
            lines.push(NO_DETAILS_TEXT.to_string());
        } else {
            lines.push(event.description.clone());
        }
        if let Some(ref note) = self.options.detail_note {
            lines.push(String::new());
            lines.push(note.clone());
        }

        lines.join("\n")
    }

    /// Converts a month view to its JSON form in the local timezone.
    pub fn json_month(&self, view: &MonthView<'_>) -> JsonMonth {
        self.json_month_in(view, &Local)
    }

    /// Converts a month view to its JSON form.
    pub fn json_month_in<Tz: TimeZone<Offset: fmt::Display>>(
        &self,
        view: &MonthView<'_>,
        tz: &Tz,
    ) -> JsonMonth {
        JsonMonth {
            title: view.title(),
            year: view.year,
            month: view.month,
            days: view
                .cells
                .iter()
                .map(|cell| JsonDay {
                    key: cell.key.clone(),
                    date: cell.date,
                    in_month: cell.in_month,
                    events: cell
                        .events
                        .iter()
                        .map(|placed| self.json_event_in(placed.event, tz))
                        .collect(),
                })
                .collect(),
        }
    }

    /// Converts an event to its JSON form.
    pub fn json_event_in<Tz: TimeZone<Offset: fmt::Display>>(
        &self,
        event: &Event,
        tz: &Tz,
    ) -> JsonEvent {
        JsonEvent {
            title: event.title.clone(),
            description: event.description.clone(),
            url: event.url.clone(),
            location: event.location.clone(),
            poster: event.poster.clone(),
            tag: EventTag::classify(&event.title).as_str().to_string(),
            start: event.start_date,
            end: event.end_date,
            start_raw: event.start_raw.clone(),
            end_raw: event.end_raw.clone(),
            all_day: is_all_day(event),
            time_display: self.time_display(event, tz),
        }
    }

    /// Local start time of an event, or `None` for all-day and undated events.
    fn time_display<Tz: TimeZone<Offset: fmt::Display>>(
        &self,
        event: &Event,
        tz: &Tz,
    ) -> Option<String> {
        if is_all_day(event) {
            return None;
        }
        let local = event.start_date?.with_timezone(tz);
        let pattern = match self.options.time_format {
            TimeFormat::H24 => "%H:%M",
            TimeFormat::H12 => "%-I:%M %p",
        };
        Some(local.format(pattern).to_string())
    }

    fn title<'e>(&self, event: &'e Event) -> Cow<'e, str> {
        let title = match self.options.max_title_length {
            Some(max) => ellipsis(&event.title, max),
            None => Cow::Borrowed(event.title.as_str()),
        };
        if self.options.hyperlinks && !event.url.is_empty() {
            Cow::Owned(make_hyperlink(&event.url, &title))
        } else {
            title
        }
    }
}

fn grid_cell(cell: &DayCell<'_>) -> String {
    if !cell.in_month {
        return "    ".to_string();
    }
    let mark = if cell.events.is_empty() { ' ' } else { '*' };
    format!("{:>3}{}", cell.date.format("%-d"), mark)
}

/// Returns `true` if the event starts on a date-only value.
fn is_all_day(event: &Event) -> bool {
    event.start_raw.as_deref().is_some_and(is_date_only)
}

/// Truncates a string with ellipsis if it exceeds the given length.
pub fn ellipsis(s: &str, max_len: usize) -> Cow<'_, str> {
    if max_len == 0 {
        return Cow::Borrowed("");
    }

    let char_count = s.chars().count();
    if char_count <= max_len {
        return Cow::Borrowed(s);
    }

    let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
    Cow::Owned(format!("{}...", truncated))
}

/// Creates an OSC8 hyperlink for terminal output.
pub fn make_hyperlink(url: &str, label: &str) -> String {
    format!("\x1b]8;;{}\x1b\\{}\x1b]8;;\x1b\\", url, label)
}

#[cfg(test)]
mod tests {
    use super::*;

    mod helpers {
        use super::*;

        #[test]
        fn ellipsis_short_string_untouched() {
            assert_eq!(ellipsis("Friday", 10), "Friday");
            assert!(matches!(ellipsis("Friday", 6), Cow::Borrowed(_)));
        }

        #[test]
        fn ellipsis_truncates() {
            assert_eq!(ellipsis("Friday Night Double Feature", 12), "Friday Ni...");
        }

        #[test]
        fn ellipsis_zero() {
            assert_eq!(ellipsis("Friday", 0), "");
        }

        #[test]
        fn ellipsis_counts_chars() {
            assert_eq!(ellipsis("Café Noir Nights", 7), "Café...");
        }

        #[test]
        fn hyperlink_escape_sequence() {
            assert_eq!(
                make_hyperlink("https://x.test", "A"),
                "\x1b]8;;https://x.test\x1b\\A\x1b]8;;\x1b\\"
            );
        }

        #[test]
        fn all_day_detection() {
            let mut event = Event::new("A");
            assert!(!is_all_day(&event));
            event.start_raw = Some("20240316".to_string());
            assert!(is_all_day(&event));
            event.start_raw = Some("20240316T200000Z".to_string());
            assert!(!is_all_day(&event));
        }
    }

    mod options {
        use super::*;

        #[test]
        fn defaults() {
            let options = FormatOptions::default();
            assert_eq!(options.placeholder, "TPC");
            assert_eq!(options.time_format, TimeFormat::H24);
            assert!(options.max_title_length.is_none());
            assert!(!options.hyperlinks);
        }

        #[test]
        fn output_format_serde() {
            let json = serde_json::to_string(&OutputFormat::Json).unwrap();
            assert_eq!(json, "\"json\"");
            let parsed: OutputFormat = serde_json::from_str("\"tty\"").unwrap();
            assert_eq!(parsed, OutputFormat::Tty);
        }
    }
}
