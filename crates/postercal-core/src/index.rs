//! Grouping of events by local calendar day.

use std::collections::BTreeMap;

use chrono::{Local, NaiveDate};

use crate::event::Event;
use crate::time::{DateConverter, NaiveLocalConverter};

/// Formats a calendar date as a day key (`YYYY-MM-DD`).
pub fn day_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Events grouped by the local date of their start.
///
/// Keys are `YYYY-MM-DD` strings; each day keeps its events in the order of
/// the input list. Events without a start date are not indexed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DayIndex<'a> {
    days: BTreeMap<String, Vec<&'a Event>>,
}

impl<'a> DayIndex<'a> {
    /// Builds the index in the process-local timezone.
    pub fn build(events: &'a [Event]) -> Self {
        Self::build_with(events, &NaiveLocalConverter::<Local>::default())
    }

    /// Builds the index using the converter's notion of a local date.
    pub fn build_with<C: DateConverter>(events: &'a [Event], converter: &C) -> Self {
        let mut days: BTreeMap<String, Vec<&'a Event>> = BTreeMap::new();

        for event in events {
            let Some(start) = event.start_date else {
                continue;
            };
            let key = day_key(converter.local_date(&start));
            days.entry(key).or_default().push(event);
        }

        Self { days }
    }

    /// Events starting on the day with the given key.
    pub fn get(&self, key: &str) -> &[&'a Event] {
        self.days.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Events starting on the given date.
    pub fn events_on(&self, date: NaiveDate) -> &[&'a Event] {
        self.get(&day_key(date))
    }

    /// Looks up an event for a detail view.
    ///
    /// Returns the first event of the day with exactly this title, or the
    /// first event of the day if none matches.
    pub fn find(&self, key: &str, title: &str) -> Option<&'a Event> {
        let events = self.get(key);
        events
            .iter()
            .find(|event| event.title == title)
            .or_else(|| events.first())
            .copied()
    }

    /// Returns `true` if the day has at least one event.
    pub fn contains(&self, key: &str) -> bool {
        self.days.contains_key(key)
    }

    /// Day keys in ascending order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.days.keys().map(String::as_str)
    }

    /// Iterates over days in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[&'a Event])> {
        self.days.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Number of days with events.
    pub fn len(&self) -> usize {
        self.days.len()
    }

    /// Returns `true` if no event was indexed.
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Total number of indexed events.
    pub fn event_count(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }
}
