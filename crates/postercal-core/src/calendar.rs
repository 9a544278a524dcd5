//! Month view building blocks for renderers.
//!
//! A renderer picks a reference date, builds a [`MonthGrid`] (six Monday-first
//! weeks covering that month) and fills it from a [`DayIndex`] to get a
//! [`MonthView`]. The reference date is always explicit so any month can be
//! rendered deterministically.

use std::cmp::Ordering;
use std::sync::LazyLock;

use chrono::{Datelike, Days, NaiveDate};
use regex::Regex;
use serde::Serialize;

use crate::event::Event;
use crate::index::{DayIndex, day_key};

pub const GRID_ROWS: usize = 6;
pub const GRID_COLS: usize = 7;
pub const GRID_LENGTH: usize = GRID_ROWS * GRID_COLS;

/// Short weekday labels, Monday first.
pub const WEEKDAY_LABELS: [&str; GRID_COLS] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

static WOW_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)wednesday|wow").expect("Invalid WOW regex"));
static FRIDAY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)friday").expect("Invalid Friday regex"));
static SATURDAY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)saturday").expect("Invalid Saturday regex"));

/// Programme slot of an event, derived from its title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventTag {
    /// Wednesday "WOW" screening.
    Wow,
    /// Friday night screening.
    Friday,
    /// Saturday night screening.
    Saturday,
    /// Anything else.
    Other,
}

impl EventTag {
    /// Classifies a title. `wednesday`/`wow` win over `friday`, which wins
    /// over `saturday`.
    pub fn classify(title: &str) -> Self {
        if WOW_REGEX.is_match(title) {
            Self::Wow
        } else if FRIDAY_REGEX.is_match(title) {
            Self::Friday
        } else if SATURDAY_REGEX.is_match(title) {
            Self::Saturday
        } else {
            Self::Other
        }
    }

    /// Short class name (`wow`, `fri`, `sat`, `oth`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wow => "wow",
            Self::Friday => "fri",
            Self::Saturday => "sat",
            Self::Other => "oth",
        }
    }
}

/// The 6x7 date grid for one month, starting on the Monday on or before the
/// first of the month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthGrid {
    first: NaiveDate,
    start: NaiveDate,
}

impl MonthGrid {
    /// Creates the grid for the month containing `reference`.
    pub fn new(reference: NaiveDate) -> Self {
        let first = reference.with_day(1).unwrap_or(reference);
        let back = u64::from(first.weekday().num_days_from_monday());
        let start = first.checked_sub_days(Days::new(back)).unwrap_or(first);
        Self { first, start }
    }

    /// First day of the displayed month.
    pub fn first_of_month(&self) -> NaiveDate {
        self.first
    }

    /// First date shown in the grid (always a Monday).
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last date shown in the grid (always a Sunday).
    pub fn end(&self) -> NaiveDate {
        self.start
            .checked_add_days(Days::new(GRID_LENGTH as u64 - 1))
            .unwrap_or(self.start)
    }

    /// Returns `true` if the date belongs to the displayed month.
    pub fn in_month(&self, date: NaiveDate) -> bool {
        date.year() == self.first.year() && date.month() == self.first.month()
    }

    /// All grid dates, row by row.
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.start.iter_days().take(GRID_LENGTH).collect()
    }

    /// Grid dates grouped into weeks.
    pub fn weeks(&self) -> Vec<Vec<NaiveDate>> {
        self.dates()
            .chunks(GRID_COLS)
            .map(<[NaiveDate]>::to_vec)
            .collect()
    }
}

/// An event placed in a day cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellEvent<'a> {
    /// Programme slot.
    pub tag: EventTag,
    /// The event itself.
    pub event: &'a Event,
}

/// One cell of a month view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayCell<'a> {
    /// Calendar date of the cell.
    pub date: NaiveDate,
    /// Day key (`YYYY-MM-DD`).
    pub key: String,
    /// Whether the date belongs to the displayed month.
    pub in_month: bool,
    /// Events of the day, sorted by title.
    pub events: Vec<CellEvent<'a>>,
}

/// A filled month grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthView<'a> {
    /// Displayed year.
    pub year: i32,
    /// Displayed month (1-12).
    pub month: u32,
    /// 42 cells, Monday first.
    pub cells: Vec<DayCell<'a>>,
}

impl<'a> MonthView<'a> {
    /// Builds the view of the month containing `reference`.
    pub fn build(reference: NaiveDate, index: &DayIndex<'a>) -> Self {
        let grid = MonthGrid::new(reference);

        let cells = grid
            .dates()
            .into_iter()
            .map(|date| {
                let key = day_key(date);
                let mut events: Vec<CellEvent<'a>> = index
                    .get(&key)
                    .iter()
                    .copied()
                    .map(|event| CellEvent {
                        tag: EventTag::classify(&event.title),
                        event,
                    })
                    .collect();
                events.sort_by(|a, b| compare_titles(&a.event.title, &b.event.title));

                DayCell {
                    date,
                    key,
                    in_month: grid.in_month(date),
                    events,
                }
            })
            .collect();

        Self {
            year: grid.first_of_month().year(),
            month: grid.first_of_month().month(),
            cells,
        }
    }

    /// Month title, e.g. `March 2024`.
    pub fn title(&self) -> String {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .map(|d| d.format("%B %Y").to_string())
            .unwrap_or_default()
    }

    /// Cells grouped into weeks.
    pub fn weeks(&self) -> impl Iterator<Item = &[DayCell<'a>]> {
        self.cells.chunks(GRID_COLS)
    }

    /// Cells of the displayed month that have at least one event.
    pub fn busy_days(&self) -> impl Iterator<Item = &DayCell<'a>> {
        self.cells
            .iter()
            .filter(|cell| cell.in_month && !cell.events.is_empty())
    }

    /// Number of events shown in the displayed month.
    pub fn event_count(&self) -> usize {
        self.busy_days().map(|cell| cell.events.len()).sum()
    }
}

/// Orders titles case-insensitively, falling back to byte order for ties.
fn compare_titles(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::NaiveLocalConverter;
    use chrono::{TimeZone, Utc, Weekday};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    mod tags {
        use super::*;

        #[test]
        fn classification() {
            assert_eq!(EventTag::classify("WOW Wednesday"), EventTag::Wow);
            assert_eq!(EventTag::classify("wow"), EventTag::Wow);
            assert_eq!(EventTag::classify("Friday Night"), EventTag::Friday);
            assert_eq!(EventTag::classify("SATURDAY late"), EventTag::Saturday);
            assert_eq!(EventTag::classify("Member meeting"), EventTag::Other);
        }

        #[test]
        fn precedence() {
            assert_eq!(EventTag::classify("Friday wow special"), EventTag::Wow);
            assert_eq!(EventTag::classify("Friday into Saturday"), EventTag::Friday);
        }

        #[test]
        fn class_names() {
            assert_eq!(EventTag::Wow.as_str(), "wow");
            assert_eq!(EventTag::Friday.as_str(), "fri");
            assert_eq!(EventTag::Saturday.as_str(), "sat");
            assert_eq!(EventTag::Other.as_str(), "oth");
        }
    }

    mod grid {
        use super::*;

        #[test]
        fn starts_on_monday_before_first() {
            // 2024-03-01 is a Friday.
            let grid = MonthGrid::new(date(2024, 3, 15));
            assert_eq!(grid.first_of_month(), date(2024, 3, 1));
            assert_eq!(grid.start(), date(2024, 2, 26));
            assert_eq!(grid.start().weekday(), Weekday::Mon);
            assert_eq!(grid.end(), date(2024, 4, 7));
            assert_eq!(grid.end().weekday(), Weekday::Sun);
        }

        #[test]
        fn month_starting_on_monday() {
            // 2024-04-01 is a Monday.
            let grid = MonthGrid::new(date(2024, 4, 30));
            assert_eq!(grid.start(), date(2024, 4, 1));
        }

        #[test]
        fn always_six_weeks() {
            let grid = MonthGrid::new(date(2026, 2, 1));
            assert_eq!(grid.dates().len(), GRID_LENGTH);
            let weeks = grid.weeks();
            assert_eq!(weeks.len(), GRID_ROWS);
            assert!(weeks.iter().all(|w| w.len() == GRID_COLS));
        }

        #[test]
        fn in_month() {
            let grid = MonthGrid::new(date(2024, 3, 15));
            assert!(grid.in_month(date(2024, 3, 31)));
            assert!(!grid.in_month(date(2024, 2, 29)));
            assert!(!grid.in_month(date(2023, 3, 15)));
        }
    }

    mod view {
        use super::*;

        fn sample_events() -> Vec<Event> {
            vec![
                Event::new("Saturday Matinee").with_start(at(2024, 3, 16, 14)),
                Event::new("Friday Night").with_start(at(2024, 3, 15, 20)),
                Event::new("Afterparty").with_start(at(2024, 3, 15, 23)),
                Event::new("Next month").with_start(at(2024, 4, 2, 20)),
                Event::new("Far away").with_start(at(2024, 6, 1, 20)),
            ]
        }

        #[test]
        fn places_events_and_sorts_by_title() {
            let events = sample_events();
            let index = DayIndex::build_with(&events, &NaiveLocalConverter::new(Utc));
            let view = MonthView::build(date(2024, 3, 1), &index);

            assert_eq!(view.year, 2024);
            assert_eq!(view.month, 3);
            assert_eq!(view.cells.len(), GRID_LENGTH);
            assert_eq!(view.title(), "March 2024");

            let friday = view.cells.iter().find(|c| c.key == "2024-03-15").unwrap();
            let titles: Vec<&str> = friday.events.iter().map(|e| e.event.title.as_str()).collect();
            assert_eq!(titles, vec!["Afterparty", "Friday Night"]);
            assert_eq!(friday.events[1].tag, EventTag::Friday);
        }

        #[test]
        fn title_order_ignores_case() {
            let events = vec![
                Event::new("afterparty").with_start(at(2024, 3, 15, 23)),
                Event::new("Friday Night").with_start(at(2024, 3, 15, 20)),
                Event::new("Bar quiz").with_start(at(2024, 3, 15, 18)),
                Event::new("bar quiz").with_start(at(2024, 3, 15, 19)),
            ];
            let index = DayIndex::build_with(&events, &NaiveLocalConverter::new(Utc));
            let view = MonthView::build(date(2024, 3, 1), &index);

            let friday = view.cells.iter().find(|c| c.key == "2024-03-15").unwrap();
            let titles: Vec<&str> = friday.events.iter().map(|e| e.event.title.as_str()).collect();
            assert_eq!(titles, vec!["afterparty", "Bar quiz", "bar quiz", "Friday Night"]);
        }

        #[test]
        fn trailing_days_are_muted_but_filled() {
            let events = sample_events();
            let index = DayIndex::build_with(&events, &NaiveLocalConverter::new(Utc));
            let view = MonthView::build(date(2024, 3, 1), &index);

            let april = view.cells.iter().find(|c| c.key == "2024-04-02").unwrap();
            assert!(!april.in_month);
            assert_eq!(april.events.len(), 1);

            assert_eq!(view.busy_days().count(), 2);
            assert_eq!(view.event_count(), 3);
        }

        #[test]
        fn weeks_of_cells() {
            let index = DayIndex::default();
            let view = MonthView::build(date(2024, 3, 1), &index);
            assert_eq!(view.weeks().count(), GRID_ROWS);
            assert_eq!(view.event_count(), 0);
        }
    }
}
