//! Calendar commands: `show`, `events` and `detail`.
//!
//! Rendering is split from printing so the output can be checked in a fixed
//! timezone.

use std::fmt;

use chrono::{Local, NaiveDate, TimeZone};
use postercal_core::{
    DayIndex, Event, JsonEvent, MonthView, NaiveLocalConverter, OutputFormatter, day_key,
};
use postercal_feed::FeedSource;
use tracing::debug;

use crate::cli::ShowArgs;
use crate::error::{ClientError, ClientResult};
use crate::feed::load_events;

/// Layout of the `show` output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthLayout {
    /// One line per event.
    Agenda,
    /// Compact 7-column day grid.
    Grid,
    /// JSON month view.
    Json,
}

impl MonthLayout {
    /// Picks the layout from the `show` flags.
    pub fn from_args(args: &ShowArgs) -> Self {
        if args.json {
            Self::Json
        } else if args.grid {
            Self::Grid
        } else {
            Self::Agenda
        }
    }
}

/// Prints the month containing `reference` (today when `None`).
pub async fn show(
    source: &dyn FeedSource,
    formatter: &OutputFormatter,
    args: &ShowArgs,
) -> ClientResult<()> {
    let events = load_events(source).await?;
    let reference = args.month.unwrap_or_else(|| Local::now().date_naive());
    let output = render_month(
        &events,
        reference,
        MonthLayout::from_args(args),
        formatter,
        &Local,
    )?;
    println!("{}", output);
    Ok(())
}

/// Prints every parsed event.
pub async fn events(
    source: &dyn FeedSource,
    formatter: &OutputFormatter,
    json: bool,
) -> ClientResult<()> {
    let events = load_events(source).await?;
    println!("{}", render_events(&events, json, formatter, &Local)?);
    Ok(())
}

/// Prints the detail view of one event.
pub async fn detail(
    source: &dyn FeedSource,
    formatter: &OutputFormatter,
    date: NaiveDate,
    title: Option<&str>,
    json: bool,
) -> ClientResult<()> {
    let events = load_events(source).await?;
    println!(
        "{}",
        render_detail(&events, date, title, json, formatter, &Local)?
    );
    Ok(())
}

/// Renders the month containing `reference` as seen from `tz`.
pub fn render_month<Tz: TimeZone<Offset: fmt::Display>>(
    events: &[Event],
    reference: NaiveDate,
    layout: MonthLayout,
    formatter: &OutputFormatter,
    tz: &Tz,
) -> ClientResult<String> {
    let index = DayIndex::build_with(events, &NaiveLocalConverter::new(tz.clone()));
    let view = MonthView::build(reference, &index);
    debug!(
        month = %view.title(),
        events = view.event_count(),
        "Rendering month"
    );

    match layout {
        MonthLayout::Agenda => Ok(formatter.format_month_in(&view, tz)),
        MonthLayout::Grid => Ok(formatter.format_grid(&view)),
        MonthLayout::Json => Ok(serde_json::to_string_pretty(
            &formatter.json_month_in(&view, tz),
        )?),
    }
}

/// Renders the flat event list.
pub fn render_events<Tz: TimeZone<Offset: fmt::Display>>(
    events: &[Event],
    json: bool,
    formatter: &OutputFormatter,
    tz: &Tz,
) -> ClientResult<String> {
    if json {
        let payload: Vec<JsonEvent> = events
            .iter()
            .map(|event| formatter.json_event_in(event, tz))
            .collect();
        Ok(serde_json::to_string_pretty(&payload)?)
    } else {
        Ok(formatter.format_events_in(events, tz))
    }
}

/// Renders the detail view of the event titled `title` on `date`, or of the
/// first event of that day.
pub fn render_detail<Tz: TimeZone<Offset: fmt::Display>>(
    events: &[Event],
    date: NaiveDate,
    title: Option<&str>,
    json: bool,
    formatter: &OutputFormatter,
    tz: &Tz,
) -> ClientResult<String> {
    let index = DayIndex::build_with(events, &NaiveLocalConverter::new(tz.clone()));
    let key = day_key(date);
    let event = index
        .find(&key, title.unwrap_or_default())
        .ok_or_else(|| ClientError::NotFound(format!("no events on {}", key)))?;

    if json {
        Ok(serde_json::to_string_pretty(&formatter.json_event_in(event, tz))?)
    } else {
        Ok(formatter.format_detail_in(event, tz))
    }
}
