//! Core types: feed parsing, poster detection, dates, day index, month views, formatting

pub mod calendar;
pub mod event;
pub mod format;
pub mod ics;
pub mod index;
pub mod poster;
pub mod time;
pub mod tracing;

pub use calendar::{CellEvent, DayCell, EventTag, MonthGrid, MonthView};
pub use event::{Event, RawRecord, UNTITLED};
pub use format::{
    FormatOptions, JsonDay, JsonEvent, JsonMonth, OutputFormat, OutputFormatter, TimeFormat,
    ellipsis, make_hyperlink,
};
pub use ics::{FeedParser, FieldWarning, ParsedFeed, parse_feed, tokenize};
pub use index::{DayIndex, day_key};
pub use poster::{PosterExtractor, PosterMatcher, extract_poster};
pub use time::{DateConverter, NaiveLocalConverter, parse_feed_time};
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
