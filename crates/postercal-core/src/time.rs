//! Date/time conversion for feed values.
//!
//! Feed dates come in two shapes, `YYYYMMDD` and `YYYYMMDDTHHMMSS[Z]`. A
//! trailing `Z` means UTC; anything else is read as a naive wall-clock time
//! in the viewer's timezone. `TZID` parameters are not honoured.
//!
//! The conversion sits behind [`DateConverter`] so a timezone-aware
//! implementation can replace [`NaiveLocalConverter`] without touching the
//! parser or the day index.

use std::sync::LazyLock;

use chrono::{
    DateTime, Duration, Local, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone,
    Utc,
};
use regex::Regex;

/// Matches `YYYYMMDD` and `YYYYMMDDTHHMMSS` with an optional `Z` suffix.
static FEED_TIME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4})(\d{2})(\d{2})(?:T(\d{2})(\d{2})(\d{2})(Z)?)?$")
        .expect("Invalid feed time regex")
});

/// Naive formats tried by the fallback parser, read as local wall-clock time.
const NAIVE_FALLBACK_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Converts raw feed date strings into instants and instants into calendar days.
pub trait DateConverter {
    /// Converts a raw feed value into a point in time.
    ///
    /// Returns `None` for anything that cannot be parsed. Never panics.
    fn to_instant(&self, raw: &str) -> Option<DateTime<Utc>>;

    /// Returns the viewer's calendar date for an instant.
    fn local_date(&self, instant: &DateTime<Utc>) -> NaiveDate;
}

/// Timezone-naive converter: `Z` values are UTC, everything else is wall-clock
/// time in `Tz`.
#[derive(Debug, Clone)]
pub struct NaiveLocalConverter<Tz: TimeZone = Local> {
    tz: Tz,
}

impl Default for NaiveLocalConverter<Local> {
    fn default() -> Self {
        Self { tz: Local }
    }
}

impl<Tz: TimeZone> NaiveLocalConverter<Tz> {
    /// Creates a converter for the given viewer timezone.
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// Returns the viewer timezone.
    pub fn timezone(&self) -> &Tz {
        &self.tz
    }

    fn from_feed_shape(&self, caps: &regex::Captures<'_>) -> Option<DateTime<Utc>> {
        let year: i32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let day: u32 = caps[3].parse().ok()?;
        let date = NaiveDate::from_ymd_opt(year, month, day)?;

        let time = match (caps.get(4), caps.get(5), caps.get(6)) {
            (Some(h), Some(m), Some(s)) => NaiveTime::from_hms_opt(
                h.as_str().parse().ok()?,
                m.as_str().parse().ok()?,
                s.as_str().parse().ok()?,
            )?,
            _ => NaiveTime::MIN,
        };

        let naive = date.and_time(time);
        if caps.get(7).is_some() {
            Some(naive.and_utc())
        } else {
            resolve_local(&self.tz, naive)
        }
    }

    fn from_fallback(&self, raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        for format in NAIVE_FALLBACK_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
                return resolve_local(&self.tz, naive);
            }
        }
        // ISO date-only strings are UTC midnight, unlike the compact feed shape.
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .map(|date| date.and_time(NaiveTime::MIN).and_utc())
    }
}

impl<Tz: TimeZone> DateConverter for NaiveLocalConverter<Tz> {
    fn to_instant(&self, raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        match FEED_TIME_REGEX.captures(raw) {
            Some(caps) => self.from_feed_shape(&caps),
            None => self.from_fallback(raw),
        }
    }

    fn local_date(&self, instant: &DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.tz).date_naive()
    }
}

/// Resolves a wall-clock time in `tz` to an instant.
///
/// Ambiguous times (DST fall-back) take the earliest instant. Times inside a
/// DST gap keep the offset in force before the gap, which moves them forward
/// by the gap length.
fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
        LocalResult::None => {
            let before = naive.checked_sub_signed(Duration::hours(3))?;
            let offset = tz.from_local_datetime(&before).earliest()?.offset().fix();
            let utc = naive.checked_sub_signed(Duration::seconds(i64::from(
                offset.local_minus_utc(),
            )))?;
            Some(utc.and_utc())
        }
    }
}

/// Parses a feed date/time in the process-local timezone.
///
/// Shorthand for `NaiveLocalConverter::default().to_instant(raw)`.
pub fn parse_feed_time(raw: &str) -> Option<DateTime<Utc>> {
    NaiveLocalConverter::<Local>::default().to_instant(raw)
}

/// Returns `true` if the raw value is a date-only (`YYYYMMDD`) feed value.
pub fn is_date_only(raw: &str) -> bool {
    let raw = raw.trim();
    raw.len() == 8 && raw.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    fn offset_hours(hours: i32) -> FixedOffset {
        FixedOffset::east_opt(hours * 3600).unwrap()
    }

    mod feed_shapes {
        use super::*;

        #[test]
        fn utc_datetime() {
            let converter = NaiveLocalConverter::new(offset_hours(9));
            assert_eq!(
                converter.to_instant("20240315T200000Z"),
                Some(utc(2024, 3, 15, 20, 0, 0))
            );
        }

        #[test]
        fn utc_datetime_with_process_local_zone() {
            assert_eq!(
                parse_feed_time("20240315T200000Z"),
                Some(utc(2024, 3, 15, 20, 0, 0))
            );
        }

        #[test]
        fn date_only_is_local_midnight() {
            let converter = NaiveLocalConverter::new(offset_hours(2));
            assert_eq!(
                converter.to_instant("20240315"),
                Some(utc(2024, 3, 14, 22, 0, 0))
            );

            let local_midnight = Local
                .from_local_datetime(
                    &NaiveDate::from_ymd_opt(2024, 3, 15)
                        .unwrap()
                        .and_time(NaiveTime::MIN),
                )
                .earliest()
                .unwrap()
                .with_timezone(&Utc);
            assert_eq!(parse_feed_time("20240315"), Some(local_midnight));
        }

        #[test]
        fn naive_datetime_is_local() {
            let converter = NaiveLocalConverter::new(offset_hours(-5));
            assert_eq!(
                converter.to_instant("20240315T200000"),
                Some(utc(2024, 3, 16, 1, 0, 0))
            );
        }

        #[test]
        fn surrounding_whitespace_is_ignored() {
            let converter = NaiveLocalConverter::new(Utc);
            assert_eq!(
                converter.to_instant("  20240315T200000Z\t"),
                Some(utc(2024, 3, 15, 20, 0, 0))
            );
        }

        #[test]
        fn out_of_range_components() {
            let converter = NaiveLocalConverter::new(Utc);
            assert_eq!(converter.to_instant("20241301"), None);
            assert_eq!(converter.to_instant("20240230"), None);
            assert_eq!(converter.to_instant("20240315T250000Z"), None);
            assert_eq!(converter.to_instant("20240315T206100"), None);
        }
    }

    mod fallback {
        use super::*;

        #[test]
        fn rfc3339() {
            let converter = NaiveLocalConverter::new(Utc);
            assert_eq!(
                converter.to_instant("2024-03-15T20:00:00+01:00"),
                Some(utc(2024, 3, 15, 19, 0, 0))
            );
        }

        #[test]
        fn rfc2822() {
            let converter = NaiveLocalConverter::new(Utc);
            assert_eq!(
                converter.to_instant("Fri, 15 Mar 2024 20:00:00 +0000"),
                Some(utc(2024, 3, 15, 20, 0, 0))
            );
        }

        #[test]
        fn iso_naive_is_local() {
            let converter = NaiveLocalConverter::new(offset_hours(1));
            assert_eq!(
                converter.to_instant("2024-03-15 20:00:00"),
                Some(utc(2024, 3, 15, 19, 0, 0))
            );
            assert_eq!(
                converter.to_instant("2024-03-15T20:00"),
                Some(utc(2024, 3, 15, 19, 0, 0))
            );
        }

        #[test]
        fn iso_date_only_is_utc_midnight() {
            let converter = NaiveLocalConverter::new(offset_hours(5));
            assert_eq!(
                converter.to_instant("2024-03-15"),
                Some(utc(2024, 3, 15, 0, 0, 0))
            );
        }

        #[test]
        fn garbage_is_none() {
            let converter = NaiveLocalConverter::new(Utc);
            assert_eq!(converter.to_instant("not-a-date"), None);
            assert_eq!(converter.to_instant(""), None);
            assert_eq!(converter.to_instant("   "), None);
            assert_eq!(converter.to_instant("2024031"), None);
            assert_eq!(parse_feed_time("not-a-date"), None);
        }
    }

    #[test]
    fn local_date_follows_timezone() {
        let instant = utc(2024, 3, 15, 23, 30, 0);
        assert_eq!(
            NaiveLocalConverter::new(Utc).local_date(&instant),
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
        );
        assert_eq!(
            NaiveLocalConverter::new(offset_hours(1)).local_date(&instant),
            NaiveDate::from_ymd_opt(2024, 3, 16).unwrap()
        );
    }

    #[test]
    fn date_only_detection() {
        assert!(is_date_only("20240315"));
        assert!(is_date_only(" 20240315 "));
        assert!(!is_date_only("20240315T200000Z"));
        assert!(!is_date_only("2024-03-15"));
    }
}
