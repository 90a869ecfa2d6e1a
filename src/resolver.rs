//! Relative date/time resolution for calendar events.
//!
//! Turns the loose date and time strings an assistant produces ("tomorrow",
//! "next friday", "2:30 PM") into an absolute start/end pair. Every function
//! here takes the "now" anchor as an argument and never reads the system
//! clock, so results are deterministic for a given input.
//!
//! # Date grammar
//!
//! Tried in order, first match wins:
//!
//! 1. a bare weekday name (`"monday"`): the next occurrence strictly after today
//! 2. `"next <weekday>"`: the bare-weekday date plus one more week
//! 3. `"today"`, `"tomorrow"`, `"next week"`
//! 4. a calendar date literal (`"2024-03-20"`, `"03/20/2024"`, `"March 20"`, ...)
//!
//! # Time grammar
//!
//! `H[:MM] [AM|PM]` (12-hour) or `HH:MM` (24-hour). No seconds, no zone suffix.

use chrono::{
    DateTime, Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc, Weekday,
};
use serde::Serialize;
use tracing::debug;

use crate::error::ResolveError;

/// Event length used when the caller does not give one.
pub const DEFAULT_DURATION_MINUTES: u32 = 60;

/// Year assumed for literals that carry no year; always coerced forward.
/// A leap year so that "02-29" parses before coercion.
const PLACEHOLDER_YEAR: i32 = 2000;

const WEEKDAYS: [(&str, Weekday); 7] = [
    ("sunday", Weekday::Sun),
    ("monday", Weekday::Mon),
    ("tuesday", Weekday::Tue),
    ("wednesday", Weekday::Wed),
    ("thursday", Weekday::Thu),
    ("friday", Weekday::Fri),
    ("saturday", Weekday::Sat),
];

// Two-digit years come first: `%Y` would read "24" as year 24.
const DATED_FORMATS: [&str; 8] = [
    "%m/%d/%y",
    "%m-%d-%y",
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%B %d, %Y",
    "%B %d %Y",
];

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

const YEARLESS_FORMATS: [&str; 3] = ["%m-%d", "%m/%d", "%B %d"];

/// Absolute start/end pair produced by [`resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedDateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ResolvedDateRange {
    /// Start as epoch milliseconds, the form the calendar store keeps.
    pub fn start_millis(&self) -> i64 {
        self.start.timestamp_millis()
    }

    /// End as epoch milliseconds.
    pub fn end_millis(&self) -> i64 {
        self.end.timestamp_millis()
    }
}

/// Hour and minute read from a time expression, already in 24-hour form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeOfDay {
    pub hour: u32,
    pub minute: u32,
}

impl TimeOfDay {
    pub fn is_pm(&self) -> bool {
        self.hour >= 12
    }

    fn to_naive(self) -> Option<NaiveTime> {
        NaiveTime::from_hms_opt(self.hour, self.minute, 0)
    }
}

/// Resolve a date expression and a time expression into an absolute range.
///
/// The date is anchored at local midnight in `now`'s timezone, the time of day
/// is applied with seconds zeroed, and `end` is `start + duration_minutes`.
///
/// # Errors
///
/// [`ResolveError::InvalidDate`] or [`ResolveError::InvalidTime`] when either
/// expression falls outside the grammar, and [`ResolveError::SkippedLocalTime`]
/// when the wall-clock time falls into a DST gap.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use focus_mcp::resolver::resolve;
///
/// let now = Utc.with_ymd_and_hms(2024, 6, 10, 8, 0, 0).unwrap();
/// let range = resolve("tomorrow", "9am", 30, &now).unwrap();
/// assert_eq!(range.start, Utc.with_ymd_and_hms(2024, 6, 11, 9, 0, 0).unwrap());
/// assert_eq!(range.end, Utc.with_ymd_and_hms(2024, 6, 11, 9, 30, 0).unwrap());
/// ```
pub fn resolve<Tz: TimeZone>(
    date_expr: &str,
    time_expr: &str,
    duration_minutes: u32,
    now: &DateTime<Tz>,
) -> Result<ResolvedDateRange, ResolveError> {
    let date = resolve_date(date_expr, now)?;
    let time = parse_time_of_day(time_expr)?;
    let naive_time = time
        .to_naive()
        .ok_or_else(|| ResolveError::InvalidTime(time_expr.trim().to_string()))?;
    let local = date.and_time(naive_time);

    let start = now
        .timezone()
        .from_local_datetime(&local)
        .earliest()
        .ok_or_else(|| ResolveError::SkippedLocalTime(local.to_string()))?
        .with_timezone(&Utc);
    let end = start + chrono::Duration::minutes(i64::from(duration_minutes));

    debug!(
        date_expr,
        time_expr,
        %start,
        %end,
        "resolved event range"
    );

    Ok(ResolvedDateRange { start, end })
}

/// Resolve a date expression to a calendar date in `now`'s timezone.
pub fn resolve_date<Tz: TimeZone>(expr: &str, now: &DateTime<Tz>) -> Result<NaiveDate, ResolveError> {
    let invalid = || ResolveError::InvalidDate(expr.trim().to_string());
    let normalized = expr.trim().to_lowercase();
    let today = now.date_naive();

    if let Some(weekday) = exact_weekday(&normalized) {
        return add_days(today, days_until(today.weekday(), weekday)).ok_or_else(invalid);
    }

    if normalized.contains("next")
        && let Some(weekday) = mentioned_weekday(&normalized)
    {
        return add_days(today, days_until(today.weekday(), weekday) + 7).ok_or_else(invalid);
    }

    let keyword_offset = match normalized.as_str() {
        "today" => Some(0),
        "tomorrow" => Some(1),
        "next week" => Some(7),
        _ => None,
    };
    if let Some(days) = keyword_offset {
        return add_days(today, days).ok_or_else(invalid);
    }

    parse_date_literal(expr.trim(), now.year()).ok_or_else(invalid)
}

/// Parse a time-of-day expression into 24-hour hour and minute.
///
/// `"2:30 PM"` gives 14:30, `"12 AM"` gives 00:00, `"12:00 PM"` gives 12:00 and
/// `"14:30"` is taken as-is. With a meridiem the hour must be 1-12, without
/// one 0-23.
pub fn parse_time_of_day(expr: &str) -> Result<TimeOfDay, ResolveError> {
    let invalid = || ResolveError::InvalidTime(expr.trim().to_string());
    let normalized = expr.trim().to_lowercase();

    let is_pm = normalized.contains("pm");
    let is_am = normalized.contains("am");
    let body = if is_pm {
        normalized.replacen("pm", "", 1)
    } else if is_am {
        normalized.replacen("am", "", 1)
    } else {
        normalized
    };

    let mut parts = body.trim().split(':');
    let hour: u32 = parts
        .next()
        .and_then(|h| h.trim().parse().ok())
        .ok_or_else(invalid)?;
    let minute: u32 = match parts.next() {
        Some(m) => m.trim().parse().map_err(|_| invalid())?,
        None => 0,
    };
    if parts.next().is_some() || minute > 59 {
        return Err(invalid());
    }

    let has_meridiem = is_pm || is_am;
    if (has_meridiem && !(1..=12).contains(&hour)) || (!has_meridiem && hour > 23) {
        return Err(invalid());
    }

    let hour = if is_pm && hour != 12 {
        hour + 12
    } else if is_am && hour == 12 {
        0
    } else {
        hour
    };

    Ok(TimeOfDay { hour, minute })
}

fn exact_weekday(s: &str) -> Option<Weekday> {
    WEEKDAYS
        .iter()
        .find(|(name, _)| *name == s)
        .map(|(_, weekday)| *weekday)
}

fn mentioned_weekday(s: &str) -> Option<Weekday> {
    WEEKDAYS
        .iter()
        .find(|(name, _)| s.contains(name))
        .map(|(_, weekday)| *weekday)
}

/// Days from `today` to the next `target`, in 1..=7.
fn days_until(today: Weekday, target: Weekday) -> u64 {
    let diff = (target.num_days_from_sunday() + 7 - today.num_days_from_sunday()) % 7;
    if diff == 0 { 7 } else { u64::from(diff) }
}

fn add_days(date: NaiveDate, days: u64) -> Option<NaiveDate> {
    date.checked_add_days(Days::new(days))
}

fn parse_date_literal(s: &str, current_year: i32) -> Option<NaiveDate> {
    let parsed = DATED_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            let with_year = format!("{s} {PLACEHOLDER_YEAR}");
            YEARLESS_FORMATS.iter().find_map(|fmt| {
                NaiveDate::parse_from_str(&with_year, &format!("{fmt} %Y")).ok()
            })
        })?;

    coerce_year(parsed, current_year)
}

/// Move a date from a past year into the current one.
///
/// Feb 29 landing in a non-leap year rolls over to Mar 1.
fn coerce_year(date: NaiveDate, current_year: i32) -> Option<NaiveDate> {
    if date.year() >= current_year {
        return Some(date);
    }
    date.with_year(current_year)
        .or_else(|| NaiveDate::from_ymd_opt(current_year, 3, 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Timelike};
    use chrono_tz::America::New_York;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // 2024-06-10 is a Monday.
    fn monday_morning() -> DateTime<Utc> {
        utc(2024, 6, 10, 8, 0)
    }

    #[test]
    fn test_iso_date_with_24h_time() {
        let range = resolve("2024-03-20", "14:30", 60, &utc(2024, 1, 1, 0, 0)).unwrap();
        assert_eq!(range.start, utc(2024, 3, 20, 14, 30));
        assert_eq!(range.end, utc(2024, 3, 20, 15, 30));
    }

    #[test]
    fn test_tomorrow_with_compact_meridiem() {
        let range = resolve("tomorrow", "9am", 30, &monday_morning()).unwrap();
        assert_eq!(range.start, utc(2024, 6, 11, 9, 0));
        assert_eq!(range.end, utc(2024, 6, 11, 9, 30));
    }

    #[test]
    fn test_bare_weekday_never_returns_today() {
        let now = monday_morning();
        assert_eq!(resolve_date("monday", &now).unwrap(), date(2024, 6, 17));
        assert_eq!(resolve_date("Tuesday", &now).unwrap(), date(2024, 6, 11));
        assert_eq!(resolve_date("sunday", &now).unwrap(), date(2024, 6, 16));
    }

    #[test]
    fn test_next_weekday_adds_a_full_week() {
        let now = monday_morning();
        assert_eq!(resolve_date("next monday", &now).unwrap(), date(2024, 6, 24));
        assert_eq!(resolve_date("next Tuesday", &now).unwrap(), date(2024, 6, 18));
        assert_eq!(resolve_date("  NEXT sunday ", &now).unwrap(), date(2024, 6, 23));
    }

    #[test]
    fn test_next_weekday_from_sunday() {
        // 2024-06-16 is a Sunday.
        let now = utc(2024, 6, 16, 12, 0);
        assert_eq!(resolve_date("monday", &now).unwrap(), date(2024, 6, 17));
        assert_eq!(resolve_date("next monday", &now).unwrap(), date(2024, 6, 24));
    }

    #[test]
    fn test_keywords() {
        let now = monday_morning();
        assert_eq!(resolve_date("today", &now).unwrap(), date(2024, 6, 10));
        assert_eq!(resolve_date("Tomorrow", &now).unwrap(), date(2024, 6, 11));
        assert_eq!(resolve_date("next week", &now).unwrap(), date(2024, 6, 17));
    }

    #[test]
    fn test_local_midnight_follows_now_timezone() {
        // 2024-06-10 23:30 in UTC-05:00 is already June 11 in UTC.
        let tz = FixedOffset::west_opt(5 * 3600).unwrap();
        let now = tz.with_ymd_and_hms(2024, 6, 10, 23, 30, 0).unwrap();
        let range = resolve("tomorrow", "10:00 AM", 60, &now).unwrap();
        assert_eq!(range.start, utc(2024, 6, 11, 15, 0));
    }

    #[test]
    fn test_date_literal_forms() {
        let now = utc(2024, 1, 1, 0, 0);
        assert_eq!(resolve_date("2024/03/20", &now).unwrap(), date(2024, 3, 20));
        assert_eq!(resolve_date("03/20/2024", &now).unwrap(), date(2024, 3, 20));
        assert_eq!(resolve_date("03-20-2024", &now).unwrap(), date(2024, 3, 20));
        assert_eq!(resolve_date("March 20, 2024", &now).unwrap(), date(2024, 3, 20));
        assert_eq!(resolve_date("Mar 20 2024", &now).unwrap(), date(2024, 3, 20));
        assert_eq!(resolve_date("2024-03-20T10:15:00", &now).unwrap(), date(2024, 3, 20));
    }

    #[test]
    fn test_past_year_is_coerced_to_current_year() {
        let now = utc(2026, 10, 16, 9, 0);
        assert_eq!(resolve_date("2020-05-01", &now).unwrap(), date(2026, 5, 1));
        assert_eq!(resolve_date("2030-05-01", &now).unwrap(), date(2030, 5, 1));
    }

    #[test]
    fn test_yearless_literal_uses_current_year() {
        let now = utc(2026, 10, 16, 9, 0);
        assert_eq!(resolve_date("12-25", &now).unwrap(), date(2026, 12, 25));
        assert_eq!(resolve_date("12/25", &now).unwrap(), date(2026, 12, 25));
        assert_eq!(resolve_date("December 25", &now).unwrap(), date(2026, 12, 25));
    }

    #[test]
    fn test_yearless_leap_day() {
        let leap = utc(2028, 1, 10, 9, 0);
        assert_eq!(resolve_date("02-29", &leap).unwrap(), date(2028, 2, 29));
        assert_eq!(resolve_date("02/29", &leap).unwrap(), date(2028, 2, 29));
        assert_eq!(resolve_date("February 29", &leap).unwrap(), date(2028, 2, 29));

        let common = utc(2027, 1, 10, 9, 0);
        assert_eq!(resolve_date("02-29", &common).unwrap(), date(2027, 3, 1));
        assert_eq!(resolve_date("February 29", &common).unwrap(), date(2027, 3, 1));
    }

    #[test]
    fn test_two_digit_year() {
        let now = utc(2024, 1, 1, 0, 0);
        assert_eq!(resolve_date("3/20/24", &now).unwrap(), date(2024, 3, 20));
        assert_eq!(resolve_date("03-20-24", &now).unwrap(), date(2024, 3, 20));
        assert_eq!(resolve_date("12/31/29", &now).unwrap(), date(2029, 12, 31));
        assert_eq!(resolve_date("03/20/2024", &now).unwrap(), date(2024, 3, 20));
        assert_eq!(resolve_date("2024-03-20", &now).unwrap(), date(2024, 3, 20));
    }

    #[test]
    fn test_leap_day_coerced_into_common_year() {
        let now = utc(2025, 1, 1, 0, 0);
        assert_eq!(resolve_date("2024-02-29", &now).unwrap(), date(2025, 3, 1));
    }

    #[test]
    fn test_invalid_date() {
        let err = resolve_date("someday soon", &monday_morning()).unwrap_err();
        assert_eq!(err, ResolveError::InvalidDate("someday soon".to_string()));
        assert_eq!(err.to_string(), "invalid date format: someday soon");
        assert!(resolve_date("2024-13-40", &monday_morning()).is_err());
        assert!(resolve_date("", &monday_morning()).is_err());
    }

    #[test]
    fn test_twelve_hour_conversion() {
        let t = parse_time_of_day("2:30 PM").unwrap();
        assert_eq!((t.hour, t.minute), (14, 30));
        assert_eq!(parse_time_of_day("12:00 AM").unwrap().hour, 0);
        assert_eq!(parse_time_of_day("12:00 PM").unwrap().hour, 12);
        assert_eq!(parse_time_of_day("12am").unwrap().hour, 0);
        assert_eq!(parse_time_of_day("7 pm").unwrap().hour, 19);
        assert!(parse_time_of_day("11:59 pm").unwrap().is_pm());
    }

    #[test]
    fn test_twenty_four_hour_time() {
        let t = parse_time_of_day("14:05").unwrap();
        assert_eq!((t.hour, t.minute), (14, 5));
        let t = parse_time_of_day("0:00").unwrap();
        assert_eq!((t.hour, t.minute), (0, 0));
        assert_eq!(parse_time_of_day("9").unwrap().hour, 9);
    }

    #[test]
    fn test_invalid_time() {
        for input in ["14 PM", "0 am", "24:00", "10:60", "noon", "10:30:15", "", "ten"] {
            let err = parse_time_of_day(input).unwrap_err();
            assert!(
                matches!(err, ResolveError::InvalidTime(_)),
                "{input} should be rejected"
            );
        }
        assert_eq!(
            parse_time_of_day("half past").unwrap_err().to_string(),
            "invalid time format: half past"
        );
    }

    #[test]
    fn test_seconds_are_zeroed() {
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 8, 17, 43).unwrap();
        let range = resolve("today", "5:45 pm", 15, &now).unwrap();
        assert_eq!(range.start.second(), 0);
        assert_eq!(range.start.timestamp_subsec_millis(), 0);
        assert_eq!(range.start, utc(2024, 6, 10, 17, 45));
    }

    #[test]
    fn test_zero_duration() {
        let range = resolve("today", "10:00", 0, &monday_morning()).unwrap();
        assert_eq!(range.start, range.end);
    }

    #[test]
    fn test_millis_difference_matches_duration() {
        let range = resolve("friday", "8:15 am", 45, &monday_morning()).unwrap();
        assert_eq!(range.end_millis() - range.start_millis(), 45 * 60_000);
    }

    #[test]
    fn test_named_timezone() {
        let now = New_York.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).unwrap();
        let range = resolve("tomorrow", "2:30 PM", 60, &now).unwrap();
        // EST is UTC-5 in January.
        assert_eq!(range.start, utc(2026, 1, 6, 19, 30));
    }

    #[test]
    fn test_dst_gap_is_rejected() {
        // Clocks in New York jump from 02:00 to 03:00 on 2026-03-08.
        let now = New_York.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        let err = resolve("2026-03-08", "2:30 AM", 60, &now).unwrap_err();
        assert!(matches!(err, ResolveError::SkippedLocalTime(_)));
    }

    #[test]
    fn test_date_error_reported_before_time_error() {
        let err = resolve("whenever", "nonsense", 60, &monday_morning()).unwrap_err();
        assert!(matches!(err, ResolveError::InvalidDate(_)));
    }
}
