//! Event history lookups: named periods to time ranges, and the grouped listing.

use chrono::{DateTime, Days, Months, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::calendar::CalendarEvent;
use crate::error::ResolveError;

/// Inclusive `[start, end]` bounds in epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HistoryRange {
    pub start: i64,
    pub end: i64,
}

/// Work out the range for a history request.
///
/// An explicit `start_date`/`end_date` pair (`YYYY-MM-DD`, both required)
/// wins and covers both whole days. Otherwise `time_period` is matched
/// case-insensitively against `yesterday`, `today`, `last|past week`,
/// `last|past month` and `last|past 3 days`; anything else means the last 7
/// days. Open-ended periods run up to `now`.
pub fn history_range<Tz: TimeZone>(
    time_period: &str,
    start_date: Option<&str>,
    end_date: Option<&str>,
    now: &DateTime<Tz>,
) -> Result<HistoryRange, ResolveError> {
    let tz = now.timezone();
    let today = now.date_naive();
    let now_ms = now.timestamp_millis();

    if let (Some(start), Some(end)) = (start_date, end_date) {
        let start = parse_day(start)?;
        let end = parse_day(end)?;
        let next = end
            .checked_add_days(Days::new(1))
            .ok_or_else(|| ResolveError::InvalidDate(end.to_string()))?;
        return Ok(HistoryRange {
            start: local_midnight(&tz, start)?,
            end: local_midnight(&tz, next)? - 1,
        });
    }

    let days_back = |n: u64| {
        today
            .checked_sub_days(Days::new(n))
            .ok_or_else(|| ResolveError::InvalidDate(today.to_string()))
    };

    let range = match time_period.trim().to_lowercase().as_str() {
        "yesterday" => HistoryRange {
            start: local_midnight(&tz, days_back(1)?)?,
            end: local_midnight(&tz, today)? - 1,
        },
        "today" => HistoryRange {
            start: local_midnight(&tz, today)?,
            end: now_ms,
        },
        "last month" | "past month" => {
            let start = today
                .checked_sub_months(Months::new(1))
                .ok_or_else(|| ResolveError::InvalidDate(today.to_string()))?;
            HistoryRange {
                start: local_midnight(&tz, start)?,
                end: now_ms,
            }
        }
        "last 3 days" | "past 3 days" => HistoryRange {
            start: local_midnight(&tz, days_back(3)?)?,
            end: now_ms,
        },
        _ => HistoryRange {
            start: local_midnight(&tz, days_back(7)?)?,
            end: now_ms,
        },
    };

    debug!(time_period, start = range.start, end = range.end, "history range");
    Ok(range)
}

fn parse_day(s: &str) -> Result<NaiveDate, ResolveError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| ResolveError::InvalidDate(s.trim().to_string()))
}

/// Epoch ms of the first instant of `date` in `tz`.
fn local_midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> Result<i64, ResolveError> {
    let midnight = date.and_time(chrono::NaiveTime::MIN);
    tz.from_local_datetime(&midnight)
        .earliest()
        .map(|dt| dt.timestamp_millis())
        .ok_or_else(|| ResolveError::SkippedLocalTime(midnight.to_string()))
}

/// Render events as a listing grouped by local day, newest day first.
pub fn format_history<Tz: TimeZone>(events: &[&CalendarEvent], range: &HistoryRange, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let local = |ms: i64| DateTime::<Utc>::from_timestamp_millis(ms).map(|dt| dt.with_timezone(tz));
    let short_date = |ms: i64| {
        local(ms)
            .map(|dt| dt.format("%-m/%-d/%Y").to_string())
            .unwrap_or_else(|| ms.to_string())
    };

    if events.is_empty() {
        return format!(
            "No events found for the specified time period\nLooking for events between {} and {}",
            short_date(range.start),
            short_date(range.end)
        );
    }

    let mut by_day: BTreeMap<NaiveDate, Vec<&CalendarEvent>> = BTreeMap::new();
    for event in events.iter().copied() {
        if let Some(start) = local(event.start) {
            by_day.entry(start.date_naive()).or_default().push(event);
        }
    }

    let mut out = format!(
        "{} events from {} to {}\n",
        events.len(),
        short_date(range.start),
        short_date(range.end)
    );

    for (day, day_events) in by_day.iter().rev() {
        out.push_str(&format!("\n{}\n", day.format("%A, %B %-d, %Y")));
        for event in day_events {
            let location = event
                .location
                .as_deref()
                .map(|l| format!(" ({})", l))
                .unwrap_or_default();
            let when = if event.all_day {
                "All day".to_string()
            } else {
                let clock = |ms: i64| {
                    local(ms)
                        .map(|dt| dt.format("%-I:%M %p").to_string())
                        .unwrap_or_default()
                };
                format!("{} - {}", clock(event.start), clock(event.end))
            };
            out.push_str(&format!("- {}{}  {}\n", event.title, location, when));
        }
    }

    out
}
