//! Event history tool tests
mod common;

use chrono::{Duration, TimeZone, Utc};
use common::{handler_for, test_config};
use focus_mcp::{CalendarData, NewEvent, Storage};
use tempfile::NamedTempFile;

fn event(title: &str, start: i64, minutes: i64, location: Option<&str>) -> NewEvent {
    NewEvent {
        title: title.to_string(),
        description: None,
        start,
        end: start + minutes * 60_000,
        all_day: false,
        color: "blue".to_string(),
        location: location.map(str::to_string),
    }
}

fn seeded_file() -> NamedTempFile {
    let now = Utc::now();
    let ago = |days: i64| (now - Duration::days(days)).timestamp_millis();

    let mut data = CalendarData::new();
    data.create(event("Recent review", ago(2), 30, Some("Room 2")), "local-user");
    data.create(event("Ancient history", ago(20), 30, None), "local-user");
    data.create(event("Someone else's", ago(1), 30, None), "someone-else");
    let meetup = Utc.with_ymd_and_hms(2024, 5, 2, 18, 0, 0).unwrap().timestamp_millis();
    data.create(event("Rust meetup", meetup, 120, None), "local-user");

    let file = NamedTempFile::new().unwrap();
    Storage::new(file.path(), false).save(&data).unwrap();
    file
}

#[tokio::test]
async fn test_last_week_lists_own_recent_events() {
    let file = seeded_file();
    let (handler, _) = handler_for(&test_config(file.path()));

    let listing = handler
        .handle_fetch_event_history("last week".to_string(), None, None)
        .await
        .unwrap();
    assert!(listing.starts_with("1 events from "), "{listing}");
    assert!(listing.contains("- Recent review (Room 2)"));
    assert!(!listing.contains("Ancient history"));
    assert!(!listing.contains("Someone else's"));
}

#[tokio::test]
async fn test_last_month_reaches_further_back() {
    let file = seeded_file();
    let (handler, _) = handler_for(&test_config(file.path()));

    let listing = handler
        .handle_fetch_event_history("Past Month".to_string(), None, None)
        .await
        .unwrap();
    assert!(listing.contains("Recent review"));
    assert!(listing.contains("Ancient history"));
    // Newest day comes first.
    assert!(listing.find("Recent review") < listing.find("Ancient history"));
}

#[tokio::test]
async fn test_custom_range() {
    let file = seeded_file();
    let (handler, _) = handler_for(&test_config(file.path()));

    let listing = handler
        .handle_fetch_event_history(
            "custom".to_string(),
            Some("2024-05-01".to_string()),
            Some("2024-05-03".to_string()),
        )
        .await
        .unwrap();
    assert_eq!(
        listing,
        "1 events from 5/1/2024 to 5/3/2024\n\nThursday, May 2, 2024\n- Rust meetup  6:00 PM - 8:00 PM\n"
    );
}

#[tokio::test]
async fn test_empty_period_and_bad_dates() {
    let file = seeded_file();
    let (handler, _) = handler_for(&test_config(file.path()));

    let listing = handler
        .handle_fetch_event_history(
            String::new(),
            Some("2023-01-01".to_string()),
            Some("2023-01-31".to_string()),
        )
        .await
        .unwrap();
    assert!(listing.starts_with("No events found for the specified time period"));

    let bad = handler
        .handle_fetch_event_history(
            String::new(),
            Some("01/01/2023".to_string()),
            Some("2023-01-31".to_string()),
        )
        .await;
    assert!(bad.is_err());
}
