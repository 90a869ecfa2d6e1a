//! Tool output formatting
//!
//! Structured results are returned to the assistant as pretty-printed JSON.

use mcp_attr::{Result as McpResult, bail_public};
use serde::Serialize;

use crate::calendar::CalendarEvent;
use crate::resolver::TimeOfDay;
use crate::session::SessionSnapshot;

/// Time of day as the caller expressed it, echoed back with created events.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct OriginalTime {
    pub hours: u32,
    pub minutes: u32,
    pub is_pm: bool,
    pub timezone: String,
}

impl OriginalTime {
    pub fn new(time: TimeOfDay, timezone: &str) -> Self {
        Self {
            hours: time.hour,
            minutes: time.minute,
            is_pm: time.is_pm(),
            timezone: timezone.to_string(),
        }
    }
}

#[derive(Serialize)]
struct EventOutput<'a> {
    #[serde(flatten)]
    event: &'a CalendarEvent,
    #[serde(skip_serializing_if = "Option::is_none")]
    original_time: Option<OriginalTime>,
}

#[derive(Serialize)]
struct WeatherOutput<'a> {
    weather: &'a str,
    temperature: i32,
    location: &'a str,
}

pub fn to_json<T: Serialize + ?Sized>(value: &T) -> McpResult<String> {
    match serde_json::to_string_pretty(value) {
        Ok(json) => Ok(json),
        Err(e) => bail_public!(_, "Failed to format result: {}", e),
    }
}

pub fn event_json(event: &CalendarEvent, original_time: Option<OriginalTime>) -> McpResult<String> {
    to_json(&EventOutput {
        event,
        original_time,
    })
}

pub fn session_json(session: &SessionSnapshot) -> McpResult<String> {
    to_json(session)
}

/// Fixed forecast; no weather service is consulted.
pub fn weather_json(location: &str) -> McpResult<String> {
    to_json(&WeatherOutput {
        weather: "Sunny",
        temperature: 75,
        location,
    })
}
