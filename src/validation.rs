//! Tool argument validation
//!
//! Each helper turns a raw tool argument into a domain value, or into a public
//! `INVALID_PARAMS` error that names the offending field.

use chrono::{DateTime, TimeZone};
use mcp_attr::Result as McpResult;

use crate::calendar::IntentionScope;
use crate::error::ResolveError;
use crate::resolver::{self, ResolvedDateRange, TimeOfDay};
use crate::session::{Emotion, SessionStatus, SessionType};

/// Longest focus session accepted, in minutes.
pub const MAX_SESSION_MINUTES: f64 = 180.0;

fn invalid_params(message: String) -> mcp_attr::Error {
    mcp_attr::Error::new(mcp_attr::ErrorCode::INVALID_PARAMS).with_message(message, true)
}

/// Session length in minutes: finite, 1 to 180, fractions allowed.
pub fn parse_session_minutes(minutes: f64) -> McpResult<f64> {
    if !minutes.is_finite() || !(1.0..=MAX_SESSION_MINUTES).contains(&minutes) {
        return Err(invalid_params(format!(
            "Invalid duration {}. Sessions must be between 1 and {} minutes",
            minutes, MAX_SESSION_MINUTES
        )));
    }
    Ok(minutes)
}

/// Trimmed, non-blank task list with at least one entry.
pub fn parse_tasks(tasks: Vec<String>) -> McpResult<Vec<String>> {
    let tasks: Vec<String> = tasks
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    if tasks.is_empty() {
        return Err(invalid_params(
            "At least one task is required to start a focus session".to_string(),
        ));
    }
    Ok(tasks)
}

pub fn parse_session_type(session_type: Option<&str>) -> McpResult<SessionType> {
    match session_type.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => s.parse().map_err(invalid_params),
        None => Ok(SessionType::default()),
    }
}

/// A status a caller may request. `idle` is only ever the initial state.
pub fn parse_requested_status(status: &str) -> McpResult<SessionStatus> {
    match status.parse::<SessionStatus>() {
        Ok(SessionStatus::Idle) | Err(_) => Err(invalid_params(format!(
            "Invalid session status '{}'. Valid options are: running, paused, completed",
            status
        ))),
        Ok(s) => Ok(s),
    }
}

pub fn parse_emotion(emotion: Option<&str>) -> McpResult<Option<Emotion>> {
    emotion
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(|e| e.parse().map_err(invalid_params))
        .transpose()
}

/// Trimmed, non-blank text for a daily task or an intention.
pub fn parse_text(field: &str, text: &str) -> McpResult<String> {
    let text = text.trim();
    if text.is_empty() {
        return Err(invalid_params(format!("{} must not be empty", field)));
    }
    Ok(text.to_string())
}

pub fn parse_intention_scope(scope: &str) -> McpResult<IntentionScope> {
    scope.parse().map_err(invalid_params)
}

/// Event length in minutes; must be at least one.
pub fn parse_event_duration(duration: Option<u32>, default: u32) -> McpResult<u32> {
    match duration {
        Some(0) => Err(invalid_params(
            "Invalid duration 0. Events must last at least 1 minute".to_string(),
        )),
        Some(minutes) => Ok(minutes),
        None => Ok(default),
    }
}

/// Resolve `start_date` + `start_time`, reporting which of the two was bad.
pub fn resolve_event_time<Tz: TimeZone>(
    start_date: &str,
    start_time: &str,
    duration_minutes: u32,
    now: &DateTime<Tz>,
) -> McpResult<(ResolvedDateRange, TimeOfDay)> {
    let range =
        resolver::resolve(start_date, start_time, duration_minutes, now).map_err(resolve_error)?;
    let time = resolver::parse_time_of_day(start_time).map_err(resolve_error)?;
    Ok((range, time))
}

fn resolve_error(e: ResolveError) -> mcp_attr::Error {
    let message = match &e {
        ResolveError::InvalidDate(input) => format!(
            "Invalid start_date '{}'. Use a weekday (\"friday\", \"next monday\"), \"today\", \"tomorrow\", \"next week\" or a date such as 2025-03-15",
            input
        ),
        ResolveError::InvalidTime(input) => format!(
            "Invalid start_time '{}'. Use \"2:30 PM\", \"9am\" or 24-hour \"14:30\"",
            input
        ),
        ResolveError::SkippedLocalTime(_) => format!("Invalid start_time: {}", e),
    };
    invalid_params(message)
}
