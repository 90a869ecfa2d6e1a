//! Turning a finished focus session into a calendar entry.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use super::countdown::parse_countdown;
use super::timer::SessionTimer;
use crate::calendar::NewEvent;
use crate::error::FormatError;

/// How the user felt about a finished session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Emotion {
    Fulfilled,
    Flow,
    Calm,
    Courage,
    Stress,
    Afraid,
}

impl Emotion {
    /// Calendar color used for a session tagged with this emotion.
    pub fn color(&self) -> &'static str {
        match self {
            Emotion::Fulfilled | Emotion::Flow => "sky",
            Emotion::Calm => "emerald",
            Emotion::Courage => "amber",
            Emotion::Stress => "orange",
            Emotion::Afraid => "rose",
        }
    }
}

/// Color for an untagged session.
pub const NO_EMOTION_COLOR: &str = "violet";

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl FromStr for Emotion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fulfilled" => Ok(Emotion::Fulfilled),
            "flow" => Ok(Emotion::Flow),
            "calm" => Ok(Emotion::Calm),
            "courage" => Ok(Emotion::Courage),
            "stress" => Ok(Emotion::Stress),
            "afraid" => Ok(Emotion::Afraid),
            _ => Err(format!(
                "Invalid emotion '{}'. Valid options are: Fulfilled, Flow, Calm, Courage, Stress, Afraid",
                s
            )),
        }
    }
}

/// Build the calendar event recording a finished session.
///
/// The event spans from the session start for the full configured duration,
/// whatever time was actually left when it completed.
pub fn session_event(
    timer: &SessionTimer,
    emotion: Option<Emotion>,
    reflection: Option<&str>,
) -> Result<NewEvent, FormatError> {
    let total_secs = parse_countdown(timer.duration_total())?;
    let start = timer.started_at().timestamp_millis();
    let end = i64::try_from(total_secs)
        .ok()
        .and_then(|secs| secs.checked_mul(1000))
        .and_then(|ms| start.checked_add(ms))
        .ok_or_else(|| FormatError(timer.duration_total().to_string()))?;

    Ok(NewEvent {
        title: session_title(timer.tasks()),
        description: Some(session_description(timer.tasks(), reflection)),
        start,
        end,
        all_day: false,
        color: emotion
            .map(|e| e.color())
            .unwrap_or(NO_EMOTION_COLOR)
            .to_string(),
        location: None,
    })
}

fn session_title(tasks: &[String]) -> String {
    match tasks.split_first() {
        Some((first, [])) => format!("Focus Session: {}", first),
        Some((first, rest)) => format!("Focus Session: {} +{}", first, rest.len()),
        None => "Focus Session".to_string(),
    }
}

fn session_description(tasks: &[String], reflection: Option<&str>) -> String {
    let mut description = tasks
        .iter()
        .enumerate()
        .map(|(i, task)| format!("{}. {}", i + 1, task))
        .collect::<Vec<_>>()
        .join("\n");

    if let Some(text) = reflection.map(str::trim).filter(|t| !t.is_empty()) {
        description.push_str("\n\nReflection: ");
        description.push_str(text);
    }
    description
}
