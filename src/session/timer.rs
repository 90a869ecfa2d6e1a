use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

use super::countdown::{format_countdown, parse_countdown};
use crate::error::{FormatError, SessionError};

/// Lifecycle of a focus session.
///
/// `Idle -> Running <-> Paused -> Completed`. `Completed` is terminal; a new
/// session has to be started to count down again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Configured but not counting yet
    Idle,
    /// Counting down once per tick
    Running,
    /// Holding the remaining time
    Paused,
    /// Reached 00:00 (or was forced there)
    Completed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Idle => "idle",
            SessionStatus::Running => "running",
            SessionStatus::Paused => "paused",
            SessionStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "idle" => Ok(SessionStatus::Idle),
            "running" => Ok(SessionStatus::Running),
            "paused" => Ok(SessionStatus::Paused),
            "completed" => Ok(SessionStatus::Completed),
            _ => Err(format!(
                "Invalid session status '{}'. Valid options are: running, paused, completed",
                s
            )),
        }
    }
}

/// What kind of block the session represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    #[default]
    Focus,
    Break,
    Meeting,
}

impl FromStr for SessionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "focus" => Ok(SessionType::Focus),
            "break" => Ok(SessionType::Break),
            "meeting" => Ok(SessionType::Meeting),
            _ => Err(format!(
                "Invalid session type '{}'. Valid options are: focus, break, meeting",
                s
            )),
        }
    }
}

/// Point-in-time copy of a session, safe to hand out of the lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub id: String,
    pub tasks: Vec<String>,
    pub session_type: SessionType,
    pub duration_total: String,
    pub time_left: String,
    pub status: SessionStatus,
    pub started_at: DateTime<Utc>,
}

/// Result of feeding one tick to the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// The session exists but is not running; nothing changed.
    Ignored,
    /// No session with that serial is active any more.
    Stale,
    /// One second was taken off.
    Ticked { time_left: String },
    /// This tick reached 00:00. Returned once per session.
    Completed(SessionSnapshot),
}

/// Result of an explicit status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusChange {
    Unchanged(SessionStatus),
    Changed {
        from: SessionStatus,
        to: SessionStatus,
    },
    /// Forced completion; the latch fired with this call.
    Completed(SessionSnapshot),
}

/// Countdown state machine for a single focus session.
///
/// Only [`SessionTimer::tick`] takes time off, and only while running. The
/// completion latch guarantees that [`TickOutcome::Completed`] or
/// [`StatusChange::Completed`] is produced at most once per session.
#[derive(Debug, Clone)]
pub struct SessionTimer {
    serial: u64,
    id: String,
    tasks: Vec<String>,
    session_type: SessionType,
    duration_total: String,
    remaining_secs: u64,
    time_left: String,
    status: SessionStatus,
    started_at: DateTime<Utc>,
    completion_latched: bool,
}

impl SessionTimer {
    /// Create an idle session; `duration_total` must be `M:SS`.
    pub fn new(
        tasks: Vec<String>,
        duration_total: &str,
        session_type: SessionType,
        started_at: DateTime<Utc>,
    ) -> Result<Self, FormatError> {
        let remaining_secs = parse_countdown(duration_total)?;
        let duration_total = duration_total.trim().to_string();
        Ok(Self {
            serial: 0,
            id: format!("session_{}", started_at.timestamp_millis()),
            tasks,
            session_type,
            time_left: duration_total.clone(),
            duration_total,
            remaining_secs,
            status: SessionStatus::Idle,
            started_at,
            completion_latched: false,
        })
    }

    pub fn serial(&self) -> u64 {
        self.serial
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn tasks(&self) -> &[String] {
        &self.tasks
    }

    pub fn session_type(&self) -> SessionType {
        self.session_type
    }

    pub fn duration_total(&self) -> &str {
        &self.duration_total
    }

    pub fn time_left(&self) -> &str {
        &self.time_left
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id.clone(),
            tasks: self.tasks.clone(),
            session_type: self.session_type,
            duration_total: self.duration_total.clone(),
            time_left: self.time_left.clone(),
            status: self.status,
            started_at: self.started_at,
        }
    }

    /// Apply a caller-requested status.
    ///
    /// Allowed: `idle -> running`, `running <-> paused`, and anything that is
    /// not yet completed `-> completed`. Requesting the current status is a
    /// no-op.
    pub fn set_status(&mut self, to: SessionStatus) -> Result<StatusChange, SessionError> {
        let from = self.status;
        if from == to {
            return Ok(StatusChange::Unchanged(from));
        }

        match (from, to) {
            (SessionStatus::Idle, SessionStatus::Running)
            | (SessionStatus::Running, SessionStatus::Paused)
            | (SessionStatus::Paused, SessionStatus::Running) => {
                self.status = to;
                debug!(session = %self.id, %from, %to, "session status changed");
                Ok(StatusChange::Changed { from, to })
            }
            (_, SessionStatus::Completed) => match self.complete() {
                Some(snapshot) => Ok(StatusChange::Completed(snapshot)),
                None => Ok(StatusChange::Unchanged(self.status)),
            },
            _ => Err(SessionError::InvalidTransition { from, to }),
        }
    }

    /// Take one second off a running session.
    pub fn tick(&mut self) -> TickOutcome {
        if self.status != SessionStatus::Running {
            return TickOutcome::Ignored;
        }

        let next = self.remaining_secs.saturating_sub(1);
        if next == 0 {
            return match self.complete() {
                Some(snapshot) => TickOutcome::Completed(snapshot),
                None => TickOutcome::Ignored,
            };
        }

        self.remaining_secs = next;
        self.time_left = format_countdown(next);
        TickOutcome::Ticked {
            time_left: self.time_left.clone(),
        }
    }

    /// Clamp to 00:00 and enter `completed`, once.
    fn complete(&mut self) -> Option<SessionSnapshot> {
        if self.completion_latched {
            return None;
        }
        self.completion_latched = true;
        self.remaining_secs = 0;
        self.time_left = format_countdown(0);
        self.status = SessionStatus::Completed;
        info!(session = %self.id, "focus session completed");
        Some(self.snapshot())
    }
}

/// Owner of the (at most one) active focus session.
///
/// This is the foreground state: tool handlers change `status` through it and
/// the background ticker feeds it ticks tagged with the session serial, so a
/// tick from a cancelled session can never touch its successor.
#[derive(Debug, Default)]
pub struct FocusSessions {
    current: Option<SessionTimer>,
    serial_counter: u64,
}

impl FocusSessions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new running session, discarding any existing one.
    pub fn start(
        &mut self,
        tasks: Vec<String>,
        duration_total: &str,
        session_type: SessionType,
        now: DateTime<Utc>,
    ) -> Result<&SessionTimer, FormatError> {
        let mut timer = SessionTimer::new(tasks, duration_total, session_type, now)?;
        self.serial_counter += 1;
        timer.serial = self.serial_counter;
        timer.status = SessionStatus::Running;

        if let Some(previous) = self.current.take() {
            info!(session = %previous.id, "replacing focus session");
        }
        info!(session = %timer.id, duration = %timer.duration_total, "focus session started");

        Ok(&*self.current.insert(timer))
    }

    pub fn current(&self) -> Option<&SessionTimer> {
        self.current.as_ref()
    }

    /// Change the active session's status; `Ok(None)` when there is none.
    pub fn set_status(&mut self, to: SessionStatus) -> Result<Option<StatusChange>, SessionError> {
        match self.current.as_mut() {
            Some(timer) => timer.set_status(to).map(Some),
            None => Ok(None),
        }
    }

    /// Drop the active session, returning it.
    pub fn cancel(&mut self) -> Option<SessionTimer> {
        let cancelled = self.current.take();
        if let Some(ref timer) = cancelled {
            info!(session = %timer.id, "focus session cancelled");
        }
        cancelled
    }

    /// Feed one tick to the session with the given serial.
    pub fn tick(&mut self, serial: u64) -> TickOutcome {
        match self.current.as_mut() {
            Some(timer) if timer.serial == serial => timer.tick(),
            _ => TickOutcome::Stale,
        }
    }

    /// Remove and return the active session once it has completed.
    pub fn take_completed(&mut self) -> Result<Option<SessionTimer>, SessionError> {
        match self.current.as_ref().map(SessionTimer::status) {
            None => Ok(None),
            Some(SessionStatus::Completed) => Ok(self.current.take()),
            Some(status) => Err(SessionError::NotCompleted(status)),
        }
    }

    /// Put back a session taken by [`take_completed`](Self::take_completed)
    /// whose journaling failed. A session started in the meantime wins.
    pub fn restore(&mut self, timer: SessionTimer) -> bool {
        if self.current.is_some() {
            return false;
        }
        self.current = Some(timer);
        true
    }
}
