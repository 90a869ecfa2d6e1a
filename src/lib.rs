//! Focus MCP Server Library
//!
//! A Model Context Protocol (MCP) server backing a personal productivity
//! assistant: it turns loose date/time phrases into calendar events, runs
//! countdown focus sessions and journals them, keeps a daily to-do list with
//! weekly and monthly intentions, and lists past events.
//!
//! # Architecture
//!
//! The library follows a 3-layer architecture:
//! - **MCP Layer**: `FocusServerHandler` - one tool per assistant capability,
//!   delegating to `handlers`
//! - **Domain Layer**: `resolver`, `session`, `calendar`, `history`
//! - **Persistence Layer**: `storage` module - TOML file with optional Git sync
//!
//! # Example
//!
//! ```no_run
//! use focus_mcp::{Config, FocusServerHandler};
//! use anyhow::Result;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let handler = FocusServerHandler::new(&Config::new("calendar.toml"))?;
//!     // Use handler with MCP server...
//!     Ok(())
//! }
//! ```

pub mod calendar;
pub mod config;
pub mod error;
pub mod formatting;
mod git_ops;
mod handlers;
pub mod history;
pub mod resolver;
pub mod session;
mod storage;
pub mod validation;

use anyhow::Result;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use mcp_attr::{Result as McpResult, bail_public};
use mcp_attr::server::{McpServer, mcp_server};
use std::sync::{Arc, Mutex};
use tracing::warn;

pub use calendar::{CalendarData, CalendarEvent, DailyTask, Intention, IntentionScope, NewEvent};
pub use config::{Args, Config};
pub use error::{CalendarError, FormatError, PlanningError, ResolveError, SessionError};
pub use git_ops::GitOps;
pub use resolver::{ResolvedDateRange, resolve};
pub use session::{CompletionNotifier, FocusSessions, SessionRunner, SessionStatus};
pub use storage::Storage;

/// MCP Server handler for calendar events and focus sessions
///
/// Calendar events, daily tasks and intentions are persisted to a TOML file
/// (optionally synchronized with Git). Focus sessions live in memory and are
/// ticked in the background.
pub struct FocusServerHandler {
    pub(crate) data: Mutex<CalendarData>,
    pub(crate) storage: Storage,
    pub(crate) config: Config,
    pub(crate) sessions: Arc<Mutex<FocusSessions>>,
    pub(crate) runner: Mutex<Option<SessionRunner>>,
    pub(crate) notifier: Arc<dyn CompletionNotifier>,
}

impl FocusServerHandler {
    /// Create a handler using the notifier selected in `config`.
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_notifier(config, config.notifier.build())
    }

    /// Create a handler with a caller-supplied completion notifier.
    pub fn with_notifier(config: &Config, notifier: Arc<dyn CompletionNotifier>) -> Result<Self> {
        let storage = Storage::new(&config.data_file, config.sync_git);
        let data = Mutex::new(storage.load()?);
        Ok(Self {
            data,
            storage,
            config: config.clone(),
            sessions: Arc::new(Mutex::new(FocusSessions::new())),
            runner: Mutex::new(None),
            notifier,
        })
    }

    /// The current instant in the configured timezone.
    pub(crate) fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.config.timezone)
    }

    /// Apply `change` to a copy of the data, save it, then publish it.
    ///
    /// `change` returns its result and the commit message. The in-memory data
    /// is only replaced once the write has succeeded, so a rejected change or
    /// a failed save leaves it as it was.
    pub(crate) fn commit_change<T>(
        &self,
        change: impl FnOnce(&mut CalendarData) -> McpResult<(T, String)>,
    ) -> McpResult<T> {
        let mut data = self.data.lock().unwrap();
        let mut draft = data.clone();
        let (value, message) = change(&mut draft)?;
        if let Err(e) = self.storage.save_with_message(&draft, &message) {
            drop(data);
            bail_public!(_, "Failed to save: {}", e);
        }
        *data = draft;
        Ok(value)
    }

    /// Read access to the calendar, for embedding and tests.
    pub fn calendar(&self) -> CalendarData {
        self.data.lock().unwrap().clone()
    }

    /// Current focus session, if any.
    pub fn session_snapshot(&self) -> Option<session::SessionSnapshot> {
        self.sessions
            .lock()
            .unwrap()
            .current()
            .map(|t| t.snapshot())
    }
}

impl Drop for FocusServerHandler {
    fn drop(&mut self) {
        if let Some(runner) = self.runner.lock().unwrap().take() {
            runner.shutdown();
        }
        if let Err(e) = self.storage.shutdown() {
            warn!(error = %e, "shutdown git sync failed");
        }
    }
}

/// Personal productivity assistant: calendar scheduling, focus sessions, daily
/// tasks and intentions.
///
/// Dates may be relative ("tomorrow", "friday", "next monday", "next week") or
/// literal ("2025-03-15", "March 15"). Times are "2:30 PM", "9am" or "14:30"
/// and are read in the server's configured timezone.
///
/// Focus sessions count down in the background. A session moves
/// running <-> paused and ends as completed; once completed it can be saved to
/// the calendar with an emotion (Fulfilled, Flow, Calm, Courage, Stress,
/// Afraid) and a short reflection.
#[mcp_server]
impl McpServer for FocusServerHandler {
    /// **Weather**: Show the weather for a location.
    #[tool]
    async fn display_weather(
        &self,
        /// Location: city or place name
        location: String,
    ) -> McpResult<String> {
        self.handle_display_weather(location).await
    }

    /// **Focus**: Start a countdown focus session. Replaces any session already running.
    /// **Workflow**: start_session → set_session_status (pause/resume) → save_session once completed.
    #[tool]
    async fn start_session(
        &self,
        /// Duration in minutes, 1-180 (fractions allowed, e.g. 1.5 = 1:30)
        duration: f64,
        /// Tasks to work on during the session (at least one)
        tasks: Vec<String>,
        /// Session type: focus/break/meeting (optional, default focus)
        session_type: Option<String>,
    ) -> McpResult<String> {
        self.handle_start_session(duration, tasks, session_type)
            .await
    }

    /// **Focus**: Show the active session, its status and time left.
    #[tool]
    async fn session_status(&self) -> McpResult<String> {
        self.handle_session_status().await
    }

    /// **Focus**: Pause, resume or finish the active session.
    /// **Status**: "paused" holds the time left, "running" resumes, "completed" ends the session now.
    #[tool]
    async fn set_session_status(
        &self,
        /// Status: running/paused/completed
        status: String,
    ) -> McpResult<String> {
        self.handle_set_session_status(status).await
    }

    /// **Focus**: Discard the active session without saving it.
    #[tool]
    async fn cancel_session(&self) -> McpResult<String> {
        self.handle_cancel_session().await
    }

    /// **Journal**: Save the completed session to the calendar.
    /// **Tip**: Ask the user how the session felt before saving.
    #[tool]
    async fn save_session(
        &self,
        /// Emotion: Fulfilled/Flow/Calm/Courage/Stress/Afraid (optional)
        emotion: Option<String>,
        /// Reflection: a few words about the session (optional)
        reflection: Option<String>,
    ) -> McpResult<String> {
        self.handle_save_session(emotion, reflection).await
    }

    /// **Calendar**: Create an event from a natural date and time.
    #[tool]
    async fn create_calendar_event(
        &self,
        /// Title of the event
        title: String,
        /// Description (optional)
        description: Option<String>,
        /// Start date: "today", "tomorrow", "friday", "next monday", "next week" or YYYY-MM-DD
        start_date: String,
        /// Start time: "2:30 PM", "9am" or "14:30"
        start_time: String,
        /// Duration in minutes (optional, default 60)
        duration: Option<u32>,
        /// Location (optional)
        location: Option<String>,
        /// All-day event (optional, default false)
        all_day: Option<bool>,
        /// Color (optional, default "blue")
        color: Option<String>,
    ) -> McpResult<String> {
        self.handle_create_calendar_event(
            title,
            description,
            start_date,
            start_time,
            duration,
            location,
            all_day,
            color,
        )
        .await
    }

    /// **Calendar**: Replace an existing event's details. Same arguments as create_calendar_event plus its ID.
    #[tool]
    async fn update_calendar_event(
        &self,
        /// Event ID (e.g. "evt-3")
        id: String,
        /// Title of the event
        title: String,
        /// Description (optional)
        description: Option<String>,
        /// Start date: "today", "tomorrow", "friday", "next monday", "next week" or YYYY-MM-DD
        start_date: String,
        /// Start time: "2:30 PM", "9am" or "14:30"
        start_time: String,
        /// Duration in minutes (optional, default 60)
        duration: Option<u32>,
        /// Location (optional)
        location: Option<String>,
        /// All-day event (optional, default false)
        all_day: Option<bool>,
        /// Color (optional, default "blue")
        color: Option<String>,
    ) -> McpResult<String> {
        self.handle_update_calendar_event(
            id,
            title,
            description,
            start_date,
            start_time,
            duration,
            location,
            all_day,
            color,
        )
        .await
    }

    /// **Calendar**: Delete an event by ID.
    #[tool]
    async fn delete_calendar_event(
        &self,
        /// Event ID (e.g. "evt-3")
        id: String,
    ) -> McpResult<String> {
        self.handle_delete_calendar_event(id).await
    }

    /// **Daily tasks**: List today's to-do items with their completion state.
    #[tool]
    async fn list_daily_tasks(&self) -> McpResult<String> {
        self.handle_list_daily_tasks().await
    }

    /// **Daily tasks**: Add an item to the daily to-do list.
    #[tool]
    async fn add_daily_task(
        &self,
        /// Task text
        text: String,
    ) -> McpResult<String> {
        self.handle_add_daily_task(text).await
    }

    /// **Daily tasks**: Mark a task done, or not done again.
    #[tool]
    async fn toggle_daily_task(
        &self,
        /// Task ID (e.g. "task-2")
        id: String,
    ) -> McpResult<String> {
        self.handle_toggle_daily_task(id).await
    }

    /// **Daily tasks**: Remove a task from the list.
    #[tool]
    async fn delete_daily_task(
        &self,
        /// Task ID (e.g. "task-2")
        id: String,
    ) -> McpResult<String> {
        self.handle_delete_daily_task(id).await
    }

    /// **Intentions**: List weekly and monthly intentions.
    #[tool]
    async fn list_intentions(
        &self,
        /// Scope: weekly/monthly (optional, both when omitted)
        scope: Option<String>,
    ) -> McpResult<String> {
        self.handle_list_intentions(scope).await
    }

    /// **Intentions**: Set a goal for this week or this month.
    #[tool]
    async fn add_intention(
        &self,
        /// Scope: weekly/monthly
        scope: String,
        /// What you intend to do
        text: String,
        /// Color (optional, default "blue")
        color: Option<String>,
    ) -> McpResult<String> {
        self.handle_add_intention(scope, text, color).await
    }

    /// **Intentions**: Reword an intention, optionally recoloring it.
    #[tool]
    async fn update_intention(
        &self,
        /// Intention ID (e.g. "week-1" or "month-4")
        id: String,
        /// New text
        text: String,
        /// New color (optional, unchanged when omitted)
        color: Option<String>,
    ) -> McpResult<String> {
        self.handle_update_intention(id, text, color).await
    }

    /// **Intentions**: Delete an intention by ID.
    #[tool]
    async fn delete_intention(
        &self,
        /// Intention ID (e.g. "week-1" or "month-4")
        id: String,
    ) -> McpResult<String> {
        self.handle_delete_intention(id).await
    }

    /// **History**: List past events grouped by day, newest first.
    /// **Periods**: today, yesterday, last week, last 3 days, last month. Give both dates for a custom range.
    #[tool]
    async fn fetch_event_history(
        &self,
        /// Time period, e.g. "yesterday" or "last week"
        time_period: String,
        /// Custom range start: YYYY-MM-DD (optional, needs end_date)
        start_date: Option<String>,
        /// Custom range end: YYYY-MM-DD (optional, needs start_date)
        end_date: Option<String>,
    ) -> McpResult<String> {
        self.handle_fetch_event_history(time_period, start_date, end_date)
            .await
    }
}
