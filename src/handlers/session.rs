//! Focus session handlers for FocusServerHandler

use crate::FocusServerHandler;
use crate::formatting;
use crate::session::{
    SessionRunner, SessionStatus, StatusChange, minutes_to_countdown, notify_completion,
    session_event,
};
use crate::validation;
use chrono::Utc;
use mcp_attr::{Result as McpResult, bail_public};
use tracing::info;

const NO_SESSION: &str = "No active focus session";

impl FocusServerHandler {
    /// Stop and discard the background runner, if one exists.
    fn stop_runner(&self) {
        if let Some(runner) = self.runner.lock().unwrap().take() {
            runner.shutdown();
        }
    }

    pub async fn handle_start_session(
        &self,
        duration: f64,
        tasks: Vec<String>,
        session_type: Option<String>,
    ) -> McpResult<String> {
        let minutes = validation::parse_session_minutes(duration)?;
        let tasks = validation::parse_tasks(tasks)?;
        let session_type = validation::parse_session_type(session_type.as_deref())?;
        let duration_total = minutes_to_countdown(minutes);

        self.stop_runner();

        let mut sessions = self.sessions.lock().unwrap();
        let started = sessions
            .start(tasks, &duration_total, session_type, Utc::now())
            .map(|timer| (timer.serial(), timer.snapshot()));
        let (serial, snapshot) = match started {
            Ok(started) => started,
            Err(e) => {
                drop(sessions);
                bail_public!(_, "Failed to start session: {}", e);
            }
        };
        drop(sessions);

        let runner = SessionRunner::spawn(
            self.sessions.clone(),
            serial,
            self.config.tick_interval,
            self.notifier.clone(),
        );
        *self.runner.lock().unwrap() = Some(runner);

        formatting::session_json(&snapshot)
    }

    pub async fn handle_session_status(&self) -> McpResult<String> {
        match self.session_snapshot() {
            Some(snapshot) => formatting::session_json(&snapshot),
            None => Ok(NO_SESSION.to_string()),
        }
    }

    pub async fn handle_set_session_status(&self, status: String) -> McpResult<String> {
        let requested = validation::parse_requested_status(&status)?;

        let mut sessions = self.sessions.lock().unwrap();
        let change = match sessions.set_status(requested) {
            Ok(Some(change)) => change,
            Ok(None) => return Ok(NO_SESSION.to_string()),
            Err(e) => {
                drop(sessions);
                bail_public!(_, "{}", e);
            }
        };
        let time_left = sessions
            .current()
            .map(|t| t.time_left().to_string())
            .unwrap_or_default();
        drop(sessions);

        match change {
            StatusChange::Unchanged(current) => {
                Ok(format!("Session is already {} ({} left)", current, time_left))
            }
            StatusChange::Changed { to, .. } => {
                if let Some(runner) = self.runner.lock().unwrap().as_ref() {
                    match to {
                        SessionStatus::Paused => runner.pause(),
                        SessionStatus::Running => runner.resume(),
                        SessionStatus::Idle | SessionStatus::Completed => {}
                    }
                }
                Ok(format!("Session {} ({} left)", to, time_left))
            }
            StatusChange::Completed(snapshot) => {
                self.stop_runner();
                notify_completion(self.notifier.as_ref(), &snapshot);
                Ok("Session completed. Use save_session to record it in the calendar.".to_string())
            }
        }
    }

    pub async fn handle_cancel_session(&self) -> McpResult<String> {
        self.stop_runner();
        match self.sessions.lock().unwrap().cancel() {
            Some(timer) => Ok(format!(
                "Focus session {} cancelled with {} left",
                timer.id(),
                timer.time_left()
            )),
            None => Ok(NO_SESSION.to_string()),
        }
    }

    pub async fn handle_save_session(
        &self,
        emotion: Option<String>,
        reflection: Option<String>,
    ) -> McpResult<String> {
        let emotion = validation::parse_emotion(emotion.as_deref())?;

        let mut sessions = self.sessions.lock().unwrap();
        let timer = match sessions.take_completed() {
            Ok(Some(timer)) => timer,
            Ok(None) => {
                drop(sessions);
                bail_public!(_, "{}", NO_SESSION);
            }
            Err(e) => {
                drop(sessions);
                bail_public!(
                    _,
                    "Cannot save yet: {}. Use set_session_status with \"completed\" to finish early.",
                    e
                );
            }
        };
        drop(sessions);
        self.stop_runner();

        let event = match session_event(&timer, emotion, reflection.as_deref()) {
            Ok(event) => event,
            Err(e) => bail_public!(_, "Failed to build session event: {}", e),
        };

        let saved = self.commit_change(|data| {
            let id = data.create(event, &self.config.owner_id);
            Ok((id, format!("Save focus session {}", timer.id())))
        });
        let id = match saved {
            Ok(id) => id,
            Err(e) => {
                self.sessions.lock().unwrap().restore(timer);
                return Err(e);
            }
        };

        info!(session = %timer.id(), event = %id, "focus session saved");
        Ok(format!("Focus session saved as event {}", id))
    }
}
