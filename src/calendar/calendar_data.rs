use serde::{Deserialize, Serialize};
use tracing::debug;

use super::event::{CalendarEvent, NewEvent};
use super::planning::{DailyTask, Intention};
use crate::error::CalendarError;

/// Current on-disk format version.
pub const FORMAT_VERSION: u32 = 1;

/// The persisted calendar document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarData {
    /// Format version for the TOML file (current: 1)
    #[serde(default = "default_format_version")]
    pub format_version: u32,

    /// Counter for generating `evt-<n>` ids; never reused after removal
    #[serde(default)]
    pub event_counter: u64,

    /// Events in insertion order, which keeps TOML diffs stable
    #[serde(default)]
    pub events: Vec<CalendarEvent>,

    /// Counter for `task-<n>` ids
    #[serde(default)]
    pub task_counter: u64,

    #[serde(default)]
    pub daily_tasks: Vec<DailyTask>,

    /// Counter shared by `week-<n>` and `month-<n>` ids
    #[serde(default)]
    pub intention_counter: u64,

    #[serde(default)]
    pub weekly_intentions: Vec<Intention>,

    #[serde(default)]
    pub monthly_intentions: Vec<Intention>,
}

fn default_format_version() -> u32 {
    FORMAT_VERSION
}

impl Default for CalendarData {
    fn default() -> Self {
        Self {
            format_version: FORMAT_VERSION,
            event_counter: 0,
            events: Vec::new(),
            task_counter: 0,
            daily_tasks: Vec::new(),
            intention_counter: 0,
            weekly_intentions: Vec::new(),
            monthly_intentions: Vec::new(),
        }
    }
}

impl CalendarData {
    pub fn new() -> Self {
        Self::default()
    }

    fn generate_event_id(&mut self) -> String {
        self.event_counter += 1;
        format!("evt-{}", self.event_counter)
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    pub fn find_by_id(&self, id: &str) -> Option<&CalendarEvent> {
        self.events.iter().find(|e| e.id == id)
    }

    /// Insert a new event for `owner_id` and return its id.
    pub fn create(&mut self, event: NewEvent, owner_id: &str) -> String {
        let id = self.generate_event_id();
        self.events.push(event.into_event(id.clone(), owner_id));
        debug!(%id, owner = owner_id, "event created");
        id
    }

    /// Replace the fields of an event owned by `owner_id`.
    pub fn update(
        &mut self,
        id: &str,
        event: NewEvent,
        owner_id: &str,
    ) -> Result<&CalendarEvent, CalendarError> {
        let pos = self.owned_position(id, owner_id)?;
        self.events[pos] = event.into_event(id.to_string(), owner_id);
        debug!(%id, owner = owner_id, "event updated");
        Ok(&self.events[pos])
    }

    /// Remove an event owned by `owner_id`.
    pub fn remove(&mut self, id: &str, owner_id: &str) -> Result<CalendarEvent, CalendarError> {
        let pos = self.owned_position(id, owner_id)?;
        debug!(%id, owner = owner_id, "event removed");
        Ok(self.events.remove(pos))
    }

    fn owned_position(&self, id: &str, owner_id: &str) -> Result<usize, CalendarError> {
        self.events
            .iter()
            .position(|e| e.id == id && e.owner_id == owner_id)
            .ok_or_else(|| CalendarError(id.to_string()))
    }
}
