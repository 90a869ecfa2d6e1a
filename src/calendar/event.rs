use serde::{Deserialize, Serialize};

/// A stored calendar event. `start` and `end` are epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start: i64,
    pub end: i64,
    #[serde(default)]
    pub all_day: bool,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub owner_id: String,
}

impl CalendarEvent {
    /// Whether the event lies entirely inside `[start, end]`.
    pub fn within(&self, start: i64, end: i64) -> bool {
        self.start >= start && self.end <= end
    }
}

/// Event fields supplied by a caller; the store assigns id and owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub title: String,
    pub description: Option<String>,
    pub start: i64,
    pub end: i64,
    pub all_day: bool,
    pub color: String,
    pub location: Option<String>,
}

impl NewEvent {
    pub(crate) fn into_event(self, id: String, owner_id: &str) -> CalendarEvent {
        CalendarEvent {
            id,
            title: self.title,
            description: self.description.filter(|d| !d.is_empty()),
            start: self.start,
            end: self.end,
            all_day: self.all_day,
            color: self.color,
            location: self.location.filter(|l| !l.is_empty()),
            owner_id: owner_id.to_string(),
        }
    }
}
