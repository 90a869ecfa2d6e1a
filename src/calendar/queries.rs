//! Read-only queries over CalendarData

use super::calendar_data::CalendarData;
use super::event::CalendarEvent;

impl CalendarData {
    /// All events of `owner_id`, ordered by start time.
    pub fn for_owner(&self, owner_id: &str) -> Vec<&CalendarEvent> {
        let mut events: Vec<_> = self
            .events
            .iter()
            .filter(|e| e.owner_id == owner_id)
            .collect();
        events.sort_by_key(|e| e.start);
        events
    }

    /// Events of `owner_id` lying entirely within `[start, end]` (epoch ms),
    /// ordered by start time.
    pub fn in_range(&self, owner_id: &str, start: i64, end: i64) -> Vec<&CalendarEvent> {
        let mut events: Vec<_> = self
            .events
            .iter()
            .filter(|e| e.owner_id == owner_id && e.within(start, end))
            .collect();
        events.sort_by_key(|e| e.start);
        events
    }
}
