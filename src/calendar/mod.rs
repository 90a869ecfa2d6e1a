//! Calendar domain model
//!
//! - `event`: stored events and caller-supplied event fields
//! - `calendar_data`: the persisted document with create/update/remove
//! - `queries`: owner and time-range lookups
//! - `planning`: daily tasks and weekly/monthly intentions

mod calendar_data;
mod event;
mod planning;
mod queries;

pub use calendar_data::{CalendarData, FORMAT_VERSION};
pub use event::{CalendarEvent, NewEvent};
pub use planning::{DailyTask, Intention, IntentionScope};
