//! Calendar event handlers for FocusServerHandler

use crate::FocusServerHandler;
use crate::calendar::NewEvent;
use crate::formatting::{self, OriginalTime};
use crate::resolver::TimeOfDay;
use crate::validation;
use mcp_attr::{Result as McpResult, bail_public};

/// Raw event arguments shared by create and update.
struct EventArgs {
    title: String,
    description: Option<String>,
    start_date: String,
    start_time: String,
    duration: Option<u32>,
    location: Option<String>,
    all_day: Option<bool>,
    color: Option<String>,
}

impl FocusServerHandler {
    /// Validate the arguments and resolve the start/end instants.
    fn build_event(&self, args: EventArgs) -> McpResult<(NewEvent, TimeOfDay)> {
        let title = args.title.trim().to_string();
        if title.is_empty() {
            bail_public!(_, "Title is required");
        }
        let duration =
            validation::parse_event_duration(args.duration, self.config.default_event_duration)?;
        let (range, time) = validation::resolve_event_time(
            &args.start_date,
            &args.start_time,
            duration,
            &self.now(),
        )?;

        let color = args
            .color
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| self.config.default_color.clone());

        let event = NewEvent {
            title,
            description: args.description,
            start: range.start_millis(),
            end: range.end_millis(),
            all_day: args.all_day.unwrap_or(false),
            color,
            location: args.location,
        };
        Ok((event, time))
    }

    fn event_output(&self, id: &str, time: Option<TimeOfDay>) -> McpResult<String> {
        let data = self.data.lock().unwrap();
        let event = match data.find_by_id(id) {
            Some(event) => event.clone(),
            None => {
                drop(data);
                bail_public!(_, "Event '{}' not found after saving", id);
            }
        };
        drop(data);

        let original_time = time.map(|t| OriginalTime::new(t, self.config.timezone.name()));
        formatting::event_json(&event, original_time)
    }

    /// **Schedule**: Create an event from a natural-language date and time.
    #[allow(clippy::too_many_arguments)]
    pub async fn handle_create_calendar_event(
        &self,
        title: String,
        description: Option<String>,
        start_date: String,
        start_time: String,
        duration: Option<u32>,
        location: Option<String>,
        all_day: Option<bool>,
        color: Option<String>,
    ) -> McpResult<String> {
        let (event, time) = self.build_event(EventArgs {
            title,
            description,
            start_date,
            start_time,
            duration,
            location,
            all_day,
            color,
        })?;

        let id = self.commit_change(|data| {
            let id = data.create(event, &self.config.owner_id);
            let message = format!("Create event {}", id);
            Ok((id, message))
        })?;

        self.event_output(&id, Some(time))
    }

    /// **Reschedule**: Replace all fields of an event owned by this server's user.
    #[allow(clippy::too_many_arguments)]
    pub async fn handle_update_calendar_event(
        &self,
        id: String,
        title: String,
        description: Option<String>,
        start_date: String,
        start_time: String,
        duration: Option<u32>,
        location: Option<String>,
        all_day: Option<bool>,
        color: Option<String>,
    ) -> McpResult<String> {
        let id = id.trim().to_string();
        let (event, time) = self.build_event(EventArgs {
            title,
            description,
            start_date,
            start_time,
            duration,
            location,
            all_day,
            color,
        })?;

        self.commit_change(|data| {
            if let Err(e) = data.update(&id, event, &self.config.owner_id) {
                bail_public!(_, "{}", e);
            }
            Ok(((), format!("Update event {}", id)))
        })?;

        self.event_output(&id, Some(time))
    }

    pub async fn handle_delete_calendar_event(&self, id: String) -> McpResult<String> {
        let id = id.trim().to_string();

        let removed = self.commit_change(|data| match data.remove(&id, &self.config.owner_id) {
            Ok(event) => Ok((event, format!("Delete event {}", id))),
            Err(e) => bail_public!(_, "{}", e),
        })?;

        Ok(format!("Event {} ({}) deleted", id, removed.title))
    }
}
