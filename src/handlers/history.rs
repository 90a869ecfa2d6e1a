//! Event history handler

use crate::FocusServerHandler;
use crate::history::{format_history, history_range};
use mcp_attr::{Result as McpResult, bail_public};

impl FocusServerHandler {
    pub async fn handle_fetch_event_history(
        &self,
        time_period: String,
        start_date: Option<String>,
        end_date: Option<String>,
    ) -> McpResult<String> {
        let now = self.now();
        let range = match history_range(
            &time_period,
            start_date.as_deref().filter(|s| !s.trim().is_empty()),
            end_date.as_deref().filter(|s| !s.trim().is_empty()),
            &now,
        ) {
            Ok(range) => range,
            Err(e) => bail_public!(_, "{}. Dates must be YYYY-MM-DD", e),
        };

        let data = self.data.lock().unwrap();
        let events = data.in_range(&self.config.owner_id, range.start, range.end);
        Ok(format_history(&events, &range, &self.config.timezone))
    }
}
