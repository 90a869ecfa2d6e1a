//! Weather handler

use crate::FocusServerHandler;
use crate::formatting;
use mcp_attr::{Result as McpResult, bail_public};
use tracing::info;

impl FocusServerHandler {
    pub async fn handle_display_weather(&self, location: String) -> McpResult<String> {
        let location = location.trim();
        if location.is_empty() {
            bail_public!(_, "Location is required, e.g. \"Tokyo\" or \"San Francisco\"");
        }
        info!(location, "weather requested");
        formatting::weather_json(location)
    }
}
