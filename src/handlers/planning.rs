//! Daily task and intention handlers for FocusServerHandler

use crate::FocusServerHandler;
use crate::calendar::{Intention, IntentionScope};
use crate::formatting;
use crate::validation;
use mcp_attr::{Result as McpResult, bail_public};
use serde::Serialize;

#[derive(Serialize)]
struct IntentionLists<'a> {
    weekly: Vec<&'a Intention>,
    monthly: Vec<&'a Intention>,
}

impl FocusServerHandler {
    fn now_millis(&self) -> i64 {
        self.now().timestamp_millis()
    }

    fn color_or_default(&self, color: Option<String>) -> String {
        color
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| self.config.default_color.clone())
    }

    pub async fn handle_list_daily_tasks(&self) -> McpResult<String> {
        let data = self.data.lock().unwrap();
        formatting::to_json(&data.daily_tasks_for(&self.config.owner_id))
    }

    pub async fn handle_add_daily_task(&self, text: String) -> McpResult<String> {
        let text = validation::parse_text("text", &text)?;
        let now = self.now_millis();

        let task = self.commit_change(|data| {
            let task = data
                .add_daily_task(&text, &self.config.owner_id, now)
                .clone();
            let message = format!("Add daily task {}", task.id);
            Ok((task, message))
        })?;

        formatting::to_json(&task)
    }

    /// **Check off**: Flip a daily task between done and not done.
    pub async fn handle_toggle_daily_task(&self, id: String) -> McpResult<String> {
        let id = id.trim().to_string();
        let now = self.now_millis();

        let task = self.commit_change(|data| {
            match data.toggle_daily_task(&id, &self.config.owner_id, now) {
                Ok(task) => Ok((task.clone(), format!("Toggle daily task {}", id))),
                Err(e) => bail_public!(_, "{}", e),
            }
        })?;

        formatting::to_json(&task)
    }

    pub async fn handle_delete_daily_task(&self, id: String) -> McpResult<String> {
        let id = id.trim().to_string();

        let removed = self.commit_change(|data| {
            match data.remove_daily_task(&id, &self.config.owner_id) {
                Ok(task) => Ok((task, format!("Delete daily task {}", id))),
                Err(e) => bail_public!(_, "{}", e),
            }
        })?;

        Ok(format!("Daily task {} ({}) deleted", id, removed.text))
    }

    /// Intentions for one scope, or both when `scope` is omitted.
    pub async fn handle_list_intentions(&self, scope: Option<String>) -> McpResult<String> {
        let scope = scope
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(validation::parse_intention_scope)
            .transpose()?;

        let data = self.data.lock().unwrap();
        let owner = &self.config.owner_id;
        match scope {
            Some(scope) => formatting::to_json(&data.intentions_for(scope, owner)),
            None => formatting::to_json(&IntentionLists {
                weekly: data.intentions_for(IntentionScope::Weekly, owner),
                monthly: data.intentions_for(IntentionScope::Monthly, owner),
            }),
        }
    }

    pub async fn handle_add_intention(
        &self,
        scope: String,
        text: String,
        color: Option<String>,
    ) -> McpResult<String> {
        let scope = validation::parse_intention_scope(&scope)?;
        let text = validation::parse_text("text", &text)?;
        let color = self.color_or_default(color);
        let now = self.now_millis();

        let intention = self.commit_change(|data| {
            let intention = data
                .add_intention(scope, &text, &color, &self.config.owner_id, now)
                .clone();
            let message = format!("Add {} intention {}", scope, intention.id);
            Ok((intention, message))
        })?;

        formatting::to_json(&intention)
    }

    /// **Revise**: Replace an intention's text; the color is kept unless given.
    pub async fn handle_update_intention(
        &self,
        id: String,
        text: String,
        color: Option<String>,
    ) -> McpResult<String> {
        let id = id.trim().to_string();
        let text = validation::parse_text("text", &text)?;
        let color = color
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        let now = self.now_millis();

        let intention = self.commit_change(|data| {
            match data.update_intention(&id, &text, color.as_deref(), &self.config.owner_id, now) {
                Ok((scope, intention)) => Ok((
                    intention.clone(),
                    format!("Update {} intention {}", scope, id),
                )),
                Err(e) => bail_public!(_, "{}", e),
            }
        })?;

        formatting::to_json(&intention)
    }

    pub async fn handle_delete_intention(&self, id: String) -> McpResult<String> {
        let id = id.trim().to_string();

        let (scope, removed) = self.commit_change(|data| {
            match data.remove_intention(&id, &self.config.owner_id) {
                Ok((scope, intention)) => Ok((
                    (scope, intention),
                    format!("Delete {} intention {}", scope, id),
                )),
                Err(e) => bail_public!(_, "{}", e),
            }
        })?;

        Ok(format!(
            "Intention {} ({}) deleted from {} intentions",
            id, removed.text, scope
        ))
    }
}
