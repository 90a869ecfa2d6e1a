//! Daily tasks and weekly/monthly intentions kept alongside the calendar

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use super::calendar_data::CalendarData;
use crate::error::PlanningError;

/// A to-do item on the owner's daily list. Timestamps are epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyTask {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    pub owner_id: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// A colored goal for the current week or month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intention {
    pub id: String,
    pub text: String,
    pub color: String,
    pub owner_id: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntentionScope {
    Weekly,
    Monthly,
}

impl IntentionScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentionScope::Weekly => "weekly",
            IntentionScope::Monthly => "monthly",
        }
    }

    /// Id prefix; intention ids are unique across both scopes.
    pub(crate) fn id_prefix(&self) -> &'static str {
        match self {
            IntentionScope::Weekly => "week",
            IntentionScope::Monthly => "month",
        }
    }
}

impl fmt::Display for IntentionScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IntentionScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "weekly" | "week" => Ok(IntentionScope::Weekly),
            "monthly" | "month" => Ok(IntentionScope::Monthly),
            _ => Err(format!(
                "Invalid intention scope '{}'. Valid options are: weekly, monthly",
                s
            )),
        }
    }
}

impl CalendarData {
    fn generate_task_id(&mut self) -> String {
        self.task_counter += 1;
        format!("task-{}", self.task_counter)
    }

    fn generate_intention_id(&mut self, scope: IntentionScope) -> String {
        self.intention_counter += 1;
        format!("{}-{}", scope.id_prefix(), self.intention_counter)
    }

    /// Daily tasks of `owner_id` in the order they were added.
    pub fn daily_tasks_for(&self, owner_id: &str) -> Vec<&DailyTask> {
        self.daily_tasks
            .iter()
            .filter(|t| t.owner_id == owner_id)
            .collect()
    }

    pub fn add_daily_task(&mut self, text: &str, owner_id: &str, now: i64) -> &DailyTask {
        let id = self.generate_task_id();
        debug!(%id, owner = owner_id, "daily task added");
        self.daily_tasks.push(DailyTask {
            id,
            text: text.to_string(),
            completed: false,
            owner_id: owner_id.to_string(),
            created_at: now,
            updated_at: now,
        });
        &self.daily_tasks[self.daily_tasks.len() - 1]
    }

    /// Flip a task between done and not done.
    pub fn toggle_daily_task(
        &mut self,
        id: &str,
        owner_id: &str,
        now: i64,
    ) -> Result<&DailyTask, PlanningError> {
        let task = self
            .daily_tasks
            .iter_mut()
            .find(|t| t.id == id && t.owner_id == owner_id)
            .ok_or_else(|| PlanningError::TaskNotFound(id.to_string()))?;
        task.completed = !task.completed;
        task.updated_at = now;
        debug!(%id, completed = task.completed, "daily task toggled");
        Ok(task)
    }

    pub fn remove_daily_task(&mut self, id: &str, owner_id: &str) -> Result<DailyTask, PlanningError> {
        let pos = self
            .daily_tasks
            .iter()
            .position(|t| t.id == id && t.owner_id == owner_id)
            .ok_or_else(|| PlanningError::TaskNotFound(id.to_string()))?;
        debug!(%id, owner = owner_id, "daily task removed");
        Ok(self.daily_tasks.remove(pos))
    }

    fn intentions(&self, scope: IntentionScope) -> &Vec<Intention> {
        match scope {
            IntentionScope::Weekly => &self.weekly_intentions,
            IntentionScope::Monthly => &self.monthly_intentions,
        }
    }

    fn intentions_mut(&mut self, scope: IntentionScope) -> &mut Vec<Intention> {
        match scope {
            IntentionScope::Weekly => &mut self.weekly_intentions,
            IntentionScope::Monthly => &mut self.monthly_intentions,
        }
    }

    /// Intentions of `owner_id` for `scope` in the order they were added.
    pub fn intentions_for(&self, scope: IntentionScope, owner_id: &str) -> Vec<&Intention> {
        self.intentions(scope)
            .iter()
            .filter(|i| i.owner_id == owner_id)
            .collect()
    }

    pub fn add_intention(
        &mut self,
        scope: IntentionScope,
        text: &str,
        color: &str,
        owner_id: &str,
        now: i64,
    ) -> &Intention {
        let id = self.generate_intention_id(scope);
        debug!(%id, %scope, owner = owner_id, "intention added");
        let list = self.intentions_mut(scope);
        list.push(Intention {
            id,
            text: text.to_string(),
            color: color.to_string(),
            owner_id: owner_id.to_string(),
            created_at: now,
            updated_at: now,
        });
        &list[list.len() - 1]
    }

    /// Replace the text and, when given, the color of an intention in either scope.
    pub fn update_intention(
        &mut self,
        id: &str,
        text: &str,
        color: Option<&str>,
        owner_id: &str,
        now: i64,
    ) -> Result<(IntentionScope, &Intention), PlanningError> {
        let (scope, pos) = self.owned_intention(id, owner_id)?;
        let intention = &mut self.intentions_mut(scope)[pos];
        intention.text = text.to_string();
        if let Some(color) = color {
            intention.color = color.to_string();
        }
        intention.updated_at = now;
        debug!(%id, %scope, "intention updated");
        Ok((scope, &*intention))
    }

    pub fn remove_intention(
        &mut self,
        id: &str,
        owner_id: &str,
    ) -> Result<(IntentionScope, Intention), PlanningError> {
        let (scope, pos) = self.owned_intention(id, owner_id)?;
        debug!(%id, %scope, "intention removed");
        Ok((scope, self.intentions_mut(scope).remove(pos)))
    }

    fn owned_intention(
        &self,
        id: &str,
        owner_id: &str,
    ) -> Result<(IntentionScope, usize), PlanningError> {
        [IntentionScope::Weekly, IntentionScope::Monthly]
            .into_iter()
            .find_map(|scope| {
                self.intentions(scope)
                    .iter()
                    .position(|i| i.id == id && i.owner_id == owner_id)
                    .map(|pos| (scope, pos))
            })
            .ok_or_else(|| PlanningError::IntentionNotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_parsing() {
        assert_eq!("Weekly".parse::<IntentionScope>(), Ok(IntentionScope::Weekly));
        assert_eq!(" month ".parse::<IntentionScope>(), Ok(IntentionScope::Monthly));
        assert!("yearly".parse::<IntentionScope>().is_err());
    }

    #[test]
    fn test_daily_task_lifecycle() {
        let mut data = CalendarData::new();
        let id = data.add_daily_task("Inbox zero", "alice", 1_000).id.clone();
        assert_eq!(id, "task-1");
        data.add_daily_task("Call mum", "bob", 1_000);

        let task = data.toggle_daily_task(&id, "alice", 2_000).unwrap();
        assert!(task.completed);
        assert_eq!(task.created_at, 1_000);
        assert_eq!(task.updated_at, 2_000);
        assert!(!data.toggle_daily_task(&id, "alice", 3_000).unwrap().completed);

        let mine: Vec<_> = data
            .daily_tasks_for("alice")
            .into_iter()
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(mine, vec!["Inbox zero"]);

        assert_eq!(data.remove_daily_task(&id, "alice").unwrap().text, "Inbox zero");
        assert_eq!(data.add_daily_task("again", "alice", 4_000).id, "task-3");
    }

    #[test]
    fn test_daily_task_owner_check() {
        let mut data = CalendarData::new();
        let id = data.add_daily_task("private", "alice", 0).id.clone();

        let err = data.toggle_daily_task(&id, "bob", 1).unwrap_err();
        assert_eq!(err.to_string(), "Task not found or access denied: task-1");
        assert!(data.remove_daily_task(&id, "bob").is_err());
        assert!(data.remove_daily_task("task-9", "alice").is_err());
        assert!(!data.daily_tasks_for("alice")[0].completed);
    }

    #[test]
    fn test_intentions_are_scoped() {
        let mut data = CalendarData::new();
        let week = data
            .add_intention(IntentionScope::Weekly, "Ship beta", "green", "me", 10)
            .id
            .clone();
        let month = data
            .add_intention(IntentionScope::Monthly, "Read two books", "violet", "me", 10)
            .id
            .clone();
        assert_eq!(week, "week-1");
        assert_eq!(month, "month-2");
        assert_eq!(data.intentions_for(IntentionScope::Weekly, "me").len(), 1);
        assert_eq!(data.intentions_for(IntentionScope::Monthly, "me")[0].text, "Read two books");
        assert!(data.intentions_for(IntentionScope::Weekly, "you").is_empty());

        let (scope, updated) = data
            .update_intention(&month, "Read three books", None, "me", 20)
            .unwrap();
        assert_eq!(scope, IntentionScope::Monthly);
        assert_eq!(updated.text, "Read three books");
        assert_eq!(updated.color, "violet");
        assert_eq!(updated.updated_at, 20);

        let (_, updated) = data.update_intention(&week, "Ship GA", Some("rose"), "me", 30).unwrap();
        assert_eq!(updated.color, "rose");

        let (scope, removed) = data.remove_intention(&week, "me").unwrap();
        assert_eq!(scope, IntentionScope::Weekly);
        assert_eq!(removed.text, "Ship GA");
        assert!(data.intentions_for(IntentionScope::Weekly, "me").is_empty());
    }

    #[test]
    fn test_intention_owner_check() {
        let mut data = CalendarData::new();
        let id = data
            .add_intention(IntentionScope::Weekly, "Run 3x", "blue", "alice", 0)
            .id
            .clone();
        let err = data.update_intention(&id, "hijack", None, "bob", 1).unwrap_err();
        assert_eq!(err.to_string(), "Intention not found or access denied: week-1");
        assert!(data.remove_intention(&id, "bob").is_err());
        assert_eq!(data.intentions_for(IntentionScope::Weekly, "alice")[0].text, "Run 3x");
    }

    #[test]
    fn test_planning_sections_roundtrip() {
        let mut data = CalendarData::new();
        data.add_daily_task("water plants", "me", 5);
        data.add_intention(IntentionScope::Monthly, "Learn Rust", "blue", "me", 5);
        let text = toml::to_string_pretty(&data).unwrap();
        assert!(text.contains("[[daily_tasks]]"));
        assert!(text.contains("[[monthly_intentions]]"));
        let back: CalendarData = toml::from_str(&text).unwrap();
        assert_eq!(back, data);

        let legacy: CalendarData = toml::from_str("format_version = 1\nevent_counter = 0\n").unwrap();
        assert!(legacy.daily_tasks.is_empty());
        assert_eq!(legacy.task_counter, 0);
    }
}
