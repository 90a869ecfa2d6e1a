//! Daily task and intention tool tests
mod common;

use common::{get_test_handler, handler_for, json, test_config};
use focus_mcp::FocusServerHandler;
use tempfile::NamedTempFile;

async fn add_task(handler: &FocusServerHandler, text: &str) -> String {
    let output = handler.handle_add_daily_task(text.to_string()).await.unwrap();
    json(&output)["id"].as_str().unwrap().to_string()
}

async fn add_intention(handler: &FocusServerHandler, scope: &str, text: &str) -> String {
    let output = handler
        .handle_add_intention(scope.to_string(), text.to_string(), None)
        .await
        .unwrap();
    json(&output)["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_daily_task_workflow() {
    let (handler, _, _file) = get_test_handler();
    assert_eq!(json(&handler.handle_list_daily_tasks().await.unwrap()), serde_json::json!([]));

    let output = handler
        .handle_add_daily_task("  Review PRs ".to_string())
        .await
        .unwrap();
    let task = json(&output);
    assert_eq!(task["id"], "task-1");
    assert_eq!(task["text"], "Review PRs");
    assert_eq!(task["completed"], false);
    assert_eq!(task["owner_id"], "local-user");
    assert_eq!(task["created_at"], task["updated_at"]);

    let second = add_task(&handler, "Stretch").await;

    let toggled = json(&handler.handle_toggle_daily_task("task-1".to_string()).await.unwrap());
    assert_eq!(toggled["completed"], true);

    let tasks = json(&handler.handle_list_daily_tasks().await.unwrap());
    assert_eq!(tasks.as_array().unwrap().len(), 2);
    assert_eq!(tasks[0]["completed"], true);
    assert_eq!(tasks[1]["text"], "Stretch");

    let message = handler.handle_delete_daily_task(second.clone()).await.unwrap();
    assert_eq!(message, "Daily task task-2 (Stretch) deleted");
    assert_eq!(handler.calendar().daily_tasks.len(), 1);
}

#[tokio::test]
async fn test_daily_task_rejects_blank_and_unknown() {
    let (handler, _, _file) = get_test_handler();
    assert!(handler.handle_add_daily_task("   ".to_string()).await.is_err());
    assert!(handler.handle_toggle_daily_task("task-7".to_string()).await.is_err());
    assert!(handler.handle_delete_daily_task("task-7".to_string()).await.is_err());
    assert_eq!(handler.calendar().task_counter, 0);
}

#[tokio::test]
async fn test_intentions_by_scope() {
    let (handler, _, _file) = get_test_handler();
    let week = add_intention(&handler, "weekly", "Ship the beta").await;
    let output = handler
        .handle_add_intention(
            "Monthly".to_string(),
            "Run 40 km".to_string(),
            Some("emerald".to_string()),
        )
        .await
        .unwrap();
    let month = json(&output);
    assert_eq!(week, "week-1");
    assert_eq!(month["id"], "month-2");
    assert_eq!(month["color"], "emerald");

    let weekly = json(&handler.handle_list_intentions(Some("weekly".to_string())).await.unwrap());
    assert_eq!(weekly.as_array().unwrap().len(), 1);
    assert_eq!(weekly[0]["text"], "Ship the beta");
    assert_eq!(weekly[0]["color"], "blue");

    let both = json(&handler.handle_list_intentions(None).await.unwrap());
    assert_eq!(both["weekly"][0]["id"], "week-1");
    assert_eq!(both["monthly"][0]["id"], "month-2");

    assert!(handler.handle_list_intentions(Some("daily".to_string())).await.is_err());
    assert!(
        handler
            .handle_add_intention("yearly".to_string(), "x".to_string(), None)
            .await
            .is_err()
    );
}

#[tokio::test]
async fn test_update_and_delete_intention() {
    let (handler, _, _file) = get_test_handler();
    let id = add_intention(&handler, "monthly", "Read two books").await;

    let output = handler
        .handle_update_intention(id.clone(), "Read three books".to_string(), None)
        .await
        .unwrap();
    let updated = json(&output);
    assert_eq!(updated["text"], "Read three books");
    assert_eq!(updated["color"], "blue");

    let recolored = json(
        &handler
            .handle_update_intention(id.clone(), "Read three books".to_string(), Some("rose".to_string()))
            .await
            .unwrap(),
    );
    assert_eq!(recolored["color"], "rose");

    let message = handler.handle_delete_intention(id.clone()).await.unwrap();
    assert_eq!(
        message,
        "Intention month-1 (Read three books) deleted from monthly intentions"
    );
    assert!(handler.handle_delete_intention(id).await.is_err());
}

#[tokio::test]
async fn test_planning_is_owner_scoped_and_persisted() {
    let file = NamedTempFile::new().unwrap();

    let mut alice_config = test_config(file.path());
    alice_config.owner_id = "alice".to_string();
    let (alice, _) = handler_for(&alice_config);
    let task = add_task(&alice, "Plan trip").await;
    let intention = add_intention(&alice, "weekly", "Sleep by 11").await;
    drop(alice);

    let mut bob_config = test_config(file.path());
    bob_config.owner_id = "bob".to_string();
    let (bob, _) = handler_for(&bob_config);
    assert_eq!(json(&bob.handle_list_daily_tasks().await.unwrap()), serde_json::json!([]));
    assert!(bob.handle_toggle_daily_task(task.clone()).await.is_err());
    assert!(bob.handle_delete_daily_task(task.clone()).await.is_err());
    assert!(
        bob.handle_update_intention(intention.clone(), "hijack".to_string(), None)
            .await
            .is_err()
    );
    assert!(bob.handle_delete_intention(intention.clone()).await.is_err());

    let data = bob.calendar();
    assert_eq!(data.daily_tasks[0].text, "Plan trip");
    assert!(!data.daily_tasks[0].completed);
    assert_eq!(data.weekly_intentions[0].text, "Sleep by 11");
    assert_eq!(data.weekly_intentions[0].owner_id, "alice");
}
