//! Common test utilities for integration tests

#![allow(dead_code)]

use focus_mcp::session::SessionSnapshot;
use focus_mcp::{CompletionNotifier, Config, FocusServerHandler};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::NamedTempFile;

/// Notifier that records every completion it receives.
#[derive(Default)]
pub struct RecordingNotifier {
    count: AtomicUsize,
    last: Mutex<Option<SessionSnapshot>>,
}

impl RecordingNotifier {
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    pub fn last(&self) -> Option<SessionSnapshot> {
        self.last.lock().unwrap().clone()
    }
}

impl CompletionNotifier for RecordingNotifier {
    fn session_completed(&self, session: &SessionSnapshot) -> anyhow::Result<()> {
        self.count.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some(session.clone());
        Ok(())
    }
}

/// Config for a data file with a millisecond tick so sessions finish fast.
pub fn test_config(path: &Path) -> Config {
    let mut config = Config::new(path);
    config.tick_interval = Duration::from_millis(1);
    config
}

/// Create a test handler with temporary storage
pub fn get_test_handler() -> (FocusServerHandler, Arc<RecordingNotifier>, NamedTempFile) {
    let temp_file = NamedTempFile::new().unwrap();
    let (handler, notifier) = handler_for(&test_config(temp_file.path()));
    (handler, notifier, temp_file)
}

pub fn handler_for(config: &Config) -> (FocusServerHandler, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::default());
    let handler = FocusServerHandler::with_notifier(config, notifier.clone()).unwrap();
    (handler, notifier)
}

/// Parse a tool's JSON output.
pub fn json(output: &str) -> serde_json::Value {
    serde_json::from_str(output).unwrap()
}

/// Extract the event id from a "... saved as event <id>" message.
pub fn extract_event_id(response: &str) -> String {
    response
        .split_whitespace()
        .last()
        .unwrap_or("")
        .to_string()
}

/// Poll until the active session reports `status`, or panic after `limit`.
pub async fn wait_for_status(handler: &FocusServerHandler, status: &str, limit: Duration) {
    let deadline = tokio::time::Instant::now() + limit;
    loop {
        let current = handler
            .session_snapshot()
            .map(|s| s.status.to_string())
            .unwrap_or_default();
        if current == status {
            return;
        }
        if tokio::time::Instant::now() > deadline {
            panic!("session still '{}' after {:?}, expected '{}'", current, limit, status);
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
