use std::io::Write;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, warn};

use super::timer::SessionSnapshot;

/// Receives the completion signal of a focus session.
///
/// Called at most once per session, from the tick driver.
pub trait CompletionNotifier: Send + Sync {
    fn session_completed(&self, session: &SessionSnapshot) -> anyhow::Result<()>;
}

/// Rings the terminal bell on stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalBell;

impl CompletionNotifier for TerminalBell {
    fn session_completed(&self, session: &SessionSnapshot) -> anyhow::Result<()> {
        let mut stderr = std::io::stderr().lock();
        write!(stderr, "\x07")?;
        writeln!(
            stderr,
            "Focus session complete ({}): {}",
            session.duration_total,
            session.tasks.join(", ")
        )?;
        stderr.flush()?;
        Ok(())
    }
}

/// Only records the completion in the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl CompletionNotifier for LogNotifier {
    fn session_completed(&self, session: &SessionSnapshot) -> anyhow::Result<()> {
        info!(
            session = %session.id,
            duration = %session.duration_total,
            tasks = session.tasks.len(),
            "focus session finished"
        );
        Ok(())
    }
}

/// Invoke the notifier, logging and swallowing any failure.
pub fn notify_completion(notifier: &dyn CompletionNotifier, session: &SessionSnapshot) {
    if let Err(e) = notifier.session_completed(session) {
        warn!(session = %session.id, error = %e, "completion notifier failed");
    }
}

/// Notifier selectable from the command line or config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum NotifierKind {
    #[default]
    Bell,
    Log,
}

impl NotifierKind {
    pub fn build(self) -> Arc<dyn CompletionNotifier> {
        match self {
            NotifierKind::Bell => Arc::new(TerminalBell),
            NotifierKind::Log => Arc::new(LogNotifier),
        }
    }
}
