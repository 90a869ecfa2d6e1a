use anyhow::{Context, Result, bail};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::calendar::{CalendarData, FORMAT_VERSION};
use crate::git_ops::GitOps;

/// TOML file storage for the calendar, with optional git sync on save.
pub struct Storage {
    file_path: PathBuf,
    sync_git: bool,
    git_ops: GitOps,
}

impl Storage {
    pub fn new(file_path: impl AsRef<Path>, sync_git: bool) -> Self {
        let file_path = file_path.as_ref().to_path_buf();
        let git_ops = GitOps::new(&file_path);
        Self {
            file_path,
            sync_git,
            git_ops,
        }
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Load the calendar, or an empty one when the file is missing or empty.
    pub fn load(&self) -> Result<CalendarData> {
        if !self.file_path.exists() {
            debug!(path = %self.file_path.display(), "no data file yet, starting empty");
            return Ok(CalendarData::new());
        }

        let content = fs::read_to_string(&self.file_path)
            .with_context(|| format!("Failed to read {}", self.file_path.display()))?;
        if content.trim().is_empty() {
            return Ok(CalendarData::new());
        }

        let data: CalendarData = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", self.file_path.display()))?;
        if data.format_version > FORMAT_VERSION {
            bail!(
                "{} uses format version {}, this build supports up to {}",
                self.file_path.display(),
                data.format_version,
                FORMAT_VERSION
            );
        }

        info!(
            path = %self.file_path.display(),
            events = data.event_count(),
            tasks = data.daily_tasks.len(),
            "calendar loaded"
        );
        Ok(data)
    }

    pub fn save(&self, data: &CalendarData) -> Result<()> {
        self.save_with_message(data, "Update calendar")
    }

    /// Write the file and, with git sync enabled, pull/commit/push it.
    pub fn save_with_message(&self, data: &CalendarData, message: &str) -> Result<()> {
        let content = toml::to_string_pretty(data).context("Failed to serialize calendar")?;
        fs::write(&self.file_path, content)
            .with_context(|| format!("Failed to write {}", self.file_path.display()))?;
        debug!(path = %self.file_path.display(), message, "calendar saved");

        if self.sync_git && self.git_ops.is_git_managed() {
            self.git_ops
                .sync(&self.file_path, message)
                .context("Git sync failed")?;
        }
        Ok(())
    }

    /// Push any unpushed commits when git sync is enabled.
    pub fn shutdown(&self) -> Result<()> {
        if self.sync_git && self.git_ops.is_git_managed() {
            self.git_ops.push().context("Failed to push on shutdown")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::NewEvent;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_missing_and_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path().join("calendar.toml"), false);
        assert_eq!(storage.load().unwrap(), CalendarData::new());

        let file = NamedTempFile::new().unwrap();
        let storage = Storage::new(file.path(), false);
        assert_eq!(storage.load().unwrap(), CalendarData::new());
    }

    #[test]
    fn test_save_then_load() {
        let file = NamedTempFile::new().unwrap();
        let storage = Storage::new(file.path(), false);
        let mut data = CalendarData::new();
        data.create(
            NewEvent {
                title: "Dentist".to_string(),
                description: Some("bring card".to_string()),
                start: 1_718_000_000_000,
                end: 1_718_003_600_000,
                all_day: false,
                color: "blue".to_string(),
                location: None,
            },
            "local-user",
        );
        storage.save(&data).unwrap();
        assert_eq!(storage.load().unwrap(), data);
    }

    #[test]
    fn test_newer_format_is_rejected() {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), "format_version = 9\nevent_counter = 0\n").unwrap();
        let err = Storage::new(file.path(), false).load().unwrap_err();
        assert!(err.to_string().contains("format version 9"));
    }
}
