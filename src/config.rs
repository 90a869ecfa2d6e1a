//! Command line and config file settings
//!
//! Command line flags win over the TOML config file, which wins over the
//! built-in defaults.

use anyhow::{Context, Result, anyhow, bail};
use chrono_tz::Tz;
use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::session::NotifierKind;

pub const DEFAULT_OWNER_ID: &str = "local-user";
pub const DEFAULT_EVENT_COLOR: &str = "blue";
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 1000;

/// Focus MCP Server - calendar events and focus sessions via Model Context Protocol
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the calendar data file (TOML)
    pub file: Option<PathBuf>,

    /// Path to a TOML config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable git synchronization on save
    #[arg(long)]
    pub sync_git: bool,

    /// Owner id recorded on created events
    #[arg(long)]
    pub owner: Option<String>,

    /// IANA timezone used to interpret dates and times (e.g. "Asia/Tokyo")
    #[arg(long)]
    pub timezone: Option<String>,

    /// How to signal a finished focus session
    #[arg(long, value_enum)]
    pub notifier: Option<NotifierKind>,
}

/// Contents of the optional config file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub data_file: Option<PathBuf>,
    pub sync_git: Option<bool>,
    pub owner_id: Option<String>,
    pub timezone: Option<String>,
    pub default_event_duration: Option<u32>,
    pub default_color: Option<String>,
    pub tick_interval_ms: Option<u64>,
    pub notifier: Option<NotifierKind>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))
    }
}

/// Resolved server settings.
#[derive(Debug, Clone)]
pub struct Config {
    pub data_file: PathBuf,
    pub sync_git: bool,
    pub owner_id: String,
    pub timezone: Tz,
    pub default_event_duration: u32,
    pub default_color: String,
    pub tick_interval: Duration,
    pub notifier: NotifierKind,
}

impl Config {
    /// Defaults for a given data file.
    pub fn new(data_file: impl Into<PathBuf>) -> Self {
        Self {
            data_file: data_file.into(),
            sync_git: false,
            owner_id: DEFAULT_OWNER_ID.to_string(),
            timezone: Tz::UTC,
            default_event_duration: crate::resolver::DEFAULT_DURATION_MINUTES,
            default_color: DEFAULT_EVENT_COLOR.to_string(),
            tick_interval: Duration::from_millis(DEFAULT_TICK_INTERVAL_MS),
            notifier: NotifierKind::default(),
        }
    }

    /// Read `--config` if given and layer the command line on top.
    pub fn from_args(args: &Args) -> Result<Self> {
        let file = match &args.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Self::merge(args, file)
    }

    pub fn merge(args: &Args, file: FileConfig) -> Result<Self> {
        let data_file = args
            .file
            .clone()
            .or(file.data_file)
            .context("No data file given. Pass it as an argument or set data_file in the config")?;

        let mut config = Self::new(data_file);
        config.sync_git = args.sync_git || file.sync_git.unwrap_or(false);

        if let Some(owner) = args.owner.clone().or(file.owner_id) {
            if owner.trim().is_empty() {
                bail!("owner id must not be empty");
            }
            config.owner_id = owner;
        }
        if let Some(tz) = args.timezone.as_deref().or(file.timezone.as_deref()) {
            config.timezone = parse_timezone(tz)?;
        }
        if let Some(minutes) = file.default_event_duration {
            if minutes == 0 {
                bail!("default_event_duration must be at least 1 minute");
            }
            config.default_event_duration = minutes;
        }
        if let Some(color) = file.default_color {
            config.default_color = color;
        }
        if let Some(ms) = file.tick_interval_ms {
            if ms == 0 {
                bail!("tick_interval_ms must be positive");
            }
            config.tick_interval = Duration::from_millis(ms);
        }
        if let Some(kind) = args.notifier.or(file.notifier) {
            config.notifier = kind;
        }

        Ok(config)
    }
}

pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| anyhow!("Unknown timezone '{}'. Use an IANA name such as 'Europe/Berlin'", name))
}
