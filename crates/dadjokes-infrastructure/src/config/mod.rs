//! Application configuration, stored as JSON in the user's config directory.

mod log_level;

pub use log_level::LogLevel;

use anyhow::{anyhow, bail, Context, Result};
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use dadjokes_domain::calendar::{Calendar, FixedOffsetCalendar, SystemCalendar};
use dadjokes_domain::entitlement::DEFAULT_TRIAL_DAYS;
use dadjokes_domain::history::{
    HistoryLimits, DEFAULT_HISTORY_LIMIT, DEFAULT_HISTORY_RETENTION_DAYS,
};

const APP_DIR: &str = "dadjokes";
const CONFIG_FILE: &str = "config.json";
const DEFAULT_DB_FILE: &str = "dadjokes.db";
const DEFAULT_REMOTE_TIMEOUT_SECS: u64 = 30;
/// Upper bounds keep date arithmetic inside chrono's range.
const MAX_HISTORY_RETENTION_DAYS: u32 = 36_500;
const MAX_TRIAL_DAYS: u32 = 3_650;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Backend root, e.g. `https://api.example.com/v1`. Unset means offline.
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            timeout_secs: DEFAULT_REMOTE_TIMEOUT_SECS,
        }
    }
}

impl RemoteConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn parsed_base_url(&self) -> Result<Option<Url>> {
        self.base_url
            .as_deref()
            .map(|raw| {
                let url = Url::parse(raw)
                    .with_context(|| format!("Invalid remote base_url: {}", raw))?;
                if url.cannot_be_a_base() {
                    bail!("Remote base_url cannot be used as a base: {}", raw);
                }
                Ok(url)
            })
            .transpose()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub db_file: String,
    pub log_level: LogLevel,
    /// `local` for the device timezone, `utc`, or a fixed offset like `+09:00`.
    pub timezone: String,
    pub auto_save: bool,
    pub history_limit: usize,
    pub history_retention_days: u32,
    pub trial_days: u32,
    pub remote: RemoteConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            db_file: DEFAULT_DB_FILE.to_string(),
            log_level: LogLevel::default(),
            timezone: "local".to_string(),
            auto_save: true,
            history_limit: DEFAULT_HISTORY_LIMIT,
            history_retention_days: DEFAULT_HISTORY_RETENTION_DAYS,
            trial_days: DEFAULT_TRIAL_DAYS,
            remote: RemoteConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn config_path() -> PathBuf {
        default_config_dir().join(CONFIG_FILE)
    }

    /// Load from the default location, falling back to defaults if absent.
    pub fn load() -> Result<Self> {
        Self::load_or_default(&Self::config_path())
    }

    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config dir: {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.db_file.trim().is_empty() {
            bail!("db_file cannot be empty");
        }
        if self.history_limit == 0 {
            bail!("history_limit must be greater than 0");
        }
        if !(1..=MAX_HISTORY_RETENTION_DAYS).contains(&self.history_retention_days) {
            bail!(
                "history_retention_days must be between 1 and {}",
                MAX_HISTORY_RETENTION_DAYS
            );
        }
        if !(1..=MAX_TRIAL_DAYS).contains(&self.trial_days) {
            bail!("trial_days must be between 1 and {}", MAX_TRIAL_DAYS);
        }
        if self.remote.timeout_secs == 0 {
            bail!("remote.timeout_secs must be greater than 0");
        }
        self.remote.parsed_base_url()?;
        parse_timezone(&self.timezone)?;
        Ok(())
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(&self.db_file)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }

    pub fn history_limits(&self) -> HistoryLimits {
        HistoryLimits {
            max_entries: self.history_limit,
            retention_days: self.history_retention_days,
        }
    }

    pub fn calendar(&self) -> Result<Arc<dyn Calendar>> {
        Ok(match parse_timezone(&self.timezone)? {
            None => Arc::new(SystemCalendar),
            Some(offset) => Arc::new(FixedOffsetCalendar::new(offset)),
        })
    }
}

/// `None` means the device-local timezone.
fn parse_timezone(raw: &str) -> Result<Option<FixedOffset>> {
    let raw = raw.trim();
    match raw.to_ascii_lowercase().as_str() {
        "" | "local" => return Ok(None),
        "utc" | "z" => return Ok(FixedOffset::east_opt(0)),
        _ => {}
    }

    let (sign, rest) = if let Some(rest) = raw.strip_prefix('+') {
        (1, rest)
    } else if let Some(rest) = raw.strip_prefix('-') {
        (-1, rest)
    } else {
        bail!("Invalid timezone '{}': expected local, utc or ±HH:MM", raw);
    };
    let (hours, minutes) = rest
        .split_once(':')
        .ok_or_else(|| anyhow!("Invalid timezone '{}': expected ±HH:MM", raw))?;
    let hours: i32 = hours
        .parse()
        .with_context(|| format!("Invalid timezone hours in '{}'", raw))?;
    let minutes: i32 = minutes
        .parse()
        .with_context(|| format!("Invalid timezone minutes in '{}'", raw))?;
    if !(0..=14).contains(&hours) || !(0..60).contains(&minutes) {
        bail!("Timezone offset out of range: {}", raw);
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
        .map(Some)
        .ok_or_else(|| anyhow!("Timezone offset out of range: {}", raw))
}

fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}
