//! Baked (deployment-time) configuration.
//!
//! `BakedConfig` is what a deployment writes into `notehub.toml`. It holds
//! the defaults for every value the resolver can override at runtime, plus
//! the ambient sections (database, logging, sync tuning) that are only ever
//! read from the file.

use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};

use crate::constants::{self, property_keys};
use crate::error::{NhError, NhResult};
use crate::platform::Platform;

/// Top-level baked configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BakedConfig {
    /// Spreadsheet identifier or URL.
    #[serde(default)]
    pub spreadsheet_id: String,

    /// Public URL of the read-only web front-end, used in notification links.
    #[serde(default)]
    pub web_app_url: String,

    /// Sheet names.
    #[serde(default)]
    pub sheets: SheetsConfig,

    /// File storage settings.
    #[serde(default)]
    pub drive: DriveConfig,

    /// Slack credentials and channel lists.
    #[serde(default)]
    pub slack: SlackConfig,

    /// Row store settings.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Sync tuning.
    #[serde(default)]
    pub sync: SyncConfig,
}

/// Names of the two sheets in the spreadsheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetsConfig {
    #[serde(default = "default_articles_sheet")]
    pub articles: String,

    #[serde(default = "default_slack_sheet")]
    pub slack_messages: String,
}

/// File storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriveConfig {
    /// Folder that receives uploaded images.
    #[serde(default = "default_images_folder")]
    pub images_folder_name: String,

    /// Root directory of the local file store. Empty means `<data dir>/files`.
    #[serde(default)]
    pub root: String,
}

/// Slack settings. The property key fields name the runtime properties that
/// override the corresponding values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlackConfig {
    #[serde(default)]
    pub bot_token: String,

    #[serde(default)]
    pub channel_ids: ChannelIds,

    #[serde(default)]
    pub notification_channel_ids: ChannelIds,

    #[serde(default = "default_bot_token_key")]
    pub bot_token_property_key: String,

    #[serde(default = "default_channel_ids_key")]
    pub channel_ids_property_key: String,

    #[serde(default = "default_notification_channel_ids_key")]
    pub notification_channel_ids_property_key: String,
}

/// A channel list written either as an array or as one comma-separated string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChannelIds {
    List(Vec<String>),
    Csv(String),
}

impl Default for ChannelIds {
    fn default() -> Self {
        ChannelIds::List(Vec::new())
    }
}

/// Row store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite file. Empty means one file per spreadsheet id
    /// under the data directory.
    #[serde(default)]
    pub path: String,

    /// Enable WAL mode.
    #[serde(default = "default_true")]
    pub wal_mode: bool,

    /// Maximum number of pooled connections.
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for log files. If empty, uses the default location.
    #[serde(default)]
    pub directory: String,

    /// Write the log file as JSON lines.
    #[serde(default)]
    pub json_output: bool,
}

/// Channel sync tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Messages requested per channel per run.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Minimum spacing between rate-limited Slack calls.
    #[serde(default = "default_rate_limit_interval")]
    pub rate_limit_interval_ms: u64,

    /// Slack API request timeout.
    #[serde(default = "default_api_timeout")]
    pub api_timeout_ms: u64,

    /// Slack Web API root.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

// Default value functions for serde

fn default_articles_sheet() -> String {
    "Articles".to_string()
}

fn default_slack_sheet() -> String {
    "SlackMessages".to_string()
}

fn default_images_folder() -> String {
    "notehub-images".to_string()
}

fn default_bot_token_key() -> String {
    property_keys::SLACK_BOT_TOKEN.to_string()
}

fn default_channel_ids_key() -> String {
    property_keys::SLACK_CHANNEL_IDS.to_string()
}

fn default_notification_channel_ids_key() -> String {
    property_keys::SLACK_NOTIFICATION_CHANNEL_IDS.to_string()
}

fn default_true() -> bool {
    true
}

fn default_pool_size() -> u32 {
    4
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_page_size() -> u32 {
    constants::DEFAULT_HISTORY_PAGE_SIZE
}

fn default_rate_limit_interval() -> u64 {
    constants::DEFAULT_RATE_LIMIT_INTERVAL_MS
}

fn default_api_timeout() -> u64 {
    constants::DEFAULT_API_TIMEOUT_MS
}

fn default_api_base_url() -> String {
    constants::SLACK_API_BASE_URL.to_string()
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            articles: default_articles_sheet(),
            slack_messages: default_slack_sheet(),
        }
    }
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            images_folder_name: default_images_folder(),
            root: String::new(),
        }
    }
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            channel_ids: ChannelIds::default(),
            notification_channel_ids: ChannelIds::default(),
            bot_token_property_key: default_bot_token_key(),
            channel_ids_property_key: default_channel_ids_key(),
            notification_channel_ids_property_key: default_notification_channel_ids_key(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: String::new(),
            wal_mode: true,
            pool_size: default_pool_size(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: String::new(),
            json_output: false,
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            rate_limit_interval_ms: default_rate_limit_interval(),
            api_timeout_ms: default_api_timeout(),
            api_base_url: default_api_base_url(),
        }
    }
}

impl BakedConfig {
    /// Load configuration from the default config file path, or defaults if
    /// no file exists.
    pub fn load_default() -> NhResult<Self> {
        let path = Self::default_config_path()?;
        if path.exists() {
            Self::load_from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from_file(path: &Path) -> NhResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: BakedConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to a specific file path.
    pub fn save_to_file(&self, path: &Path) -> NhResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)
            .map_err(|e| NhError::Config(format!("failed to serialize config: {e}")))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> NhResult<PathBuf> {
        Ok(Platform::config_dir()?.join("notehub.toml"))
    }

    /// Get the effective log directory, using the configured path or the default.
    pub fn effective_log_dir(&self) -> NhResult<PathBuf> {
        if self.logging.directory.is_empty() {
            Platform::log_dir()
        } else {
            Ok(PathBuf::from(&self.logging.directory))
        }
    }

    /// Get the SQLite file backing the given spreadsheet.
    pub fn effective_store_path(&self, spreadsheet_id: &str) -> NhResult<PathBuf> {
        if !self.database.path.is_empty() {
            return Ok(PathBuf::from(&self.database.path));
        }
        let file = if spreadsheet_id.is_empty() {
            "notehub.db".to_string()
        } else {
            format!("{spreadsheet_id}.db")
        };
        Ok(Platform::data_dir()?.join("spreadsheets").join(file))
    }

    /// Get the root directory of the local file store.
    pub fn effective_file_root(&self) -> NhResult<PathBuf> {
        if self.drive.root.is_empty() {
            Ok(Platform::data_dir()?.join("files"))
        } else {
            Ok(PathBuf::from(&self.drive.root))
        }
    }
}
