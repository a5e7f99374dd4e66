/*!
 * Configuration types for modsync
 */

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, SyncError};

/// Main configuration for a sync run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Modpack to download
    #[serde(default)]
    pub modpack_id: i64,

    /// Version to download (None = latest)
    #[serde(default)]
    pub version_id: Option<i64>,

    /// Root of the client installation
    #[serde(default)]
    pub client_path: Option<PathBuf>,

    /// Root of the server installation
    #[serde(default)]
    pub server_path: Option<PathBuf>,

    /// Root of a previous installation to reuse files from
    #[serde(default)]
    pub migrate_from_path: Option<PathBuf>,

    /// Migrate by copying instead of moving files
    #[serde(default)]
    pub preserve_migration_source: bool,

    /// Treat the modpack ID as a CurseForge project ID
    #[serde(default)]
    pub curseforge: bool,

    /// Number of concurrent downloads
    #[serde(default = "default_download_concurrency")]
    pub download_concurrency: usize,

    /// Number of precheck workers (0 = number of CPU cores)
    #[serde(default)]
    pub precheck_concurrency: usize,

    /// CurseForge projects left out of the server installation
    #[serde(default)]
    pub server_ignore_curseforge_projects: Vec<i64>,

    /// User-Agent sent with every request
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Manifest API base URL
    #[serde(default)]
    pub api_base_url: Option<String>,

    /// Log level for diagnostic output
    #[serde(default)]
    pub log_level: LogLevel,

    /// Log file path (None = stderr)
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// Enable verbose logging (shorthand for log_level = debug)
    #[serde(default)]
    pub verbose: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            modpack_id: 0,
            version_id: None,
            client_path: None,
            server_path: None,
            migrate_from_path: None,
            preserve_migration_source: false,
            curseforge: false,
            download_concurrency: default_download_concurrency(),
            precheck_concurrency: 0,
            server_ignore_curseforge_projects: Vec::new(),
            user_agent: None,
            api_base_url: None,
            log_level: LogLevel::Info,
            log_file: None,
            verbose: false,
        }
    }
}

/// Log level for diagnostic output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Only errors
    Error,

    /// Warnings and errors
    Warn,

    /// Info, warnings, and errors
    #[default]
    Info,

    /// Debug and above
    Debug,

    /// All messages including traces
    Trace,
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

fn default_download_concurrency() -> usize {
    32
}

impl SyncConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| SyncError::file_op("read config", path, e))?;
        toml::from_str(&contents)
            .map_err(|e| SyncError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Reject settings that cannot start a run
    pub fn validate(&self) -> Result<()> {
        if self.modpack_id == 0 {
            return Err(SyncError::Config(
                "a modpack ID is required".to_string(),
            ));
        }
        if self.download_concurrency == 0 {
            return Err(SyncError::Config(
                "download concurrency must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether any installation target was requested
    pub fn has_targets(&self) -> bool {
        self.client_path.is_some() || self.server_path.is_some()
    }

    /// User-Agent for manifest and file requests
    pub fn effective_user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| format!("modsync/{}", crate::VERSION))
    }
}
