//! Typed configuration bundle handed to the backup cycle.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

/// Connection parameters passed verbatim to the dump tool.
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Database host (`--host`).
    pub host: String,
    /// Optional username (`--username`); the flag is omitted when unset.
    pub user: Option<String>,
    /// Optional password (`--password`); the flag is omitted when unset.
    pub password: Option<String>,
    /// Database to dump (`--db`).
    pub name: String,
    /// Authentication database (`--authenticationDatabase`).
    pub auth_database: String,
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("name", &self.name)
            .field("auth_database", &self.auth_database)
            .finish()
    }
}

/// Remote storage endpoints and client tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriveConfig {
    /// Base URL for metadata calls (folder lookup).
    pub api_base: Url,
    /// Base URL for media uploads.
    pub upload_base: Url,
    /// Optional per-request timeout; `None` leaves requests unbounded.
    pub timeout: Option<Duration>,
}

/// Requested log output format, when the operator pins one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormatSetting {
    /// Structured JSON lines.
    Json,
    /// Human-readable output.
    Pretty,
}

/// Complete configuration for the backup service, built once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupConfig {
    /// Dump tool connection parameters.
    pub database: DatabaseConfig,
    /// Dump executable name or path.
    pub dump_binary: String,
    /// Directory the dump tool writes into; removed after every successful cycle.
    pub dump_dir: PathBuf,
    /// Directory receiving the timestamped archive file.
    pub archive_dir: PathBuf,
    /// Service-account credential file.
    pub credentials_path: PathBuf,
    /// Name of the remote folder receiving uploads.
    pub target_folder_name: String,
    /// Pause between cycles.
    pub interval: Duration,
    /// Remote storage endpoints.
    pub drive: DriveConfig,
    /// Log format override.
    pub log_format: Option<LogFormatSetting>,
}
