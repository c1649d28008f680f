//! Environment-backed construction of [`BackupConfig`].
//!
//! # Design
//! - `from_env` is a thin shim over `from_lookup`, which accepts any lookup
//!   function so parsing is tested without touching process environment.
//! - Blank values are treated as unset; only `MONGO_DB` is mandatory.
//! - Database user, password, and name are kept verbatim; every other value
//!   is trimmed.

use std::path::PathBuf;

use crate::defaults;
use crate::error::{ConfigError, ConfigResult};
use crate::model::{BackupConfig, DatabaseConfig, DriveConfig};
use crate::validate::{non_empty, parse_base_url, parse_log_format, parse_seconds, verbatim};

/// Database host variable.
pub const ENV_DB_HOST: &str = "MONGO_HOST";
/// Database user variable.
pub const ENV_DB_USER: &str = "MONGO_USER";
/// Database password variable.
pub const ENV_DB_PASSWORD: &str = "MONGO_PASS";
/// Database name variable.
pub const ENV_DB_NAME: &str = "MONGO_DB";
/// Authentication database variable.
pub const ENV_DB_AUTH_DATABASE: &str = "MONGO_AUTH_DB";
/// Dump executable variable.
pub const ENV_DUMP_BINARY: &str = "STOWAGE_DUMP_BINARY";
/// Dump directory variable.
pub const ENV_DUMP_DIR: &str = "STOWAGE_DUMP_DIR";
/// Archive directory variable.
pub const ENV_ARCHIVE_DIR: &str = "STOWAGE_ARCHIVE_DIR";
/// Credential file variable.
pub const ENV_CREDENTIALS_PATH: &str = "STOWAGE_CREDENTIALS_PATH";
/// Target folder variable.
pub const ENV_TARGET_FOLDER: &str = "STOWAGE_TARGET_FOLDER";
/// Cycle interval variable.
pub const ENV_INTERVAL_SECS: &str = "STOWAGE_INTERVAL_SECS";
/// Drive metadata API variable.
pub const ENV_DRIVE_API_URL: &str = "STOWAGE_DRIVE_API_URL";
/// Drive upload API variable.
pub const ENV_DRIVE_UPLOAD_URL: &str = "STOWAGE_DRIVE_UPLOAD_URL";
/// HTTP timeout variable.
pub const ENV_HTTP_TIMEOUT_SECS: &str = "STOWAGE_HTTP_TIMEOUT_SECS";
/// Log format variable.
pub const ENV_LOG_FORMAT: &str = "STOWAGE_LOG_FORMAT";

impl BackupConfig {
    /// Build the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error when a required variable is missing or a value is invalid.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns an error when a required variable is missing or a value is invalid.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| non_empty(lookup(name));
        let get_or = |name: &str, fallback: &str| get(name).unwrap_or_else(|| fallback.to_string());
        let get_raw = |name: &str| verbatim(lookup(name));

        let database = DatabaseConfig {
            host: get_or(ENV_DB_HOST, defaults::DB_HOST),
            user: get_raw(ENV_DB_USER),
            password: get_raw(ENV_DB_PASSWORD),
            name: get_raw(ENV_DB_NAME).ok_or(ConfigError::MissingEnv { name: ENV_DB_NAME })?,
            auth_database: get_or(ENV_DB_AUTH_DATABASE, defaults::DB_AUTH_DATABASE),
        };

        let interval = match get(ENV_INTERVAL_SECS) {
            Some(raw) => parse_seconds(ENV_INTERVAL_SECS, &raw)?,
            None => std::time::Duration::from_secs(defaults::INTERVAL_SECS),
        };

        let timeout = get(ENV_HTTP_TIMEOUT_SECS)
            .map(|raw| parse_seconds(ENV_HTTP_TIMEOUT_SECS, &raw))
            .transpose()?;

        let drive = DriveConfig {
            api_base: parse_base_url(
                ENV_DRIVE_API_URL,
                &get_or(ENV_DRIVE_API_URL, defaults::DRIVE_API_BASE),
            )?,
            upload_base: parse_base_url(
                ENV_DRIVE_UPLOAD_URL,
                &get_or(ENV_DRIVE_UPLOAD_URL, defaults::DRIVE_UPLOAD_BASE),
            )?,
            timeout,
        };

        let log_format = get(ENV_LOG_FORMAT)
            .map(|raw| parse_log_format(ENV_LOG_FORMAT, &raw))
            .transpose()?;

        Ok(Self {
            database,
            dump_binary: get_or(ENV_DUMP_BINARY, defaults::DUMP_BINARY),
            dump_dir: PathBuf::from(get_or(ENV_DUMP_DIR, defaults::DUMP_DIR)),
            archive_dir: PathBuf::from(get_or(ENV_ARCHIVE_DIR, defaults::ARCHIVE_DIR)),
            credentials_path: PathBuf::from(get_or(
                ENV_CREDENTIALS_PATH,
                defaults::CREDENTIALS_PATH,
            )),
            target_folder_name: get_or(ENV_TARGET_FOLDER, defaults::TARGET_FOLDER_NAME),
            interval,
            drive,
            log_format,
        })
    }
}
