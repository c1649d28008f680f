//! Default values applied when the environment leaves an option unset.
//!
//! # Design
//! - Keep every fixed default in one place so the loader and docs agree.
//! - Mirror the historical deployment names (credential file, folder name).

/// Default database host handed to the dump tool.
pub const DB_HOST: &str = "localhost";
/// Default authentication database handed to the dump tool.
pub const DB_AUTH_DATABASE: &str = "admin";
/// Default dump executable.
pub const DUMP_BINARY: &str = "mongodump";
/// Default relative directory receiving dump output.
pub const DUMP_DIR: &str = "dump";
/// Default directory receiving the archive file.
pub const ARCHIVE_DIR: &str = ".";
/// Default service-account credential file.
pub const CREDENTIALS_PATH: &str = "habitbackup.json";
/// Default remote destination folder name.
pub const TARGET_FOLDER_NAME: &str = "HabitBackups";
/// Default pause between backup cycles, in seconds (12 hours).
pub const INTERVAL_SECS: u64 = 43_200;
/// Default Drive metadata API base URL.
pub const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";
/// Default Drive media upload base URL.
pub const DRIVE_UPLOAD_BASE: &str = "https://www.googleapis.com/upload/drive/v3";
