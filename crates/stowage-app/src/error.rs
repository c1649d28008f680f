//! # Design
//!
//! - Split startup failures (fatal) from cycle failures (logged, then retried).
//! - Keep error messages constant while carrying context fields for debugging.
//! - Preserve source errors without re-logging at call sites.

use stowage_drive::DriveError;
use stowage_fsops::FsOpsError;
use thiserror::Error;

use crate::step::CycleStep;

/// Result alias for startup operations.
pub type AppResult<T> = Result<T, AppError>;

/// Result alias for a single backup cycle.
pub type CycleResult<T> = Result<T, CycleError>;

/// Startup error; the process exits when one is returned.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded from the environment.
    #[error("configuration operation failed")]
    Config {
        /// Operation identifier.
        operation: &'static str,
        /// Source configuration error.
        source: stowage_config::ConfigError,
    },
    /// Telemetry operations failed.
    #[error("telemetry operation failed")]
    Telemetry {
        /// Operation identifier.
        operation: &'static str,
        /// Source telemetry error.
        source: stowage_telemetry::TelemetryError,
    },
    /// The storage client could not be constructed.
    #[error("storage client construction failed")]
    Storage {
        /// Operation identifier.
        operation: &'static str,
        /// Source Drive error.
        source: DriveError,
    },
}

impl AppError {
    pub(crate) const fn config(
        operation: &'static str,
        source: stowage_config::ConfigError,
    ) -> Self {
        Self::Config { operation, source }
    }

    pub(crate) const fn telemetry(
        operation: &'static str,
        source: stowage_telemetry::TelemetryError,
    ) -> Self {
        Self::Telemetry { operation, source }
    }

    pub(crate) const fn storage(operation: &'static str, source: DriveError) -> Self {
        Self::Storage { operation, source }
    }
}

/// Failure of one backup cycle; the scheduler logs it and carries on.
#[derive(Debug, Error)]
pub enum CycleError {
    /// The dump tool could not be launched or exited unsuccessfully.
    #[error("database dump failed")]
    DumpFailure {
        /// Source filesystem/process error.
        source: FsOpsError,
    },
    /// The dump directory could not be archived.
    #[error("archive creation failed")]
    ArchiveFailure {
        /// Source filesystem error.
        source: FsOpsError,
    },
    /// Credentials were unusable or the token exchange was rejected.
    #[error("storage authentication failed")]
    AuthFailure {
        /// Source Drive error.
        source: DriveError,
    },
    /// The folder lookup request itself failed.
    #[error("destination folder lookup failed")]
    DestinationLookupFailure {
        /// Remote folder name that was searched for.
        folder: String,
        /// Source Drive error.
        source: DriveError,
    },
    /// No non-trashed folder carries the target name.
    #[error("destination folder not found")]
    DestinationNotFound {
        /// Remote folder name that was searched for.
        folder: String,
    },
    /// The archive upload was rejected or failed in transit.
    #[error("archive upload failed")]
    UploadFailure {
        /// Source Drive error.
        source: DriveError,
    },
    /// Local artifacts could not be removed after a successful upload.
    #[error("artifact cleanup failed")]
    CleanupFailure {
        /// Source filesystem error.
        source: FsOpsError,
    },
}

impl CycleError {
    /// Step the cycle was executing when it failed.
    #[must_use]
    pub const fn step(&self) -> CycleStep {
        match self {
            Self::DumpFailure { .. } => CycleStep::Dumping,
            Self::ArchiveFailure { .. } => CycleStep::Compressing,
            Self::AuthFailure { .. } => CycleStep::Authenticating,
            Self::DestinationLookupFailure { .. }
            | Self::DestinationNotFound { .. } => CycleStep::ResolvingDestination,
            Self::UploadFailure { .. } => CycleStep::Uploading,
            Self::CleanupFailure { .. } => CycleStep::CleaningUp,
        }
    }
}

/// Render an error and each of its sources, outermost first, joined by `": "`.
#[must_use]
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut rendered = err.to_string();
    let mut current = err.source();
    while let Some(source) = current {
        rendered.push_str(": ");
        rendered.push_str(&source.to_string());
        current = source.source();
    }
    rendered
}
