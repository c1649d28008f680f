//! Process start-up: configuration, logging, collaborator wiring, scheduler launch.

use stowage_config::{BackupConfig, LogFormatSetting};
use stowage_drive::DriveClient;
use stowage_fsops::DumpCommand;
use stowage_telemetry::{GlobalContextGuard, LogFormat, LoggingConfig};
use tracing::{info, warn};

use crate::cycle::BackupCycle;
use crate::error::{AppError, AppResult};
use crate::scheduler::{Scheduler, TokioSleeper};
use crate::storage::DriveStorage;

/// Production cycle type assembled from configuration.
pub type ProductionCycle = BackupCycle<DumpCommand, DriveStorage>;

/// Entry point for the Stowage boot sequence.
///
/// # Errors
///
/// Returns an error if configuration is missing or invalid, if logging
/// cannot be installed, or if the storage client cannot be built. Once the
/// scheduler starts this function never returns.
pub async fn run_app() -> AppResult<()> {
    let config =
        BackupConfig::from_env().map_err(|err| AppError::config("config.from_env", err))?;
    run_app_with(&config).await
}

/// Boot sequence driven by an already-loaded configuration.
pub(crate) async fn run_app_with(config: &BackupConfig) -> AppResult<()> {
    let logging = LoggingConfig {
        format: log_format(config.log_format),
        ..LoggingConfig::default()
    };
    stowage_telemetry::init_logging(&logging)
        .map_err(|err| AppError::telemetry("telemetry.init", err))?;
    let _context = GlobalContextGuard::new("scheduler");

    info!(
        database = %config.database.name,
        host = %config.database.host,
        dump_dir = %config.dump_dir.display(),
        archive_dir = %config.archive_dir.display(),
        target_folder = %config.target_folder_name,
        interval_secs = config.interval.as_secs(),
        "Stowage backup service starting"
    );
    if config.drive.timeout.is_none() {
        warn!(
            "no timeout applies to the dump process or to remote calls; a hung call stalls the scheduler"
        );
    }

    let cycle = build_cycle(config)?;
    let scheduler = Scheduler::new(cycle, TokioSleeper, config.interval);
    match scheduler.run().await {}
}

/// Wire the production dump tool and Drive storage from configuration.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be constructed.
pub fn build_cycle(config: &BackupConfig) -> AppResult<ProductionCycle> {
    let dump = DumpCommand::new(
        config.dump_binary.clone(),
        config.database.clone(),
        config.dump_dir.clone(),
    );
    let client = DriveClient::new(&config.drive)
        .map_err(|err| AppError::storage("drive_client.new", err))?;
    let storage = DriveStorage::new(client, config.credentials_path.clone());
    Ok(BackupCycle::new(
        dump,
        storage,
        config.archive_dir.clone(),
        config.target_folder_name.clone(),
    ))
}

const fn log_format(setting: Option<LogFormatSetting>) -> LogFormat {
    match setting {
        Some(LogFormatSetting::Json) => LogFormat::Json,
        Some(LogFormatSetting::Pretty) => LogFormat::Pretty,
        None => LogFormat::infer(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> stowage_config::ConfigResult<BackupConfig> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        BackupConfig::from_lookup(|name| env.get(name).cloned())
    }

    #[test]
    fn log_format_prefers_explicit_setting() {
        assert_eq!(log_format(Some(LogFormatSetting::Json)), LogFormat::Json);
        assert_eq!(log_format(Some(LogFormatSetting::Pretty)), LogFormat::Pretty);
        assert_eq!(log_format(None), LogFormat::infer());
    }

    #[test]
    fn build_cycle_accepts_default_configuration() -> AppResult<()> {
        let config = config_from(&[("MONGO_DB", "habits")])
            .map_err(|err| AppError::config("config.from_lookup", err))?;
        build_cycle(&config)?;
        Ok(())
    }

    #[test]
    fn missing_database_name_is_a_config_error() {
        let err = config_from(&[]).map_err(|err| AppError::config("config.from_lookup", err));
        assert!(matches!(
            err,
            Err(AppError::Config {
                source: stowage_config::ConfigError::MissingEnv { name: "MONGO_DB" },
                ..
            })
        ));
    }
}
