//! Database dump subprocess invocation.
//!
//! # Design
//! - Build the dump tool argument list from the typed database config.
//! - Remove residue from an earlier failed cycle before the tool writes output.
//! - Never log the password; the logged argument list is redacted.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use stowage_config::DatabaseConfig;
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{FsOpsError, FsOpsResult};

const REDACTED: &str = "<redacted>";

/// A fully-resolved invocation of the dump tool.
#[derive(Debug, Clone)]
pub struct DumpCommand {
    program: String,
    database: DatabaseConfig,
    out_dir: PathBuf,
}

impl DumpCommand {
    /// Describe a dump of `database` into `out_dir` using `program`.
    #[must_use]
    pub fn new(program: impl Into<String>, database: DatabaseConfig, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            database,
            out_dir: out_dir.into(),
        }
    }

    /// Directory receiving the dump output.
    #[must_use]
    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Arguments passed to the dump tool, in launch order.
    #[must_use]
    pub fn args(&self) -> Vec<OsString> {
        self.render(false)
    }

    /// Arguments with the password replaced, suitable for logging.
    #[must_use]
    pub fn redacted_args(&self) -> Vec<String> {
        self.render(true)
            .into_iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect()
    }

    fn render(&self, redact: bool) -> Vec<OsString> {
        let db = &self.database;
        let mut args = vec![OsString::from(format!("--host={}", db.host))];
        if let Some(user) = &db.user {
            args.push(format!("--username={user}").into());
        }
        if let Some(password) = &db.password {
            let shown = if redact { REDACTED } else { password.as_str() };
            args.push(format!("--password={shown}").into());
        }
        args.push(format!("--authenticationDatabase={}", db.auth_database).into());
        args.push(format!("--db={}", db.name).into());
        let mut out = OsString::from("--out=");
        out.push(self.out_dir.as_os_str());
        args.push(out);
        args
    }

    /// Clear residue and run the dump tool to completion.
    ///
    /// # Errors
    ///
    /// Returns [`FsOpsError::DumpLaunch`] if the program cannot be started,
    /// [`FsOpsError::DumpExit`] if it exits unsuccessfully, and
    /// [`FsOpsError::Io`] if stale output cannot be removed.
    pub async fn run(&self) -> FsOpsResult<()> {
        clear_stale_output(&self.out_dir)?;

        info!(
            program = %self.program,
            args = ?self.redacted_args(),
            "launching dump process"
        );
        let status = Command::new(&self.program)
            .args(self.args())
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|source| FsOpsError::DumpLaunch {
                program: self.program.clone(),
                source,
            })?;

        if !status.success() {
            return Err(FsOpsError::DumpExit {
                program: self.program.clone(),
                code: status.code(),
            });
        }
        debug!(out_dir = %self.out_dir.display(), "dump process finished");
        Ok(())
    }
}

fn clear_stale_output(out_dir: &Path) -> FsOpsResult<()> {
    match fs::symlink_metadata(out_dir) {
        Ok(meta) if meta.is_dir() => {
            info!(path = %out_dir.display(), "removing stale dump directory");
            fs::remove_dir_all(out_dir)
                .map_err(|source| FsOpsError::io("dump.clear_stale_dir", out_dir, source))
        }
        Ok(_) => {
            info!(path = %out_dir.display(), "removing stale dump file");
            fs::remove_file(out_dir)
                .map_err(|source| FsOpsError::io("dump.clear_stale_file", out_dir, source))
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(FsOpsError::io("dump.inspect_out_dir", out_dir, source)),
    }
}
