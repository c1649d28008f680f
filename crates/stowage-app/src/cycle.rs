//! One backup cycle: dump, compress, authenticate, resolve, upload, clean up.
//!
//! # Design
//! - Steps run strictly in order; the first failure aborts the cycle and is
//!   returned tagged with its [`CycleStep`].
//! - Local artifacts are removed only after the upload succeeds, so a failed
//!   cycle leaves its dump and archive behind for inspection. The next
//!   successful cycle sweeps archives left by earlier failures.
//! - When several folders share the destination name the first id in
//!   provider order wins.
//! - Every step logs `step started` and `step completed`/`step failed` inside
//!   the cycle span.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Local};
use stowage_drive::{FolderLookup, UploadRequest};
use stowage_fsops::{archive_name, compress_dir, remove_artifacts, sweep_stale_archives};
use stowage_telemetry::cycle_span;
use tracing::{Instrument, info, warn};

use crate::error::{CycleError, CycleResult};
use crate::step::CycleStep;
use crate::storage::{DumpTool, StorageProvider};

/// Source of the wall-clock time that names each archive.
pub trait Clock: Send + Sync {
    /// Current local time.
    fn now(&self) -> DateTime<Local>;
}

/// Clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Summary of a successful cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    /// File name of the uploaded archive.
    pub archive_name: String,
    /// Size of the archive in bytes.
    pub archive_bytes: u64,
    /// Files stored in the archive.
    pub files: usize,
    /// Destination folder id.
    pub folder_id: String,
    /// Id of the uploaded remote file.
    pub remote_file_id: String,
    /// Wall time spent on the cycle.
    pub elapsed: Duration,
}

/// Anything the scheduler can run repeatedly.
#[async_trait]
pub trait Cycle: Send + Sync {
    /// Execute one cycle; `sequence` numbers cycles from 1 for log correlation.
    async fn run(&self, sequence: u64) -> CycleResult<CycleReport>;
}

/// Backup cycle wired to a dump tool and a storage provider.
pub struct BackupCycle<D, S> {
    dump: D,
    storage: S,
    archive_dir: PathBuf,
    target_folder: String,
    clock: Arc<dyn Clock>,
}

impl<D, S> BackupCycle<D, S>
where
    D: DumpTool,
    S: StorageProvider,
{
    /// Build a cycle that archives into `archive_dir` and uploads into the
    /// folder named `target_folder`.
    #[must_use]
    pub fn new(
        dump: D,
        storage: S,
        archive_dir: impl Into<PathBuf>,
        target_folder: impl Into<String>,
    ) -> Self {
        Self {
            dump,
            storage,
            archive_dir: archive_dir.into(),
            target_folder: target_folder.into(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the clock used to name archives.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Storage provider uploads go through.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Execute the full pipeline once.
    ///
    /// # Errors
    ///
    /// Returns the first step failure; later steps are not attempted.
    pub async fn run_once(&self, sequence: u64) -> CycleResult<CycleReport> {
        let started = Instant::now();
        let name = archive_name(&self.clock.now());
        let archive_path = self.archive_dir.join(&name);
        let span = cycle_span(sequence, &name);
        self.pipeline(&name, &archive_path, started)
            .instrument(span)
            .await
    }

    async fn pipeline(
        &self,
        name: &str,
        archive_path: &Path,
        started: Instant,
    ) -> CycleResult<CycleReport> {
        tracked(CycleStep::Dumping, async {
            self.dump
                .dump()
                .await
                .map_err(|source| CycleError::DumpFailure { source })
        })
        .await?;

        let summary = tracked(CycleStep::Compressing, async {
            compress_dir(self.dump.out_dir(), archive_path)
                .map_err(|source| CycleError::ArchiveFailure { source })
        })
        .await?;

        let session = tracked(CycleStep::Authenticating, async {
            self.storage
                .authorize()
                .await
                .map_err(|source| CycleError::AuthFailure { source })
        })
        .await?;

        let folder_id = tracked(CycleStep::ResolvingDestination, async {
            self.resolve_destination(&session).await
        })
        .await?;

        let uploaded = tracked(CycleStep::Uploading, async {
            self.storage
                .upload(
                    &session,
                    UploadRequest {
                        source: archive_path,
                        name,
                        parent_id: &folder_id,
                    },
                )
                .await
                .map_err(|source| CycleError::UploadFailure { source })
        })
        .await?;
        info!(file_id = %uploaded.id, folder_id = %folder_id, "archive uploaded");

        tracked(CycleStep::CleaningUp, async {
            remove_artifacts(self.dump.out_dir(), archive_path)
                .and_then(|()| sweep_stale_archives(&self.archive_dir))
                .map_err(|source| CycleError::CleanupFailure { source })
        })
        .await?;

        Ok(CycleReport {
            archive_name: name.to_string(),
            archive_bytes: summary.bytes,
            files: summary.files,
            folder_id,
            remote_file_id: uploaded.id,
            elapsed: started.elapsed(),
        })
    }

    async fn resolve_destination(&self, session: &S::Session) -> CycleResult<String> {
        let lookup = self
            .storage
            .find_folder(session, &self.target_folder)
            .await
            .map_err(|source| CycleError::DestinationLookupFailure {
                folder: self.target_folder.clone(),
                source,
            })?;
        match lookup {
            FolderLookup::SingleMatch(id) => Ok(id),
            FolderLookup::NotFound => Err(CycleError::DestinationNotFound {
                folder: self.target_folder.clone(),
            }),
            FolderLookup::MultipleMatches(ids) => {
                warn!(
                    folder = %self.target_folder,
                    candidates = ?ids,
                    "several folders share the destination name; using the first"
                );
                ids.into_iter()
                    .next()
                    .ok_or_else(|| CycleError::DestinationNotFound {
                        folder: self.target_folder.clone(),
                    })
            }
        }
    }
}

#[async_trait]
impl<D, S> Cycle for BackupCycle<D, S>
where
    D: DumpTool,
    S: StorageProvider,
{
    async fn run(&self, sequence: u64) -> CycleResult<CycleReport> {
        self.run_once(sequence).await
    }
}

async fn tracked<T, F>(step: CycleStep, work: F) -> CycleResult<T>
where
    F: Future<Output = CycleResult<T>>,
{
    info!(step = step.as_str(), "step started");
    match work.await {
        Ok(value) => {
            info!(step = step.as_str(), "step completed");
            Ok(value)
        }
        Err(err) => {
            warn!(step = step.as_str(), error = %err, detail = ?err, "step failed");
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, anyhow};
    use std::fs;
    use std::sync::Mutex;
    use stowage_drive::{AccessToken, DriveResult, UploadedFile};
    use stowage_fsops::{FsOpsError, FsOpsResult, parse_archive_name};
    use stowage_test_support::fixtures::write_tree;

    struct TreeDump {
        out_dir: PathBuf,
    }

    #[async_trait]
    impl DumpTool for TreeDump {
        fn out_dir(&self) -> &Path {
            &self.out_dir
        }

        async fn dump(&self) -> FsOpsResult<()> {
            write_tree(&self.out_dir, &[("habits/users.bson", b"users")]).map_err(|source| {
                FsOpsError::Io {
                    operation: "tree_dump.write",
                    path: self.out_dir.clone(),
                    source,
                }
            })
        }
    }

    struct NamedFolders {
        lookup: FolderLookup,
        uploads: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl StorageProvider for NamedFolders {
        type Session = AccessToken;

        async fn authorize(&self) -> DriveResult<AccessToken> {
            Ok(AccessToken::new("token"))
        }

        async fn find_folder(&self, _: &AccessToken, _: &str) -> DriveResult<FolderLookup> {
            Ok(self.lookup.clone())
        }

        async fn upload(
            &self,
            _: &AccessToken,
            request: UploadRequest<'_>,
        ) -> DriveResult<UploadedFile> {
            if let Ok(mut uploads) = self.uploads.lock() {
                uploads.push((request.name.to_string(), request.parent_id.to_string()));
            }
            Ok(UploadedFile {
                id: "remote-1".into(),
            })
        }
    }

    struct FixedClock(DateTime<Local>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Local> {
            self.0
        }
    }

    fn cycle_with(root: &Path, lookup: FolderLookup) -> BackupCycle<TreeDump, NamedFolders> {
        let storage = NamedFolders {
            lookup,
            uploads: Mutex::new(Vec::new()),
        };
        BackupCycle::new(
            TreeDump {
                out_dir: root.join("dump"),
            },
            storage,
            root,
            "HabitBackups",
        )
    }

    #[tokio::test]
    async fn successful_cycle_reports_upload_and_removes_artifacts() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let cycle = cycle_with(temp.path(), FolderLookup::SingleMatch("F1".into()));

        let report = cycle.run_once(1).await?;

        assert_eq!(report.folder_id, "F1");
        assert_eq!(report.remote_file_id, "remote-1");
        assert_eq!(report.files, 1);
        assert!(parse_archive_name(&report.archive_name).is_some());
        assert!(!temp.path().join("dump").exists());
        assert!(!temp.path().join(&report.archive_name).exists());
        Ok(())
    }

    #[tokio::test]
    async fn archive_is_named_from_the_clock() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let started = DateTime::parse_from_rfc3339("2025-03-04T05:06:07Z")?.with_timezone(&Local);
        let cycle = cycle_with(temp.path(), FolderLookup::SingleMatch("F1".into()))
            .with_clock(Arc::new(FixedClock(started)));

        let report = cycle.run_once(1).await?;

        assert_eq!(report.archive_name, archive_name(&started));
        let uploads = cycle
            .storage
            .uploads
            .lock()
            .map_err(|_| anyhow!("uploads lock poisoned"))?;
        assert_eq!(
            uploads.as_slice(),
            [(archive_name(&started), "F1".to_string())]
        );
        Ok(())
    }

    #[tokio::test]
    async fn ambiguous_destination_uploads_into_first_match() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let cycle = cycle_with(
            temp.path(),
            FolderLookup::MultipleMatches(vec!["A".into(), "B".into()]),
        );

        let report = cycle.run_once(1).await?;

        assert_eq!(report.folder_id, "A");
        let uploads = cycle
            .storage
            .uploads
            .lock()
            .map_err(|_| anyhow!("uploads lock poisoned"))?;
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].1, "A");
        Ok(())
    }

    #[tokio::test]
    async fn successful_cycle_sweeps_archives_from_failed_cycles() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let first_start =
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")?.with_timezone(&Local);
        let failing = cycle_with(temp.path(), FolderLookup::NotFound)
            .with_clock(Arc::new(FixedClock(first_start)));

        let err = failing
            .run_once(1)
            .await
            .err()
            .ok_or_else(|| anyhow!("missing folder should fail"))?;
        assert!(matches!(err, CycleError::DestinationNotFound { .. }));
        let leftover = temp.path().join(archive_name(&first_start));
        assert!(leftover.exists());
        fs::write(temp.path().join("notes.txt"), b"keep")?;

        let second_start = first_start + chrono::Duration::hours(12);
        let succeeding = cycle_with(temp.path(), FolderLookup::SingleMatch("F1".into()))
            .with_clock(Arc::new(FixedClock(second_start)));
        succeeding.run_once(2).await?;

        let mut remaining: Vec<String> = fs::read_dir(temp.path())?
            .map(|entry| entry.map(|entry| entry.file_name().to_string_lossy().into_owned()))
            .collect::<std::io::Result<_>>()?;
        remaining.sort();
        assert_eq!(remaining, ["notes.txt"]);
        Ok(())
    }
}
