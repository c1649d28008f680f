//! Removal of local cycle artifacts once the upload has landed.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::archive::parse_archive_name;
use crate::error::{FsOpsError, FsOpsResult};

/// Recursively delete the dump directory and delete the archive file.
///
/// Artifacts that are already gone are skipped; both removals are attempted
/// and the first failure is returned.
///
/// # Errors
///
/// Returns [`FsOpsError::Io`] when either artifact exists but cannot be removed.
pub fn remove_artifacts(dump_dir: &Path, archive: &Path) -> FsOpsResult<()> {
    let dump_result = ignore_missing(fs::remove_dir_all(dump_dir))
        .map_err(|source| FsOpsError::io("cleanup.remove_dump_dir", dump_dir, source));
    let archive_result = ignore_missing(fs::remove_file(archive))
        .map_err(|source| FsOpsError::io("cleanup.remove_archive", archive, source));

    dump_result.and(archive_result)?;
    debug!(
        dump_dir = %dump_dir.display(),
        archive = %archive.display(),
        "local artifacts removed"
    );
    Ok(())
}

/// Delete every archive in `archive_dir` left behind by earlier failed cycles.
///
/// Only regular files whose names parse as archive names are touched. The
/// removed paths are returned sorted by name.
///
/// # Errors
///
/// Returns [`FsOpsError::Io`] when the directory cannot be listed or a
/// matching archive cannot be removed.
pub fn sweep_stale_archives(archive_dir: &Path) -> FsOpsResult<Vec<PathBuf>> {
    let listing = fs::read_dir(archive_dir)
        .map_err(|source| FsOpsError::io("cleanup.list_archives", archive_dir, source))?;
    let mut stale = Vec::new();
    for entry in listing {
        let entry =
            entry.map_err(|source| FsOpsError::io("cleanup.list_archives", archive_dir, source))?;
        let is_file = entry
            .file_type()
            .map_err(|source| FsOpsError::io("cleanup.archive_type", entry.path(), source))?
            .is_file();
        let recognised = entry
            .file_name()
            .to_str()
            .and_then(parse_archive_name)
            .is_some();
        if is_file && recognised {
            stale.push(entry.path());
        }
    }
    stale.sort();

    for path in &stale {
        ignore_missing(fs::remove_file(path))
            .map_err(|source| FsOpsError::io("cleanup.remove_stale_archive", path, source))?;
        info!(archive = %path.display(), "stale archive removed");
    }
    Ok(stale)
}

fn ignore_missing(result: io::Result<()>) -> io::Result<()> {
    match result {
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}
