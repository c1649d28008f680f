#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions, clippy::multiple_crate_versions)]

//! Local steps of a backup cycle: database dump, zip archive, and cleanup.
//!
//! Layout: `dump.rs` (dump subprocess), `archive.rs` (naming + compression),
//! `cleanup.rs` (artifact removal), `error.rs` (structured errors).

pub mod archive;
pub mod cleanup;
pub mod dump;
pub mod error;

pub use archive::{ArchiveSummary, archive_name, compress_dir, parse_archive_name};
pub use cleanup::{remove_artifacts, sweep_stale_archives};
pub use dump::DumpCommand;
pub use error::{FsOpsError, FsOpsResult};
