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
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Stowage backup service wiring.
//!
//! Layout: `bootstrap.rs` (start-up), `cycle.rs` (one backup cycle),
//! `scheduler.rs` (fixed-interval loop), `storage.rs` (dump and storage
//! seams), `step.rs` (cycle stages), `error.rs`.

/// Application bootstrap and environment loading.
pub mod bootstrap;
/// Backup cycle runner.
pub mod cycle;
/// Start-up and cycle errors.
pub mod error;
/// Fixed-interval scheduler.
pub mod scheduler;
/// Named cycle stages.
pub mod step;
/// Dump tool and remote storage abstractions.
pub mod storage;

pub use bootstrap::{ProductionCycle, build_cycle, run_app};
pub use cycle::{BackupCycle, Clock, Cycle, CycleReport, SystemClock};
pub use error::{AppError, AppResult, CycleError, CycleResult, error_chain};
pub use scheduler::{Scheduler, Sleeper, TokioSleeper};
pub use step::CycleStep;
pub use storage::{DriveStorage, DumpTool, StorageProvider};
