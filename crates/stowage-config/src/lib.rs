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

//! Environment-sourced configuration for the backup service.
//!
//! Layout: `model.rs` (typed config bundle), `loader.rs` (environment lookup),
//! `validate.rs` (parsing helpers), `defaults.rs` (fixed defaults).

pub mod defaults;
pub mod error;
pub mod loader;
pub mod model;
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use model::{BackupConfig, DatabaseConfig, DriveConfig, LogFormatSetting};
