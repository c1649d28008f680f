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

//! Google Drive access for uploading backup archives.
//!
//! Layout: `credentials.rs` (service-account key + JWT assertion),
//! `client.rs` (token exchange, folder lookup, upload), `model.rs` (wire
//! payloads), `multipart.rs` (upload body framing), `error.rs`.

pub mod client;
pub mod credentials;
pub mod error;
pub mod model;
mod multipart;

pub use client::{DRIVE_SCOPE, DriveClient, UploadRequest};
pub use credentials::{ASSERTION_TTL_SECS, ServiceAccountKey};
pub use error::{DriveError, DriveResult};
pub use model::{AccessToken, FOLDER_MIME_TYPE, FolderLookup, UploadedFile, ZIP_MIME_TYPE, folder_query};
