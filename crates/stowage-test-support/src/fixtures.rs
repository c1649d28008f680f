//! Filesystem fixtures for dump trees and service-account credentials.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// RSA private key (PKCS#8 PEM) used only by test credentials.
pub const SERVICE_ACCOUNT_KEY_PEM: &str = include_str!("../fixtures/service_account_key.pem");

/// Client email recorded in test credentials.
pub const SERVICE_ACCOUNT_EMAIL: &str = "backup-bot@stowage-tests.iam.gserviceaccount.com";

/// Write `files` (relative path, contents) beneath `root`, creating parents.
///
/// # Errors
///
/// Returns an error if any directory or file cannot be created.
pub fn write_tree(root: &Path, files: &[(&str, &[u8])]) -> io::Result<()> {
    fs::create_dir_all(root)?;
    for (relative, contents) in files {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, contents)?;
    }
    Ok(())
}

/// Service-account credential document pointing at `token_uri`.
#[must_use]
pub fn service_account_json(token_uri: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "service_account",
        "project_id": "stowage-tests",
        "private_key_id": "test-key-1",
        "private_key": SERVICE_ACCOUNT_KEY_PEM,
        "client_email": SERVICE_ACCOUNT_EMAIL,
        "client_id": "100000000000000000000",
        "token_uri": token_uri,
    })
}

/// Write a service-account credential file into `dir` and return its path.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_service_account(dir: &Path, token_uri: &str) -> io::Result<PathBuf> {
    let path = dir.join("service-account.json");
    let body = serde_json::to_vec_pretty(&service_account_json(token_uri)).map_err(io::Error::other)?;
    fs::write(&path, body)?;
    Ok(path)
}
