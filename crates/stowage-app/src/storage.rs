//! Collaborator seams used by the backup cycle and their production adapters.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use stowage_drive::{
    AccessToken, DRIVE_SCOPE, DriveClient, DriveResult, FolderLookup, ServiceAccountKey,
    UploadRequest, UploadedFile,
};
use stowage_fsops::{DumpCommand, FsOpsResult};

/// Produces a fresh dump directory for each cycle.
#[async_trait]
pub trait DumpTool: Send + Sync {
    /// Directory the dump is written into.
    fn out_dir(&self) -> &Path;

    /// Run the dump to completion.
    async fn dump(&self) -> FsOpsResult<()>;
}

#[async_trait]
impl DumpTool for DumpCommand {
    fn out_dir(&self) -> &Path {
        Self::out_dir(self)
    }

    async fn dump(&self) -> FsOpsResult<()> {
        self.run().await
    }
}

/// Remote object storage: authenticate, locate a folder, upload a file.
#[async_trait]
pub trait StorageProvider: Send + Sync {
    /// Authenticated handle valid for the remainder of one cycle.
    type Session: Send + Sync;

    /// Load credentials and open an authenticated session.
    async fn authorize(&self) -> DriveResult<Self::Session>;

    /// Look up folders by exact name.
    async fn find_folder(&self, session: &Self::Session, name: &str) -> DriveResult<FolderLookup>;

    /// Upload a local file into a folder.
    async fn upload(
        &self,
        session: &Self::Session,
        request: UploadRequest<'_>,
    ) -> DriveResult<UploadedFile>;
}

/// Google Drive storage using a service-account credential file.
///
/// The credential file is re-read on every cycle so a replaced or repaired
/// file takes effect without a restart.
#[derive(Debug, Clone)]
pub struct DriveStorage {
    client: DriveClient,
    credentials_path: PathBuf,
}

impl DriveStorage {
    /// Bind a Drive client to a credential file.
    #[must_use]
    pub fn new(client: DriveClient, credentials_path: impl Into<PathBuf>) -> Self {
        Self {
            client,
            credentials_path: credentials_path.into(),
        }
    }
}

#[async_trait]
impl StorageProvider for DriveStorage {
    type Session = AccessToken;

    async fn authorize(&self) -> DriveResult<AccessToken> {
        let key = ServiceAccountKey::load(&self.credentials_path)?;
        self.client.authorize(&key, DRIVE_SCOPE).await
    }

    async fn find_folder(&self, session: &AccessToken, name: &str) -> DriveResult<FolderLookup> {
        self.client.find_folders(session, name).await
    }

    async fn upload(
        &self,
        session: &AccessToken,
        request: UploadRequest<'_>,
    ) -> DriveResult<UploadedFile> {
        self.client.upload_file(session, request).await
    }
}
