//! HTTP client for the token exchange, folder lookup, and media upload calls.

use std::io;
use std::path::Path;

use chrono::Utc;
use futures_util::{StreamExt, future, stream};
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Body, Client, Response};
use serde::de::DeserializeOwned;
use stowage_config::DriveConfig;
use tokio::fs::File;
use tokio::io::AsyncReadExt;
use tracing::{debug, info};
use url::Url;

use crate::credentials::ServiceAccountKey;
use crate::error::{DriveError, DriveResult};
use crate::model::{
    AccessToken, FileList, FileMetadata, FolderLookup, UploadedFile, ZIP_MIME_TYPE, folder_query,
};
use crate::multipart::{new_boundary, related_framing};

/// OAuth scope requested for uploads and folder lookups.
pub const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const BODY_EXCERPT_LIMIT: usize = 512;
const UPLOAD_CHUNK_BYTES: usize = 64 * 1024;

/// Thin Drive v3 client bound to configurable API endpoints.
#[derive(Debug, Clone)]
pub struct DriveClient {
    http: Client,
    api_base: Url,
    upload_base: Url,
}

/// Request to upload a local file into a remote folder.
#[derive(Debug, Clone, Copy)]
pub struct UploadRequest<'a> {
    /// Local file whose bytes become the remote content.
    pub source: &'a Path,
    /// Remote file name.
    pub name: &'a str,
    /// Parent folder id.
    pub parent_id: &'a str,
}

impl DriveClient {
    /// Build a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(config: &DriveConfig) -> DriveResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|source| DriveError::ClientBuild { source })?;
        Ok(Self::with_client(
            http,
            config.api_base.clone(),
            config.upload_base.clone(),
        ))
    }

    /// Wrap an existing HTTP client.
    #[must_use]
    pub const fn with_client(http: Client, api_base: Url, upload_base: Url) -> Self {
        Self {
            http,
            api_base,
            upload_base,
        }
    }

    /// Exchange a signed assertion for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns an error if signing fails, the request fails, or the token
    /// endpoint rejects the assertion.
    pub async fn authorize(&self, key: &ServiceAccountKey, scope: &str) -> DriveResult<AccessToken> {
        let assertion = key.signed_assertion(scope, Utc::now())?;
        let url = key.token_uri();
        let response = self
            .http
            .post(url)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|source| DriveError::http("token.exchange", url, source))?;
        let token: AccessToken = decode_json("token.exchange", url, response).await?;
        debug!(
            client_email = key.client_email(),
            expires_in = ?token.expires_in,
            "service account token issued"
        );
        Ok(token)
    }

    /// Find non-trashed folders named exactly `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the provider rejects it.
    pub async fn find_folders(&self, token: &AccessToken, name: &str) -> DriveResult<FolderLookup> {
        let url = endpoint(&self.api_base, "files");
        let query = folder_query(name);
        let response = self
            .http
            .get(&url)
            .bearer_auth(token.secret())
            .query(&[("q", query.as_str()), ("fields", "files(id)")])
            .send()
            .await
            .map_err(|source| DriveError::http("files.list", &url, source))?;
        let listing: FileList = decode_json("files.list", &url, response).await?;
        let ids = listing.files.into_iter().map(|file| file.id).collect();
        Ok(FolderLookup::from_ids(ids))
    }

    /// Create a remote file under `request.parent_id` with the local file's bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the request fails, or the
    /// provider rejects the upload.
    pub async fn upload_file(
        &self,
        token: &AccessToken,
        request: UploadRequest<'_>,
    ) -> DriveResult<UploadedFile> {
        let payload_err = |source| DriveError::PayloadRead {
            path: request.source.to_path_buf(),
            source,
        };
        let media = File::open(request.source).await.map_err(payload_err)?;
        let media_len = media.metadata().await.map_err(payload_err)?.len();
        let metadata = serde_json::to_vec(&FileMetadata {
            name: request.name,
            parents: [request.parent_id],
            mime_type: ZIP_MIME_TYPE,
        })
        .map_err(|source| DriveError::Encode {
            operation: "files.create.metadata",
            source,
        })?;
        let framing = related_framing(&new_boundary(), &metadata, ZIP_MIME_TYPE);
        let content_length = framing.content_length(media_len);
        let body = stream::once(future::ready(Ok::<_, io::Error>(framing.preamble)))
            .chain(file_chunks(media))
            .chain(stream::once(future::ready(Ok(framing.epilogue))));

        let url = endpoint(&self.upload_base, "files");
        info!(
            name = request.name,
            parent_id = request.parent_id,
            bytes = media_len,
            "uploading archive"
        );
        let response = self
            .http
            .post(&url)
            .bearer_auth(token.secret())
            .query(&[("uploadType", "multipart"), ("fields", "id")])
            .header(CONTENT_TYPE, framing.content_type)
            .header(CONTENT_LENGTH, content_length)
            .body(Body::wrap_stream(body))
            .send()
            .await
            .map_err(|source| DriveError::http("files.create", &url, source))?;
        decode_json("files.create", &url, response).await
    }
}

fn file_chunks(file: File) -> impl stream::Stream<Item = io::Result<Vec<u8>>> + Send + 'static {
    stream::try_unfold(file, next_chunk)
}

async fn next_chunk(mut file: File) -> io::Result<Option<(Vec<u8>, File)>> {
    let mut chunk = vec![0; UPLOAD_CHUNK_BYTES];
    let read = file.read(&mut chunk).await?;
    if read == 0 {
        return Ok(None);
    }
    chunk.truncate(read);
    Ok(Some((chunk, file)))
}

fn endpoint(base: &Url, path: &str) -> String {
    format!("{}/{path}", base.as_str().trim_end_matches('/'))
}

async fn decode_json<T>(operation: &'static str, url: &str, response: Response) -> DriveResult<T>
where
    T: DeserializeOwned,
{
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(DriveError::HttpStatus {
            operation,
            url: url.to_string(),
            status: status.as_u16(),
            body: excerpt(&body),
        });
    }
    response
        .json::<T>()
        .await
        .map_err(|source| DriveError::decode(operation, url, source))
}

fn excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT_LIMIT).collect()
}
