//! Wire payloads and typed results for Drive calls.

use serde::{Deserialize, Serialize};

/// MIME type Drive uses for folders.
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";
/// MIME type declared for uploaded archives.
pub const ZIP_MIME_TYPE: &str = "application/zip";

/// Outcome of looking up the destination folder by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderLookup {
    /// No non-trashed folder carries the name.
    NotFound,
    /// Exactly one folder matched.
    SingleMatch(String),
    /// Several folders share the name; ids in provider order.
    MultipleMatches(Vec<String>),
}

impl FolderLookup {
    /// Classify the ids returned by a folder query.
    #[must_use]
    pub fn from_ids(mut ids: Vec<String>) -> Self {
        match ids.len() {
            0 => Self::NotFound,
            1 => ids.pop().map_or(Self::NotFound, Self::SingleMatch),
            _ => Self::MultipleMatches(ids),
        }
    }
}

/// Build the Drive search expression for a non-trashed folder named `name`.
#[must_use]
pub fn folder_query(name: &str) -> String {
    let escaped = name.replace('\\', "\\\\").replace('\'', "\\'");
    format!("name = '{escaped}' and mimeType = '{FOLDER_MIME_TYPE}' and trashed = false")
}

/// Bearer token returned by the token endpoint.
#[derive(Clone, Deserialize)]
pub struct AccessToken {
    #[serde(rename = "access_token")]
    value: String,
    /// Seconds until the token expires, when reported.
    #[serde(default)]
    pub expires_in: Option<u64>,
}

impl AccessToken {
    /// Wrap a raw bearer token.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            expires_in: None,
        }
    }

    /// Raw bearer token.
    #[must_use]
    pub fn secret(&self) -> &str {
        &self.value
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("AccessToken")
            .field("value", &"<redacted>")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct FileList {
    #[serde(default)]
    pub(crate) files: Vec<FileRef>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FileRef {
    pub(crate) id: String,
}

/// Metadata part sent with a multipart upload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FileMetadata<'a> {
    pub(crate) name: &'a str,
    pub(crate) parents: [&'a str; 1],
    pub(crate) mime_type: &'a str,
}

/// Remote file created by an upload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadedFile {
    /// Provider-assigned file id.
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_ids_classifies_result_sizes() {
        assert_eq!(FolderLookup::from_ids(Vec::new()), FolderLookup::NotFound);
        assert_eq!(
            FolderLookup::from_ids(vec!["F1".into()]),
            FolderLookup::SingleMatch("F1".into())
        );
        assert_eq!(
            FolderLookup::from_ids(vec!["F1".into(), "F2".into()]),
            FolderLookup::MultipleMatches(vec!["F1".into(), "F2".into()])
        );
    }

    #[test]
    fn folder_query_filters_type_and_trash() {
        assert_eq!(
            folder_query("HabitBackups"),
            "name = 'HabitBackups' and mimeType = 'application/vnd.google-apps.folder' and trashed = false"
        );
    }

    #[test]
    fn folder_query_escapes_quotes_and_backslashes() {
        let query = folder_query(r"Ops' \ Backups");
        assert!(query.starts_with(r"name = 'Ops\' \\ Backups'"));
    }

    #[test]
    fn file_metadata_serialises_camel_case() -> serde_json::Result<()> {
        let metadata = FileMetadata {
            name: "backup.zip",
            parents: ["F1"],
            mime_type: ZIP_MIME_TYPE,
        };
        let value = serde_json::to_value(&metadata)?;
        assert_eq!(
            value,
            serde_json::json!({
                "name": "backup.zip",
                "parents": ["F1"],
                "mimeType": "application/zip"
            })
        );
        Ok(())
    }

    #[test]
    fn access_token_debug_is_redacted() {
        let token = AccessToken::new("ya29.secret");
        assert_eq!(token.secret(), "ya29.secret");
        assert!(!format!("{token:?}").contains("ya29"));
    }
}
