//! # Design
//!
//! - Keep error messages constant while carrying context fields for debugging.
//! - Separate credential problems from transport and provider rejections so
//!   callers can classify failures per cycle step.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias for Drive operations.
pub type DriveResult<T> = Result<T, DriveError>;

/// Errors raised by the Drive client.
#[derive(Debug, Error)]
pub enum DriveError {
    /// The credential file could not be read.
    #[error("failed to read service account credentials")]
    CredentialsRead {
        /// Credential file path.
        path: PathBuf,
        /// Source IO error.
        source: io::Error,
    },
    /// The credential file was not a valid service-account document.
    #[error("failed to parse service account credentials")]
    CredentialsParse {
        /// Credential file path.
        path: PathBuf,
        /// Source JSON error.
        source: serde_json::Error,
    },
    /// The embedded private key could not be decoded.
    #[error("invalid service account private key")]
    PrivateKey {
        /// Credential file path.
        path: PathBuf,
        /// Source PKCS#8 error.
        source: rsa::pkcs8::Error,
    },
    /// A JSON payload (assertion claims or upload metadata) could not be serialised.
    #[error("failed to encode drive payload")]
    Encode {
        /// Operation identifier.
        operation: &'static str,
        /// Source JSON error.
        source: serde_json::Error,
    },
    /// Signing the token assertion failed.
    #[error("failed to sign token assertion")]
    AssertionSign {
        /// Source signature error.
        source: rsa::signature::Error,
    },
    /// The HTTP client could not be constructed.
    #[error("failed to build http client")]
    ClientBuild {
        /// Source HTTP client error.
        source: reqwest::Error,
    },
    /// A request failed at the transport level.
    #[error("drive request failed")]
    Http {
        /// Operation identifier.
        operation: &'static str,
        /// URL used for the request.
        url: String,
        /// Source HTTP client error.
        source: reqwest::Error,
    },
    /// The provider answered with a non-success status.
    #[error("drive response status error")]
    HttpStatus {
        /// Operation identifier.
        operation: &'static str,
        /// URL used for the request.
        url: String,
        /// HTTP status code returned by the provider.
        status: u16,
        /// Leading portion of the response body.
        body: String,
    },
    /// The provider response could not be decoded.
    #[error("drive response decode failed")]
    Decode {
        /// Operation identifier.
        operation: &'static str,
        /// URL used for the request.
        url: String,
        /// Source HTTP client error.
        source: reqwest::Error,
    },
    /// The local archive could not be read for upload.
    #[error("failed to read upload payload")]
    PayloadRead {
        /// Archive path.
        path: PathBuf,
        /// Source IO error.
        source: io::Error,
    },
}

impl DriveError {
    pub(crate) fn http(operation: &'static str, url: &str, source: reqwest::Error) -> Self {
        Self::Http {
            operation,
            url: url.to_string(),
            source,
        }
    }

    pub(crate) fn decode(operation: &'static str, url: &str, source: reqwest::Error) -> Self {
        Self::Decode {
            operation,
            url: url.to_string(),
            source,
        }
    }

    /// HTTP status reported by the provider, if the failure was a rejection.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn status_is_exposed_only_for_rejections() {
        let rejected = DriveError::HttpStatus {
            operation: "files.create",
            url: "http://localhost/upload".into(),
            status: 403,
            body: "quota exceeded".into(),
        };
        assert_eq!(rejected.status(), Some(403));
        assert!(rejected.source().is_none());

        let unreadable = DriveError::PayloadRead {
            path: PathBuf::from("backup.zip"),
            source: io::Error::other("io"),
        };
        assert_eq!(unreadable.status(), None);
        assert!(unreadable.source().is_some());
    }
}
