use reqwest::StatusCode;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Coarse failure classes reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    Filesystem,
    Cancelled,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to '{url}' failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to '{url}' timed out")]
    Timeout { url: String },

    #[error("'{url}' returned HTTP {status}")]
    Status { url: String, status: StatusCode },

    #[error("failed to create directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("download was cancelled")]
    Cancelled,

    #[error("download task panicked")]
    Panicked,
}

impl FetchError {
    /// Wraps a transport error, splitting out elapsed timeouts.
    pub fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else {
            FetchError::Network {
                url: url.to_string(),
                source: err,
            }
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::Network { .. }
            | FetchError::Client(_)
            | FetchError::Timeout { .. }
            | FetchError::Status { .. } => ErrorKind::Network,
            FetchError::CreateDir { .. } | FetchError::Write { .. } => ErrorKind::Filesystem,
            FetchError::Cancelled | FetchError::Panicked => ErrorKind::Cancelled,
        }
    }
}

#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to decode {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("invalid image: {0}")]
    Invalid(String),
}
