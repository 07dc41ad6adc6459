//! Backend boundary shared by the browser and native clients.
//!
//! # Design
//! - One method per wire operation; no retries at this layer.
//! - Mutation calls return the decoded body even for 4xx/5xx answers so the
//!   server-supplied message can reach the user.
//! - `?Send` futures: the browser client is single-threaded.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;
use vidshelf_api_models::{
    DeleteRequest, DeleteResponse, ErrorBody, StreamResponse, UploadResponse, VideoId,
};

/// File handed to the transfer flow.
pub trait UploadSource {
    /// Name the user picked; validated before submission.
    fn file_name(&self) -> String;
}

/// Transport-level failures of a backend call.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum BackendError {
    /// The request could not be sent or the body could not be read.
    #[error("request to {path} failed: {message}")]
    Transport {
        /// Route that was called.
        path: String,
        /// Underlying failure text.
        message: String,
    },
    /// The backend answered with a non-success status.
    #[error("{path} answered with status {status}")]
    Status {
        /// Route that was called.
        path: String,
        /// HTTP status code.
        status: u16,
        /// Error detail from the body, when present.
        detail: Option<String>,
    },
    /// The body did not match the expected document.
    #[error("unexpected response from {path}: {message}")]
    Decode {
        /// Route that was called.
        path: String,
        /// Decoder failure text.
        message: String,
    },
}

impl BackendError {
    /// Build a transport failure for `path`.
    #[must_use]
    pub fn transport(path: impl Into<String>, message: impl ToString) -> Self {
        Self::Transport {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Build a decode failure for `path`.
    #[must_use]
    pub fn decode(path: impl Into<String>, message: impl ToString) -> Self {
        Self::Decode {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

/// Remote video library.
#[async_trait(?Send)]
pub trait LibraryBackend {
    /// File handle accepted by [`LibraryBackend::upload`].
    type Upload: UploadSource;

    /// `GET /api/videos`.
    async fn list_videos(&self) -> Result<Vec<VideoId>, BackendError>;

    /// `GET /api/stream/{video}`.
    async fn resolve_stream(&self, video: &VideoId) -> Result<StreamResponse, BackendError>;

    /// `POST /api/upload` as multipart with the `file` field.
    async fn upload(&self, file: &Self::Upload) -> Result<UploadResponse, BackendError>;

    /// `POST /api/delete` with a JSON body.
    async fn delete(&self, request: &DeleteRequest) -> Result<DeleteResponse, BackendError>;
}

/// Decode a mutation body regardless of status.
///
/// A body that parses wins over the status code; otherwise a failed status is
/// reported as [`BackendError::Status`] and a successful one as a decode error.
///
/// # Errors
///
/// Returns an error when the body is not the expected document.
pub fn decode_mutation_body<T>(path: &str, status: u16, body: &[u8]) -> Result<T, BackendError>
where
    T: DeserializeOwned,
{
    match serde_json::from_slice(body) {
        Ok(value) => Ok(value),
        Err(err) if is_success(status) => Err(BackendError::decode(path, err)),
        Err(_) => Err(BackendError::Status {
            path: path.to_string(),
            status,
            detail: None,
        }),
    }
}

/// Decode a read body; only 2xx answers are parsed.
///
/// # Errors
///
/// Returns [`BackendError::Status`] for non-2xx answers and a decode error for
/// malformed bodies.
pub fn decode_read_body<T>(path: &str, status: u16, body: &[u8]) -> Result<T, BackendError>
where
    T: DeserializeOwned,
{
    if !is_success(status) {
        return Err(BackendError::Status {
            path: path.to_string(),
            status,
            detail: serde_json::from_slice::<ErrorBody>(body)
                .ok()
                .and_then(|body| body.error),
        });
    }
    serde_json::from_slice(body).map_err(|err| BackendError::decode(path, err))
}

const fn is_success(status: u16) -> bool {
    matches!(status, 200..=299)
}
