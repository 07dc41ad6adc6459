#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls
)]
#![warn(missing_docs, unreachable_pub, clippy::all, clippy::pedantic)]
//! Shared HTTP DTOs for the Vidshelf library API.
//!
//! These types are re-used by the browser shell and the CLI for
//! request/response encoding so both front-ends read the backend contract the
//! same way. The backend answers mutation failures with a bare `{"error": ..}`
//! document and a 4xx/5xx status; a missing `success` flag therefore reads as
//! a failure.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// Catalog listing route.
pub const VIDEOS_PATH: &str = "/api/videos";
/// Stream resolution route prefix; the video id is appended as one segment.
pub const STREAM_PATH_PREFIX: &str = "/api/stream/";
/// Multipart upload route.
pub const UPLOAD_PATH: &str = "/api/upload";
/// Batch delete route.
pub const DELETE_PATH: &str = "/api/delete";
/// Multipart field carrying the uploaded file.
pub const UPLOAD_FIELD: &str = "file";
/// MIME type announced to the player for HLS manifests.
pub const HLS_MIME_TYPE: &str = "application/x-mpegURL";

/// Build the stream resolution path for a video, percent-encoding the id.
#[must_use]
pub fn stream_path(video: &VideoId) -> String {
    format!("{STREAM_PATH_PREFIX}{}", urlencoding::encode(video.as_str()))
}

/// Opaque identifier of a stored video (its file name, extension included).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    /// Wrap a raw identifier.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Identifier with a trailing `extension` removed (ASCII case-insensitive).
    ///
    /// Returns the whole identifier when it does not carry the extension.
    #[must_use]
    pub fn base_name(&self, extension: &str) -> &str {
        let value = self.0.as_str();
        if extension.is_empty() || value.len() < extension.len() {
            return value;
        }
        let split = value.len() - extension.len();
        match (value.get(..split), value.get(split..)) {
            (Some(base), Some(suffix)) if suffix.eq_ignore_ascii_case(extension) => base,
            _ => value,
        }
    }
}

impl Display for VideoId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl AsRef<str> for VideoId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for VideoId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for VideoId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Successful stream resolution body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamResponse {
    /// Manifest URI for adaptive playback.
    pub playlist: String,
}

/// Upload response body, shared by success and failure answers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Whether the backend stored the file.
    #[serde(default)]
    pub success: bool,
    /// Stored file name; may differ from the submitted one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<VideoId>,
    /// Manifest produced for the upload, when the backend already converted it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playlist: Option<String>,
    /// Failure detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Details of an accepted upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadReceipt {
    /// Stored file name echoed by the backend.
    pub filename: Option<VideoId>,
    /// Manifest produced for the upload.
    pub playlist: Option<String>,
}

impl UploadResponse {
    /// Classify the body into an accepted receipt or a rejection.
    #[must_use]
    pub fn into_outcome(self) -> MutationOutcome<UploadReceipt> {
        if self.success {
            MutationOutcome::Accepted(UploadReceipt {
                filename: self.filename,
                playlist: self.playlist,
            })
        } else {
            MutationOutcome::Rejected(non_empty(self.error))
        }
    }
}

/// Batch delete request body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteRequest {
    /// Videos to remove.
    pub videos: Vec<VideoId>,
}

/// Batch delete response body.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResponse {
    /// Whether every listed video was removed.
    #[serde(default)]
    pub success: bool,
    /// Failure detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DeleteResponse {
    /// Classify the body into acceptance or a rejection.
    #[must_use]
    pub fn into_outcome(self) -> MutationOutcome<()> {
        if self.success {
            MutationOutcome::Accepted(())
        } else {
            MutationOutcome::Rejected(non_empty(self.error))
        }
    }
}

/// Error document returned by read endpoints on failure.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Failure detail.
    #[serde(default)]
    pub error: Option<String>,
}

/// Result of a mutating call as reported by the backend body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MutationOutcome<T> {
    /// The backend applied the mutation.
    Accepted(T),
    /// The backend refused; carries its message when one was supplied.
    Rejected(Option<String>),
}

fn non_empty(message: Option<String>) -> Option<String> {
    message.filter(|text| !text.trim().is_empty())
}
