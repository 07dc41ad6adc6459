//! Error types for controller operations.

use std::fmt::{self, Display, Formatter};

use thiserror::Error;
use vidshelf_api_models::VideoId;

use crate::affordance::Affordance;
use crate::backend::BackendError;
use crate::playback::EngineError;

/// Remote operation identifiers used in failure reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Catalog listing.
    ListVideos,
    /// Manifest resolution.
    ResolveStream,
    /// File upload.
    Upload,
    /// Batch delete.
    Delete,
}

impl Operation {
    /// Stable lowercase label for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ListVideos => "list_videos",
            Self::ResolveStream => "resolve_stream",
            Self::Upload => "upload",
            Self::Delete => "delete",
        }
    }
}

impl Display for Operation {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Input rejected before any network call.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// File name does not carry the accepted extension.
    #[error("'{file_name}' does not have the {expected} extension")]
    UnsupportedExtension {
        /// Offending file name.
        file_name: String,
        /// Accepted extension.
        expected: String,
    },
    /// Load was requested without a selected video.
    #[error("no video selected")]
    NoSelection,
    /// Delete was confirmed with nothing checked.
    #[error("no video checked for removal")]
    EmptyRemovalSet,
    /// Delete was confirmed while the dialog was closed.
    #[error("removal dialog is not open")]
    DialogClosed,
}

/// Primary error type for controller operations.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Local validation failed; state is unchanged.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The backend refused or could not complete a mutation.
    #[error("{operation} failed: {message}")]
    RemoteFailure {
        /// Operation that failed.
        operation: Operation,
        /// Message shown to the user.
        message: String,
    },
    /// The catalog could not be fetched; the previous snapshot is kept.
    #[error("video catalog unavailable")]
    CatalogUnavailable {
        /// Underlying failure.
        #[source]
        source: BackendError,
    },
    /// The manifest for a video could not be resolved.
    #[error("stream resolution failed for {video}")]
    StreamResolutionFailed {
        /// Video being loaded.
        video: VideoId,
        /// Underlying failure.
        #[source]
        source: BackendError,
    },
    /// The playback engine rejected a step.
    #[error("playback failed for {video}")]
    PlaybackFailed {
        /// Video being loaded.
        video: VideoId,
        /// Underlying failure.
        #[source]
        source: EngineError,
    },
    /// The affordance already has a request in flight.
    #[error("{affordance} already has a request in flight")]
    Busy {
        /// Affordance that was re-triggered.
        affordance: Affordance,
    },
}

impl ControllerError {
    /// Whether the failure was rejected locally before reaching the network.
    #[must_use]
    pub const fn is_local(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Busy { .. })
    }
}

/// Convenience alias for controller results.
pub type ControllerResult<T> = Result<T, ControllerError>;
