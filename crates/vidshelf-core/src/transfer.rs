//! Upload flow for browsed and dropped files.
//!
//! # Design
//! - Validate locally first: a missing file is a no-op, a wrong extension is
//!   rejected without touching the network.
//! - The upload gate stays `Pending` until the response and the follow-up
//!   catalog refresh are both done.
//! - The success notice echoes the backend's file name, not the local one.

use std::cell::Cell;
use std::rc::Rc;

use vidshelf_api_models::{MutationOutcome, VideoId};

use crate::affordance::{Affordance, AffordanceGate, AffordanceState};
use crate::backend::{LibraryBackend, UploadSource};
use crate::catalog::CatalogClient;
use crate::error::{ControllerError, ControllerResult, Operation, ValidationError};
use crate::notify::{Notifier, OUTCOME_NOTICE, PENDING_NOTICE};

/// Shown when the file name has the wrong extension.
pub const REJECTED_EXTENSION_MESSAGE: &str = "Only MKV files are allowed!";
/// Shown while the transfer is outstanding.
pub const UPLOADING_MESSAGE: &str = "Uploading...";
/// Shown when the backend gives no reason for a failed upload.
pub const UPLOAD_FAILED_MESSAGE: &str = "Upload failed";

/// How the file reached the controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransferOrigin {
    /// Picked through the file-browse input.
    Browse,
    /// Dropped onto the drop target.
    Drop,
}

/// Result of a transfer trigger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransferOutcome {
    /// No file was supplied; nothing happened.
    Skipped,
    /// The backend stored the file.
    Uploaded {
        /// Name the backend stored the file under.
        filename: VideoId,
        /// Whether the follow-up catalog refresh succeeded.
        catalog_refreshed: bool,
    },
}

/// Whether `file_name` ends with `extension`, ignoring case.
#[must_use]
pub fn has_accepted_extension(file_name: &str, extension: &str) -> bool {
    file_name.to_lowercase().ends_with(&extension.to_lowercase())
}

#[derive(Debug)]
pub(crate) struct TransferManager<B> {
    backend: Rc<B>,
    catalog: Rc<CatalogClient<B>>,
    notifier: Notifier,
    accepted_extension: String,
    gate: AffordanceGate,
    drag_active: Cell<bool>,
}

impl<B: LibraryBackend> TransferManager<B> {
    pub(crate) fn new(
        backend: Rc<B>,
        catalog: Rc<CatalogClient<B>>,
        notifier: Notifier,
        accepted_extension: String,
    ) -> Self {
        Self {
            backend,
            catalog,
            notifier,
            accepted_extension,
            gate: AffordanceGate::new(Affordance::Upload),
            drag_active: Cell::new(false),
        }
    }

    pub(crate) fn drag_enter(&self) {
        self.drag_active.set(true);
    }

    pub(crate) fn drag_leave(&self) {
        self.drag_active.set(false);
    }

    pub(crate) fn drag_active(&self) -> bool {
        self.drag_active.get()
    }

    pub(crate) fn state(&self) -> AffordanceState {
        self.gate.state()
    }

    pub(crate) async fn submit(
        &self,
        origin: TransferOrigin,
        file: Option<B::Upload>,
    ) -> ControllerResult<TransferOutcome> {
        if origin == TransferOrigin::Drop {
            self.drag_active.set(false);
        }
        self.gate.ensure_ready()?;
        let Some(file) = file else {
            tracing::debug!(?origin, "transfer triggered without a file");
            return Ok(TransferOutcome::Skipped);
        };
        let file_name = file.file_name();
        if !has_accepted_extension(&file_name, &self.accepted_extension) {
            self.notifier
                .notify(REJECTED_EXTENSION_MESSAGE, OUTCOME_NOTICE);
            return Err(ValidationError::UnsupportedExtension {
                file_name,
                expected: self.accepted_extension.clone(),
            }
            .into());
        }

        let flight = self.gate.begin()?;
        let result = self.transfer(&file, file_name).await;
        flight.finish(&result);
        result
    }

    async fn transfer(
        &self,
        file: &B::Upload,
        file_name: String,
    ) -> ControllerResult<TransferOutcome> {
        self.notifier.notify(UPLOADING_MESSAGE, PENDING_NOTICE);
        tracing::info!(file = %file_name, "uploading video");

        let response = match self.backend.upload(file).await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(file = %file_name, error = %err, "upload request failed");
                return Err(self.rejected(None));
            }
        };

        match response.into_outcome() {
            MutationOutcome::Accepted(receipt) => {
                let filename = receipt
                    .filename
                    .unwrap_or_else(|| VideoId::new(file_name));
                tracing::info!(
                    video = %filename,
                    playlist = receipt.playlist.as_deref().unwrap_or("-"),
                    "upload stored"
                );
                self.notifier
                    .notify(format!("Upload complete: {filename}"), OUTCOME_NOTICE);
                let catalog_refreshed = self.catalog.refresh_after_mutation(&self.notifier).await;
                Ok(TransferOutcome::Uploaded {
                    filename,
                    catalog_refreshed,
                })
            }
            MutationOutcome::Rejected(error) => Err(self.rejected(error)),
        }
    }

    fn rejected(&self, error: Option<String>) -> ControllerError {
        let message = error.unwrap_or_else(|| UPLOAD_FAILED_MESSAGE.to_string());
        self.notifier.notify(message.clone(), OUTCOME_NOTICE);
        ControllerError::RemoteFailure {
            operation: Operation::Upload,
            message,
        }
    }
}
