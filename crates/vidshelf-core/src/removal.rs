//! Batch removal through a confirmation dialog.
//!
//! # Design
//! - Opening always rebuilds the dialog from a fresh listing; the cached
//!   catalog behind the picker is neither trusted nor overwritten.
//! - Checked ids form a set, so the batch body never repeats an id.
//! - A failed delete keeps the dialog open with its checks intact.
//! - Open and confirm never overlap; each is rejected while the other is pending.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use vidshelf_api_models::{DeleteRequest, MutationOutcome, VideoId};

use crate::affordance::{Affordance, AffordanceGate, AffordanceState};
use crate::backend::LibraryBackend;
use crate::catalog::{Catalog, CatalogClient, LOAD_FAILED_MESSAGE};
use crate::error::{ControllerError, ControllerResult, Operation, ValidationError};
use crate::notify::{Notifier, OUTCOME_NOTICE, PENDING_NOTICE};

/// Shown when confirm is pressed with nothing checked.
pub const EMPTY_SELECTION_MESSAGE: &str = "Select at least one video to delete!";
/// Shown while the batch delete is outstanding.
pub const DELETING_MESSAGE: &str = "Deleting...";
/// Shown once the batch delete succeeded.
pub const DELETED_MESSAGE: &str = "Deleted successfully!";
/// Shown when the backend gives no reason for a failed delete.
pub const DELETE_FAILED_MESSAGE: &str = "Failed to delete";

/// One checkbox row of the dialog.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemovalEntry {
    /// Video behind the checkbox.
    pub video: VideoId,
    /// Whether the checkbox is ticked.
    pub checked: bool,
}

/// State of one open dialog session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RemovalDialog {
    videos: Vec<VideoId>,
    checked: BTreeSet<VideoId>,
}

impl RemovalDialog {
    /// Dialog listing every catalog entry, nothing checked.
    #[must_use]
    pub fn from_catalog(catalog: &Catalog) -> Self {
        Self {
            videos: catalog.entries().to_vec(),
            checked: BTreeSet::new(),
        }
    }

    /// Rows in catalog order.
    #[must_use]
    pub fn entries(&self) -> Vec<RemovalEntry> {
        self.videos
            .iter()
            .map(|video| RemovalEntry {
                video: video.clone(),
                checked: self.checked.contains(video),
            })
            .collect()
    }

    /// Tick or untick `video`. Returns false when the dialog does not list it.
    pub fn set_checked(&mut self, video: &VideoId, checked: bool) -> bool {
        if !self.videos.contains(video) {
            return false;
        }
        if checked {
            self.checked.insert(video.clone());
        } else {
            self.checked.remove(video);
        }
        true
    }

    /// Whether `video` is ticked.
    #[must_use]
    pub fn is_checked(&self, video: &VideoId) -> bool {
        self.checked.contains(video)
    }

    /// Ticked ids in dialog order, each exactly once.
    #[must_use]
    pub fn removal_set(&self) -> Vec<VideoId> {
        let mut seen = BTreeSet::new();
        self.videos
            .iter()
            .filter(|video| self.checked.contains(*video) && seen.insert(*video))
            .cloned()
            .collect()
    }
}

#[derive(Debug)]
pub(crate) struct RemovalManager<B> {
    backend: Rc<B>,
    catalog: Rc<CatalogClient<B>>,
    notifier: Notifier,
    dialog: RefCell<Option<RemovalDialog>>,
    open_gate: AffordanceGate,
    confirm_gate: AffordanceGate,
}

impl<B: LibraryBackend> RemovalManager<B> {
    pub(crate) fn new(backend: Rc<B>, catalog: Rc<CatalogClient<B>>, notifier: Notifier) -> Self {
        Self {
            backend,
            catalog,
            notifier,
            dialog: RefCell::new(None),
            open_gate: AffordanceGate::new(Affordance::OpenRemoval),
            confirm_gate: AffordanceGate::new(Affordance::ConfirmRemoval),
        }
    }

    pub(crate) fn state(&self, affordance: Affordance) -> AffordanceState {
        match affordance {
            Affordance::OpenRemoval => self.open_gate.state(),
            _ => self.confirm_gate.state(),
        }
    }

    pub(crate) fn dialog(&self) -> Option<RemovalDialog> {
        self.dialog.borrow().clone()
    }

    pub(crate) async fn open(&self) -> ControllerResult<RemovalDialog> {
        self.confirm_gate.ensure_ready()?;
        let flight = self.open_gate.begin()?;
        let result = match self.catalog.fetch().await {
            Ok(catalog) => {
                let dialog = RemovalDialog::from_catalog(&catalog);
                tracing::debug!(count = catalog.len(), "removal dialog opened");
                *self.dialog.borrow_mut() = Some(dialog.clone());
                Ok(dialog)
            }
            Err(err) => {
                tracing::warn!(error = %err, "removal dialog listing failed");
                self.notifier.notify(LOAD_FAILED_MESSAGE, OUTCOME_NOTICE);
                Err(err)
            }
        };
        flight.finish(&result);
        result
    }

    pub(crate) fn toggle(&self, video: &VideoId, checked: bool) -> bool {
        self.dialog
            .borrow_mut()
            .as_mut()
            .is_some_and(|dialog| dialog.set_checked(video, checked))
    }

    pub(crate) fn cancel(&self) {
        if self.dialog.borrow_mut().take().is_some() {
            tracing::debug!("removal dialog cancelled");
        }
    }

    pub(crate) async fn confirm(&self) -> ControllerResult<Vec<VideoId>> {
        self.open_gate.ensure_ready()?;
        self.confirm_gate.ensure_ready()?;
        let videos = match self.dialog.borrow().as_ref() {
            Some(dialog) => dialog.removal_set(),
            None => return Err(ValidationError::DialogClosed.into()),
        };
        if videos.is_empty() {
            self.notifier.notify(EMPTY_SELECTION_MESSAGE, OUTCOME_NOTICE);
            return Err(ValidationError::EmptyRemovalSet.into());
        }

        let flight = self.confirm_gate.begin()?;
        let result = self.submit(videos).await;
        flight.finish(&result);
        result
    }

    async fn submit(&self, videos: Vec<VideoId>) -> ControllerResult<Vec<VideoId>> {
        self.notifier.notify(DELETING_MESSAGE, PENDING_NOTICE);
        tracing::info!(count = videos.len(), "deleting videos");
        let request = DeleteRequest { videos };

        let outcome = match self.backend.delete(&request).await {
            Ok(response) => response.into_outcome(),
            Err(err) => {
                tracing::warn!(error = %err, "delete request failed");
                MutationOutcome::Rejected(None)
            }
        };

        match outcome {
            MutationOutcome::Accepted(()) => {
                self.notifier.notify(DELETED_MESSAGE, OUTCOME_NOTICE);
                self.catalog.refresh_after_mutation(&self.notifier).await;
                *self.dialog.borrow_mut() = None;
                Ok(request.videos)
            }
            MutationOutcome::Rejected(error) => {
                let message = error.unwrap_or_else(|| DELETE_FAILED_MESSAGE.to_string());
                self.notifier.notify(message.clone(), OUTCOME_NOTICE);
                Err(ControllerError::RemoteFailure {
                    operation: Operation::Delete,
                    message,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendError;
    use crate::testing::{Call, FakeBackend, RecordingSurface, ids};
    use vidshelf_api_models::DeleteResponse;

    struct Fixture {
        backend: Rc<FakeBackend>,
        surface: Rc<RecordingSurface>,
        catalog: Rc<CatalogClient<FakeBackend>>,
        manager: RemovalManager<FakeBackend>,
    }

    fn fixture(backend: FakeBackend) -> Fixture {
        let backend = Rc::new(backend);
        let surface = Rc::new(RecordingSurface::default());
        let notifier = Notifier::new(surface.clone());
        let catalog = Rc::new(CatalogClient::new(backend.clone()));
        let manager = RemovalManager::new(backend.clone(), catalog.clone(), notifier);
        Fixture {
            backend,
            surface,
            catalog,
            manager,
        }
    }

    #[test]
    fn removal_set_lists_each_checked_id_once() {
        let catalog: Catalog = ids(&["a.mkv", "b.mkv", "a.mkv", "c.mkv"]).into_iter().collect();
        let mut dialog = RemovalDialog::from_catalog(&catalog);
        assert!(dialog.set_checked(&VideoId::from("c.mkv"), true));
        assert!(dialog.set_checked(&VideoId::from("a.mkv"), true));
        assert!(dialog.set_checked(&VideoId::from("a.mkv"), true));
        assert!(!dialog.set_checked(&VideoId::from("zzz.mkv"), true));

        assert_eq!(dialog.removal_set(), ids(&["a.mkv", "c.mkv"]));
        assert_eq!(dialog.entries().len(), 4);
    }

    #[tokio::test]
    async fn reopening_rebuilds_identical_unchecked_dialog() -> anyhow::Result<()> {
        let fx = fixture(FakeBackend::with_catalog(&["a.mkv", "b.mkv"]));

        let first = fx.manager.open().await?;
        assert!(fx.manager.toggle(&VideoId::from("a.mkv"), true));
        fx.manager.cancel();
        let second = fx.manager.open().await?;

        assert_eq!(first, second);
        assert!(second.entries().iter().all(|entry| !entry.checked));
        assert_eq!(fx.backend.calls(), vec![Call::List, Call::List]);
        assert!(fx.catalog.snapshot().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn empty_confirm_keeps_dialog_open_without_network() -> anyhow::Result<()> {
        let fx = fixture(FakeBackend::with_catalog(&["a.mkv"]));
        fx.manager.open().await?;

        let result = fx.manager.confirm().await;
        assert!(matches!(
            result,
            Err(ControllerError::Validation(ValidationError::EmptyRemovalSet))
        ));
        assert!(fx.manager.dialog().is_some());
        assert_eq!(fx.backend.calls(), vec![Call::List]);
        assert_eq!(fx.surface.last_message().as_deref(), Some(EMPTY_SELECTION_MESSAGE));
        Ok(())
    }

    #[tokio::test]
    async fn confirm_deletes_refreshes_and_closes() -> anyhow::Result<()> {
        let fx = fixture(FakeBackend::with_catalog(&["a.mkv", "b.mkv", "c.mkv"]));
        fx.manager.open().await?;
        fx.manager.toggle(&VideoId::from("c.mkv"), true);
        fx.manager.toggle(&VideoId::from("a.mkv"), true);

        let deleted = fx.manager.confirm().await?;

        assert_eq!(deleted, ids(&["a.mkv", "c.mkv"]));
        assert_eq!(
            fx.backend.calls(),
            vec![
                Call::List,
                Call::Delete(ids(&["a.mkv", "c.mkv"])),
                Call::List
            ]
        );
        assert_eq!(fx.catalog.snapshot().entries(), ids(&["b.mkv"]).as_slice());
        assert_eq!(fx.manager.dialog(), None);
        assert_eq!(
            fx.surface.messages(),
            vec![DELETING_MESSAGE, DELETED_MESSAGE]
        );
        Ok(())
    }

    #[tokio::test]
    async fn failed_delete_keeps_checks_and_dialog() -> anyhow::Result<()> {
        let backend = FakeBackend::with_catalog(&["a.mkv", "b.mkv"]);
        backend.answer_delete(Ok(DeleteResponse {
            success: false,
            error: None,
        }));
        let fx = fixture(backend);
        fx.manager.open().await?;
        fx.manager.toggle(&VideoId::from("b.mkv"), true);

        let result = fx.manager.confirm().await;

        assert!(matches!(
            result,
            Err(ControllerError::RemoteFailure { operation: Operation::Delete, ref message })
                if message == DELETE_FAILED_MESSAGE
        ));
        let dialog = fx.manager.dialog().ok_or_else(|| anyhow::anyhow!("dialog closed"))?;
        assert!(dialog.is_checked(&VideoId::from("b.mkv")));
        assert_eq!(fx.manager.state(Affordance::ConfirmRemoval), AffordanceState::Failed);
        assert_eq!(
            fx.backend.calls(),
            vec![Call::List, Call::Delete(ids(&["b.mkv"]))]
        );
        Ok(())
    }

    #[tokio::test]
    async fn failed_listing_leaves_dialog_closed() {
        let backend = FakeBackend::with_catalog(&[]);
        backend.fail_listing(BackendError::transport("/api/videos", "offline"));
        let fx = fixture(backend);

        let result = fx.manager.open().await;
        assert!(matches!(result, Err(ControllerError::CatalogUnavailable { .. })));
        assert_eq!(fx.manager.dialog(), None);
        assert_eq!(fx.surface.last_message().as_deref(), Some(LOAD_FAILED_MESSAGE));
    }

    #[tokio::test]
    async fn confirm_waits_for_pending_reopen() -> anyhow::Result<()> {
        let fx = fixture(FakeBackend::with_catalog(&["a.mkv"]));
        fx.manager.open().await?;
        fx.manager.toggle(&VideoId::from("a.mkv"), true);

        let reopening = fx.manager.open_gate.begin()?;
        let result = fx.manager.confirm().await;
        drop(reopening);

        assert!(matches!(
            result,
            Err(ControllerError::Busy {
                affordance: Affordance::OpenRemoval
            })
        ));
        assert_eq!(fx.backend.calls(), vec![Call::List]);
        assert!(fx.manager.dialog().is_some());
        Ok(())
    }

    #[tokio::test]
    async fn confirm_without_dialog_is_rejected_quietly() {
        let fx = fixture(FakeBackend::with_catalog(&[]));
        let result = fx.manager.confirm().await;
        assert!(matches!(
            result,
            Err(ControllerError::Validation(ValidationError::DialogClosed))
        ));
        assert!(fx.surface.messages().is_empty());
    }
}
