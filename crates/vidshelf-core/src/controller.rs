//! The library controller shared by every front-end.
//!
//! # Design
//! - One owned value holds the catalog, the selection, the removal dialog,
//!   the drop target and every affordance gate.
//! - Front-ends hold it behind an `Rc`; each operation takes `&self` and never
//!   keeps a `RefCell` borrow across an `.await`.
//! - Operations return `ControllerResult`; user-facing feedback has already
//!   been posted to the notifier by the time they resolve.
//! - The selection only ever names a listed video: a refresh that drops it,
//!   or a delete that removes it, clears it back to the placeholder.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use vidshelf_api_models::VideoId;

use crate::affordance::{Affordance, AffordanceState};
use crate::backend::LibraryBackend;
use crate::catalog::{Catalog, CatalogClient, LOAD_FAILED_MESSAGE};
use crate::config::ClientConfig;
use crate::error::ControllerResult;
use crate::notify::{Notice, NoticeSurface, Notifier, OUTCOME_NOTICE};
use crate::playback::{PlaybackController, PlaybackEngine, StreamDescriptor};
use crate::removal::{RemovalDialog, RemovalManager};
use crate::selection::{self, SelectionOption};
use crate::transfer::{TransferManager, TransferOrigin, TransferOutcome};

/// Client-side state and operations of the video library.
pub struct LibraryController<B, E> {
    config: ClientConfig,
    engine: Rc<E>,
    notifier: Notifier,
    catalog: Rc<CatalogClient<B>>,
    selection: RefCell<Option<VideoId>>,
    transfer: TransferManager<B>,
    removal: RemovalManager<B>,
    playback: PlaybackController<B, E>,
}

impl<B, E> fmt::Debug for LibraryController<B, E> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("LibraryController")
            .field("config", &self.config)
            .field("selection", &self.selection.borrow())
            .field("notifier", &self.notifier)
            .finish_non_exhaustive()
    }
}

impl<B: LibraryBackend, E: PlaybackEngine> LibraryController<B, E> {
    /// Wire a controller around `backend`, `engine` and `surface`.
    #[must_use]
    pub fn new(config: ClientConfig, backend: B, engine: E, surface: Rc<dyn NoticeSurface>) -> Self {
        let backend = Rc::new(backend);
        let engine = Rc::new(engine);
        let notifier = Notifier::new(surface);
        let catalog = Rc::new(CatalogClient::new(Rc::clone(&backend)));
        let transfer = TransferManager::new(
            Rc::clone(&backend),
            Rc::clone(&catalog),
            notifier.clone(),
            config.accepted_extension.clone(),
        );
        let removal = RemovalManager::new(Rc::clone(&backend), Rc::clone(&catalog), notifier.clone());
        let playback = PlaybackController::new(
            backend,
            Rc::clone(&engine),
            notifier.clone(),
            config.subtitle_root.clone(),
            config.accepted_extension.clone(),
        );
        Self {
            config,
            engine,
            notifier,
            catalog,
            selection: RefCell::new(None),
            transfer,
            removal,
            playback,
        }
    }

    /// Configuration the controller was built with.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Playback engine driven by the controller.
    #[must_use]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Notifier shared with the flows.
    #[must_use]
    pub const fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Notice currently on screen.
    #[must_use]
    pub fn notice(&self) -> Option<Notice> {
        self.notifier.current()
    }

    /// Take the current notice down ahead of its timer. Returns false when
    /// nothing is shown.
    pub fn dismiss_notice(&self) -> bool {
        self.notifier
            .current()
            .is_some_and(|notice| self.notifier.dismiss(notice.id))
    }

    /// Initial catalog load.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ControllerError::CatalogUnavailable`] when the listing fails.
    pub async fn start(&self) -> ControllerResult<Catalog> {
        tracing::debug!(api = %self.config.api_base_url, "starting library controller");
        self.refresh_catalog().await
    }

    /// Re-fetch the catalog, keeping the previous one on failure.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ControllerError::CatalogUnavailable`] when the listing fails.
    pub async fn refresh_catalog(&self) -> ControllerResult<Catalog> {
        let revision = self.catalog.revision();
        let result = self.catalog.refresh().await;
        if result.is_err() {
            self.notifier.notify(LOAD_FAILED_MESSAGE, OUTCOME_NOTICE);
        }
        self.reconcile_selection(revision, &[]);
        result
    }

    /// Drop a selection the catalog no longer backs.
    ///
    /// Checked against the cache only when it was refreshed since `revision`;
    /// ids in `removed` are dropped regardless.
    fn reconcile_selection(&self, revision: u64, removed: &[VideoId]) {
        let refreshed = self.catalog.revision() != revision;
        let catalog = self.catalog.snapshot();
        let mut selection = self.selection.borrow_mut();
        let stale = selection.as_ref().is_some_and(|video| {
            removed.contains(video) || (refreshed && !catalog.contains(video))
        });
        if stale {
            tracing::debug!(
                video = ?selection.as_ref().map(VideoId::as_str),
                "selection no longer listed"
            );
            *selection = None;
        }
    }

    /// Cached catalog.
    #[must_use]
    pub fn catalog(&self) -> Catalog {
        self.catalog.snapshot()
    }

    /// Picker entries for the cached catalog.
    #[must_use]
    pub fn selection_options(&self) -> Vec<SelectionOption> {
        selection::project(&self.catalog.snapshot(), self.selection.borrow().as_ref())
    }

    /// Replace the selection. Never starts playback.
    pub fn select(&self, video: Option<VideoId>) {
        tracing::debug!(video = ?video.as_ref().map(VideoId::as_str), "selection changed");
        *self.selection.borrow_mut() = video;
    }

    /// Replace the selection from a picker value; empty clears it.
    pub fn select_value(&self, value: &str) {
        self.select(selection::parse_choice(value));
    }

    /// Current selection.
    #[must_use]
    pub fn selection(&self) -> Option<VideoId> {
        self.selection.borrow().clone()
    }

    /// Resolve and play the selected video.
    ///
    /// # Errors
    ///
    /// Fails without a selection, when the manifest cannot be resolved or when
    /// the engine rejects a step.
    pub async fn load_selected(&self) -> ControllerResult<StreamDescriptor> {
        let selection = self.selection();
        self.playback.load(selection).await
    }

    /// Stream currently attached to the engine.
    #[must_use]
    pub fn now_playing(&self) -> Option<StreamDescriptor> {
        self.playback.now_playing()
    }

    /// A drag entered or moved over the drop target.
    pub fn drag_enter(&self) {
        self.transfer.drag_enter();
    }

    /// A drag left the drop target.
    pub fn drag_leave(&self) {
        self.transfer.drag_leave();
    }

    /// Whether the drop target shows its drag affordance.
    #[must_use]
    pub fn drag_active(&self) -> bool {
        self.transfer.drag_active()
    }

    /// Upload a browsed or dropped file.
    ///
    /// # Errors
    ///
    /// Fails on a rejected extension, a pending upload or a refused transfer.
    pub async fn upload(
        &self,
        origin: TransferOrigin,
        file: Option<B::Upload>,
    ) -> ControllerResult<TransferOutcome> {
        let revision = self.catalog.revision();
        let result = self.transfer.submit(origin, file).await;
        self.reconcile_selection(revision, &[]);
        result
    }

    /// Open the removal dialog from a fresh listing.
    ///
    /// # Errors
    ///
    /// Fails when the listing fails or a delete is still pending.
    pub async fn open_removal(&self) -> ControllerResult<RemovalDialog> {
        self.removal.open().await
    }

    /// Tick or untick one dialog entry. Returns false when it is not listed.
    pub fn toggle_removal(&self, video: &VideoId, checked: bool) -> bool {
        self.removal.toggle(video, checked)
    }

    /// Delete the checked entries.
    ///
    /// # Errors
    ///
    /// Fails when nothing is checked, the dialog is closed or the backend refuses.
    pub async fn confirm_removal(&self) -> ControllerResult<Vec<VideoId>> {
        let revision = self.catalog.revision();
        let result = self.removal.confirm().await;
        let removed = result.as_deref().unwrap_or_default();
        self.reconcile_selection(revision, removed);
        result
    }

    /// Close the dialog without deleting.
    pub fn cancel_removal(&self) {
        self.removal.cancel();
    }

    /// Open dialog, if any.
    #[must_use]
    pub fn removal_dialog(&self) -> Option<RemovalDialog> {
        self.removal.dialog()
    }

    /// Request state of `affordance`.
    #[must_use]
    pub fn affordance_state(&self, affordance: Affordance) -> AffordanceState {
        match affordance {
            Affordance::Load => self.playback.state(),
            Affordance::Upload => self.transfer.state(),
            Affordance::OpenRemoval | Affordance::ConfirmRemoval => self.removal.state(affordance),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendError;
    use crate::error::{ControllerError, ValidationError};
    use crate::testing::{FakeBackend, FakeEngine, FakeFile, RecordingSurface, ids};

    fn controller(backend: FakeBackend) -> (Rc<RecordingSurface>, LibraryController<FakeBackend, FakeEngine>) {
        let surface = Rc::new(RecordingSurface::default());
        let config = ClientConfig::default().with_subtitle_root("hls");
        let controller = LibraryController::new(config, backend, FakeEngine::default(), surface.clone());
        (surface, controller)
    }

    #[tokio::test]
    async fn select_then_load_plays_selected_video() -> anyhow::Result<()> {
        let backend = FakeBackend::with_catalog(&["a.mkv", "b.mkv"]);
        backend.set_playlist("b.mkv", "hls/b/index.m3u8");
        let (_surface, controller) = controller(backend);

        controller.start().await?;
        controller.select_value("b.mkv");
        assert!(controller.engine().source().is_none());

        let stream = controller.load_selected().await?;
        assert_eq!(stream.subtitle, "hls/b/subtitles.vtt");
        assert_eq!(controller.engine().tracks().len(), 1);
        assert!(controller.engine().playing());

        let selected: Vec<_> = controller
            .selection_options()
            .into_iter()
            .filter(|option| option.selected)
            .map(|option| option.value)
            .collect();
        assert_eq!(selected, vec!["b.mkv".to_string()]);
        Ok(())
    }

    #[tokio::test]
    async fn failed_start_notifies_and_keeps_empty_catalog() {
        let backend = FakeBackend::with_catalog(&["a.mkv"]);
        backend.fail_listing(BackendError::transport("/api/videos", "offline"));
        let (surface, controller) = controller(backend);

        let result = controller.start().await;
        assert!(matches!(result, Err(ControllerError::CatalogUnavailable { .. })));
        assert!(controller.catalog().is_empty());
        assert_eq!(surface.last_message().as_deref(), Some(LOAD_FAILED_MESSAGE));
    }

    #[tokio::test]
    async fn upload_then_delete_keeps_picker_in_sync() -> anyhow::Result<()> {
        let (_surface, controller) = controller(FakeBackend::with_catalog(&["a.mkv"]));
        controller.start().await?;

        controller
            .upload(TransferOrigin::Drop, Some(FakeFile::named("b.mkv")))
            .await?;
        assert_eq!(controller.catalog().entries(), ids(&["a.mkv", "b.mkv"]).as_slice());

        controller.open_removal().await?;
        assert!(controller.toggle_removal(&VideoId::from("a.mkv"), true));
        controller.confirm_removal().await?;

        assert_eq!(controller.catalog().entries(), ids(&["b.mkv"]).as_slice());
        assert_eq!(controller.removal_dialog(), None);
        assert_eq!(
            controller.affordance_state(Affordance::ConfirmRemoval),
            AffordanceState::Idle
        );
        Ok(())
    }

    #[tokio::test]
    async fn selection_survives_refresh() -> anyhow::Result<()> {
        let backend = FakeBackend::with_catalog(&["a.mkv"]);
        let (_surface, controller) = controller(backend);
        controller.start().await?;
        controller.select(Some(VideoId::from("a.mkv")));

        controller.refresh_catalog().await?;
        assert_eq!(controller.selection(), Some(VideoId::from("a.mkv")));
        Ok(())
    }

    #[tokio::test]
    async fn deleting_selected_video_clears_selection() -> anyhow::Result<()> {
        let (_surface, controller) = controller(FakeBackend::with_catalog(&["a.mkv", "b.mkv"]));
        controller.start().await?;
        controller.select_value("b.mkv");

        controller.open_removal().await?;
        assert!(controller.toggle_removal(&VideoId::from("b.mkv"), true));
        controller.confirm_removal().await?;

        assert_eq!(controller.catalog().entries(), ids(&["a.mkv"]).as_slice());
        assert_eq!(controller.selection(), None);
        let marked: Vec<_> = controller
            .selection_options()
            .into_iter()
            .filter(|option| option.selected)
            .map(|option| option.value)
            .collect();
        assert_eq!(marked, vec![String::new()]);

        let result = controller.load_selected().await;
        assert!(matches!(
            result,
            Err(ControllerError::Validation(ValidationError::NoSelection))
        ));
        assert!(controller.engine().source().is_none());
        Ok(())
    }

    #[tokio::test]
    async fn deleting_other_video_keeps_selection() -> anyhow::Result<()> {
        let backend = FakeBackend::with_catalog(&["a.mkv", "b.mkv"]);
        let (_surface, controller) = controller(backend);
        controller.start().await?;
        controller.select_value("a.mkv");

        controller.open_removal().await?;
        controller.toggle_removal(&VideoId::from("b.mkv"), true);
        controller.confirm_removal().await?;
        assert_eq!(controller.selection(), Some(VideoId::from("a.mkv")));
        Ok(())
    }

    #[tokio::test]
    async fn dismissed_notice_ignores_its_timer() {
        let backend = FakeBackend::with_catalog(&[]);
        backend.fail_listing(BackendError::transport("/api/videos", "offline"));
        let (surface, controller) = controller(backend);
        assert!(!controller.dismiss_notice());

        let _ = controller.start().await;
        let shown = controller.notice().map(|notice| notice.id);
        assert!(shown.is_some());

        assert!(controller.dismiss_notice());
        assert_eq!(controller.notice(), None);
        surface.fire_timers();
        assert_eq!(surface.hidden(), shown.into_iter().collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn cancel_closes_dialog_without_network() -> anyhow::Result<()> {
        let backend = FakeBackend::with_catalog(&["a.mkv"]);
        let (_surface, controller) = controller(backend);
        controller.open_removal().await?;
        controller.toggle_removal(&VideoId::from("a.mkv"), true);
        controller.cancel_removal();
        assert_eq!(controller.removal_dialog(), None);
        Ok(())
    }
}
