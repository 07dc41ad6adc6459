//! In-memory fakes for the controller tests.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;
use vidshelf_api_models::{
    DeleteRequest, DeleteResponse, StreamResponse, UploadResponse, VideoId,
};

use crate::backend::{BackendError, LibraryBackend, UploadSource};
use crate::notify::{Notice, NoticeId, NoticeSurface};
use crate::playback::{EngineError, MediaSource, PlaybackEngine, SubtitleTrack};

pub(crate) fn ids(values: &[&str]) -> Vec<VideoId> {
    values.iter().copied().map(VideoId::from).collect()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Call {
    List,
    Stream(VideoId),
    Upload(String),
    Delete(Vec<VideoId>),
}

#[derive(Clone, Debug)]
pub(crate) struct FakeFile {
    name: String,
}

impl FakeFile {
    pub(crate) fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

impl UploadSource for FakeFile {
    fn file_name(&self) -> String {
        self.name.clone()
    }
}

/// Stateful backend: uploads append to the listing, deletes remove from it,
/// unless a scripted answer overrides the next call.
#[derive(Default)]
pub(crate) struct FakeBackend {
    listing: RefCell<Vec<VideoId>>,
    listing_failure: RefCell<Option<BackendError>>,
    stream_failure: RefCell<Option<BackendError>>,
    playlists: RefCell<HashMap<VideoId, String>>,
    upload_answers: RefCell<VecDeque<Result<UploadResponse, BackendError>>>,
    delete_answers: RefCell<VecDeque<Result<DeleteResponse, BackendError>>>,
    upload_hold: RefCell<Option<Rc<Notify>>>,
    calls: RefCell<Vec<Call>>,
}

impl FakeBackend {
    pub(crate) fn with_catalog(values: &[&str]) -> Self {
        let backend = Self::default();
        *backend.listing.borrow_mut() = ids(values);
        backend
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub(crate) fn fail_listing(&self, error: BackendError) {
        *self.listing_failure.borrow_mut() = Some(error);
    }

    pub(crate) fn fail_stream(&self, error: BackendError) {
        *self.stream_failure.borrow_mut() = Some(error);
    }

    pub(crate) fn set_playlist(&self, video: &str, playlist: &str) {
        self.playlists
            .borrow_mut()
            .insert(VideoId::from(video), playlist.to_string());
    }

    pub(crate) fn answer_upload(&self, answer: Result<UploadResponse, BackendError>) {
        self.upload_answers.borrow_mut().push_back(answer);
    }

    pub(crate) fn answer_delete(&self, answer: Result<DeleteResponse, BackendError>) {
        self.delete_answers.borrow_mut().push_back(answer);
    }

    /// Make uploads wait until the returned handle is notified.
    pub(crate) fn hold_uploads(&self) -> Rc<Notify> {
        let release = Rc::new(Notify::new());
        *self.upload_hold.borrow_mut() = Some(Rc::clone(&release));
        release
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }
}

#[async_trait(?Send)]
impl LibraryBackend for FakeBackend {
    type Upload = FakeFile;

    async fn list_videos(&self) -> Result<Vec<VideoId>, BackendError> {
        self.record(Call::List);
        if let Some(error) = self.listing_failure.borrow().clone() {
            return Err(error);
        }
        Ok(self.listing.borrow().clone())
    }

    async fn resolve_stream(&self, video: &VideoId) -> Result<StreamResponse, BackendError> {
        self.record(Call::Stream(video.clone()));
        if let Some(error) = self.stream_failure.borrow().clone() {
            return Err(error);
        }
        let playlist = self
            .playlists
            .borrow()
            .get(video)
            .cloned()
            .unwrap_or_else(|| format!("/hls/{}/index.m3u8", video.base_name(".mkv")));
        Ok(StreamResponse { playlist })
    }

    async fn upload(&self, file: &FakeFile) -> Result<UploadResponse, BackendError> {
        self.record(Call::Upload(file.file_name()));
        let hold = self.upload_hold.borrow().clone();
        if let Some(release) = hold {
            release.notified().await;
        }
        let scripted = self.upload_answers.borrow_mut().pop_front();
        if let Some(answer) = scripted {
            return answer;
        }
        let stored = VideoId::new(file.file_name());
        self.listing.borrow_mut().push(stored.clone());
        Ok(UploadResponse {
            success: true,
            playlist: Some(format!("/hls/{}/index.m3u8", stored.base_name(".mkv"))),
            filename: Some(stored),
            error: None,
        })
    }

    async fn delete(&self, request: &DeleteRequest) -> Result<DeleteResponse, BackendError> {
        self.record(Call::Delete(request.videos.clone()));
        let scripted = self.delete_answers.borrow_mut().pop_front();
        if let Some(answer) = scripted {
            return answer;
        }
        self.listing
            .borrow_mut()
            .retain(|video| !request.videos.contains(video));
        Ok(DeleteResponse {
            success: true,
            error: None,
        })
    }
}

/// Player recording what it was told to do.
#[derive(Default)]
pub(crate) struct FakeEngine {
    tracks: RefCell<Vec<SubtitleTrack>>,
    source: RefCell<Option<MediaSource>>,
    playing: Cell<bool>,
    refuse_removals: Cell<bool>,
}

impl FakeEngine {
    pub(crate) fn with_tracks(count: usize) -> Self {
        let engine = Self::default();
        *engine.tracks.borrow_mut() = (0..count)
            .map(|index| SubtitleTrack::english(format!("stale-{index}.vtt")))
            .collect();
        engine
    }

    pub(crate) fn refuse_removals(&self) {
        self.refuse_removals.set(true);
    }

    pub(crate) fn tracks(&self) -> Vec<SubtitleTrack> {
        self.tracks.borrow().clone()
    }

    pub(crate) fn source(&self) -> Option<MediaSource> {
        self.source.borrow().clone()
    }

    pub(crate) fn playing(&self) -> bool {
        self.playing.get()
    }
}

impl PlaybackEngine for FakeEngine {
    fn text_track_count(&self) -> Result<usize, EngineError> {
        Ok(self.tracks.borrow().len())
    }

    fn remove_text_track(&self, index: usize) -> Result<(), EngineError> {
        if self.refuse_removals.get() {
            return Ok(());
        }
        let mut tracks = self.tracks.borrow_mut();
        if index >= tracks.len() {
            return Err(EngineError::new("remove_text_track", "index out of range"));
        }
        tracks.remove(index);
        Ok(())
    }

    fn add_text_track(&self, track: &SubtitleTrack) -> Result<(), EngineError> {
        self.tracks.borrow_mut().push(track.clone());
        Ok(())
    }

    fn set_source(&self, source: &MediaSource) -> Result<(), EngineError> {
        self.playing.set(false);
        *self.source.borrow_mut() = Some(source.clone());
        Ok(())
    }

    fn load(&self) -> Result<(), EngineError> {
        Ok(())
    }

    fn play(&self) -> Result<(), EngineError> {
        self.playing.set(true);
        Ok(())
    }
}

type PendingHide = (Duration, Box<dyn FnOnce()>);

/// Surface recording notices and holding hide timers until fired.
#[derive(Default)]
pub(crate) struct RecordingSurface {
    shown: RefCell<Vec<Notice>>,
    hidden: RefCell<Vec<NoticeId>>,
    timers: RefCell<VecDeque<PendingHide>>,
    scheduled: RefCell<Vec<Duration>>,
}

impl RecordingSurface {
    pub(crate) fn messages(&self) -> Vec<String> {
        self.shown
            .borrow()
            .iter()
            .map(|notice| notice.message.clone())
            .collect()
    }

    pub(crate) fn last_message(&self) -> Option<String> {
        self.shown.borrow().last().map(|notice| notice.message.clone())
    }

    pub(crate) fn hidden(&self) -> Vec<NoticeId> {
        self.hidden.borrow().clone()
    }

    pub(crate) fn scheduled_durations(&self) -> Vec<Duration> {
        self.scheduled.borrow().clone()
    }

    pub(crate) fn fire_next_timer(&self) {
        let next = self.timers.borrow_mut().pop_front();
        if let Some((_, hide)) = next {
            hide();
        }
    }

    pub(crate) fn fire_timers(&self) {
        let pending: Vec<PendingHide> = self.timers.borrow_mut().drain(..).collect();
        for (_, hide) in pending {
            hide();
        }
    }
}

impl NoticeSurface for RecordingSurface {
    fn show(&self, notice: &Notice) {
        self.shown.borrow_mut().push(notice.clone());
    }

    fn hide(&self, id: NoticeId) {
        self.hidden.borrow_mut().push(id);
    }

    fn schedule_hide(&self, after: Duration, hide: Box<dyn FnOnce()>) {
        self.scheduled.borrow_mut().push(after);
        self.timers.borrow_mut().push_back((after, hide));
    }
}
