//! Stream resolution and player wiring.
//!
//! # Design
//! - Playback only starts from an explicit load; changing the selection does
//!   nothing on its own.
//! - The subtitle location is derived from the video id; nothing checks that it exists.
//! - Text tracks are drained before the new one is attached, so the player
//!   always ends up with exactly one.

use std::cell::RefCell;
use std::rc::Rc;

use thiserror::Error;
use vidshelf_api_models::{HLS_MIME_TYPE, VideoId};

use crate::affordance::{Affordance, AffordanceGate, AffordanceState};
use crate::backend::LibraryBackend;
use crate::error::{ControllerError, ControllerResult, ValidationError};
use crate::notify::{Notifier, OUTCOME_NOTICE};

/// File name of the subtitle track inside a video's asset folder.
pub const SUBTITLE_FILE: &str = "subtitles.vtt";
/// Shown when load is pressed without a selection.
pub const NO_SELECTION_MESSAGE: &str = "Select a video first!";
/// Shown when the manifest cannot be resolved.
pub const STREAM_FAILED_MESSAGE: &str = "Failed to load video stream";
/// Shown when the player rejects a step.
pub const PLAYBACK_FAILED_MESSAGE: &str = "Playback failed";

/// Failure reported by a [`PlaybackEngine`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{step}: {message}")]
pub struct EngineError {
    /// Engine step that failed.
    pub step: &'static str,
    /// Failure text.
    pub message: String,
}

impl EngineError {
    /// Build an error for `step`.
    #[must_use]
    pub fn new(step: &'static str, message: impl ToString) -> Self {
        Self {
            step,
            message: message.to_string(),
        }
    }
}

/// Remote text track handed to the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubtitleTrack {
    /// Track kind, always `subtitles`.
    pub kind: &'static str,
    /// WebVTT location.
    pub src: String,
    /// Language tag.
    pub srclang: &'static str,
    /// Menu label.
    pub label: &'static str,
    /// Whether the track is enabled on load.
    pub default: bool,
}

impl SubtitleTrack {
    /// Default-on English subtitles at `src`.
    #[must_use]
    pub fn english(src: impl Into<String>) -> Self {
        Self {
            kind: "subtitles",
            src: src.into(),
            srclang: "en",
            label: "English",
            default: true,
        }
    }
}

/// Source handed to the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaSource {
    /// Manifest location.
    pub src: String,
    /// MIME type of the manifest.
    pub mime: &'static str,
}

impl MediaSource {
    /// HLS source for `manifest`.
    #[must_use]
    pub fn hls(manifest: impl Into<String>) -> Self {
        Self {
            src: manifest.into(),
            mime: HLS_MIME_TYPE,
        }
    }
}

/// Everything needed to play one video.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamDescriptor {
    /// Video being played.
    pub video: VideoId,
    /// Manifest location as returned by the backend.
    pub manifest: String,
    /// Derived subtitle location.
    pub subtitle: String,
}

impl StreamDescriptor {
    /// Source for the engine.
    #[must_use]
    pub fn source(&self) -> MediaSource {
        MediaSource::hls(self.manifest.clone())
    }

    /// Subtitle track for the engine.
    #[must_use]
    pub fn subtitle_track(&self) -> SubtitleTrack {
        SubtitleTrack::english(self.subtitle.clone())
    }
}

/// Adaptive-streaming player.
pub trait PlaybackEngine {
    /// Number of attached text tracks.
    ///
    /// # Errors
    ///
    /// Returns an error when the player cannot be queried.
    fn text_track_count(&self) -> Result<usize, EngineError>;

    /// Detach the text track at `index`.
    ///
    /// # Errors
    ///
    /// Returns an error when the player rejects the removal.
    fn remove_text_track(&self, index: usize) -> Result<(), EngineError>;

    /// Attach a remote text track.
    ///
    /// # Errors
    ///
    /// Returns an error when the player rejects the track.
    fn add_text_track(&self, track: &SubtitleTrack) -> Result<(), EngineError>;

    /// Replace the current source.
    ///
    /// # Errors
    ///
    /// Returns an error when the player rejects the source.
    fn set_source(&self, source: &MediaSource) -> Result<(), EngineError>;

    /// Reload the media element.
    ///
    /// # Errors
    ///
    /// Returns an error when the reload fails.
    fn load(&self) -> Result<(), EngineError>;

    /// Start playback.
    ///
    /// # Errors
    ///
    /// Returns an error when playback cannot start.
    fn play(&self) -> Result<(), EngineError>;
}

/// Subtitle location for `video` under `root`.
#[must_use]
pub fn subtitle_uri(root: &str, video: &VideoId, extension: &str) -> String {
    let base = video.base_name(extension);
    if root.is_empty() {
        format!("{base}/{SUBTITLE_FILE}")
    } else {
        format!("{root}/{base}/{SUBTITLE_FILE}")
    }
}

/// Remove every text track from `engine`.
///
/// # Errors
///
/// Fails when the engine errors or a removal leaves the count unchanged.
pub fn drain_text_tracks<E: PlaybackEngine + ?Sized>(engine: &E) -> Result<(), EngineError> {
    let mut remaining = engine.text_track_count()?;
    while remaining > 0 {
        engine.remove_text_track(0)?;
        let after = engine.text_track_count()?;
        if after >= remaining {
            return Err(EngineError::new(
                "drain",
                format!("text track count stuck at {after}"),
            ));
        }
        remaining = after;
    }
    Ok(())
}

/// Attach `stream` to `engine` and start playing.
///
/// # Errors
///
/// Returns the first engine step that fails.
pub fn attach<E: PlaybackEngine + ?Sized>(
    engine: &E,
    stream: &StreamDescriptor,
) -> Result<(), EngineError> {
    drain_text_tracks(engine)?;
    engine.add_text_track(&stream.subtitle_track())?;
    engine.set_source(&stream.source())?;
    engine.load()?;
    engine.play()
}

#[derive(Debug)]
pub(crate) struct PlaybackController<B, E> {
    backend: Rc<B>,
    engine: Rc<E>,
    notifier: Notifier,
    subtitle_root: String,
    extension: String,
    gate: AffordanceGate,
    now_playing: RefCell<Option<StreamDescriptor>>,
}

impl<B: LibraryBackend, E: PlaybackEngine> PlaybackController<B, E> {
    pub(crate) fn new(
        backend: Rc<B>,
        engine: Rc<E>,
        notifier: Notifier,
        subtitle_root: String,
        extension: String,
    ) -> Self {
        Self {
            backend,
            engine,
            notifier,
            subtitle_root,
            extension,
            gate: AffordanceGate::new(Affordance::Load),
            now_playing: RefCell::new(None),
        }
    }

    pub(crate) fn state(&self) -> AffordanceState {
        self.gate.state()
    }

    pub(crate) fn now_playing(&self) -> Option<StreamDescriptor> {
        self.now_playing.borrow().clone()
    }

    pub(crate) async fn load(&self, selection: Option<VideoId>) -> ControllerResult<StreamDescriptor> {
        self.gate.ensure_ready()?;
        let Some(video) = selection else {
            self.notifier.notify(NO_SELECTION_MESSAGE, OUTCOME_NOTICE);
            return Err(ValidationError::NoSelection.into());
        };

        let flight = self.gate.begin()?;
        let result = self.start(video).await;
        flight.finish(&result);
        result
    }

    async fn start(&self, video: VideoId) -> ControllerResult<StreamDescriptor> {
        tracing::debug!(video = %video, "resolving stream");
        let response = match self.backend.resolve_stream(&video).await {
            Ok(response) => response,
            Err(source) => {
                tracing::warn!(video = %video, error = %source, "stream resolution failed");
                self.notifier.notify(STREAM_FAILED_MESSAGE, OUTCOME_NOTICE);
                return Err(ControllerError::StreamResolutionFailed { video, source });
            }
        };

        let stream = StreamDescriptor {
            subtitle: subtitle_uri(&self.subtitle_root, &video, &self.extension),
            manifest: response.playlist,
            video,
        };
        if let Err(source) = attach(self.engine.as_ref(), &stream) {
            tracing::warn!(video = %stream.video, error = %source, "player rejected stream");
            self.notifier.notify(PLAYBACK_FAILED_MESSAGE, OUTCOME_NOTICE);
            return Err(ControllerError::PlaybackFailed {
                video: stream.video,
                source,
            });
        }

        tracing::info!(video = %stream.video, manifest = %stream.manifest, "playback started");
        *self.now_playing.borrow_mut() = Some(stream.clone());
        Ok(stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendError;
    use crate::testing::{Call, FakeBackend, FakeEngine, RecordingSurface};

    struct Fixture {
        backend: Rc<FakeBackend>,
        engine: Rc<FakeEngine>,
        surface: Rc<RecordingSurface>,
        controller: PlaybackController<FakeBackend, FakeEngine>,
    }

    fn fixture(backend: FakeBackend, engine: FakeEngine) -> Fixture {
        let backend = Rc::new(backend);
        let engine = Rc::new(engine);
        let surface = Rc::new(RecordingSurface::default());
        let controller = PlaybackController::new(
            backend.clone(),
            engine.clone(),
            Notifier::new(surface.clone()),
            "hls".to_string(),
            ".mkv".to_string(),
        );
        Fixture {
            backend,
            engine,
            surface,
            controller,
        }
    }

    #[test]
    fn subtitle_uri_strips_extension_case_insensitively() {
        let root = "/static/assets/videos/hls";
        assert_eq!(
            subtitle_uri(root, &VideoId::from("b.mkv"), ".mkv"),
            "/static/assets/videos/hls/b/subtitles.vtt"
        );
        assert_eq!(
            subtitle_uri(root, &VideoId::from("Trip.MKV"), ".mkv"),
            "/static/assets/videos/hls/Trip/subtitles.vtt"
        );
        assert_eq!(
            subtitle_uri("", &VideoId::from("clip.webm"), ".mkv"),
            "clip.webm/subtitles.vtt"
        );
    }

    #[tokio::test]
    async fn load_attaches_manifest_and_single_subtitle() -> anyhow::Result<()> {
        let backend = FakeBackend::with_catalog(&["a.mkv", "b.mkv"]);
        backend.set_playlist("b.mkv", "hls/b/index.m3u8");
        let fx = fixture(backend, FakeEngine::default());

        let stream = fx.controller.load(Some(VideoId::from("b.mkv"))).await?;

        assert_eq!(stream.manifest, "hls/b/index.m3u8");
        assert_eq!(stream.subtitle, "hls/b/subtitles.vtt");
        assert_eq!(
            fx.engine.source(),
            Some(MediaSource {
                src: "hls/b/index.m3u8".to_string(),
                mime: "application/x-mpegURL",
            })
        );
        assert_eq!(
            fx.engine.tracks(),
            vec![SubtitleTrack::english("hls/b/subtitles.vtt")]
        );
        assert!(fx.engine.playing());
        assert_eq!(fx.backend.calls(), vec![Call::Stream(VideoId::from("b.mkv"))]);
        assert_eq!(fx.controller.now_playing(), Some(stream));
        Ok(())
    }

    #[tokio::test]
    async fn reloading_replaces_subtitle_track() -> anyhow::Result<()> {
        let backend = FakeBackend::with_catalog(&["a.mkv", "b.mkv"]);
        let fx = fixture(backend, FakeEngine::with_tracks(2));

        fx.controller.load(Some(VideoId::from("a.mkv"))).await?;
        fx.controller.load(Some(VideoId::from("b.mkv"))).await?;

        let tracks = fx.engine.tracks();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].src, "hls/b/subtitles.vtt");
        Ok(())
    }

    #[tokio::test]
    async fn missing_selection_notifies_without_network() {
        let fx = fixture(FakeBackend::with_catalog(&["a.mkv"]), FakeEngine::default());

        let result = fx.controller.load(None).await;

        assert!(matches!(
            result,
            Err(ControllerError::Validation(ValidationError::NoSelection))
        ));
        assert!(fx.backend.calls().is_empty());
        assert_eq!(fx.surface.last_message().as_deref(), Some(NO_SELECTION_MESSAGE));
        assert_eq!(fx.controller.state(), AffordanceState::Idle);
    }

    #[tokio::test]
    async fn resolution_failure_leaves_engine_untouched() {
        let backend = FakeBackend::with_catalog(&["a.mkv"]);
        backend.fail_stream(BackendError::Status {
            path: "/api/stream/a.mkv".to_string(),
            status: 404,
            detail: Some("Video not found".to_string()),
        });
        let fx = fixture(backend, FakeEngine::with_tracks(1));

        let result = fx.controller.load(Some(VideoId::from("a.mkv"))).await;

        assert!(matches!(
            result,
            Err(ControllerError::StreamResolutionFailed { .. })
        ));
        assert_eq!(fx.engine.tracks().len(), 1);
        assert_eq!(fx.engine.source(), None);
        assert_eq!(fx.surface.last_message().as_deref(), Some(STREAM_FAILED_MESSAGE));
        assert_eq!(fx.controller.state(), AffordanceState::Failed);
    }

    #[tokio::test]
    async fn stuck_drain_is_reported_as_playback_failure() {
        let engine = FakeEngine::with_tracks(1);
        engine.refuse_removals();
        let fx = fixture(FakeBackend::with_catalog(&["a.mkv"]), engine);

        let result = fx.controller.load(Some(VideoId::from("a.mkv"))).await;

        assert!(matches!(
            result,
            Err(ControllerError::PlaybackFailed { ref source, .. }) if source.step == "drain"
        ));
        assert!(!fx.engine.playing());
        assert_eq!(fx.surface.last_message().as_deref(), Some(PLAYBACK_FAILED_MESSAGE));
    }
}
