//! Terminal implementations of the notice and playback boundaries.

use std::cell::{Cell, RefCell};
use std::time::Duration;

use vidshelf_core::{
    EngineError, MediaSource, Notice, NoticeId, NoticeSurface, PlaybackEngine, SubtitleTrack,
};

/// Prints notices to stderr, one line each.
#[derive(Debug, Default)]
pub(crate) struct TerminalSurface;

impl NoticeSurface for TerminalSurface {
    fn show(&self, notice: &Notice) {
        eprintln!("{}", notice.message);
    }

    fn hide(&self, _id: NoticeId) {}

    fn schedule_hide(&self, _after: Duration, _hide: Box<dyn FnOnce()>) {
        // Printed lines stay on screen; there is nothing to take down.
    }
}

/// Player stand-in that records what it was asked to play.
#[derive(Debug, Default)]
pub(crate) struct HeadlessEngine {
    tracks: RefCell<Vec<SubtitleTrack>>,
    source: RefCell<Option<MediaSource>>,
    playing: Cell<bool>,
}

impl HeadlessEngine {
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

impl PlaybackEngine for HeadlessEngine {
    fn text_track_count(&self) -> Result<usize, EngineError> {
        Ok(self.tracks.borrow().len())
    }

    fn remove_text_track(&self, index: usize) -> Result<(), EngineError> {
        let mut tracks = self.tracks.borrow_mut();
        if index >= tracks.len() {
            return Err(EngineError::new(
                "remove_text_track",
                format!("no track at index {index}"),
            ));
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
        if self.source.borrow().is_none() {
            return Err(EngineError::new("play", "no source set"));
        }
        self.playing.set(true);
        Ok(())
    }
}
