//! Notice surface backed by a Yew redraw and browser timeouts.
//!
//! The notice text itself is read from the controller's notifier at render
//! time; this surface only schedules redraws.

use std::time::Duration;

use gloo::timers::callback::Timeout;
use vidshelf_core::{Notice, NoticeId, NoticeSurface};
use yew::Callback;

use crate::settings::timer_millis;

pub(crate) struct ToastSurface {
    redraw: Callback<()>,
}

impl ToastSurface {
    pub(crate) const fn new(redraw: Callback<()>) -> Self {
        Self { redraw }
    }
}

impl NoticeSurface for ToastSurface {
    fn show(&self, _notice: &Notice) {
        self.redraw.emit(());
    }

    fn hide(&self, _id: NoticeId) {
        self.redraw.emit(());
    }

    fn schedule_hide(&self, after: Duration, hide: Box<dyn FnOnce()>) {
        // Stale ids are ignored by the notifier, so timers are never cancelled.
        let _ = Timeout::new(timer_millis(after), hide).forget();
    }
}
