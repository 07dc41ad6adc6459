//! Transient status notices.
//!
//! # Design
//! - One notice is visible at a time; a new one replaces the current one.
//! - Each notice carries a monotonically increasing id. A hide timer only
//!   hides the notice it was scheduled for, so an older timer never cuts a
//!   newer message short.
//! - Rendering and timers belong to the [`NoticeSurface`].

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

/// Display time used when the caller does not pick one.
pub const DEFAULT_NOTICE: Duration = Duration::from_millis(2_000);
/// Display time for outcome and validation notices.
pub const OUTCOME_NOTICE: Duration = Duration::from_millis(3_000);
/// Ceiling for "in progress" notices; the outcome notice replaces them.
pub const PENDING_NOTICE: Duration = Duration::from_millis(10_000);

/// Identifier of a displayed notice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NoticeId(u64);

/// A notice as handed to the surface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    /// Identifier used to match hide timers.
    pub id: NoticeId,
    /// Text shown to the user.
    pub message: String,
    /// Time until the notice hides itself.
    pub duration: Duration,
}

/// Rendering side of the notifier.
pub trait NoticeSurface {
    /// Display `notice`, replacing anything on screen.
    fn show(&self, notice: &Notice);

    /// Clear the notice `id` from the screen.
    fn hide(&self, id: NoticeId);

    /// Run `hide` once `after` has elapsed.
    fn schedule_hide(&self, after: Duration, hide: Box<dyn FnOnce()>);
}

#[derive(Default)]
struct NoticeSlot {
    current: RefCell<Option<Notice>>,
    last_id: Cell<u64>,
}

impl NoticeSlot {
    fn expire(&self, id: NoticeId) -> bool {
        let mut current = self.current.borrow_mut();
        if current.as_ref().is_some_and(|notice| notice.id == id) {
            *current = None;
            true
        } else {
            false
        }
    }
}

/// Shared handle posting notices to a surface.
#[derive(Clone)]
pub struct Notifier {
    slot: Rc<NoticeSlot>,
    surface: Rc<dyn NoticeSurface>,
}

impl fmt::Debug for Notifier {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Notifier")
            .field("current", &self.slot.current.borrow())
            .field("last_id", &self.slot.last_id.get())
            .finish_non_exhaustive()
    }
}

impl Notifier {
    /// Create a notifier rendering through `surface`.
    #[must_use]
    pub fn new(surface: Rc<dyn NoticeSurface>) -> Self {
        Self {
            slot: Rc::new(NoticeSlot::default()),
            surface,
        }
    }

    /// Show `message` for `duration`, replacing the current notice.
    pub fn notify(&self, message: impl Into<String>, duration: Duration) -> NoticeId {
        let id = NoticeId(self.slot.last_id.get() + 1);
        self.slot.last_id.set(id.0);
        let notice = Notice {
            id,
            message: message.into(),
            duration,
        };
        tracing::debug!(notice = id.0, message = %notice.message, "showing notice");
        *self.slot.current.borrow_mut() = Some(notice.clone());
        self.surface.show(&notice);

        let slot: Weak<NoticeSlot> = Rc::downgrade(&self.slot);
        let surface = Rc::clone(&self.surface);
        self.surface.schedule_hide(
            duration,
            Box::new(move || {
                if let Some(slot) = slot.upgrade()
                    && slot.expire(id)
                {
                    surface.hide(id);
                }
            }),
        );
        id
    }

    /// Show `message` for [`DEFAULT_NOTICE`].
    pub fn notify_default(&self, message: impl Into<String>) -> NoticeId {
        self.notify(message, DEFAULT_NOTICE)
    }

    /// Hide notice `id` ahead of its timer. Returns false if it is no longer shown.
    pub fn dismiss(&self, id: NoticeId) -> bool {
        let expired = self.slot.expire(id);
        if expired {
            self.surface.hide(id);
        }
        expired
    }

    /// Notice currently on screen.
    #[must_use]
    pub fn current(&self) -> Option<Notice> {
        self.slot.current.borrow().clone()
    }
}
