#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls
)]
#![warn(missing_docs, unreachable_pub, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! DOM-free controller for the Vidshelf video library client.
//!
//! The browser shell and the CLI both drive a [`LibraryController`]; the
//! network, the media player and the notification region sit behind the
//! [`LibraryBackend`], [`PlaybackEngine`] and [`NoticeSurface`] traits so the
//! ordering rules can be exercised without a browser.
//!
//! Layout:
//! - `notify.rs`: transient notices with preemption tokens
//! - `catalog.rs` / `selection.rs`: cached catalog and its projection
//! - `transfer.rs` / `removal.rs`: upload and batch delete flows
//! - `playback.rs`: stream resolution and engine track handling
//! - `controller.rs`: the owned state tying the above together

pub mod affordance;
pub mod backend;
pub mod catalog;
pub mod config;
pub mod controller;
pub mod error;
pub mod notify;
pub mod playback;
pub mod removal;
pub mod selection;
pub mod transfer;

#[cfg(test)]
pub(crate) mod testing;

pub use affordance::{Affordance, AffordanceState};
pub use backend::{BackendError, LibraryBackend, UploadSource};
pub use catalog::Catalog;
pub use config::{ClientConfig, ConfigError};
pub use controller::LibraryController;
pub use error::{ControllerError, ControllerResult, Operation, ValidationError};
pub use notify::{Notice, NoticeId, NoticeSurface, Notifier};
pub use playback::{EngineError, MediaSource, PlaybackEngine, StreamDescriptor, SubtitleTrack};
pub use removal::{RemovalDialog, RemovalEntry};
pub use selection::SelectionOption;
pub use transfer::{TransferOrigin, TransferOutcome};
pub use vidshelf_api_models::VideoId;
