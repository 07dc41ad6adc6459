//! Presentational components; side effects stay in the app shell.

pub(crate) mod drop_zone;
pub(crate) mod notice;
pub(crate) mod picker;
pub(crate) mod removal_modal;
