//! Browser implementations of the controller boundaries.

pub(crate) mod api;
pub(crate) mod notice;
pub(crate) mod player;
