//! Environment-derived settings for the browser shell.
//!
//! # Design
//! - Pure functions over strings read from the page, so they run natively in tests.
//! - A `<meta name="vidshelf-api" content="...">` tag overrides the page origin.

use std::time::Duration;

use vidshelf_core::{ClientConfig, ConfigError};

/// `name` of the meta tag overriding the backend origin.
pub const API_META_NAME: &str = "vidshelf-api";
/// Element id the app mounts into when present.
pub const ROOT_ELEMENT_ID: &str = "root";
/// Element id of the `<video>` element bound to the player.
pub const PLAYER_ELEMENT_ID: &str = "video-player";
/// `manualCleanup` flag passed when attaching a subtitle track. Must stay set:
/// video.js drops auto-cleaned tracks on the next `src()` call.
pub const MANUAL_TRACK_CLEANUP: bool = true;

/// Backend origin: a non-blank meta override wins over the page origin.
#[must_use]
pub fn api_base_from(origin: &str, meta: Option<&str>) -> String {
    meta.map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(origin)
        .trim_end_matches('/')
        .to_string()
}

/// Validated controller configuration for the page.
///
/// # Errors
///
/// Returns an error when the resolved origin is not a usable base URL.
pub fn client_config(origin: &str, meta: Option<&str>) -> Result<ClientConfig, ConfigError> {
    ClientConfig::default()
        .with_api_base_url(api_base_from(origin, meta))
        .validate()
}

/// Milliseconds for browser timers, saturating at `u32::MAX`.
#[must_use]
pub fn timer_millis(duration: Duration) -> u32 {
    u32::try_from(duration.as_millis()).unwrap_or(u32::MAX)
}
