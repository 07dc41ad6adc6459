//! Client configuration shared by the browser and native front-ends.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default root under which per-video subtitle folders live.
pub const DEFAULT_SUBTITLE_ROOT: &str = "/static/assets/videos/hls";
/// Default accepted upload extension.
pub const DEFAULT_ACCEPTED_EXTENSION: &str = ".mkv";

/// Controller configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Backend origin, or empty for same-origin requests.
    pub api_base_url: String,
    /// Root of the subtitle asset layout.
    pub subtitle_root: String,
    /// Extension every uploaded file name must end with.
    pub accepted_extension: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: String::new(),
            subtitle_root: DEFAULT_SUBTITLE_ROOT.to_string(),
            accepted_extension: DEFAULT_ACCEPTED_EXTENSION.to_string(),
        }
    }
}

/// Configuration rejected by [`ClientConfig::validate`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Extension is empty or does not start with a dot.
    #[error("accepted extension '{0}' must start with '.' and name a suffix")]
    InvalidExtension(String),
    /// Base URL is neither empty, absolute http(s), nor a root-relative path.
    #[error("api base url '{0}' must be empty, root-relative or http(s)")]
    InvalidBaseUrl(String),
}

impl ClientConfig {
    /// Replace the backend origin.
    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Replace the subtitle root.
    #[must_use]
    pub fn with_subtitle_root(mut self, root: impl Into<String>) -> Self {
        self.subtitle_root = root.into();
        self
    }

    /// Normalise and check the configuration.
    ///
    /// Trailing slashes are trimmed from the base URL and the subtitle root;
    /// the extension is lower-cased.
    ///
    /// # Errors
    ///
    /// Returns an error when the extension or the base URL is malformed.
    pub fn validate(mut self) -> Result<Self, ConfigError> {
        let extension = self.accepted_extension.trim().to_lowercase();
        if extension.len() < 2 || !extension.starts_with('.') {
            return Err(ConfigError::InvalidExtension(self.accepted_extension));
        }
        self.accepted_extension = extension;

        let base = self.api_base_url.trim().trim_end_matches('/').to_string();
        let valid_base = base.is_empty()
            || base.starts_with('/')
            || base.starts_with("http://")
            || base.starts_with("https://");
        if !valid_base {
            return Err(ConfigError::InvalidBaseUrl(self.api_base_url));
        }
        self.api_base_url = base;

        let root = self.subtitle_root.trim();
        self.subtitle_root = if root == "/" {
            String::new()
        } else {
            root.trim_end_matches('/').to_string()
        };
        Ok(self)
    }

    /// Full URL for an API path.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.api_base_url)
    }
}
