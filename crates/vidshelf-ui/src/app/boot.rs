//! Page environment lookups for the app shell.

use gloo::console;
use gloo::utils::{document, window};
use vidshelf_core::ClientConfig;
use wasm_bindgen::JsCast;
use web_sys::HtmlMetaElement;

use crate::settings::{API_META_NAME, client_config};

/// Controller configuration for this page; same-origin on a bad override.
pub(crate) fn page_config() -> ClientConfig {
    let origin = window().location().origin().unwrap_or_default();
    let meta = api_meta_override();
    match client_config(&origin, meta.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            console::error!("invalid api base url; using same origin", err.to_string());
            ClientConfig::default()
        }
    }
}

fn api_meta_override() -> Option<String> {
    document()
        .query_selector(&format!("meta[name=\"{API_META_NAME}\"]"))
        .ok()
        .flatten()
        .and_then(|element| element.dyn_into::<HtmlMetaElement>().ok())
        .map(|meta| meta.content())
}
