//! video.js binding through `js_sys::Reflect`.
//!
//! # Design
//! - The page loads video.js globally; the player is created lazily on first
//!   use, once the `<video>` element is in the DOM.
//! - Every call goes through reflection so a missing method surfaces as an
//!   [`EngineError`] naming that method instead of a JS exception.
//! - Track counting and draining walk `textTracks()`, which also holds tracks
//!   the stream or video.js created, not only the ones added here.
//! - Subtitle tracks are added with manual cleanup. `src()` discards every
//!   auto-cleaned track, and the track is attached before the source is set;
//!   the controller drains old tracks itself.

use std::cell::RefCell;

use gloo::console;
use js_sys::{Array, Function, Object, Promise, Reflect};
use vidshelf_core::{EngineError, MediaSource, PlaybackEngine, SubtitleTrack};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{JsFuture, spawn_local};

use crate::settings::{MANUAL_TRACK_CLEANUP, PLAYER_ELEMENT_ID};

/// Seconds jumped by the skip buttons.
const SKIP_SECONDS: f64 = 10.0;

pub(crate) struct VideoJsEngine {
    element_id: &'static str,
    player: RefCell<Option<JsValue>>,
}

impl VideoJsEngine {
    pub(crate) const fn new() -> Self {
        Self {
            element_id: PLAYER_ELEMENT_ID,
            player: RefCell::new(None),
        }
    }

    /// Create the player if it does not exist yet.
    pub(crate) fn ensure_player(&self) -> Result<JsValue, EngineError> {
        if let Some(player) = self.player.borrow().as_ref() {
            return Ok(player.clone());
        }
        let videojs = Reflect::get(&js_sys::global(), &JsValue::from_str("videojs"))
            .ok()
            .and_then(|value| value.dyn_into::<Function>().ok())
            .ok_or_else(|| EngineError::new("videojs", "video.js is not loaded"))?;
        let player = videojs
            .call2(
                &JsValue::NULL,
                &JsValue::from_str(self.element_id),
                &player_options()?,
            )
            .map_err(|err| EngineError::new("videojs", describe(&err)))?;
        *self.player.borrow_mut() = Some(player.clone());
        Ok(player)
    }

    fn call(&self, method: &'static str, args: &Array) -> Result<JsValue, EngineError> {
        let player = self.ensure_player()?;
        invoke(&player, method, args)
    }

    fn text_tracks(&self) -> Result<JsValue, EngineError> {
        self.call("textTracks", &Array::new())
    }
}

impl PlaybackEngine for VideoJsEngine {
    fn text_track_count(&self) -> Result<usize, EngineError> {
        let tracks = self.text_tracks()?;
        let length = Reflect::get(&tracks, &JsValue::from_str("length"))
            .ok()
            .and_then(|value| value.as_f64())
            .ok_or_else(|| EngineError::new("textTracks", "track list has no length"))?;
        // Track counts are small non-negative integers.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let count = length as usize;
        Ok(count)
    }

    fn remove_text_track(&self, index: usize) -> Result<(), EngineError> {
        let tracks = self.text_tracks()?;
        let index = u32::try_from(index)
            .map_err(|_| EngineError::new("removeRemoteTextTrack", "index out of range"))?;
        let track = Reflect::get_u32(&tracks, index)
            .map_err(|err| EngineError::new("removeRemoteTextTrack", describe(&err)))?;
        if track.is_undefined() {
            return Err(EngineError::new(
                "removeRemoteTextTrack",
                format!("no track at index {index}"),
            ));
        }
        self.call("removeRemoteTextTrack", &Array::of1(&track))
            .map(drop)
    }

    fn add_text_track(&self, track: &SubtitleTrack) -> Result<(), EngineError> {
        let options = Object::new();
        set(&options, "kind", &JsValue::from_str(track.kind))?;
        set(&options, "src", &JsValue::from_str(&track.src))?;
        set(&options, "srclang", &JsValue::from_str(track.srclang))?;
        set(&options, "label", &JsValue::from_str(track.label))?;
        set(&options, "default", &JsValue::from_bool(track.default))?;
        self.call(
            "addRemoteTextTrack",
            &Array::of2(&options, &JsValue::from_bool(MANUAL_TRACK_CLEANUP)),
        )
        .map(drop)
    }

    fn set_source(&self, source: &MediaSource) -> Result<(), EngineError> {
        let value = Object::new();
        set(&value, "src", &JsValue::from_str(&source.src))?;
        set(&value, "type", &JsValue::from_str(source.mime))?;
        self.call("src", &Array::of1(&value)).map(drop)
    }

    fn load(&self) -> Result<(), EngineError> {
        self.call("load", &Array::new()).map(drop)
    }

    fn play(&self) -> Result<(), EngineError> {
        let result = self.call("play", &Array::new())?;
        // Autoplay policies reject the promise asynchronously; report, do not fail.
        if let Ok(promise) = result.dyn_into::<Promise>() {
            spawn_local(async move {
                if let Err(err) = JsFuture::from(promise).await {
                    console::error!("playback was blocked", describe(&err));
                }
            });
        }
        Ok(())
    }
}

fn player_options() -> Result<JsValue, EngineError> {
    let skip = Object::new();
    set(&skip, "forward", &JsValue::from_f64(SKIP_SECONDS))?;
    set(&skip, "backward", &JsValue::from_f64(SKIP_SECONDS))?;
    let control_bar = Object::new();
    set(&control_bar, "skipButtons", &skip)?;

    let user_actions = Object::new();
    set(&user_actions, "hotkeys", &JsValue::TRUE)?;
    set(&user_actions, "doubleClick", &JsValue::TRUE)?;
    set(&user_actions, "click", &JsValue::TRUE)?;

    let options = Object::new();
    set(&options, "controls", &JsValue::TRUE)?;
    set(&options, "preload", &JsValue::from_str("auto"))?;
    set(&options, "controlBar", &control_bar)?;
    set(&options, "userActions", &user_actions)?;
    Ok(options.into())
}

fn invoke(target: &JsValue, method: &'static str, args: &Array) -> Result<JsValue, EngineError> {
    let function = Reflect::get(target, &JsValue::from_str(method))
        .ok()
        .and_then(|value| value.dyn_into::<Function>().ok())
        .ok_or_else(|| EngineError::new(method, "method unavailable"))?;
    Reflect::apply(&function, target, args).map_err(|err| EngineError::new(method, describe(&err)))
}

fn set(target: &Object, key: &str, value: &JsValue) -> Result<(), EngineError> {
    Reflect::set(target, &JsValue::from_str(key), value)
        .map(drop)
        .map_err(|err| EngineError::new("options", describe(&err)))
}

fn describe(err: &JsValue) -> String {
    err.dyn_ref::<js_sys::Error>()
        .map(|error| String::from(error.message()))
        .or_else(|| err.as_string())
        .unwrap_or_else(|| format!("{err:?}"))
}
