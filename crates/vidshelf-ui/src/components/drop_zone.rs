//! Drop target with a hidden file input.
//!
//! # Design
//! - `dragover` and `drop` suppress the browser default so a dropped file is
//!   never opened as a page.
//! - Both paths hand the first file (or none) to the same callback; the
//!   extension check lives in the controller.

use vidshelf_core::TransferOrigin;
use wasm_bindgen::JsCast;
use web_sys::{DragEvent, Event, File, HtmlInputElement};
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub(crate) struct DropZoneProps {
    pub drag_active: bool,
    pub pending: bool,
    pub accept: String,
    pub on_drag: Callback<bool>,
    pub on_file: Callback<(TransferOrigin, Option<File>)>,
}

#[function_component(DropZone)]
pub(crate) fn drop_zone(props: &DropZoneProps) -> Html {
    let file_input = use_node_ref();

    let on_drop = {
        let on_file = props.on_file.clone();
        Callback::from(move |event: DragEvent| {
            event.prevent_default();
            let file = event
                .data_transfer()
                .and_then(|transfer| transfer.files())
                .and_then(|files| files.get(0));
            on_file.emit((TransferOrigin::Drop, file));
        })
    };

    let on_drag_over = {
        let on_drag = props.on_drag.clone();
        let active = props.drag_active;
        Callback::from(move |event: DragEvent| {
            event.prevent_default();
            if !active {
                on_drag.emit(true);
            }
        })
    };

    let on_drag_leave = {
        let on_drag = props.on_drag.clone();
        Callback::from(move |_event: DragEvent| on_drag.emit(false))
    };

    let on_pick_file = {
        let file_input = file_input.clone();
        let pending = props.pending;
        Callback::from(move |_| {
            if pending {
                return;
            }
            if let Some(input) = file_input.cast::<HtmlInputElement>() {
                input.click();
            }
        })
    };

    let on_file_change = {
        let on_file = props.on_file.clone();
        Callback::from(move |event: Event| {
            let Some(input) = event
                .target()
                .and_then(|node| node.dyn_into::<HtmlInputElement>().ok())
            else {
                return;
            };
            let file = input.files().and_then(|files| files.get(0));
            // Allow picking the same file again.
            input.set_value("");
            on_file.emit((TransferOrigin::Browse, file));
        })
    };

    html! {
        <>
        <input
            ref={file_input}
            class="file-input-hidden"
            type="file"
            accept={props.accept.clone()}
            onchange={on_file_change}
        />
        <div
            id="drop-zone"
            class={classes!("drop-zone", props.drag_active.then_some("drag-over"), props.pending.then_some("busy"))}
            role="button"
            aria-label="Upload a video"
            onclick={on_pick_file}
            ondrop={on_drop}
            ondragover={on_drag_over}
            ondragleave={on_drag_leave}
        >
            <p><strong>{if props.pending { "Uploading..." } else { "Drop an MKV file here" }}</strong></p>
            <p class="muted">{"or click to browse"}</p>
        </div>
        </>
    }
}
