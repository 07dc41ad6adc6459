//! Batch removal dialog.

use vidshelf_core::{RemovalEntry, VideoId};
use web_sys::HtmlInputElement;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub(crate) struct RemovalModalProps {
    /// Rows of the open dialog; `None` renders nothing.
    pub entries: Option<Vec<RemovalEntry>>,
    pub pending: bool,
    pub on_toggle: Callback<(VideoId, bool)>,
    pub on_confirm: Callback<()>,
    pub on_cancel: Callback<()>,
}

#[function_component(RemovalModal)]
pub(crate) fn removal_modal(props: &RemovalModalProps) -> Html {
    let Some(entries) = props.entries.as_ref() else {
        return html! {};
    };

    let on_confirm = {
        let on_confirm = props.on_confirm.clone();
        Callback::from(move |_| on_confirm.emit(()))
    };
    let on_cancel = {
        let on_cancel = props.on_cancel.clone();
        Callback::from(move |_| on_cancel.emit(()))
    };

    html! {
        <div class="modal modal-open" role="dialog" aria-modal="true">
            <div class="modal-box">
                <h3>{"Delete videos"}</h3>
                <ul class="removal-list">
                    {for entries.iter().map(|entry| render_entry(entry, &props.on_toggle))}
                </ul>
                <div class="modal-actions">
                    <button class="ghost" onclick={on_cancel.clone()}>{"Cancel"}</button>
                    <button class="danger" onclick={on_confirm} disabled={props.pending}>
                        {if props.pending { "Deleting..." } else { "Delete" }}
                    </button>
                </div>
            </div>
            <button class="modal-backdrop" aria-label="Close" onclick={on_cancel}></button>
        </div>
    }
}

fn render_entry(entry: &RemovalEntry, on_toggle: &Callback<(VideoId, bool)>) -> Html {
    let on_change = {
        let on_toggle = on_toggle.clone();
        let video = entry.video.clone();
        Callback::from(move |event: Event| {
            if let Some(input) = event.target_dyn_into::<HtmlInputElement>() {
                on_toggle.emit((video.clone(), input.checked()));
            }
        })
    };

    html! {
        <li>
            <label>
                <input type="checkbox" checked={entry.checked} onchange={on_change} />
                <span>{entry.video.as_str().to_string()}</span>
            </label>
        </li>
    }
}
