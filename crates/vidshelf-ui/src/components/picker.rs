//! Video picker and load button.
//!
//! Changing the selection only reports the new value; playback starts from
//! the load button alone.

use vidshelf_core::SelectionOption;
use web_sys::HtmlSelectElement;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub(crate) struct VideoPickerProps {
    pub options: Vec<SelectionOption>,
    pub pending: bool,
    pub on_select: Callback<String>,
    pub on_load: Callback<()>,
}

#[function_component(VideoPicker)]
pub(crate) fn video_picker(props: &VideoPickerProps) -> Html {
    let on_change = {
        let on_select = props.on_select.clone();
        Callback::from(move |event: Event| {
            if let Some(select) = event.target_dyn_into::<HtmlSelectElement>() {
                on_select.emit(select.value());
            }
        })
    };
    let on_load = {
        let on_load = props.on_load.clone();
        Callback::from(move |_| on_load.emit(()))
    };

    html! {
        <div class="picker">
            <select id="video-select" aria-label="Video" onchange={on_change}>
                {for props.options.iter().map(|option| html! {
                    <option value={option.value.clone()} selected={option.selected}>
                        {option.label.clone()}
                    </option>
                })}
            </select>
            <button class="solid" onclick={on_load} disabled={props.pending}>
                {if props.pending { "Loading..." } else { "Load" }}
            </button>
        </div>
    }
}
