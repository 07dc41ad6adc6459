use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub(crate) struct NoticeBannerProps {
    pub message: Option<String>,
    pub on_dismiss: Callback<()>,
}

/// Status banner; clicking it takes the notice down early.
#[function_component(NoticeBanner)]
pub(crate) fn notice_banner(props: &NoticeBannerProps) -> Html {
    let class = classes!("notification", props.message.is_some().then_some("show"));
    let onclick = props.on_dismiss.reform(|_: MouseEvent| ());
    html! {
        <div
            id="notification"
            class={class}
            role="status"
            aria-live="polite"
            aria-atomic="true"
            {onclick}
        >
            {props.message.clone().unwrap_or_default()}
        </div>
    }
}
