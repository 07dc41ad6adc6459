//! App shell: owns the controller and wires DOM events to it.
//!
//! # Design
//! - The controller holds all library state; the component only keeps a redraw
//!   counter bumped whenever a notice changes or an operation settles.
//! - Every async action runs on `spawn_local` and reports non-local failures to
//!   the console; user-facing feedback comes from the notifier.
//! - Controls are disabled while their affordance is pending.

use std::rc::Rc;

use gloo::console;
use vidshelf_core::{
    Affordance, AffordanceState, ControllerResult, LibraryController, TransferOrigin, VideoId,
};
use wasm_bindgen_futures::spawn_local;
use web_sys::File;
use yew::prelude::*;

use crate::components::drop_zone::DropZone;
use crate::components::notice::NoticeBanner;
use crate::components::picker::VideoPicker;
use crate::components::removal_modal::RemovalModal;
use crate::services::api::{ApiClient, BrowserFile};
use crate::services::notice::ToastSurface;
use crate::services::player::VideoJsEngine;
use crate::settings::{PLAYER_ELEMENT_ID, ROOT_ELEMENT_ID};

mod boot;

type Controller = LibraryController<ApiClient, VideoJsEngine>;

#[derive(Default, PartialEq)]
struct Redraw(u64);

impl Reducible for Redraw {
    type Action = ();

    fn reduce(self: Rc<Self>, (): ()) -> Rc<Self> {
        Rc::new(Self(self.0.wrapping_add(1)))
    }
}

fn build_controller(redraw: UseReducerDispatcher<Redraw>) -> Controller {
    let config = boot::page_config();
    let backend = ApiClient::new(config.clone());
    let surface = ToastSurface::new(Callback::from(move |()| redraw.dispatch(())));
    LibraryController::new(config, backend, VideoJsEngine::new(), Rc::new(surface))
}

fn report<T>(action: &str, result: &ControllerResult<T>) {
    if let Err(err) = result
        && !err.is_local()
    {
        console::error!("library action failed", action.to_string(), err.to_string());
    }
}

fn is_pending(controller: &Controller, affordance: Affordance) -> bool {
    controller.affordance_state(affordance) == AffordanceState::Pending
}

#[function_component(VidshelfApp)]
fn vidshelf_app() -> Html {
    let redraw = use_reducer(Redraw::default);
    let dispatcher = redraw.dispatcher();
    let controller: Rc<Controller> = {
        let dispatcher = dispatcher.clone();
        use_memo(move |_| build_controller(dispatcher), ())
    };

    {
        let controller = controller.clone();
        let dispatcher = dispatcher.clone();
        use_effect_with_deps(
            move |_| {
                if let Err(err) = controller.engine().ensure_player() {
                    console::error!("player unavailable", err.to_string());
                }
                spawn_local(async move {
                    report("start", &controller.start().await);
                    dispatcher.dispatch(());
                });
                || ()
            },
            (),
        );
    }

    let on_select = {
        let controller = controller.clone();
        let dispatcher = dispatcher.clone();
        Callback::from(move |value: String| {
            controller.select_value(&value);
            dispatcher.dispatch(());
        })
    };

    let on_load = {
        let controller = controller.clone();
        let dispatcher = dispatcher.clone();
        Callback::from(move |()| {
            let controller = controller.clone();
            let dispatcher = dispatcher.clone();
            spawn_local(async move {
                report("load", &controller.load_selected().await);
                dispatcher.dispatch(());
            });
        })
    };

    let on_drag = {
        let controller = controller.clone();
        let dispatcher = dispatcher.clone();
        Callback::from(move |active: bool| {
            if active {
                controller.drag_enter();
            } else {
                controller.drag_leave();
            }
            dispatcher.dispatch(());
        })
    };

    let on_file = {
        let controller = controller.clone();
        let dispatcher = dispatcher.clone();
        Callback::from(move |(origin, file): (TransferOrigin, Option<File>)| {
            let controller = controller.clone();
            let dispatcher = dispatcher.clone();
            spawn_local(async move {
                let result = controller.upload(origin, file.map(BrowserFile)).await;
                report("upload", &result);
                dispatcher.dispatch(());
            });
        })
    };

    let on_open_removal = {
        let controller = controller.clone();
        let dispatcher = dispatcher.clone();
        Callback::from(move |_: MouseEvent| {
            let controller = controller.clone();
            let dispatcher = dispatcher.clone();
            spawn_local(async move {
                report("open removal", &controller.open_removal().await);
                dispatcher.dispatch(());
            });
        })
    };

    let on_toggle = {
        let controller = controller.clone();
        let dispatcher = dispatcher.clone();
        Callback::from(move |(video, checked): (VideoId, bool)| {
            controller.toggle_removal(&video, checked);
            dispatcher.dispatch(());
        })
    };

    let on_confirm = {
        let controller = controller.clone();
        let dispatcher = dispatcher.clone();
        Callback::from(move |()| {
            let controller = controller.clone();
            let dispatcher = dispatcher.clone();
            spawn_local(async move {
                report("delete", &controller.confirm_removal().await);
                dispatcher.dispatch(());
            });
        })
    };

    let on_cancel = {
        let controller = controller.clone();
        let dispatcher = dispatcher.clone();
        Callback::from(move |()| {
            controller.cancel_removal();
            dispatcher.dispatch(());
        })
    };

    let on_dismiss = {
        let controller = controller.clone();
        Callback::from(move |()| {
            controller.dismiss_notice();
        })
    };

    let removal_entries = controller.removal_dialog().map(|dialog| dialog.entries());
    let notice = controller.notice().map(|notice| notice.message);

    html! {
        <main class="vidshelf">
            <section class="player">
                <video id={PLAYER_ELEMENT_ID} class="video-js vjs-default-skin"></video>
                <VideoPicker
                    options={controller.selection_options()}
                    pending={is_pending(&controller, Affordance::Load)}
                    on_select={on_select}
                    on_load={on_load}
                />
            </section>
            <section class="library">
                <DropZone
                    drag_active={controller.drag_active()}
                    pending={is_pending(&controller, Affordance::Upload)}
                    accept={controller.config().accepted_extension.clone()}
                    on_drag={on_drag}
                    on_file={on_file}
                />
                <button
                    class="danger"
                    onclick={on_open_removal}
                    disabled={is_pending(&controller, Affordance::OpenRemoval)
                        || is_pending(&controller, Affordance::ConfirmRemoval)}
                >
                    {"Delete videos"}
                </button>
            </section>
            <RemovalModal
                entries={removal_entries}
                pending={is_pending(&controller, Affordance::ConfirmRemoval)}
                on_toggle={on_toggle}
                on_confirm={on_confirm}
                on_cancel={on_cancel}
            />
            <NoticeBanner message={notice} on_dismiss={on_dismiss} />
        </main>
    }
}

/// Mount the app into `#root`, or the document body when it is absent.
pub fn run_app() {
    console_error_panic_hook::set_once();
    if let Some(root) = gloo::utils::document().get_element_by_id(ROOT_ELEMENT_ID) {
        yew::Renderer::<VidshelfApp>::with_root(root).render();
    } else {
        yew::Renderer::<VidshelfApp>::new().render();
    }
}
