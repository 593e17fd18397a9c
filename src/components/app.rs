use std::cell::RefCell;
use std::rc::Rc;
use tracing::{info, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use yew::prelude::*;

use super::{
    about_modal::AboutModal, controls_panel::ControlsPanel, guide_panel::GuidePanel,
    level_map::LevelMap, progress_bar::ProgressBar,
};
use crate::commands::Command;
use crate::config::{MapConfig, Settings, load_catalogue};
use crate::model::build_levels;
use crate::persistence::{ProgressStore, browser_store};
use crate::state::{MapAction, MapState};
use crate::util::now_ms;

fn run_command(cmd: Command, dispatcher: &UseReducerDispatcher<MapState>) {
    let action = match cmd {
        Command::Advance => MapAction::Advance { now: now_ms() },
        Command::Reset => MapAction::Reset,
        Command::ToggleInfo => MapAction::ToggleAbout,
        Command::ToggleMute => MapAction::ToggleMute,
    };
    dispatcher.dispatch(action);
}

fn navigate(url: &str) {
    let Some(win) = web_sys::window() else { return };
    if let Err(e) = win.location().set_href(url) {
        warn!(url, error = ?e, "navigation failed");
    }
}

#[function_component(App)]
pub fn app() -> Html {
    let config = use_memo((), |_| MapConfig::default());
    let store = {
        let keys = config.keys.clone();
        use_memo((), move |_| ProgressStore::new(browser_store(), keys))
    };
    let map = {
        let config = config.clone();
        let store = store.clone();
        use_reducer(move || {
            let levels = build_levels(&load_catalogue());
            let progress = store.load(levels.len() as u32);
            let settings = Settings::load(store.inner(), &config.keys);
            info!(
                levels = levels.len(),
                current = progress.current_level_id,
                "progress restored"
            );
            MapState::new(levels, &config, progress, settings.muted)
        })
    };
    let total = map.progression.total();

    // Apply whatever storage write the last state change owes
    {
        let store = store.clone();
        let dispatcher = map.dispatcher();
        use_effect_with(map.persist.clone(), move |intent| {
            if let Some(intent) = intent {
                if let Err(e) = intent.apply(&*store, total) {
                    warn!(error = %e, ?intent, "could not persist progress");
                }
                dispatcher.dispatch(MapAction::PersistDone);
            }
            || ()
        });
    }
    // Persist mute toggle
    {
        let store = store.clone();
        let config = config.clone();
        use_effect_with(map.muted, move |muted| {
            let settings = Settings { muted: *muted };
            if let Err(e) = settings.save_if_changed(store.inner(), &config.keys) {
                warn!(error = %e, "could not save settings");
            }
            || ()
        });
    }
    // Sound cues are consumed here; playback belongs to the host page
    {
        let dispatcher = map.dispatcher();
        use_effect_with(map.sound_cue, move |cue| {
            if let Some(cue) = cue {
                info!(?cue, "sound cue");
                dispatcher.dispatch(MapAction::ClearSoundCue);
            }
            || ()
        });
    }
    // Frame loop + hotkeys
    {
        let dispatcher = map.dispatcher();
        use_effect_with((), move |_| {
            let window = web_sys::window().expect("window");
            let raf_id = Rc::new(RefCell::new(None));
            let closure_cell: Rc<RefCell<Option<Closure<dyn FnMut()>>>> =
                Rc::new(RefCell::new(None));
            {
                let raf_id_clone = raf_id.clone();
                let closure_cell_clone = closure_cell.clone();
                let window_loop = window.clone();
                let dispatcher = dispatcher.clone();
                *closure_cell.borrow_mut() = Some(Closure::wrap(Box::new(move || {
                    dispatcher.dispatch(MapAction::Tick { now: now_ms() });
                    if let Some(cb) = closure_cell_clone.borrow().as_ref() {
                        if let Ok(id) =
                            window_loop.request_animation_frame(cb.as_ref().unchecked_ref())
                        {
                            *raf_id_clone.borrow_mut() = Some(id);
                        }
                    }
                }) as Box<dyn FnMut()>));
                if let Some(cb) = closure_cell.borrow().as_ref() {
                    if let Ok(id) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                        *raf_id.borrow_mut() = Some(id);
                    }
                }
            }

            let keydown_cb = {
                let dispatcher = dispatcher.clone();
                Closure::wrap(Box::new(move |e: web_sys::KeyboardEvent| {
                    let modified = e.ctrl_key() || e.alt_key() || e.meta_key();
                    if let Some(cmd) = Command::from_key(&e.key(), modified) {
                        e.prevent_default();
                        run_command(cmd, &dispatcher);
                    }
                }) as Box<dyn FnMut(_)>)
            };
            window
                .add_event_listener_with_callback("keydown", keydown_cb.as_ref().unchecked_ref())
                .ok();

            let window_clone = window.clone();
            move || {
                let _ = window_clone.remove_event_listener_with_callback(
                    "keydown",
                    keydown_cb.as_ref().unchecked_ref(),
                );
                if let Some(id) = *raf_id.borrow() {
                    let _ = window_clone.cancel_animation_frame(id);
                }
                // breaks the closure's self-reference
                closure_cell.borrow_mut().take();
            }
        });
    }

    let command_cb = |cmd: Command| -> Callback<()> {
        let dispatcher = map.dispatcher();
        Callback::from(move |()| run_command(cmd, &dispatcher))
    };
    let on_select = {
        let map = map.clone();
        let config = config.clone();
        Callback::from(move |id: u32| {
            if let Some(id) = map.progression.select_level(id) {
                navigate(&config.level_url(id));
            }
        })
    };
    let close_about = {
        let dispatcher = map.dispatcher();
        Callback::from(move |()| dispatcher.dispatch(MapAction::SetAbout(false)))
    };
    let dismiss_guide = {
        let dispatcher = map.dispatcher();
        Callback::from(move |()| dispatcher.dispatch(MapAction::DismissGuide))
    };

    let guide_level = map.guide.and_then(|g| map.level(g.level_id).cloned());
    let mute_label = if map.muted { "🔇" } else { "🔊" };
    let mute_title = if map.muted {
        "Unmute sounds (M)"
    } else {
        "Mute sounds (M)"
    };
    let header_btn = "padding:10px 12px; border-radius:12px; border:2px solid #00d4ff; background:rgba(0,212,255,0.1); color:#fff; cursor:pointer;";

    html! {
        <div id="root" style="min-height:100vh; padding:16px; color:#fff; background:#0b0f1a; box-sizing:border-box;">
            <div style="max-width:1150px; margin:0 auto;">
                <div id="top-bar" style="display:flex; justify-content:flex-end; gap:12px; margin-bottom:24px;">
                    <button style={header_btn} title={mute_title} aria-label={mute_title} onclick={command_cb(Command::ToggleMute).reform(|_: MouseEvent| ())}>{ mute_label }</button>
                    <button style={header_btn} title="About (A)" aria-label="Open About (A)" onclick={command_cb(Command::ToggleInfo).reform(|_: MouseEvent| ())}>{"ℹ"}</button>
                </div>
                <ProgressBar
                    current_level={map.progression.current_level_id().min(total.max(1))}
                    completed={map.progression.completed().len()}
                    total={total}
                />
                <LevelMap map={map.clone()} on_select={on_select} />
                <ControlsPanel
                    advance_label={map.advance_label()}
                    can_advance={map.can_advance()}
                    all_complete={map.progression.is_all_complete()}
                    on_advance={command_cb(Command::Advance)}
                    on_reset={command_cb(Command::Reset)}
                />
                <AboutModal show={map.show_about} on_close={close_about} />
                <GuidePanel level={guide_level} on_dismiss={dismiss_guide} />
            </div>
        </div>
    }
}
