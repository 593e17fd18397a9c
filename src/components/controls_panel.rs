use yew::prelude::*;

use super::completion_banner::CompletionBanner;

#[derive(Properties, PartialEq, Clone)]
pub struct ControlsPanelProps {
    pub advance_label: &'static str,
    pub can_advance: bool,
    pub all_complete: bool,
    pub on_advance: Callback<()>,
    pub on_reset: Callback<()>,
}

#[function_component]
pub fn ControlsPanel(props: &ControlsPanelProps) -> Html {
    let advance_cb = {
        let cb = props.on_advance.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let reset_cb = {
        let cb = props.on_reset.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let btn = "padding:12px 28px; border-radius:12px; font-size:16px; font-weight:700; cursor:pointer;";
    html! {
        <div style="display:flex; flex-direction:column; align-items:center; gap:12px; margin-top:8px;">
            if props.all_complete {
                <CompletionBanner />
            }
            <div style="display:flex; gap:16px; justify-content:center;">
                <button
                    style={format!("{btn} border:2px solid #39ff14; background:rgba(57,255,20,0.12); color:#39ff14; opacity:{};", if props.can_advance { 1.0 } else { 0.5 })}
                    disabled={!props.can_advance}
                    title="Complete the current level (N)"
                    onclick={advance_cb}
                >{ props.advance_label }</button>
                <button
                    style={format!("{btn} border:2px solid #ff6b35; background:rgba(255,107,53,0.12); color:#ff6b35;")}
                    title="Reset all progress (R)"
                    onclick={reset_cb}
                >{"Reset"}</button>
            </div>
            <div style="font-size:11px; opacity:0.6;">{"Hotkeys: N next · R reset · A about · M mute"}</div>
        </div>
    }
}
