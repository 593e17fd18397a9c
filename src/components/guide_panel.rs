use yew::prelude::*;

use crate::model::Level;

#[derive(Properties, PartialEq, Clone)]
pub struct GuidePanelProps {
    /// Level the marker is travelling to, if any.
    pub level: Option<Level>,
    pub on_dismiss: Callback<()>,
}

#[function_component]
pub fn GuidePanel(props: &GuidePanelProps) -> Html {
    let Some(level) = &props.level else {
        return html! {};
    };
    let dismiss_cb = {
        let cb = props.on_dismiss.clone();
        Callback::from(move |_| cb.emit(()))
    };
    html! {
        <div role="status" style={format!("position:fixed; bottom:24px; right:24px; max-width:300px; background:rgba(22,27,34,0.95); border:1px solid {}; border-radius:12px; padding:12px 16px; font-size:13px; z-index:40;", level.color)}>
            <div style="display:flex; justify-content:space-between; align-items:center; gap:12px; margin-bottom:6px;">
                <strong>{ format!("Up next: Level {}", level.id) }</strong>
                <button onclick={dismiss_cb} aria-label="Dismiss" style="padding:0 6px;">{"×"}</button>
            </div>
            <div style="opacity:0.9;">{ format!("{} · {}", level.topic, level.difficulty.label()) }</div>
            if !level.description.is_empty() {
                <div style="opacity:0.75; margin-top:4px; line-height:1.35;">{ level.description.clone() }</div>
            }
        </div>
    }
}
