use yew::prelude::*;

#[function_component]
pub fn CompletionBanner() -> Html {
    html! {
        <div role="status" style="background:rgba(0,0,0,0.85); border:2px solid #39ff14; padding:18px 32px; border-radius:12px; text-align:center; min-width:320px; box-shadow:0 0 24px rgba(57,255,20,0.35);">
            <h2 style="margin:0 0 8px 0; color:#39ff14;">{"All Complete!"}</h2>
            <p style="margin:4px 0; opacity:0.85;">{"Every level on the map is finished. Press Reset to start the journey again."}</p>
        </div>
    }
}
