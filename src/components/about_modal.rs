use yew::prelude::*;

use crate::commands::Command;

#[derive(Properties, PartialEq, Clone)]
pub struct AboutModalProps {
    pub show: bool,
    pub on_close: Callback<()>,
}

#[function_component]
pub fn AboutModal(props: &AboutModalProps) -> Html {
    if !props.show {
        return html! {};
    }
    let close_cb = {
        let cb = props.on_close.clone();
        Callback::from(move |_| cb.emit(()))
    };
    // clicks inside the dialog must not reach the backdrop
    let swallow = Callback::from(|e: MouseEvent| e.stop_propagation());
    let hotkeys = [
        (Command::Advance, "Complete the current level and travel to the next"),
        (Command::Reset, "Wipe all saved progress"),
        (Command::ToggleInfo, "Open or close this panel"),
        (Command::ToggleMute, "Mute or unmute sound cues"),
    ];

    html! {<div onclick={close_cb.clone()} style="position:fixed; inset:0; display:flex; align-items:center; justify-content:center; background:rgba(0,0,0,0.6); z-index:50;">
        <div role="dialog" aria-modal="true" aria-label="About" onclick={swallow}
            style="background:rgba(0,0,0,0.9); border:2px solid #00d4ff; padding:28px 36px; border-radius:14px; max-width:520px; width:90%; box-shadow:0 6px 18px rgba(0,0,0,0.6); font-size:14px; line-height:1.4;">
            <h2 style="margin:0 0 12px 0; font-size:22px; color:#00d4ff; text-align:center;">{"Level Map"}</h2>
            <p style="margin:4px 0 10px 0; text-align:center; opacity:0.85;">
                {"Work through the training levels in order. Each finished level unlocks the next one along the path."}
            </p>
            <ul style="margin:0 0 12px 18px; padding:0; list-style:disc; display:flex; flex-direction:column; gap:4px;">
                <li>{"Click an unlocked level to open it. Locked levels cannot be opened."}</li>
                <li>{"Green levels are finished, orange is where you are, blue is open to replay."}</li>
                <li>{"Progress is saved in this browser and restored on your next visit."}</li>
            </ul>
            <table style="width:100%; border-collapse:collapse; font-size:13px;">
                { for hotkeys.iter().map(|(cmd, what)| html! {
                    <tr>
                        <td style="padding:3px 8px 3px 0; width:32px;">
                            <kbd style="border:1px solid #30363d; border-radius:4px; padding:1px 6px; background:#161b22;">{ cmd.hotkey().to_string() }</kbd>
                        </td>
                        <td style="padding:3px 0; opacity:0.85;">{ *what }</td>
                    </tr>
                }) }
            </table>
            <div style="display:flex; justify-content:center; margin-top:16px;">
                <button onclick={close_cb}>{"Close"}</button>
            </div>
        </div>
    </div>}
}
