use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct ProgressBarProps {
    pub current_level: u32,
    pub completed: usize,
    pub total: u32,
}

fn percent(completed: usize, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (completed as f64 / total as f64 * 100.0).clamp(0.0, 100.0)
}

#[function_component]
pub fn ProgressBar(props: &ProgressBarProps) -> Html {
    let pct = percent(props.completed, props.total);
    let caption_style = "display:flex; justify-content:space-between; font-size:12px; opacity:0.7; margin-top:6px;";
    html! {
        <div style="background:rgba(22,27,34,0.9); border:1px solid #30363d; border-radius:12px; padding:14px 18px;">
            <div style="display:flex; justify-content:space-between; align-items:baseline; margin-bottom:8px;">
                <span style="font-weight:700; letter-spacing:0.04em;">{"Progress"}</span>
                <span style="font-variant-numeric:tabular-nums; color:#00d4ff;">
                    { format!("{} / {} Levels Completed", props.completed, props.total) }
                </span>
            </div>
            <div role="progressbar" aria-valuemin="0" aria-valuemax={props.total.to_string()} aria-valuenow={props.completed.to_string()}
                style="height:10px; border-radius:5px; background:#1c2128; overflow:hidden;">
                <div style={format!("height:100%; width:{pct:.1}%; background:linear-gradient(90deg, #00d4ff, #39ff14); transition:width 0.4s ease;")} />
            </div>
            <div style={caption_style}>
                <span>{"Level 1"}</span>
                <span>{ format!("Current: Level {}", props.current_level) }</span>
                <span>{ format!("Level {}", props.total) }</span>
            </div>
        </div>
    }
}
