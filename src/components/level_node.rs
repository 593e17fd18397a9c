use yew::prelude::*;

use crate::model::{Level, LevelStatus};

#[derive(Properties, PartialEq, Clone)]
pub struct LevelNodeProps {
    pub level: Level,
    pub status: LevelStatus,
    pub flashing: bool,
    pub on_select: Callback<u32>,
    pub on_hover: Callback<Option<u32>>,
}

fn status_color(status: LevelStatus) -> &'static str {
    match status {
        LevelStatus::Completed => "#39ff14",
        LevelStatus::Current => "#ff6b35",
        LevelStatus::Unlocked => "#00d4ff",
        LevelStatus::Locked => "#666666",
    }
}

/// Icon shown inside the node; locked levels and levels without an icon show text.
fn icon_src(level: &Level, status: LevelStatus) -> Option<&str> {
    if status == LevelStatus::Locked || level.icon.trim().is_empty() {
        None
    } else {
        Some(level.icon.as_str())
    }
}

#[function_component]
pub fn LevelNode(props: &LevelNodeProps) -> Html {
    let level = &props.level;
    let clickable = props.status.is_clickable();
    let color = status_color(props.status);

    let onclick = {
        let cb = props.on_select.clone();
        let id = level.id;
        Callback::from(move |_| {
            if clickable {
                cb.emit(id)
            }
        })
    };
    let onmouseenter = {
        let cb = props.on_hover.clone();
        let id = level.id;
        Callback::from(move |_| cb.emit(Some(id)))
    };
    let onmouseleave = {
        let cb = props.on_hover.clone();
        Callback::from(move |_| cb.emit(None))
    };

    let glow = match (props.status, props.flashing) {
        (_, true) => format!("0 0 28px {color}, 0 0 56px {color}"),
        (LevelStatus::Current, _) => format!("0 0 22px {color}"),
        (LevelStatus::Locked, _) => "none".to_string(),
        _ => format!("0 0 12px {color}"),
    };
    let scale = if props.flashing { 1.2 } else { 1.0 };
    let hex_style = format!(
        "width:64px; height:64px; clip-path:polygon(25% 5%, 75% 5%, 100% 50%, 75% 95%, 25% 95%, 0% 50%); background:{color}; display:flex; align-items:center; justify-content:center; position:relative; box-shadow:{glow}; transform:scale({scale}); transition:transform 0.3s ease, box-shadow 0.3s ease; opacity:{};",
        if props.status == LevelStatus::Locked { 0.55 } else { 1.0 }
    );
    let label = if props.status == LevelStatus::Locked {
        "🔒".to_string()
    } else {
        level.id.to_string()
    };
    let stars = "★".repeat(usize::from(level.star_rating));
    let glyph = match icon_src(level, props.status) {
        Some(src) => html! {
            <>
                <img src={src.to_string()} alt={level.topic.clone()} style="width:34px; height:34px; object-fit:contain;" />
                <span style="position:absolute; bottom:6px; font-weight:800; font-size:11px; color:#0a0a0a;">{ label }</span>
            </>
        },
        None => html! {
            <span style="font-weight:800; font-size:20px; color:#0a0a0a;">{ label }</span>
        },
    };
    let cursor = if clickable { "pointer" } else { "not-allowed" };
    let aria = format!(
        "Level {}: {} ({})",
        level.id,
        level.topic,
        props.status.label()
    );

    html! {
        <div
            role="button"
            aria-label={aria}
            aria-disabled={(!clickable).to_string()}
            style={format!("position:absolute; left:{}%; top:{}%; transform:translate(-50%, -50%); display:flex; flex-direction:column; align-items:center; gap:4px; cursor:{cursor}; z-index:10;", level.position.x, level.position.y)}
            {onclick}
            {onmouseenter}
            {onmouseleave}
        >
            <div style={hex_style}>{ glyph }</div>
            <span style={format!("font-size:12px; font-weight:600; color:{color}; text-shadow:0 0 6px rgba(0,0,0,0.8); white-space:nowrap;")}>
                { level.short_topic() }
            </span>
            if props.status == LevelStatus::Completed {
                <span style="font-size:12px; color:#ffd700; letter-spacing:1px;">{ stars }</span>
            }
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_status_has_its_own_color() {
        let all = [
            LevelStatus::Locked,
            LevelStatus::Unlocked,
            LevelStatus::Current,
            LevelStatus::Completed,
        ];
        let colors: std::collections::BTreeSet<_> = all.iter().map(|s| status_color(*s)).collect();
        assert_eq!(colors.len(), all.len());
        assert_eq!(status_color(LevelStatus::Completed), "#39ff14");
        assert_eq!(status_color(LevelStatus::Locked), "#666666");
    }

    #[test]
    fn icon_shows_for_open_levels_only() {
        let mut level = crate::model::tests::zigzag_levels().remove(0);
        level.icon = "./icons/cyber.png".into();
        assert_eq!(
            icon_src(&level, LevelStatus::Current),
            Some("./icons/cyber.png")
        );
        assert_eq!(
            icon_src(&level, LevelStatus::Completed),
            Some("./icons/cyber.png")
        );
        assert_eq!(icon_src(&level, LevelStatus::Locked), None);
        level.icon = "  ".into();
        assert_eq!(icon_src(&level, LevelStatus::Current), None);
    }
}
