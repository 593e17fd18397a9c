use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};
use yew::prelude::*;

use super::level_node::LevelNode;
use crate::geometry::PathCommand;
use crate::model::{Level, LevelStatus, Position};
use crate::state::MapState;

#[derive(Properties, PartialEq, Clone)]
pub struct LevelMapProps {
    pub map: UseReducerHandle<MapState>,
    pub on_select: Callback<u32>,
}

/// Traces commands given in 0..100 map space onto a `w` x `h` pixel canvas.
fn trace(ctx: &CanvasRenderingContext2d, commands: &[PathCommand], w: f64, h: f64) {
    let px = |p: Position| (p.x * w / 100.0, p.y * h / 100.0);
    ctx.begin_path();
    for cmd in commands {
        match *cmd {
            PathCommand::MoveTo(p) => {
                let (x, y) = px(p);
                ctx.move_to(x, y);
            }
            PathCommand::LineTo(p) => {
                let (x, y) = px(p);
                ctx.line_to(x, y);
            }
            PathCommand::QuadTo { control, to } => {
                let (cx, cy) = px(control);
                let (x, y) = px(to);
                ctx.quadratic_curve_to(cx, cy, x, y);
            }
        }
    }
}

fn draw_map(canvas: &HtmlCanvasElement, map: &MapState) {
    if !canvas.is_connected() {
        return;
    }
    let Some(ctx) = canvas
        .get_context("2d")
        .ok()
        .flatten()
        .and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
    else {
        return;
    };
    let w = canvas.width() as f64;
    let h = canvas.height() as f64;
    ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0).ok();
    ctx.clear_rect(0.0, 0.0, w, h);
    if map.path.is_empty() {
        return;
    }
    let commands = map.path.commands();
    ctx.set_line_cap("square");
    ctx.set_line_join("miter");

    // glow
    ctx.set_shadow_color("rgba(0,255,255,0.6)");
    ctx.set_shadow_blur(12.0);
    ctx.set_stroke_style_str("#00ffff");
    ctx.set_line_width(3.0);
    ctx.set_global_alpha(0.8);
    trace(&ctx, &commands, w, h);
    ctx.stroke();
    ctx.set_shadow_blur(0.0);

    ctx.set_stroke_style_str("#00aaff");
    ctx.set_line_width(1.5);
    ctx.set_global_alpha(0.6);
    trace(&ctx, &commands, w, h);
    ctx.stroke();

    // traversed prefix
    let revealed = map.path.reveal(map.progress_fraction());
    if revealed.len() > 1 {
        let dash = js_sys::Array::of2(&4.0.into(), &8.0.into());
        ctx.set_line_dash(&dash).ok();
        ctx.set_stroke_style_str("#0a0a0a");
        ctx.set_line_width(2.0);
        ctx.set_global_alpha(1.0);
        trace(&ctx, &revealed, w, h);
        ctx.stroke();
        ctx.set_line_dash(&js_sys::Array::new()).ok();
        if let Some(head) = map.path.point_at(map.progress_fraction()) {
            ctx.set_fill_style_str("#0a0a0a");
            ctx.begin_path();
            if ctx
                .arc(head.x * w / 100.0, head.y * h / 100.0, 3.0, 0.0, std::f64::consts::TAU)
                .is_ok()
            {
                ctx.fill();
            }
        }
    }

    // connection pads under each node
    ctx.set_global_alpha(0.9);
    ctx.set_fill_style_str("#00d4ff");
    for level in map.levels.iter() {
        let (x, y) = (level.position.x * w / 100.0, level.position.y * h / 100.0);
        ctx.begin_path();
        if ctx.arc(x, y, 4.0, 0.0, std::f64::consts::TAU).is_ok() {
            ctx.fill();
        }
    }

    let marker = map.marker_position();
    let (mx, my) = (marker.x * w / 100.0, marker.y * h / 100.0);
    ctx.set_global_alpha(1.0);
    if map.is_moving() {
        ctx.set_shadow_color("rgba(255,107,53,0.9)");
        ctx.set_shadow_blur(18.0);
    }
    ctx.set_fill_style_str("#ff6b35");
    ctx.set_stroke_style_str("#ffffff");
    ctx.set_line_width(2.0);
    ctx.begin_path();
    if ctx.arc(mx, my, 9.0, 0.0, std::f64::consts::TAU).is_ok() {
        ctx.fill();
        ctx.stroke();
    }
    ctx.set_shadow_blur(0.0);
}

fn fit_to_parent(canvas: &HtmlCanvasElement) {
    let (w, h) = canvas
        .parent_element()
        .map(|p| (p.client_width(), p.client_height()))
        .unwrap_or((800, 600));
    canvas.set_width(w.max(0) as u32);
    canvas.set_height(h.max(0) as u32);
}

#[function_component(LevelMap)]
pub fn level_map(props: &LevelMapProps) -> Html {
    let canvas_ref = use_node_ref();
    let map_ref = use_mut_ref(|| props.map.clone());
    let draw_ref = use_mut_ref(|| None::<Rc<dyn Fn()>>);
    let hovered = use_state(|| None::<u32>);

    // Redraw on every state change
    {
        let map_ref = map_ref.clone();
        let draw_ref = draw_ref.clone();
        use_effect_with(props.map.clone(), move |map| {
            *map_ref.borrow_mut() = map.clone();
            if let Some(f) = &*draw_ref.borrow() {
                f();
            }
            || ()
        });
    }
    // Mount: sizing, draw closure, resize listener
    {
        let canvas_ref = canvas_ref.clone();
        let draw_ref = draw_ref.clone();
        let map_ref = map_ref.clone();
        use_effect_with((), move |_| {
            let window = web_sys::window().expect("window");
            let canvas: HtmlCanvasElement =
                canvas_ref.cast::<HtmlCanvasElement>().expect("canvas");
            fit_to_parent(&canvas);
            let draw: Rc<dyn Fn()> = {
                let canvas = canvas.clone();
                Rc::new(move || draw_map(&canvas, &map_ref.borrow()))
            };
            *draw_ref.borrow_mut() = Some(draw.clone());
            draw();

            let resize_cb = {
                let canvas = canvas.clone();
                Closure::wrap(Box::new(move |_e: web_sys::Event| {
                    fit_to_parent(&canvas);
                    draw();
                }) as Box<dyn FnMut(_)>)
            };
            window
                .add_event_listener_with_callback("resize", resize_cb.as_ref().unchecked_ref())
                .ok();

            move || {
                let _ = window.remove_event_listener_with_callback(
                    "resize",
                    resize_cb.as_ref().unchecked_ref(),
                );
                draw_ref.borrow_mut().take();
            }
        });
    }

    let on_hover = {
        let hovered = hovered.clone();
        Callback::from(move |id: Option<u32>| hovered.set(id))
    };
    let map = &props.map;
    let tooltip = (*hovered)
        .and_then(|id| map.level(id))
        .filter(|level| map.status(level.id) != LevelStatus::Locked)
        .map(|level| render_tooltip(level, map.status(level.id).label()));

    html! {
        <div style="position:relative; width:100%; height:640px; margin:24px 0; border-radius:16px; background:radial-gradient(ellipse at center, #101a2e 0%, #070a12 100%); overflow:visible;">
            <canvas ref={canvas_ref} style="position:absolute; inset:0; width:100%; height:100%; display:block; pointer-events:none;" />
            { for map.levels.iter().zip(map.progression.statuses()).map(|(level, (_, status))| html! {
                <LevelNode
                    key={level.id}
                    level={level.clone()}
                    status={status}
                    flashing={map.is_flashing(level.id)}
                    on_select={props.on_select.clone()}
                    on_hover={on_hover.clone()}
                />
            }) }
            { for tooltip }
        </div>
    }
}

fn render_tooltip(level: &Level, status: &str) -> Html {
    let stars: String = (0..3)
        .map(|i| if i < level.star_rating { '★' } else { '☆' })
        .collect();
    // flip below the node when too close to the top edge
    let (top, shift) = if level.position.y < 25.0 {
        (format!("calc({}% + 48px)", level.position.y), "0")
    } else {
        (format!("calc({}% - 48px)", level.position.y), "-100%")
    };
    html! {
        <div style={format!("position:absolute; left:{}%; top:{}; transform:translate(-50%, {}); background:rgba(10,14,24,0.95); border:1px solid {}; border-radius:10px; padding:10px 14px; min-width:200px; max-width:260px; font-size:13px; pointer-events:none; z-index:20;", level.position.x, top, shift, level.color)}>
            <div style="font-weight:700; margin-bottom:4px;">{ format!("Level {}: {}", level.id, level.topic) }</div>
            <div style="display:flex; justify-content:space-between; opacity:0.85; margin-bottom:6px;">
                <span>{ level.difficulty.label() }</span>
                <span style="color:#ffd700;">{ stars }</span>
            </div>
            <div style="opacity:0.8; line-height:1.35;">{ level.description.clone() }</div>
            <div style="margin-top:6px; font-size:11px; text-transform:uppercase; letter-spacing:0.05em; opacity:0.6;">{ status }</div>
        </div>
    }
}
