//! Connector geometry between consecutive levels.
//!
//! Each pair of neighbouring levels is joined by a "circuit trace": a curve out of the
//! first node, a few straight hops through slightly displaced waypoints, and a curve
//! into the second node. Pairs that sit very close together get a plain straight line
//! so corners never fold back on themselves.
//!
//! The reveal overlay is driven by a fraction of the whole path. That fraction is
//! linear in drawing-parameter space (each segment owns an equal share, each command
//! an equal share of its segment), which keeps `k / (N - 1)` landing exactly on node
//! `k + 1` whatever the true arc lengths are.

use crate::model::Position;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Tunables for the trace shape. Amplitudes are small relative to node spacing.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PathStyle {
    pub waypoints_per_segment: u32,
    /// Below this distance a segment is drawn as a single straight line.
    pub close_threshold: f64,
    /// Amplitude of the `cos(3πt)` displacement along x.
    pub jitter_x: f64,
    /// Amplitude of the `sin(2πt)` displacement along y.
    pub jitter_y: f64,
}

impl Default for PathStyle {
    fn default() -> Self {
        Self {
            waypoints_per_segment: 3,
            close_threshold: 10.0,
            jitter_x: 1.5,
            jitter_y: 2.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathCommand {
    MoveTo(Position),
    LineTo(Position),
    QuadTo { control: Position, to: Position },
}

impl PathCommand {
    pub fn end(&self) -> Position {
        match *self {
            PathCommand::MoveTo(p) | PathCommand::LineTo(p) => p,
            PathCommand::QuadTo { to, .. } => to,
        }
    }

    /// The prefix of this command ending at parameter `t`, starting from `from`.
    fn split_at(&self, from: Position, t: f64) -> PathCommand {
        match *self {
            PathCommand::MoveTo(p) => PathCommand::MoveTo(p),
            PathCommand::LineTo(p) => PathCommand::LineTo(from.lerp(p, t)),
            PathCommand::QuadTo { control, to } => {
                // de Casteljau: first half of the subdivided curve
                let q0 = from.lerp(control, t);
                let q1 = control.lerp(to, t);
                PathCommand::QuadTo {
                    control: q0,
                    to: q0.lerp(q1, t),
                }
            }
        }
    }

    fn svg(&self) -> String {
        match self {
            PathCommand::MoveTo(p) => format!("M {} {}", fmt_num(p.x), fmt_num(p.y)),
            PathCommand::LineTo(p) => format!("L {} {}", fmt_num(p.x), fmt_num(p.y)),
            PathCommand::QuadTo { control, to } => format!(
                "Q {} {}, {} {}",
                fmt_num(control.x),
                fmt_num(control.y),
                fmt_num(to.x),
                fmt_num(to.y)
            ),
        }
    }
}

fn fmt_num(v: f64) -> String {
    let rounded = (v * 1000.0).round() / 1000.0;
    if rounded == 0.0 {
        "0".to_string()
    } else {
        format!("{rounded}")
    }
}

/// Connector between two consecutive levels.
#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
    pub from: Position,
    pub to: Position,
    /// Displaced sub-waypoints; empty for straight segments.
    pub waypoints: Vec<Position>,
    /// Draw commands continuing from `from`; the last one ends exactly at `to`.
    pub commands: Vec<PathCommand>,
}

impl Segment {
    pub fn is_straight(&self) -> bool {
        self.waypoints.is_empty()
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PathDescriptor {
    pub segments: Vec<Segment>,
}

impl PathDescriptor {
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn start(&self) -> Option<Position> {
        self.segments.first().map(|s| s.from)
    }

    /// Full command list: one `MoveTo` followed by every segment's commands.
    pub fn commands(&self) -> Vec<PathCommand> {
        let Some(start) = self.start() else { return Vec::new() };
        let mut out = vec![PathCommand::MoveTo(start)];
        for seg in &self.segments {
            out.extend(seg.commands.iter().copied());
        }
        out
    }

    /// SVG path data (`d` attribute) for the whole connector.
    pub fn to_svg_path(&self) -> String {
        svg_path(&self.commands())
    }

    /// Prefix of the connector covering `fraction` of it.
    pub fn reveal(&self, fraction: f64) -> Vec<PathCommand> {
        let Some(start) = self.start() else { return Vec::new() };
        let f = if fraction.is_nan() { 0.0 } else { fraction.clamp(0.0, 1.0) };
        let total = self.segments.len();
        let scaled = f * total as f64;
        let seg_idx = (scaled.floor() as usize).min(total - 1);
        let local = scaled - seg_idx as f64;

        let mut out = vec![PathCommand::MoveTo(start)];
        for seg in &self.segments[..seg_idx] {
            out.extend(seg.commands.iter().copied());
        }
        let seg = &self.segments[seg_idx];
        let m = seg.commands.len();
        let scaled_cmd = local * m as f64;
        let cmd_idx = (scaled_cmd.floor() as usize).min(m - 1);
        let t = scaled_cmd - cmd_idx as f64;
        out.extend(seg.commands[..cmd_idx].iter().copied());
        if t >= 1.0 {
            out.push(seg.commands[cmd_idx]);
        } else if t > 0.0 {
            let from = if cmd_idx == 0 {
                seg.from
            } else {
                seg.commands[cmd_idx - 1].end()
            };
            out.push(seg.commands[cmd_idx].split_at(from, t));
        }
        out
    }

    /// Where the revealed prefix currently ends.
    pub fn point_at(&self, fraction: f64) -> Option<Position> {
        self.reveal(fraction).last().map(PathCommand::end)
    }
}

pub fn svg_path(commands: &[PathCommand]) -> String {
    commands
        .iter()
        .map(PathCommand::svg)
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn build_path_with(points: &[Position], style: &PathStyle) -> PathDescriptor {
    if points.len() < 2 {
        return PathDescriptor::default();
    }
    let segments = points
        .windows(2)
        .map(|pair| build_segment(pair[0], pair[1], style))
        .collect();
    PathDescriptor { segments }
}

fn build_segment(prev: Position, cur: Position, style: &PathStyle) -> Segment {
    let k = style.waypoints_per_segment.max(1);
    if prev.distance(cur) < style.close_threshold || k == 1 {
        return Segment {
            from: prev,
            to: cur,
            waypoints: Vec::new(),
            commands: vec![PathCommand::LineTo(cur)],
        };
    }
    let mut waypoints = Vec::with_capacity(k as usize);
    let mut commands = Vec::with_capacity(k as usize);
    for j in 1..=k {
        let t = f64::from(j) / f64::from(k);
        let base = prev.lerp(cur, t);
        let wp = Position::new(
            base.x + (t * PI * 3.0).cos() * style.jitter_x,
            base.y + (t * PI * 2.0).sin() * style.jitter_y,
        );
        waypoints.push(wp);
        if j == 1 {
            commands.push(PathCommand::QuadTo {
                control: prev.midpoint(wp),
                to: wp,
            });
        } else if j == k {
            commands.push(PathCommand::QuadTo {
                control: wp.midpoint(cur),
                to: cur,
            });
        } else {
            commands.push(PathCommand::LineTo(wp));
        }
    }
    Segment {
        from: prev,
        to: cur,
        waypoints,
        commands,
    }
}

/// Fraction of the connector shown as traversed.
///
/// Completed segments are `current_level_id - 1`; while the marker moves the eased
/// progress through the active segment is added on top.
pub fn progress_fraction(
    current_level_id: u32,
    partial_progress: f64,
    is_moving: bool,
    level_count: usize,
) -> f64 {
    if level_count < 2 {
        return 0.0;
    }
    let total_segments = (level_count - 1) as f64;
    let mut done = f64::from(current_level_id.saturating_sub(1));
    if is_moving {
        done += partial_progress.clamp(0.0, 1.0);
    }
    (done / total_segments).clamp(0.0, 1.0)
}
