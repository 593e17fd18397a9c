//! Level catalogue for the circuit map.
//! Levels are fixed and linearly ordered by id; a level's status is never stored,
//! it is always derived from the progression primitives.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::warn;

/// A point in the map's normalized 0..100 coordinate space (percent of width/height).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Position) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn lerp(self, other: Position, t: f64) -> Position {
        Position {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }

    pub fn midpoint(self, other: Position) -> Position {
        self.lerp(other, 0.5)
    }

    fn clamped(self) -> Position {
        Position {
            x: self.x.clamp(0.0, 100.0),
            y: self.y.clamp(0.0, 100.0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

/// One entry of the level catalogue as authored in `assets/levels.json`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelDef {
    pub id: u32,
    pub x: f64,
    pub y: f64,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub stars: u8,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub topic: String,
}

fn default_color() -> String {
    "#00d4ff".to_string()
}

#[derive(Clone, Debug, PartialEq)]
pub struct Level {
    pub id: u32,
    /// Fixed at creation.
    pub position: Position,
    pub difficulty: Difficulty,
    /// 0..=3
    pub star_rating: u8,
    pub description: String,
    pub topic: String,
    pub icon: String,
    pub color: String,
}

impl Level {
    /// First word of the topic, used as the node caption.
    pub fn short_topic(&self) -> &str {
        self.topic.split_whitespace().next().unwrap_or("Level")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LevelStatus {
    Locked,
    Unlocked,
    Current,
    Completed,
}

impl LevelStatus {
    /// Only levels not yet finished and not beyond the current one can be entered.
    pub fn is_clickable(self) -> bool {
        matches!(self, LevelStatus::Current | LevelStatus::Unlocked)
    }

    pub fn label(self) -> &'static str {
        match self {
            LevelStatus::Locked => "locked",
            LevelStatus::Unlocked => "unlocked",
            LevelStatus::Current => "current",
            LevelStatus::Completed => "completed",
        }
    }
}

/// Status of level `id` given the two progression primitives.
pub fn derive_status(id: u32, current_level_id: u32, completed: &BTreeSet<u32>) -> LevelStatus {
    if completed.contains(&id) {
        LevelStatus::Completed
    } else if id == current_level_id {
        LevelStatus::Current
    } else if id <= current_level_id {
        LevelStatus::Unlocked
    } else {
        LevelStatus::Locked
    }
}

/// Builds the ordered level list from catalogue entries.
///
/// Returns an empty list when there are fewer than two entries or when the ids do not
/// form the contiguous range `1..=N`; both are configuration errors and render as an
/// empty map.
pub fn build_levels(defs: &[LevelDef]) -> Vec<Level> {
    if defs.len() < 2 {
        warn!(count = defs.len(), "level catalogue needs at least two levels");
        return Vec::new();
    }
    let mut sorted: Vec<&LevelDef> = defs.iter().collect();
    sorted.sort_by_key(|d| d.id);
    let contiguous = sorted
        .iter()
        .enumerate()
        .all(|(i, d)| d.id as usize == i + 1);
    if !contiguous {
        warn!("level ids must be unique and run 1..=N");
        return Vec::new();
    }
    sorted
        .into_iter()
        .map(|d| Level {
            id: d.id,
            position: Position::new(d.x, d.y).clamped(),
            difficulty: d.difficulty,
            star_rating: d.stars.min(3),
            description: d.description.clone(),
            topic: d.topic.clone(),
            icon: d.icon.clone(),
            color: d.color.clone(),
        })
        .collect()
}

pub fn positions(levels: &[Level]) -> Vec<Position> {
    levels.iter().map(|l| l.position).collect()
}
