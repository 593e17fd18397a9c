pub mod animation;
pub mod map;

pub use map::{MapAction, MapState};
