mod commands;
mod components;
mod config;
mod geometry;
mod model;
mod persistence;
mod progression;
mod state;
mod util;

use components::app::App;

fn main() {
    util::init_logging();
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "level map starting");
    yew::Renderer::<App>::new().render();
}
