pub mod about_modal;
pub mod app;
pub mod completion_banner;
pub mod controls_panel;
pub mod guide_panel;
pub mod level_map;
pub mod level_node;
pub mod progress_bar;
