pub mod controls_panel;
pub mod cross_section;
pub mod model_info;
pub mod status_bar;
