mod app;
pub mod i18n;
mod ui;
mod viewport;

use std::path::PathBuf;

use app::ViewerApp;
use mesh_viewer_lib::state::AppSettings;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mesh_viewer=info,mesh_viewer_lib=info".into()),
        )
        .init();

    // Parse --model <path> argument
    let initial_model = parse_model_arg();
    let antialiasing = AppSettings::load().viewport.antialiasing;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Mesh Viewer")
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([720.0, 480.0])
            .with_drag_and_drop(true),
        multisampling: if antialiasing { 4 } else { 0 },
        depth_buffer: 24,
        ..Default::default()
    };

    if let Err(e) = eframe::run_native(
        "mesh-viewer",
        native_options,
        Box::new(move |cc| Ok(Box::new(ViewerApp::new(cc, initial_model)))),
    ) {
        tracing::error!("Failed to start application: {e}");
    }
}

fn parse_model_arg() -> Option<PathBuf> {
    let args: Vec<String> = std::env::args().collect();
    let mut i = 1;
    while i < args.len() {
        if args[i] == "--model" && i + 1 < args.len() {
            let path = PathBuf::from(&args[i + 1]);
            if !path.is_file() {
                tracing::error!("Model file not found: {}", path.display());
                return None;
            }
            return Some(path);
        }
        i += 1;
    }
    None
}
