mod app;
mod state;
mod ui;

use std::path::PathBuf;

use app::VisitDashboardApp;
use eframe::egui;
use visit_dashboard::color;

/// Loaded at startup when no path is given and the file exists.
const DEFAULT_DATA_FILE: &str = "cleaned_data_visit.csv";

fn startup_path() -> Option<PathBuf> {
    match std::env::args_os().nth(1) {
        Some(arg) => Some(PathBuf::from(arg)),
        None => {
            let default = PathBuf::from(DEFAULT_DATA_FILE);
            default.exists().then_some(default)
        }
    }
}

fn main() -> eframe::Result {
    env_logger::init();

    let mut app = VisitDashboardApp::default();
    if let Some(path) = startup_path() {
        app.state.load_path(&path);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([800.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Service Provider Visits Dashboard",
        options,
        Box::new(move |cc| {
            // Install image loaders so egui can render the sidebar logo.
            egui_extras::install_image_loaders(&cc.egui_ctx);

            let mut visuals = egui::Visuals::dark();
            visuals.panel_fill = color::BACKGROUND;
            cc.egui_ctx.set_visuals(visuals);

            Ok(Box::new(app))
        }),
    )
}
