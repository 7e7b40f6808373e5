mod app;
mod color;
mod config;
mod data;
mod figure;
mod state;
mod ui;

use app::TplotsApp;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 760.0])
            .with_min_inner_size([640.0, 420.0])
            .with_position([0.0, 0.0]),
        ..Default::default()
    };

    eframe::run_native(
        "tplots",
        options,
        Box::new(|_cc| Ok(Box::new(TplotsApp::default()))),
    )
}
