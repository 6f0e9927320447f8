mod app;
mod color;
mod config;
mod data;
mod report;
mod state;
mod ui;

use anyhow::anyhow;
use app::KollywoodLensApp;
use clap::Parser;
use config::Args;
use eframe::egui;
use state::{AppState, DatasetCache};

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.summary {
        return report::run(&args);
    }

    let mut state = AppState::new(DatasetCache::new(&args.movies, &args.labels), args.top);
    // A failed load leaves the window open with the error in the status line.
    let _ = state.load(&args.filter_overrides());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Kollywood Lens – Tamil Cinema Representation",
        options,
        Box::new(move |_cc| Ok(Box::new(KollywoodLensApp::new(state)))),
    )
    .map_err(|e| anyhow!("failed to start the dashboard window: {e}"))
}
