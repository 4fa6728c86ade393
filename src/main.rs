mod app;
mod charts;
mod color;
mod config;
mod data;
mod narrative;
mod state;
mod ui;

use anyhow::{anyhow, Context};
use app::MeatscopeApp;
use eframe::egui;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    // No partial dashboard: a load failure ends the session here.
    let table = data::prepare::prepare().context("preparing dashboard data")?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Meatscope – GDP and Meat Consumption",
        options,
        Box::new(move |_cc| Ok(Box::new(MeatscopeApp::new(table)))),
    )
    .map_err(|e| anyhow!("running the UI: {e}"))
}
