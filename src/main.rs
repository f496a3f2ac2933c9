mod app;
mod color;
mod config;
mod data;
mod error;
mod pipeline;
mod state;
mod ui;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use eframe::egui;

use app::DashboardApp;
use config::Args;
use state::AppState;

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if let Some(out) = &args.export {
        return export(&args, out);
    }

    let mut state = AppState::new(args.load_options()?, args.pipeline_options());
    state.open(&args.data);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([640.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Interactive Customer Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(DashboardApp::new(state)))),
    )
    .map_err(|e| anyhow!("running the dashboard window: {e}"))
}

/// Headless mode: one render pass written as JSON.
fn export(args: &Args, out: &std::path::Path) -> Result<()> {
    let dataset = data::loader::load_file(&args.data, args.load_options()?)
        .with_context(|| format!("loading {}", args.data.display()))?;
    log::info!("Loaded {} rows from {}", dataset.len(), args.data.display());

    let bundle = pipeline::charts::render(&dataset, &args.selection(), &args.pipeline_options())?;
    let json = serde_json::to_string_pretty(&bundle).context("serializing chart bundle")?;
    std::fs::write(out, json).with_context(|| format!("writing {}", out.display()))?;
    log::info!("Wrote chart bundle for {} to {}", bundle.selection, out.display());
    Ok(())
}
