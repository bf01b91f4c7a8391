mod analysis;
mod app;
mod color;
mod config;
mod dashboard;
mod data;
mod state;
mod ui;

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use app::QuakePandaApp;
use clap::Parser;
use config::Settings;
use data::repository::CatalogRepository;
use eframe::egui;
use state::AppState;

/// Explore an earthquake catalog: filter it and look at where, how strong
/// and how often.
#[derive(Parser)]
#[command(name = "quake-panda", about = "Earthquake magnitude and frequency explorer")]
struct Cli {
    /// Catalog file (.csv, .xls, .json, .parquet). Overrides the settings file.
    data: Option<PathBuf>,

    /// JSON settings file.
    #[arg(long)]
    settings: Option<PathBuf>,
}

fn pick_data_file() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Open earthquake catalog")
        .add_filter("Supported files", &["csv", "xls", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv", "xls"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file()
}

fn startup(cli: Cli) -> Result<AppState> {
    let settings = match &cli.settings {
        Some(path) => Settings::from_file(path)?,
        None => Settings::default(),
    };

    let source = cli
        .data
        .or_else(|| settings.data_path.clone())
        .or_else(pick_data_file)
        .ok_or_else(|| anyhow!("no catalog file selected"))?;

    let repository = CatalogRepository::new(source);
    let catalog = repository
        .catalog()
        .with_context(|| format!("cannot open catalog {}", repository.source().display()))?;

    Ok(AppState::new(catalog, settings))
}

fn main() -> Result<()> {
    env_logger::init();

    let state = startup(Cli::parse()).inspect_err(|e| log::error!("Startup failed: {e:#}"))?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([640.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Quake Panda – Earthquake Explorer",
        options,
        Box::new(|_cc| Ok(Box::new(QuakePandaApp::new(state)))),
    )
    .map_err(|e| anyhow!("window closed with error: {e}"))
}
