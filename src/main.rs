mod app;
mod chart;
mod color;
mod controls;
mod data;
mod export;
mod state;
mod ui;

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use app::ListingsExplorerApp;
use clap::Parser;
use data::view::{OutlierMode, ViewConfig};
use eframe::egui;
use state::{AppState, Session};

/// Explore a short-term-rental listings file.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Listings file (.csv, .tsv or .parquet) to open on startup.
    data: Option<PathBuf>,

    /// How per-field outlier masks are combined in the review view.
    #[arg(long, value_enum, default_value_t = OutlierMode::Independent)]
    outlier_mode: OutlierMode,

    /// Rows further than this many standard deviations from the mean are outliers.
    #[arg(long, default_value_t = 3.0)]
    z_threshold: f64,

    /// Write the initial charts as Vega-Lite JSON into this directory and exit.
    #[arg(long, requires = "data")]
    export: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = ViewConfig {
        z_threshold: cli.z_threshold,
        outlier_mode: cli.outlier_mode,
    };

    // Load errors on the command line are fatal before any window opens.
    let dataset = cli
        .data
        .as_deref()
        .map(|path| {
            data::loader::load_file(path).with_context(|| format!("loading {}", path.display()))
        })
        .transpose()?;

    if let Some(dir) = &cli.export {
        let dataset = dataset.context("--export needs a data file")?;
        let session = Session::new(dataset, config);
        for file in export::write_charts(&session, dir)? {
            println!("{}", file.display());
        }
        return Ok(());
    }

    let mut state = AppState::new(config);
    if let Some(dataset) = dataset {
        state.set_dataset(dataset);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Listings Explorer",
        options,
        Box::new(|_cc| Ok(Box::new(ListingsExplorerApp::new(state)))),
    )
    .map_err(|e| anyhow!("running UI: {e}"))
}
