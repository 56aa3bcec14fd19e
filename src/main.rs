use std::env;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, bail};
use log::info;
use quake_view::{Dashboard, DashboardConfig, DatasetStore, JsonLinesSurface};

const USAGE: &str = "usage: quake-view [--no-rows] <disaster-file> <earthquake-file>
       quake-view [--no-rows] --config <config.json>";
const NO_ROWS: &str = "--no-rows";

fn main() -> anyhow::Result<()> {
    // Setup logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args: Vec<String> = env::args().skip(1).collect();
    let include_rows = !args.iter().any(|arg| arg == NO_ROWS);
    args.retain(|arg| arg != NO_ROWS);
    let config = match args.as_slice() {
        [flag, path] if flag == "--config" => {
            DashboardConfig::from_json_file(&PathBuf::from(path))
                .with_context(|| format!("Failed to read configuration from {path}"))?
        }
        [disaster, earthquake] => DashboardConfig {
            disaster_path: Some(PathBuf::from(disaster)),
            earthquake_path: Some(PathBuf::from(earthquake)),
            ..DashboardConfig::default()
        },
        _ => bail!("{USAGE}"),
    };

    let start = Instant::now();
    let store = DatasetStore::load_with_config(&config).context("Failed to load datasets")?;
    info!("Loaded datasets in {:?}", start.elapsed());

    let stdout = io::stdout();
    let mut surface = JsonLinesSurface::new(BufWriter::new(stdout.lock()));
    if !include_rows {
        surface = surface.without_rows();
    }

    let overview =
        Dashboard::overview(&store, config.clone()).context("Failed to build overview dashboard")?;
    overview
        .draw_all(&mut surface)
        .context("Failed to draw overview dashboard")?;

    let explorer =
        Dashboard::explorer(&store, config).context("Failed to build explorer dashboard")?;
    explorer
        .draw_all(&mut surface)
        .context("Failed to draw explorer dashboard")?;

    surface.into_inner().flush()?;
    info!("Rendered both dashboards in {:?}", start.elapsed());
    Ok(())
}
