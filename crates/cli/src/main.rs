//! Cycle Feature Export - Main Entry Point

use anyhow::Context;
use cli::{init_logging, run, BatchConfig};
use tracing::info;

fn main() -> anyhow::Result<()> {
    let path = std::env::args().nth(1);
    let config = BatchConfig::load(path.as_deref()).context("loading batch config")?;
    init_logging(&config.logging);

    info!("=== Cycle Features v{} ===", env!("CARGO_PKG_VERSION"));
    info!("Exporting {} tables to {}", config.sources.len(), config.output_dir.display());

    let summary = run(&config)?;
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
