// src/main.rs
use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use cog_convert::cli::{Cli, Mode};
use cog_convert::{convert_catalog, convert_raster, ConvertConfig};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => ConvertConfig::from_file(path)?,
        None => ConvertConfig::default(),
    };
    let bbox = cli.bounding_box()?;

    match cli.mode() {
        Mode::Catalog {
            input_dir,
            output_dir,
        } => {
            info!(
                input = %input_dir.display(),
                output = %output_dir.display(),
                "converting catalog"
            );
            let outputs = convert_catalog(&input_dir, &output_dir, bbox.as_ref(), &config)
                .with_context(|| format!("failed to convert {}", input_dir.display()))?;

            println!("Catalog: {}", outputs.catalog.display());
            println!("Item: {}", outputs.item.display());
            println!("COG: {}", outputs.raster.display());
        }
        Mode::Raster {
            input_tif,
            output_tif,
        } => {
            info!(
                input = %input_tif.display(),
                output = %output_tif.display(),
                "converting raster"
            );
            convert_raster(&input_tif, &output_tif, bbox.as_ref(), &config)
                .with_context(|| format!("failed to convert {}", input_tif.display()))?;

            println!("COG: {}", output_tif.display());
        }
    }

    Ok(())
}
