use clap::Parser;
use std::path::PathBuf;

use crate::error::Result;
use crate::processing::BoundingBox;

#[derive(Parser, Debug)]
#[command(name = "cog-convert")]
#[command(about = "Convert a STAC item's GeoTIFF asset into a Cloud Optimized GeoTIFF")]
#[command(version)]
pub struct Cli {
    /// Input directory containing catalog.json
    #[arg(
        required_unless_present = "input_tif",
        conflicts_with_all = ["input_tif", "output_tif"]
    )]
    pub input_dir: Option<PathBuf>,

    /// Output directory; results go to OUTPUT_DIR/<input dir name>-cog
    #[arg(required_unless_present = "input_tif")]
    pub output_dir: Option<PathBuf>,

    /// Convert a single GeoTIFF instead of a catalog
    #[arg(long = "input_tif", requires = "output_tif")]
    pub input_tif: Option<PathBuf>,

    /// Output path of the COG when converting a single GeoTIFF
    #[arg(long = "output_tif", requires = "input_tif")]
    pub output_tif: Option<PathBuf>,

    /// Crop to this box, in the source raster's coordinate reference
    #[arg(
        long,
        num_args = 4,
        value_names = ["MIN_X", "MIN_Y", "MAX_X", "MAX_Y"],
        allow_negative_numbers = true
    )]
    pub bbox: Option<Vec<f64>>,

    /// JSON file overriding asset keys, title, role and compression level
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level, used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// What the command line asks for.
#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Catalog {
        input_dir: PathBuf,
        output_dir: PathBuf,
    },
    Raster {
        input_tif: PathBuf,
        output_tif: PathBuf,
    },
}

impl Cli {
    pub fn mode(&self) -> Mode {
        match (&self.input_tif, &self.output_tif) {
            (Some(input_tif), Some(output_tif)) => Mode::Raster {
                input_tif: input_tif.clone(),
                output_tif: output_tif.clone(),
            },
            _ => Mode::Catalog {
                input_dir: self.input_dir.clone().unwrap_or_default(),
                output_dir: self.output_dir.clone().unwrap_or_default(),
            },
        }
    }

    pub fn bounding_box(&self) -> Result<Option<BoundingBox>> {
        self.bbox
            .as_deref()
            .map(BoundingBox::from_slice)
            .transpose()
    }
}
