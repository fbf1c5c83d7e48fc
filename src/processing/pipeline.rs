// src/processing/pipeline.rs
use std::path::Path;

use tracing::info;

use crate::error::Result;
use crate::io::cog::{ensure_input_preserved, finalize, TempRaster};
use crate::io::reader::RasterSource;
use crate::io::writer::{write_tiled, Profile};

use super::nodata::sanitize;
use super::window::{compute_window, BoundingBox, PixelWindow};

/// What one raster conversion produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterReport {
    pub window: PixelWindow,
    pub sanitized_samples: usize,
}

/// Converts a single raster to a COG: read, clean NaNs, tile, build overviews, repack.
pub struct CogProcessor {
    compress_level: u8,
}

impl CogProcessor {
    pub fn new(compress_level: u8) -> Self {
        Self { compress_level }
    }

    pub fn process(
        &self,
        input_path: &Path,
        output_path: &Path,
        bbox: Option<&BoundingBox>,
    ) -> Result<RasterReport> {
        let source = RasterSource::open(input_path)?;
        ensure_input_preserved(input_path, output_path)?;
        let info = source.info();

        let (mut bands, profile, window) = match bbox {
            Some(bbox) => {
                let window = compute_window(bbox, &info.geo_transform, info.width, info.height)?;
                info!(
                    %bbox,
                    col_off = window.col_off,
                    row_off = window.row_off,
                    width = window.width,
                    height = window.height,
                    "cropping to window"
                );
                let (bands, geo_transform) = source.read_window(&window)?;
                let profile = Profile::from_source(info).windowed(window.size(), geo_transform);
                (bands, profile, window)
            }
            None => {
                let (bands, profile) = source.read_full()?;
                (bands, profile, PixelWindow::full(info.width, info.height))
            }
        };
        drop(source);

        let sanitized_samples = sanitize(&mut bands);
        if sanitized_samples > 0 {
            info!(count = sanitized_samples, "replaced NaN samples with 0");
        }

        let profile = profile.with_compress_level(self.compress_level);
        let temp = TempRaster::for_output(output_path)?;
        write_tiled(bands, &profile, temp.path())?;
        finalize(temp, output_path, self.compress_level)?;

        Ok(RasterReport {
            window,
            sanitized_samples,
        })
    }
}
