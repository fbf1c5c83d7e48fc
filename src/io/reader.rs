// src/io/reader.rs
use std::path::Path;

use gdal::raster::GdalDataType;
use gdal::Dataset;
use tracing::debug;

use crate::error::{CogError, Result};
use crate::processing::window::{window_transform, PixelWindow};
use crate::utils::TypedBuffer;

use super::writer::Profile;

/// Georeferencing and layout of an opened raster.
#[derive(Debug, Clone)]
pub struct GeoInfo {
    pub projection: String,
    pub geo_transform: [f64; 6],
    pub width: usize,
    pub height: usize,
    pub band_count: usize,
    pub data_type: GdalDataType,
    pub no_data: Option<f64>,
}

/// An input raster opened read-only.
pub struct RasterSource {
    dataset: Dataset,
    info: GeoInfo,
}

impl RasterSource {
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CogError::not_found("raster", path));
        }

        let dataset = Dataset::open(path)?;
        let (width, height) = dataset.raster_size();
        let band_count = dataset.raster_count();
        let first_band = dataset.rasterband(1)?;

        let info = GeoInfo {
            projection: dataset.projection(),
            geo_transform: dataset.geo_transform()?,
            width,
            height,
            band_count,
            data_type: first_band.band_type(),
            no_data: first_band.no_data_value(),
        };
        drop(first_band);

        debug!(
            path = %path.display(),
            width,
            height,
            band_count,
            data_type = ?info.data_type,
            "opened raster"
        );

        Ok(Self {
            dataset,
            info,
        })
    }

    pub fn info(&self) -> &GeoInfo {
        &self.info
    }

    /// Every band, every pixel, together with the output profile matching the source.
    pub fn read_full(&self) -> Result<(Vec<TypedBuffer>, Profile)> {
        let window = PixelWindow::full(self.info.width, self.info.height);
        let bands = self.read_bands(&window)?;
        Ok((bands, Profile::from_source(&self.info)))
    }

    /// Only the pixels inside `window`, with the geotransform of the window's origin.
    pub fn read_window(&self, window: &PixelWindow) -> Result<(Vec<TypedBuffer>, [f64; 6])> {
        let bands = self.read_bands(window)?;
        Ok((bands, window_transform(&self.info.geo_transform, window)))
    }

    fn read_bands(&self, window: &PixelWindow) -> Result<Vec<TypedBuffer>> {
        (1..=self.info.band_count)
            .map(|index| {
                let band = self.dataset.rasterband(index)?;
                TypedBuffer::read(&band, (window.col_off, window.row_off), window.size())
            })
            .collect()
    }
}
