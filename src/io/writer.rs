// src/io/writer.rs
use std::path::Path;

use gdal::raster::{GdalDataType, GdalType, RasterCreationOptions};
use gdal::{Dataset, Driver, DriverManager, Metadata};
use tracing::{debug, info};

use crate::error::{CogError, Result};
use crate::utils::TypedBuffer;

use super::reader::GeoInfo;

/// Internal tile edge length, in pixels, of every file we write.
pub const TILE_SIZE: usize = 256;

/// Overview decimation factors, each relative to the full-resolution image.
pub const OVERVIEW_FACTORS: [i32; 6] = [2, 4, 8, 16, 32, 64];

/// GDAL resampling used when building overviews.
pub const OVERVIEW_RESAMPLING: &str = "NEAREST";

/// Metadata domain recording how the overviews were built.
pub const OVERVIEW_TAG_DOMAIN: &str = "rio_overview";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Deflate,
}

impl Compression {
    pub fn as_gdal(&self) -> &'static str {
        match self {
            Compression::Deflate => "DEFLATE",
        }
    }
}

/// When to switch the TIFF to 64-bit offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BigTiff {
    IfNeeded,
}

impl BigTiff {
    pub fn as_gdal(&self) -> &'static str {
        match self {
            BigTiff::IfNeeded => "IF_NEEDED",
        }
    }
}

/// Parameters of the raster being written.
#[derive(Debug, Clone)]
pub struct Profile {
    pub width: usize,
    pub height: usize,
    pub band_count: usize,
    pub data_type: GdalDataType,
    pub geo_transform: [f64; 6],
    pub projection: String,
    pub no_data: Option<f64>,
    pub tile_size: usize,
    pub compression: Compression,
    pub compress_level: u8,
    pub big_tiff: BigTiff,
}

impl Profile {
    pub fn from_source(info: &GeoInfo) -> Self {
        Self {
            width: info.width,
            height: info.height,
            band_count: info.band_count,
            data_type: info.data_type,
            geo_transform: info.geo_transform,
            projection: info.projection.clone(),
            no_data: info.no_data,
            tile_size: TILE_SIZE,
            compression: Compression::Deflate,
            compress_level: 6,
            big_tiff: BigTiff::IfNeeded,
        }
    }

    /// Same profile restricted to a `(width, height)` window whose origin is `geo_transform`.
    pub fn windowed(&self, size: (usize, usize), geo_transform: [f64; 6]) -> Self {
        Self {
            width: size.0,
            height: size.1,
            geo_transform,
            ..self.clone()
        }
    }

    pub fn with_compress_level(mut self, level: u8) -> Self {
        self.compress_level = level;
        self
    }

    pub fn creation_options(&self) -> Vec<String> {
        vec![
            "TILED=YES".to_string(),
            format!("BLOCKXSIZE={}", self.tile_size),
            format!("BLOCKYSIZE={}", self.tile_size),
            format!("COMPRESS={}", self.compression.as_gdal()),
            format!("ZLEVEL={}", self.compress_level.clamp(1, 9)),
            format!("BIGTIFF={}", self.big_tiff.as_gdal()),
        ]
    }
}

/// Write `bands` as a tiled GeoTIFF at `output_path` and build its overview pyramid.
///
/// The result is an intermediate file: overviews are stored after the image data,
/// which is not the order a COG needs. See [`super::cog::finalize`].
pub fn write_tiled(
    mut bands: Vec<TypedBuffer>,
    profile: &Profile,
    output_path: &Path,
) -> Result<()> {
    if bands.len() != profile.band_count {
        return Err(CogError::Config(format!(
            "profile expects {} bands, got {}",
            profile.band_count,
            bands.len()
        )));
    }

    let driver = DriverManager::get_driver_by_name("GTiff")?;
    let creation_options = RasterCreationOptions::from_iter(profile.creation_options());

    let mut dataset = create_dataset(&driver, output_path, profile, &creation_options)?;
    dataset.set_projection(&profile.projection)?;
    dataset.set_geo_transform(&profile.geo_transform)?;

    for (index, buffer) in bands.iter_mut().enumerate() {
        let mut band = dataset.rasterband(index + 1)?;
        if let Some(no_data) = profile.no_data {
            band.set_no_data_value(Some(no_data))?;
        }
        buffer.write(&mut band)?;
    }
    dataset.flush_cache()?;

    debug!(factors = ?OVERVIEW_FACTORS, "building overviews");
    dataset.build_overviews(OVERVIEW_RESAMPLING, &OVERVIEW_FACTORS, &[])?;
    dataset.set_metadata_item("resampling", "nearest", OVERVIEW_TAG_DOMAIN)?;
    dataset.flush_cache()?;

    info!(
        path = %output_path.display(),
        width = profile.width,
        height = profile.height,
        bands = profile.band_count,
        "wrote tiled raster"
    );
    Ok(())
}

fn create_dataset(
    driver: &Driver,
    path: &Path,
    profile: &Profile,
    options: &RasterCreationOptions,
) -> Result<Dataset> {
    match profile.data_type {
        GdalDataType::UInt8 => create_typed::<u8>(driver, path, profile, options),
        GdalDataType::UInt16 => create_typed::<u16>(driver, path, profile, options),
        GdalDataType::Int16 => create_typed::<i16>(driver, path, profile, options),
        GdalDataType::UInt32 => create_typed::<u32>(driver, path, profile, options),
        GdalDataType::Int32 => create_typed::<i32>(driver, path, profile, options),
        GdalDataType::Float32 => create_typed::<f32>(driver, path, profile, options),
        GdalDataType::Float64 => create_typed::<f64>(driver, path, profile, options),
        other => Err(CogError::UnsupportedDataType(format!("{other:?}"))),
    }
}

fn create_typed<T: GdalType>(
    driver: &Driver,
    path: &Path,
    profile: &Profile,
    options: &RasterCreationOptions,
) -> Result<Dataset> {
    Ok(driver.create_with_band_type_with_options::<T, _>(
        path,
        profile.width,
        profile.height,
        profile.band_count,
        options,
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;

    use gdal::raster::Buffer;

    fn sized_profile(width: usize, height: usize) -> Profile {
        Profile::from_source(&GeoInfo {
            projection: String::new(),
            geo_transform: [0.0, 1.0, 0.0, 0.0, 0.0, -1.0],
            width,
            height,
            band_count: 1,
            data_type: GdalDataType::Float32,
            no_data: None,
        })
    }

    fn profile() -> Profile {
        sized_profile(100, 80)
    }

    #[test]
    fn test_creation_options() {
        let options = profile().with_compress_level(12).creation_options();
        assert!(options.contains(&"TILED=YES".to_string()));
        assert!(options.contains(&"BLOCKXSIZE=256".to_string()));
        assert!(options.contains(&"BLOCKYSIZE=256".to_string()));
        assert!(options.contains(&"COMPRESS=DEFLATE".to_string()));
        assert!(options.contains(&"BIGTIFF=IF_NEEDED".to_string()));
        assert!(options.contains(&"ZLEVEL=9".to_string()));
    }

    #[test]
    fn test_windowed_profile_keeps_encoding() {
        let gt = [10.0, 1.0, 0.0, -5.0, 0.0, -1.0];
        let windowed = profile().windowed((20, 30), gt);
        assert_eq!((windowed.width, windowed.height), (20, 30));
        assert_eq!(windowed.geo_transform, gt);
        assert_eq!(windowed.tile_size, TILE_SIZE);
        assert_eq!(windowed.data_type, GdalDataType::Float32);
    }

    #[test]
    fn test_write_tiled_builds_nearest_overview_pyramid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pyramid_temp.tif");
        let size = 128;

        // Each 2x2 block carries its value on the diagonal and +1000 off it,
        // so an averaging resampler would show up as +500.
        let data: Vec<f32> = (0..size * size)
            .map(|i| {
                let (col, row) = (i % size, i / size);
                let block = ((row / 2) * (size / 2) + col / 2) as f32;
                if col % 2 == row % 2 {
                    block
                } else {
                    block + 1000.0
                }
            })
            .collect();

        let bands = vec![TypedBuffer::F32(Buffer::new((size, size), data.clone()))];
        write_tiled(bands, &sized_profile(size, size), &path).unwrap();

        let dataset = Dataset::open(&path).unwrap();
        assert_eq!(
            dataset
                .metadata_item("resampling", OVERVIEW_TAG_DOMAIN)
                .as_deref(),
            Some("nearest")
        );

        let band = dataset.rasterband(1).unwrap();
        assert_eq!(band.block_size(), (TILE_SIZE, TILE_SIZE));
        assert_eq!(band.overview_count().unwrap(), 6);
        for (level, factor) in OVERVIEW_FACTORS.iter().enumerate() {
            let expected = size / *factor as usize;
            assert_eq!(band.overview(level).unwrap().size(), (expected, expected));
        }

        let half = size / 2;
        let overview = band
            .overview(0)
            .unwrap()
            .read_as::<f32>((0, 0), (half, half), (half, half), None)
            .unwrap();
        for (col, row) in [(0, 0), (7, 5), (63, 63)] {
            assert_eq!(
                overview.data()[row * half + col],
                data[2 * row * size + 2 * col],
                "overview pixel ({col}, {row})"
            );
        }
    }
}
