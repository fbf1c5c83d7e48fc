// src/io/cog.rs
use std::fs;
use std::path::{Path, PathBuf};

use gdal::raster::RasterCreationOptions;
use gdal::{Dataset, DriverManager};
use tracing::{debug, info, warn};

use crate::error::{CogError, Result};

use super::writer::{OVERVIEW_RESAMPLING, TILE_SIZE};

/// Intermediate tiled raster that is deleted when the guard goes out of scope.
///
/// The name is derived from the final output path (`{stem}_temp.tif`), so two runs
/// writing the same output race on the same temporary file.
#[derive(Debug)]
pub struct TempRaster {
    path: PathBuf,
}

impl TempRaster {
    /// Reserve the temporary path next to `output_path`, creating the parent directory.
    pub fn for_output(output_path: &Path) -> Result<Self> {
        let path = temp_path_for(output_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| CogError::io(parent, e))?;
        }
        debug!(path = %path.display(), "reserved temporary raster");
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempRaster {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "removed temporary raster"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                path = %self.path.display(),
                error = %e,
                "failed to remove temporary raster"
            ),
        }
    }
}

pub fn temp_path_for(output_path: &Path) -> PathBuf {
    let stem = output_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    output_path.with_file_name(format!("{stem}_temp.tif"))
}

/// Fail when writing `output_path`, or its temporary raster, would replace `input_path`.
///
/// Paths are compared after canonicalization, so relative paths and symlinks that end
/// at the input are caught too.
pub fn ensure_input_preserved(input_path: &Path, output_path: &Path) -> Result<()> {
    let input = fs::canonicalize(input_path).map_err(|e| CogError::io(input_path, e))?;
    for target in [output_path.to_path_buf(), temp_path_for(output_path)] {
        // a target that does not exist yet cannot be the input
        if fs::canonicalize(&target).is_ok_and(|resolved| resolved == input) {
            return Err(CogError::InputClobbered {
                input: input_path.to_path_buf(),
                target,
            });
        }
    }
    Ok(())
}

/// COG driver options: keep the overviews already in the source, recompress with deflate.
pub fn cog_creation_options(compress_level: u8) -> Vec<String> {
    vec![
        "COMPRESS=DEFLATE".to_string(),
        format!("LEVEL={}", compress_level.clamp(1, 9)),
        format!("BLOCKSIZE={TILE_SIZE}"),
        "OVERVIEWS=FORCE_USE_EXISTING".to_string(),
        format!("RESAMPLING={OVERVIEW_RESAMPLING}"),
        "BIGTIFF=IF_NEEDED".to_string(),
    ]
}

/// Repack the tiled raster held by `temp` into a Cloud Optimized GeoTIFF at `output_path`.
///
/// `temp` is consumed, so the temporary file is gone once this returns, whether or not
/// the copy succeeded.
pub fn finalize(temp: TempRaster, output_path: &Path, compress_level: u8) -> Result<()> {
    let source = Dataset::open(temp.path())?;
    let driver = DriverManager::get_driver_by_name("COG")?;
    let options = RasterCreationOptions::from_iter(cog_creation_options(compress_level));

    let copied = source.create_copy(&driver, output_path, &options)?;
    drop(copied);
    drop(source);

    info!(path = %output_path.display(), "wrote cloud optimized GeoTIFF");
    Ok(())
}
