// src/error.rs
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors produced while converting a catalog's raster to a COG.
#[derive(Error, Debug)]
pub enum CogError {
    #[error("{what} not found at: {}", path.display())]
    NotFound { what: &'static str, path: PathBuf },

    #[error("expected exactly 1 item link in catalog, found {found}")]
    InvalidCatalog { found: usize },

    #[error("asset '{key}' not found in item '{item_id}'")]
    MissingAsset { key: String, item_id: String },

    #[error("bounding box {bbox} does not intersect the {width}x{height} raster")]
    EmptyWindow {
        bbox: String,
        width: usize,
        height: usize,
    },

    #[error("invalid bounding box: {0}")]
    InvalidBoundingBox(String),

    #[error("geotransform {0:?} is not invertible")]
    DegenerateTransform([f64; 6]),

    #[error("unsupported raster data type: {0}")]
    UnsupportedDataType(String),

    #[error("asset '{key}' is not a valid STAC asset: {source}")]
    InvalidAsset {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("asset href must be a bare file name, got '{0}'")]
    InvalidAssetHref(String),

    #[error("item {} is not located under the input directory {}", item.display(), root.display())]
    ItemOutsideRoot { item: PathBuf, root: PathBuf },

    #[error("refusing to overwrite input raster {} with {}", input.display(), target.display())]
    InputClobbered { input: PathBuf, target: PathBuf },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse JSON document {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl CogError {
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        CogError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn json(path: &Path, source: serde_json::Error) -> Self {
        CogError::Json {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn not_found(what: &'static str, path: &Path) -> Self {
        CogError::NotFound {
            what,
            path: path.to_path_buf(),
        }
    }
}

/// Result alias for conversion operations.
pub type Result<T> = std::result::Result<T, CogError>;
