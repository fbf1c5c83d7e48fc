// src/lib.rs
pub mod cli;
pub mod config;
pub mod convert;
pub mod error;
pub mod io;
pub mod processing;
pub mod stac;
pub mod utils;

pub use config::ConvertConfig;
pub use convert::{convert_catalog, convert_raster, ConvertOutputs};
pub use error::{CogError, Result};
pub use processing::BoundingBox;

// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
