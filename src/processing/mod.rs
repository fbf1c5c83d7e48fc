// src/processing/mod.rs
pub mod nodata;
pub mod pipeline;
pub mod window;

// Re-export main components
pub use pipeline::{CogProcessor, RasterReport};
pub use window::{BoundingBox, PixelWindow};
