// src/utils/mod.rs
pub mod gdal_ext;

pub use gdal_ext::TypedBuffer;
