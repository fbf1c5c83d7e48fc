// src/io/mod.rs
pub mod cog;
pub mod reader;
pub mod writer;

pub use reader::RasterSource;
pub use writer::{write_tiled, Profile};
