// src/stac/mod.rs
pub mod model;
pub mod rewrite;

pub use model::{read_document, write_document, Asset, Catalog, Item, Link};
pub use rewrite::{rewrite_item, AssetRewrite, COG_MEDIA_TYPE};
