// src/convert.rs
use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::ConvertConfig;
use crate::error::{CogError, Result};
use crate::processing::{BoundingBox, CogProcessor, RasterReport};
use crate::stac::{
    read_document, rewrite_item, write_document, AssetRewrite, Catalog, Item, COG_MEDIA_TYPE,
};

pub const CATALOG_FILE_NAME: &str = "catalog.json";

/// Files written by a catalog conversion.
#[derive(Debug, Clone)]
pub struct ConvertOutputs {
    pub catalog: PathBuf,
    pub item: PathBuf,
    pub raster: PathBuf,
    pub report: RasterReport,
}

/// Convert the raster asset of the single item in `input_root/catalog.json` into a COG.
///
/// The result lands in `output_root/{input dir name}-cog/`: a verbatim catalog copy, the
/// item at the same relative path with its asset repointed, and `{raster stem}_cog.tif`
/// next to the item. Nothing already written is rolled back if a later step fails.
pub fn convert_catalog(
    input_root: &Path,
    output_root: &Path,
    bbox: Option<&BoundingBox>,
    config: &ConvertConfig,
) -> Result<ConvertOutputs> {
    let input_root = fs::canonicalize(input_root)
        .map_err(|_| CogError::not_found("input directory", input_root))?;

    let catalog_path = input_root.join(CATALOG_FILE_NAME);
    let catalog: Catalog = read_document(&catalog_path, "catalog")?;

    let item_link = catalog.item_link()?;
    let item_path = resolve_existing(&input_root, &item_link.href, "item")?;
    let item: Item = read_document(&item_path, "item")?;
    info!(item = %item_path.display(), id = %item.id, "resolved item");

    let asset = item
        .asset(&config.asset_key)?
        .ok_or_else(|| CogError::MissingAsset {
            key: config.asset_key.clone(),
            item_id: item.id.clone(),
        })?;
    let item_dir = item_path.parent().unwrap_or(input_root.as_path());
    let raster_path = resolve_existing(item_dir, &asset.href, "raster")?;

    let relative_item = item_path
        .strip_prefix(&input_root)
        .map_err(|_| CogError::ItemOutsideRoot {
            item: item_path.clone(),
            root: input_root.clone(),
        })?
        .to_path_buf();

    fs::create_dir_all(output_root).map_err(|e| CogError::io(output_root, e))?;
    let output_root = fs::canonicalize(output_root).map_err(|e| CogError::io(output_root, e))?;
    let out_root = output_root.join(format!("{}-cog", dir_name(&input_root)));
    fs::create_dir_all(&out_root).map_err(|e| CogError::io(&out_root, e))?;
    info!(path = %out_root.display(), "created output directory");

    let out_catalog_path = out_root.join(CATALOG_FILE_NAME);
    copy_file(&catalog_path, &out_catalog_path)?;

    let out_item_path = out_root.join(&relative_item);
    if let Some(parent) = out_item_path.parent() {
        fs::create_dir_all(parent).map_err(|e| CogError::io(parent, e))?;
    }
    copy_file(&item_path, &out_item_path)?;

    let raster_stem = file_stem(&raster_path);
    let cog_name = format!("{raster_stem}_cog.tif");
    let out_raster_path = out_item_path.with_file_name(&cog_name);
    info!(path = %out_raster_path.display(), "writing COG");

    let processor = CogProcessor::new(config.compress_level);
    let report = processor.process(&raster_path, &out_raster_path, bbox)?;

    let out_item: Item = read_document(&out_item_path, "item")?;
    let rewrite = AssetRewrite {
        source_key: config.asset_key.clone(),
        source_stem: raster_stem,
        new_basename: cog_name,
        media_type: COG_MEDIA_TYPE.to_string(),
        title: config.cog_title.clone(),
        role: config.cog_role.clone(),
        new_key: config.cog_asset_key.clone(),
    };
    let updated = rewrite_item(&out_item, &rewrite)?
        .with_self_href(&out_item_path.to_string_lossy());
    write_document(&out_item_path, &updated)?;
    info!(id = %updated.id, path = %out_item_path.display(), "item updated");

    Ok(ConvertOutputs {
        catalog: out_catalog_path,
        item: out_item_path,
        raster: out_raster_path,
        report,
    })
}

/// Convert a single GeoTIFF to a COG without touching any metadata documents.
pub fn convert_raster(
    input_path: &Path,
    output_path: &Path,
    bbox: Option<&BoundingBox>,
    config: &ConvertConfig,
) -> Result<RasterReport> {
    CogProcessor::new(config.compress_level).process(input_path, output_path, bbox)
}

fn resolve_existing(base: &Path, href: &str, what: &'static str) -> Result<PathBuf> {
    let path = base.join(href);
    if !path.exists() {
        return Err(CogError::not_found(what, &path));
    }
    fs::canonicalize(&path).map_err(|e| CogError::io(&path, e))
}

fn copy_file(from: &Path, to: &Path) -> Result<()> {
    fs::copy(from, to).map_err(|e| CogError::io(to, e))?;
    Ok(())
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "root".to_string())
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}
