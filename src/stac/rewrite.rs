// src/stac/rewrite.rs
use std::path::Path;

use serde_json::Map;

use crate::error::{CogError, Result};

use super::model::Item;

/// Media type of a Cloud Optimized GeoTIFF asset.
pub const COG_MEDIA_TYPE: &str = "image/tiff; application=geotiff; profile=cloud-optimized";

/// How to repoint an item's raster asset at its COG replacement.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetRewrite {
    /// Key of the asset to replace.
    pub source_key: String,
    /// Stem of the source raster file, used in the new item id.
    pub source_stem: String,
    /// File name of the COG, relative to the item document.
    pub new_basename: String,
    pub media_type: String,
    pub title: String,
    /// Role added to the asset's existing roles.
    pub role: String,
    /// Move the asset to this key when set and different from `source_key`.
    pub new_key: Option<String>,
}

/// Build the rewritten item. `item` itself is left untouched.
///
/// The id becomes `{id}-{source_stem}-cog`. The rewritten asset takes the source
/// asset's position in the map; every other asset is copied verbatim.
pub fn rewrite_item(item: &Item, rewrite: &AssetRewrite) -> Result<Item> {
    if !is_bare_file_name(&rewrite.new_basename) {
        return Err(CogError::InvalidAssetHref(rewrite.new_basename.clone()));
    }

    let mut asset = item
        .asset(&rewrite.source_key)?
        .ok_or_else(|| CogError::MissingAsset {
            key: rewrite.source_key.clone(),
            item_id: item.id.clone(),
        })?;

    asset.href = rewrite.new_basename.clone();
    asset.media_type = Some(rewrite.media_type.clone());
    asset.title = Some(rewrite.title.clone());
    asset.add_role(&rewrite.role);

    let key = rewrite
        .new_key
        .clone()
        .unwrap_or_else(|| rewrite.source_key.clone());
    let value = serde_json::to_value(&asset).map_err(|source| CogError::InvalidAsset {
        key: key.clone(),
        source,
    })?;

    let mut assets = Map::with_capacity(item.assets.len());
    for (name, original) in &item.assets {
        if *name == rewrite.source_key {
            assets.insert(key.clone(), value.clone());
        } else if *name != key {
            assets.insert(name.clone(), original.clone());
        }
    }

    let mut updated = item.clone();
    updated.assets = assets;
    updated.id = format!("{}-{}-cog", item.id, rewrite.source_stem);

    Ok(updated)
}

fn is_bare_file_name(name: &str) -> bool {
    !name.is_empty()
        && !name.contains(['/', '\\'])
        && name != "."
        && name != ".."
        && Path::new(name).file_name().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stac::model::Asset;
    use serde_json::json;

    fn item() -> Item {
        serde_json::from_value(json!({
            "id": "S1_scene",
            "links": [],
            "assets": {
                "TIFF": {
                    "href": "./data.tif",
                    "type": "image/tiff",
                    "title": "raw",
                    "roles": ["backscatter"],
                    "gsd": 10
                },
                "thumbnail": {"href": "thumb.png"}
            }
        }))
        .unwrap()
    }

    fn asset(item: &Item, key: &str) -> Asset {
        item.asset(key).unwrap().unwrap()
    }

    fn rewrite(new_key: Option<&str>) -> AssetRewrite {
        AssetRewrite {
            source_key: "TIFF".to_string(),
            source_stem: "data".to_string(),
            new_basename: "data_cog.tif".to_string(),
            media_type: COG_MEDIA_TYPE.to_string(),
            title: "OST-processed ARD COG".to_string(),
            role: "data".to_string(),
            new_key: new_key.map(str::to_string),
        }
    }

    #[test]
    fn test_asset_is_moved_to_new_key() {
        let original = item();
        let updated = rewrite_item(&original, &rewrite(Some("ost-ard-cog"))).unwrap();

        assert_eq!(updated.id, "S1_scene-data-cog");
        assert!(!updated.assets.contains_key("TIFF"));
        let asset = asset(&updated, "ost-ard-cog");
        assert_eq!(asset.href, "data_cog.tif");
        assert_eq!(asset.media_type.as_deref(), Some(COG_MEDIA_TYPE));
        assert_eq!(asset.title.as_deref(), Some("OST-processed ARD COG"));
        assert_eq!(
            asset.roles,
            Some(vec!["backscatter".to_string(), "data".to_string()])
        );
        assert_eq!(asset.extra["gsd"], json!(10));
        assert!(updated.assets.contains_key("thumbnail"));

        // source document is not modified
        assert_eq!(original, item());
    }

    #[test]
    fn test_asset_keeps_key_without_new_key() {
        let updated = rewrite_item(&item(), &rewrite(None)).unwrap();
        assert_eq!(updated.assets.len(), 2);
        assert_eq!(asset(&updated, "TIFF").href, "data_cog.tif");
    }

    #[test]
    fn test_same_key_is_not_duplicated() {
        let updated = rewrite_item(&item(), &rewrite(Some("TIFF"))).unwrap();
        assert_eq!(updated.assets.len(), 2);
        assert_eq!(asset(&updated, "TIFF").href, "data_cog.tif");
    }

    #[test]
    fn test_existing_role_not_repeated() {
        let mut rw = rewrite(None);
        rw.role = "backscatter".to_string();
        let updated = rewrite_item(&item(), &rw).unwrap();
        assert_eq!(
            asset(&updated, "TIFF").roles,
            Some(vec!["backscatter".to_string()])
        );
    }

    #[test]
    fn test_untouched_assets_keep_content_and_order() {
        let untouched = json!({"href": "meta.xml", "title": null, "roles": []});
        let original: Item = serde_json::from_value(json!({
            "id": "S1_scene",
            "assets": {
                "metadata": untouched.clone(),
                "TIFF": {"href": "./data.tif", "roles": []},
                "thumbnail": {"href": "thumb.png"}
            }
        }))
        .unwrap();

        let updated = rewrite_item(&original, &rewrite(Some("ost-ard-cog"))).unwrap();
        let keys: Vec<&str> = updated.assets.keys().map(String::as_str).collect();
        assert_eq!(keys, ["metadata", "ost-ard-cog", "thumbnail"]);
        assert_eq!(updated.assets["metadata"], untouched);
        assert_eq!(asset(&updated, "ost-ard-cog").roles, Some(vec!["data".to_string()]));
    }

    #[test]
    fn test_new_key_replaces_existing_asset() {
        let mut original = item();
        original
            .assets
            .insert("ost-ard-cog".to_string(), json!({"href": "stale_cog.tif"}));

        let updated = rewrite_item(&original, &rewrite(Some("ost-ard-cog"))).unwrap();
        let keys: Vec<&str> = updated.assets.keys().map(String::as_str).collect();
        assert_eq!(keys, ["ost-ard-cog", "thumbnail"]);
        assert_eq!(asset(&updated, "ost-ard-cog").href, "data_cog.tif");
    }

    #[test]
    fn test_missing_asset() {
        let mut rw = rewrite(None);
        rw.source_key = "COG".to_string();
        match rewrite_item(&item(), &rw) {
            Err(CogError::MissingAsset { key, item_id }) => {
                assert_eq!(key, "COG");
                assert_eq!(item_id, "S1_scene");
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn test_href_must_be_bare_file_name() {
        for bad in ["sub/data_cog.tif", "/abs/data_cog.tif", "..", "", "a\\b.tif"] {
            let mut rw = rewrite(None);
            rw.new_basename = bad.to_string();
            assert!(
                matches!(rewrite_item(&item(), &rw), Err(CogError::InvalidAssetHref(_))),
                "accepted {bad:?}"
            );
        }
    }
}
