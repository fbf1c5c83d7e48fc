// src/config.rs
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CogError, Result};

/// Tunables for a conversion run, optionally loaded from a JSON file.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ConvertConfig {
    /// Key of the raster asset in the input item.
    #[serde(default = "default_asset_key")]
    pub asset_key: String,
    /// Key the COG asset is stored under; `null` keeps `asset_key`.
    #[serde(default = "default_cog_asset_key")]
    pub cog_asset_key: Option<String>,
    #[serde(default = "default_cog_title")]
    pub cog_title: String,
    #[serde(default = "default_cog_role")]
    pub cog_role: String,
    #[serde(default = "default_compress_level")]
    pub compress_level: u8,
}

fn default_asset_key() -> String {
    "TIFF".to_string()
}

fn default_cog_asset_key() -> Option<String> {
    Some("ost-ard-cog".to_string())
}

fn default_cog_title() -> String {
    "OST-processed ARD COG".to_string()
}

fn default_cog_role() -> String {
    "data".to_string()
}

fn default_compress_level() -> u8 {
    6
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            asset_key: default_asset_key(),
            cog_asset_key: default_cog_asset_key(),
            cog_title: default_cog_title(),
            cog_role: default_cog_role(),
            compress_level: default_compress_level(),
        }
    }
}

impl ConvertConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CogError::not_found("config file", path));
        }
        let content = fs::read_to_string(path).map_err(|e| CogError::io(path, e))?;
        let config: ConvertConfig =
            serde_json::from_str(&content).map_err(|e| CogError::json(path, e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.asset_key.is_empty() {
            return Err(CogError::Config("asset_key must not be empty".to_string()));
        }
        if matches!(&self.cog_asset_key, Some(key) if key.is_empty()) {
            return Err(CogError::Config(
                "cog_asset_key must not be empty".to_string(),
            ));
        }
        if !(1..=9).contains(&self.compress_level) {
            return Err(CogError::Config(format!(
                "compress_level must be between 1 and 9, got {}",
                self.compress_level
            )));
        }
        Ok(())
    }
}
