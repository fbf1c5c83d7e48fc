// src/stac/model.rs
//! Minimal serde models for the STAC catalog and item documents.
//!
//! Only the fields this tool reads or rewrites are typed. Everything else is kept in
//! the flattened `extra` maps so it survives a read/write round trip. Item assets stay
//! raw JSON in document order and are only parsed when looked up.

use std::fs;
use std::path::Path;

use itertools::Itertools;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{CogError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub rel: String,
    pub href: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Link {
    pub fn new(rel: &str, href: &str) -> Self {
        Self {
            rel: rel.to_string(),
            href: href.to_string(),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub links: Vec<Link>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Catalog {
    /// The one link with relation `item`. Zero or several such links is an error.
    pub fn item_link(&self) -> Result<&Link> {
        self.links
            .iter()
            .filter(|link| link.rel == "item")
            .exactly_one()
            .map_err(|links| CogError::InvalidCatalog {
                found: links.count(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub href: String,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Asset {
    pub fn new(href: &str) -> Self {
        Self {
            href: href.to_string(),
            media_type: None,
            title: None,
            roles: None,
            extra: Map::new(),
        }
    }

    /// Add `role` unless the asset already has it.
    pub fn add_role(&mut self, role: &str) {
        let roles = self.roles.get_or_insert_with(Vec::new);
        if !roles.iter().any(|r| r == role) {
            roles.push(role.to_string());
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,

    #[serde(default)]
    pub links: Vec<Link>,

    #[serde(default)]
    pub assets: Map<String, Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Item {
    /// The asset stored under `key`, parsed. `Ok(None)` when the item has no such key.
    pub fn asset(&self, key: &str) -> Result<Option<Asset>> {
        self.assets
            .get(key)
            .map(|value| {
                serde_json::from_value(value.clone()).map_err(|source| CogError::InvalidAsset {
                    key: key.to_string(),
                    source,
                })
            })
            .transpose()
    }

    pub fn self_href(&self) -> Option<&str> {
        self.links
            .iter()
            .find(|link| link.rel == "self")
            .map(|link| link.href.as_str())
    }

    /// Copy of the item whose `self` link points at `href`, adding the link if missing.
    pub fn with_self_href(&self, href: &str) -> Self {
        let mut item = self.clone();
        match item.links.iter_mut().find(|link| link.rel == "self") {
            Some(link) => link.href = href.to_string(),
            None => item.links.push(Link::new("self", href)),
        }
        item
    }
}

/// Read and parse a JSON document. `what` names the document in the not-found error.
pub fn read_document<T: DeserializeOwned>(path: &Path, what: &'static str) -> Result<T> {
    if !path.exists() {
        return Err(CogError::not_found(what, path));
    }
    let content = fs::read_to_string(path).map_err(|e| CogError::io(path, e))?;
    serde_json::from_str(&content).map_err(|e| CogError::json(path, e))
}

/// Serialize `document` as pretty JSON to `path`, replacing any existing file.
pub fn write_document<T: Serialize>(path: &Path, document: &T) -> Result<()> {
    let mut content = serde_json::to_string_pretty(document).map_err(|e| CogError::json(path, e))?;
    content.push('\n');
    fs::write(path, content).map_err(|e| CogError::io(path, e))
}
