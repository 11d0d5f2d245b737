//! Manual correction tables applied after parsing.
//!
//! Both tables are plain JSON objects keyed by SKU. They are loaded fresh
//! for every batch so edits take effect without restarting anything.

use crate::models::line::{LineItem, Pack};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Manual field corrections for a single SKU.
///
/// Only the fields present in the JSON entry are replaced; absent fields
/// keep whatever the parser produced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LineOverride {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pack: Option<Pack>,

    #[serde(rename = "qtyKg", skip_serializing_if = "Option::is_none")]
    pub qty_kg: Option<u32>,
}

/// Per-SKU override table, keyed by uppercased SKU.
#[derive(Debug, Clone, Default)]
pub struct OverrideTable {
    entries: HashMap<String, LineOverride>,
}

impl OverrideTable {
    /// Load an override table from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        let raw: HashMap<String, LineOverride> = serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        Ok(Self::from_entries(raw))
    }

    /// Build a table from already-deserialized entries.
    pub fn from_entries(raw: HashMap<String, LineOverride>) -> Self {
        let entries = raw
            .into_iter()
            .map(|(sku, entry)| (sku.to_uppercase(), entry))
            .collect();
        Self { entries }
    }

    pub fn get(&self, sku: &str) -> Option<&LineOverride> {
        self.entries.get(sku)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Per-SKU image sources, keyed by uppercased SKU.
///
/// Values are either local file paths or http(s) URLs.
#[derive(Debug, Clone, Default)]
pub struct ImageMap {
    entries: HashMap<String, String>,
}

impl ImageMap {
    /// Load an image map from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        let raw: HashMap<String, String> = serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        Ok(Self::from_entries(raw))
    }

    /// Build a map from already-deserialized entries.
    pub fn from_entries(raw: HashMap<String, String>) -> Self {
        let entries = raw
            .into_iter()
            .map(|(sku, source)| (sku.to_uppercase(), source))
            .collect();
        Self { entries }
    }

    pub fn get(&self, sku: &str) -> Option<&str> {
        self.entries.get(sku).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Apply an override table to parsed lines, returning the SKUs touched.
pub fn apply_overrides(lines: &mut [LineItem], table: &OverrideTable) -> Vec<String> {
    let mut touched = Vec::new();
    for line in lines.iter_mut() {
        let entry = match table.get(&line.sku) {
            Some(entry) => entry,
            None => continue,
        };
        if let Some(manufacturer) = &entry.manufacturer {
            line.manufacturer = manufacturer.clone();
        }
        if let Some(material) = &entry.material {
            line.material = material.clone();
        }
        if let Some(variant) = &entry.variant {
            line.variant = variant.clone();
        }
        if let Some(pack) = entry.pack {
            line.pack = pack;
        }
        if let Some(qty_kg) = entry.qty_kg {
            line.qty_kg = qty_kg;
        }
        touched.push(line.sku.clone());
    }
    touched
}
