// src/schema/parser.rs

//! Raw manifest documents as they appear on disk.
//!
//! These types mirror the JSON layout one-to-one and carry no invariants;
//! [`super::Schema`] validates them into the in-memory model.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

use super::{SchemaError, SchemaResult};

/// The root `packset.json` document
#[derive(Debug, Clone, Deserialize)]
pub struct RootManifest {
    /// Format version
    pub schema_version: Value,

    /// Feature id -> kind string (`"bool"` or `"toggle"`), in declaration order
    #[serde(default)]
    pub feature: Map<String, Value>,

    /// Feature id -> config entry, kept as raw JSON so errors can name the feature
    #[serde(default)]
    pub config: Map<String, Value>,

    /// Optional category grouping for display
    #[serde(default)]
    pub category: Option<CategorySection>,
}

/// The `category` section of the root manifest
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategorySection {
    /// Category ids in display order
    #[serde(default)]
    pub list: Vec<String>,

    /// Category id -> display data
    #[serde(default)]
    pub data: HashMap<String, CategoryData>,
}

/// Display data for one category
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryData {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// Feature ids shown in this category
    #[serde(default)]
    pub list: Vec<String>,
}

/// Per-feature configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigEntry {
    /// `"true"`/`"false"` for bool features, a state name for toggle features
    #[serde(default)]
    pub default: Option<DefaultValue>,

    /// Legal state names of a toggle feature
    #[serde(default)]
    pub scope: Vec<String>,

    /// File-level switches of a bool feature
    #[serde(default)]
    pub toggle: Vec<SwitchRef>,

    /// Sub-manifests of a toggle feature
    #[serde(default)]
    pub paths: Vec<SwitchRef>,
}

/// A `default` written either as a JSON boolean or as text
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum DefaultValue {
    Flag(bool),
    Text(String),
}

/// Reference from a config entry to a file or sub-manifest
#[derive(Debug, Clone, Deserialize)]
pub struct SwitchRef {
    #[serde(default)]
    pub id: Option<String>,

    /// `"bool"` (direct file) or `"toggle"` (sub-manifest); only used by bool features
    #[serde(default, rename = "type")]
    pub kind: Option<String>,

    pub file_path: String,
}

/// A sub-manifest document referenced from a config entry
#[derive(Debug, Clone, Deserialize)]
pub struct SubManifest {
    pub schema_version: Value,

    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub assets: Vec<RawAsset>,

    #[serde(default)]
    pub toggles: Vec<RawPair>,

    #[serde(default)]
    pub states: Vec<RawState>,
}

/// Single-location switch
#[derive(Debug, Clone, Deserialize)]
pub struct RawAsset {
    #[serde(default)]
    pub name: Option<String>,

    pub file_path: String,

    /// `"on"` or `"off"`, missing means `"off"`
    #[serde(default)]
    pub default: Option<String>,
}

/// Two-location switch
#[derive(Debug, Clone, Deserialize)]
pub struct RawPair {
    #[serde(default)]
    pub name: Option<String>,

    pub path: String,

    pub toggle_path: String,

    /// `"off"` or `"on"`, missing means `"off"`
    #[serde(default)]
    pub default: Option<String>,
}

/// One variant of a toggle sub-manifest
#[derive(Debug, Clone, Deserialize)]
pub struct RawState {
    pub name: String,
    pub file_path: String,
}

/// Parse the root manifest text
pub fn parse_root_manifest(text: &str) -> SchemaResult<RootManifest> {
    serde_json::from_str(text).map_err(|e| SchemaError::Json {
        path: super::ROOT_MANIFEST.to_string(),
        message: e.to_string(),
    })
}

/// Parse a sub-manifest document read from `path`
pub fn parse_sub_manifest(path: &str, text: &str) -> SchemaResult<SubManifest> {
    serde_json::from_str(text).map_err(|e| SchemaError::Json {
        path: path.to_string(),
        message: e.to_string(),
    })
}

/// Decode one feature's raw config entry
pub fn parse_config_entry(feature: &str, raw: &Value) -> SchemaResult<ConfigEntry> {
    ConfigEntry::deserialize(raw).map_err(|e| SchemaError::InvalidConfig {
        feature: feature.to_string(),
        message: e.to_string(),
    })
}
