// src/schema/mod.rs

//! Packset schema - the declarative description of a pack's features
//!
//! A resource pack that supports Packset carries a root manifest,
//! `packset.json`, at its top level. The root manifest declares features and
//! points each one at the files it controls, either directly or through
//! sub-manifests.
//!
//! # Example packset.json
//!
//! ```json
//! {
//!   "schema_version": 1,
//!   "feature": { "low_fire": "bool", "hud_style": "toggle" },
//!   "config": {
//!     "low_fire": {
//!       "default": "false",
//!       "toggle": [
//!         { "type": "bool", "file_path": "assets/minecraft/textures/fire_0.png" },
//!         { "type": "toggle", "file_path": "packset/low_fire.json" }
//!       ]
//!     },
//!     "hud_style": {
//!       "default": "classic",
//!       "scope": ["classic", "modern"],
//!       "paths": [{ "id": "hotbar", "file_path": "packset/hud.json" }]
//!     }
//!   },
//!   "category": {
//!     "list": ["visual"],
//!     "data": { "visual": { "name": "Visual", "description": "", "list": ["low_fire", "hud_style"] } }
//!   }
//! }
//! ```
//!
//! Loading is all-or-nothing: any structural problem yields a
//! [`SchemaError`] and no schema.

pub mod parser;
pub mod state;

pub use parser::{RootManifest, SubManifest, parse_root_manifest, parse_sub_manifest};
pub use state::{CurrentState, InconsistentStateError, Inconsistency, resolve_feature, resolve_state};

use crate::container::{Container, is_marked};
use crate::error::Error;
use crate::filesystem::path::sanitize_path;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

use parser::{ConfigEntry, DefaultValue, SwitchRef, parse_config_entry};

/// File name of the root manifest at the top of the pack
pub const ROOT_MANIFEST: &str = "packset.json";

/// The only manifest format version understood
pub const SCHEMA_VERSION: i64 = 1;

/// Errors in manifest structure, or requests the schema cannot satisfy
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("No packset.json found at the top level of the pack")]
    MissingRootManifest,

    #[error("Failed to read {path}: {message}")]
    Read { path: String, message: String },

    #[error("Invalid JSON in {path}: {message}")]
    Json { path: String, message: String },

    #[error("Unsupported schema_version in {path}: expected 1, found {found}")]
    UnsupportedVersion { path: String, found: String },

    #[error("Feature '{feature}' has unknown kind '{kind}' (expected bool or toggle)")]
    UnknownKind { feature: String, kind: String },

    #[error("Feature '{0}' has no config entry")]
    MissingConfig(String),

    #[error("Config entry '{0}' does not match any declared feature")]
    UndeclaredConfig(String),

    #[error("Invalid config for feature '{feature}': {message}")]
    InvalidConfig { feature: String, message: String },

    #[error("Feature '{feature}' has invalid default '{value}'")]
    InvalidDefault { feature: String, value: String },

    #[error("Toggle feature '{0}' has an empty scope")]
    EmptyScope(String),

    #[error("Toggle feature '{feature}' lists state '{state}' more than once")]
    DuplicateScopeEntry { feature: String, state: String },

    #[error("Feature '{feature}' references unknown switch type '{kind}' ({path})")]
    UnknownSwitchType { feature: String, kind: String, path: String },

    #[error("Sub-manifest {path} referenced by feature '{feature}' does not exist")]
    MissingSubManifest { feature: String, path: String },

    #[error("Sub-manifest {path} has type '{found}' but feature '{feature}' needs '{expected}'")]
    SubManifestKindMismatch {
        feature: String,
        path: String,
        expected: FeatureKind,
        found: String,
    },

    #[error("Sub-manifest {path} declares no states")]
    EmptyVariants { path: String },

    #[error("Sub-manifest {path} declares state '{state}' more than once")]
    DuplicateVariant { path: String, state: String },

    #[error("Sub-manifest {path} declares state '{state}' which is not in the scope of '{feature}'")]
    VariantNotInScope { feature: String, path: String, state: String },

    #[error("Sub-manifest {path} starts with state '{found}' but the default of '{feature}' is '{expected}'")]
    PrimaryNotDefault {
        feature: String,
        path: String,
        expected: String,
        found: String,
    },

    #[error("State '{state}' of feature '{feature}' has no variant in any sub-manifest")]
    UnobservableState { feature: String, state: String },

    #[error("Feature '{0}' does not control any files")]
    NoSwitches(String),

    #[error("Invalid path '{path}' in {source_file}: {message}")]
    InvalidPath {
        path: String,
        source_file: String,
        message: String,
    },

    #[error("Path {path} is declared by both {first} and {second}")]
    DuplicatePath {
        path: String,
        first: String,
        second: String,
    },

    #[error("Category '{0}' is listed but has no data entry")]
    UnknownCategory(String),

    #[error("Category '{category}' lists unknown feature '{feature}'")]
    UnknownFeatureInCategory { category: String, feature: String },

    #[error("Unknown feature '{0}'")]
    UnknownFeature(String),

    #[error("Invalid value '{value}' for feature '{feature}' (expected {expected})")]
    InvalidValue {
        feature: String,
        value: String,
        expected: String,
    },
}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Kind of a feature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    /// On/off switch
    Bool,
    /// Pick one state out of a scope
    Toggle,
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureKind::Bool => write!(f, "bool"),
            FeatureKind::Toggle => write!(f, "toggle"),
        }
    }
}

impl FromStr for FeatureKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bool" => Ok(FeatureKind::Bool),
            "toggle" => Ok(FeatureKind::Toggle),
            other => Err(other.to_string()),
        }
    }
}

/// Value of a feature
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FeatureValue {
    Bool(bool),
    Toggle(String),
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Bool(b) => write!(f, "{}", b),
            FeatureValue::Toggle(name) => write!(f, "{}", name),
        }
    }
}

/// Resting state of a single file-level switch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    On,
    Off,
}

impl Polarity {
    fn parse(raw: Option<&str>) -> Option<Self> {
        match raw.map(|s| s.trim().to_ascii_lowercase()) {
            None => Some(Polarity::Off),
            Some(s) if s == "off" => Some(Polarity::Off),
            Some(s) if s == "on" => Some(Polarity::On),
            Some(_) => None,
        }
    }

    /// Whether the switch is on while its feature is engaged or not
    pub fn when(self, engaged: bool) -> bool {
        (self == Polarity::On) != engaged
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Polarity::On => write!(f, "on"),
            Polarity::Off => write!(f, "off"),
        }
    }
}

/// Single-location switch: visible at `path` or hidden at `path.packset.old`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub name: String,
    pub path: String,
    pub default: Polarity,
    /// Manifest that declared this asset
    pub source: String,
}

/// Two-location switch: exactly one of `path` and `toggle_path` is unmarked
///
/// `on` means `toggle_path` is the active side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pair {
    pub name: String,
    pub path: String,
    pub toggle_path: String,
    pub default: Polarity,
    pub source: String,
}

/// One candidate file of a variant group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    pub name: String,
    /// Where this variant lives while it does not occupy the slot
    pub path: String,
}

/// N variants sharing one slot; index 0 is the primary variant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantGroup {
    pub name: String,
    pub variants: Vec<Variant>,
    pub source: String,
}

impl VariantGroup {
    /// The primary variant, whose path is the slot
    pub fn primary(&self) -> &Variant {
        &self.variants[0]
    }

    /// The shared slot path
    pub fn slot(&self) -> &str {
        &self.primary().path
    }

    /// Look up a variant by state name
    pub fn variant(&self, name: &str) -> Option<&Variant> {
        self.variants.iter().find(|v| v.name == name)
    }

    /// Which variant occupies the slot when the feature has `value`
    ///
    /// Groups without a variant for `value` keep their primary in place.
    pub fn occupant_for(&self, value: &str) -> &Variant {
        self.variant(value).unwrap_or_else(|| self.primary())
    }

    /// Non-primary variants
    pub fn alternates(&self) -> &[Variant] {
        &self.variants[1..]
    }
}

/// One exclusivity shape bound to a feature
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExclusiveGroup {
    Asset(Asset),
    Pair(Pair),
    VariantGroup(VariantGroup),
}

impl ExclusiveGroup {
    /// Physical paths this group claims
    pub fn paths(&self) -> Vec<&str> {
        match self {
            ExclusiveGroup::Asset(asset) => vec![asset.path.as_str()],
            ExclusiveGroup::Pair(pair) => vec![pair.path.as_str(), pair.toggle_path.as_str()],
            ExclusiveGroup::VariantGroup(group) => {
                group.variants.iter().map(|v| v.path.as_str()).collect()
            }
        }
    }

    /// Manifest that declared this group
    pub fn source(&self) -> &str {
        match self {
            ExclusiveGroup::Asset(asset) => &asset.source,
            ExclusiveGroup::Pair(pair) => &pair.source,
            ExclusiveGroup::VariantGroup(group) => &group.source,
        }
    }

    /// Display name
    pub fn name(&self) -> &str {
        match self {
            ExclusiveGroup::Asset(asset) => &asset.name,
            ExclusiveGroup::Pair(pair) => &pair.name,
            ExclusiveGroup::VariantGroup(group) => &group.name,
        }
    }
}

/// A user-configurable feature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature {
    pub id: String,
    pub kind: FeatureKind,
    pub default: FeatureValue,
    /// Legal states of a toggle feature, empty for bool features
    pub scope: Vec<String>,
    /// File-level switches in manifest order
    pub groups: Vec<ExclusiveGroup>,
}

impl Feature {
    /// Parse a requested value for this feature
    ///
    /// Bool features accept `true`/`false` in any case; toggle features
    /// accept any member of their scope.
    pub fn parse_value(&self, raw: &str) -> SchemaResult<FeatureValue> {
        match self.kind {
            FeatureKind::Bool => parse_bool(raw)
                .map(FeatureValue::Bool)
                .ok_or_else(|| SchemaError::InvalidValue {
                    feature: self.id.clone(),
                    value: raw.to_string(),
                    expected: "true or false".to_string(),
                }),
            FeatureKind::Toggle => {
                let raw = raw.trim();
                if self.scope.iter().any(|s| s == raw) {
                    Ok(FeatureValue::Toggle(raw.to_string()))
                } else {
                    Err(SchemaError::InvalidValue {
                        feature: self.id.clone(),
                        value: raw.to_string(),
                        expected: format!("one of [{}]", self.scope.join(", ")),
                    })
                }
            }
        }
    }

    /// Whether `value` differs from the default
    pub fn is_engaged(&self, value: &FeatureValue) -> bool {
        *value != self.default
    }
}

/// A display group of features
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub description: String,
    pub features: Vec<String>,
}

/// A validated Packset schema
#[derive(Debug, Clone)]
pub struct Schema {
    features: Vec<Feature>,
    categories: Option<Vec<Category>>,
}

impl Schema {
    /// All features in manifest order
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Look up a feature by id
    pub fn feature(&self, id: &str) -> Option<&Feature> {
        self.features.iter().find(|f| f.id == id)
    }

    /// Look up a feature by id, failing with [`SchemaError::UnknownFeature`]
    pub fn require_feature(&self, id: &str) -> SchemaResult<&Feature> {
        self.feature(id)
            .ok_or_else(|| SchemaError::UnknownFeature(id.to_string()))
    }

    /// Declared categories, if the manifest has a `category` section
    pub fn categories(&self) -> Option<&[Category]> {
        self.categories.as_deref()
    }

    /// Look up a category by id
    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.as_ref()?.iter().find(|c| c.id == id)
    }

    /// Features grouped for display
    ///
    /// Without categories all features form one implicit group (`None`).
    /// With categories, features not listed anywhere trail in an implicit
    /// group so nothing is hidden.
    pub fn display_groups(&self) -> Vec<(Option<&Category>, Vec<&Feature>)> {
        let Some(categories) = &self.categories else {
            return vec![(None, self.features.iter().collect())];
        };

        let mut listed: HashSet<&str> = HashSet::new();
        let mut groups = Vec::new();
        for category in categories {
            let features: Vec<&Feature> = category
                .features
                .iter()
                .filter_map(|id| self.feature(id))
                .collect();
            listed.extend(category.features.iter().map(|s| s.as_str()));
            groups.push((Some(category), features));
        }

        let rest: Vec<&Feature> = self
            .features
            .iter()
            .filter(|f| !listed.contains(f.id.as_str()))
            .collect();
        if !rest.is_empty() {
            groups.push((None, rest));
        }

        groups
    }

    /// Build a schema from manifest text
    ///
    /// `read` fetches sub-manifests by pack-relative path.
    pub fn from_manifests<F>(root_text: &str, mut read: F) -> SchemaResult<Self>
    where
        F: FnMut(&str) -> crate::Result<Vec<u8>>,
    {
        let root = parse_root_manifest(root_text)?;
        SchemaBuilder::new(&mut read).build(root)
    }
}

/// Load and validate the schema of a pack
pub fn load_schema(container: &dyn Container) -> SchemaResult<Schema> {
    let root_path = find_root_manifest(container)?;
    let root_bytes = container.read(&root_path).map_err(|e| SchemaError::Read {
        path: root_path.clone(),
        message: e.to_string(),
    })?;
    let root_text = decode_text(&root_path, &root_bytes)?;

    let schema = Schema::from_manifests(&root_text, |path| container.read(path))?;
    debug!(
        "Loaded schema from {}: {} features",
        container.describe(),
        schema.features.len()
    );
    Ok(schema)
}

/// Locate the root manifest, accepting any case for archive entries
fn find_root_manifest(container: &dyn Container) -> SchemaResult<String> {
    let read_error = |e: Error| SchemaError::Read {
        path: ROOT_MANIFEST.to_string(),
        message: e.to_string(),
    };

    if container.exists(ROOT_MANIFEST).map_err(read_error)? {
        return Ok(ROOT_MANIFEST.to_string());
    }

    let top_level = container.list("").map_err(read_error)?;
    top_level
        .into_iter()
        .find(|name| !name.contains('/') && name.eq_ignore_ascii_case(ROOT_MANIFEST))
        .ok_or(SchemaError::MissingRootManifest)
}

fn decode_text(path: &str, bytes: &[u8]) -> SchemaResult<String> {
    let text = std::str::from_utf8(bytes).map_err(|e| SchemaError::Json {
        path: path.to_string(),
        message: e.to_string(),
    })?;
    Ok(text.trim_start_matches('\u{feff}').to_string())
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

fn check_version(path: &str, version: &Value) -> SchemaResult<()> {
    if version.as_i64() == Some(SCHEMA_VERSION) {
        Ok(())
    } else {
        Err(SchemaError::UnsupportedVersion {
            path: path.to_string(),
            found: version.to_string(),
        })
    }
}

/// Validates raw manifests into a [`Schema`]
struct SchemaBuilder<'a> {
    read: &'a mut dyn FnMut(&str) -> crate::Result<Vec<u8>>,
    /// Physical path -> description of the switch that claimed it
    claimed: HashMap<String, String>,
}

impl<'a> SchemaBuilder<'a> {
    fn new(read: &'a mut dyn FnMut(&str) -> crate::Result<Vec<u8>>) -> Self {
        Self {
            read,
            claimed: HashMap::new(),
        }
    }

    fn build(mut self, root: RootManifest) -> SchemaResult<Schema> {
        check_version(ROOT_MANIFEST, &root.schema_version)?;

        for id in root.config.keys() {
            if !root.feature.contains_key(id) {
                return Err(SchemaError::UndeclaredConfig(id.clone()));
            }
        }

        let mut features = Vec::with_capacity(root.feature.len());
        for (id, kind) in &root.feature {
            let kind = kind
                .as_str()
                .ok_or_else(|| kind.to_string())
                .and_then(FeatureKind::from_str)
                .map_err(|kind| SchemaError::UnknownKind {
                    feature: id.clone(),
                    kind,
                })?;

            let raw = root
                .config
                .get(id)
                .ok_or_else(|| SchemaError::MissingConfig(id.clone()))?;
            let entry = parse_config_entry(id, raw)?;

            let feature = match kind {
                FeatureKind::Bool => self.build_bool(id, &entry)?,
                FeatureKind::Toggle => self.build_toggle(id, &entry)?,
            };

            for group in &feature.groups {
                self.claim(&feature.id, group)?;
            }
            features.push(feature);
        }

        let categories = match root.category {
            Some(section) => Some(build_categories(section, &features)?),
            None => None,
        };

        Ok(Schema {
            features,
            categories,
        })
    }

    fn build_bool(&mut self, id: &str, entry: &ConfigEntry) -> SchemaResult<Feature> {
        let default = match &entry.default {
            None => false,
            Some(DefaultValue::Flag(b)) => *b,
            Some(DefaultValue::Text(text)) => {
                parse_bool(text).ok_or_else(|| SchemaError::InvalidDefault {
                    feature: id.to_string(),
                    value: text.clone(),
                })?
            }
        };

        if !entry.paths.is_empty() || !entry.scope.is_empty() {
            return Err(SchemaError::InvalidConfig {
                feature: id.to_string(),
                message: "bool features use 'toggle', not 'paths' or 'scope'".to_string(),
            });
        }

        let mut groups = Vec::new();
        for switch in &entry.toggle {
            let kind = switch.kind.as_deref().unwrap_or("").trim().to_ascii_lowercase();
            match kind.as_str() {
                "bool" => {
                    let path = checked_path(&switch.file_path, ROOT_MANIFEST)?;
                    groups.push(ExclusiveGroup::Asset(Asset {
                        name: switch.id.clone().unwrap_or_else(|| path.clone()),
                        path,
                        default: Polarity::On,
                        source: ROOT_MANIFEST.to_string(),
                    }));
                }
                "toggle" => {
                    let (source, sub) = self.load_sub_manifest(id, switch, FeatureKind::Bool)?;
                    groups.extend(bool_groups(id, &source, sub)?);
                }
                _ => {
                    return Err(SchemaError::UnknownSwitchType {
                        feature: id.to_string(),
                        kind,
                        path: switch.file_path.clone(),
                    });
                }
            }
        }

        if groups.is_empty() {
            return Err(SchemaError::NoSwitches(id.to_string()));
        }

        Ok(Feature {
            id: id.to_string(),
            kind: FeatureKind::Bool,
            default: FeatureValue::Bool(default),
            scope: Vec::new(),
            groups,
        })
    }

    fn build_toggle(&mut self, id: &str, entry: &ConfigEntry) -> SchemaResult<Feature> {
        if entry.scope.is_empty() {
            return Err(SchemaError::EmptyScope(id.to_string()));
        }
        let mut seen = HashSet::new();
        for state in &entry.scope {
            if !seen.insert(state.as_str()) {
                return Err(SchemaError::DuplicateScopeEntry {
                    feature: id.to_string(),
                    state: state.clone(),
                });
            }
        }

        let default = match &entry.default {
            None => entry.scope[0].clone(),
            Some(DefaultValue::Text(text)) if entry.scope.iter().any(|s| s == text.trim()) => {
                text.trim().to_string()
            }
            Some(DefaultValue::Text(text)) => {
                return Err(SchemaError::InvalidDefault {
                    feature: id.to_string(),
                    value: text.clone(),
                });
            }
            Some(DefaultValue::Flag(b)) => {
                return Err(SchemaError::InvalidDefault {
                    feature: id.to_string(),
                    value: b.to_string(),
                });
            }
        };

        if !entry.toggle.is_empty() {
            return Err(SchemaError::InvalidConfig {
                feature: id.to_string(),
                message: "toggle features use 'paths', not 'toggle'".to_string(),
            });
        }

        let mut groups = Vec::new();
        for switch in &entry.paths {
            let (source, sub) = self.load_sub_manifest(id, switch, FeatureKind::Toggle)?;
            let name = switch.id.clone().unwrap_or_else(|| source.clone());
            groups.push(ExclusiveGroup::VariantGroup(variant_group(
                id,
                &entry.scope,
                &default,
                name,
                &source,
                sub,
            )?));
        }

        if groups.is_empty() {
            return Err(SchemaError::NoSwitches(id.to_string()));
        }

        for state in entry.scope.iter().filter(|s| **s != default) {
            let observable = groups.iter().any(|g| match g {
                ExclusiveGroup::VariantGroup(group) => group.variant(state).is_some(),
                _ => false,
            });
            if !observable {
                return Err(SchemaError::UnobservableState {
                    feature: id.to_string(),
                    state: state.clone(),
                });
            }
        }

        Ok(Feature {
            id: id.to_string(),
            kind: FeatureKind::Toggle,
            default: FeatureValue::Toggle(default),
            scope: entry.scope.clone(),
            groups,
        })
    }

    fn load_sub_manifest(
        &mut self,
        feature: &str,
        switch: &SwitchRef,
        expected: FeatureKind,
    ) -> SchemaResult<(String, SubManifest)> {
        let path = checked_path(&switch.file_path, ROOT_MANIFEST)?;

        let bytes = match (self.read)(&path) {
            Ok(bytes) => bytes,
            Err(Error::NotFound(_)) => {
                return Err(SchemaError::MissingSubManifest {
                    feature: feature.to_string(),
                    path,
                });
            }
            Err(e) => {
                return Err(SchemaError::Read {
                    path,
                    message: e.to_string(),
                });
            }
        };

        let text = decode_text(&path, &bytes)?;
        let sub = parse_sub_manifest(&path, &text)?;
        check_version(&path, &sub.schema_version)?;

        if sub.kind.trim().parse::<FeatureKind>().ok() != Some(expected) {
            return Err(SchemaError::SubManifestKindMismatch {
                feature: feature.to_string(),
                path,
                expected,
                found: sub.kind.clone(),
            });
        }

        debug!("Loaded sub-manifest {} for feature '{}'", path, feature);
        Ok((path, sub))
    }

    fn claim(&mut self, feature: &str, group: &ExclusiveGroup) -> SchemaResult<()> {
        let owner = format!("'{}' ({})", feature, group.source());
        for path in group.paths() {
            if let Some(first) = self.claimed.get(path) {
                return Err(SchemaError::DuplicatePath {
                    path: path.to_string(),
                    first: first.clone(),
                    second: owner,
                });
            }
            self.claimed.insert(path.to_string(), owner.clone());
        }
        Ok(())
    }
}

/// Sanitize a declared path and reject marker-suffixed ones
fn checked_path(raw: &str, source: &str) -> SchemaResult<String> {
    let path = sanitize_path(raw).map_err(|e| SchemaError::InvalidPath {
        path: raw.to_string(),
        source_file: source.to_string(),
        message: e.to_string(),
    })?;

    if is_marked(&path) {
        return Err(SchemaError::InvalidPath {
            path: raw.to_string(),
            source_file: source.to_string(),
            message: "declared paths must not carry the .packset.old marker".to_string(),
        });
    }

    Ok(path)
}

fn bool_groups(feature: &str, source: &str, sub: SubManifest) -> SchemaResult<Vec<ExclusiveGroup>> {
    let mut groups = Vec::with_capacity(sub.assets.len() + sub.toggles.len());

    for raw in sub.assets {
        let path = checked_path(&raw.file_path, source)?;
        let default = Polarity::parse(raw.default.as_deref()).ok_or_else(|| {
            SchemaError::InvalidConfig {
                feature: feature.to_string(),
                message: format!("{}: asset {} has default {:?}, expected on or off", source, path, raw.default),
            }
        })?;
        groups.push(ExclusiveGroup::Asset(Asset {
            name: raw.name.unwrap_or_else(|| path.clone()),
            path,
            default,
            source: source.to_string(),
        }));
    }

    for raw in sub.toggles {
        let path = checked_path(&raw.path, source)?;
        let toggle_path = checked_path(&raw.toggle_path, source)?;
        let default = Polarity::parse(raw.default.as_deref()).ok_or_else(|| {
            SchemaError::InvalidConfig {
                feature: feature.to_string(),
                message: format!("{}: toggle {} has default {:?}, expected off or on", source, path, raw.default),
            }
        })?;
        groups.push(ExclusiveGroup::Pair(Pair {
            name: raw.name.unwrap_or_else(|| path.clone()),
            path,
            toggle_path,
            default,
            source: source.to_string(),
        }));
    }

    Ok(groups)
}

fn variant_group(
    feature: &str,
    scope: &[String],
    default: &str,
    name: String,
    source: &str,
    sub: SubManifest,
) -> SchemaResult<VariantGroup> {
    if sub.states.is_empty() {
        return Err(SchemaError::EmptyVariants {
            path: source.to_string(),
        });
    }

    let mut seen = HashSet::new();
    let mut variants = Vec::with_capacity(sub.states.len());
    for state in sub.states {
        let state_name = state.name.trim().to_string();
        if !scope.iter().any(|s| *s == state_name) {
            return Err(SchemaError::VariantNotInScope {
                feature: feature.to_string(),
                path: source.to_string(),
                state: state_name,
            });
        }
        if !seen.insert(state_name.clone()) {
            return Err(SchemaError::DuplicateVariant {
                path: source.to_string(),
                state: state_name,
            });
        }
        variants.push(Variant {
            name: state_name,
            path: checked_path(&state.file_path, source)?,
        });
    }

    if variants[0].name != default {
        return Err(SchemaError::PrimaryNotDefault {
            feature: feature.to_string(),
            path: source.to_string(),
            expected: default.to_string(),
            found: variants[0].name.clone(),
        });
    }

    Ok(VariantGroup {
        name,
        variants,
        source: source.to_string(),
    })
}

fn build_categories(
    section: parser::CategorySection,
    features: &[Feature],
) -> SchemaResult<Vec<Category>> {
    let mut data = section.data;
    let mut categories = Vec::with_capacity(section.list.len());

    for id in section.list {
        let entry = data
            .remove(&id)
            .ok_or_else(|| SchemaError::UnknownCategory(id.clone()))?;

        for feature in &entry.list {
            if !features.iter().any(|f| f.id == *feature) {
                return Err(SchemaError::UnknownFeatureInCategory {
                    category: id.clone(),
                    feature: feature.clone(),
                });
            }
        }

        categories.push(Category {
            name: entry.name.unwrap_or_else(|| id.clone()),
            description: entry.description.unwrap_or_default(),
            features: entry.list,
            id,
        });
    }

    Ok(categories)
}
