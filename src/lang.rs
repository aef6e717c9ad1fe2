// src/lang.rs

//! Display-label overlays
//!
//! A pack may ship `packset_lang/<code>.json` files, each a flat map from
//! label key to text:
//!
//! ```json
//! {
//!   "category.visual.name": "Visuel",
//!   "feature.low_fire": "Feu bas"
//! }
//! ```
//!
//! Lookups fall back to the manifest literal (category name or description,
//! or the feature id) when the selected language has no entry.

use crate::container::Container;
use crate::error::Result;
use crate::schema::Schema;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// Directory holding language files
pub const LANG_DIR: &str = "packset_lang/";

/// Language used when none is requested
pub const DEFAULT_LANG: &str = "en_us";

/// A key in a language file
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LabelKey {
    CategoryName(String),
    CategoryDescription(String),
    Feature(String),
}

impl fmt::Display for LabelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelKey::CategoryName(id) => write!(f, "category.{}.name", id),
            LabelKey::CategoryDescription(id) => write!(f, "category.{}.description", id),
            LabelKey::Feature(id) => write!(f, "feature.{}", id),
        }
    }
}

impl FromStr for LabelKey {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if let Some(id) = s.strip_prefix("feature.")
            && !id.is_empty()
        {
            return Ok(LabelKey::Feature(id.to_string()));
        }

        if let Some(rest) = s.strip_prefix("category.") {
            if let Some(id) = rest.strip_suffix(".name")
                && !id.is_empty()
            {
                return Ok(LabelKey::CategoryName(id.to_string()));
            }
            if let Some(id) = rest.strip_suffix(".description")
                && !id.is_empty()
            {
                return Ok(LabelKey::CategoryDescription(id.to_string()));
            }
        }

        Err(format!("unrecognized label key: {}", s))
    }
}

/// All language files of a pack
#[derive(Debug, Clone, Default)]
pub struct LangOverlay {
    languages: BTreeMap<String, HashMap<String, String>>,
}

impl LangOverlay {
    /// Read every `packset_lang/<code>.json`
    ///
    /// Files that are not valid JSON string maps are skipped with a warning.
    pub fn load(container: &dyn Container) -> Result<Self> {
        let mut languages = BTreeMap::new();

        for path in container.list(LANG_DIR)? {
            let Some(code) = path
                .strip_prefix(LANG_DIR)
                .and_then(|name| name.strip_suffix(".json"))
                .filter(|code| !code.is_empty() && !code.contains('/'))
            else {
                continue;
            };

            let bytes = container.read(&path)?;
            match serde_json::from_slice::<HashMap<String, String>>(&bytes) {
                Ok(strings) => {
                    debug!("Loaded {} labels for language {}", strings.len(), code);
                    languages.insert(code.to_ascii_lowercase(), strings);
                }
                Err(e) => warn!("Skipping language file {}: {}", path, e),
            }
        }

        Ok(Self { languages })
    }

    /// Language codes present in the pack, sorted
    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.languages.keys().map(|k| k.as_str())
    }

    /// Raw overlay lookup for one language
    pub fn get(&self, lang: &str, key: &LabelKey) -> Option<&str> {
        self.languages
            .get(&lang.to_ascii_lowercase())?
            .get(&key.to_string())
            .map(|s| s.as_str())
    }
}

/// Label lookup for one language
#[derive(Debug, Clone)]
pub struct Localizer<'a> {
    schema: &'a Schema,
    overlay: &'a LangOverlay,
    lang: String,
}

impl<'a> Localizer<'a> {
    pub fn new(schema: &'a Schema, overlay: &'a LangOverlay, lang: &str) -> Self {
        Self {
            schema,
            overlay,
            lang: lang.to_ascii_lowercase(),
        }
    }

    pub fn lang(&self) -> &str {
        &self.lang
    }

    /// Text for a label, falling back to the manifest
    pub fn text(&self, key: &LabelKey) -> String {
        if let Some(text) = self.overlay.get(&self.lang, key) {
            return text.to_string();
        }

        match key {
            LabelKey::CategoryName(id) => self
                .schema
                .category(id)
                .map(|c| c.name.clone())
                .unwrap_or_else(|| id.clone()),
            LabelKey::CategoryDescription(id) => self
                .schema
                .category(id)
                .map(|c| c.description.clone())
                .unwrap_or_default(),
            LabelKey::Feature(id) => id.clone(),
        }
    }

    pub fn feature(&self, id: &str) -> String {
        self.text(&LabelKey::Feature(id.to_string()))
    }

    pub fn category_name(&self, id: &str) -> String {
        self.text(&LabelKey::CategoryName(id.to_string()))
    }

    pub fn category_description(&self, id: &str) -> String {
        self.text(&LabelKey::CategoryDescription(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::memory::MemoryContainer;
    use crate::schema::tests::{STATUS_SUB, SWITCH_ROOT, SWITCH_SUB, schema_from};

    fn categorized_schema() -> Schema {
        let root = SWITCH_ROOT.trim_end().trim_end_matches('}').to_string()
            + r#", "category": {
                "list": ["visual"],
                "data": {"visual": {"name": "Visual", "description": "Looks", "list": ["status_feature"]}}
            }}"#;
        schema_from(
            &root,
            &[("sub/switch.json", SWITCH_SUB), ("sub/status.json", STATUS_SUB)],
        )
        .unwrap()
    }

    fn overlay_pack() -> MemoryContainer {
        let mut pack = MemoryContainer::default();
        pack.files.insert(
            "packset_lang/fr_FR.json".to_string(),
            br#"{"category.visual.name": "Visuel", "feature.status_feature": "Style du HUD"}"#
                .to_vec(),
        );
        pack.files
            .insert("packset_lang/broken.json".to_string(), b"{ nope".to_vec());
        pack.files
            .insert("packset_lang/readme.txt".to_string(), b"ignored".to_vec());
        pack
    }

    #[test]
    fn test_label_keys() {
        let key: LabelKey = "category.visual.description".parse().unwrap();
        assert_eq!(key, LabelKey::CategoryDescription("visual".to_string()));
        assert_eq!(key.to_string(), "category.visual.description");

        let key: LabelKey = "feature.low_fire".parse().unwrap();
        assert_eq!(key, LabelKey::Feature("low_fire".to_string()));

        assert!("category.visual".parse::<LabelKey>().is_err());
        assert!("feature.".parse::<LabelKey>().is_err());
    }

    #[test]
    fn test_load_skips_malformed_files() {
        let overlay = LangOverlay::load(&overlay_pack()).unwrap();
        let languages: Vec<&str> = overlay.languages().collect();
        assert_eq!(languages, vec!["fr_fr"]);
    }

    #[test]
    fn test_localizer_fallbacks() {
        let schema = categorized_schema();
        let overlay = LangOverlay::load(&overlay_pack()).unwrap();

        let fr = Localizer::new(&schema, &overlay, "fr_fr");
        assert_eq!(fr.category_name("visual"), "Visuel");
        assert_eq!(fr.category_description("visual"), "Looks");
        assert_eq!(fr.feature("status_feature"), "Style du HUD");
        assert_eq!(fr.feature("switch_feature"), "switch_feature");

        let en = Localizer::new(&schema, &overlay, DEFAULT_LANG);
        assert_eq!(en.category_name("visual"), "Visual");
        assert_eq!(en.feature("status_feature"), "status_feature");
    }
}
