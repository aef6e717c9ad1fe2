// tests/common/mod.rs

//! Shared fixtures for integration tests.

#![allow(dead_code)]

use packset::{Container, PackContainer};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zip::ZipWriter;
use zip::write::FileOptions;

pub const ROOT_MANIFEST: &str = r#"{
    "schema_version": 1,
    "feature": {
        "switch_feature": "bool",
        "status_feature": "toggle"
    },
    "config": {
        "switch_feature": {
            "default": "false",
            "toggle": [
                {"id": "fire", "type": "bool", "file_path": "assets/minecraft/textures/fire.png"},
                {"type": "toggle", "file_path": "packset/switch.json"}
            ]
        },
        "status_feature": {
            "default": "classic",
            "scope": ["classic", "modern", "minimal"],
            "paths": [{"id": "hud", "file_path": "packset/status.json"}]
        }
    },
    "category": {
        "list": ["visual"],
        "data": {
            "visual": {"name": "Visual", "description": "How the HUD looks", "list": ["status_feature"]}
        }
    }
}"#;

pub const SWITCH_MANIFEST: &str = r#"{
    "schema_version": 1,
    "type": "bool",
    "assets": [
        {"name": "a", "file_path": "assets/minecraft/textures/a.png", "default": "off"}
    ],
    "toggles": [
        {"name": "pumpkin", "path": "assets/minecraft/textures/p.png", "toggle_path": "assets/minecraft/textures/q.png", "default": "off"}
    ]
}"#;

pub const STATUS_MANIFEST: &str = r#"{
    "schema_version": 1,
    "type": "toggle",
    "states": [
        {"name": "classic", "file_path": "assets/minecraft/textures/gui/classic.jpg"},
        {"name": "modern", "file_path": "assets/minecraft/textures/gui/modern.jpg"},
        {"name": "minimal", "file_path": "assets/minecraft/textures/gui/minimal.jpg"}
    ]
}"#;

pub const LANG_ZH: &str = r#"{
    "category.visual.name": "视觉",
    "feature.status_feature": "状态栏样式"
}"#;

/// Every file of the fixture pack at its default layout.
pub fn default_entries() -> Vec<(&'static str, Vec<u8>)> {
    vec![
        ("pack.mcmeta", br#"{"pack": {"pack_format": 15}}"#.to_vec()),
        ("packset.json", ROOT_MANIFEST.as_bytes().to_vec()),
        ("packset/switch.json", SWITCH_MANIFEST.as_bytes().to_vec()),
        ("packset/status.json", STATUS_MANIFEST.as_bytes().to_vec()),
        ("packset_lang/zh_cn.json", LANG_ZH.as_bytes().to_vec()),
        ("assets/minecraft/textures/fire.png", b"fire".to_vec()),
        ("assets/minecraft/textures/a.png.packset.old", b"a".to_vec()),
        ("assets/minecraft/textures/p.png", b"pumpkin".to_vec()),
        ("assets/minecraft/textures/q.png.packset.old", b"carved".to_vec()),
        ("assets/minecraft/textures/gui/classic.jpg", b"classic".to_vec()),
        ("assets/minecraft/textures/gui/modern.jpg", b"modern".to_vec()),
        ("assets/minecraft/textures/gui/minimal.jpg", b"minimal".to_vec()),
    ]
}

/// Write the fixture as a directory pack.
///
/// Returns (TempDir, pack_path) - keep the TempDir alive to prevent cleanup.
pub fn setup_dir_pack() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("pack");
    for (name, data) in default_entries() {
        let path = root.join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, data).unwrap();
    }
    (temp_dir, root)
}

/// Write the fixture as a zip pack.
pub fn setup_zip_pack() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("pack.zip");
    write_zip(&path, &default_entries());
    (temp_dir, path)
}

pub fn write_zip(path: &Path, entries: &[(&str, Vec<u8>)]) {
    let mut writer = ZipWriter::new(File::create(path).unwrap());
    for (name, data) in entries {
        writer.start_file(*name, FileOptions::default()).unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap();
}

/// Path -> content for every file in a pack.
pub fn snapshot(pack: &Path) -> BTreeMap<String, Vec<u8>> {
    let container = PackContainer::open(pack).unwrap();
    container
        .list("")
        .unwrap()
        .into_iter()
        .map(|name| {
            let data = container.read(&name).unwrap();
            (name, data)
        })
        .collect()
}

/// Sorted file contents, ignoring where they live.
pub fn contents(snapshot: &BTreeMap<String, Vec<u8>>) -> Vec<Vec<u8>> {
    let mut contents: Vec<Vec<u8>> = snapshot.values().cloned().collect();
    contents.sort();
    contents
}
