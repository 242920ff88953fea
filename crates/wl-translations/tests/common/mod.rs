//! Shared helpers for translation integration tests

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use wl_translations::Translations;

/// Path of a fixture under `tests/fixtures/`
pub fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Load a fixture file as a string
pub fn load_fixture(name: &str) -> String {
    let path = fixture_path(name);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to load fixture '{}' from {:?}: {}", name, path, e))
}

/// The shipped `strings.json` as plain JSON, for comparing against lookups
pub fn bundled_json() -> serde_json::Value {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("data")
        .join("strings.json");
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read {:?}: {}", path, e));
    serde_json::from_str(&content).expect("strings.json is valid JSON")
}

/// Write an integration directory with `strings.json` and translated files
pub fn write_strings_dir(dir: &Path, source: &str, translations: &[(&str, &str)]) {
    std::fs::write(dir.join("strings.json"), source).unwrap();
    if translations.is_empty() {
        return;
    }
    let translations_dir = dir.join("translations");
    std::fs::create_dir_all(&translations_dir).unwrap();
    for (language, content) in translations {
        std::fs::write(translations_dir.join(format!("{}.json", language)), content).unwrap();
    }
}

pub fn parse(json: &str) -> Translations {
    json.parse()
        .unwrap_or_else(|e| panic!("Failed to parse translations: {}", e))
}
