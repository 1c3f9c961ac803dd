//! Shared test utilities for the magic-model test suite.
//!
//! Two ways to get the fixture model folder:
//!
//! - [`setup_fixtures`] copies `fixtures/magicModel/` into a temp directory,
//!   for tests that go through the filesystem.
//! - [`fixture_source`] loads the same files into a [`MemorySource`], for
//!   pipeline tests that should not touch the disk.
//!
//! The fixture folder holds `config.json`, `config-de.json`,
//! `de-template.json` and `en-template.json`. There is deliberately no
//! `config-en.json` and nothing for `es`.

use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use std::path::Path;
use tempfile::TempDir;

use crate::model_config::ModelConfig;
use crate::store::{ModelSource, SourceError};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/magicModel/` to `<tmp>/magicModel` and return the temp dir.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/magicModel");
    let target = tmp.path().join("magicModel");
    std::fs::create_dir_all(&target).unwrap();
    for entry in std::fs::read_dir(&fixtures).unwrap() {
        let entry = entry.unwrap();
        std::fs::copy(entry.path(), target.join(entry.file_name())).unwrap();
    }
    tmp
}

/// Configuration mapping from a JSON object literal, as a single global layer.
pub fn model_config(value: Value) -> ModelConfig {
    match value {
        Value::Object(entries) => ModelConfig::from_layers(Some(entries), None),
        other => panic!("test config must be a JSON object, got {other}"),
    }
}

/// Owned locale list from string literals.
pub fn locales(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|id| id.to_string()).collect()
}

/// The small English template used in expression and spintax tests.
pub fn english_template() -> Value {
    json!({
        "invocation": {
            "alexa": "${MyTestString}",
            "googleAssistant": "${MyTestString}-${MyTestString}"
        },
        "version": "${version}.${1+1}",
        "intents": {
            "HelpIntent": {
                "alexa": { "name": "AMAZON.HelpIntent" },
                "phrases": ["Help", "What [now|can I do]"]
            }
        }
    })
}

// =========================================================================
// In-memory source
// =========================================================================

/// A [`ModelSource`] backed by maps. Absent keys behave like missing files.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    pub folder: String,
    pub global: Option<Map<String, Value>>,
    pub locale_configs: BTreeMap<String, Map<String, Value>>,
    pub templates: BTreeMap<String, Value>,
}

impl ModelSource for MemorySource {
    fn folder_name(&self) -> String {
        self.folder.clone()
    }

    fn global_config(&self) -> Result<Option<Map<String, Value>>, SourceError> {
        Ok(self.global.clone())
    }

    fn locale_config(&self, locale: &str) -> Result<Option<Map<String, Value>>, SourceError> {
        Ok(self.locale_configs.get(locale).cloned())
    }

    fn template(&self, locale: &str) -> Result<Option<Value>, SourceError> {
        Ok(self.templates.get(locale).cloned())
    }
}

fn fixture_object(text: &str) -> Map<String, Value> {
    match serde_json::from_str(text).unwrap() {
        Value::Object(map) => map,
        other => panic!("fixture must be a JSON object, got {other}"),
    }
}

/// The fixture folder as a [`MemorySource`] named `magicModel`.
pub fn fixture_source() -> MemorySource {
    let mut source = MemorySource {
        folder: "magicModel".to_string(),
        global: Some(fixture_object(include_str!("../fixtures/magicModel/config.json"))),
        ..MemorySource::default()
    };
    source.locale_configs.insert(
        "de".to_string(),
        fixture_object(include_str!("../fixtures/magicModel/config-de.json")),
    );
    source.templates.insert(
        "de".to_string(),
        serde_json::from_str(include_str!("../fixtures/magicModel/de-template.json")).unwrap(),
    );
    source.templates.insert(
        "en".to_string(),
        serde_json::from_str(include_str!("../fixtures/magicModel/en-template.json")).unwrap(),
    );
    source
}
