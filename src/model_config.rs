//! The configuration mapping: the variable namespace for `${...}` expressions.
//!
//! Built per locale from two optional JSON files, merged shallowly:
//!
//! ```text
//! magicModel/config.json        ← global layer
//! magicModel/config-de.json     ← locale layer (wins on shared keys)
//! ```
//!
//! Only top-level keys are merged. A locale value replaces the global value of
//! the same key wholesale; arrays are not concatenated.

use serde_json::{Map, Value};

/// Flat key/value mapping available to template expressions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelConfig {
    entries: Map<String, Value>,
}

impl ModelConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge the global and locale layers. Either may be absent.
    pub fn from_layers(
        global: Option<Map<String, Value>>,
        locale: Option<Map<String, Value>>,
    ) -> Self {
        let mut config = Self::new();
        for layer in [global, locale].into_iter().flatten() {
            config.overlay(layer);
        }
        config
    }

    /// Insert every entry of `layer`, replacing existing keys.
    ///
    /// Replaced keys keep their original position in iteration order.
    pub fn overlay(&mut self, layer: Map<String, Value>) {
        for (key, value) in layer {
            self.entries.insert(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entries as a JSON map, for handing to an expression evaluator.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.entries
    }
}
