//! Tool configuration module.
//!
//! Handles loading, validating, and merging `magic-model.toml`. This file
//! configures the tool itself (where to read, where to write, which locales);
//! the variables templates refer to live in the model folder's `config.json`
//! and are handled by [`model_config`](crate::model_config).
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! input_dir = "magicModel"  # Folder with config.json and <locale>-template.json
//! output_dir = "models"     # Folder receiving <locale>.json
//! locales = []              # Empty: every <locale>-template.json in input_dir
//!
//! [expansion]
//! warn_threshold = 10000    # Warn when one phrases array grows past this (0 = never)
//! ```
//!
//! ## Layering
//!
//! ```text
//! stock defaults  →  magic-model.toml  →  command-line flags
//! ```
//!
//! The config file is sparse; keys it leaves out keep their stock value.
//! Unknown keys are rejected to catch typos early.

use crate::pipeline::DEFAULT_EXPANSION_THRESHOLD;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Default name of the tool configuration file.
pub const CONFIG_FILE: &str = "magic-model.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Tool configuration loaded from `magic-model.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolConfig {
    /// Folder holding `config.json`, `config-<locale>.json` and templates.
    pub input_dir: String,
    /// Folder the generated `<locale>.json` models are written to.
    pub output_dir: String,
    /// Locales to build, in order. Empty means "discover from templates".
    pub locales: Vec<String>,
    /// Spintax expansion settings.
    pub expansion: ExpansionConfig,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            input_dir: "magicModel".to_string(),
            output_dir: "models".to_string(),
            locales: Vec::new(),
            expansion: ExpansionConfig::default(),
        }
    }
}

impl ToolConfig {
    /// Validate config values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.input_dir.trim().is_empty() {
            return Err(ConfigError::Validation("input_dir must not be empty".into()));
        }
        if self.output_dir.trim().is_empty() {
            return Err(ConfigError::Validation("output_dir must not be empty".into()));
        }
        let mut seen = HashSet::new();
        for locale in &self.locales {
            if locale.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "locales must not contain blank entries".into(),
                ));
            }
            if !seen.insert(locale.as_str()) {
                return Err(ConfigError::Validation(format!("locale '{locale}' is listed twice")));
            }
        }
        Ok(())
    }
}

/// Spintax expansion settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExpansionConfig {
    /// Emit a warning when a single `phrases` array expands to more entries
    /// than this. `0` disables the warning.
    pub warn_threshold: usize,
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self {
            warn_threshold: DEFAULT_EXPANSION_THRESHOLD,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(ToolConfig::default())
        .map_err(|e| ConfigError::Validation(format!("stock defaults do not serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely, so a user
///   `locales` list replaces the default list instead of extending it.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto the stock defaults, then deserialize and
/// validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<ToolConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ToolConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the tool config from `path`, falling back to stock defaults when the
/// file is absent.
pub fn load_config(path: &Path) -> Result<ToolConfig, ConfigError> {
    resolve_config(load_raw_config(path)?)
}

/// Returns a fully-commented stock `magic-model.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# magic-model configuration
# =========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Command-line flags override them.
# Unknown keys will cause an error.

# Folder containing the model sources:
#   config.json              global variables for all locales
#   config-<locale>.json     per-locale variables (override global ones)
#   <locale>-template.json   the template for one locale
input_dir = "magicModel"

# Folder receiving one <locale>.json per built locale.
output_dir = "models"

# Locales to build, in order. Leave empty to build every
# <locale>-template.json found in input_dir.
locales = []

# ---------------------------------------------------------------------------
# Spintax expansion
# ---------------------------------------------------------------------------
[expansion]
# Every [a|b] group multiplies the number of phrases. Warn when a single
# phrases array grows past this many entries. 0 disables the warning.
warn_threshold = 10000
"##
}
