//! Centralized file naming for the model directory layout.
//!
//! ```text
//! magicModel/
//! ├── config.json             # global configuration
//! ├── config-de.json          # locale configuration
//! └── de-template.json        # locale template
//! models/
//! └── de.json                 # generated model
//! ```
//!
//! Every other module builds file names through these functions so the
//! layout is defined in exactly one place.

/// File name of the global configuration.
pub const GLOBAL_CONFIG_FILE: &str = "config.json";

const TEMPLATE_SUFFIX: &str = "-template.json";

/// `config-<locale>.json`
pub fn locale_config_file(locale: &str) -> String {
    format!("config-{locale}.json")
}

/// `<locale>-template.json`
pub fn template_file(locale: &str) -> String {
    format!("{locale}{TEMPLATE_SUFFIX}")
}

/// `<locale>.json`
pub fn model_file(locale: &str) -> String {
    format!("{locale}.json")
}

/// Extract the locale from a template file name.
///
/// - `"de-template.json"` → `Some("de")`
/// - `"en-US-template.json"` → `Some("en-US")`
/// - `"-template.json"` → `None`
/// - `"config.json"` → `None`
pub fn locale_from_template_file(file_name: &str) -> Option<&str> {
    file_name
        .strip_suffix(TEMPLATE_SUFFIX)
        .filter(|locale| !locale.is_empty())
}
