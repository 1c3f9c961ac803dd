//! Where templates and configuration come from, and where models go.
//!
//! The pipeline only sees the [`ModelSource`] and [`ModelSink`] traits. The
//! filesystem implementations read and write the directory layout described in
//! [`naming`](crate::naming); [`MemorySink`] keeps output in memory for
//! `check` runs and tests.
//!
//! Sources distinguish *absent* from *broken*: `Ok(None)` means the file does
//! not exist (a warning), `Err` means it exists but cannot be used (the locale
//! fails).

use crate::naming;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("could not read {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("{path} is not valid JSON: {source}")]
    Json { path: PathBuf, source: serde_json::Error },
    #[error("{path} must contain a JSON object")]
    NotAnObject { path: PathBuf },
}

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("could not write {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
}

/// Supplies the per-locale inputs of a pipeline run.
pub trait ModelSource {
    /// Display name of the input location, used in diagnostics.
    fn folder_name(&self) -> String;

    fn global_config(&self) -> Result<Option<Map<String, Value>>, SourceError>;

    fn locale_config(&self, locale: &str) -> Result<Option<Map<String, Value>>, SourceError>;

    fn template(&self, locale: &str) -> Result<Option<Value>, SourceError>;
}

/// Receives each finished model as serialized text.
pub trait ModelSink {
    fn write(&mut self, locale: &str, contents: &str) -> Result<(), SinkError>;
}

/// Reads `config.json`, `config-<locale>.json` and `<locale>-template.json`
/// from one directory.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn read_json(&self, file_name: &str) -> Result<Option<Value>, SourceError> {
        let path = self.root.join(file_name);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(SourceError::Io { path, source }),
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| SourceError::Json { path, source })
    }

    fn read_object(&self, file_name: &str) -> Result<Option<Map<String, Value>>, SourceError> {
        match self.read_json(file_name)? {
            None => Ok(None),
            Some(Value::Object(map)) => Ok(Some(map)),
            Some(_) => Err(SourceError::NotAnObject {
                path: self.root.join(file_name),
            }),
        }
    }
}

impl ModelSource for DirSource {
    fn folder_name(&self) -> String {
        self.root
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.root.display().to_string())
    }

    fn global_config(&self) -> Result<Option<Map<String, Value>>, SourceError> {
        self.read_object(naming::GLOBAL_CONFIG_FILE)
    }

    fn locale_config(&self, locale: &str) -> Result<Option<Map<String, Value>>, SourceError> {
        self.read_object(&naming::locale_config_file(locale))
    }

    fn template(&self, locale: &str) -> Result<Option<Value>, SourceError> {
        self.read_json(&naming::template_file(locale))
    }
}

/// Writes `<locale>.json` into one directory, creating it on first write.
#[derive(Debug, Clone)]
pub struct DirSink {
    root: PathBuf,
}

impl DirSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path the model for `locale` is written to.
    pub fn model_path(&self, locale: &str) -> PathBuf {
        self.root.join(naming::model_file(locale))
    }
}

impl ModelSink for DirSink {
    fn write(&mut self, locale: &str, contents: &str) -> Result<(), SinkError> {
        fs::create_dir_all(&self.root).map_err(|source| SinkError::Io {
            path: self.root.clone(),
            source,
        })?;
        let path = self.model_path(locale);
        fs::write(&path, contents).map_err(|source| SinkError::Io { path, source })
    }
}

/// Keeps every written model in memory, keyed by locale.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    models: BTreeMap<String, String>,
    writes: usize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, locale: &str) -> Option<&str> {
        self.models.get(locale).map(String::as_str)
    }

    /// Number of `write` calls, including overwrites.
    pub fn writes(&self) -> usize {
        self.writes
    }

}

impl ModelSink for MemorySink {
    fn write(&mut self, locale: &str, contents: &str) -> Result<(), SinkError> {
        self.models.insert(locale.to_string(), contents.to_string());
        self.writes += 1;
        Ok(())
    }
}

/// Locales that have a `<locale>-template.json` directly inside `dir`,
/// sorted.
///
/// A missing directory yields no locales.
pub fn discover_locales(dir: &Path) -> Result<Vec<String>, SourceError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut locales = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| SourceError::Io {
            path: dir.to_path_buf(),
            source: e.into(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_str();
        if let Some(locale) = name.and_then(naming::locale_from_template_file) {
            locales.push(locale.to_string());
        }
    }
    locales.sort();
    Ok(locales)
}
