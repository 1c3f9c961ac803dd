//! Shared types describing the result of a pipeline run.
//!
//! Produced by [`pipeline`](crate::pipeline), consumed by
//! [`output`](crate::output) and by library callers. Serializable so a run
//! report can be dumped as JSON.

use crate::naming;
use serde::Serialize;
use std::fmt;

/// A non-fatal, single-line message about one locale's run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// `config.json` is absent from the input folder.
    MissingGlobalConfig { folder: String },
    /// `config-<locale>.json` is absent from the input folder.
    MissingLocaleConfig { folder: String, locale: String },
    /// `<locale>-template.json` is absent; the locale produces no output.
    MissingTemplate { folder: String, locale: String },
    /// A single phrases array expanded past the warning threshold.
    LargeExpansion { locale: String, entries: usize },
    /// The locale could not be built.
    Failed { locale: String, reason: String },
}

impl Diagnostic {
    /// The file this diagnostic is about, if any.
    pub fn missing_file(&self) -> Option<String> {
        match self {
            Diagnostic::MissingGlobalConfig { .. } => {
                Some(naming::GLOBAL_CONFIG_FILE.to_string())
            }
            Diagnostic::MissingLocaleConfig { locale, .. } => {
                Some(naming::locale_config_file(locale))
            }
            Diagnostic::MissingTemplate { locale, .. } => Some(naming::template_file(locale)),
            Diagnostic::LargeExpansion { .. } | Diagnostic::Failed { .. } => None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::MissingGlobalConfig { folder }
            | Diagnostic::MissingLocaleConfig { folder, .. }
            | Diagnostic::MissingTemplate { folder, .. } => {
                let file = self.missing_file().unwrap_or_default();
                write!(f, "You may want to add a file {file} to your {folder} folder")
            }
            Diagnostic::LargeExpansion { locale, entries } => {
                write!(f, "phrases array expanded to {entries} entries in {locale}")
            }
            Diagnostic::Failed { locale, reason } => {
                write!(f, "Could not build model for {locale}: {reason}")
            }
        }
    }
}

/// What happened to one locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LocaleStatus {
    /// The model was handed to the sink.
    Written { phrases: usize, bytes: usize },
    /// No template exists for the locale.
    Skipped,
    /// The template or configuration was malformed, an expression failed, or
    /// the sink rejected the output.
    Failed,
}

/// Result of processing one locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocaleOutcome {
    pub locale: String,
    #[serde(flatten)]
    pub status: LocaleStatus,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

/// Outcomes of a whole run, in locale input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub locales: Vec<LocaleOutcome>,
}

impl RunReport {
    pub fn written(&self) -> usize {
        self.count(|s| matches!(s, LocaleStatus::Written { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, LocaleStatus::Skipped))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, LocaleStatus::Failed))
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    /// Every diagnostic across all locales, in order.
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.locales.iter().flat_map(|outcome| outcome.diagnostics.iter())
    }

    /// The outcome for `locale`, if it was part of the run.
    pub fn outcome(&self, locale: &str) -> Option<&LocaleOutcome> {
        self.locales.iter().find(|outcome| outcome.locale == locale)
    }

    fn count(&self, pred: impl Fn(&LocaleStatus) -> bool) -> usize {
        self.locales.iter().filter(|outcome| pred(&outcome.status)).count()
    }
}
