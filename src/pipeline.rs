//! The model pipeline: template + configuration → finished model.
//!
//! ```text
//! template ──► resolve ──► resolve ──► expand ──► curate + serialize ──► sink
//!                ▲           ▲
//!                └── config ─┘
//! ```
//!
//! ## Why Two Resolution Passes
//!
//! A configuration value may itself contain a placeholder:
//!
//! ```text
//! config:   { "a": "${b}", "b": "x" }
//! template: "${a}"
//! pass 1:   "${b}"
//! pass 2:   "x"
//! ```
//!
//! Spintax expansion runs strictly after both passes because resolved values
//! may contribute bracket syntax (`"Help ${Politeness}"` with
//! `Politeness = "[ | please]"`).
//!
//! ## Failure Isolation
//!
//! [`ModelPipeline::run`] processes locales one after another and never stops
//! early. Each locale ends up with a [`LocaleOutcome`]: written, skipped (no
//! template), or failed (malformed input, bad expression, sink error), plus
//! the diagnostics collected along the way.

use crate::expr::{ExprError, ExpressionEvaluator, JinjaEvaluator, Resolver};
use crate::model_config::ModelConfig;
use crate::sanitize;
use crate::spintax::{self, PHRASES_FIELD};
use crate::store::{ModelSink, ModelSource, SinkError, SourceError};
use crate::types::{Diagnostic, LocaleOutcome, LocaleStatus, RunReport};
use crate::walk::walk;
use serde_json::Value;
use std::convert::Infallible;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Number of expression passes run before spintax expansion.
pub const RESOLVE_PASSES: usize = 2;

/// Default size above which a single expanded phrases array is reported.
pub const DEFAULT_EXPANSION_THRESHOLD: usize = 10_000;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Expression(#[from] ExprError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// A fully resolved and expanded model, not yet curated.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedModel {
    pub model: Value,
    pub stats: ExpansionStats,
}

/// Phrase counts gathered during the expansion pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionStats {
    /// Total phrases across all arrays, after expansion.
    pub phrases: usize,
    /// Size of each expanded array, in visiting order.
    pub array_sizes: Vec<usize>,
}

impl ExpansionStats {
    pub fn largest_array(&self) -> usize {
        self.array_sizes.iter().copied().max().unwrap_or(0)
    }
}

/// Runs the resolve/expand/serialize sequence with a pluggable evaluator.
#[derive(Debug, Clone)]
pub struct ModelPipeline<E = JinjaEvaluator> {
    evaluator: E,
    expansion_threshold: usize,
}

impl Default for ModelPipeline<JinjaEvaluator> {
    fn default() -> Self {
        Self::new(JinjaEvaluator)
    }
}

impl<E: ExpressionEvaluator> ModelPipeline<E> {
    pub fn new(evaluator: E) -> Self {
        Self {
            evaluator,
            expansion_threshold: DEFAULT_EXPANSION_THRESHOLD,
        }
    }

    /// Report phrases arrays larger than `threshold`. `0` disables the check.
    pub fn with_expansion_threshold(mut self, threshold: usize) -> Self {
        self.expansion_threshold = threshold;
        self
    }

    /// Run one expression pass over the whole document.
    pub fn resolve_pass(&self, model: &mut Value, config: &ModelConfig) -> Result<(), ExprError> {
        let resolver = Resolver::new(config, &self.evaluator);
        walk(model, &mut |_, value| resolver.resolve(value))
    }

    /// Expand every `phrases` array in place.
    pub fn expand_pass(&self, model: &mut Value) -> ExpansionStats {
        let mut stats = ExpansionStats::default();
        let result = walk::<_, Infallible>(model, &mut |key, value| {
            let expanded = spintax::expand(key, value);
            if key.is_field(PHRASES_FIELD) {
                if let Value::Array(items) = &expanded {
                    stats.phrases += items.len();
                    stats.array_sizes.push(items.len());
                }
            }
            Ok(expanded)
        });
        match result {
            Ok(()) => stats,
            Err(never) => match never {},
        }
    }

    /// Resolve expressions twice, then expand spintax.
    pub fn process(
        &self,
        mut model: Value,
        config: &ModelConfig,
    ) -> Result<ProcessedModel, PipelineError> {
        for pass in 1..=RESOLVE_PASSES {
            debug!(pass, "resolving expressions");
            self.resolve_pass(&mut model, config)?;
        }
        let stats = self.expand_pass(&mut model);
        debug!(
            phrases = stats.phrases,
            arrays = stats.array_sizes.len(),
            "expanded spintax"
        );
        Ok(ProcessedModel { model, stats })
    }

    /// Process and serialize a template into the final model text.
    pub fn render(&self, template: Value, config: &ModelConfig) -> Result<String, PipelineError> {
        let processed = self.process(template, config)?;
        Ok(sanitize::to_model_json(&processed.model)?)
    }

    /// Build, serialize, and write every locale in order.
    pub fn run<S, K>(&self, locales: &[String], source: &S, sink: &mut K) -> RunReport
    where
        S: ModelSource + ?Sized,
        K: ModelSink + ?Sized,
    {
        let locales = locales
            .iter()
            .map(|locale| self.run_locale(locale, source, sink))
            .collect();
        RunReport { locales }
    }

    fn run_locale<S, K>(&self, locale: &str, source: &S, sink: &mut K) -> LocaleOutcome
    where
        S: ModelSource + ?Sized,
        K: ModelSink + ?Sized,
    {
        let mut diagnostics = Vec::new();
        let status = match self.build_locale(locale, source, sink, &mut diagnostics) {
            Ok(status) => status,
            Err(e) => {
                diagnostics.push(Diagnostic::Failed {
                    locale: locale.to_string(),
                    reason: e.to_string(),
                });
                LocaleStatus::Failed
            }
        };
        for diagnostic in &diagnostics {
            warn!("{diagnostic}");
        }
        if let LocaleStatus::Written { phrases, bytes } = status {
            info!(locale, phrases, bytes, "model written");
        }
        LocaleOutcome {
            locale: locale.to_string(),
            status,
            diagnostics,
        }
    }

    fn build_locale<S, K>(
        &self,
        locale: &str,
        source: &S,
        sink: &mut K,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<LocaleStatus, PipelineError>
    where
        S: ModelSource + ?Sized,
        K: ModelSink + ?Sized,
    {
        let folder = source.folder_name();

        let global = source.global_config()?;
        if global.is_none() {
            diagnostics.push(Diagnostic::MissingGlobalConfig { folder: folder.clone() });
        }
        let local = source.locale_config(locale)?;
        if local.is_none() {
            diagnostics.push(Diagnostic::MissingLocaleConfig {
                folder: folder.clone(),
                locale: locale.to_string(),
            });
        }
        let config = ModelConfig::from_layers(global, local);
        debug!(locale, keys = config.len(), "merged configuration");

        let Some(template) = source.template(locale)? else {
            diagnostics.push(Diagnostic::MissingTemplate {
                folder,
                locale: locale.to_string(),
            });
            return Ok(LocaleStatus::Skipped);
        };

        let processed = self.process(template, &config)?;
        if self.expansion_threshold > 0 {
            let largest = processed.stats.largest_array();
            if largest > self.expansion_threshold {
                diagnostics.push(Diagnostic::LargeExpansion {
                    locale: locale.to_string(),
                    entries: largest,
                });
            }
        }

        let text = sanitize::to_model_json(&processed.model)?;
        sink.write(locale, &text)?;
        Ok(LocaleStatus::Written {
            phrases: processed.stats.phrases,
            bytes: text.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemorySink;
    use crate::test_helpers::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn config(value: Value) -> ModelConfig {
        model_config(value)
    }

    fn jinja_pipeline() -> ModelPipeline {
        ModelPipeline::default()
    }

    #[test]
    fn one_pass_leaves_nested_placeholder() {
        let pipeline = jinja_pipeline();
        let cfg = config(json!({ "a": "${b}", "b": "x" }));
        let mut model = json!({ "value": "${a}" });
        pipeline.resolve_pass(&mut model, &cfg).unwrap();
        assert_eq!(model, json!({ "value": "${b}" }));
    }

    #[test]
    fn two_passes_resolve_nested_placeholder() {
        let pipeline = jinja_pipeline();
        let cfg = config(json!({ "a": "${b}", "b": "x" }));
        let processed = pipeline.process(json!({ "value": "${a}" }), &cfg).unwrap();
        assert_eq!(processed.model, json!({ "value": "x" }));
    }

    #[test]
    fn whole_array_substitution_is_resolved_on_second_pass() {
        let pipeline = jinja_pipeline();
        let cfg = config(json!({ "Items": ["${version}", "b"], "version": "4.1" }));
        let processed = pipeline.process(json!({ "values": "${Items}" }), &cfg).unwrap();
        assert_eq!(processed.model, json!({ "values": ["4.1", "b"] }));
    }

    #[test]
    fn spintax_from_config_is_expanded_after_resolution() {
        let pipeline = jinja_pipeline();
        let cfg = config(json!({ "MyTestSpintaxArray": "Help [ | me] [ | please]" }));
        let processed = pipeline
            .process(json!({ "phrases": ["${MyTestSpintaxArray}"] }), &cfg)
            .unwrap();
        assert_eq!(
            processed.model,
            json!({ "phrases": ["Help", "Help please", "Help me", "Help me please"] })
        );
        assert_eq!(processed.stats.phrases, 4);
    }

    #[test]
    fn expansion_concatenates_per_phrase_products() {
        let pipeline = jinja_pipeline();
        let processed = pipeline
            .process(
                json!({
                    "a": { "phrases": ["x", "[a|b] [c|d|e]"] },
                    "b": { "phrases": ["[1|2]"] }
                }),
                &ModelConfig::new(),
            )
            .unwrap();
        assert_eq!(processed.stats.array_sizes, vec![7, 2]);
        assert_eq!(processed.stats.phrases, 9);
        assert_eq!(processed.stats.largest_array(), 7);
    }

    #[test]
    fn render_resolves_expands_and_curates() {
        let pipeline = jinja_pipeline();
        let cfg = config(json!({ "version": "4.1", "MyTestString": "some test string" }));
        let text = pipeline.render(english_template(), &cfg).unwrap();
        let rendered: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(
            rendered,
            json!({
                "invocation": {
                    "alexa": "some test string",
                    "googleAssistant": "some test string-some test string"
                },
                "version": "4.1.2",
                "intents": {
                    "HelpIntent": {
                        "alexa": { "name": "AMAZON.HelpIntent" },
                        "phrases": ["Help", "What can I do", "What now"]
                    }
                }
            })
        );
        assert!(text.contains("\"version\": \"4.1.2\""));
    }

    #[test]
    fn run_skips_missing_template_and_continues() {
        let source = fixture_source();
        let mut sink = MemorySink::new();
        let report = jinja_pipeline().run(&locales(&["es", "de"]), &source, &mut sink);

        assert_eq!(sink.writes(), 1);
        assert!(sink.get("es").is_none());
        assert!(sink.get("de").unwrap().contains("Was nun"));

        let es = report.outcome("es").unwrap();
        assert_eq!(es.status, LocaleStatus::Skipped);
        assert!(es.diagnostics.iter().any(|d| d.to_string().contains("es-template.json")));
        assert!(es.diagnostics.iter().any(|d| d.to_string().contains("config-es.json")));
    }

    #[test]
    fn run_reports_missing_locale_config_but_writes() {
        let source = fixture_source();
        let mut sink = MemorySink::new();
        let report = jinja_pipeline().run(&locales(&["en"]), &source, &mut sink);

        let en = report.outcome("en").unwrap();
        assert!(matches!(en.status, LocaleStatus::Written { .. }));
        assert_eq!(
            en.diagnostics,
            vec![Diagnostic::MissingLocaleConfig {
                folder: "magicModel".into(),
                locale: "en".into()
            }]
        );
        assert!(sink.get("en").unwrap().contains("\"alexa\": \"some test string\""));
    }

    #[test]
    fn run_isolates_expression_failures() {
        let mut source = fixture_source();
        source.templates.insert("fr".into(), json!({ "name": "${doesNotExist}" }));
        let mut sink = MemorySink::new();
        let report = jinja_pipeline().run(&locales(&["fr", "en"]), &source, &mut sink);

        assert_eq!(report.outcome("fr").unwrap().status, LocaleStatus::Failed);
        assert!(matches!(
            report.outcome("en").unwrap().status,
            LocaleStatus::Written { .. }
        ));
        assert_eq!(sink.writes(), 1);
        assert!(report.has_failures());
    }

    #[test]
    fn run_reports_large_expansion() {
        let mut source = fixture_source();
        source.templates.insert("xx".into(), json!({ "phrases": ["[a|b][c|d][e|f]"] }));
        let mut sink = MemorySink::new();
        let report = jinja_pipeline()
            .with_expansion_threshold(4)
            .run(&locales(&["xx"]), &source, &mut sink);

        let xx = report.outcome("xx").unwrap();
        let bytes = sink.get("xx").unwrap().len();
        assert_eq!(xx.status, LocaleStatus::Written { phrases: 8, bytes });
        assert!(xx.diagnostics.contains(&Diagnostic::LargeExpansion {
            locale: "xx".into(),
            entries: 8
        }));
    }

    #[test]
    fn each_locale_starts_from_fresh_config() {
        let mut source = fixture_source();
        source.templates.insert("fr".into(), json!({ "name": "${MyTestString}" }));
        let mut sink = MemorySink::new();
        jinja_pipeline().run(&locales(&["de", "fr"]), &source, &mut sink);

        // de overrides MyTestString; fr has no locale config and must not see it.
        assert!(sink.get("fr").unwrap().contains("\"name\": \"some test string\""));
    }
}
