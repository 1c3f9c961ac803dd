//! # Magic Model
//!
//! Expands voice-assistant model templates into final language models.
//! A template is a plain JSON model with two kinds of shorthand:
//!
//! - `${...}` placeholders, resolved against a per-locale configuration
//! - `[a|b]` spintax groups in `phrases`, expanded into every variant
//!
//! ```text
//! "phrases": ["What [now|can I do]"]   →   "phrases": ["What can I do", "What now"]
//! "version": "${version}.${1+1}"       →   "version": "4.1.2"
//! ```
//!
//! # Architecture: One Walker, Three Passes
//!
//! ```text
//! magicModel/<locale>-template.json ─┐
//! magicModel/config.json ────────────┤
//! magicModel/config-<locale>.json ───┘
//!            │
//!            ▼
//!   resolve ${...}  (pass 1)
//!   resolve ${...}  (pass 2)   ← config values may contain placeholders
//!   expand spintax  (pass 3)   ← only after all placeholders are gone
//!   curate + serialize         ← phrases/values/synonyms: dedup, drop blanks, sort
//!            │
//!            ▼
//! models/<locale>.json
//! ```
//!
//! Every pass is the same in-place tree walk ([`walk::walk`]) with a different
//! per-node transform. Locales are processed one at a time; a broken locale
//! is reported and skipped without affecting the others.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`walk`] | Generic in-place traversal of a JSON document |
//! | [`expr`] | `${...}` placeholder resolution and the expression evaluator seam |
//! | [`spintax`] | `[a|b]` group parsing and cross-product expansion |
//! | [`sanitize`] | Curation of `phrases`/`values`/`synonyms` and final serialization |
//! | [`pipeline`] | Orchestrates the passes per locale and collects outcomes |
//! | [`model_config`] | The merged global + locale variable mapping |
//! | [`store`] | Source/sink traits and their filesystem implementations |
//! | [`naming`] | File names of the model folder layout |
//! | [`config`] | `magic-model.toml` loading, merging, and validation |
//! | [`types`] | Run report types shared by the pipeline and CLI output |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Untyped Documents
//!
//! Templates have no fixed schema: they are whatever the target voice platform
//! expects. Documents stay `serde_json::Value` end to end, with the
//! `preserve_order` feature so generated models diff cleanly against their
//! templates.
//!
//! ## Whole-Value Placeholders Keep Their Type
//!
//! `"values": "${PaymentTypes}"` becomes the configured array, not its text.
//! Only a string that is exactly one `${key}` gets this treatment; anything
//! with surrounding text is stringified. See [`expr`].
//!
//! ## Missing Files Are Outcomes, Not Errors
//!
//! Every locale produces a [`types::LocaleOutcome`]. Missing configuration
//! files are diagnostics; a missing template skips the locale; malformed input
//! fails only that locale.
//!
//! ## Combinatorial Growth
//!
//! Spintax output grows multiplicatively with the number of groups in a phrase.
//! That is the point of the feature, so it is never an error; arrays past a
//! configurable size are reported so an accidental explosion is noticed.

pub mod config;
pub mod expr;
pub mod model_config;
pub mod naming;
pub mod output;
pub mod pipeline;
pub mod sanitize;
pub mod spintax;
pub mod store;
pub mod types;
pub mod walk;

pub use expr::{ExpressionEvaluator, JinjaEvaluator};
pub use model_config::ModelConfig;
pub use pipeline::{ModelPipeline, PipelineError};
pub use store::{DirSink, DirSource, MemorySink, ModelSink, ModelSource};
pub use types::{Diagnostic, LocaleOutcome, LocaleStatus, RunReport};

#[cfg(test)]
pub(crate) mod test_helpers;
