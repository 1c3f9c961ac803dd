//! `${...}` placeholder resolution against the configuration mapping.
//!
//! ## Two Placeholder Forms
//!
//! The resolver distinguishes two cases, and the distinction changes the type
//! of the output:
//!
//! | Template string | Config | Result |
//! |-----------------|--------|--------|
//! | `"${Colors}"` | `Colors = ["red", "blue"]` | `["red", "blue"]` (array) |
//! | `"${Count}"` | `Count = 3` | `3` (number) |
//! | `"v${Count}"` | `Count = 3` | `"v3"` (string) |
//! | `"${version}.${1+1}"` | `version = "4.1"` | `"4.1.2"` |
//!
//! 1. **Whole value**: the string is exactly `${K}` and `K` is a configuration
//!    key. The raw configuration value replaces the string, whatever its type.
//! 2. **Embedded**: every `${expr}` in the string is evaluated, turned into
//!    text with [`value_to_text`], and spliced into the surrounding text.
//!
//! Spliced results are never scanned again within the same pass. A
//! configuration value that itself contains a placeholder is resolved by the
//! pipeline's second pass.
//!
//! ## Expression Language
//!
//! Expressions go through the [`ExpressionEvaluator`] trait. The stock
//! [`JinjaEvaluator`] compiles them with minijinja, so the grammar is Jinja
//! expression syntax: arithmetic, comparisons, `and`/`or`/`not`, `~` for
//! string concatenation, `a.b` / `a[0]` lookups, and filters. Configuration keys
//! are the variable namespace. Unknown variables are errors.

use crate::model_config::ModelConfig;
use minijinja::{Environment, UndefinedBehavior};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExprError {
    #[error("invalid expression `{expression}`: {message}")]
    Syntax { expression: String, message: String },
    #[error("could not evaluate `{expression}`: {message}")]
    Evaluation { expression: String, message: String },
    #[error("`{expression}` refers to an undefined value")]
    Undefined { expression: String },
}

/// Non-greedy, so `${a}-${b}` yields two placeholders rather than one.
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{(.+?)\}").expect("placeholder pattern is valid"));

/// Evaluates a single expression against a set of named bindings.
///
/// Implementations decide the grammar; the resolver only needs a JSON value
/// back.
pub trait ExpressionEvaluator {
    fn evaluate(
        &self,
        expression: &str,
        bindings: &Map<String, Value>,
    ) -> Result<Value, ExprError>;
}

/// Jinja-syntax expression evaluator backed by minijinja.
#[derive(Debug, Clone, Copy, Default)]
pub struct JinjaEvaluator;

impl ExpressionEvaluator for JinjaEvaluator {
    fn evaluate(
        &self,
        expression: &str,
        bindings: &Map<String, Value>,
    ) -> Result<Value, ExprError> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);

        let compiled = env
            .compile_expression(expression)
            .map_err(|e| ExprError::Syntax {
                expression: expression.to_string(),
                message: e.to_string(),
            })?;
        let result = compiled
            .eval(bindings)
            .map_err(|e| ExprError::Evaluation {
                expression: expression.to_string(),
                message: e.to_string(),
            })?;

        // Strict mode only errors when an undefined value is *used*; a bare
        // unknown name comes back as undefined.
        if result.is_undefined() {
            return Err(ExprError::Undefined {
                expression: expression.to_string(),
            });
        }
        serde_json::to_value(&result).map_err(|e| ExprError::Evaluation {
            expression: expression.to_string(),
            message: e.to_string(),
        })
    }
}

/// Resolves placeholders in string nodes. Used as the walker transform for
/// the two expression passes.
pub struct Resolver<'a, E: ExpressionEvaluator + ?Sized> {
    config: &'a ModelConfig,
    evaluator: &'a E,
}

impl<'a, E: ExpressionEvaluator + ?Sized> Resolver<'a, E> {
    pub fn new(config: &'a ModelConfig, evaluator: &'a E) -> Self {
        Self { config, evaluator }
    }

    /// Resolve one node. Non-strings are returned unchanged.
    pub fn resolve(&self, value: Value) -> Result<Value, ExprError> {
        let Value::String(text) = value else {
            return Ok(value);
        };
        if let Some(raw) = self.whole_value(&text) {
            return Ok(raw.clone());
        }
        if !has_placeholder(&text) {
            return Ok(Value::String(text));
        }
        self.resolve_embedded(&text).map(Value::String)
    }

    /// The configuration value for a string that is exactly `${key}`.
    fn whole_value(&self, text: &str) -> Option<&'a Value> {
        let key = text.strip_prefix("${")?.strip_suffix('}')?;
        self.config.get(key)
    }

    fn resolve_embedded(&self, text: &str) -> Result<String, ExprError> {
        let mut resolved = String::with_capacity(text.len());
        let mut last = 0;
        for caps in PLACEHOLDER.captures_iter(text) {
            let (Some(whole), Some(expression)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let value = self
                .evaluator
                .evaluate(expression.as_str(), self.config.as_map())?;
            resolved.push_str(&text[last..whole.start()]);
            resolved.push_str(&value_to_text(&value));
            last = whole.end();
        }
        resolved.push_str(&text[last..]);
        Ok(resolved)
    }
}

/// True if `text` contains at least one `${...}` placeholder.
pub fn has_placeholder(text: &str) -> bool {
    PLACEHOLDER.is_match(text)
}

/// Convert a JSON value to the text spliced into a template string.
///
/// - Integral numbers print without a fraction (`2`, never `2.0`)
/// - `null` prints as nothing
/// - Arrays join their elements' text with `,`
/// - Objects print as compact JSON
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => {
                format!("{}", f as i64)
            }
            _ => n.to_string(),
        },
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(items) => items.iter().map(value_to_text).collect::<Vec<_>>().join(","),
        Value::Object(_) => value.to_string(),
    }
}
