//! Spintax expansion for `phrases` arrays.
//!
//! A phrase may contain bracket groups of `|`-separated alternatives. Each
//! phrase expands to every combination of one alternative per group:
//!
//! ```text
//! "What [now|can I do]"        → "What now", "What can I do"
//! "Help [ | me] [ | please]"   → "Help", "Help please", "Help me", "Help me please"
//! ```
//!
//! The first group varies slowest. Results are trimmed and runs of whitespace
//! collapse to one space, so empty alternatives leave no gaps.
//!
//! ## Growth
//!
//! A phrase with `m` groups of `k` alternatives produces `k^m` strings. Ten
//! groups of three alternatives is already 59 049 phrases. This is expected,
//! not an error; the pipeline reports unusually large arrays as a diagnostic.
//!
//! ## Unsupported Syntax
//!
//! Groups do not nest. A phrase with a `[` inside an open group, a `]` without
//! an opening bracket, or an unclosed `[` is kept as a single literal.

use crate::walk::NodeKey;
use serde_json::Value;

/// The only field whose arrays are expanded.
pub const PHRASES_FIELD: &str = "phrases";

/// One parsed piece of a phrase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    Literal(&'a str),
    Group(Vec<&'a str>),
}

/// Split a phrase into literal text and alternative groups.
///
/// Returns a single literal segment for phrases with nested or unbalanced
/// brackets.
pub fn parse(phrase: &str) -> Vec<Segment<'_>> {
    try_parse(phrase).unwrap_or_else(|| vec![Segment::Literal(phrase)])
}

fn try_parse(phrase: &str) -> Option<Vec<Segment<'_>>> {
    let mut segments = Vec::new();
    let mut rest = phrase;

    while let Some(open) = rest.find(['[', ']']) {
        if rest[open..].starts_with(']') {
            return None;
        }
        let body_start = open + 1;
        let close = body_start + rest[body_start..].find(['[', ']'])?;
        if rest[close..].starts_with('[') {
            return None;
        }
        if open > 0 {
            segments.push(Segment::Literal(&rest[..open]));
        }
        segments.push(Segment::Group(rest[body_start..close].split('|').collect()));
        rest = &rest[close + 1..];
    }
    if !rest.is_empty() {
        segments.push(Segment::Literal(rest));
    }
    Some(segments)
}

/// Every variant of a single phrase, normalized.
pub fn expand_phrase(phrase: &str) -> Vec<String> {
    let mut variants = vec![String::new()];
    for segment in parse(phrase) {
        match segment {
            Segment::Literal(text) => {
                for variant in &mut variants {
                    variant.push_str(text);
                }
            }
            Segment::Group(alternatives) => {
                variants = variants
                    .iter()
                    .flat_map(|prefix| alternatives.iter().map(move |alt| format!("{prefix}{alt}")))
                    .collect();
            }
        }
    }
    variants.iter().map(|v| normalize_whitespace(v)).collect()
}

/// Expand every string in a phrases array, in order. Non-string items are
/// kept as they are.
pub fn expand_phrases(items: Vec<Value>) -> Vec<Value> {
    let mut expanded = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Value::String(phrase) => {
                expanded.extend(expand_phrase(&phrase).into_iter().map(Value::String));
            }
            other => expanded.push(other),
        }
    }
    expanded
}

/// Walker transform for the expansion pass.
pub fn expand(key: NodeKey<'_>, value: Value) -> Value {
    match value {
        Value::Array(items) if key.is_field(PHRASES_FIELD) => Value::Array(expand_phrases(items)),
        other => other,
    }
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
