//! Output curation and serialization of the finished model.
//!
//! Arrays under the curated fields (`phrases`, `values`, `synonyms`) are
//! cleaned on the way out:
//!
//! 1. blank entries are dropped (`null`, whitespace-only strings)
//! 2. duplicates are dropped, first occurrence wins
//! 3. the rest is sorted ascending by its sort text
//!
//! The sort text of an entry is its [`value_to_text`] form, except that every
//! object sorts as `[object Object]`, so entity value objects land after
//! capitalized strings and before lowercase ones.
//!
//! Curation applies at any depth, so the `synonyms` of an entity value object
//! inside a `values` array are cleaned as well. Everything else is written
//! unchanged, in insertion order, pretty-printed with two-space indentation.

use crate::expr::value_to_text;
use crate::walk::{NodeKey, walk};
use serde_json::Value;
use std::collections::HashSet;
use std::convert::Infallible;

/// Fields whose arrays are filtered, deduplicated, and sorted.
pub const CURATED_FIELDS: [&str; 3] = ["phrases", "values", "synonyms"];

const OBJECT_SORT_TEXT: &str = "[object Object]";

/// Curate every curated-field array in `model`, in place.
pub fn sanitize(model: &mut Value) {
    let result = walk::<_, Infallible>(model, &mut |key, value| Ok(curate_node(key, value)));
    match result {
        Ok(()) => {}
        Err(never) => match never {},
    }
}

/// Curate a copy of `model` and pretty-print it.
pub fn to_model_json(model: &Value) -> Result<String, serde_json::Error> {
    let mut curated = model.clone();
    sanitize(&mut curated);
    serde_json::to_string_pretty(&curated)
}

fn curate_node(key: NodeKey<'_>, value: Value) -> Value {
    match value {
        Value::Array(items) if is_curated(key) => Value::Array(curate(items)),
        other => other,
    }
}

fn is_curated(key: NodeKey<'_>) -> bool {
    CURATED_FIELDS.iter().any(|field| key.is_field(field))
}

/// Drop blanks and duplicates, then sort by [`sort_text`].
///
/// Duplicates are detected on the compact JSON form, so two objects only
/// match when their keys are in the same order.
pub fn curate(items: Vec<Value>) -> Vec<Value> {
    let mut seen: HashSet<String> = HashSet::with_capacity(items.len());
    let mut kept: Vec<Value> = Vec::with_capacity(items.len());
    for item in items {
        if is_blank(&item) || !seen.insert(item.to_string()) {
            continue;
        }
        kept.push(item);
    }
    kept.sort_by_cached_key(sort_text);
    kept
}

/// Text a curated entry is ordered by.
pub fn sort_text(value: &Value) -> String {
    match value {
        Value::Object(_) => OBJECT_SORT_TEXT.to_string(),
        Value::Array(items) => items.iter().map(sort_text).collect::<Vec<_>>().join(","),
        other => value_to_text(other),
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(_) => value_to_text(value).trim().is_empty(),
        Value::Bool(_) | Value::Number(_) | Value::Object(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spintax::expand_phrase;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn curate_drops_blanks_and_duplicates_and_sorts() {
        assert_eq!(
            curate(vec![json!("b"), json!("a"), json!(""), json!("a")]),
            vec![json!("a"), json!("b")]
        );
    }

    #[test]
    fn curate_drops_whitespace_and_null() {
        assert_eq!(
            curate(vec![json!("  "), json!(null), json!("x"), json!([])]),
            vec![json!("x")]
        );
    }

    #[test]
    fn curate_sorts_numbers_by_text() {
        assert_eq!(
            curate(vec![json!(9), json!(10), json!(9)]),
            vec![json!(10), json!(9)]
        );
    }

    #[test]
    fn objects_sort_between_capitalized_and_lowercase() {
        let visa = json!({ "value": "Visa" });
        assert_eq!(
            curate(vec![json!("cash"), visa.clone(), json!("amex"), json!("Zulu")]),
            vec![json!("Zulu"), visa, json!("amex"), json!("cash")]
        );
    }

    #[test]
    fn equal_objects_are_deduplicated() {
        let visa = json!({ "value": "Visa", "id": "visa" });
        assert_eq!(
            curate(vec![visa.clone(), json!("cash"), visa.clone()]),
            vec![visa, json!("cash")]
        );
    }

    #[test]
    fn sort_text_of_nested_objects() {
        assert_eq!(sort_text(&json!([1, { "a": 2 }])), "1,[object Object]");
        assert_eq!(sort_text(&json!(null)), "");
    }

    #[test]
    fn curate_handles_full_spintax_expansion() {
        let phrase = vec!["[a|b|c]"; 10].join(" ");
        let mut items: Vec<Value> = expand_phrase(&phrase).into_iter().map(Value::String).collect();
        let copy = items.clone();
        items.extend(copy);
        assert_eq!(items.len(), 2 * 59_049);

        let curated = curate(items);
        assert_eq!(curated.len(), 59_049);
        assert_eq!(curated.first(), Some(&json!("a a a a a a a a a a")));
        assert_eq!(curated.last(), Some(&json!("c c c c c c c c c c")));
    }

    #[test]
    fn sanitize_only_touches_curated_fields() {
        let mut model = json!({
            "invocation": "b",
            "examples": ["b", "a", "a"],
            "intents": {
                "HelpIntent": { "phrases": ["b", "a", "", "a"] }
            }
        });
        sanitize(&mut model);
        assert_eq!(
            model,
            json!({
                "invocation": "b",
                "examples": ["b", "a", "a"],
                "intents": {
                    "HelpIntent": { "phrases": ["a", "b"] }
                }
            })
        );
    }

    #[test]
    fn sanitize_reaches_nested_synonyms() {
        let mut model = json!({
            "entityTypes": {
                "PaymentType": {
                    "values": [
                        "cash",
                        { "value": "Visa", "synonyms": ["Visa Card", "Visa", "", "Visa"] },
                        "cash"
                    ]
                }
            }
        });
        sanitize(&mut model);
        assert_eq!(
            model,
            json!({
                "entityTypes": {
                    "PaymentType": {
                        "values": [
                            { "value": "Visa", "synonyms": ["Visa", "Visa Card"] },
                            "cash"
                        ]
                    }
                }
            })
        );
    }

    #[test]
    fn non_array_curated_field_is_left_alone() {
        let mut model = json!({ "values": "not a list" });
        sanitize(&mut model);
        assert_eq!(model, json!({ "values": "not a list" }));
    }

    #[test]
    fn to_model_json_pretty_prints_in_insertion_order() {
        let model = json!({ "version": "4.1.2", "alpha": { "phrases": ["b", "a"] } });
        let text = to_model_json(&model).unwrap();
        let expected = concat!(
            "{\n",
            "  \"version\": \"4.1.2\",\n",
            "  \"alpha\": {\n",
            "    \"phrases\": [\n",
            "      \"a\",\n",
            "      \"b\"\n",
            "    ]\n",
            "  }\n",
            "}"
        );
        assert_eq!(text, expected);
    }
}
