//! Generic in-place traversal of a template document.
//!
//! Every pass of the pipeline (expression resolution, spintax expansion,
//! output curation) is the same walk with a different per-node transform.
//! The walker owns the traversal rules; transforms only see one node at a time.
//!
//! ## Visiting Rules
//!
//! ```text
//! { "a": { "b": "x" }, "c": ["y"] }
//!
//! transform("a", {"b": "x"})   ← container: transform first...
//!   transform("b", "x")        ← ...then recurse into the result
//! transform("c", ["y"])
//!   transform(0, "y")
//! ```
//!
//! - Containers are transformed before their children, and the walker descends
//!   into whatever the transform returned.
//! - Scalars are transformed exactly once. A scalar that the transform turns
//!   into a container (whole-value placeholder substitution does this) is not
//!   descended into during the same walk; the next walk will see it.
//! - The root node is never passed to the transform.
//!
//! A transform that keeps growing the containers it is handed will not
//! terminate. Spintax expansion only produces arrays of strings, so its
//! recursion bottoms out immediately.

use serde_json::Value;
use std::fmt;

/// The position of a node inside its parent container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKey<'a> {
    /// Entry of an object, by key.
    Field(&'a str),
    /// Item of an array, by index.
    Index(usize),
}

impl NodeKey<'_> {
    /// True when this is an object entry named `name`.
    pub fn is_field(&self, name: &str) -> bool {
        matches!(self, NodeKey::Field(key) if *key == name)
    }
}

impl fmt::Display for NodeKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKey::Field(key) => f.write_str(key),
            NodeKey::Index(index) => write!(f, "[{index}]"),
        }
    }
}

/// Walk every descendant of `node`, replacing each value with the result of
/// `transform`.
///
/// Stops at the first error. The node being transformed when the error
/// occurred is left as `null`; callers discard the document on failure.
pub fn walk<F, E>(node: &mut Value, transform: &mut F) -> Result<(), E>
where
    F: FnMut(NodeKey<'_>, Value) -> Result<Value, E>,
{
    match node {
        Value::Object(map) => {
            for (key, slot) in map.iter_mut() {
                visit(NodeKey::Field(key.as_str()), slot, transform)?;
            }
        }
        Value::Array(items) => {
            for (index, slot) in items.iter_mut().enumerate() {
                visit(NodeKey::Index(index), slot, transform)?;
            }
        }
        _ => {}
    }
    Ok(())
}

fn visit<F, E>(key: NodeKey<'_>, slot: &mut Value, transform: &mut F) -> Result<(), E>
where
    F: FnMut(NodeKey<'_>, Value) -> Result<Value, E>,
{
    let current = std::mem::take(slot);
    let was_container = matches!(current, Value::Object(_) | Value::Array(_));
    *slot = transform(key, current)?;
    if was_container {
        walk(slot, transform)?;
    }
    Ok(())
}
