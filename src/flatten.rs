//! Tree flattening
//!
//! Projects a nested value onto a flat `path -> leaf` map, so two documents
//! that are equal up to key order compare equal:
//!
//! ```
//! use es_mappings::flatten::flatten_json;
//! use serde_json::json;
//!
//! let flat = flatten_json(&json!({"a": {"b": 1, "c": [2, 3]}}), true).unwrap();
//! assert_eq!(flat["a.c.1"], json!(3));
//! ```

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::error::{MappingError, Result};

/// Flattened view: dotted path to leaf value
pub type FlatMap = BTreeMap<String, Value>;

const ROOT: &str = "<root>";

/// A composite value whose mapping keys are not restricted to strings.
///
/// JSON objects always have string keys; other sources (YAML, map types
/// keyed by integers) do not, and such keys cannot be turned into a path.
#[derive(Debug, Clone, PartialEq)]
pub enum Tree {
    Leaf(Value),
    List(Vec<Tree>),
    Map(Vec<(Value, Tree)>),
}

impl Tree {
    fn kind(&self) -> &'static str {
        match self {
            Tree::Leaf(_) => "a scalar",
            Tree::List(_) => "a sequence",
            Tree::Map(_) => "a mapping",
        }
    }

    /// A leaf holding a JSON object or array, as the equivalent composite
    fn expanded_leaf(&self) -> Option<Tree> {
        match self {
            Tree::Leaf(value @ (Value::Object(_) | Value::Array(_))) => Some(Tree::from(value.clone())),
            _ => None,
        }
    }

    /// Convert back into JSON. Fails on the first non-string key.
    fn to_value_at(&self, path: &str) -> Result<Value> {
        match self {
            Tree::Leaf(value) => Ok(value.clone()),
            Tree::List(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| item.to_value_at(&format!("{}.{}", path, i)))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            Tree::Map(entries) => {
                let mut map = Map::with_capacity(entries.len());
                for (key, value) in entries {
                    let key = string_key(path, key)?;
                    let child = value.to_value_at(&format!("{}.{}", path, key))?;
                    map.insert(key.to_string(), child);
                }
                Ok(Value::Object(map))
            }
        }
    }
}

impl From<Value> for Tree {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Tree::Map(
                map.into_iter()
                    .map(|(k, v)| (Value::String(k), Tree::from(v)))
                    .collect(),
            ),
            Value::Array(items) => Tree::List(items.into_iter().map(Tree::from).collect()),
            leaf => Tree::Leaf(leaf),
        }
    }
}

/// Flatten a mapping. Top-level keys become the first path segment.
///
/// With `flatten_sequences`, element `i` of a sequence lands under
/// `path.i`; otherwise the whole sequence is one leaf.
pub fn flatten(tree: &Tree, flatten_sequences: bool) -> Result<FlatMap> {
    if let Some(expanded) = tree.expanded_leaf() {
        return flatten(&expanded, flatten_sequences);
    }
    let Tree::Map(entries) = tree else {
        return Err(MappingError::NotAMapping(tree.kind()));
    };

    let mut out = FlatMap::new();
    for (key, value) in entries {
        let key = string_key(ROOT, key)?;
        flatten_into(&mut out, key.to_string(), value, flatten_sequences)?;
    }
    Ok(out)
}

/// Flatten a JSON object
pub fn flatten_json(value: &Value, flatten_sequences: bool) -> Result<FlatMap> {
    flatten(&Tree::from(value.clone()), flatten_sequences)
}

fn flatten_into(out: &mut FlatMap, prefix: String, node: &Tree, flatten_sequences: bool) -> Result<()> {
    if let Some(expanded) = node.expanded_leaf() {
        return flatten_into(out, prefix, &expanded, flatten_sequences);
    }
    match node {
        Tree::Map(entries) => {
            for (key, value) in entries {
                let key = string_key(&prefix, key)?;
                flatten_into(out, format!("{}.{}", prefix, key), value, flatten_sequences)?;
            }
        }
        Tree::List(items) if flatten_sequences => {
            for (i, item) in items.iter().enumerate() {
                flatten_into(out, format!("{}.{}", prefix, i), item, flatten_sequences)?;
            }
        }
        leaf => {
            let value = leaf.to_value_at(&prefix)?;
            out.insert(prefix, value);
        }
    }
    Ok(())
}

fn string_key<'v>(path: &str, key: &'v Value) -> Result<&'v str> {
    key.as_str().ok_or_else(|| MappingError::NonStringKey {
        path: path.to_string(),
        key: key.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flatten_with_sequences() {
        let flat = flatten_json(&json!({"a": {"b": 1, "c": [2, 3]}}), true).unwrap();

        let expected: FlatMap = [
            ("a.b".to_string(), json!(1)),
            ("a.c.0".to_string(), json!(2)),
            ("a.c.1".to_string(), json!(3)),
        ]
        .into_iter()
        .collect();
        assert_eq!(flat, expected);
    }

    #[test]
    fn test_flatten_without_sequences() {
        let flat = flatten_json(&json!({"a": {"b": 1, "c": [2, 3]}}), false).unwrap();

        let expected: FlatMap = [
            ("a.b".to_string(), json!(1)),
            ("a.c".to_string(), json!([2, 3])),
        ]
        .into_iter()
        .collect();
        assert_eq!(flat, expected);
    }

    #[test]
    fn test_nested_sequences_of_objects() {
        let flat = flatten_json(&json!({"items": [{"id": 1}, {"id": 2, "tags": ["x"]}]}), true).unwrap();
        assert_eq!(flat["items.0.id"], json!(1));
        assert_eq!(flat["items.1.id"], json!(2));
        assert_eq!(flat["items.1.tags.0"], json!("x"));
        assert_eq!(flat.len(), 3);
    }

    #[test]
    fn test_key_order_does_not_matter() {
        let a = flatten_json(&json!({"x": {"p": 1, "q": 2}, "y": true}), false).unwrap();
        let b = flatten_json(&json!({"y": true, "x": {"q": 2, "p": 1}}), false).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_non_string_key() {
        let tree = Tree::Map(vec![(
            json!("a"),
            Tree::Map(vec![(json!(1), Tree::Leaf(json!("x")))]),
        )]);

        match flatten(&tree, true) {
            Err(MappingError::NonStringKey { path, key }) => {
                assert_eq!(path, "a");
                assert_eq!(key, "1");
            }
            other => panic!("Expected NonStringKey, got {:?}", other),
        }
    }

    #[test]
    fn test_non_string_key_inside_verbatim_sequence() {
        let tree = Tree::Map(vec![(
            json!("list"),
            Tree::List(vec![Tree::Map(vec![(json!(true), Tree::Leaf(json!(1)))])]),
        )]);

        assert!(matches!(
            flatten(&tree, false),
            Err(MappingError::NonStringKey { .. })
        ));
    }

    #[test]
    fn test_composite_leaf_is_flattened() {
        let tree = Tree::Map(vec![
            (json!("a"), Tree::Leaf(json!({"b": 1}))),
            (json!("c"), Tree::Leaf(json!([2, {"d": 3}]))),
        ]);

        let flat = flatten(&tree, true).unwrap();
        assert_eq!(flat, flatten_json(&json!({"a": {"b": 1}, "c": [2, {"d": 3}]}), true).unwrap());
        assert_eq!(flat["c.1.d"], json!(3));

        let flat = flatten(&tree, false).unwrap();
        assert_eq!(flat["a.b"], json!(1));
        assert_eq!(flat["c"], json!([2, {"d": 3}]));

        let root = flatten(&Tree::Leaf(json!({"x": {"y": true}})), true).unwrap();
        assert_eq!(root["x.y"], json!(true));
    }

    #[test]
    fn test_root_must_be_mapping() {
        assert!(matches!(
            flatten_json(&json!([1, 2]), true),
            Err(MappingError::NotAMapping(_))
        ));
    }

    #[test]
    fn test_empty_containers_contribute_nothing() {
        let flat = flatten_json(&json!({"a": {}, "b": [], "c": null}), true).unwrap();
        assert_eq!(flat.len(), 1);
        assert_eq!(flat["c"], Value::Null);
    }
}
