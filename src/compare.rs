//! Mapping comparison
//!
//! Compares two mappings documents by content rather than by byte order:
//! both sides are flattened and matched path by path.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use similar::{ChangeTag, TextDiff};

use crate::error::Result;
use crate::flatten::{flatten_json, FlatMap};

/// Result of a comparison
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comparison {
    /// Per-path differences, sorted by path
    pub changes: Vec<MappingChange>,
    /// Summary of the comparison
    pub summary: String,
}

impl Comparison {
    pub fn is_equal(&self) -> bool {
        self.changes.is_empty()
    }
}

/// A difference at one flattened path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingChange {
    pub change_type: ChangeType,
    /// Flattened path (e.g. "mappings.feed_item.properties._id.type")
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    /// Present in expected, absent in actual
    Missing,
    /// Present in actual only
    Unexpected,
    /// Present in both with different values
    Changed,
}

/// Compare two documents by their flattened content.
pub fn compare(expected: &Value, actual: &Value, flatten_sequences: bool) -> Result<Comparison> {
    let expected = flatten_json(expected, flatten_sequences)?;
    let actual = flatten_json(actual, flatten_sequences)?;

    let mut changes = Vec::new();

    for (path, want) in &expected {
        match actual.get(path) {
            None => changes.push(MappingChange {
                change_type: ChangeType::Missing,
                path: path.clone(),
                expected: Some(want.clone()),
                actual: None,
            }),
            Some(got) if got != want => changes.push(MappingChange {
                change_type: ChangeType::Changed,
                path: path.clone(),
                expected: Some(want.clone()),
                actual: Some(got.clone()),
            }),
            Some(_) => {}
        }
    }

    for (path, got) in &actual {
        if !expected.contains_key(path) {
            changes.push(MappingChange {
                change_type: ChangeType::Unexpected,
                path: path.clone(),
                expected: None,
                actual: Some(got.clone()),
            });
        }
    }

    changes.sort_by(|a, b| a.path.cmp(&b.path));

    let summary = if changes.is_empty() {
        format!("{} paths match", expected.len())
    } else {
        format!("{} of {} paths differ", changes.len(), expected.len().max(actual.len()))
    };

    Ok(Comparison { changes, summary })
}

/// Unified line diff of the flattened views of two documents
pub fn render_diff(expected: &Value, actual: &Value, flatten_sequences: bool) -> Result<String> {
    let expected = flat_text(&flatten_json(expected, flatten_sequences)?);
    let actual = flat_text(&flatten_json(actual, flatten_sequences)?);

    let diff = TextDiff::from_lines(&expected, &actual);
    let mut out = String::new();
    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => '-',
            ChangeTag::Insert => '+',
            ChangeTag::Equal => continue,
        };
        out.push(sign);
        out.push_str(change.value());
    }
    Ok(out)
}

fn flat_text(flat: &FlatMap) -> String {
    flat.iter()
        .map(|(path, value)| format!("{} = {}\n", path, value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reordered_documents_are_equal() {
        let expected = json!({"mappings": {"t": {"properties": {"a": {"type": "keyword"}, "b": {"type": "text"}}}}});
        let actual = json!({"mappings": {"t": {"properties": {"b": {"type": "text"}, "a": {"type": "keyword"}}}}});

        let result = compare(&expected, &actual, false).unwrap();
        assert!(result.is_equal());
        assert_eq!(result.summary, "2 paths match");
    }

    #[test]
    fn test_changes_detected() {
        let expected = json!({"p": {"a": {"type": "keyword"}, "b": {"type": "text"}}});
        let actual = json!({"p": {"a": {"type": "text"}, "c": {"type": "long"}}});

        let result = compare(&expected, &actual, false).unwrap();
        assert!(!result.is_equal());

        let kinds: Vec<(ChangeType, &str)> = result
            .changes
            .iter()
            .map(|c| (c.change_type, c.path.as_str()))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (ChangeType::Changed, "p.a.type"),
                (ChangeType::Missing, "p.b.type"),
                (ChangeType::Unexpected, "p.c.type"),
            ]
        );
    }

    #[test]
    fn test_render_diff_only_shows_changes() {
        let expected = json!({"a": 1, "b": 2});
        let actual = json!({"a": 1, "b": 3});

        let diff = render_diff(&expected, &actual, false).unwrap();
        assert_eq!(diff, "-b = 2\n+b = 3\n");
    }
}
