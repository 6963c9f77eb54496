//! Literal-erasing normalization of query and sort documents.
//!
//! Field names, operator keys and nesting survive; every literal becomes the
//! sentinel. Entries are sorted by key so insertion order does not leak into
//! the hash. Sort documents prefix each key with its 1-based position, which
//! keeps field order significant after sorting.

use crate::models::{Document, NormalizedDocument, NormalizedValue, Value};
use crate::shape::operators::need_to_trim_list;

pub fn normalize_object(value: &Value) -> NormalizedValue {
    match value {
        // A null comparison is not "any value" for index selection.
        Value::Null => NormalizedValue::Null,
        Value::Document(doc) => NormalizedValue::Document(normalize_map(Some(doc), false)),
        Value::Array(items) => NormalizedValue::Array(normalize_list(items)),
        Value::Scalar(_) => NormalizedValue::Sentinel,
    }
}

pub fn normalize_list(items: &[Value]) -> Vec<NormalizedValue> {
    items.iter().map(normalize_object).collect()
}

pub fn normalize_map(doc: Option<&Document>, prefix_fields: bool) -> NormalizedDocument {
    let doc = match doc {
        Some(doc) if !doc.is_empty() => doc,
        _ => return NormalizedDocument::empty(),
    };

    let entries = doc
        .iter()
        .enumerate()
        .map(|(idx, (key, value))| {
            let out_key = if prefix_fields {
                format!("{}{key}", idx + 1)
            } else {
                key.clone()
            };
            let normalized = match value {
                Value::Array(_) if !prefix_fields && !need_to_trim_list(key) => {
                    NormalizedValue::Array(vec![NormalizedValue::Sentinel])
                }
                _ => normalize_object(value),
            };
            (out_key, normalized)
        })
        .collect();

    NormalizedDocument::from_entries(entries)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
