//! Shared typed models: the input document tree, its normalized form, and
//! the cache key/value types that identify a query shape.

use indexmap::IndexMap;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::errors::ShapeResult;
use crate::shape::hash;

// ---------------------------------------------------------------------------
// Input documents
// ---------------------------------------------------------------------------

/// Insertion-ordered key/value document, as handed over by a database driver.
pub type Document = IndexMap<String, Value>;

/// A concrete literal.  Its content never participates in a shape.
#[derive(Clone, Debug, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// Anything else a driver may carry (object ids, dates, big integers),
    /// kept in its textual form.
    Other(String),
}

/// A query or sort document node.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Scalar(Scalar),
    Document(Document),
    Array(Vec<Value>),
}

impl Value {
    /// Build a document node from `(key, value)` pairs, keeping their order.
    pub fn document<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Value::Document(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn array<V, I>(items: I) -> Self
    where
        V: Into<Value>,
        I: IntoIterator<Item = V>,
    {
        Value::Array(items.into_iter().map(Into::into).collect())
    }

    /// Parse JSON text into a document tree, keeping object key order.
    pub fn from_json_str(text: &str) -> ShapeResult<Self> {
        let parsed: serde_json::Value = serde_json::from_str(text)?;
        Ok(parsed.into())
    }

    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Value::Document(doc) => Some(doc),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Scalar(Scalar::Bool(b)),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Scalar(Scalar::Int(i))
                } else if let Some(f) = n.as_f64() {
                    Value::Scalar(Scalar::Float(f))
                } else {
                    Value::Scalar(Scalar::Other(n.to_string()))
                }
            }
            serde_json::Value::String(s) => Value::Scalar(Scalar::String(s)),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Document(
                map.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
            ),
        }
    }
}

impl From<Scalar> for Value {
    fn from(value: Scalar) -> Self {
        Value::Scalar(value)
    }
}

impl From<Document> for Value {
    fn from(value: Document) -> Self {
        Value::Document(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Scalar(Scalar::String(value.to_string()))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Scalar(Scalar::String(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Scalar(Scalar::Int(value))
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Scalar(Scalar::Int(i64::from(value)))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Scalar(Scalar::Float(value))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Scalar(Scalar::Bool(value))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

// ---------------------------------------------------------------------------
// Normalized documents
// ---------------------------------------------------------------------------

/// A node of a normalized document.  Every literal has become [`Sentinel`].
///
/// [`Sentinel`]: NormalizedValue::Sentinel
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum NormalizedValue {
    Null,
    Sentinel,
    Document(NormalizedDocument),
    Array(Vec<NormalizedValue>),
}

/// Value every literal is replaced with.
pub const SENTINEL: i64 = 1;

impl Serialize for NormalizedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            NormalizedValue::Null => serializer.serialize_unit(),
            NormalizedValue::Sentinel => serializer.serialize_i64(SENTINEL),
            NormalizedValue::Document(doc) => doc.serialize(serializer),
            NormalizedValue::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

/// Key-sorted document of normalized values.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct NormalizedDocument {
    entries: Vec<(String, NormalizedValue)>,
}

impl NormalizedDocument {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Sorts `entries` by key; the resulting order is what gets hashed.
    pub(crate) fn from_entries(mut entries: Vec<(String, NormalizedValue)>) -> Self {
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Self { entries }
    }

    pub fn entries(&self) -> &[(String, NormalizedValue)] {
        &self.entries
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn get(&self, key: &str) -> Option<&NormalizedValue> {
        self.entries
            .binary_search_by(|(k, _)| k.as_str().cmp(key))
            .ok()
            .map(|idx| &self.entries[idx].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for NormalizedDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

// ---------------------------------------------------------------------------
// Cache key / value
// ---------------------------------------------------------------------------

/// Identity of a query shape: the collection plus the hashes of its
/// normalized filter and sort documents.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct QueryHashKey {
    collection_name: String,
    query_hash: String,
    sort_hash: String,
}

impl QueryHashKey {
    pub fn new(
        collection_name: impl Into<String>,
        query_hash: impl Into<String>,
        sort_hash: impl Into<String>,
    ) -> Self {
        Self {
            collection_name: collection_name.into(),
            query_hash: query_hash.into(),
            sort_hash: sort_hash.into(),
        }
    }

    pub fn collection_name(&self) -> &str {
        &self.collection_name
    }

    pub fn query_hash(&self) -> &str {
        &self.query_hash
    }

    pub fn sort_hash(&self) -> &str {
        &self.sort_hash
    }

    /// Stable 64-bit hash over all three fields.
    pub fn hash_code(&self) -> u64 {
        hash::key_hash(self)
    }
}

/// A registered shape.  Built once per distinct [`QueryHashKey`].
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct QueryHashInfo {
    query_hash_key: QueryHashKey,
    query_doc: Option<NormalizedDocument>,
    sort_doc: Option<NormalizedDocument>,
}

impl QueryHashInfo {
    pub(crate) fn new(
        query_hash_key: QueryHashKey,
        query_doc: Option<NormalizedDocument>,
        sort_doc: Option<NormalizedDocument>,
    ) -> Self {
        Self {
            query_hash_key,
            query_doc,
            sort_doc,
        }
    }

    pub fn query_hash_key(&self) -> &QueryHashKey {
        &self.query_hash_key
    }

    /// `None` when the query document was null.
    pub fn query_doc(&self) -> Option<&NormalizedDocument> {
        self.query_doc.as_ref()
    }

    pub fn sort_doc(&self) -> Option<&NormalizedDocument> {
        self.sort_doc.as_ref()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
