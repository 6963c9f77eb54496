//! Shape detector: computes shape keys and keeps one [`QueryHashInfo`] per
//! distinct shape for the lifetime of the detector.
//!
//! The detector is an ordinary value.  Construct it once at process start and
//! hand out `&QueryShapeDetector` or `Arc<QueryShapeDetector>` to callers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::DetectorConfig;
use crate::models::{QueryHashInfo, QueryHashKey, Value};
use crate::shape::hash::calculate_doc_hash;
use crate::shape::normalize::normalize_map;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DetectorStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

pub struct QueryShapeDetector {
    config: DetectorConfig,
    cache: RwLock<HashMap<QueryHashKey, Arc<QueryHashInfo>>>,
    hits: AtomicU64,
    misses: AtomicU64,
    warned: AtomicBool,
}

impl Default for QueryShapeDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryShapeDetector {
    pub fn new() -> Self {
        Self::with_config(DetectorConfig::default())
    }

    pub fn with_config(config: DetectorConfig) -> Self {
        Self {
            config,
            cache: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            warned: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Pure key computation; does not touch the cache.
    ///
    /// A `query` or `sort` that is absent or not a document counts as null
    /// and hashes to `""`.
    pub fn calculate_query_hash_key(
        collection_name: &str,
        query: Option<&Value>,
        sort: Option<&Value>,
    ) -> QueryHashKey {
        Self::build_shape(collection_name, query, sort)
            .query_hash_key()
            .clone()
    }

    fn build_shape(
        collection_name: &str,
        query: Option<&Value>,
        sort: Option<&Value>,
    ) -> QueryHashInfo {
        let query_doc = query
            .and_then(Value::as_document)
            .map(|doc| normalize_map(Some(doc), false));
        let sort_doc = sort
            .and_then(Value::as_document)
            .map(|doc| normalize_map(Some(doc), true));
        let key = QueryHashKey::new(
            collection_name,
            calculate_doc_hash(query_doc.as_ref()),
            calculate_doc_hash(sort_doc.as_ref()),
        );
        QueryHashInfo::new(key, query_doc, sort_doc)
    }

    /// Shape hash for a query, registering the shape on first sight.
    pub fn get_query_hash(
        &self,
        collection_name: &str,
        query: Option<&Value>,
        sort: Option<&Value>,
    ) -> String {
        self.shape_info(collection_name, query, sort)
            .query_hash_key()
            .hash_code()
            .to_string()
    }

    /// The retained [`QueryHashInfo`] for a query's shape.  Racing callers
    /// with the same shape all receive the same instance.
    pub fn shape_info(
        &self,
        collection_name: &str,
        query: Option<&Value>,
        sort: Option<&Value>,
    ) -> Arc<QueryHashInfo> {
        let shape = Self::build_shape(collection_name, query, sort);

        if let Some(existing) = self.cache.read().get(shape.query_hash_key()) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Arc::clone(existing);
        }

        let mut cache = self.cache.write();
        let mut inserted = false;
        let retained = Arc::clone(
            cache
                .entry(shape.query_hash_key().clone())
                .or_insert_with(|| {
                    inserted = true;
                    Arc::new(shape)
                }),
        );
        let entries = cache.len();
        drop(cache);

        if !inserted {
            // Lost the race between read and write lock.
            self.hits.fetch_add(1, Ordering::Relaxed);
            return retained;
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let key = retained.query_hash_key();
        if self.config.log_new_shapes {
            debug!(
                collection = key.collection_name(),
                query_hash = key.query_hash(),
                sort_hash = key.sort_hash(),
                entries,
                "Registered new query shape"
            );
        }
        if entries >= self.config.warn_shapes && !self.warned.swap(true, Ordering::Relaxed) {
            warn!(
                entries,
                threshold = self.config.warn_shapes,
                "Query shape cache keeps growing; shapes may depend on user input"
            );
        }
        retained
    }

    pub fn get(&self, key: &QueryHashKey) -> Option<Arc<QueryHashInfo>> {
        self.cache.read().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.cache.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.read().is_empty()
    }

    /// All registered shapes, ordered by key.
    pub fn snapshot(&self) -> Vec<Arc<QueryHashInfo>> {
        let mut shapes: Vec<Arc<QueryHashInfo>> = self.cache.read().values().cloned().collect();
        shapes.sort_by(|a, b| a.query_hash_key().cmp(b.query_hash_key()));
        shapes
    }

    pub fn stats(&self) -> DetectorStats {
        DetectorStats {
            entries: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
