//! Structural hashing of normalized documents and shape keys.
//!
//! The normalized tree is fed to SHA-256 as a tagged, length-prefixed byte
//! stream and the first 8 digest bytes are read big-endian. Hashes are stable
//! across processes and platforms, so they can be compared between hosts in
//! the telemetry pipeline.

use sha2::{Digest, Sha256};

use crate::models::{NormalizedDocument, NormalizedValue, QueryHashKey};

const TAG_NULL: u8 = 0x00;
const TAG_SENTINEL: u8 = 0x01;
const TAG_DOCUMENT: u8 = 0x02;
const TAG_ARRAY: u8 = 0x03;

fn update_len(hasher: &mut Sha256, len: usize) {
    hasher.update((len as u64).to_be_bytes());
}

fn update_str(hasher: &mut Sha256, value: &str) {
    update_len(hasher, value.len());
    hasher.update(value.as_bytes());
}

fn update_document(hasher: &mut Sha256, doc: &NormalizedDocument) {
    hasher.update([TAG_DOCUMENT]);
    update_len(hasher, doc.len());
    for (key, value) in doc.entries() {
        update_str(hasher, key);
        update_value(hasher, value);
    }
}

fn update_value(hasher: &mut Sha256, value: &NormalizedValue) {
    match value {
        NormalizedValue::Null => hasher.update([TAG_NULL]),
        NormalizedValue::Sentinel => hasher.update([TAG_SENTINEL]),
        NormalizedValue::Document(doc) => update_document(hasher, doc),
        NormalizedValue::Array(items) => {
            hasher.update([TAG_ARRAY]);
            update_len(hasher, items.len());
            for item in items {
                update_value(hasher, item);
            }
        }
    }
}

fn finish(hasher: Sha256) -> u64 {
    let digest = hasher.finalize();
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(head)
}

/// Order-respecting hash over the (already key-sorted) document entries.
pub fn doc_hash_code(doc: &NormalizedDocument) -> u64 {
    let mut hasher = Sha256::new();
    update_document(&mut hasher, doc);
    finish(hasher)
}

/// Decimal hash of a normalized document, or `""` for a null document.
pub fn calculate_doc_hash(doc: Option<&NormalizedDocument>) -> String {
    match doc {
        Some(doc) => doc_hash_code(doc).to_string(),
        None => String::new(),
    }
}

pub fn key_hash(key: &QueryHashKey) -> u64 {
    let mut hasher = Sha256::new();
    update_str(&mut hasher, key.collection_name());
    update_str(&mut hasher, key.query_hash());
    update_str(&mut hasher, key.sort_hash());
    finish(hasher)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn single(key: &str, value: NormalizedValue) -> NormalizedDocument {
        NormalizedDocument::from_entries(vec![(key.to_string(), value)])
    }

    #[test]
    fn test_null_document_hashes_to_empty_string() {
        assert_eq!(calculate_doc_hash(None), "");
    }

    #[test]
    fn test_empty_document_has_a_hash() {
        let hash = calculate_doc_hash(Some(&NormalizedDocument::empty()));
        assert!(!hash.is_empty());
        assert!(hash.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_hash_is_deterministic() {
        let doc = single("status", NormalizedValue::Sentinel);
        assert_eq!(doc_hash_code(&doc), doc_hash_code(&doc.clone()));
    }

    #[test]
    fn test_null_and_sentinel_differ() {
        let null_doc = single("a", NormalizedValue::Null);
        let literal_doc = single("a", NormalizedValue::Sentinel);
        assert_ne!(doc_hash_code(&null_doc), doc_hash_code(&literal_doc));
    }

    #[test]
    fn test_array_length_matters() {
        let one = single("a", NormalizedValue::Array(vec![NormalizedValue::Sentinel]));
        let two = single(
            "a",
            NormalizedValue::Array(vec![NormalizedValue::Sentinel, NormalizedValue::Sentinel]),
        );
        assert_ne!(doc_hash_code(&one), doc_hash_code(&two));
    }

    #[test]
    fn test_nesting_is_not_flattened() {
        // {"ab": 1} vs {"a": {"b": 1}}
        let flat = single("ab", NormalizedValue::Sentinel);
        let nested = single(
            "a",
            NormalizedValue::Document(single("b", NormalizedValue::Sentinel)),
        );
        assert_ne!(doc_hash_code(&flat), doc_hash_code(&nested));
    }

    #[test]
    fn test_key_hash_uses_field_boundaries() {
        let a = QueryHashKey::new("ab", "c", "");
        let b = QueryHashKey::new("a", "bc", "");
        assert_ne!(key_hash(&a), key_hash(&b));
    }
}
