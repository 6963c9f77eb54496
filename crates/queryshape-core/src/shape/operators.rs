//! Query operator tables consulted while normalizing filter documents.

/// Array-valued operators whose argument is normalized element by element.
pub const ARRAY_OPERATORS: &[&str] = &["$eq", "$in", "$nin", "$all", "$mod"];

pub const OPERATOR_PREFIX: char = '$';

pub fn is_operator(key: &str) -> bool {
    key.starts_with(OPERATOR_PREFIX)
}

/// Returns `true` when an array under `key` keeps its element structure.
///
/// Plain field names and [`ARRAY_OPERATORS`] keep it; the array argument of
/// any other operator is collapsed to a single sentinel by the normalizer.
pub fn need_to_trim_list(key: &str) -> bool {
    !is_operator(key) || ARRAY_OPERATORS.contains(&key)
}
