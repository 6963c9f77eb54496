//! Query-shape canonicalization: normalization, hashing, and the shape cache.

pub mod detector;
pub mod hash;
pub mod normalize;
pub mod operators;
