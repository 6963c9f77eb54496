//! queryshape core library — query-shape canonicalization for telemetry.
//!
//! Structurally equivalent database queries (same fields, operators, nesting
//! and sort order, any literal values) map to one stable shape hash, so a
//! tracing interceptor can group recorded executions by shape.  With the
//! `python` feature the crate is also built as the `_queryshape_core`
//! extension module.
//!
//! ```ignore
//! use _queryshape_core::{QueryShapeDetector, Value};
//!
//! let detector = QueryShapeDetector::new();
//! let query = Value::from_json_str(r#"{"status": "ACTIVE"}"#)?;
//! let hash = detector.get_query_hash("users", Some(&query), None);
//! ```

pub mod config;
pub mod errors;
pub mod models;
pub mod shape;

#[cfg(feature = "python")]
pub mod python;

pub use config::DetectorConfig;
pub use errors::{ShapeError, ShapeResult};
pub use models::{
    Document, NormalizedDocument, NormalizedValue, QueryHashInfo, QueryHashKey, Scalar, Value,
};
pub use shape::detector::{DetectorStats, QueryShapeDetector};

#[cfg(feature = "python")]
use pyo3::prelude::*;
#[cfg(feature = "python")]
use pyo3::wrap_pyfunction;

// ---------------------------------------------------------------------------
// Top-level Python module: _queryshape_core
// ---------------------------------------------------------------------------

#[cfg(feature = "python")]
#[pymodule]
fn _queryshape_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<python::PyQueryShapeDetector>()?;
    m.add_function(wrap_pyfunction!(python::calculate_doc_hash_json, m)?)?;

    m.add("SENTINEL", models::SENTINEL)?;
    m.add("ARRAY_OPERATORS", shape::operators::ARRAY_OPERATORS.to_vec())?;

    Ok(())
}
