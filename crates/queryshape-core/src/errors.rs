//! Error types for the queryshape core library.
//!
//! Normalization and hashing are total; only decoding an external document
//! representation (JSON text, Python objects) can fail.

#[cfg(feature = "python")]
use pyo3::exceptions::PyValueError;
#[cfg(feature = "python")]
use pyo3::PyErr;

/// Top-level error enum for the queryshape core library.
#[derive(Debug, thiserror::Error)]
pub enum ShapeError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),
}

#[cfg(feature = "python")]
impl From<ShapeError> for PyErr {
    fn from(err: ShapeError) -> PyErr {
        match &err {
            ShapeError::Json(_) | ShapeError::InvalidDocument(_) => {
                PyValueError::new_err(err.to_string())
            }
        }
    }
}

pub type ShapeResult<T> = Result<T, ShapeError>;
