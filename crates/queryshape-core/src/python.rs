//! PyO3 bindings for the shape detector.

use std::collections::HashMap;

use pyo3::prelude::*;
use pyo3::types::{PyBool, PyDict, PyFloat, PyInt, PyList, PyString, PyTuple};

use crate::config::DetectorConfig;
use crate::errors::ShapeError;
use crate::models::{Document, Scalar, Value};
use crate::shape::detector::QueryShapeDetector;
use crate::shape::hash::calculate_doc_hash;
use crate::shape::normalize::normalize_map;

/// Convert a Python object tree (dicts, lists, tuples, scalars) to a [`Value`].
pub fn py_to_value(obj: &Bound<'_, PyAny>) -> PyResult<Value> {
    if obj.is_none() {
        return Ok(Value::Null);
    }
    // bool before int: Python bools are ints.
    if let Ok(b) = obj.downcast::<PyBool>() {
        return Ok(Value::from(b.is_true()));
    }
    if obj.is_instance_of::<PyInt>() {
        return Ok(match obj.extract::<i64>() {
            Ok(i) => Value::from(i),
            Err(_) => Value::Scalar(Scalar::Other(obj.str()?.to_string())),
        });
    }
    if let Ok(f) = obj.downcast::<PyFloat>() {
        return Ok(Value::from(f.value()));
    }
    if let Ok(s) = obj.downcast::<PyString>() {
        return Ok(Value::from(s.to_string()));
    }
    if let Ok(dict) = obj.downcast::<PyDict>() {
        let mut doc = Document::with_capacity(dict.len());
        for (k, v) in dict.iter() {
            let key = match k.downcast::<PyString>() {
                Ok(s) => s.to_string(),
                Err(_) => {
                    return Err(ShapeError::InvalidDocument(format!(
                        "document keys must be str, got {}",
                        k.repr()?
                    ))
                    .into())
                }
            };
            doc.insert(key, py_to_value(&v)?);
        }
        return Ok(Value::Document(doc));
    }
    if let Ok(list) = obj.downcast::<PyList>() {
        let items = list
            .iter()
            .map(|item| py_to_value(&item))
            .collect::<PyResult<Vec<_>>>()?;
        return Ok(Value::Array(items));
    }
    if let Ok(tuple) = obj.downcast::<PyTuple>() {
        let items = tuple
            .iter()
            .map(|item| py_to_value(&item))
            .collect::<PyResult<Vec<_>>>()?;
        return Ok(Value::Array(items));
    }
    Ok(Value::Scalar(Scalar::Other(obj.repr()?.to_string())))
}

fn optional_value(obj: Option<&Bound<'_, PyAny>>) -> PyResult<Option<Value>> {
    obj.map(py_to_value).transpose()
}

#[pyclass(name = "QueryShapeDetector", frozen)]
pub struct PyQueryShapeDetector {
    inner: QueryShapeDetector,
}

#[pymethods]
impl PyQueryShapeDetector {
    #[new]
    #[pyo3(signature = (from_env=true))]
    fn new(from_env: bool) -> Self {
        let config = if from_env {
            DetectorConfig::from_env()
        } else {
            DetectorConfig::default()
        };
        Self {
            inner: QueryShapeDetector::with_config(config),
        }
    }

    #[pyo3(signature = (collection_name, query=None, sort=None))]
    fn get_query_hash(
        &self,
        collection_name: &str,
        query: Option<&Bound<'_, PyAny>>,
        sort: Option<&Bound<'_, PyAny>>,
    ) -> PyResult<String> {
        let query = optional_value(query)?;
        let sort = optional_value(sort)?;
        Ok(self
            .inner
            .get_query_hash(collection_name, query.as_ref(), sort.as_ref()))
    }

    #[staticmethod]
    #[pyo3(signature = (collection_name, query=None, sort=None))]
    fn calculate_query_hash_key(
        collection_name: &str,
        query: Option<&Bound<'_, PyAny>>,
        sort: Option<&Bound<'_, PyAny>>,
    ) -> PyResult<(String, String, String)> {
        let query = optional_value(query)?;
        let sort = optional_value(sort)?;
        let key = QueryShapeDetector::calculate_query_hash_key(
            collection_name,
            query.as_ref(),
            sort.as_ref(),
        );
        Ok((
            key.collection_name().to_string(),
            key.query_hash().to_string(),
            key.sort_hash().to_string(),
        ))
    }

    fn stats(&self) -> HashMap<String, u64> {
        let stats = self.inner.stats();
        let mut result = HashMap::new();
        result.insert("entries".to_string(), stats.entries as u64);
        result.insert("hits".to_string(), stats.hits);
        result.insert("misses".to_string(), stats.misses);
        result
    }

    fn __len__(&self) -> usize {
        self.inner.len()
    }
}

/// Hash of a JSON query document, or `""` when absent or not an object.
#[pyfunction]
#[pyo3(signature = (text=None))]
pub fn calculate_doc_hash_json(text: Option<&str>) -> PyResult<String> {
    let Some(text) = text else {
        return Ok(String::new());
    };
    let value = Value::from_json_str(text)?;
    let normalized = value.as_document().map(|doc| normalize_map(Some(doc), false));
    Ok(calculate_doc_hash(normalized.as_ref()))
}
