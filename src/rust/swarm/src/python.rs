use pyo3::prelude::*;
use pyo3::types::PyString;

use crate::collection::DisjointSetCollection;
use crate::disjoint::DisjointSetError;
use crate::interner::ElementId;
use crate::key::Key;

/// Named disjoint sets over several dimensions.
///
/// Dimensions are Python `int` or `str`; elements are `str`.
///
/// Example:
///     ```python
///     sets = DisjointSets()
///     sets.make_set(100, ["a", "b", "c"])
///     sets.find_root(100, "c")  # "a"
///     ```
#[pyclass(name = "DisjointSets")]
#[derive(Default)]
pub struct PyDisjointSets {
    inner: DisjointSetCollection<String, Key>,
}

#[pymethods]
impl PyDisjointSets {
    #[new]
    fn new() -> Self {
        Self::default()
    }

    /// Ensure `element` has a node in `dimension`.
    ///
    /// Returns:
    ///     str: Root of the element's class
    fn make_singleton(&mut self, dimension: &Bound<'_, PyAny>, element: &str) -> PyResult<String> {
        let dimension = key_from_py(dimension)?;
        let root = self.inner.make_singleton(&dimension, element);
        self.name(root)
    }

    /// Merge `elements` into one class; raises ValueError when empty.
    fn make_set(&mut self, dimension: &Bound<'_, PyAny>, elements: Vec<String>) -> PyResult<String> {
        let dimension = key_from_py(dimension)?;
        let root = self
            .inner
            .make_set(&dimension, elements.iter().map(String::as_str))
            .map_err(to_py_err)?;
        self.name(root)
    }

    fn make_sets(&mut self, dimension: &Bound<'_, PyAny>, sets: Vec<Vec<String>>) -> PyResult<()> {
        let dimension = key_from_py(dimension)?;
        self.inner
            .make_sets(
                &dimension,
                sets.iter().map(|set| set.iter().map(String::as_str)),
            )
            .map_err(to_py_err)
    }

    /// Raises KeyError when `element` has no node in `dimension`.
    fn find_root(&mut self, dimension: &Bound<'_, PyAny>, element: &str) -> PyResult<String> {
        let dimension = key_from_py(dimension)?;
        let root = self.inner.find_root(&dimension, element).map_err(to_py_err)?;
        self.name(root)
    }

    /// Every element sharing `element`'s class, in registration order.
    fn find_members(&mut self, dimension: &Bound<'_, PyAny>, element: &str) -> PyResult<Vec<String>> {
        let dimension = key_from_py(dimension)?;
        let members = self
            .inner
            .find_members(&dimension, element)
            .map_err(to_py_err)?;
        Ok(members.into_iter().cloned().collect())
    }

    /// Returns:
    ///     bool: True if two classes were merged
    fn make_union(&mut self, dimension: &Bound<'_, PyAny>, a: &str, b: &str) -> PyResult<bool> {
        let dimension = key_from_py(dimension)?;
        self.inner.make_union(&dimension, a, b).map_err(to_py_err)
    }

    fn get_roots(&self, dimension: &Bound<'_, PyAny>) -> PyResult<Vec<String>> {
        let dimension = key_from_py(dimension)?;
        Ok(self.inner.get_roots(&dimension).into_iter().cloned().collect())
    }

    fn __len__(&self) -> usize {
        self.inner.len()
    }

    fn __repr__(&self) -> String {
        format!(
            "DisjointSets(elements={}, dimensions={})",
            self.inner.len(),
            self.inner.dimensions().count()
        )
    }
}

impl PyDisjointSets {
    fn name(&self, id: ElementId) -> PyResult<String> {
        self.inner.element(id).cloned().ok_or_else(|| {
            PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(format!("unregistered element handle {id}"))
        })
    }
}

fn to_py_err(err: DisjointSetError) -> PyErr {
    match err {
        DisjointSetError::NotFound { .. } => {
            PyErr::new::<pyo3::exceptions::PyKeyError, _>(err.to_string())
        }
        DisjointSetError::InvalidArgument(msg) => {
            PyErr::new::<pyo3::exceptions::PyValueError, _>(msg)
        }
    }
}

/// Convert a Python dimension to a Key
fn key_from_py(obj: &Bound<'_, PyAny>) -> PyResult<Key> {
    if let Ok(i) = obj.extract::<i64>() {
        Ok(Key::Int(i))
    } else if let Ok(s) = obj.downcast::<PyString>() {
        Ok(Key::Str(s.to_string()))
    } else {
        Err(PyErr::new::<pyo3::exceptions::PyTypeError, _>(
            "dimension must be int or str",
        ))
    }
}

/// Python module definition
#[pymodule]
fn _rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyDisjointSets>()?;
    Ok(())
}
