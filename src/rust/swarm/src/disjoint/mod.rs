pub mod lifetime;
pub mod table;
pub mod union_find;

pub use lifetime::ForestStats;
pub use table::DimensionTable;

use std::fmt::Debug;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DisjointSetError {
    #[error("element {element} has no node in dimension {dimension}")]
    NotFound { dimension: String, element: String },
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
}

impl DisjointSetError {
    pub(crate) fn not_found<D, Q>(dimension: &D, element: &Q) -> Self
    where
        D: Debug + ?Sized,
        Q: Debug + ?Sized,
    {
        DisjointSetError::NotFound {
            dimension: format!("{dimension:?}"),
            element: format!("{element:?}"),
        }
    }
}
