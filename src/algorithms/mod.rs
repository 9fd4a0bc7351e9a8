/// Graph algorithms module
///
/// Path enumeration used by route search.

pub mod paths;

pub use paths::{simple_paths_between, PathOptions, VariableLengthPath};

use crate::types::Graphid;
use thiserror::Error;

/// Algorithm errors
#[derive(Error, Debug)]
pub enum AlgorithmError {
    #[error("Storage error: {0}")]
    StorageError(#[from] crate::storage::StorageError),

    #[error("Vertex not found: {0}")]
    VertexNotFound(Graphid),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),
}

pub type AlgorithmResult<T> = Result<T, AlgorithmError>;
