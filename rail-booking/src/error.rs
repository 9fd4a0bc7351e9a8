use thiserror::Error;

#[derive(Debug, Error)]
pub enum RailError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Capacity exceeded: {0}")]
    CapacityExceeded(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RailError {
    /// True only for store failures
    pub fn is_retryable(&self) -> bool {
        match self {
            RailError::Unavailable(_) => true,
            RailError::InvalidArgument(_)
            | RailError::NotFound(_)
            | RailError::AlreadyExists(_)
            | RailError::CapacityExceeded(_)
            | RailError::Internal(_) => false,
        }
    }
}

// Convert rail-graph-db errors to RailError
impl From<rail_graph_db::StorageError> for RailError {
    fn from(err: rail_graph_db::StorageError) -> Self {
        match err {
            rail_graph_db::StorageError::SerializationError(e) => {
                RailError::Internal(e.to_string())
            }
            other => RailError::Unavailable(other.to_string()),
        }
    }
}

impl From<rail_graph_db::AlgorithmError> for RailError {
    fn from(err: rail_graph_db::AlgorithmError) -> Self {
        match err {
            rail_graph_db::AlgorithmError::StorageError(e) => e.into(),
            rail_graph_db::AlgorithmError::VertexNotFound(id) => {
                RailError::NotFound(format!("vertex {}", id))
            }
            rail_graph_db::AlgorithmError::InvalidParameters(msg) => {
                RailError::InvalidArgument(msg)
            }
        }
    }
}

impl From<rusqlite::Error> for RailError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::FromSqlConversionFailure(..)
            | rusqlite::Error::InvalidColumnType(..)
            | rusqlite::Error::IntegralValueOutOfRange(..) => RailError::Internal(err.to_string()),
            other => RailError::Unavailable(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for RailError {
    fn from(err: serde_json::Error) -> Self {
        RailError::Internal(err.to_string())
    }
}

pub type RailResult<T> = Result<T, RailError>;
