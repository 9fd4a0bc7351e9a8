/// Error types for storage operations

use thiserror::Error;

/// Storage operation errors
#[derive(Error, Debug)]
pub enum StorageError {
    /// Edge not found
    #[error("Edge not found: {0}")]
    EdgeNotFound(String),

    /// Vertex has edges and cannot be deleted
    #[error("Cannot delete vertex {0}: has {1} connected edges")]
    VertexHasEdges(String, usize),

    /// Counter overflow
    #[error("Counter overflow for label: {0}")]
    CounterOverflow(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// RocksDB error
    #[error("RocksDB error: {0}")]
    RocksDbError(#[from] rocksdb::Error),

    /// Transaction error
    #[error("Transaction error: {0}")]
    TransactionError(String),

    /// Invalid state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// UTF-8 conversion error
    #[error("UTF-8 conversion error: {0}")]
    Utf8Error(#[from] std::str::Utf8Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
