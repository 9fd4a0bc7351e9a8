/// Rail Graph Database
///
/// Property-graph storage used by the rail booking services to hold the
/// network topology: stations, their directed connections, and the
/// timetabled schedules that run over them.
///
/// # Architecture
///
/// ```text
/// ┌──────────────────────────────────────────────────┐
/// │           Rail Graph Database                    │
/// ├──────────────────────────────────────────────────┤
/// │  ┌────────────────────────────────┐              │
/// │  │   Path Enumeration             │              │
/// │  └────────────┬───────────────────┘              │
/// │               ↓                                   │
/// │  ┌────────────────────────────────┐              │
/// │  │   GraphStorage / Transactions  │              │
/// │  └────────────┬───────────────────┘              │
/// │               ↓                                   │
/// │  ┌────────────────────────────────┐              │
/// │  │   Storage Engine (RocksDB)     │              │
/// │  └────────────────────────────────┘              │
/// └──────────────────────────────────────────────────┘
/// ```
///
/// # Modules
///
/// - `types`: Core data types (Graphid, Vertex, Edge)
/// - `storage`: Storage engine abstraction and RocksDB implementation
/// - `algorithms`: Simple-path enumeration between two vertices

pub mod types;
pub mod storage;
pub mod algorithms;

// Re-export commonly used types
pub use types::{Edge, Graphid, Vertex};

// Re-export storage types
pub use storage::{GraphStorage, GraphTransaction, StorageError, StorageResult};

// Re-export algorithm types
pub use algorithms::{
    simple_paths_between, AlgorithmError, AlgorithmResult, PathOptions, VariableLengthPath,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
