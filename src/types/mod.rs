/// Core data types for the graph database
///
/// - Graphid: 64-bit identifier with embedded label and local ID
/// - Vertex: Graph node with properties
/// - Edge: Directed graph relationship with properties

pub mod edge;
pub mod graphid;
pub mod vertex;

pub use edge::Edge;
pub use graphid::{Graphid, GraphidError};
pub use vertex::Vertex;
