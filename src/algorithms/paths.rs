/// Simple path enumeration
///
/// Enumerates every simple directed path between two vertices following
/// edges of one label, breadth first, so shorter paths come out first.

use super::{AlgorithmError, AlgorithmResult};
use crate::storage::GraphStorage;
use crate::types::{Edge, Graphid};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

/// A path through the graph
#[derive(Debug, Clone, PartialEq)]
pub struct VariableLengthPath {
    /// Vertices in the path (in order)
    pub vertices: Vec<Graphid>,
    /// Edges in the path (in order)
    pub edges: Vec<Edge>,
}

impl VariableLengthPath {
    /// Create a new path starting with a single vertex
    pub fn start_from(vertex: Graphid) -> Self {
        Self {
            vertices: vec![vertex],
            edges: Vec::new(),
        }
    }

    /// Extend path with an edge and its end vertex
    pub fn extend(&self, edge: Edge) -> Self {
        let mut new_path = self.clone();
        new_path.vertices.push(edge.end);
        new_path.edges.push(edge);
        new_path
    }

    /// Number of edges
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Check if path contains a vertex (for cycle detection)
    pub fn contains_vertex(&self, vertex: Graphid) -> bool {
        self.vertices.contains(&vertex)
    }

    /// Get the last vertex in the path
    pub fn last_vertex(&self) -> Graphid {
        match self.edges.last() {
            Some(edge) => edge.end,
            None => self.vertices[0],
        }
    }
}

/// Path enumeration options
#[derive(Debug, Clone)]
pub struct PathOptions {
    /// Only edges with this label are followed
    pub edge_label: String,
    /// Maximum path length in edges
    pub max_length: usize,
    /// Maximum number of paths to return (0 = unlimited)
    pub max_paths: usize,
}

impl PathOptions {
    pub fn new(edge_label: impl Into<String>) -> Self {
        Self {
            edge_label: edge_label.into(),
            ..Self::default()
        }
    }
}

impl Default for PathOptions {
    fn default() -> Self {
        Self {
            edge_label: String::new(),
            max_length: 12,
            max_paths: 0,
        }
    }
}

/// Find all simple paths from `start` to `end`
///
/// A path never revisits a vertex and is not expanded past `end`.
///
/// # Returns
/// * Paths ordered by length, then by discovery order; empty when `end` is
///   unreachable
pub async fn simple_paths_between(
    storage: Arc<dyn GraphStorage>,
    start: Graphid,
    end: Graphid,
    options: &PathOptions,
) -> AlgorithmResult<Vec<VariableLengthPath>> {
    if options.max_length == 0 {
        return Err(AlgorithmError::InvalidParameters(
            "max_length must be at least 1".to_string(),
        ));
    }

    if start == end {
        return Err(AlgorithmError::InvalidParameters(
            "start and end must differ".to_string(),
        ));
    }

    for vid in [start, end] {
        if storage.get_vertex(vid).await?.is_none() {
            return Err(AlgorithmError::VertexNotFound(vid));
        }
    }

    let mut adjacency: HashMap<Graphid, Vec<Edge>> = HashMap::new();
    let mut results = Vec::new();
    let mut queue = VecDeque::new();
    queue.push_back(VariableLengthPath::start_from(start));

    while let Some(path) = queue.pop_front() {
        if path.len() >= options.max_length {
            continue;
        }

        let current = path.last_vertex();
        if !adjacency.contains_key(&current) {
            let edges: Vec<Edge> = storage
                .get_outgoing_edges(current)
                .await?
                .into_iter()
                .filter(|e| e.label == options.edge_label)
                .collect();
            adjacency.insert(current, edges);
        }

        for edge in adjacency.get(&current).into_iter().flatten() {
            if path.contains_vertex(edge.end) {
                continue;
            }

            let next = path.extend(edge.clone());
            if edge.end == end {
                results.push(next);
                if options.max_paths > 0 && results.len() >= options.max_paths {
                    return Ok(results);
                }
            } else {
                queue.push_back(next);
            }
        }
    }

    Ok(results)
}
