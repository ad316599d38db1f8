//!
//! Corridor graph construction from per-node connection lists.
//!
use crate::dataset::MapNode;
use fnv::FnvHashMap as HashMap;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum GraphError {
    /// A connection names an id that is not in the node list. Dropping the
    /// edge (or inventing a phantom node) would skew the force balance, so
    /// this is fatal.
    #[error("node '{node}' lists unknown neighbor '{target}'")]
    UnknownNeighbor { node: String, target: String },
    #[error("duplicate node id '{0}' in the dataset")]
    DuplicateNode(String),
}

///
/// Undirected corridor graph over the floor plan nodes.
///
/// Node indices follow dataset order; each corridor is stored exactly once
/// with endpoints in lexicographic order, so both dedup and edge iteration
/// order are reproducible across runs.
///
#[derive(Clone, Debug)]
pub struct CorridorGraph {
    graph: UnGraph<String, ()>,
    index_of: HashMap<String, NodeIndex>,
}

impl CorridorGraph {
    pub fn from_nodes(nodes: &[MapNode]) -> Result<CorridorGraph, GraphError> {
        let mut graph = UnGraph::with_capacity(nodes.len(), nodes.len());
        let mut index_of = HashMap::default();
        for node in nodes {
            let index = graph.add_node(node.id.clone());
            if index_of.insert(node.id.clone(), index).is_some() {
                return Err(GraphError::DuplicateNode(node.id.clone()));
            }
        }

        let mut corridors: BTreeSet<(&str, &str)> = BTreeSet::new();
        for node in nodes {
            for target in node.neighbor_ids() {
                if !index_of.contains_key(target) {
                    return Err(GraphError::UnknownNeighbor {
                        node: node.id.clone(),
                        target: target.to_string(),
                    });
                }
                // a node listing itself is a no-op corridor
                if target == node.id {
                    continue;
                }
                let pair = if node.id.as_str() < target {
                    (node.id.as_str(), target)
                } else {
                    (target, node.id.as_str())
                };
                corridors.insert(pair);
            }
        }
        for (a, b) in corridors {
            graph.add_edge(index_of[a], index_of[b], ());
        }
        Ok(CorridorGraph { graph, index_of })
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn corridor_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn index_of(&self, id: &str) -> Option<NodeIndex> {
        self.index_of.get(id).copied()
    }

    pub fn id_of(&self, index: NodeIndex) -> &str {
        &self.graph[index]
    }

    /// Corridors as (source, target) position-vector indices, in canonical
    /// order. Source id always sorts before target id.
    pub fn corridors(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.graph
            .edge_references()
            .map(|edge| (edge.source().index(), edge.target().index()))
    }

    pub fn n_components(&self) -> usize {
        petgraph::algo::connected_components(&self.graph)
    }
}

//
// tests
//
