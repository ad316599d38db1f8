//!
//! Small in-memory floor plans for tests.
//!
use crate::dataset::{Dataset, MapNode};
use serde_json::{json, Map, Value};

pub fn node(id: &str, neighbors: &[&str]) -> MapNode {
    MapNode {
        id: id.to_string(),
        position: None,
        connections: Some(neighbors.iter().map(|&n| Value::from(n)).collect()),
        extra: Map::new(),
    }
}

/// Node with a stored normalized position.
pub fn node_at(id: &str, x: f64, y: f64, neighbors: &[&str]) -> MapNode {
    let mut node = node(id, neighbors);
    node.position = Some(json!({ "x": x, "y": y }));
    node
}

pub fn plan(nodes: Vec<MapNode>) -> Dataset {
    Dataset {
        nodes,
        extra: Map::new(),
    }
}

/// Two rooms joined by one corridor.
pub fn mock_pair() -> Dataset {
    plan(vec![node("r0", &["r1"]), node("r1", &["r0"])])
}

/// `n` rooms in a corridor chain r0 - r1 - ... - r{n-1}, with the
/// connection authored on both endpoints as real datasets do.
pub fn mock_chain(n: usize) -> Dataset {
    let ids: Vec<String> = (0..n).map(|i| format!("r{}", i)).collect();
    let nodes = (0..n)
        .map(|i| {
            let mut neighbors: Vec<&str> = Vec::new();
            if i > 0 {
                neighbors.push(&ids[i - 1]);
            }
            if i + 1 < n {
                neighbors.push(&ids[i + 1]);
            }
            node(&ids[i], &neighbors)
        })
        .collect();
    plan(nodes)
}
