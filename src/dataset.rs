//!
//! Floor plan dataset document and per-node schema.
//!
//! Only `id`, `position.{x,y}` and `connections` are interpreted; every
//! other authored field (titles, imagery, feature tags, ...) is carried
//! through load/save untouched.
//!
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::io::Write;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to access dataset file: {0}")]
    Io(#[from] std::io::Error),
    #[error("dataset is not a valid node document: {0}")]
    Json(#[from] serde_json::Error),
}

///
/// One placeable location of the floor plan.
///
/// `position` and `connections` are kept as raw JSON so that malformed
/// author input survives a round trip unchanged; the accessors below apply
/// the recovery policy (center default, non-string neighbors dropped).
///
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapNode {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connections: Option<Vec<Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MapNode {
    /// Stored normalized coordinate of this node. Missing or non-numeric
    /// fields fall back to the plan center, axis by axis.
    pub fn stored_position(&self) -> (f64, f64) {
        (self.stored_axis("x"), self.stored_axis("y"))
    }

    fn stored_axis(&self, axis: &str) -> f64 {
        self.position
            .as_ref()
            .and_then(|pos| pos.get(axis))
            .and_then(Value::as_f64)
            .unwrap_or(0.5)
    }

    /// Overwrite the published position.
    pub fn set_position(&mut self, x: f64, y: f64) {
        self.position = Some(json!({ "x": x, "y": y }));
    }

    /// Neighbor ids from the raw connections list. Entries that are not
    /// strings are ignored.
    pub fn neighbor_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.connections.iter().flatten().filter_map(Value::as_str)
    }
}

///
/// The whole dataset document: the node list plus any other top-level
/// fields, passed through unchanged.
///
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub nodes: Vec<MapNode>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Dataset {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Dataset, DatasetError> {
        let file = std::fs::File::open(path)?;
        let dataset = serde_json::from_reader(std::io::BufReader::new(file))?;
        Ok(dataset)
    }

    /// Write the document back, pretty-printed with 2-space indent like the
    /// authored files.
    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> Result<(), DatasetError> {
        let file = std::fs::File::create(path)?;
        let mut writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }
}

//
// tests
//

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_doc() -> Value {
        json!({
            "version": 3,
            "nodes": [
                {
                    "id": "atrium",
                    "title": "Atrium",
                    "position": { "x": 0.25, "y": 0.75 },
                    "connections": ["lobby", 7, "lobby"],
                    "tags": ["start"]
                },
                {
                    "id": "lobby",
                    "position": { "x": "skewed" },
                    "connections": ["atrium"]
                },
                {
                    "id": "vault"
                }
            ]
        })
    }

    #[test]
    fn stored_position_recovers_malformed_fields() {
        let dataset: Dataset = serde_json::from_value(sample_doc()).unwrap();
        assert_eq!(dataset.nodes[0].stored_position(), (0.25, 0.75));
        // non-numeric x and missing y both fall back to the center
        assert_eq!(dataset.nodes[1].stored_position(), (0.5, 0.5));
        assert_eq!(dataset.nodes[2].stored_position(), (0.5, 0.5));
    }

    #[test]
    fn neighbor_ids_skip_non_strings() {
        let dataset: Dataset = serde_json::from_value(sample_doc()).unwrap();
        let neighbors: Vec<&str> = dataset.nodes[0].neighbor_ids().collect();
        assert_eq!(neighbors, vec!["lobby", "lobby"]);
        assert_eq!(dataset.nodes[2].neighbor_ids().count(), 0);
    }

    #[test]
    fn unknown_fields_survive_round_trip() {
        let doc = sample_doc();
        let dataset: Dataset = serde_json::from_value(doc.clone()).unwrap();
        assert_eq!(serde_json::to_value(&dataset).unwrap(), doc);
    }

    #[test]
    fn set_position_replaces_raw_value() {
        let mut dataset: Dataset = serde_json::from_value(sample_doc()).unwrap();
        dataset.nodes[1].set_position(0.2, 0.8);
        assert_eq!(dataset.nodes[1].stored_position(), (0.2, 0.8));
        assert_eq!(
            dataset.nodes[1].position,
            Some(json!({ "x": 0.2, "y": 0.8 }))
        );
    }

    #[test]
    fn document_without_nodes_is_rejected() {
        let result: Result<Dataset, _> = serde_json::from_value(json!({ "version": 3 }));
        assert!(result.is_err());
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("panorama-map.json");
        let dataset: Dataset = serde_json::from_value(sample_doc()).unwrap();
        dataset.to_json_file(&path).unwrap();
        let reloaded = Dataset::from_json_file(&path).unwrap();
        assert_eq!(reloaded, dataset);
    }
}
