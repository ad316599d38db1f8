//!
//! End-to-end relaxation over a full dataset document.
//!
#[macro_use]
extern crate approx;

use panorelax::dataset::Dataset;
use panorelax::layout::{relax_floor_plan, LayoutConfig};
use serde_json::json;

fn floor_plan_doc() -> serde_json::Value {
    json!({
        "name": "museum-ground-floor",
        "version": 7,
        "nodes": [
            {
                "id": "entrance",
                "title": "Main Entrance",
                "imagery": { "panorama": "pano/entrance.jpg" },
                "position": { "x": 0.1, "y": 0.1 },
                "connections": ["hall", "shop"]
            },
            {
                "id": "hall",
                "title": "Great Hall",
                "connections": ["entrance", "gallery", "stairs"],
                "tags": ["landmark"]
            },
            {
                "id": "gallery",
                "connections": ["hall"],
                "position": { "x": "n/a", "y": 0.9 }
            },
            {
                "id": "shop",
                "connections": ["entrance"]
            },
            {
                "id": "stairs",
                "connections": ["hall"]
            }
        ]
    })
}

#[test]
fn relaxation_preserves_unrelated_fields() {
    let mut dataset: Dataset = serde_json::from_value(floor_plan_doc()).unwrap();
    relax_floor_plan(&mut dataset, &LayoutConfig::default()).unwrap();

    assert_eq!(dataset.extra["name"], json!("museum-ground-floor"));
    assert_eq!(dataset.extra["version"], json!(7));
    assert_eq!(dataset.nodes[0].extra["title"], json!("Main Entrance"));
    assert_eq!(
        dataset.nodes[0].extra["imagery"],
        json!({ "panorama": "pano/entrance.jpg" })
    );
    assert_eq!(dataset.nodes[1].extra["tags"], json!(["landmark"]));
    // connections untouched, including their authored order
    assert_eq!(
        dataset.nodes[1].connections,
        Some(vec![json!("entrance"), json!("gallery"), json!("stairs")])
    );
}

#[test]
fn every_node_ends_inside_the_margin_band() {
    let mut dataset: Dataset = serde_json::from_value(floor_plan_doc()).unwrap();
    let config = LayoutConfig::default();
    relax_floor_plan(&mut dataset, &config).unwrap();
    for node in &dataset.nodes {
        let (x, y) = node.stored_position();
        assert!(
            x >= config.margin - 1e-3 && x <= 1.0 - config.margin + 1e-3,
            "node {} out of range: x={}",
            node.id,
            x
        );
        assert!(
            y >= config.margin - 1e-3 && y <= 1.0 - config.margin + 1e-3,
            "node {} out of range: y={}",
            node.id,
            y
        );
    }
}

#[test]
fn connected_nodes_end_closer_than_unconnected_ones() {
    let mut dataset: Dataset = serde_json::from_value(floor_plan_doc()).unwrap();
    relax_floor_plan(&mut dataset, &LayoutConfig::default()).unwrap();
    let pos = |id: &str| {
        dataset
            .nodes
            .iter()
            .find(|n| n.id == id)
            .unwrap()
            .stored_position()
    };
    let dist = |a: (f64, f64), b: (f64, f64)| ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt();
    // shop touches only the entrance; it should sit nearer to it than to
    // the far side of the plan
    assert!(dist(pos("shop"), pos("entrance")) < dist(pos("shop"), pos("gallery")));
}

#[test]
fn file_round_trip_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("panorama-map.json");

    let mut first: Dataset = serde_json::from_value(floor_plan_doc()).unwrap();
    relax_floor_plan(&mut first, &LayoutConfig::default()).unwrap();
    first.to_json_file(&path).unwrap();

    // run the layout again over the pristine document and compare bytes
    let mut second: Dataset = serde_json::from_value(floor_plan_doc()).unwrap();
    relax_floor_plan(&mut second, &LayoutConfig::default()).unwrap();
    let reloaded = Dataset::from_json_file(&path).unwrap();
    assert_eq!(reloaded, second);
    assert_abs_diff_eq!(
        reloaded.nodes[0].stored_position().0,
        second.nodes[0].stored_position().0
    );
}
