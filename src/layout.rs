//!
//! Force-directed relaxation of the floor plan graph.
//!
//! Classic spring/repulsion layout (Fruchterman-Reingold) with a
//! gravity-to-center term, an annealed displacement cap and margin-aware
//! clamping. Positions are relaxed in an internal frame centered at the
//! origin and spanning `[-W/2, W/2] x [-H/2, H/2]` with `W = H = 1 - 2*margin`,
//! then published back into the `[0, 1]` frame.
//!
use crate::dataset::{Dataset, MapNode};
use crate::graph::{CorridorGraph, GraphError};
use itertools::Itertools;
use log::{debug, info};
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use thiserror::Error;

/// Seed of the jitter stream. Fixed so that repeated runs over an
/// unchanged dataset are byte-for-byte reproducible.
pub const LAYOUT_SEED: u64 = 42;

/// Guard against zero distances between coincident nodes.
const DIST_EPSILON: f64 = 1e-9;
/// Geometric decay of the displacement cap.
const TEMPERATURE_DECAY: f64 = 0.95;
/// Relaxation stops early once the cap falls below this.
const TEMPERATURE_FLOOR: f64 = 1e-4;
/// Full amplitude of the starting jitter, as a fraction of the frame size.
const INIT_JITTER: f64 = 0.05;

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("margin {0} leaves no usable layout area (must be in [0, 0.5))")]
    MarginCollapsed(f64),
    #[error(transparent)]
    Graph(#[from] GraphError),
}

///
/// Caller-tunable knobs of one relaxation run.
///
#[derive(Clone, Copy, Debug)]
pub struct LayoutConfig {
    /// number of annealing rounds to run
    pub iterations: usize,
    /// fraction of the unit square reserved as empty border
    pub margin: f64,
    pub seed: u64,
    /// run the repulsion pass on the rayon pool
    pub parallel: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            iterations: 750,
            margin: 0.2,
            seed: LAYOUT_SEED,
            parallel: false,
        }
    }
}

/// 2-D vector in the internal frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub fn norm(self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

///
/// Frame geometry and force coefficients, derived once per run.
///
#[derive(Clone, Copy, Debug)]
pub struct Params {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
    /// natural inter-node distance scale
    pub k: f64,
    /// centering force coefficient
    pub gravity: f64,
    /// current displacement cap
    pub temperature: f64,
}

impl Params {
    pub fn new(margin: f64, n_nodes: usize) -> Result<Params, LayoutError> {
        let width = 1.0 - 2.0 * margin;
        let height = width;
        if !(margin >= 0.0) || width <= 0.0 || height <= 0.0 {
            return Err(LayoutError::MarginCollapsed(margin));
        }
        let k = ((width * height) / n_nodes.max(1) as f64).sqrt();
        Ok(Params {
            width,
            height,
            margin,
            k,
            gravity: 0.1 * k,
            temperature: width.max(height) / 10.0,
        })
    }
}

///
/// Starting positions: the stored normalized coordinate mapped about the
/// origin, plus a small jitter so that nodes sharing a stored (or default)
/// position do not produce degenerate zero-distance forces in the first
/// round. Clamped into the frame like every later iteration.
///
pub fn initialize(nodes: &[MapNode], params: &Params, rng: &mut impl Rng) -> Vec<Vec2> {
    let half_width = params.width / 2.0;
    let half_height = params.height / 2.0;
    nodes
        .iter()
        .map(|node| {
            let jitter_x = (rng.gen::<f64>() - 0.5) * params.width * INIT_JITTER;
            let jitter_y = (rng.gen::<f64>() - 0.5) * params.height * INIT_JITTER;
            let (x, y) = node.stored_position();
            Vec2 {
                x: ((x - 0.5) * params.width + jitter_x)
                    .max(-half_width)
                    .min(half_width),
                y: ((y - 0.5) * params.height + jitter_y)
                    .max(-half_height)
                    .min(half_height),
            }
        })
        .collect()
}

///
/// Pairwise repulsion, visiting each unordered pair exactly once. The
/// epsilon sits inside the square root here; see `accumulate_attraction`.
///
pub fn accumulate_repulsion(positions: &[Vec2], disp: &mut [Vec2], k: f64) {
    for (i, j) in (0..positions.len()).tuple_combinations() {
        let dx = positions[i].x - positions[j].x;
        let dy = positions[i].y - positions[j].y;
        let dist = (dx * dx + dy * dy + DIST_EPSILON).sqrt();
        let force = (k * k) / dist;
        let fx = (dx / dist) * force;
        let fy = (dy / dist) * force;
        disp[i].x += fx;
        disp[i].y += fy;
        disp[j].x -= fx;
        disp[j].y -= fy;
    }
}

///
/// Per-node repulsion reduction for the rayon pass. Each node sums its
/// force over all others in index order, so the result does not depend on
/// thread scheduling (it may differ from the serial pass only in
/// floating-point summation order).
///
pub fn accumulate_repulsion_parallel(positions: &[Vec2], disp: &mut [Vec2], k: f64) {
    disp.par_iter_mut().enumerate().for_each(|(i, d)| {
        let here = positions[i];
        for (j, other) in positions.iter().enumerate() {
            if j == i {
                continue;
            }
            let dx = here.x - other.x;
            let dy = here.y - other.y;
            let dist = (dx * dx + dy * dy + DIST_EPSILON).sqrt();
            let force = (k * k) / dist;
            d.x += (dx / dist) * force;
            d.y += (dy / dist) * force;
        }
    });
}

///
/// Attraction along corridors. Note the epsilon is added after the square
/// root, not inside it as in repulsion; existing layouts bake in that
/// very-short-edge behavior, so the asymmetry stays.
///
pub fn accumulate_attraction(
    positions: &[Vec2],
    graph: &CorridorGraph,
    disp: &mut [Vec2],
    k: f64,
) {
    for (source, target) in graph.corridors() {
        let dx = positions[source].x - positions[target].x;
        let dy = positions[source].y - positions[target].y;
        let dist = (dx * dx + dy * dy).sqrt() + DIST_EPSILON;
        let force = (dist * dist) / k;
        let fx = (dx / dist) * force;
        let fy = (dy / dist) * force;
        disp[source].x -= fx;
        disp[source].y -= fy;
        disp[target].x += fx;
        disp[target].y += fy;
    }
}

/// Pull every node toward the internal origin. Repulsion alone has no
/// resting distance, so without this term the plan drifts into the walls.
pub fn accumulate_gravity(positions: &[Vec2], disp: &mut [Vec2], gravity: f64) {
    for (pos, d) in positions.iter().zip(disp.iter_mut()) {
        d.x -= gravity * pos.x;
        d.y -= gravity * pos.y;
    }
}

/// Apply the accumulated displacements, capped at the current temperature
/// while preserving direction, then clamp to the frame axis by axis.
pub fn apply_displacements(positions: &mut [Vec2], disp: &[Vec2], params: &Params) {
    let half_width = params.width / 2.0;
    let half_height = params.height / 2.0;
    for (pos, d) in positions.iter_mut().zip(disp.iter()) {
        let len = d.norm();
        if len > 0.0 {
            let limit = len.min(params.temperature);
            pos.x += (d.x / len) * limit;
            pos.y += (d.y / len) * limit;
        }
        pos.x = pos.x.max(-half_width).min(half_width);
        pos.y = pos.y.max(-half_height).min(half_height);
    }
}

///
/// The annealing loop: repulsion + attraction + gravity accumulated into a
/// scratch vector, applied once per round. Returns the number of completed
/// rounds (the loop exits early once the temperature bottoms out).
///
pub fn relax(
    positions: &mut [Vec2],
    graph: &CorridorGraph,
    params: &mut Params,
    iterations: usize,
    parallel: bool,
) -> usize {
    let mut completed = 0;
    for _ in 0..iterations {
        let mut disp = vec![Vec2::default(); positions.len()];
        if parallel {
            accumulate_repulsion_parallel(positions, &mut disp, params.k);
        } else {
            accumulate_repulsion(positions, &mut disp, params.k);
        }
        accumulate_attraction(positions, graph, &mut disp, params.k);
        accumulate_gravity(positions, &mut disp, params.gravity);
        apply_displacements(positions, &disp, params);
        completed += 1;
        params.temperature *= TEMPERATURE_DECAY;
        if params.temperature < TEMPERATURE_FLOOR {
            break;
        }
    }
    completed
}

///
/// Map internal positions back into the published frame, with a tiny final
/// jitter to break residual symmetry. Continues the initializer's RNG
/// stream; do not reseed between the two.
///
pub fn normalize(positions: &[Vec2], params: &Params, rng: &mut impl Rng) -> Vec<(f64, f64)> {
    let epsilon = params.width.min(params.height) * 1e-3;
    positions
        .iter()
        .map(|pos| {
            let x = pos.x + (rng.gen::<f64>() - 0.5) * epsilon;
            let y = pos.y + (rng.gen::<f64>() - 0.5) * epsilon;
            let norm_x = x / params.width + 0.5;
            let norm_y = y / params.height + 0.5;
            (
                round5(params.margin + norm_x * params.width),
                round5(params.margin + norm_y * params.height),
            )
        })
        .collect()
}

/// Round to the 5 decimal places used for stable serialization.
fn round5(value: f64) -> f64 {
    (value * 1e5).round() / 1e5
}

///
/// Relax the whole plan in place: build the corridor graph, seed the
/// jitter stream, run the annealing loop and write the published
/// coordinates back onto the nodes.
///
pub fn relax_floor_plan(dataset: &mut Dataset, config: &LayoutConfig) -> Result<(), LayoutError> {
    let mut params = Params::new(config.margin, dataset.nodes.len())?;
    let graph = CorridorGraph::from_nodes(&dataset.nodes)?;
    info!(
        "corridor graph: {} nodes, {} corridors, {} components",
        graph.node_count(),
        graph.corridor_count(),
        graph.n_components()
    );
    debug!("params {:?}", params);

    let mut rng = Xoshiro256PlusPlus::seed_from_u64(config.seed);
    let mut positions = initialize(&dataset.nodes, &params, &mut rng);
    let completed = relax(
        &mut positions,
        &graph,
        &mut params,
        config.iterations,
        config.parallel,
    );
    info!(
        "relaxed for {} rounds (final temperature {:.2e})",
        completed, params.temperature
    );

    let published = normalize(&positions, &params, &mut rng);
    for (node, (x, y)) in dataset.nodes.iter_mut().zip(published) {
        node.set_position(x, y);
    }
    Ok(())
}

//
// tests
//
