//! The built-in layered engine: rank, order, position.

use std::cmp::Ordering;
use std::collections::VecDeque;

use rustc_hash::FxHashMap;

use crate::model::{LayoutGraph, LayoutNode, Point, RankDir};

/// A pluggable layout algorithm.
///
/// Engines read node sizes and edge connectivity from the graph and write
/// node centers and edge waypoints back. Implementations must be
/// deterministic for a given insertion order.
pub trait LayoutEngine {
    fn run(&self, graph: &mut LayoutGraph);
}

/// Layered (Sugiyama-style) layout.
///
/// Ranks come from a longest-path pass over a Kahn ordering (cycles fall back
/// to insertion order), in-rank order from a fixed number of barycenter
/// sweeps, coordinates from packing ranks against the configured separations.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayeredEngine;

const ORDERING_SWEEPS: usize = 4;

impl LayoutEngine for LayeredEngine {
    fn run(&self, graph: &mut LayoutGraph) {
        if graph.nodes.is_empty() {
            return;
        }
        let adj = Adjacency::build(graph);
        let topo = topo_order(&adj);
        let ranks = longest_path_ranks(&adj, &topo);
        let mut layers = build_layers(&ranks, &topo);
        order_layers(&mut layers, &adj);
        let placement = place(graph, &layers);
        write_nodes(graph, &placement);
        route_edges(graph, &placement, &ranks);
    }
}

struct Adjacency {
    preds: Vec<Vec<usize>>,
    succs: Vec<Vec<usize>>,
}

impl Adjacency {
    fn build(graph: &LayoutGraph) -> Self {
        let n = graph.nodes.len();
        let mut preds = vec![Vec::new(); n];
        let mut succs = vec![Vec::new(); n];
        for edge in &graph.edges {
            let (Some(from), Some(to)) = (graph.slot(&edge.from), graph.slot(&edge.to)) else {
                continue;
            };
            // Self-loops do not constrain ranks.
            if from == to {
                continue;
            }
            succs[from].push(to);
            preds[to].push(from);
        }
        Self { preds, succs }
    }
}

/// Kahn ordering; nodes left on a cycle are appended in insertion order.
fn topo_order(adj: &Adjacency) -> Vec<usize> {
    let n = adj.preds.len();
    let mut indegree: Vec<usize> = adj.preds.iter().map(Vec::len).collect();
    let mut queue: VecDeque<usize> = (0..n).filter(|&v| indegree[v] == 0).collect();
    let mut seen = vec![false; n];
    let mut order = Vec::with_capacity(n);
    while let Some(v) = queue.pop_front() {
        if seen[v] {
            continue;
        }
        seen[v] = true;
        order.push(v);
        for &w in &adj.succs[v] {
            indegree[w] = indegree[w].saturating_sub(1);
            if indegree[w] == 0 && !seen[w] {
                queue.push_back(w);
            }
        }
    }
    for v in 0..n {
        if !seen[v] {
            order.push(v);
        }
    }
    order
}

fn longest_path_ranks(adj: &Adjacency, topo: &[usize]) -> Vec<i32> {
    let mut rank = vec![0i32; adj.preds.len()];
    let mut ranked = vec![false; adj.preds.len()];
    for &v in topo {
        rank[v] = adj.preds[v]
            .iter()
            .filter(|&&u| ranked[u])
            .map(|&u| rank[u] + 1)
            .max()
            .unwrap_or(0);
        ranked[v] = true;
    }
    rank
}

fn build_layers(ranks: &[i32], topo: &[usize]) -> Vec<Vec<usize>> {
    let max_rank = ranks.iter().copied().max().unwrap_or(0);
    let mut layers = vec![Vec::new(); (max_rank + 1) as usize];
    for &v in topo {
        layers[ranks[v] as usize].push(v);
    }
    layers
}

/// Alternating down/up barycenter sweeps. Nodes with no neighbors in the
/// fixed direction keep their position; ties keep the existing order.
fn order_layers(layers: &mut [Vec<usize>], adj: &Adjacency) {
    let node_count = adj.preds.len();
    let mut pos = vec![0usize; node_count];
    for layer in layers.iter() {
        for (i, &v) in layer.iter().enumerate() {
            pos[v] = i;
        }
    }
    for sweep in 0..ORDERING_SWEEPS {
        let downward = sweep % 2 == 0;
        let indices: Vec<usize> = if downward {
            (1..layers.len()).collect()
        } else {
            (0..layers.len().saturating_sub(1)).rev().collect()
        };
        for k in indices {
            let layer = &mut layers[k];
            let mut paired: Vec<(usize, f64)> = layer
                .iter()
                .map(|&v| {
                    let neighbors = if downward { &adj.preds[v] } else { &adj.succs[v] };
                    let bary = if neighbors.is_empty() {
                        pos[v] as f64
                    } else {
                        neighbors.iter().map(|&u| pos[u] as f64).sum::<f64>()
                            / neighbors.len() as f64
                    };
                    (v, bary)
                })
                .collect();
            paired.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
            for (i, (v, _)) in paired.iter().enumerate() {
                layer[i] = *v;
                pos[*v] = i;
            }
        }
    }
}

/// Per-node centers split into an order-axis and a rank-axis coordinate,
/// projected into x/y only at the end.
struct Placement {
    order_coord: Vec<f64>,
    rank_coord: Vec<f64>,
    rank_centers: Vec<f64>,
    total_rank: f64,
}

impl Placement {
    fn project(&self, dir: RankDir, order: f64, rank: f64) -> Point {
        match dir {
            RankDir::TopBottom => Point::new(order, rank),
            RankDir::BottomTop => Point::new(order, self.total_rank - rank),
            RankDir::LeftRight => Point::new(rank, order),
            RankDir::RightLeft => Point::new(self.total_rank - rank, order),
        }
    }
}

fn place(graph: &LayoutGraph, layers: &[Vec<usize>]) -> Placement {
    let horizontal = graph.rank_dir.is_horizontal();
    let sep = graph.separations;
    let n = graph.nodes.len();
    let rank_extent = |v: usize| {
        if horizontal {
            graph.nodes[v].width
        } else {
            graph.nodes[v].height
        }
    };
    let order_extent = |v: usize| {
        if horizontal {
            graph.nodes[v].height
        } else {
            graph.nodes[v].width
        }
    };

    let mut order_coord = vec![0.0; n];
    let mut rank_coord = vec![0.0; n];

    // Order axis: pack each rank, then center every rank on the widest one.
    let mut widths = Vec::with_capacity(layers.len());
    for layer in layers {
        let mut cursor = 0.0;
        for &v in layer {
            order_coord[v] = cursor + order_extent(v) / 2.0;
            cursor += order_extent(v) + sep.node;
        }
        widths.push(if layer.is_empty() {
            0.0
        } else {
            cursor - sep.node
        });
    }
    let max_width = widths.iter().copied().fold(0.0, f64::max);
    for (layer, width) in layers.iter().zip(&widths) {
        let shift = (max_width - width) / 2.0;
        for &v in layer {
            order_coord[v] += shift;
        }
    }

    // Rank axis: each rank is as thick as its thickest node.
    let mut rank_centers = Vec::with_capacity(layers.len());
    let mut cursor = 0.0;
    for layer in layers {
        let thickness = layer.iter().map(|&v| rank_extent(v)).fold(0.0, f64::max);
        let center = cursor + thickness / 2.0;
        rank_centers.push(center);
        for &v in layer {
            rank_coord[v] = center;
        }
        cursor += thickness + sep.rank;
    }
    let total_rank = (cursor - sep.rank).max(0.0);

    Placement {
        order_coord,
        rank_coord,
        rank_centers,
        total_rank,
    }
}

fn write_nodes(graph: &mut LayoutGraph, placement: &Placement) {
    let dir = graph.rank_dir;
    for v in 0..graph.nodes.len() {
        let p = placement.project(dir, placement.order_coord[v], placement.rank_coord[v]);
        graph.nodes[v].x = p.x;
        graph.nodes[v].y = p.y;
    }
}

fn route_edges(graph: &mut LayoutGraph, placement: &Placement, ranks: &[i32]) {
    let dir = graph.rank_dir;
    let sep = graph.separations;
    let mut parallel: FxHashMap<(usize, usize), usize> = FxHashMap::default();
    for i in 0..graph.edges.len() {
        let (from, to) = {
            let edge = &graph.edges[i];
            (graph.slot(&edge.from), graph.slot(&edge.to))
        };
        let (Some(from), Some(to)) = (from, to) else {
            graph.edges[i].points.clear();
            continue;
        };
        if from == to {
            graph.edges[i].points = self_loop_points(&graph.nodes[from], sep.edge);
            continue;
        }
        let lane = {
            let count = parallel.entry((from, to)).or_insert(0);
            let lane = *count;
            *count += 1;
            lane
        };
        let offset = lane_offset(lane, sep.edge);

        let (fo, fr) = (placement.order_coord[from], placement.rank_coord[from]);
        let (to_, tr) = (placement.order_coord[to], placement.rank_coord[to]);
        let mut points = vec![placement.project(dir, fo, fr)];
        let (lo, hi) = (ranks[from].min(ranks[to]), ranks[from].max(ranks[to]));
        let span = tr - fr;
        let mut mids = Vec::new();
        for k in (lo + 1)..hi {
            let rc = placement.rank_centers[k as usize];
            let t = if span.abs() < f64::EPSILON {
                0.5
            } else {
                (rc - fr) / span
            };
            mids.push(placement.project(dir, fo + (to_ - fo) * t + offset, rc));
        }
        if mids.is_empty() && offset != 0.0 {
            mids.push(placement.project(dir, (fo + to_) / 2.0 + offset, (fr + tr) / 2.0));
        }
        points.extend(mids);
        points.push(placement.project(dir, to_, tr));
        graph.edges[i].points = points;
    }
}

/// A rectangular bulge off the node's right side; start and end sit on the
/// node boundary.
fn self_loop_points(node: &LayoutNode, edge_sep: f64) -> Vec<Point> {
    let right = node.x + node.width / 2.0;
    let dy = (node.height / 4.0).max(edge_sep / 2.0);
    vec![
        Point::new(right, node.y - dy),
        Point::new(right + 2.0 * edge_sep, node.y - dy),
        Point::new(right + 2.0 * edge_sep, node.y + dy),
        Point::new(right, node.y + dy),
    ]
}

/// Lane 0 runs straight; later lanes alternate sides at growing distance.
fn lane_offset(lane: usize, edge_sep: f64) -> f64 {
    if lane == 0 {
        return 0.0;
    }
    let step = lane.div_ceil(2) as f64;
    if lane % 2 == 1 {
        step * edge_sep
    } else {
        -step * edge_sep
    }
}
