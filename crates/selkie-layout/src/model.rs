//! Layout graph data model.
//!
//! These types are intentionally plain and `Clone`-friendly: the diagram
//! engine builds a [`LayoutGraph`] from view geometry, an engine fills in
//! coordinates, and the caller copies them back. Coordinates follow the
//! dagre convention: `x`/`y` are node centers, computed in a top-to-bottom
//! frame and transposed for the other rank directions.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Direction in which ranks advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RankDir {
    #[default]
    TopBottom,
    BottomTop,
    LeftRight,
    RightLeft,
}

impl RankDir {
    /// True when ranks advance along the x axis.
    pub fn is_horizontal(self) -> bool {
        matches!(self, RankDir::LeftRight | RankDir::RightLeft)
    }
}

/// Minimum gaps, in diagram units, enforced between placed items.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Separations {
    /// Gap between nodes within a rank.
    pub node: f64,
    /// Gap between parallel edge paths.
    pub edge: f64,
    /// Gap between consecutive ranks.
    pub rank: f64,
}

impl Default for Separations {
    fn default() -> Self {
        Self {
            node: 50.0,
            edge: 20.0,
            rank: 50.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutNode {
    pub id: String,
    pub width: f64,
    pub height: f64,
    /// Center coordinates, written by the engine.
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutEdge {
    pub id: String,
    pub from: String,
    pub to: String,
    /// Waypoints including both endpoint centers, written by the engine.
    /// Left empty when an endpoint is not part of the graph.
    pub points: Vec<Point>,
}

/// Node sizes plus edge connectivity, the unit of work handed to a
/// [`LayoutEngine`](crate::LayoutEngine).
///
/// Insertion order is significant: engines are expected to be deterministic
/// for a given insertion order, and ties are broken by it.
#[derive(Debug, Clone, Default)]
pub struct LayoutGraph {
    pub rank_dir: RankDir,
    pub separations: Separations,
    pub(crate) nodes: Vec<LayoutNode>,
    pub(crate) edges: Vec<LayoutEdge>,
    pub(crate) index: FxHashMap<String, usize>,
}

impl LayoutGraph {
    pub fn new(rank_dir: RankDir, separations: Separations) -> Self {
        Self {
            rank_dir,
            separations,
            ..Self::default()
        }
    }

    /// Adds a node, or updates its size when the id is already present.
    pub fn set_node(&mut self, id: impl Into<String>, width: f64, height: f64) {
        let id = id.into();
        match self.index.get(&id) {
            Some(&slot) => {
                let node = &mut self.nodes[slot];
                node.width = width;
                node.height = height;
            }
            None => {
                self.index.insert(id.clone(), self.nodes.len());
                self.nodes.push(LayoutNode {
                    id,
                    width,
                    height,
                    x: 0.0,
                    y: 0.0,
                });
            }
        }
    }

    /// Adds an edge. Endpoints need not exist yet; edges whose endpoints are
    /// never added are left without points by the engines.
    pub fn set_edge(
        &mut self,
        id: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
    ) {
        self.edges.push(LayoutEdge {
            id: id.into(),
            from: from.into(),
            to: to.into(),
            points: Vec::new(),
        });
    }

    pub fn node(&self, id: &str) -> Option<&LayoutNode> {
        self.index.get(id).map(|&slot| &self.nodes[slot])
    }

    pub fn nodes(&self) -> &[LayoutNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[LayoutEdge] {
        &self.edges
    }

    pub(crate) fn slot(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }
}
