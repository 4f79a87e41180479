#![forbid(unsafe_code)]

//! Layered graph layout for diagrams.
//!
//! Standalone collaborator crate: the diagram engine hands over a
//! [`LayoutGraph`] of node sizes and edge connectivity, an engine writes node
//! centers and edge waypoints back, and the caller copies the results into
//! its own geometry. [`LayeredEngine`] is the built-in implementation;
//! alternative algorithms plug in through [`LayoutEngine`].

mod engine;
mod model;

pub use engine::{LayeredEngine, LayoutEngine};
pub use model::{LayoutEdge, LayoutGraph, LayoutNode, Point, RankDir, Separations};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Lays out `graph` with the built-in layered engine.
pub fn layout(graph: &mut LayoutGraph) {
    LayeredEngine.run(graph);
}
