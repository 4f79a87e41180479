#![forbid(unsafe_code)]

//! View elements, edge routing, and the diagram render pipeline (headless).
//!
//! Design goals:
//! - views are ordinary elements: same repository, same schema registry,
//!   same generic save/load as the model side
//! - a fixed five-phase pipeline (setup, update, size, arrange, draw) with
//!   per-view failure isolation at the diagram level
//! - drawing targets an abstract [`Canvas`]; the SVG and recording backends
//!   ship here, rasterizers plug in downstream

pub mod canvas;
pub mod diagram;
pub mod edge;
pub mod error;
pub mod geom;
pub mod node;
pub mod points;
pub mod route;
pub mod schema;
pub mod style;
pub mod svg;
pub mod view;

pub use canvas::{
    Canvas, CanvasState, DrawOp, Font, FontStyle, RecordingCanvas, measure_text, state_scope,
};
pub use diagram::{
    Diagram, deselect_all, deselect_view, draw_diagram, layout_diagram, pick, select_area,
    select_view,
};
pub use edge::{EdgeView, EndStyle, LineStyle};
pub use error::{Error, Result};
pub use node::{Movable, NodeView, ShapeForm, Sizable};
pub use points::PointList;
pub use schema::register_view_types;
pub use style::StyleDefaults;
pub use svg::SvgCanvas;
pub use view::{
    LineMode, Selectability, ViewCore, ViewElement, arrange_view, draw_view,
    is_one_of_the_container_views, render_view, set_container, setup_view, size_view,
    update_view, view_at, view_element, view_element_mut,
};

#[cfg(test)]
mod tests;
