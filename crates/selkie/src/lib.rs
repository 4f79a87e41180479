#![forbid(unsafe_code)]

//! `selkie` is a headless, generic diagram-modeling engine.
//!
//! The workspace splits into three layers, bundled here behind one
//! dependency:
//!
//! - the model side ([`selkie-core`](selkie_core)), re-exported at the root:
//!   schema registry, element repository, generic document save/load,
//!   memento/diff, and the base model types
//! - [`view`]: view elements, edge routing, canvases, and the five-phase
//!   render pipeline
//! - [`layout`]: the layered graph-layout collaborator
//!
//! [`standard_registry`] wires up every shipped type; [`Workbench`] bundles
//! it with a repository and whole-project document operations.

pub use selkie_core::*;

/// View elements, edge routing, canvases, and the diagram render pipeline.
pub mod view {
    pub use selkie_view::canvas::{
        Canvas, CanvasState, DrawOp, Font, FontStyle, RecordingCanvas, measure_text, state_scope,
    };
    pub use selkie_view::diagram::{
        Diagram, deselect_all, deselect_view, draw_diagram, layout_diagram, pick, select_area,
        select_view,
    };
    pub use selkie_view::edge::{EdgeView, EndStyle, LineStyle};
    pub use selkie_view::error::{Error, Result};
    pub use selkie_view::geom;
    pub use selkie_view::node::{Movable, NodeView, ShapeForm, Sizable};
    pub use selkie_view::points::PointList;
    pub use selkie_view::schema::register_view_types;
    pub use selkie_view::style::StyleDefaults;
    pub use selkie_view::svg::SvgCanvas;
    pub use selkie_view::view::{
        LineMode, Selectability, ViewCore, ViewElement, arrange_view, draw_view,
        is_one_of_the_container_views, render_view, set_container, setup_view, size_view,
        update_view, view_at, view_element, view_element_mut,
    };
}

/// The graph-layout collaborator.
pub mod layout {
    pub use selkie_layout::{
        LayeredEngine, LayoutEdge, LayoutEngine, LayoutGraph, LayoutNode, RankDir, Separations,
        layout,
    };
}

/// Registry with every shipped type: the model side plus the view side.
pub fn standard_registry() -> Registry {
    let mut registry = Registry::new();
    register_model_types(&mut registry);
    view::register_view_types(&mut registry);
    registry
}

pub type ProjectResult<T> = std::result::Result<T, ProjectError>;

/// Failure of a whole-project operation. Partial-document damage is not an
/// error; it degrades to [`Diagnostics`] warnings during the load.
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error(transparent)]
    Core(#[from] Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("document holds no loadable root element")]
    UnusableDocument,
}

/// The standard registry bundled with a repository, plus the document
/// operations a host application performs on whole-project files.
#[derive(Debug)]
pub struct Workbench {
    pub registry: Registry,
    pub repo: Repository,
}

impl Workbench {
    pub fn new() -> Self {
        Self {
            registry: standard_registry(),
            repo: Repository::new(),
        }
    }

    /// Fresh project root.
    pub fn new_project(&mut self, name: impl Into<String>) -> Id {
        let mut project = Project::new();
        project.core.model.name = name.into();
        self.repo.insert(Box::new(project))
    }

    /// Serializes `root` and everything it owns into a pretty-printed JSON
    /// document.
    pub fn save_project(&self, root: &Id) -> ProjectResult<String> {
        let mut diags = Diagnostics::new();
        let doc = save_element(&self.repo, &self.registry, root, &mut diags)
            .ok_or_else(|| Error::MissingElement { id: root.clone() })?;
        Ok(serde_json::to_string_pretty(&doc)?)
    }

    /// Loads a whole-project document and resolves its references. Ids from
    /// the document are kept unless they collide with live elements.
    pub fn load_project(&mut self, text: &str) -> ProjectResult<Id> {
        let doc: serde_json::Value = serde_json::from_str(text)?;
        let mut reader = Reader::new();
        let root = load_element(&mut self.repo, &self.registry, &doc, &mut reader);
        resolve_references(&self.repo, &self.registry, &mut reader);
        root.ok_or(ProjectError::UnusableDocument)
    }
}

impl Default for Workbench {
    fn default() -> Self {
        Self::new()
    }
}
