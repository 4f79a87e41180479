//! Diagrams and their orchestration.
//!
//! A diagram owns an ordered set of top-level views and drives them as a
//! frame: render in ascending z order, then selection decorations. One
//! view's failure (a dangling edge, a borrow conflict from a reentrant
//! hook) is logged and skipped; the rest of the frame still draws.

use std::any::Any;
use std::cmp::Ordering;

use selkie_core::{AttrValue, Element, ElementCore, ExtensibleCore, Id, Repository};
use selkie_layout::{LayoutEngine, LayoutGraph, RankDir, Separations};

use crate::canvas::{Canvas, state_scope};
use crate::edge::{EdgeView, LineStyle};
use crate::error::{Error, Result};
use crate::geom::{Point, Rect, point, rect};
use crate::node::NodeView;
use crate::points::PointList;
use crate::view::{self, Selectability, view_element, view_element_mut};

const HANDLE_SIZE: f64 = 6.0;
const HIGHLIGHT_COLOR: &str = "#4f9eff";
const SELECTION_DASH: [f64; 2] = [4.0, 4.0];

/// Canvas of views over some model subtree.
#[derive(Debug, Clone, Default)]
pub struct Diagram {
    pub core: ExtensibleCore,
    /// Opened first when the document loads.
    pub default_diagram: bool,
    pub owned_views: Vec<Id>,
    /// Current selection; never persisted.
    pub selected_views: Vec<Id>,
}

impl Diagram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            core: ExtensibleCore::named(name),
            default_diagram: false,
            owned_views: Vec::new(),
            selected_views: Vec::new(),
        }
    }
}

impl Element for Diagram {
    fn type_name(&self) -> &'static str {
        "Diagram"
    }

    fn core(&self) -> &ElementCore {
        &self.core.model.element
    }

    fn core_mut(&mut self) -> &mut ElementCore {
        &mut self.core.model.element
    }

    fn attr(&self, name: &str) -> Option<AttrValue> {
        match name {
            "defaultDiagram" => Some(AttrValue::Bool(self.default_diagram)),
            "ownedViews" => Some(AttrValue::Refs(self.owned_views.clone())),
            "selectedViews" => Some(AttrValue::Refs(self.selected_views.clone())),
            _ => self.core.attr(name),
        }
    }

    fn set_attr(&mut self, name: &str, value: AttrValue) -> bool {
        match (name, value) {
            ("defaultDiagram", AttrValue::Bool(b)) => {
                self.default_diagram = b;
                true
            }
            ("ownedViews", AttrValue::Refs(ids)) => {
                self.owned_views = ids;
                true
            }
            ("selectedViews", AttrValue::Refs(ids)) => {
                self.selected_views = ids;
                true
            }
            (name, value) => self.core.set_attr(name, value),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Top-level views in ascending z order, ties kept in document order.
/// Entries that no longer resolve to a view are treated as absent.
fn views_by_z(repo: &Repository, owned: &[Id]) -> Vec<Id> {
    let mut keyed: Vec<(Id, f64)> = Vec::with_capacity(owned.len());
    for id in owned {
        let Ok(el) = repo.borrow(id) else {
            continue;
        };
        let Some(v) = view_element(&*el) else {
            continue;
        };
        keyed.push((id.clone(), v.view_core().z_index));
    }
    keyed.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
    keyed.into_iter().map(|(id, _)| id).collect()
}

/// Renders one frame of the diagram: all five pipeline phases per top-level
/// view, back to front, then selection decorations when `show_selections`.
pub fn draw_diagram(
    repo: &Repository,
    canvas: &mut dyn Canvas,
    diagram: &Id,
    show_selections: bool,
) -> Result<()> {
    let (owned, selected) = {
        let d = repo.get::<Diagram>(diagram)?;
        (d.owned_views.clone(), d.selected_views.clone())
    };
    for id in views_by_z(repo, &owned) {
        if let Err(err) = view::render_view(repo, canvas, &id) {
            tracing::warn!(view = %id, error = %err, "view failed to render, skipped");
        }
    }
    if show_selections {
        for id in &selected {
            draw_selection(repo, canvas, id);
        }
    }
    Ok(())
}

fn draw_selection(repo: &Repository, canvas: &mut dyn Canvas, id: &Id) {
    let b = {
        let Ok(el) = repo.borrow(id) else {
            return;
        };
        let Some(v) = view_element(&*el) else {
            return;
        };
        if !v.view_core().visible {
            return;
        }
        v.bounding_box(repo)
    };
    state_scope(canvas, |c| {
        {
            let state = c.state_mut();
            state.line_color = HIGHLIGHT_COLOR.to_string();
            state.fill_color = HIGHLIGHT_COLOR.to_string();
        }
        c.rect(b, Some(&SELECTION_DASH));
        let half = HANDLE_SIZE / 2.0;
        for corner in [
            point(b.min_x(), b.min_y()),
            point(b.max_x(), b.min_y()),
            point(b.min_x(), b.max_y()),
            point(b.max_x(), b.max_y()),
        ] {
            c.fill_rect(rect(corner.x - half, corner.y - half, HANDLE_SIZE, HANDLE_SIZE));
        }
    });
}

/// Topmost view at `p`, searching top-level views front to back.
pub fn pick(repo: &Repository, diagram: &Id, p: Point) -> Option<Id> {
    let owned = repo.get::<Diagram>(diagram).ok()?.owned_views.clone();
    for id in views_by_z(repo, &owned).iter().rev() {
        if let Some(found) = view::view_at(repo, id, p) {
            return Some(found);
        }
    }
    None
}

/// Marks the view selected and records it on the diagram.
pub fn select_view(repo: &Repository, diagram: &Id, view: &Id) -> Result<()> {
    {
        let mut el = repo.borrow_mut(view)?;
        match view_element_mut(&mut *el) {
            Some(v) => v.view_core_mut().selected = true,
            None => return Err(Error::NotAView { id: view.clone() }),
        }
    }
    let mut d = repo.get_mut::<Diagram>(diagram)?;
    if !d.selected_views.contains(view) {
        d.selected_views.push(view.clone());
    }
    Ok(())
}

pub fn deselect_view(repo: &Repository, diagram: &Id, view: &Id) -> Result<()> {
    if repo.contains(view) {
        let mut el = repo.borrow_mut(view)?;
        if let Some(v) = view_element_mut(&mut *el) {
            v.view_core_mut().selected = false;
        }
    }
    let mut d = repo.get_mut::<Diagram>(diagram)?;
    d.selected_views.retain(|id| id != view);
    Ok(())
}

pub fn deselect_all(repo: &Repository, diagram: &Id) -> Result<()> {
    let selected = repo.get::<Diagram>(diagram)?.selected_views.clone();
    for id in selected {
        if !repo.contains(&id) {
            continue;
        }
        let mut el = repo.borrow_mut(&id)?;
        if let Some(v) = view_element_mut(&mut *el) {
            v.view_core_mut().selected = false;
        }
    }
    repo.get_mut::<Diagram>(diagram)?.selected_views.clear();
    Ok(())
}

/// Replaces the selection with every top-level view whose bounding box
/// intersects `area`. Invisible views, non-`Yes` selectability, and
/// style-inheriting satellites never qualify.
pub fn select_area(repo: &Repository, diagram: &Id, area: Rect) -> Result<Vec<Id>> {
    deselect_all(repo, diagram)?;
    let owned = repo.get::<Diagram>(diagram)?.owned_views.clone();
    let mut picked = Vec::new();
    for id in owned {
        let hit = {
            let Ok(el) = repo.borrow(&id) else {
                continue;
            };
            let Some(v) = view_element(&*el) else {
                continue;
            };
            let core = v.view_core();
            core.visible
                && core.selectable == Selectability::Yes
                && !core.parent_style
                && area.intersects(&v.bounding_box(repo))
        };
        if hit {
            select_view(repo, diagram, &id)?;
            picked.push(id);
        }
    }
    Ok(picked)
}

/// Runs a layout engine over the diagram's top-level node views and the
/// edges connecting them, then copies positions and routed polylines back.
///
/// Node positions land on whole pixels. Edges the engine routed switch to
/// [`LineStyle::Curve`] so the polyline draws as a spline; edges left out of
/// the graph (a dangling or nested endpoint) keep their current route.
pub fn layout_diagram(
    repo: &Repository,
    diagram: &Id,
    engine: &dyn LayoutEngine,
    rank_dir: RankDir,
    separations: Separations,
) -> Result<()> {
    let owned = repo.get::<Diagram>(diagram)?.owned_views.clone();
    let mut graph = LayoutGraph::new(rank_dir, separations);

    for id in &owned {
        let Ok(el) = repo.borrow(id) else {
            continue;
        };
        if let Some(node) = el.downcast_ref::<NodeView>() {
            graph.set_node(id.as_str(), node.width, node.height);
        }
    }
    for id in &owned {
        let Ok(el) = repo.borrow(id) else {
            continue;
        };
        let Some(edge) = el.downcast_ref::<EdgeView>() else {
            continue;
        };
        let (Some(tail), Some(head)) = (edge.tail.clone(), edge.head.clone()) else {
            continue;
        };
        if graph.node(tail.as_str()).is_some() && graph.node(head.as_str()).is_some() {
            graph.set_edge(id.as_str(), tail.as_str(), head.as_str());
        }
    }

    engine.run(&mut graph);

    for n in graph.nodes() {
        let id = Id::from(n.id.as_str());
        let Ok(mut el) = repo.borrow_mut(&id) else {
            continue;
        };
        if let Some(node) = el.downcast_mut::<NodeView>() {
            node.left = (n.x - node.width / 2.0).round();
            node.top = (n.y - node.height / 2.0).round();
        }
    }
    for e in graph.edges() {
        if e.points.is_empty() {
            continue;
        }
        let id = Id::from(e.id.as_str());
        let Ok(mut el) = repo.borrow_mut(&id) else {
            continue;
        };
        let Some(edge) = el.downcast_mut::<EdgeView>() else {
            continue;
        };
        let mut pts = PointList::new();
        for p in &e.points {
            pts.push(point(p.x, p.y));
        }
        pts.quantize();
        edge.points = pts;
        edge.line_style = LineStyle::Curve;
    }
    Ok(())
}
