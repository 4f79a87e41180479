//! The view element base and the render pipeline.
//!
//! Views are elements like any other: they live in the [`Repository`], carry
//! schema attributes, and save/load through the generic document machinery.
//! What sets them apart is the fixed five-phase lifecycle driven from here:
//!
//! 1. `setup` - style and visibility cascade down the subtree
//! 2. `update` - views synchronize from their bound model
//! 3. `size` - children first, then the view computes its own minimums
//! 4. `arrange` - children first, containment boundaries, then placement
//! 5. `draw` - painter's order, self before children
//!
//! Concrete appearance is data ([`ShapeForm`](crate::node::ShapeForm),
//! [`LineStyle`](crate::edge::LineStyle)), not subtypes; the pipeline
//! dispatches over the closed set of shipped view kinds.

use rustc_hash::FxHashSet;
use selkie_core::{AttrValue, Element, ElementCore, Id, Repository};

use crate::canvas::{Canvas, Font};
use crate::edge::EdgeView;
use crate::error::{Error, Result};
use crate::geom::{Point, Rect};
use crate::node::NodeView;
use crate::style::StyleDefaults;

/// How a view participates in hit-testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selectability {
    /// Hit-testable itself, and its subtree is searched.
    #[default]
    Yes,
    /// Its subtree is searched, but the view itself never hits.
    Propagate,
    /// Neither the view nor anything below it hits.
    No,
}

impl Selectability {
    pub fn as_literal(self) -> &'static str {
        match self {
            Selectability::Yes => "yes",
            Selectability::Propagate => "propagate",
            Selectability::No => "no",
        }
    }

    pub fn from_literal(s: &str) -> Option<Self> {
        match s {
            "yes" => Some(Selectability::Yes),
            "propagate" => Some(Selectability::Propagate),
            "no" => Some(Selectability::No),
            _ => None,
        }
    }
}

const DOT_PATTERN: [f64; 2] = [3.0, 3.0];

/// Stroke pattern for a view's outlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineMode {
    #[default]
    Solid,
    Dot,
}

impl LineMode {
    pub fn as_literal(self) -> &'static str {
        match self {
            LineMode::Solid => "solid",
            LineMode::Dot => "dot",
        }
    }

    pub fn from_literal(s: &str) -> Option<Self> {
        match s {
            "solid" => Some(LineMode::Solid),
            "dot" => Some(LineMode::Dot),
            _ => None,
        }
    }

    pub fn dash(self) -> Option<&'static [f64]> {
        match self {
            LineMode::Solid => None,
            LineMode::Dot => Some(&DOT_PATTERN),
        }
    }
}

/// Shared block of every view: model binding, appearance, flags, and the
/// two containment structures (owned `subViews` and the orthogonal
/// `containerView`/`containedViews` relation).
#[derive(Debug, Clone)]
pub struct ViewCore {
    pub element: ElementCore,
    /// Model element this view presents; `None` for free-standing views.
    pub model: Option<Id>,
    pub visible: bool,
    pub enabled: bool,
    pub selected: bool,
    pub selectable: Selectability,
    pub line_color: String,
    pub fill_color: String,
    pub font_color: String,
    pub font: Font,
    /// Inherit colors and font from the parent view on every setup pass.
    pub parent_style: bool,
    pub show_shadow: bool,
    /// The view may be dropped into a different container interactively.
    pub container_changeable: bool,
    /// The container's boundary grows to keep this view inside.
    pub container_extending: bool,
    pub line_mode: LineMode,
    pub z_index: f64,
    pub sub_views: Vec<Id>,
    pub container_view: Option<Id>,
    pub contained_views: Vec<Id>,
}

impl ViewCore {
    pub fn new() -> Self {
        Self::with_defaults(&StyleDefaults::default())
    }

    pub fn with_defaults(defaults: &StyleDefaults) -> Self {
        Self {
            element: ElementCore::new(),
            model: None,
            visible: true,
            enabled: true,
            selected: false,
            selectable: Selectability::Yes,
            line_color: defaults.line_color.clone(),
            fill_color: defaults.fill_color.clone(),
            font_color: defaults.font_color.clone(),
            font: defaults.font(),
            parent_style: false,
            show_shadow: false,
            container_changeable: false,
            container_extending: false,
            line_mode: LineMode::Solid,
            z_index: 0.0,
            sub_views: Vec::new(),
            container_view: None,
            contained_views: Vec::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<AttrValue> {
        match name {
            "model" => Some(AttrValue::Ref(self.model.clone())),
            "visible" => Some(AttrValue::Bool(self.visible)),
            "enabled" => Some(AttrValue::Bool(self.enabled)),
            "selected" => Some(AttrValue::Bool(self.selected)),
            "selectable" => Some(AttrValue::Lit(self.selectable.as_literal().to_string())),
            "lineColor" => Some(AttrValue::Str(self.line_color.clone())),
            "fillColor" => Some(AttrValue::Str(self.fill_color.clone())),
            "fontColor" => Some(AttrValue::Str(self.font_color.clone())),
            "font" => Some(AttrValue::Custom(self.font.to_text())),
            "parentStyle" => Some(AttrValue::Bool(self.parent_style)),
            "showShadow" => Some(AttrValue::Bool(self.show_shadow)),
            "containerChangeable" => Some(AttrValue::Bool(self.container_changeable)),
            "containerExtending" => Some(AttrValue::Bool(self.container_extending)),
            "lineMode" => Some(AttrValue::Lit(self.line_mode.as_literal().to_string())),
            "zIndex" => Some(AttrValue::Num(self.z_index)),
            "subViews" => Some(AttrValue::Refs(self.sub_views.clone())),
            "containerView" => Some(AttrValue::Ref(self.container_view.clone())),
            "containedViews" => Some(AttrValue::Refs(self.contained_views.clone())),
            _ => None,
        }
    }

    pub fn set_attr(&mut self, name: &str, value: AttrValue) -> bool {
        match (name, value) {
            ("model", AttrValue::Ref(id)) => {
                self.model = id;
                true
            }
            ("visible", AttrValue::Bool(b)) => {
                self.visible = b;
                true
            }
            ("enabled", AttrValue::Bool(b)) => {
                self.enabled = b;
                true
            }
            ("selected", AttrValue::Bool(b)) => {
                self.selected = b;
                true
            }
            ("selectable", AttrValue::Lit(s)) => match Selectability::from_literal(&s) {
                Some(v) => {
                    self.selectable = v;
                    true
                }
                None => false,
            },
            ("lineColor", AttrValue::Str(s)) => {
                self.line_color = s;
                true
            }
            ("fillColor", AttrValue::Str(s)) => {
                self.fill_color = s;
                true
            }
            ("fontColor", AttrValue::Str(s)) => {
                self.font_color = s;
                true
            }
            ("font", AttrValue::Custom(s)) => match Font::from_text(&s) {
                Some(font) => {
                    self.font = font;
                    true
                }
                None => false,
            },
            ("parentStyle", AttrValue::Bool(b)) => {
                self.parent_style = b;
                true
            }
            ("showShadow", AttrValue::Bool(b)) => {
                self.show_shadow = b;
                true
            }
            ("containerChangeable", AttrValue::Bool(b)) => {
                self.container_changeable = b;
                true
            }
            ("containerExtending", AttrValue::Bool(b)) => {
                self.container_extending = b;
                true
            }
            ("lineMode", AttrValue::Lit(s)) => match LineMode::from_literal(&s) {
                Some(v) => {
                    self.line_mode = v;
                    true
                }
                None => false,
            },
            ("zIndex", AttrValue::Num(n)) => {
                self.z_index = n;
                true
            }
            ("subViews", AttrValue::Refs(ids)) => {
                self.sub_views = ids;
                true
            }
            ("containerView", AttrValue::Ref(id)) => {
                self.container_view = id;
                true
            }
            ("containedViews", AttrValue::Refs(ids)) => {
                self.contained_views = ids;
                true
            }
            _ => false,
        }
    }
}

impl Default for ViewCore {
    fn default() -> Self {
        Self::new()
    }
}

/// Phase hooks of the render pipeline.
///
/// Hooks run while the view itself is mutably borrowed from the repository:
/// they may borrow *other* elements (the model, edge endpoints) but never
/// their own id, or the phase fails with `ElementBusy` and the whole view is
/// skipped for the frame.
pub trait ViewElement: Element {
    fn view_core(&self) -> &ViewCore;

    fn view_core_mut(&mut self) -> &mut ViewCore;

    fn on_setup(&mut self, _repo: &Repository) -> Result<()> {
        Ok(())
    }

    /// Pulls presentation state from the bound model.
    fn on_update(&mut self, _repo: &Repository) -> Result<()> {
        Ok(())
    }

    /// Computes minimum extents and applies sizing constraints.
    fn size_object(&mut self, _repo: &Repository, _canvas: &mut dyn Canvas) -> Result<()> {
        Ok(())
    }

    /// Places self, assuming children are already arranged.
    fn arrange_object(&mut self, _repo: &Repository, _canvas: &mut dyn Canvas) -> Result<()> {
        Ok(())
    }

    /// Grows the containment boundary around `containerExtending` views.
    fn delimit_containing_boundary(&mut self, _repo: &Repository) {}

    fn draw_object(&self, _repo: &Repository, _canvas: &mut dyn Canvas) {}

    fn draw_shadow(&self, _repo: &Repository, _canvas: &mut dyn Canvas) {}

    fn bounding_box(&self, repo: &Repository) -> Rect;

    fn contains_point(&self, repo: &Repository, p: Point) -> bool {
        let r = self.bounding_box(repo);
        p.x >= r.min_x() && p.x <= r.max_x() && p.y >= r.min_y() && p.y <= r.max_y()
    }
}

/// The closed set of shipped view kinds, as a dynamic view.
pub fn view_element(el: &dyn Element) -> Option<&dyn ViewElement> {
    if let Some(v) = el.downcast_ref::<NodeView>() {
        return Some(v);
    }
    if let Some(v) = el.downcast_ref::<EdgeView>() {
        return Some(v);
    }
    None
}

pub fn view_element_mut(el: &mut dyn Element) -> Option<&mut dyn ViewElement> {
    if el.is::<NodeView>() {
        return el.downcast_mut::<NodeView>().map(|v| v as &mut dyn ViewElement);
    }
    if el.is::<EdgeView>() {
        return el.downcast_mut::<EdgeView>().map(|v| v as &mut dyn ViewElement);
    }
    None
}

pub(crate) fn sub_view_ids(repo: &Repository, id: &Id) -> Result<Vec<Id>> {
    let el = repo.borrow(id)?;
    match view_element(&*el) {
        Some(view) => Ok(view.view_core().sub_views.clone()),
        None => Err(Error::NotAView { id: id.clone() }),
    }
}

struct InheritedStyle {
    line_color: String,
    fill_color: String,
    font_color: String,
    font: Font,
    visible: bool,
}

/// Phase 1: cascades style and visibility down the subtree, then runs each
/// view's `on_setup`.
pub fn setup_view(repo: &Repository, id: &Id) -> Result<()> {
    setup_recurse(repo, id, None)
}

fn setup_recurse(repo: &Repository, id: &Id, inherited: Option<&InheritedStyle>) -> Result<()> {
    let next = {
        let mut el = repo.borrow_mut(id)?;
        let view = view_element_mut(&mut *el).ok_or_else(|| Error::NotAView { id: id.clone() })?;
        {
            let core = view.view_core_mut();
            if let Some(parent) = inherited {
                if core.parent_style {
                    core.line_color = parent.line_color.clone();
                    core.fill_color = parent.fill_color.clone();
                    core.font_color = parent.font_color.clone();
                    core.font = parent.font.clone();
                }
                if !parent.visible {
                    core.visible = false;
                }
            }
        }
        view.on_setup(repo)?;
        let core = view.view_core();
        InheritedStyle {
            line_color: core.line_color.clone(),
            fill_color: core.fill_color.clone(),
            font_color: core.font_color.clone(),
            font: core.font.clone(),
            visible: core.visible,
        }
    };
    for child in sub_view_ids(repo, id)? {
        setup_recurse(repo, &child, Some(&next))?;
    }
    Ok(())
}

/// Phase 2: synchronizes each view from its model, parents before children.
pub fn update_view(repo: &Repository, id: &Id) -> Result<()> {
    {
        let mut el = repo.borrow_mut(id)?;
        let view = view_element_mut(&mut *el).ok_or_else(|| Error::NotAView { id: id.clone() })?;
        view.on_update(repo)?;
    }
    for child in sub_view_ids(repo, id)? {
        update_view(repo, &child)?;
    }
    Ok(())
}

/// Phase 3: sizes children before their parent.
pub fn size_view(repo: &Repository, canvas: &mut dyn Canvas, id: &Id) -> Result<()> {
    for child in sub_view_ids(repo, id)? {
        size_view(repo, canvas, &child)?;
    }
    let mut el = repo.borrow_mut(id)?;
    let view = view_element_mut(&mut *el).ok_or_else(|| Error::NotAView { id: id.clone() })?;
    view.size_object(repo, canvas)?;
    Ok(())
}

/// Phase 4: arranges children, corrects containment boundaries, then places
/// the view itself.
pub fn arrange_view(repo: &Repository, canvas: &mut dyn Canvas, id: &Id) -> Result<()> {
    for child in sub_view_ids(repo, id)? {
        arrange_view(repo, canvas, &child)?;
    }
    let mut el = repo.borrow_mut(id)?;
    let view = view_element_mut(&mut *el).ok_or_else(|| Error::NotAView { id: id.clone() })?;
    view.delimit_containing_boundary(repo);
    view.arrange_object(repo, canvas)?;
    Ok(())
}

/// Phase 5: draws in painter's order. Invisible views prune their whole
/// subtree.
pub fn draw_view(repo: &Repository, canvas: &mut dyn Canvas, id: &Id) -> Result<()> {
    {
        let el = repo.borrow(id)?;
        let view = view_element(&*el).ok_or_else(|| Error::NotAView { id: id.clone() })?;
        let core = view.view_core();
        if !core.visible {
            return Ok(());
        }
        if core.show_shadow {
            view.draw_shadow(repo, canvas);
        }
        view.draw_object(repo, canvas);
    }
    for child in sub_view_ids(repo, id)? {
        draw_view(repo, canvas, &child)?;
    }
    Ok(())
}

/// All five phases for one view tree.
pub fn render_view(repo: &Repository, canvas: &mut dyn Canvas, id: &Id) -> Result<()> {
    setup_view(repo, id)?;
    update_view(repo, id)?;
    size_view(repo, canvas, id)?;
    arrange_view(repo, canvas, id)?;
    draw_view(repo, canvas, id)
}

/// Topmost hit in this view's subtree, children (back to front) before the
/// view itself. Invisible and `Selectability::No` views prune their subtree;
/// `Propagate` views search children but never hit themselves.
pub fn view_at(repo: &Repository, id: &Id, p: Point) -> Option<Id> {
    let (visible, selectable, children, hit) = {
        let el = repo.borrow(id).ok()?;
        let view = view_element(&*el)?;
        let core = view.view_core();
        (
            core.visible,
            core.selectable,
            core.sub_views.clone(),
            view.contains_point(repo, p),
        )
    };
    if !visible || selectable == Selectability::No {
        return None;
    }
    for child in children.iter().rev() {
        if let Some(found) = view_at(repo, child, p) {
            return Some(found);
        }
    }
    if selectable == Selectability::Yes && hit {
        return Some(id.clone());
    }
    None
}

fn container_of(repo: &Repository, id: &Id) -> Option<Id> {
    let el = repo.borrow(id).ok()?;
    let view = view_element(&*el)?;
    view.view_core().container_view.clone()
}

/// True when `candidate` appears on `view`'s container chain (strictly
/// above it). Corrupt container cycles terminate the walk.
pub fn is_one_of_the_container_views(repo: &Repository, candidate: &Id, view: &Id) -> bool {
    let mut seen: FxHashSet<Id> = FxHashSet::default();
    let mut current = container_of(repo, view);
    while let Some(step) = current {
        if step == *candidate {
            return true;
        }
        if !seen.insert(step.clone()) {
            return false;
        }
        current = container_of(repo, &step);
    }
    false
}

/// Moves `view` into `container` (or out of any container), keeping
/// `containerView` and `containedViews` consistent on both sides. Refuses
/// assignments that would make a view contain itself.
pub fn set_container(repo: &Repository, view: &Id, container: Option<&Id>) -> Result<()> {
    if let Some(target) = container {
        if target == view || is_one_of_the_container_views(repo, view, target) {
            return Err(Error::Core(selkie_core::Error::WrongAttribute {
                id: view.clone(),
                attr: "containerView".to_string(),
            }));
        }
    }

    let previous = {
        let el = repo.borrow(view)?;
        let v = view_element(&*el).ok_or_else(|| Error::NotAView { id: view.clone() })?;
        v.view_core().container_view.clone()
    };
    if let Some(prev) = previous {
        if repo.contains(&prev) {
            let mut el = repo.borrow_mut(&prev)?;
            if let Some(v) = view_element_mut(&mut *el) {
                v.view_core_mut().contained_views.retain(|id| id != view);
            }
        }
    }

    {
        let mut el = repo.borrow_mut(view)?;
        let v = view_element_mut(&mut *el).ok_or_else(|| Error::NotAView { id: view.clone() })?;
        v.view_core_mut().container_view = container.cloned();
    }
    if let Some(target) = container {
        let mut el = repo.borrow_mut(target)?;
        let v = view_element_mut(&mut *el).ok_or_else(|| Error::NotAView { id: target.clone() })?;
        v.view_core_mut().contained_views.push(view.clone());
    }
    Ok(())
}
