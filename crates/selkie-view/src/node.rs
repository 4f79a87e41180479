//! Box-shaped views.
//!
//! One concrete node type covers every box-like appearance; the shape is
//! data, not a subtype. Sizing and movement freedoms are transient modes a
//! notation sets per view.

use std::any::Any;

use selkie_core::{AttrValue, Element, ElementCore, Repository};

use crate::canvas::{Canvas, state_scope};
use crate::error::Result;
use crate::geom::{Point, Rect, point, rect, vector};
use crate::style::StyleDefaults;
use crate::view::{ViewCore, ViewElement, view_element};

const TEXT_PADDING: f64 = 6.0;
const NODE_MIN_WIDTH: f64 = 30.0;
const NODE_MIN_HEIGHT: f64 = 20.0;
const ROUND_RADIUS: f64 = 8.0;
const SHADOW_OFFSET: f64 = 4.0;
const SHADOW_ALPHA: f64 = 0.3;
const SHADOW_COLOR: &str = "#c0c0c0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShapeForm {
    #[default]
    Rect,
    RoundRect,
    Ellipse,
    /// Text only, no outline or fill.
    Label,
}

impl ShapeForm {
    pub fn as_literal(self) -> &'static str {
        match self {
            ShapeForm::Rect => "rect",
            ShapeForm::RoundRect => "roundrect",
            ShapeForm::Ellipse => "ellipse",
            ShapeForm::Label => "label",
        }
    }

    pub fn from_literal(s: &str) -> Option<Self> {
        match s {
            "rect" => Some(ShapeForm::Rect),
            "roundrect" => Some(ShapeForm::RoundRect),
            "ellipse" => Some(ShapeForm::Ellipse),
            "label" => Some(ShapeForm::Label),
            _ => None,
        }
    }
}

/// Which axes a view may be resized along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sizable {
    #[default]
    Free,
    Fixed,
    Horizontal,
    Vertical,
    /// Width drives height through the current aspect ratio.
    Ratio,
}

impl Sizable {
    pub fn as_literal(self) -> &'static str {
        match self {
            Sizable::Free => "free",
            Sizable::Fixed => "fixed",
            Sizable::Horizontal => "horizontal",
            Sizable::Vertical => "vertical",
            Sizable::Ratio => "ratio",
        }
    }

    pub fn from_literal(s: &str) -> Option<Self> {
        match s {
            "free" => Some(Sizable::Free),
            "fixed" => Some(Sizable::Fixed),
            "horizontal" => Some(Sizable::Horizontal),
            "vertical" => Some(Sizable::Vertical),
            "ratio" => Some(Sizable::Ratio),
            _ => None,
        }
    }
}

/// Which axes a view may be moved along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Movable {
    #[default]
    Free,
    Fixed,
    Horizontal,
    Vertical,
}

impl Movable {
    pub fn as_literal(self) -> &'static str {
        match self {
            Movable::Free => "free",
            Movable::Fixed => "fixed",
            Movable::Horizontal => "horizontal",
            Movable::Vertical => "vertical",
        }
    }

    pub fn from_literal(s: &str) -> Option<Self> {
        match s {
            "free" => Some(Movable::Free),
            "fixed" => Some(Movable::Fixed),
            "horizontal" => Some(Movable::Horizontal),
            "vertical" => Some(Movable::Vertical),
            _ => None,
        }
    }
}

/// Rectangular view with a data-driven shape and a text label synchronized
/// from its model.
#[derive(Debug, Clone, Default)]
pub struct NodeView {
    pub core: ViewCore,
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    /// Computed by `size_object`; not persisted.
    pub min_width: f64,
    pub min_height: f64,
    /// Shrink-wrap to the minimum extent on every size pass.
    pub auto_resize: bool,
    pub shape: ShapeForm,
    pub text: String,
    pub word_wrap: bool,
    pub sizable: Sizable,
    pub movable: Movable,
}

impl NodeView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults(defaults: &StyleDefaults) -> Self {
        Self {
            core: ViewCore::with_defaults(defaults),
            left: 0.0,
            top: 0.0,
            width: 0.0,
            height: 0.0,
            min_width: 0.0,
            min_height: 0.0,
            auto_resize: false,
            shape: ShapeForm::default(),
            text: String::new(),
            word_wrap: false,
            sizable: Sizable::default(),
            movable: Movable::default(),
        }
    }

    pub fn rect(&self) -> Rect {
        rect(self.left, self.top, self.width, self.height)
    }

    pub fn set_rect(&mut self, r: Rect) {
        self.left = r.min_x();
        self.top = r.min_y();
        self.width = r.size.width;
        self.height = r.size.height;
    }

    pub fn center(&self) -> Point {
        self.rect().center()
    }

    /// Translates the view, gated by its movement mode.
    pub fn move_by(&mut self, dx: f64, dy: f64) {
        let (dx, dy) = match self.movable {
            Movable::Free => (dx, dy),
            Movable::Fixed => (0.0, 0.0),
            Movable::Horizontal => (dx, 0.0),
            Movable::Vertical => (0.0, dy),
        };
        self.left += dx;
        self.top += dy;
    }

    /// Applies a requested size, gated by the sizing mode and floored at
    /// the computed minimums.
    pub fn resize_to(&mut self, width: f64, height: f64) {
        let (width, height) = match self.sizable {
            Sizable::Free => (width, height),
            Sizable::Fixed => (self.width, self.height),
            Sizable::Horizontal => (width, self.height),
            Sizable::Vertical => (self.width, height),
            Sizable::Ratio => {
                if self.width > 0.0 && self.height > 0.0 {
                    (width, width * self.height / self.width)
                } else {
                    (width, height)
                }
            }
        };
        self.width = width.max(self.min_width);
        self.height = height.max(self.min_height);
    }
}

impl ViewElement for NodeView {
    fn view_core(&self) -> &ViewCore {
        &self.core
    }

    fn view_core_mut(&mut self) -> &mut ViewCore {
        &mut self.core
    }

    fn on_update(&mut self, repo: &Repository) -> Result<()> {
        let Some(model) = self.core.model.clone() else {
            return Ok(());
        };
        // A dangling model reference means the model was removed; the view
        // keeps its last text.
        let Ok(el) = repo.borrow(&model) else {
            return Ok(());
        };
        if let Some(AttrValue::Str(name)) = el.attr("name") {
            self.text = name;
        }
        Ok(())
    }

    fn size_object(&mut self, _repo: &Repository, canvas: &mut dyn Canvas) -> Result<()> {
        let font = self.core.font.clone();
        let extent = state_scope(canvas, |c| {
            c.state_mut().font = font;
            c.text_extent(&self.text)
        });
        let (floor_w, floor_h) = match self.shape {
            ShapeForm::Label => (0.0, 0.0),
            _ => (NODE_MIN_WIDTH, NODE_MIN_HEIGHT),
        };
        self.min_width = (extent.width + 2.0 * TEXT_PADDING).max(floor_w);
        self.min_height = (extent.height + 2.0 * TEXT_PADDING).max(floor_h);
        if self.auto_resize {
            self.width = self.min_width;
            self.height = self.min_height;
        } else {
            self.width = self.width.max(self.min_width);
            self.height = self.height.max(self.min_height);
        }
        Ok(())
    }

    fn delimit_containing_boundary(&mut self, repo: &Repository) {
        let contained = self.core.contained_views.clone();
        let mut boundary = self.rect();
        let mut grew = false;
        for id in contained {
            let Ok(el) = repo.borrow(&id) else {
                continue;
            };
            let Some(view) = view_element(&*el) else {
                continue;
            };
            if !view.view_core().container_extending {
                continue;
            }
            boundary = boundary.union(&view.bounding_box(repo));
            grew = true;
        }
        if grew {
            self.set_rect(boundary);
        }
    }

    fn draw_object(&self, _repo: &Repository, canvas: &mut dyn Canvas) {
        state_scope(canvas, |c| {
            {
                let state = c.state_mut();
                state.line_color = self.core.line_color.clone();
                state.fill_color = self.core.fill_color.clone();
                state.font_color = self.core.font_color.clone();
                state.font = self.core.font.clone();
            }
            let dash = self.core.line_mode.dash();
            let r = self.rect();
            match self.shape {
                ShapeForm::Rect => {
                    c.fill_rect(r);
                    c.rect(r, dash);
                }
                ShapeForm::RoundRect => {
                    c.fill_round_rect(r, ROUND_RADIUS);
                    c.round_rect(r, ROUND_RADIUS, dash);
                }
                ShapeForm::Ellipse => {
                    c.fill_ellipse(r);
                    c.ellipse(r, dash);
                }
                ShapeForm::Label => {}
            }
            if !self.text.is_empty() {
                let extent = c.text_extent(&self.text);
                let at = point(
                    self.left + (self.width - extent.width) / 2.0,
                    self.top + (self.height - extent.height) / 2.0,
                );
                c.text_out(at, &self.text);
            }
        });
    }

    fn draw_shadow(&self, _repo: &Repository, canvas: &mut dyn Canvas) {
        state_scope(canvas, |c| {
            {
                let state = c.state_mut();
                state.fill_color = SHADOW_COLOR.to_string();
                state.alpha = SHADOW_ALPHA;
            }
            let r = self.rect().translate(vector(SHADOW_OFFSET, SHADOW_OFFSET));
            match self.shape {
                ShapeForm::Rect => c.fill_rect(r),
                ShapeForm::RoundRect => c.fill_round_rect(r, ROUND_RADIUS),
                ShapeForm::Ellipse => c.fill_ellipse(r),
                ShapeForm::Label => {}
            }
        });
    }

    fn bounding_box(&self, _repo: &Repository) -> Rect {
        self.rect()
    }
}

impl Element for NodeView {
    fn type_name(&self) -> &'static str {
        "NodeView"
    }

    fn core(&self) -> &ElementCore {
        &self.core.element
    }

    fn core_mut(&mut self) -> &mut ElementCore {
        &mut self.core.element
    }

    fn attr(&self, name: &str) -> Option<AttrValue> {
        match name {
            "left" => Some(AttrValue::Num(self.left)),
            "top" => Some(AttrValue::Num(self.top)),
            "width" => Some(AttrValue::Num(self.width)),
            "height" => Some(AttrValue::Num(self.height)),
            "minWidth" => Some(AttrValue::Num(self.min_width)),
            "minHeight" => Some(AttrValue::Num(self.min_height)),
            "autoResize" => Some(AttrValue::Bool(self.auto_resize)),
            "shape" => Some(AttrValue::Lit(self.shape.as_literal().to_string())),
            "text" => Some(AttrValue::Str(self.text.clone())),
            "wordWrap" => Some(AttrValue::Bool(self.word_wrap)),
            "sizable" => Some(AttrValue::Lit(self.sizable.as_literal().to_string())),
            "movable" => Some(AttrValue::Lit(self.movable.as_literal().to_string())),
            _ => self.core.attr(name),
        }
    }

    fn set_attr(&mut self, name: &str, value: AttrValue) -> bool {
        match (name, value) {
            ("left", AttrValue::Num(n)) => {
                self.left = n;
                true
            }
            ("top", AttrValue::Num(n)) => {
                self.top = n;
                true
            }
            ("width", AttrValue::Num(n)) => {
                self.width = n;
                true
            }
            ("height", AttrValue::Num(n)) => {
                self.height = n;
                true
            }
            ("minWidth", AttrValue::Num(n)) => {
                self.min_width = n;
                true
            }
            ("minHeight", AttrValue::Num(n)) => {
                self.min_height = n;
                true
            }
            ("autoResize", AttrValue::Bool(b)) => {
                self.auto_resize = b;
                true
            }
            ("shape", AttrValue::Lit(s)) => match ShapeForm::from_literal(&s) {
                Some(shape) => {
                    self.shape = shape;
                    true
                }
                None => false,
            },
            ("text", AttrValue::Str(s)) => {
                self.text = s;
                true
            }
            ("wordWrap", AttrValue::Bool(b)) => {
                self.word_wrap = b;
                true
            }
            ("sizable", AttrValue::Lit(s)) => match Sizable::from_literal(&s) {
                Some(mode) => {
                    self.sizable = mode;
                    true
                }
                None => false,
            },
            ("movable", AttrValue::Lit(s)) => match Movable::from_literal(&s) {
                Some(mode) => {
                    self.movable = mode;
                    true
                }
                None => false,
            },
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
