//! Connector views.
//!
//! An edge connects two views (nodes, or other edges) and owns its routed
//! waypoints. The route style and the end decorations are data; one
//! concrete type covers every connector appearance.

use std::any::Any;

use selkie_core::{AttrValue, Element, ElementCore, Id, Repository};

use crate::canvas::{Canvas, state_scope};
use crate::error::{Error, Result};
use crate::geom::{Point, Rect, Vector, mid, point, rect_from_points, vector};
use crate::node::NodeView;
use crate::points::PointList;
use crate::route;
use crate::style::StyleDefaults;
use crate::view::{ViewCore, ViewElement};

const ARROW_LENGTH: f64 = 10.0;
const ARROW_WIDTH: f64 = 4.0;
const TRIANGLE_LENGTH: f64 = 12.0;
const TRIANGLE_WIDTH: f64 = 6.0;
const DIAMOND_LENGTH: f64 = 8.0;
const DIAMOND_WIDTH: f64 = 5.0;
const CIRCLE_RADIUS: f64 = 4.0;
const CROWFOOT_LENGTH: f64 = 10.0;
const CROWFOOT_WIDTH: f64 = 6.0;
const CURVE_STEPS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineStyle {
    #[default]
    Rectilinear,
    Oblique,
    /// Routed like rectilinear, drawn with rounded corners.
    RoundRect,
    /// Routed like oblique, drawn as a spline through the waypoints.
    Curve,
}

impl LineStyle {
    pub fn as_literal(self) -> &'static str {
        match self {
            LineStyle::Rectilinear => "rectilinear",
            LineStyle::Oblique => "oblique",
            LineStyle::RoundRect => "roundrect",
            LineStyle::Curve => "curve",
        }
    }

    pub fn from_literal(s: &str) -> Option<Self> {
        match s {
            "rectilinear" => Some(LineStyle::Rectilinear),
            "oblique" => Some(LineStyle::Oblique),
            "roundrect" => Some(LineStyle::RoundRect),
            "curve" => Some(LineStyle::Curve),
            _ => None,
        }
    }

    /// True when waypoints are kept axis-aligned.
    pub fn is_orthogonal(self) -> bool {
        matches!(self, LineStyle::Rectilinear | LineStyle::RoundRect)
    }
}

/// Decoration drawn at an edge endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EndStyle {
    #[default]
    Flat,
    StickArrow,
    SolidArrow,
    Triangle,
    FilledTriangle,
    Diamond,
    FilledDiamond,
    ArrowDiamond,
    ArrowFilledDiamond,
    Plus,
    Circle,
    CirclePlus,
    CrowfootOne,
    CrowfootMany,
    CrowfootZeroOne,
    CrowfootZeroMany,
}

impl EndStyle {
    pub fn as_literal(self) -> &'static str {
        match self {
            EndStyle::Flat => "flat",
            EndStyle::StickArrow => "stick-arrow",
            EndStyle::SolidArrow => "solid-arrow",
            EndStyle::Triangle => "triangle",
            EndStyle::FilledTriangle => "filled-triangle",
            EndStyle::Diamond => "diamond",
            EndStyle::FilledDiamond => "filled-diamond",
            EndStyle::ArrowDiamond => "arrow-diamond",
            EndStyle::ArrowFilledDiamond => "arrow-filled-diamond",
            EndStyle::Plus => "plus",
            EndStyle::Circle => "circle",
            EndStyle::CirclePlus => "circle-plus",
            EndStyle::CrowfootOne => "crowfoot-one",
            EndStyle::CrowfootMany => "crowfoot-many",
            EndStyle::CrowfootZeroOne => "crowfoot-zero-one",
            EndStyle::CrowfootZeroMany => "crowfoot-zero-many",
        }
    }

    pub fn from_literal(s: &str) -> Option<Self> {
        match s {
            "flat" => Some(EndStyle::Flat),
            "stick-arrow" => Some(EndStyle::StickArrow),
            "solid-arrow" => Some(EndStyle::SolidArrow),
            "triangle" => Some(EndStyle::Triangle),
            "filled-triangle" => Some(EndStyle::FilledTriangle),
            "diamond" => Some(EndStyle::Diamond),
            "filled-diamond" => Some(EndStyle::FilledDiamond),
            "arrow-diamond" => Some(EndStyle::ArrowDiamond),
            "arrow-filled-diamond" => Some(EndStyle::ArrowFilledDiamond),
            "plus" => Some(EndStyle::Plus),
            "circle" => Some(EndStyle::Circle),
            "circle-plus" => Some(EndStyle::CirclePlus),
            "crowfoot-one" => Some(EndStyle::CrowfootOne),
            "crowfoot-many" => Some(EndStyle::CrowfootMany),
            "crowfoot-zero-one" => Some(EndStyle::CrowfootZeroOne),
            "crowfoot-zero-many" => Some(EndStyle::CrowfootZeroMany),
            _ => None,
        }
    }
}

/// Connector between a tail view and a head view.
///
/// `points[0]` attaches to the tail, the last point to the head. Waypoints
/// persist in the document as `"x:y;x:y"`.
#[derive(Debug, Clone, Default)]
pub struct EdgeView {
    pub core: ViewCore,
    pub head: Option<Id>,
    pub tail: Option<Id>,
    pub line_style: LineStyle,
    pub head_end_style: EndStyle,
    pub tail_end_style: EndStyle,
    pub points: PointList,
}

impl EdgeView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults(defaults: &StyleDefaults) -> Self {
        Self {
            core: ViewCore::with_defaults(defaults),
            head: None,
            tail: None,
            line_style: LineStyle::default(),
            head_end_style: EndStyle::default(),
            tail_end_style: EndStyle::default(),
            points: PointList::new(),
        }
    }

    pub fn is_self_loop(&self) -> bool {
        match (&self.tail, &self.head) {
            (Some(tail), Some(head)) => tail == head,
            _ => false,
        }
    }

    /// Midpoint of the middle segment; the anchor other edges connect to.
    pub fn middle_segment_midpoint(&self) -> Point {
        let pts = self.points.points();
        match pts.len() {
            0 => point(0.0, 0.0),
            1 => pts[0],
            n => {
                let seg = (n - 1) / 2;
                mid(pts[seg], pts[seg + 1])
            }
        }
    }

    /// Index of the path segment `p` lies on, honoring the line style's
    /// hit rules.
    pub fn contained_index(&self, p: Point) -> Option<usize> {
        route::contained_index(&self.points, p, self.line_style.is_orthogonal())
    }
}

/// Geometry an edge endpoint presents to routing: a node's own rect, or a
/// zero-sized box at another edge's middle-segment midpoint.
fn endpoint_box(repo: &Repository, id: &Id) -> Result<Rect> {
    let el = repo.borrow(id)?;
    if let Some(node) = el.downcast_ref::<NodeView>() {
        return Ok(node.rect());
    }
    if let Some(edge) = el.downcast_ref::<EdgeView>() {
        let p = edge.middle_segment_midpoint();
        return Ok(rect_from_points(p, p));
    }
    Err(Error::NotAView { id: id.clone() })
}

impl ViewElement for EdgeView {
    fn view_core(&self) -> &ViewCore {
        &self.core
    }

    fn view_core_mut(&mut self) -> &mut ViewCore {
        &mut self.core
    }

    fn arrange_object(&mut self, repo: &Repository, _canvas: &mut dyn Canvas) -> Result<()> {
        let (tail, head) = match (self.tail.clone(), self.head.clone()) {
            (Some(tail), Some(head)) => (tail, head),
            _ => {
                return Err(Error::DanglingEdge {
                    id: self.core.element.id.clone(),
                });
            }
        };
        let tail_box = endpoint_box(repo, &tail)?;
        let head_box = endpoint_box(repo, &head)?;
        if self.line_style.is_orthogonal() {
            route::recalc_rectilinear(&mut self.points, tail_box, head_box, tail == head);
        } else {
            route::recalc_oblique(&mut self.points, tail_box, head_box);
        }
        Ok(())
    }

    fn draw_object(&self, _repo: &Repository, canvas: &mut dyn Canvas) {
        let pts = self.points.points();
        if pts.len() < 2 {
            return;
        }
        state_scope(canvas, |c| {
            {
                let state = c.state_mut();
                state.line_color = self.core.line_color.clone();
                state.fill_color = self.core.fill_color.clone();
                state.font_color = self.core.font_color.clone();
                state.font = self.core.font.clone();
            }
            let dash = self.core.line_mode.dash();
            match self.line_style {
                LineStyle::Curve => {
                    let sampled = catmull_rom(pts, CURVE_STEPS);
                    c.polyline(&sampled, dash);
                }
                _ => c.polyline(pts, dash),
            }
            draw_end(c, pts[0], pts[1], self.tail_end_style);
            draw_end(c, pts[pts.len() - 1], pts[pts.len() - 2], self.head_end_style);
        });
    }

    fn bounding_box(&self, _repo: &Repository) -> Rect {
        self.points.bounding_rect()
    }

    fn contains_point(&self, _repo: &Repository, p: Point) -> bool {
        self.contained_index(p).is_some()
    }
}

/// Catmull-Rom interpolation through the waypoints, endpoints clamped. The
/// sampled path passes through every waypoint exactly.
fn catmull_rom(pts: &[Point], steps: usize) -> Vec<Point> {
    if pts.len() < 3 {
        return pts.to_vec();
    }
    let mut out = Vec::with_capacity((pts.len() - 1) * steps + 1);
    out.push(pts[0]);
    for at in 0..pts.len() - 1 {
        let p0 = if at == 0 { pts[0] } else { pts[at - 1] };
        let p1 = pts[at];
        let p2 = pts[at + 1];
        let p3 = if at + 2 < pts.len() {
            pts[at + 2]
        } else {
            pts[pts.len() - 1]
        };
        for step in 1..=steps {
            let t = step as f64 / steps as f64;
            out.push(catmull_point(p0, p1, p2, p3, t));
        }
    }
    out
}

fn catmull_point(p0: Point, p1: Point, p2: Point, p3: Point, t: f64) -> Point {
    let t2 = t * t;
    let t3 = t2 * t;
    let x = 0.5
        * ((2.0 * p1.x)
            + (-p0.x + p2.x) * t
            + (2.0 * p0.x - 5.0 * p1.x + 4.0 * p2.x - p3.x) * t2
            + (-p0.x + 3.0 * p1.x - 3.0 * p2.x + p3.x) * t3);
    let y = 0.5
        * ((2.0 * p1.y)
            + (-p0.y + p2.y) * t
            + (2.0 * p0.y - 5.0 * p1.y + 4.0 * p2.y - p3.y) * t2
            + (-p0.y + 3.0 * p1.y - 3.0 * p2.y + p3.y) * t3);
    point(x, y)
}

fn filled_with_line_color(canvas: &mut dyn Canvas, draw: impl FnOnce(&mut dyn Canvas)) {
    state_scope(canvas, |c| {
        let line = c.state().line_color.clone();
        c.state_mut().fill_color = line;
        draw(c);
    });
}

fn arrow_points(tip: Point, u: Vector, n: Vector, length: f64, width: f64) -> [Point; 3] {
    [tip, tip + u * length + n * width, tip + u * length - n * width]
}

fn diamond_points(tip: Point, u: Vector, n: Vector) -> [Point; 4] {
    [
        tip,
        tip + u * DIAMOND_LENGTH + n * DIAMOND_WIDTH,
        tip + u * (2.0 * DIAMOND_LENGTH),
        tip + u * DIAMOND_LENGTH - n * DIAMOND_WIDTH,
    ]
}

fn stick_arrow(canvas: &mut dyn Canvas, tip: Point, u: Vector, n: Vector) {
    let [_, a, b] = arrow_points(tip, u, n, ARROW_LENGTH, ARROW_WIDTH);
    canvas.line(tip, a, None);
    canvas.line(tip, b, None);
}

fn closed_shape(canvas: &mut dyn Canvas, pts: &[Point], filled: bool) {
    if filled {
        filled_with_line_color(canvas, |c| {
            c.fill_polygon(pts);
            c.polygon(pts, None);
        });
    } else {
        canvas.fill_polygon(pts);
        canvas.polygon(pts, None);
    }
}

fn end_circle(canvas: &mut dyn Canvas, center: Point) {
    let r = rect_from_points(
        point(center.x - CIRCLE_RADIUS, center.y - CIRCLE_RADIUS),
        point(center.x + CIRCLE_RADIUS, center.y + CIRCLE_RADIUS),
    );
    canvas.fill_ellipse(r);
    canvas.ellipse(r, None);
}

fn crossbar(canvas: &mut dyn Canvas, at: Point, n: Vector, half: f64) {
    canvas.line(at + n * half, at - n * half, None);
}

/// Draws one end decoration. `tip` is the path endpoint, `toward` its
/// neighboring waypoint; the decoration extends from the tip into the edge.
fn draw_end(canvas: &mut dyn Canvas, tip: Point, toward: Point, style: EndStyle) {
    if style == EndStyle::Flat {
        return;
    }
    let along = toward - tip;
    if along.length() == 0.0 {
        return;
    }
    let u = along.normalize();
    let n = vector(-u.y, u.x);
    match style {
        EndStyle::Flat => {}
        EndStyle::StickArrow => stick_arrow(canvas, tip, u, n),
        EndStyle::SolidArrow => closed_shape(
            canvas,
            &arrow_points(tip, u, n, ARROW_LENGTH, ARROW_WIDTH),
            true,
        ),
        EndStyle::Triangle => closed_shape(
            canvas,
            &arrow_points(tip, u, n, TRIANGLE_LENGTH, TRIANGLE_WIDTH),
            false,
        ),
        EndStyle::FilledTriangle => closed_shape(
            canvas,
            &arrow_points(tip, u, n, TRIANGLE_LENGTH, TRIANGLE_WIDTH),
            true,
        ),
        EndStyle::Diamond => closed_shape(canvas, &diamond_points(tip, u, n), false),
        EndStyle::FilledDiamond => closed_shape(canvas, &diamond_points(tip, u, n), true),
        EndStyle::ArrowDiamond => {
            closed_shape(canvas, &diamond_points(tip, u, n), false);
            stick_arrow(canvas, tip + u * (2.0 * DIAMOND_LENGTH), u, n);
        }
        EndStyle::ArrowFilledDiamond => {
            closed_shape(canvas, &diamond_points(tip, u, n), true);
            stick_arrow(canvas, tip + u * (2.0 * DIAMOND_LENGTH), u, n);
        }
        EndStyle::Plus => crossbar(canvas, tip + u * ARROW_LENGTH / 2.0, n, DIAMOND_WIDTH),
        EndStyle::Circle => end_circle(canvas, tip + u * CIRCLE_RADIUS),
        EndStyle::CirclePlus => {
            let center = tip + u * CIRCLE_RADIUS;
            end_circle(canvas, center);
            crossbar(canvas, center, n, CIRCLE_RADIUS);
            crossbar(canvas, center, u, CIRCLE_RADIUS);
        }
        EndStyle::CrowfootOne => crossbar(canvas, tip + u * CROWFOOT_LENGTH, n, CROWFOOT_WIDTH),
        EndStyle::CrowfootMany => {
            let base = tip + u * CROWFOOT_LENGTH;
            canvas.line(base, tip + n * CROWFOOT_WIDTH, None);
            canvas.line(base, tip - n * CROWFOOT_WIDTH, None);
        }
        EndStyle::CrowfootZeroOne => {
            crossbar(canvas, tip + u * CROWFOOT_LENGTH, n, CROWFOOT_WIDTH);
            end_circle(
                canvas,
                tip + u * (CROWFOOT_LENGTH + 2.0 + CIRCLE_RADIUS),
            );
        }
        EndStyle::CrowfootZeroMany => {
            let base = tip + u * CROWFOOT_LENGTH;
            canvas.line(base, tip + n * CROWFOOT_WIDTH, None);
            canvas.line(base, tip - n * CROWFOOT_WIDTH, None);
            end_circle(
                canvas,
                tip + u * (CROWFOOT_LENGTH + 2.0 + CIRCLE_RADIUS),
            );
        }
    }
}

impl Element for EdgeView {
    fn type_name(&self) -> &'static str {
        "EdgeView"
    }

    fn core(&self) -> &ElementCore {
        &self.core.element
    }

    fn core_mut(&mut self) -> &mut ElementCore {
        &mut self.core.element
    }

    fn attr(&self, name: &str) -> Option<AttrValue> {
        match name {
            "head" => Some(AttrValue::Ref(self.head.clone())),
            "tail" => Some(AttrValue::Ref(self.tail.clone())),
            "lineStyle" => Some(AttrValue::Lit(self.line_style.as_literal().to_string())),
            "headEndStyle" => Some(AttrValue::Lit(
                self.head_end_style.as_literal().to_string(),
            )),
            "tailEndStyle" => Some(AttrValue::Lit(
                self.tail_end_style.as_literal().to_string(),
            )),
            "points" => Some(AttrValue::Custom(self.points.to_text())),
            _ => self.core.attr(name),
        }
    }

    fn set_attr(&mut self, name: &str, value: AttrValue) -> bool {
        match (name, value) {
            ("head", AttrValue::Ref(id)) => {
                self.head = id;
                true
            }
            ("tail", AttrValue::Ref(id)) => {
                self.tail = id;
                true
            }
            ("lineStyle", AttrValue::Lit(s)) => match LineStyle::from_literal(&s) {
                Some(style) => {
                    self.line_style = style;
                    true
                }
                None => false,
            },
            ("headEndStyle", AttrValue::Lit(s)) => match EndStyle::from_literal(&s) {
                Some(style) => {
                    self.head_end_style = style;
                    true
                }
                None => false,
            },
            ("tailEndStyle", AttrValue::Lit(s)) => match EndStyle::from_literal(&s) {
                Some(style) => {
                    self.tail_end_style = style;
                    true
                }
                None => false,
            },
            ("points", AttrValue::Custom(s)) => match PointList::from_text(&s) {
                Some(points) => {
                    self.points = points;
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
