#![forbid(unsafe_code)]

pub type Unit = euclid::UnknownUnit;

pub type Point = euclid::Point2D<f64, Unit>;
pub type Vector = euclid::Vector2D<f64, Unit>;
pub type Size = euclid::Size2D<f64, Unit>;
pub type Rect = euclid::Rect<f64, Unit>;

pub fn point(x: f64, y: f64) -> Point {
    euclid::point2(x, y)
}

pub fn vector(x: f64, y: f64) -> Vector {
    euclid::vec2(x, y)
}

pub fn size(w: f64, h: f64) -> Size {
    euclid::size2(w, h)
}

pub fn rect(left: f64, top: f64, width: f64, height: f64) -> Rect {
    euclid::rect(left, top, width, height)
}

/// Rect spanned by two arbitrary corners, normalized to non-negative size.
pub fn rect_from_points(a: Point, b: Point) -> Rect {
    let left = a.x.min(b.x);
    let top = a.y.min(b.y);
    rect(left, top, (a.x - b.x).abs(), (a.y - b.y).abs())
}

/// Containment that excludes the rect boundary on all four sides.
pub fn strictly_inside(r: &Rect, p: Point) -> bool {
    p.x > r.min_x() && p.x < r.max_x() && p.y > r.min_y() && p.y < r.max_y()
}

pub fn mid(a: Point, b: Point) -> Point {
    a.lerp(b, 0.5)
}
