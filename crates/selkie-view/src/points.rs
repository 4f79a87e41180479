//! Routed path storage.
//!
//! Edge geometry is an ordered list of waypoints. The list carries the small
//! vocabulary the routing pass needs: rectilinearity checks, bend insertion,
//! collinear reduction, and integer quantization. The textual form mirrors
//! the document format: `"x:y;x:y"` with whole-number coordinates.

use crate::geom::{Point, Rect, point, rect, rect_from_points};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PointList {
    points: Vec<Point>,
}

impl PointList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_points(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, at: usize) -> Option<Point> {
        self.points.get(at).copied()
    }

    pub fn set(&mut self, at: usize, p: Point) {
        if let Some(slot) = self.points.get_mut(at) {
            *slot = p;
        }
    }

    pub fn first(&self) -> Option<Point> {
        self.points.first().copied()
    }

    pub fn last(&self) -> Option<Point> {
        self.points.last().copied()
    }

    pub fn push(&mut self, p: Point) {
        self.points.push(p);
    }

    pub fn insert(&mut self, at: usize, p: Point) {
        self.points.insert(at, p);
    }

    pub fn remove(&mut self, at: usize) -> Option<Point> {
        if at < self.points.len() {
            Some(self.points.remove(at))
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        for p in &mut self.points {
            p.x += dx;
            p.y += dy;
        }
    }

    /// True when every segment is horizontal or vertical. Paths with fewer
    /// than two points count as rectilinear.
    pub fn is_rectilinear(&self) -> bool {
        self.points
            .windows(2)
            .all(|seg| seg[0].x == seg[1].x || seg[0].y == seg[1].y)
    }

    /// Splits every diagonal segment into a vertical-then-horizontal bend.
    pub fn convert_to_rectilinear(&mut self) {
        let mut at = 0;
        while at + 1 < self.points.len() {
            let a = self.points[at];
            let b = self.points[at + 1];
            if a.x != b.x && a.y != b.y {
                self.points.insert(at + 1, point(a.x, b.y));
                at += 1;
            }
            at += 1;
        }
    }

    /// Drops interior points that are collinear with both neighbors, and
    /// duplicates of their predecessor.
    pub fn reduce(&mut self) {
        let mut at = 1;
        while at + 1 < self.points.len() {
            let a = self.points[at - 1];
            let b = self.points[at];
            let c = self.points[at + 1];
            let cross = (b.x - a.x) * (c.y - b.y) - (b.y - a.y) * (c.x - b.x);
            if b == a || cross.abs() < f64::EPSILON {
                self.points.remove(at);
            } else {
                at += 1;
            }
        }
    }

    /// Orthogonal-path reduction: removes zero-length segments and merges
    /// consecutive segments running along the same axis.
    pub fn reduce_ortho(&mut self) {
        let mut at = 1;
        while at + 1 < self.points.len() {
            let a = self.points[at - 1];
            let b = self.points[at];
            let c = self.points[at + 1];
            let same_column = a.x == b.x && b.x == c.x;
            let same_row = a.y == b.y && b.y == c.y;
            if b == a || b == c || same_column || same_row {
                self.points.remove(at);
            } else {
                at += 1;
            }
        }
    }

    /// Rounds every coordinate to the nearest integer.
    pub fn quantize(&mut self) {
        for p in &mut self.points {
            *p = p.round();
        }
    }

    /// Smallest rect covering every waypoint; a zero rect when empty.
    pub fn bounding_rect(&self) -> Rect {
        let Some(&first) = self.points.first() else {
            return rect(0.0, 0.0, 0.0, 0.0);
        };
        let mut min = first;
        let mut max = first;
        for &p in &self.points[1..] {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        rect_from_points(min, max)
    }

    /// Document form, e.g. `"10:20;30:40"`. Coordinates are rounded.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for (at, p) in self.points.iter().enumerate() {
            if at > 0 {
                out.push(';');
            }
            out.push_str(&format!("{}:{}", p.x.round() as i64, p.y.round() as i64));
        }
        out
    }

    /// Parses the document form. Malformed pairs reject the whole text.
    pub fn from_text(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Some(Self::new());
        }
        let mut points = Vec::new();
        for pair in text.split(';') {
            let (x, y) = pair.split_once(':')?;
            let x: f64 = x.trim().parse().ok()?;
            let y: f64 = y.trim().parse().ok()?;
            points.push(point(x, y));
        }
        Some(Self { points })
    }
}

impl std::ops::Index<usize> for PointList {
    type Output = Point;

    fn index(&self, at: usize) -> &Point {
        &self.points[at]
    }
}
