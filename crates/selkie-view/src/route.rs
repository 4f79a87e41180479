//! Connector routing.
//!
//! Pure geometry: given the endpoint boxes of an edge and its current
//! waypoints, these functions recompute a clean path. Oblique paths run
//! point-to-point and meet each box at the true boundary junction;
//! rectilinear paths stay axis-aligned end to end. Both finish with integer
//! quantization so routed geometry is stable across save/load.

use crate::geom::{Point, Rect, point, strictly_inside};
use crate::points::PointList;

/// Margin around an endpoint box inside which oblique waypoints are
/// considered superfluous.
const EDGE_CLEARANCE: f64 = 10.0;
/// How far along the box edge a self-loop departs from its corner.
const SELF_LOOP_INSET: f64 = 15.0;
/// How far outside the box a self-loop detours.
const SELF_LOOP_EXTENT: f64 = 30.0;
/// Perpendicular slack when hit-testing orthogonal segments.
const SEGMENT_TOLERANCE: f64 = 3.0;

const ON_SEGMENT_EPSILON: f64 = 1e-6;

/// Marker returned by [`ortho_junction`] when no axis-aligned junction
/// exists for the given outside point.
pub fn ortho_sentinel() -> Point {
    point(-100.0, -100.0)
}

pub fn is_ortho_sentinel(p: Point) -> bool {
    p.x == -100.0 && p.y == -100.0
}

/// Point where the ray from the center of `r` toward `p` crosses the
/// boundary of `r`. Degenerates to the center for `p` at the center and for
/// zero-sized boxes.
pub fn junction(r: Rect, p: Point) -> Point {
    let c = r.center();
    let dx = p.x - c.x;
    let dy = p.y - c.y;
    if dx == 0.0 && dy == 0.0 {
        return c;
    }
    let half_w = r.size.width / 2.0;
    let half_h = r.size.height / 2.0;
    if dy.abs() * half_w <= dx.abs() * half_h {
        let t = half_w / dx.abs();
        point(c.x + dx.signum() * half_w, c.y + dy * t)
    } else {
        let t = half_h / dy.abs();
        point(c.x + dx * t, c.y + dy.signum() * half_h)
    }
}

/// Axis-aligned projection of `p` onto the boundary of `r`: points
/// horizontally within the box project onto the top or bottom edge, points
/// vertically within onto the left or right edge. Diagonal and interior
/// positions have no such projection and yield the sentinel.
pub fn ortho_junction(r: Rect, p: Point) -> Point {
    let within_x = p.x >= r.min_x() && p.x <= r.max_x();
    let within_y = p.y >= r.min_y() && p.y <= r.max_y();
    if within_x && !within_y {
        if p.y < r.min_y() {
            point(p.x, r.min_y())
        } else {
            point(p.x, r.max_y())
        }
    } else if within_y && !within_x {
        if p.x < r.min_x() {
            point(r.min_x(), p.y)
        } else {
            point(r.max_x(), p.y)
        }
    } else {
        ortho_sentinel()
    }
}

/// Five-point rectangular detour over the top-right corner of `r`, with the
/// interior points kept outside the box.
pub fn self_loop_path(r: Rect) -> PointList {
    let mut out = PointList::new();
    out.push(point(r.max_x() - SELF_LOOP_INSET, r.min_y()));
    out.push(point(r.max_x() - SELF_LOOP_INSET, r.min_y() - SELF_LOOP_EXTENT));
    out.push(point(r.max_x() + SELF_LOOP_EXTENT, r.min_y() - SELF_LOOP_EXTENT));
    out.push(point(r.max_x() + SELF_LOOP_EXTENT, r.min_y() + SELF_LOOP_INSET));
    out.push(point(r.max_x(), r.min_y() + SELF_LOOP_INSET));
    out
}

/// Recomputes an oblique path between `tail_box` and `head_box`: drops
/// waypoints inside either clearance-expanded box, then replaces the first
/// and last points with true boundary junctions toward their neighbor (or
/// the opposite center when only the two endpoints remain).
pub fn recalc_oblique(points: &mut PointList, tail_box: Rect, head_box: Rect) {
    if points.len() < 2 {
        points.clear();
        points.push(tail_box.center());
        points.push(head_box.center());
    }

    let tail_zone = tail_box.inflate(EDGE_CLEARANCE, EDGE_CLEARANCE);
    let head_zone = head_box.inflate(EDGE_CLEARANCE, EDGE_CLEARANCE);
    let mut at = 1;
    while points.len() > 2 && at + 1 < points.len() {
        let p = points[at];
        if strictly_inside(&tail_zone, p) || strictly_inside(&head_zone, p) {
            points.remove(at);
        } else {
            at += 1;
        }
    }

    let last = points.len() - 1;
    let tail_target = if points.len() == 2 {
        head_box.center()
    } else {
        points[1]
    };
    let head_target = if points.len() == 2 {
        tail_box.center()
    } else {
        points[last - 1]
    };
    points.set(0, junction(tail_box, tail_target));
    points.set(last, junction(head_box, head_target));
    points.quantize();
}

/// Recomputes a rectilinear path between `tail_box` and `head_box`.
///
/// Self-loops with no user waypoints get the standard corner detour. For
/// everything else: two-point paths first gain or move their boundary
/// points via [`ortho_junction`] (gaining a bend when no axis-aligned
/// junction exists), the segments adjacent to each endpoint are snapped
/// onto the endpoint center's axis, boundary points are recomputed,
/// collinear runs and waypoints inside either box are reduced away, and a
/// final two-pass correction restores the previous boundary point wherever
/// the junction degenerates to the sentinel.
pub fn recalc_rectilinear(points: &mut PointList, tail_box: Rect, head_box: Rect, self_loop: bool) {
    if self_loop && points.len() <= 3 {
        *points = self_loop_path(tail_box);
        points.quantize();
        return;
    }
    if points.len() < 2 {
        points.clear();
        points.push(tail_box.center());
        points.push(head_box.center());
    }

    if points.len() == 2 {
        let j = ortho_junction(tail_box, points[1]);
        if is_ortho_sentinel(j) {
            points.insert(1, point(points[0].x, points[1].y));
        } else {
            points.set(0, j);
        }
        let last = points.len() - 1;
        let j = ortho_junction(head_box, points[last - 1]);
        if is_ortho_sentinel(j) {
            points.insert(last, point(points[last].x, points[last - 1].y));
        } else {
            points.set(last, j);
        }
    }

    if points.len() > 2 {
        let tc = tail_box.center();
        let first = points[0];
        let second = points[1];
        if second.x != first.x && second.y != first.y {
            if (second.x - tc.x).abs() <= (second.y - tc.y).abs() {
                points.set(1, point(tc.x, second.y));
            } else {
                points.set(1, point(second.x, tc.y));
            }
        }
        let hc = head_box.center();
        let last = points.len() - 1;
        let end = points[last];
        let before = points[last - 1];
        if before.x != end.x && before.y != end.y {
            if (before.x - hc.x).abs() <= (before.y - hc.y).abs() {
                points.set(last - 1, point(hc.x, before.y));
            } else {
                points.set(last - 1, point(before.x, hc.y));
            }
        }
    }

    correct_boundary_points(points, tail_box, head_box);

    points.reduce_ortho();
    let mut at = 1;
    while points.len() > 2 && at + 1 < points.len() {
        let p = points[at];
        if strictly_inside(&tail_box, p) || strictly_inside(&head_box, p) {
            points.remove(at);
        } else {
            at += 1;
        }
    }

    correct_boundary_points(points, tail_box, head_box);
    correct_boundary_points(points, tail_box, head_box);
    points.quantize();
}

/// Moves each endpoint to its orthogonal junction toward the neighboring
/// waypoint, keeping the previous point when the junction degenerates.
fn correct_boundary_points(points: &mut PointList, tail_box: Rect, head_box: Rect) {
    if points.len() < 2 {
        return;
    }
    let previous = points[0];
    let j = ortho_junction(tail_box, points[1]);
    points.set(0, if is_ortho_sentinel(j) { previous } else { j });

    let last = points.len() - 1;
    let previous = points[last];
    let j = ortho_junction(head_box, points[last - 1]);
    points.set(last, if is_ortho_sentinel(j) { previous } else { j });
}

fn segment_distance(a: Point, b: Point, p: Point) -> f64 {
    let ab = b - a;
    let len2 = ab.square_length();
    if len2 == 0.0 {
        return (p - a).length();
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    (p - (a + ab * t)).length()
}

fn ortho_hit(a: Point, b: Point, p: Point) -> Option<f64> {
    if a.y == b.y {
        let (lo, hi) = if a.x <= b.x { (a.x, b.x) } else { (b.x, a.x) };
        let d = (p.y - a.y).abs();
        if d <= SEGMENT_TOLERANCE
            && p.x >= lo - SEGMENT_TOLERANCE
            && p.x <= hi + SEGMENT_TOLERANCE
        {
            return Some(d);
        }
        None
    } else if a.x == b.x {
        let (lo, hi) = if a.y <= b.y { (a.y, b.y) } else { (b.y, a.y) };
        let d = (p.x - a.x).abs();
        if d <= SEGMENT_TOLERANCE
            && p.y >= lo - SEGMENT_TOLERANCE
            && p.y <= hi + SEGMENT_TOLERANCE
        {
            return Some(d);
        }
        None
    } else {
        exact_hit(a, b, p)
    }
}

fn exact_hit(a: Point, b: Point, p: Point) -> Option<f64> {
    let d = segment_distance(a, b, p);
    if d <= ON_SEGMENT_EPSILON { Some(d) } else { None }
}

/// Index of the segment `p` lies on, when any. Orthogonal styles accept a
/// perpendicular tolerance band around each axis-aligned segment; oblique
/// styles require the point to sit on the segment itself. The nearest
/// qualifying segment wins.
pub fn contained_index(points: &PointList, p: Point, orthogonal: bool) -> Option<usize> {
    let pts = points.points();
    if pts.len() < 2 {
        return None;
    }
    let mut best: Option<(f64, usize)> = None;
    for (at, seg) in pts.windows(2).enumerate() {
        let hit = if orthogonal {
            ortho_hit(seg[0], seg[1], p)
        } else {
            exact_hit(seg[0], seg[1], p)
        };
        if let Some(d) = hit {
            let closer = match best {
                Some((min, _)) => d < min,
                None => true,
            };
            if closer {
                best = Some((d, at));
            }
        }
    }
    best.map(|(_, at)| at)
}
