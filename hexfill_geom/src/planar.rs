// Copyright 2025 the Hexfill Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Planar helpers over unwrapped longitude/latitude.
//!
//! Rings are mapped to the plane with longitude as `x` and latitude as `y`.
//! Longitudes are unwrapped so that consecutive vertices never jump by more
//! than 180°, which keeps antimeridian-crossing rings contiguous (their `x`
//! may then leave `[-180, 180]`).

use alloc::vec::Vec;

use hexfill_grid::{LatLng, wrap_longitude};
#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Point, Rect, Vec2};

use crate::Containment;

/// Distance, in degrees, under which a point counts as lying on an edge.
pub const BOUNDARY_EPSILON: f64 = 1e-10;

/// Map a vertex sequence to the plane, unwrapping longitudes.
pub(crate) fn unwrap(vertices: &[LatLng]) -> Vec<Point> {
    let mut out = Vec::with_capacity(vertices.len());
    let Some(first) = vertices.first() else {
        return out;
    };
    let mut x = wrap_longitude(first.lng);
    out.push(Point::new(x, first.lat));
    for pair in vertices.windows(2) {
        x += wrap_longitude(pair[1].lng - pair[0].lng);
        out.push(Point::new(x, pair[1].lat));
    }
    out
}

/// Bounding box of a point sequence.
pub(crate) fn bounds(points: &[Point]) -> Rect {
    let mut iter = points.iter();
    let Some(&first) = iter.next() else {
        return Rect::ZERO;
    };
    iter.fold(Rect::from_points(first, first), |r, &p| r.union_pt(p))
}

/// Number of whole turns of 360° that move `x` closest to `center`.
#[inline]
pub(crate) fn turns_toward(x: f64, center: f64) -> f64 {
    ((center - x) / 360.0).round()
}

/// Shift a planar ring by whole turns so its box is centered nearest `center`.
pub(crate) fn align(points: &mut [Point], center: f64) {
    let shift = 360.0 * turns_toward(bounds(points).center().x, center);
    if shift != 0.0 {
        for p in points.iter_mut() {
            p.x += shift;
        }
    }
}

/// Shift a single point by whole turns toward `center`.
#[inline]
pub(crate) fn align_point(p: Point, center: f64) -> Point {
    Point::new(p.x + 360.0 * turns_toward(p.x, center), p.y)
}

/// Twice the signed area of a closed ring; positive when counter-clockwise.
pub(crate) fn doubled_area(points: &[Point]) -> f64 {
    points
        .windows(2)
        .map(|w| w[0].to_vec2().cross(w[1].to_vec2()))
        .sum()
}

/// Area-weighted centroid of a closed ring, falling back to the vertex mean
/// for degenerate rings.
pub(crate) fn centroid(points: &[Point]) -> Point {
    let a2 = doubled_area(points);
    if a2.abs() > f64::EPSILON {
        let mut c = Vec2::ZERO;
        for w in points.windows(2) {
            let cross = w[0].to_vec2().cross(w[1].to_vec2());
            c += (w[0].to_vec2() + w[1].to_vec2()) * cross;
        }
        return (c / (3.0 * a2)).to_point();
    }
    // Skip the closing vertex so it is not counted twice.
    let open = match points.len() {
        0 => return Point::ZERO,
        1 => points,
        n => &points[..n - 1],
    };
    let sum = open.iter().fold(Vec2::ZERO, |acc, p| acc + p.to_vec2());
    (sum / open.len() as f64).to_point()
}

/// Distance from `pt` to the segment `p0`-`p1`.
pub(crate) fn distance_to_segment(pt: Point, p0: Point, p1: Point) -> f64 {
    let v = p1 - p0;
    let w = pt - p0;
    let len2 = v.hypot2();
    let t = if len2 > 0.0 { w.dot(v) / len2 } else { 0.0 };
    let t = t.clamp(0.0, 1.0);
    let proj = p0 + v * t;
    (pt - proj).hypot()
}

/// Even-odd classification of `pt` against a closed planar ring.
pub(crate) fn classify(ring: &[Point], bounds: &Rect, pt: Point) -> Containment {
    if pt.x < bounds.x0 - BOUNDARY_EPSILON
        || pt.x > bounds.x1 + BOUNDARY_EPSILON
        || pt.y < bounds.y0 - BOUNDARY_EPSILON
        || pt.y > bounds.y1 + BOUNDARY_EPSILON
    {
        return Containment::Outside;
    }
    let mut inside = false;
    for w in ring.windows(2) {
        let (a, b) = (w[0], w[1]);
        if distance_to_segment(pt, a, b) <= BOUNDARY_EPSILON {
            return Containment::Boundary;
        }
        if (a.y > pt.y) != (b.y > pt.y) {
            let x = a.x + (pt.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if pt.x < x {
                inside = !inside;
            }
        }
    }
    if inside {
        Containment::Inside
    } else {
        Containment::Outside
    }
}

#[inline]
fn orient(a: Point, b: Point, c: Point) -> f64 {
    (b - a).cross(c - a)
}

#[inline]
fn within_box(a: Point, b: Point, p: Point) -> bool {
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

/// Whether the closed segments `a0`-`a1` and `b0`-`b1` share any point.
pub(crate) fn segments_intersect(a0: Point, a1: Point, b0: Point, b1: Point) -> bool {
    let d1 = orient(b0, b1, a0);
    let d2 = orient(b0, b1, a1);
    let d3 = orient(a0, a1, b0);
    let d4 = orient(a0, a1, b1);
    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }
    (d1 == 0.0 && within_box(b0, b1, a0))
        || (d2 == 0.0 && within_box(b0, b1, a1))
        || (d3 == 0.0 && within_box(a0, a1, b0))
        || (d4 == 0.0 && within_box(a0, a1, b1))
}

/// Whether the segments `a0`-`a1` and `b0`-`b1` cross at a single interior
/// point of both. Touching and collinear overlap do not count.
pub(crate) fn segments_cross(a0: Point, a1: Point, b0: Point, b1: Point) -> bool {
    orient(b0, b1, a0) * orient(b0, b1, a1) < 0.0 && orient(a0, a1, b0) * orient(a0, a1, b1) < 0.0
}

/// Whether any edge of the closed ring `a` crosses an edge of `b`.
pub(crate) fn rings_cross(a: &[Point], b: &[Point]) -> bool {
    a.windows(2)
        .any(|e| b.windows(2).any(|f| segments_cross(e[0], e[1], f[0], f[1])))
}

/// Whether two edges that share the vertex `joint` fold back over each other.
pub(crate) fn is_spike(prev: Point, joint: Point, next: Point) -> bool {
    let a = prev - joint;
    let b = next - joint;
    a.cross(b) == 0.0 && a.dot(b) > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn square() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
            Point::new(0.0, 0.0),
        ]
    }

    #[test]
    fn unwrap_keeps_antimeridian_rings_contiguous() {
        let ring = [
            LatLng::new(0.0, 179.0),
            LatLng::new(0.0, -179.0),
            LatLng::new(1.0, -179.0),
            LatLng::new(1.0, 179.0),
            LatLng::new(0.0, 179.0),
        ];
        let pts = unwrap(&ring);
        assert_eq!(pts[1].x, 181.0);
        assert_eq!(pts[4].x, 179.0);
        let b = bounds(&pts);
        assert_eq!((b.x0, b.x1), (179.0, 181.0));
    }

    #[test]
    fn align_moves_by_whole_turns() {
        let mut pts = vec![Point::new(-181.0, 0.0), Point::new(-179.0, 1.0)];
        align(&mut pts, 180.0);
        assert_eq!(pts[0].x, 179.0);
        assert_eq!(align_point(Point::new(-179.5, 0.0), 180.0).x, 180.5);
        assert_eq!(align_point(Point::new(10.0, 0.0), 0.0).x, 10.0);
    }

    #[test]
    fn area_and_centroid() {
        let sq = square();
        assert_eq!(doubled_area(&sq), 200.0);
        let mut cw = sq.clone();
        cw.reverse();
        assert_eq!(doubled_area(&cw), -200.0);
        assert_eq!(centroid(&sq), Point::new(5.0, 5.0));
    }

    #[test]
    fn classify_inside_outside_boundary() {
        let sq = square();
        let b = bounds(&sq);
        assert_eq!(classify(&sq, &b, Point::new(5.0, 5.0)), Containment::Inside);
        assert_eq!(classify(&sq, &b, Point::new(15.0, 5.0)), Containment::Outside);
        assert_eq!(classify(&sq, &b, Point::new(10.0, 5.0)), Containment::Boundary);
        assert_eq!(classify(&sq, &b, Point::new(0.0, 0.0)), Containment::Boundary);
    }

    #[test]
    fn segment_intersections() {
        let o = Point::ORIGIN;
        assert!(segments_intersect(o, Point::new(2.0, 2.0), Point::new(0.0, 2.0), Point::new(2.0, 0.0)));
        assert!(!segments_intersect(o, Point::new(1.0, 0.0), Point::new(0.0, 1.0), Point::new(1.0, 1.0)));
        // Touching at an endpoint counts.
        assert!(segments_intersect(o, Point::new(1.0, 0.0), Point::new(1.0, 0.0), Point::new(1.0, 1.0)));
        // Collinear but disjoint.
        assert!(!segments_intersect(o, Point::new(1.0, 0.0), Point::new(2.0, 0.0), Point::new(3.0, 0.0)));
    }

    #[test]
    fn crossings_exclude_touching() {
        let o = Point::ORIGIN;
        assert!(segments_cross(o, Point::new(2.0, 2.0), Point::new(0.0, 2.0), Point::new(2.0, 0.0)));
        // An endpoint on the other segment is a touch, not a crossing.
        assert!(!segments_cross(o, Point::new(2.0, 0.0), Point::new(1.0, 0.0), Point::new(1.0, 1.0)));
        let mut shifted = square();
        for p in &mut shifted {
            p.x += 5.0;
            p.y += 5.0;
        }
        assert!(rings_cross(&square(), &shifted));
        assert!(!rings_cross(&square(), &square()));
    }

    #[test]
    fn spikes_are_detected() {
        assert!(is_spike(Point::new(0.0, 0.0), Point::new(2.0, 0.0), Point::new(1.0, 0.0)));
        assert!(!is_spike(Point::new(0.0, 0.0), Point::new(2.0, 0.0), Point::new(3.0, 0.0)));
        assert!(!is_spike(Point::new(0.0, 0.0), Point::new(2.0, 0.0), Point::new(2.0, 1.0)));
    }
}
