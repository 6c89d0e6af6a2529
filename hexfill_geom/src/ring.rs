// Copyright 2025 the Hexfill Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Closed vertex rings.

use alloc::vec::Vec;

use hexfill_grid::LatLng;
#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::Point;

use crate::planar;

/// Why a ring cannot be used for containment tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RingDefect {
    /// The first and last vertex differ.
    #[error("ring is not closed")]
    NotClosed,
    /// Fewer than three distinct vertices.
    #[error("ring has fewer than 3 distinct vertices")]
    TooFewVertices,
    /// Two edges cross or touch away from their shared vertex.
    #[error("ring intersects itself")]
    SelfIntersecting,
    /// A coordinate is NaN or infinite.
    #[error("ring has a non-finite coordinate")]
    NonFinite,
    /// The ring winds around a pole, so it has no contiguous longitude span.
    #[error("ring encloses a pole")]
    EnclosesPole,
    /// A hole reaches outside the outer ring.
    #[error("hole is not inside the outer ring")]
    NotNested,
    /// A hole crosses the outer ring or another hole.
    #[error("ring crosses another ring of the polygon")]
    CrossesRing,
}

/// An ordered, closed sequence of vertices.
///
/// The first and last vertex coincide. Orientation is preserved as given;
/// containment does not depend on it.
#[derive(Clone, Debug, PartialEq)]
pub struct Ring {
    vertices: Vec<LatLng>,
}

impl Ring {
    /// Build a ring, closing it if the last vertex does not repeat the first.
    pub fn new(vertices: impl IntoIterator<Item = LatLng>) -> Self {
        let mut vertices: Vec<LatLng> = vertices.into_iter().collect();
        if let (Some(&first), Some(&last)) = (vertices.first(), vertices.last()) {
            if first != last || vertices.len() == 1 {
                vertices.push(first);
            }
        }
        Self { vertices }
    }

    /// Build a ring from vertices that must already be closed.
    pub fn from_closed(vertices: Vec<LatLng>) -> Result<Self, RingDefect> {
        match (vertices.first(), vertices.last()) {
            (Some(first), Some(last)) if vertices.len() > 1 && first == last => {
                Ok(Self { vertices })
            }
            _ => Err(RingDefect::NotClosed),
        }
    }

    /// Vertices, including the closing repeat of the first.
    #[inline]
    pub fn vertices(&self) -> &[LatLng] {
        &self.vertices
    }

    /// Number of edges.
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.vertices.len().saturating_sub(1)
    }

    /// Iterate over edges as vertex pairs.
    pub fn edges(&self) -> impl Iterator<Item = (LatLng, LatLng)> + '_ {
        self.vertices.windows(2).map(|w| (w[0], w[1]))
    }

    /// Planar signed area in square degrees; positive when counter-clockwise
    /// (longitude as `x`).
    pub fn signed_area(&self) -> f64 {
        planar::doubled_area(&planar::unwrap(&self.vertices)) * 0.5
    }

    /// Whether the ring runs counter-clockwise.
    pub fn is_ccw(&self) -> bool {
        self.signed_area() > 0.0
    }

    /// The same ring traversed in the opposite direction.
    pub fn reversed(&self) -> Self {
        let mut vertices = self.vertices.clone();
        vertices.reverse();
        Self { vertices }
    }

    /// Check the ring for every [`RingDefect`].
    pub fn validate(&self) -> Result<(), RingDefect> {
        if self.vertices.iter().any(|v| !v.is_finite()) {
            return Err(RingDefect::NonFinite);
        }
        if self.vertices.len() < 2 || self.vertices.first() != self.vertices.last() {
            return Err(RingDefect::NotClosed);
        }
        let points = planar::unwrap(&self.vertices);
        let distinct = distinct_closed(&points);
        if distinct.len() < 4 {
            return Err(RingDefect::TooFewVertices);
        }
        let (first, last) = (distinct[0], distinct[distinct.len() - 1]);
        if (last.x - first.x).abs() > 180.0 {
            return Err(RingDefect::EnclosesPole);
        }
        if self_intersects(&distinct) {
            return Err(RingDefect::SelfIntersecting);
        }
        Ok(())
    }
}

/// Drop consecutive duplicate points, keeping the ring closed.
fn distinct_closed(points: &[Point]) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::with_capacity(points.len());
    for &p in points {
        if out.last() != Some(&p) {
            out.push(p);
        }
    }
    // A closed ring whose tail repeats the head is handled by the dedup above;
    // anything left over with a single point is degenerate.
    if out.len() == 1 {
        out.push(out[0]);
    }
    out
}

/// Sweep edges by ascending `x` and test the ones whose boxes overlap.
fn self_intersects(ring: &[Point]) -> bool {
    let n = ring.len() - 1;
    if n < 3 {
        return false;
    }
    for i in 0..n {
        let prev = ring[(i + n - 1) % n];
        if planar::is_spike(prev, ring[i], ring[i + 1]) {
            return true;
        }
    }

    let mut order: Vec<usize> = (0..n).collect();
    let min_x = |i: usize| ring[i].x.min(ring[i + 1].x);
    order.sort_by(|&a, &b| min_x(a).total_cmp(&min_x(b)));

    for (k, &i) in order.iter().enumerate() {
        let (a0, a1) = (ring[i], ring[i + 1]);
        let max_x = a0.x.max(a1.x);
        let (lo_y, hi_y) = (a0.y.min(a1.y), a0.y.max(a1.y));
        for &j in &order[k + 1..] {
            if min_x(j) > max_x {
                break;
            }
            let adjacent = i.abs_diff(j) == 1 || i.abs_diff(j) == n - 1;
            if adjacent {
                continue;
            }
            let (b0, b1) = (ring[j], ring[j + 1]);
            if b0.y.max(b1.y) < lo_y || b0.y.min(b1.y) > hi_y {
                continue;
            }
            if planar::segments_intersect(a0, a1, b0, b1) {
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn ring(coords: &[(f64, f64)]) -> Ring {
        Ring::new(coords.iter().map(|&(lat, lng)| LatLng::new(lat, lng)))
    }

    #[test]
    fn open_rings_are_closed() {
        let r = ring(&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0)]);
        assert_eq!(r.vertices().len(), 4);
        assert_eq!(r.edge_count(), 3);
        assert_eq!(r.vertices().first(), r.vertices().last());
        assert_eq!(r.validate(), Ok(()));
    }

    #[test]
    fn strict_constructor_requires_closure() {
        let open = vec![LatLng::new(0.0, 0.0), LatLng::new(0.0, 1.0), LatLng::new(1.0, 1.0)];
        assert_eq!(Ring::from_closed(open).unwrap_err(), RingDefect::NotClosed);
        assert_eq!(Ring::from_closed(Vec::new()).unwrap_err(), RingDefect::NotClosed);
    }

    #[test]
    fn orientation() {
        // (lat, lng): counter-clockwise with longitude as x.
        let ccw = ring(&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)]);
        assert!(ccw.is_ccw());
        assert!((ccw.signed_area() - 1.0).abs() < 1e-12);
        assert!(!ccw.reversed().is_ccw());
    }

    #[test]
    fn degenerate_rings_are_rejected() {
        let line = ring(&[(0.0, 0.0), (0.0, 1.0), (0.0, 0.0)]);
        assert_eq!(line.validate(), Err(RingDefect::TooFewVertices));

        let nan = ring(&[(0.0, 0.0), (f64::NAN, 1.0), (1.0, 1.0)]);
        assert_eq!(nan.validate(), Err(RingDefect::NonFinite));
    }

    #[test]
    fn bowtie_is_self_intersecting() {
        let bowtie = ring(&[(0.0, 0.0), (1.0, 1.0), (1.0, 0.0), (0.0, 1.0)]);
        assert_eq!(bowtie.validate(), Err(RingDefect::SelfIntersecting));
    }

    #[test]
    fn spike_is_self_intersecting() {
        let spike = ring(&[(0.0, 0.0), (0.0, 2.0), (0.0, 1.0), (1.0, 1.0)]);
        assert_eq!(spike.validate(), Err(RingDefect::SelfIntersecting));
    }

    #[test]
    fn antimeridian_ring_is_valid() {
        let r = ring(&[(0.0, 179.9), (0.0, -179.9), (1.0, -179.9), (1.0, 179.9)]);
        assert_eq!(r.validate(), Ok(()));
        assert!(r.signed_area().abs() < 1.0);
    }

    #[test]
    fn polar_ring_is_rejected() {
        let r = ring(&[(80.0, 0.0), (80.0, 90.0), (80.0, 180.0), (80.0, -90.0)]);
        assert_eq!(r.validate(), Err(RingDefect::EnclosesPole));
    }
}
