// Copyright 2025 the Hexfill Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Polygons with holes, and their containment tests.

use alloc::vec;
use alloc::vec::Vec;

use hexfill_grid::{LatLng, wrap_longitude};
#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Point, Rect};

use crate::planar::{self, BOUNDARY_EPSILON};
use crate::ring::{Ring, RingDefect};

/// Result of a point containment test.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Containment {
    /// Strictly inside the polygon (and outside every hole).
    Inside,
    /// Strictly outside the polygon, or strictly inside a hole.
    Outside,
    /// Within [`BOUNDARY_EPSILON`] of an outer or hole edge.
    Boundary,
}

/// A ring that failed validation, with its position in the polygon.
///
/// Ring `0` is the outer ring; holes follow in order starting at `1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("ring {ring} is malformed: {defect}")]
pub struct MalformedRing {
    /// Index of the offending ring.
    pub ring: usize,
    /// What is wrong with it.
    pub defect: RingDefect,
}

/// One outer ring plus zero or more holes.
///
/// On construction every ring is mapped to the plane with unwrapped
/// longitudes, holes are shifted by whole turns into the outer ring's span,
/// and the outer ring's bounding box is cached. Query points are shifted the
/// same way, so rings crossing the antimeridian test like any other.
#[derive(Clone, Debug)]
pub struct Polygon {
    outer: Ring,
    holes: Vec<Ring>,
    // Index 0 is the outer ring.
    planar: Vec<Vec<Point>>,
    ring_bounds: Vec<Rect>,
}

impl Polygon {
    /// Build a polygon, validating every ring.
    ///
    /// Besides [`Ring::validate`], every hole must lie within the outer ring
    /// ([`RingDefect::NotNested`]) and must not cross the outer ring or
    /// another hole ([`RingDefect::CrossesRing`]). Rings may touch.
    pub fn new(outer: Ring, holes: Vec<Ring>) -> Result<Self, MalformedRing> {
        outer
            .validate()
            .map_err(|defect| MalformedRing { ring: 0, defect })?;
        for (i, hole) in holes.iter().enumerate() {
            hole.validate()
                .map_err(|defect| MalformedRing { ring: i + 1, defect })?;
        }
        let polygon = Self::from_rings_unchecked(outer, holes);
        polygon.check_nesting()?;
        Ok(polygon)
    }

    fn check_nesting(&self) -> Result<(), MalformedRing> {
        let (outer, outer_bounds) = (&self.planar[0], &self.ring_bounds[0]);
        for (ring, hole) in self.planar.iter().enumerate().skip(1) {
            if hole
                .iter()
                .any(|&p| planar::classify(outer, outer_bounds, p) == Containment::Outside)
            {
                return Err(MalformedRing {
                    ring,
                    defect: RingDefect::NotNested,
                });
            }
            let crosses = (0..ring).any(|other| {
                touches(&self.ring_bounds[ring], &self.ring_bounds[other])
                    && planar::rings_cross(hole, &self.planar[other])
            });
            if crosses {
                return Err(MalformedRing {
                    ring,
                    defect: RingDefect::CrossesRing,
                });
            }
        }
        Ok(())
    }

    /// Build a polygon without validating its rings.
    ///
    /// Containment results are unspecified for rings that would fail
    /// [`Ring::validate`].
    pub fn from_rings_unchecked(outer: Ring, holes: Vec<Ring>) -> Self {
        let mut planar_rings = Vec::with_capacity(holes.len() + 1);
        let mut outer_pts = planar::unwrap(outer.vertices());
        planar::align(&mut outer_pts, 0.0);
        let center = planar::bounds(&outer_pts).center().x;
        planar_rings.push(outer_pts);
        for hole in &holes {
            let mut pts = planar::unwrap(hole.vertices());
            planar::align(&mut pts, center);
            planar_rings.push(pts);
        }
        let ring_bounds = planar_rings.iter().map(|r| planar::bounds(r)).collect();
        Self {
            outer,
            holes,
            planar: planar_rings,
            ring_bounds,
        }
    }

    /// The outer ring.
    #[inline]
    pub fn outer(&self) -> &Ring {
        &self.outer
    }

    /// The hole rings.
    #[inline]
    pub fn holes(&self) -> &[Ring] {
        &self.holes
    }

    /// Iterate over all rings, outer first.
    pub fn rings(&self) -> impl Iterator<Item = &Ring> + '_ {
        core::iter::once(&self.outer).chain(self.holes.iter())
    }

    /// Bounding box of the outer ring in unwrapped degrees (`x` = longitude).
    #[inline]
    pub fn bounds(&self) -> Rect {
        self.ring_bounds[0]
    }

    /// Planar area in square degrees: outer ring minus holes.
    pub fn area(&self) -> f64 {
        let outer = planar::doubled_area(&self.planar[0]).abs();
        let holes: f64 = self.planar[1..]
            .iter()
            .map(|r| planar::doubled_area(r).abs())
            .sum();
        0.5 * (outer - holes)
    }

    /// Area-weighted centroid of the outer ring.
    ///
    /// The centroid is not necessarily inside the polygon.
    pub fn centroid(&self) -> LatLng {
        let c = planar::centroid(&self.planar[0]);
        LatLng::new(c.y, wrap_longitude(c.x))
    }

    #[inline]
    fn center_x(&self) -> f64 {
        self.ring_bounds[0].center().x
    }

    /// Classify a point with the even-odd rule, holes subtracted.
    pub fn contains(&self, point: LatLng) -> Containment {
        let pt = planar::align_point(Point::new(point.lng, point.lat), self.center_x());
        self.classify_planar(pt)
    }

    fn classify_planar(&self, pt: Point) -> Containment {
        match planar::classify(&self.planar[0], &self.ring_bounds[0], pt) {
            Containment::Inside => {}
            other => return other,
        }
        for (ring, bounds) in self.planar[1..].iter().zip(&self.ring_bounds[1..]) {
            match planar::classify(ring, bounds, pt) {
                Containment::Inside => return Containment::Outside,
                Containment::Boundary => return Containment::Boundary,
                Containment::Outside => {}
            }
        }
        Containment::Inside
    }

    /// Whether a cell outline shares any point with the polygon.
    ///
    /// True when a cell vertex is inside or on the polygon, a polygon vertex
    /// falls inside the outline, or any pair of edges crosses. The outline is
    /// given without its closing vertex, as grid backends return it.
    pub fn overlaps_outline(&self, outline: &[LatLng]) -> bool {
        let Some(&first) = outline.first() else {
            return false;
        };
        let mut closed: Vec<LatLng> = Vec::with_capacity(outline.len() + 1);
        closed.extend_from_slice(outline);
        closed.push(first);
        let mut cell = planar::unwrap(&closed);
        planar::align(&mut cell, self.center_x());
        let cell_bounds = planar::bounds(&cell);

        let poly_bounds = self.ring_bounds[0].inflate(BOUNDARY_EPSILON, BOUNDARY_EPSILON);
        if !touches(&cell_bounds, &poly_bounds) {
            return false;
        }

        if cell[..cell.len() - 1]
            .iter()
            .any(|&p| self.classify_planar(p) != Containment::Outside)
        {
            return true;
        }

        for (ring, bounds) in self.planar.iter().zip(&self.ring_bounds) {
            if !touches(bounds, &cell_bounds) {
                continue;
            }
            if ring
                .iter()
                .any(|&p| planar::classify(&cell, &cell_bounds, p) != Containment::Outside)
            {
                return true;
            }
            for edge in ring.windows(2) {
                for side in cell.windows(2) {
                    if planar::segments_intersect(edge[0], edge[1], side[0], side[1]) {
                        return true;
                    }
                }
            }
        }
        false
    }
}

/// Closed-box overlap: boxes sharing only an edge still touch.
#[inline]
fn touches(a: &Rect, b: &Rect) -> bool {
    a.x0 <= b.x1 && a.x1 >= b.x0 && a.y0 <= b.y1 && a.y1 >= b.y0
}

/// A set of independent polygons.
#[derive(Clone, Debug, Default)]
pub struct MultiPolygon {
    polygons: Vec<Polygon>,
}

impl MultiPolygon {
    /// Create an empty multipolygon.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a polygon.
    pub fn push(&mut self, polygon: Polygon) {
        self.polygons.push(polygon);
    }

    /// Number of polygons.
    #[inline]
    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    /// Whether there are no polygons.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    /// The polygons.
    #[inline]
    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    /// Iterate over the polygons.
    pub fn iter(&self) -> core::slice::Iter<'_, Polygon> {
        self.polygons.iter()
    }

    /// Classify a point against every polygon; `Inside` wins over
    /// `Boundary`, which wins over `Outside`.
    pub fn contains(&self, point: LatLng) -> Containment {
        let mut best = Containment::Outside;
        for polygon in &self.polygons {
            match polygon.contains(point) {
                Containment::Inside => return Containment::Inside,
                Containment::Boundary => best = Containment::Boundary,
                Containment::Outside => {}
            }
        }
        best
    }
}

impl From<Vec<Polygon>> for MultiPolygon {
    fn from(polygons: Vec<Polygon>) -> Self {
        Self { polygons }
    }
}

impl From<Polygon> for MultiPolygon {
    fn from(polygon: Polygon) -> Self {
        Self {
            polygons: vec![polygon],
        }
    }
}

impl FromIterator<Polygon> for MultiPolygon {
    fn from_iter<I: IntoIterator<Item = Polygon>>(iter: I) -> Self {
        Self {
            polygons: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for MultiPolygon {
    type Item = Polygon;
    type IntoIter = alloc::vec::IntoIter<Polygon>;

    fn into_iter(self) -> Self::IntoIter {
        self.polygons.into_iter()
    }
}

impl<'a> IntoIterator for &'a MultiPolygon {
    type Item = &'a Polygon;
    type IntoIter = core::slice::Iter<'a, Polygon>;

    fn into_iter(self) -> Self::IntoIter {
        self.polygons.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn ring(coords: &[(f64, f64)]) -> Ring {
        Ring::new(coords.iter().map(|&(lat, lng)| LatLng::new(lat, lng)))
    }

    fn square(lat0: f64, lng0: f64, size: f64) -> Ring {
        ring(&[
            (lat0, lng0),
            (lat0, lng0 + size),
            (lat0 + size, lng0 + size),
            (lat0 + size, lng0),
        ])
    }

    #[test]
    fn holes_subtract() {
        let poly = Polygon::new(square(0.0, 0.0, 10.0), vec![square(4.0, 4.0, 2.0)]).unwrap();
        assert_eq!(poly.contains(LatLng::new(1.0, 1.0)), Containment::Inside);
        assert_eq!(poly.contains(LatLng::new(5.0, 5.0)), Containment::Outside);
        assert_eq!(poly.contains(LatLng::new(4.0, 5.0)), Containment::Boundary);
        assert_eq!(poly.contains(LatLng::new(20.0, 5.0)), Containment::Outside);
        assert!((poly.area() - 96.0).abs() < 1e-9);
    }

    #[test]
    fn orientation_does_not_matter() {
        let ccw = Polygon::new(square(0.0, 0.0, 1.0), Vec::new()).unwrap();
        let cw = Polygon::new(square(0.0, 0.0, 1.0).reversed(), Vec::new()).unwrap();
        let p = LatLng::new(0.5, 0.5);
        assert_eq!(ccw.contains(p), Containment::Inside);
        assert_eq!(cw.contains(p), Containment::Inside);
    }

    #[test]
    fn antimeridian_polygon_contains_both_sides() {
        let poly = Polygon::new(
            ring(&[(0.0, 179.0), (0.0, -179.0), (2.0, -179.0), (2.0, 179.0)]),
            Vec::new(),
        )
        .unwrap();
        assert_eq!(poly.contains(LatLng::new(1.0, 179.5)), Containment::Inside);
        assert_eq!(poly.contains(LatLng::new(1.0, -179.5)), Containment::Inside);
        assert_eq!(poly.contains(LatLng::new(1.0, 180.0)), Containment::Inside);
        assert_eq!(poly.contains(LatLng::new(1.0, 0.0)), Containment::Outside);
        assert_eq!(poly.contains(LatLng::new(1.0, 178.0)), Containment::Outside);
        let c = poly.centroid();
        assert!((c.lat - 1.0).abs() < 1e-9);
        assert!((c.lng.abs() - 180.0).abs() < 1e-9);
    }

    #[test]
    fn malformed_rings_report_their_index() {
        let bowtie = ring(&[(0.0, 0.0), (1.0, 1.0), (1.0, 0.0), (0.0, 1.0)]);
        let err = Polygon::new(square(-5.0, -5.0, 10.0), vec![bowtie]).unwrap_err();
        assert_eq!(
            err,
            MalformedRing {
                ring: 1,
                defect: RingDefect::SelfIntersecting
            }
        );
    }

    #[test]
    fn holes_must_nest_inside_the_outer_ring() {
        let outer = square(0.0, 0.0, 10.0);
        let err = Polygon::new(outer.clone(), vec![square(8.0, 8.0, 4.0)]).unwrap_err();
        assert_eq!(
            err,
            MalformedRing {
                ring: 1,
                defect: RingDefect::NotNested
            }
        );

        let err = Polygon::new(
            outer.clone(),
            vec![square(1.0, 1.0, 2.0), square(2.0, 2.0, 2.0)],
        )
        .unwrap_err();
        assert_eq!(
            err,
            MalformedRing {
                ring: 2,
                defect: RingDefect::CrossesRing
            }
        );

        // Touching the outer ring or another hole is allowed.
        let touching = Polygon::new(
            outer,
            vec![square(0.0, 4.0, 2.0), square(2.0, 4.0, 2.0)],
        );
        assert!(touching.is_ok());
    }

    #[test]
    fn antimeridian_hole_nests() {
        let outer = ring(&[(0.0, 170.0), (0.0, -170.0), (10.0, -170.0), (10.0, 170.0)]);
        let hole = ring(&[(4.0, 179.0), (4.0, -179.0), (6.0, -179.0), (6.0, 179.0)]);
        let poly = Polygon::new(outer, vec![hole]).unwrap();
        assert_eq!(poly.contains(LatLng::new(5.0, 180.0)), Containment::Outside);
        assert_eq!(poly.contains(LatLng::new(5.0, -175.0)), Containment::Inside);
    }

    #[test]
    fn outline_overlap() {
        let poly = Polygon::new(square(0.0, 0.0, 10.0), vec![square(4.0, 4.0, 2.0)]).unwrap();
        let outline = |lat0: f64, lng0: f64, size: f64| {
            vec![
                LatLng::new(lat0, lng0),
                LatLng::new(lat0, lng0 + size),
                LatLng::new(lat0 + size, lng0 + size),
                LatLng::new(lat0 + size, lng0),
            ]
        };
        // Fully inside.
        assert!(poly.overlaps_outline(&outline(1.0, 1.0, 1.0)));
        // Straddling the outer edge.
        assert!(poly.overlaps_outline(&outline(-0.5, 5.0, 1.0)));
        // Covering the whole polygon: no cell vertex inside, polygon vertices inside.
        assert!(poly.overlaps_outline(&outline(-1.0, -1.0, 12.0)));
        // Strictly inside the hole.
        assert!(!poly.overlaps_outline(&outline(4.5, 4.5, 1.0)));
        // Far away.
        assert!(!poly.overlaps_outline(&outline(20.0, 20.0, 1.0)));
    }

    #[test]
    fn cross_shaped_overlap_without_contained_vertices() {
        // A thin horizontal bar crossing a thin vertical cell.
        let bar = Polygon::new(
            ring(&[(4.0, 0.0), (4.0, 10.0), (5.0, 10.0), (5.0, 0.0)]),
            Vec::new(),
        )
        .unwrap();
        let cell = vec![
            LatLng::new(0.0, 4.0),
            LatLng::new(0.0, 5.0),
            LatLng::new(10.0, 5.0),
            LatLng::new(10.0, 4.0),
        ];
        assert!(bar.overlaps_outline(&cell));
    }

    #[test]
    fn multipolygon_contains_any_member() {
        let multi: MultiPolygon = vec![
            Polygon::new(square(0.0, 0.0, 1.0), Vec::new()).unwrap(),
            Polygon::new(square(10.0, 10.0, 1.0), Vec::new()).unwrap(),
        ]
        .into();
        assert_eq!(multi.len(), 2);
        assert_eq!(multi.contains(LatLng::new(10.5, 10.5)), Containment::Inside);
        assert_eq!(multi.contains(LatLng::new(5.0, 5.0)), Containment::Outside);
    }
}
