// Copyright 2025 the Hexfill Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Locating starting cells for a polygon fill.

use hexfill_geom::{Containment, Polygon, Ring};
use hexfill_grid::{GridPrimitives, LatLng, Resolution, wrap_longitude};
use kurbo::Vec2;
use tracing::{debug, trace};

use crate::config::ContainmentMode;
use crate::error::{DegenerateReason, HexfillError, Result};

/// Default number of candidates tested before giving up.
pub(crate) const DEFAULT_MAX_SAMPLES: usize = 4096;

/// Offsets tried around each edge midpoint and vertex, as a fraction of the
/// first offset.
const OFFSET_STEPS: [f64; 4] = [1.0, 0.1, 0.01, 0.001];

/// Find at least one cell at `resolution` from which a fill can start.
///
/// A seed is a cell whose center is strictly inside the polygon. The cell
/// containing the centroid is tried first. Otherwise points near every edge
/// midpoint and every vertex are sampled, together with the cells around
/// them, and the first qualifying cell is returned.
///
/// When only cells holding an interior point but no interior center are
/// found, as for polygons thinner than a cell, the first such cell is
/// returned; a center fill from it keeps nothing.
///
/// Fails with [`HexfillError::DegeneratePolygon`] when the polygon encloses
/// no area or the bounded search finds nothing.
pub fn find_seeds<G: GridPrimitives>(
    grid: &G,
    polygon: &Polygon,
    resolution: Resolution,
) -> Result<Vec<G::Cell>> {
    find_seeds_bounded(
        grid,
        polygon,
        resolution,
        ContainmentMode::Center,
        DEFAULT_MAX_SAMPLES,
    )
}

/// Seeds for a fill under `mode`.
///
/// In [`ContainmentMode::Overlap`] any cell holding an interior point
/// qualifies, since it overlaps the polygon.
pub(crate) fn find_seeds_bounded<G: GridPrimitives>(
    grid: &G,
    polygon: &Polygon,
    resolution: Resolution,
    mode: ContainmentMode,
    max_samples: usize,
) -> Result<Vec<G::Cell>> {
    let outer_area = polygon.outer().signed_area().abs();
    let area = polygon.area();
    if area.is_nan() || area <= outer_area * 1e-12 {
        return Err(degenerate(DegenerateReason::ZeroArea));
    }

    let mut sampler = Sampler {
        grid,
        polygon,
        resolution,
        mode,
        remaining: max_samples,
        base_offset: grid.mean_edge_length_deg(resolution) * 0.5,
        fallback: None,
    };

    let centroid = polygon.centroid();
    if polygon.contains(centroid) == Containment::Inside {
        if let Some(cell) = grid.cell_at(centroid, resolution) {
            if sampler.accept(cell) {
                trace!(?centroid, "seeded from centroid");
                return Ok(vec![cell]);
            }
        }
    }

    for ring in polygon.rings() {
        if let Some(cell) = sampler.search_ring(ring) {
            debug!(
                tested = max_samples - sampler.remaining,
                "seeded from ring sampling"
            );
            return Ok(vec![cell]);
        }
        if sampler.remaining == 0 {
            break;
        }
    }
    if let Some(cell) = sampler.fallback {
        debug!(max_samples, "no interior cell center found");
        return Ok(vec![cell]);
    }
    debug!(max_samples, "no interior point found");
    Err(degenerate(DegenerateReason::NoInteriorPoint))
}

fn degenerate(reason: DegenerateReason) -> HexfillError {
    HexfillError::DegeneratePolygon { polygon: 0, reason }
}

struct Sampler<'a, G: GridPrimitives> {
    grid: &'a G,
    polygon: &'a Polygon,
    resolution: Resolution,
    mode: ContainmentMode,
    remaining: usize,
    base_offset: f64,
    /// First cell seen holding an interior point.
    fallback: Option<G::Cell>,
}

impl<G: GridPrimitives> Sampler<'_, G> {
    fn search_ring(&mut self, ring: &Ring) -> Option<G::Cell> {
        let vertices = ring.vertices();
        let n = ring.edge_count();
        if n == 0 {
            return None;
        }

        // Edge midpoints, offset to both sides along the edge normal.
        for (a, b) in ring.edges() {
            let d = delta(a, b);
            let len = d.hypot();
            if len == 0.0 {
                continue;
            }
            let mid = offset(a, d * 0.5);
            let normal = Vec2::new(-d.y, d.x) / len;
            let first = self.base_offset.min(len * 0.25);
            for step in OFFSET_STEPS {
                for side in [1.0, -1.0] {
                    if let Some(cell) = self.try_point(offset(mid, normal * (first * step * side))) {
                        return Some(cell);
                    }
                }
            }
            if self.remaining == 0 {
                return None;
            }
        }

        // Vertices, offset along the bisector of their two edges.
        for i in 0..n {
            let v = vertices[i];
            let prev = vertices[(i + n - 1) % n];
            let next = vertices[i + 1];
            let (u1, u2) = (delta(v, prev), delta(v, next));
            let shortest = u1.hypot().min(u2.hypot());
            if shortest == 0.0 {
                continue;
            }
            let mut bisector = u1.normalize() + u2.normalize();
            if bisector.hypot() < 1e-12 {
                bisector = Vec2::new(-u2.y, u2.x);
            }
            let bisector = bisector.normalize();
            let first = self.base_offset.min(shortest * 0.25);
            for step in OFFSET_STEPS {
                for side in [1.0, -1.0] {
                    if let Some(cell) = self.try_point(offset(v, bisector * (first * step * side))) {
                        return Some(cell);
                    }
                }
            }
            if let Some(cell) = self.try_cells_around(v) {
                return Some(cell);
            }
            if self.remaining == 0 {
                return None;
            }
        }
        None
    }

    /// Whether a cell holding an interior point can start a fill.
    fn accept(&mut self, cell: G::Cell) -> bool {
        if self.mode == ContainmentMode::Overlap
            || self.polygon.contains(self.grid.center_of(cell)) == Containment::Inside
        {
            return true;
        }
        self.fallback.get_or_insert(cell);
        false
    }

    /// Test a point; an interior point seeds the cell containing it, or one
    /// of that cell's neighbors.
    fn try_point(&mut self, point: LatLng) -> Option<G::Cell> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        if self.polygon.contains(point) != Containment::Inside {
            return None;
        }
        trace!(?point, "interior sample");
        let cell = self.grid.cell_at(point, self.resolution)?;
        if self.accept(cell) {
            return Some(cell);
        }
        self.try_neighbors(cell)
    }

    /// Test the centers of the cell containing `vertex` and its neighbors.
    fn try_cells_around(&mut self, vertex: LatLng) -> Option<G::Cell> {
        let cell = self.grid.cell_at(vertex, self.resolution)?;
        self.try_centers(core::iter::once(cell))
            .or_else(|| self.try_neighbors(cell))
    }

    fn try_neighbors(&mut self, cell: G::Cell) -> Option<G::Cell> {
        let neighbors = self.grid.neighbors_of(cell);
        self.try_centers(neighbors)
    }

    /// First candidate whose center is strictly inside.
    fn try_centers(&mut self, candidates: impl IntoIterator<Item = G::Cell>) -> Option<G::Cell> {
        for candidate in candidates {
            if self.remaining == 0 {
                return None;
            }
            self.remaining -= 1;
            if self.polygon.contains(self.grid.center_of(candidate)) == Containment::Inside {
                return Some(candidate);
            }
        }
        None
    }
}

/// Planar displacement from `a` to `b`, longitude as `x`, taking the short
/// way around the antimeridian.
#[inline]
fn delta(a: LatLng, b: LatLng) -> Vec2 {
    Vec2::new(wrap_longitude(b.lng - a.lng), b.lat - a.lat)
}

#[inline]
fn offset(p: LatLng, d: Vec2) -> LatLng {
    LatLng::new(p.lat + d.y, wrap_longitude(p.lng + d.x))
}
