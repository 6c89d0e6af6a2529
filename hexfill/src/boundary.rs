// Copyright 2025 the Hexfill Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reconstructing polygon outlines from cell sets.
//!
//! Every cell outline contributes one directed edge per side, counter-clockwise.
//! An edge shared by two cells appears once in each direction and is dropped;
//! what remains is the boundary of the union, with the covered area on the
//! left of every edge. Walking it yields counter-clockwise outer rings and
//! clockwise holes.
//!
//! A loop that winds once around the globe bounds a region holding a pole.
//! Such loops are cut at the antimeridian and closed along the pole, so that
//! they become ordinary rings spanning `[-180, 180]` in unwrapped longitude.

use hashbrown::{HashMap, HashSet};
use hexfill_geom::{Containment, MultiPolygon, Polygon, Ring};
use hexfill_grid::{GridPrimitives, LatLng, wrap_longitude};
use kurbo::{Point, Vec2};
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::cell_set::CellSet;
use crate::error::{HexfillError, Result};

/// Distance, in degrees, under which two outline vertices are the same vertex.
pub const VERTEX_EPSILON: f64 = 1e-9;

/// Bucket size of the vertex interner. Must exceed [`VERTEX_EPSILON`] so a
/// 3x3 bucket neighborhood holds every candidate match.
const QUANTUM: f64 = 1e-8;

/// Number of longitude buckets around the globe, `360 / QUANTUM`.
const LNG_BUCKETS: i64 = 36_000_000_000;

type VertexId = u32;

/// Outlines of the union of `cells`, as polygons with holes.
///
/// Cells at mixed resolutions are first expanded to the finest resolution
/// present. Outer rings run counter-clockwise and holes clockwise (longitude
/// as `x`). Each ring starts at its lowest vertex (by latitude, then
/// longitude), holes are ordered the same way, and polygons are ordered by
/// their outer ring's first vertex, so the output depends only on the set.
///
/// A region holding a pole is bounded by a ring that starts where its
/// outline crosses the antimeridian, follows the outline once around, and
/// returns along the pole. Outlines that lie on a pole entirely, as the top
/// edges of a cell row ending at 90°, are dropped.
///
/// Regions touching at a single vertex come back as separate polygons.
///
/// Fails with [`HexfillError::InconsistentCellSet`] when the outline edges do
/// not form closed rings or when a hole lies outside every outer ring.
pub fn cells_to_polygons<G: GridPrimitives>(
    grid: &G,
    cells: &CellSet<G::Cell>,
) -> Result<MultiPolygon> {
    let Some(finest) = cells.iter().map(|&c| grid.resolution_of(c)).max() else {
        return Ok(MultiPolygon::new());
    };
    let uniform;
    let cells = if cells.iter().all(|&c| grid.resolution_of(c) == finest) {
        cells
    } else {
        debug!(%finest, "expanding mixed-resolution cells");
        uniform = cells
            .iter()
            .flat_map(|&c| grid.children_of(c, finest))
            .collect::<CellSet<_>>();
        &uniform
    };

    let mut graph = EdgeGraph::default();
    for &cell in cells {
        graph.add_outline(&grid.boundary_of(cell))?;
    }
    let loops = graph.walk()?;

    let mut outers: Vec<(f64, Vec<LatLng>)> = Vec::new();
    let mut holes: Vec<Vec<LatLng>> = Vec::new();
    let mut polar: Vec<(bool, Vec<LatLng>)> = Vec::new();
    for ids in loops {
        let vertices = graph.ring_positions(&ids);
        let winding = winding(&vertices);
        if winding.abs() >= 180.0 {
            if vertices
                .iter()
                .all(|v| v.lat.abs() >= 90.0 - VERTEX_EPSILON)
            {
                trace!(vertices = vertices.len(), "dropping outline along a pole");
                continue;
            }
            polar.push((winding > 0.0, vertices));
            continue;
        }
        let area = signed_area(&vertices);
        if area > 0.0 {
            outers.push((area, vertices));
        } else {
            holes.push(vertices);
        }
    }

    // Polar loops nest around the poles. Covered area lies left of every
    // edge: an eastward loop covers everything up to the north pole, and a
    // westward one covers the band down to the next loop, or to the south
    // pole when no loop lies further south.
    polar.sort_by(|a, b| mean_lat(&a.1).total_cmp(&mean_lat(&b.1)));
    for (i, (eastward, vertices)) in polar.into_iter().enumerate() {
        if eastward {
            let ring = close_through_pole(&vertices, true, 90.0)?;
            outers.push((signed_area(&ring), ring));
        } else if i == 0 {
            let ring = close_through_pole(&vertices, false, -90.0)?;
            outers.push((signed_area(&ring), ring));
        } else {
            holes.push(close_through_pole(&vertices, false, 90.0)?);
        }
    }

    let shells: Vec<Polygon> = outers
        .iter()
        .map(|(_, v)| Polygon::from_rings_unchecked(Ring::new(v.iter().copied()), Vec::new()))
        .collect();
    let mut assigned: Vec<Vec<Vec<LatLng>>> = vec![Vec::new(); outers.len()];
    for hole in holes {
        // Any edge works; this one is never the seam of a polar ring.
        let at = hole.len() / 4;
        let on_edge = midpoint(hole[at], hole[at + 1]);
        let owner = shells
            .iter()
            .enumerate()
            .filter(|(_, shell)| shell.contains(on_edge) == Containment::Inside)
            .min_by(|(a, _), (b, _)| outers[*a].0.total_cmp(&outers[*b].0))
            .map(|(i, _)| i)
            .ok_or_else(|| inconsistent(hole[0], "hole outside every outer ring"))?;
        assigned[owner].push(hole);
    }

    let mut polygons: Vec<(LatLng, Polygon)> = outers
        .into_iter()
        .zip(assigned)
        .map(|((_, outer), mut holes)| {
            holes.sort_by(|a, b| cmp_latlng(a[0], b[0]));
            let key = outer[0];
            let holes = holes.into_iter().map(Ring::new).collect();
            (key, Polygon::from_rings_unchecked(Ring::new(outer), holes))
        })
        .collect();
    polygons.sort_by(|a, b| cmp_latlng(a.0, b.0));

    debug!(
        cells = cells.len(),
        vertices = graph.interner.positions.len(),
        polygons = polygons.len(),
        "reconstructed outlines"
    );
    Ok(polygons.into_iter().map(|(_, p)| p).collect())
}

fn inconsistent(at: LatLng, detail: &'static str) -> HexfillError {
    HexfillError::InconsistentCellSet {
        lat: at.lat,
        lng: at.lng,
        detail,
    }
}

fn cmp_latlng(a: LatLng, b: LatLng) -> core::cmp::Ordering {
    a.lat.total_cmp(&b.lat).then(a.lng.total_cmp(&b.lng))
}

/// Planar displacement from `a` to `b`, the short way around the antimeridian.
#[inline]
fn delta(a: LatLng, b: LatLng) -> Vec2 {
    Vec2::new(wrap_longitude(b.lng - a.lng), b.lat - a.lat)
}

fn midpoint(a: LatLng, b: LatLng) -> LatLng {
    let d = delta(a, b) * 0.5;
    LatLng::new(a.lat + d.y, wrap_longitude(a.lng + d.x))
}

/// Net longitude travelled around an open vertex loop: about zero for
/// ordinary loops, `±360` for loops around a pole.
fn winding(vertices: &[LatLng]) -> f64 {
    let n = vertices.len();
    (0..n)
        .map(|i| delta(vertices[i], vertices[(i + 1) % n]).x)
        .sum()
}

/// Signed area of an open vertex loop with unwrapped longitudes.
///
/// Meaningless for loops around a pole.
fn signed_area(vertices: &[LatLng]) -> f64 {
    let mut p = Point::new(0.0, vertices[0].lat);
    let mut doubled = 0.0;
    for i in 0..vertices.len() {
        let q = p + delta(vertices[i], vertices[(i + 1) % vertices.len()]);
        doubled += p.to_vec2().cross(q.to_vec2());
        p = q;
    }
    doubled * 0.5
}

fn mean_lat(vertices: &[LatLng]) -> f64 {
    vertices.iter().map(|v| v.lat).sum::<f64>() / vertices.len() as f64
}

/// Open a loop around a pole at the antimeridian and close it along `pole`.
///
/// The result starts on the antimeridian, runs once around in the loop's
/// direction, and comes back along the pole in quarter turns, so its
/// unwrapped longitudes cover exactly `[-180, 180]`.
fn close_through_pole(vertices: &[LatLng], eastward: bool, pole: f64) -> Result<Vec<LatLng>> {
    let (from, to) = if eastward {
        (-180.0, 180.0)
    } else {
        (180.0, -180.0)
    };
    let n = vertices.len();
    let (cut, lat) = (0..n)
        .find_map(|i| {
            let a = vertices[i];
            let d = delta(a, vertices[(i + 1) % n]);
            let x = wrap_longitude(a.lng);
            let crosses = if eastward {
                x + d.x >= 180.0
            } else {
                x + d.x < -180.0
            };
            crosses.then(|| {
                let t = ((to - x) / d.x).clamp(0.0, 1.0);
                (i, a.lat + d.y * t)
            })
        })
        .ok_or_else(|| inconsistent(vertices[0], "polar outline misses the antimeridian"))?;

    let mut ring = Vec::with_capacity(n + 7);
    ring.push(LatLng::new(lat, from));
    ring.extend((1..=n).map(|k| vertices[(cut + k) % n]));
    ring.push(LatLng::new(lat, to));
    let step = (from - to) / 4.0;
    ring.extend((0_u8..=4).map(|k| LatLng::new(pole, to + step * f64::from(k))));
    Ok(ring)
}

/// Tolerant vertex deduplication over a cyclic longitude grid.
#[derive(Default)]
struct VertexInterner {
    positions: Vec<LatLng>,
    buckets: HashMap<(i64, i64), SmallVec<[VertexId; 2]>>,
}

impl VertexInterner {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Bucket indices of finite coordinates fit in i64."
    )]
    fn key(p: LatLng) -> (i64, i64) {
        (
            (p.lat / QUANTUM).floor() as i64,
            ((p.lng + 180.0) / QUANTUM).floor() as i64,
        )
    }

    fn intern(&mut self, p: LatLng) -> VertexId {
        let mut p = p.normalized();
        if p.lng >= 180.0 {
            p.lng -= 360.0;
        }
        let (ky, kx) = Self::key(p);
        for dy in -1..=1 {
            for dx in -1..=1 {
                let bucket = (ky + dy, (kx + dx).rem_euclid(LNG_BUCKETS));
                let Some(ids) = self.buckets.get(&bucket) else {
                    continue;
                };
                for &id in ids {
                    if delta(self.positions[id as usize], p).hypot() <= VERTEX_EPSILON {
                        return id;
                    }
                }
            }
        }
        #[allow(
            clippy::cast_possible_truncation,
            reason = "Vertex counts are bounded by memory long before u32::MAX."
        )]
        let id = self.positions.len() as VertexId;
        self.positions.push(p);
        self.buckets
            .entry((ky, kx.rem_euclid(LNG_BUCKETS)))
            .or_default()
            .push(id);
        id
    }
}

#[derive(Default)]
struct EdgeGraph {
    interner: VertexInterner,
    edges: Vec<(VertexId, VertexId)>,
    seen: HashSet<(VertexId, VertexId)>,
}

impl EdgeGraph {
    /// Add the sides of one cell outline, counter-clockwise.
    fn add_outline(&mut self, outline: &[LatLng]) -> Result<()> {
        if outline.len() < 3 {
            return Ok(());
        }
        let mut ids: SmallVec<[VertexId; 10]> =
            outline.iter().map(|&v| self.interner.intern(v)).collect();
        // A cell around a pole is counter-clockwise seen from above that
        // pole: eastward in the north, westward in the south.
        let winding = winding(outline);
        let reverse = if winding.abs() >= 180.0 {
            (winding > 0.0) != (mean_lat(outline) > 0.0)
        } else {
            signed_area(outline) < 0.0
        };
        if reverse {
            ids.reverse();
        }
        for i in 0..ids.len() {
            let edge = (ids[i], ids[(i + 1) % ids.len()]);
            if edge.0 == edge.1 {
                continue;
            }
            if !self.seen.insert(edge) {
                let at = self.interner.positions[edge.0 as usize];
                return Err(inconsistent(at, "edge shared by overlapping cells"));
            }
            self.edges.push(edge);
        }
        Ok(())
    }

    #[inline]
    fn position(&self, id: VertexId) -> LatLng {
        self.interner.positions[id as usize]
    }

    /// Walk the exterior edges into simple closed vertex loops.
    fn walk(&self) -> Result<Vec<Vec<VertexId>>> {
        let exterior: Vec<(VertexId, VertexId)> = self
            .edges
            .iter()
            .copied()
            .filter(|&(a, b)| !self.seen.contains(&(b, a)))
            .collect();
        let mut outgoing: HashMap<VertexId, SmallVec<[usize; 2]>> = HashMap::new();
        for (i, &(from, _)) in exterior.iter().enumerate() {
            outgoing.entry(from).or_default().push(i);
        }
        trace!(edges = exterior.len(), "exterior edges");

        let mut used = vec![false; exterior.len()];
        let mut loops = Vec::new();
        for first in 0..exterior.len() {
            if used[first] {
                continue;
            }
            let start = exterior[first].0;
            let mut walk = vec![start];
            let mut current = first;
            loop {
                used[current] = true;
                let (from, to) = exterior[current];
                let incoming = delta(self.position(from), self.position(to));
                let next = outgoing
                    .get(&to)
                    .into_iter()
                    .flatten()
                    .copied()
                    .filter(|&e| !used[e] || (e == first && to == start))
                    .map(|e| {
                        let out = delta(self.position(to), self.position(exterior[e].1));
                        (e, incoming.cross(out).atan2(incoming.dot(out)))
                    })
                    .max_by(|a, b| a.1.total_cmp(&b.1).then(b.0.cmp(&a.0)))
                    .map(|(e, _)| e)
                    .ok_or_else(|| {
                        inconsistent(self.position(to), "outline edge cannot be continued")
                    })?;
                if next == first {
                    break;
                }
                walk.push(to);
                current = next;
            }
            split_loops(walk, &mut loops);
        }

        for ids in &mut loops {
            let lowest = (0..ids.len())
                .min_by(|&a, &b| cmp_latlng(self.position(ids[a]), self.position(ids[b])))
                .unwrap_or(0);
            ids.rotate_left(lowest);
        }
        Ok(loops)
    }

    fn ring_positions(&self, ids: &[VertexId]) -> Vec<LatLng> {
        ids.iter().map(|&id| self.position(id)).collect()
    }
}

/// Split a closed walk that revisits vertices into simple loops.
fn split_loops(walk: Vec<VertexId>, out: &mut Vec<Vec<VertexId>>) {
    let mut stack: Vec<VertexId> = Vec::with_capacity(walk.len());
    let mut index: HashMap<VertexId, usize> = HashMap::new();
    for v in walk {
        if let Some(&at) = index.get(&v) {
            let pinched: Vec<VertexId> = stack.drain(at + 1..).collect();
            for id in &pinched {
                index.remove(id);
            }
            if pinched.len() >= 2 {
                let mut ring = Vec::with_capacity(pinched.len() + 1);
                ring.push(v);
                ring.extend(pinched);
                out.push(ring);
            }
        } else {
            index.insert(v, stack.len());
            stack.push(v);
        }
    }
    if stack.len() >= 3 {
        out.push(stack);
    }
}
