// Copyright 2025 the Hexfill Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Conversions between polygons and plain coordinate arrays.
//!
//! Coordinates follow GeoJSON order, `[longitude, latitude]`. Rings must be
//! closed (first position repeated last) and the first ring of a polygon is
//! its outer ring.

use hexfill_geom::{MultiPolygon, Polygon, Ring};
use hexfill_grid::LatLng;

use crate::error::Result;

/// A `[longitude, latitude]` pair in degrees.
pub type Position = [f64; 2];

/// Build a polygon from closed rings, outer ring first.
///
/// Each ring is checked as [`Polygon::new`] does; an open ring fails with
/// [`RingDefect::NotClosed`][hexfill_geom::RingDefect::NotClosed] rather than
/// being closed silently. An empty ring list is reported as a malformed outer
/// ring.
pub fn polygon_from_positions<R: AsRef<[Position]>>(rings: &[R]) -> Result<Polygon> {
    let mut parsed = Vec::with_capacity(rings.len());
    for (index, ring) in rings.iter().enumerate() {
        let vertices = ring
            .as_ref()
            .iter()
            .map(|&[lng, lat]| LatLng::new(lat, lng))
            .collect();
        let ring = Ring::from_closed(vertices)
            .map_err(|defect| hexfill_geom::MalformedRing { ring: index, defect })?;
        parsed.push(ring);
    }
    let mut parsed = parsed.into_iter();
    let Some(outer) = parsed.next() else {
        return Err(hexfill_geom::MalformedRing {
            ring: 0,
            defect: hexfill_geom::RingDefect::TooFewVertices,
        }
        .into());
    };
    Ok(Polygon::new(outer, parsed.collect())?)
}

/// Build a multipolygon, one ring list per polygon.
///
/// Errors carry the index of the offending polygon.
pub fn multipolygon_from_positions<R: AsRef<[Position]>, P: AsRef<[R]>>(
    polygons: &[P],
) -> Result<MultiPolygon> {
    polygons
        .iter()
        .enumerate()
        .map(|(index, rings)| {
            polygon_from_positions(rings.as_ref()).map_err(|e| e.in_polygon(index))
        })
        .collect()
}

/// Rings of a polygon as closed position lists, outer ring first.
pub fn polygon_to_positions(polygon: &Polygon) -> Vec<Vec<Position>> {
    polygon
        .rings()
        .map(|ring| ring.vertices().iter().map(|v| [v.lng, v.lat]).collect())
        .collect()
}
