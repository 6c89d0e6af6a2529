// Copyright 2025 the Hexfill Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! H3 backend.
//!
//! Wraps the [`h3o`] implementation of the H3 hexagonal grid. Cells are
//! [`h3o::CellIndex`] values; resolutions are mapped one to one.

use alloc::vec::Vec;
use core::f64::consts::PI;

use h3o::CellIndex;

use crate::backend::GridPrimitives;
use crate::types::{Boundary, LatLng, Neighbors, Resolution};

/// Authalic earth radius used by H3, in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.007180918475;

/// Mean hexagon edge length per resolution, in kilometers.
const MEAN_EDGE_LENGTH_KM: [f64; 16] = [
    1281.256011,
    483.0568391,
    182.5129565,
    68.97922179,
    26.07175968,
    9.854090990,
    3.724532667,
    1.406475763,
    0.531414010,
    0.200786148,
    0.075863783,
    0.028663897,
    0.010830188,
    0.004092010,
    0.001546100,
    0.000584169,
];

/// Mean hexagon area per resolution, in square kilometers.
const MEAN_CELL_AREA_KM2: [f64; 16] = [
    4_357_449.416078381,
    609_788.441794133,
    86_801.780398997,
    12_393.434655088,
    1_770.347654491,
    252.903858182,
    36.129062164,
    5.161293360,
    0.737327598,
    0.105332513,
    0.015047502,
    0.002149643,
    0.000307092,
    0.000043870,
    0.000006267,
    0.000000895,
];

/// The H3 grid as a [`GridPrimitives`] backend.
#[derive(Clone, Copy, Debug, Default)]
pub struct H3Grid;

impl H3Grid {
    /// Create the backend.
    pub const fn new() -> Self {
        Self
    }

    /// Decode a raw 64-bit identifier, rejecting anything that is not a
    /// valid cell.
    pub fn cell_from_raw(&self, raw: u64) -> Option<CellIndex> {
        CellIndex::try_from(raw).ok()
    }

    /// Parse the canonical hexadecimal form of a cell (e.g. `8928308280fffff`).
    pub fn parse_cell(&self, text: &str) -> Option<CellIndex> {
        text.trim().parse::<CellIndex>().ok()
    }

    /// Mean hexagon area at `resolution`, in square kilometers.
    pub fn mean_cell_area_km2(&self, resolution: Resolution) -> f64 {
        MEAN_CELL_AREA_KM2[usize::from(resolution.get())]
    }
}

fn h3_resolution(resolution: Resolution) -> h3o::Resolution {
    use h3o::Resolution as R;
    match resolution.get() {
        0 => R::Zero,
        1 => R::One,
        2 => R::Two,
        3 => R::Three,
        4 => R::Four,
        5 => R::Five,
        6 => R::Six,
        7 => R::Seven,
        8 => R::Eight,
        9 => R::Nine,
        10 => R::Ten,
        11 => R::Eleven,
        12 => R::Twelve,
        13 => R::Thirteen,
        14 => R::Fourteen,
        _ => R::Fifteen,
    }
}

#[inline]
fn to_latlng(ll: h3o::LatLng) -> LatLng {
    LatLng::new(ll.lat(), ll.lng())
}

impl GridPrimitives for H3Grid {
    type Cell = CellIndex;

    fn resolution_of(&self, cell: CellIndex) -> Resolution {
        Resolution::saturating(u8::from(cell.resolution()))
    }

    fn is_pentagon(&self, cell: CellIndex) -> bool {
        cell.is_pentagon()
    }

    fn center_of(&self, cell: CellIndex) -> LatLng {
        to_latlng(h3o::LatLng::from(cell))
    }

    fn boundary_of(&self, cell: CellIndex) -> Boundary {
        cell.boundary().iter().copied().map(to_latlng).collect()
    }

    fn cell_at(&self, point: LatLng, resolution: Resolution) -> Option<CellIndex> {
        let point = point.normalized();
        h3o::LatLng::new(point.lat, point.lng)
            .ok()
            .map(|ll| ll.to_cell(h3_resolution(resolution)))
    }

    fn parent_of(&self, cell: CellIndex, resolution: Resolution) -> Option<CellIndex> {
        cell.parent(h3_resolution(resolution))
    }

    fn visit_children<F: FnMut(CellIndex)>(&self, cell: CellIndex, resolution: Resolution, f: F) {
        if resolution < self.resolution_of(cell) {
            return;
        }
        cell.children(h3_resolution(resolution)).for_each(f);
    }

    fn children_count(&self, cell: CellIndex, resolution: Resolution) -> u64 {
        let Some(depth) = self.resolution_of(cell).depth_to(resolution) else {
            return 0;
        };
        let hexagons = 7_u64.pow(u32::from(depth));
        if cell.is_pentagon() {
            // One pentagon child plus five hexagonal subtrees per level.
            1 + 5 * (hexagons - 1) / 6
        } else {
            hexagons
        }
    }

    fn neighbors_of(&self, cell: CellIndex) -> Neighbors<CellIndex> {
        cell.grid_disk::<Vec<_>>(1)
            .into_iter()
            .filter(|&c| c != cell)
            .collect()
    }

    fn mean_edge_length_deg(&self, resolution: Resolution) -> f64 {
        MEAN_EDGE_LENGTH_KM[usize::from(resolution.get())] / (EARTH_RADIUS_KM * PI / 180.0)
    }
}
