// Copyright 2025 the Hexfill Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Planar quadtree backend.
//!
//! This backend tiles the lat/lng rectangle with axis-aligned squares: at
//! resolution `r` there are `2^(r+1)` columns and `2^r` rows, each square
//! `180 / 2^r` degrees on a side. Every cell has four children and up to four
//! edge neighbors; columns wrap across the antimeridian, rows stop at the
//! poles. Shared edges are bit-identical between neighbors, which makes it a
//! convenient backend for checking engine behavior without projection noise.
//! It is intended for:
//! - deterministic tests of traversal and boundary reconstruction,
//! - workloads that want a simple equirectangular tiling.

use smallvec::SmallVec;

use crate::backend::GridPrimitives;
use crate::types::{Boundary, LatLng, Neighbors, Resolution};

/// One square of the quadtree grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QuadCell {
    resolution: u8,
    column: u32,
    row: u32,
}

impl QuadCell {
    /// Create a cell, or `None` if the column or row is out of range.
    pub fn new(resolution: Resolution, column: u32, row: u32) -> Option<Self> {
        let r = resolution.get();
        if column < columns(r) && row < rows(r) {
            Some(Self {
                resolution: r,
                column,
                row,
            })
        } else {
            None
        }
    }

    /// Column index, counted eastward from -180°.
    pub const fn column(self) -> u32 {
        self.column
    }

    /// Row index, counted northward from -90°.
    pub const fn row(self) -> u32 {
        self.row
    }

    /// Resolution of the cell.
    pub const fn resolution(self) -> Resolution {
        Resolution::saturating(self.resolution)
    }
}

impl From<QuadCell> for u64 {
    fn from(cell: QuadCell) -> Self {
        (Self::from(cell.resolution) << 56) | (Self::from(cell.column) << 24) | Self::from(cell.row)
    }
}

#[inline]
const fn columns(resolution: u8) -> u32 {
    2 << resolution
}

#[inline]
const fn rows(resolution: u8) -> u32 {
    1 << resolution
}

#[inline]
fn cell_size(resolution: u8) -> f64 {
    180.0 / f64::from(rows(resolution))
}

/// Map a coordinate to a column or row index along one axis.
///
/// Rounds towards -∞ and saturates into `[0, count)`, so points on the far
/// edge of the rectangle land in the last cell.
#[allow(
    clippy::cast_possible_truncation,
    reason = "Cell indices are intentionally u32; the value is clamped into range first."
)]
#[inline]
fn cell_coord(value: f64, origin: f64, size: f64, count: u32) -> u32 {
    debug_assert!(size > 0.0, "quad cell size must be strictly positive");
    let t = (value - origin) / size;
    // Past the first guard `t` is positive, where truncation is floor.
    if t <= 0.0 {
        0
    } else if t >= f64::from(count - 1) {
        count - 1
    } else {
        t as u32
    }
}

/// Planar aperture-4 quadtree over the lat/lng rectangle.
#[derive(Clone, Copy, Debug, Default)]
pub struct QuadGrid;

impl QuadGrid {
    /// Create the backend.
    pub const fn new() -> Self {
        Self
    }
}

impl GridPrimitives for QuadGrid {
    type Cell = QuadCell;

    fn resolution_of(&self, cell: QuadCell) -> Resolution {
        cell.resolution()
    }

    fn is_pentagon(&self, _cell: QuadCell) -> bool {
        false
    }

    fn center_of(&self, cell: QuadCell) -> LatLng {
        let size = cell_size(cell.resolution);
        LatLng::new(
            -90.0 + (f64::from(cell.row) + 0.5) * size,
            -180.0 + (f64::from(cell.column) + 0.5) * size,
        )
    }

    fn boundary_of(&self, cell: QuadCell) -> Boundary {
        let size = cell_size(cell.resolution);
        let lat0 = -90.0 + f64::from(cell.row) * size;
        let lng0 = -180.0 + f64::from(cell.column) * size;
        let (lat1, lng1) = (lat0 + size, lng0 + size);
        // Counter-clockwise with longitude as x.
        let mut out = Boundary::new();
        out.push(LatLng::new(lat0, lng0));
        out.push(LatLng::new(lat0, lng1));
        out.push(LatLng::new(lat1, lng1));
        out.push(LatLng::new(lat1, lng0));
        out
    }

    fn cell_at(&self, point: LatLng, resolution: Resolution) -> Option<QuadCell> {
        if !point.is_finite() {
            return None;
        }
        let point = point.normalized();
        let r = resolution.get();
        let size = cell_size(r);
        Some(QuadCell {
            resolution: r,
            column: cell_coord(point.lng, -180.0, size, columns(r)),
            row: cell_coord(point.lat, -90.0, size, rows(r)),
        })
    }

    fn parent_of(&self, cell: QuadCell, resolution: Resolution) -> Option<QuadCell> {
        let depth = resolution.depth_to(cell.resolution())?;
        Some(QuadCell {
            resolution: resolution.get(),
            column: cell.column >> depth,
            row: cell.row >> depth,
        })
    }

    fn visit_children<F: FnMut(QuadCell)>(&self, cell: QuadCell, resolution: Resolution, mut f: F) {
        let Some(depth) = cell.resolution().depth_to(resolution) else {
            return;
        };
        let span = 1_u32 << depth;
        for dc in 0..span {
            for dr in 0..span {
                f(QuadCell {
                    resolution: resolution.get(),
                    column: (cell.column << depth) + dc,
                    row: (cell.row << depth) + dr,
                });
            }
        }
    }

    fn children_count(&self, cell: QuadCell, resolution: Resolution) -> u64 {
        cell.resolution()
            .depth_to(resolution)
            .map_or(0, |depth| 4_u64.pow(u32::from(depth)))
    }

    fn neighbors_of(&self, cell: QuadCell) -> Neighbors<QuadCell> {
        let cols = columns(cell.resolution);
        let mut out: Neighbors<QuadCell> = SmallVec::new();
        let mut push = |column: u32, row: u32| {
            let n = QuadCell {
                resolution: cell.resolution,
                column,
                row,
            };
            if n != cell && !out.contains(&n) {
                out.push(n);
            }
        };
        push((cell.column + 1) % cols, cell.row);
        push((cell.column + cols - 1) % cols, cell.row);
        if cell.row + 1 < rows(cell.resolution) {
            push(cell.column, cell.row + 1);
        }
        if cell.row > 0 {
            push(cell.column, cell.row - 1);
        }
        out
    }

    fn mean_edge_length_deg(&self, resolution: Resolution) -> f64 {
        cell_size(resolution.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn res(level: u8) -> Resolution {
        Resolution::new(level).unwrap()
    }

    #[test]
    fn point_lookup_and_center() {
        let grid = QuadGrid::new();
        let cell = grid.cell_at(LatLng::new(1.0, 1.0), res(1)).unwrap();
        // 90° squares: column 2 starts at 0°, row 1 starts at 0°.
        assert_eq!((cell.column(), cell.row()), (2, 1));
        assert_eq!(grid.center_of(cell), LatLng::new(45.0, 45.0));
    }

    #[test]
    fn cell_coord_saturates() {
        assert_eq!(cell_coord(-1e20, 0.0, 1.0, 8), 0);
        assert_eq!(cell_coord(1e20, 0.0, 1.0, 8), 7);
        assert_eq!(cell_coord(8.0, 0.0, 1.0, 8), 7);
        assert_eq!(cell_coord(-0.5, 0.0, 1.0, 8), 0);
        assert_eq!(cell_coord(3.999, 0.0, 1.0, 8), 3);
    }

    #[test]
    fn far_edges_land_in_last_cell() {
        let grid = QuadGrid::new();
        let cell = grid.cell_at(LatLng::new(90.0, 180.0), res(2)).unwrap();
        assert_eq!((cell.column(), cell.row()), (7, 3));
        assert!(grid.cell_at(LatLng::new(f64::NAN, 0.0), res(2)).is_none());
    }

    #[test]
    fn neighbors_wrap_across_antimeridian() {
        let grid = QuadGrid::new();
        let west = QuadCell::new(res(3), 0, 3).unwrap();
        let neighbors = grid.neighbors_of(west);
        assert_eq!(neighbors.len(), 4);
        assert!(neighbors.contains(&QuadCell::new(res(3), 15, 3).unwrap()));

        let polar = QuadCell::new(res(3), 4, 7).unwrap();
        assert_eq!(grid.neighbors_of(polar).len(), 3);
    }

    #[test]
    fn hierarchy_is_consistent() {
        let grid = QuadGrid::new();
        let cell = QuadCell::new(res(2), 5, 1).unwrap();
        let children = grid.children_of(cell, res(4));
        assert_eq!(children.len() as u64, grid.children_count(cell, res(4)));
        assert_eq!(children.len(), 16);
        for child in children {
            assert_eq!(grid.parent_of(child, res(2)), Some(cell));
        }
        assert_eq!(grid.children_of(cell, res(2)), vec![cell]);
        assert!(grid.children_of(cell, res(1)).is_empty());
        assert!(grid.parent_of(cell, res(3)).is_none());
    }

    #[test]
    fn raw_ids_are_unique_per_resolution() {
        let a: u64 = QuadCell::new(res(1), 1, 0).unwrap().into();
        let b: u64 = QuadCell::new(res(2), 1, 0).unwrap().into();
        let c: u64 = QuadCell::new(res(1), 0, 1).unwrap().into();
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert!(QuadCell::new(res(1), 4, 0).is_none());
    }
}
