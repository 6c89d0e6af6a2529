// Copyright 2025 the Hexfill Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend trait for discrete global grid implementations.

use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::Hash;

use crate::types::{Boundary, LatLng, Neighbors, Resolution};

/// Grid primitives consumed by the polyfill and compaction engine.
///
/// Implementations own the projection, the identifier layout, and the
/// base-cell topology. Every method takes cells that the backend itself
/// produced; callers are expected to validate foreign identifiers first.
///
/// Backends are expected to be cheap to share across threads: the engine
/// only ever takes `&self`.
pub trait GridPrimitives {
    /// Cell identifier. The `u64` conversion yields the raw identifier, which
    /// the engine uses as a stable total order.
    type Cell: Copy + Eq + Hash + Debug + Send + Sync + Into<u64>;

    /// Resolution of a cell.
    fn resolution_of(&self, cell: Self::Cell) -> Resolution;

    /// Whether the cell is one of the pentagons at its resolution.
    fn is_pentagon(&self, cell: Self::Cell) -> bool;

    /// Center of the cell.
    fn center_of(&self, cell: Self::Cell) -> LatLng;

    /// Outline of the cell, without repeating the first vertex.
    fn boundary_of(&self, cell: Self::Cell) -> Boundary;

    /// The cell at `resolution` containing `point`, or `None` when the point
    /// cannot be indexed (for example non-finite coordinates).
    fn cell_at(&self, point: LatLng, resolution: Resolution) -> Option<Self::Cell>;

    /// Ancestor of the cell at `resolution`, or `None` if `resolution` is
    /// finer than the cell's own.
    fn parent_of(&self, cell: Self::Cell, resolution: Resolution) -> Option<Self::Cell>;

    /// Visit every descendant of the cell at `resolution`.
    ///
    /// Visits nothing if `resolution` is coarser than the cell's own, and the
    /// cell itself if they are equal.
    fn visit_children<F: FnMut(Self::Cell)>(&self, cell: Self::Cell, resolution: Resolution, f: F);

    /// Number of descendants of the cell at `resolution`, pentagon aware.
    fn children_count(&self, cell: Self::Cell, resolution: Resolution) -> u64;

    /// Cells sharing an edge with `cell` (6, or 5 around a pentagon).
    fn neighbors_of(&self, cell: Self::Cell) -> Neighbors<Self::Cell>;

    /// Mean length of a cell edge at `resolution`, in degrees of arc.
    fn mean_edge_length_deg(&self, resolution: Resolution) -> f64;

    /// Descendants of the cell at `resolution`.
    ///
    /// The default implementation collects [`visit_children`][GridPrimitives::visit_children].
    fn children_of(&self, cell: Self::Cell, resolution: Resolution) -> Vec<Self::Cell> {
        let mut out = Vec::new();
        self.visit_children(cell, resolution, |c| out.push(c));
        out
    }

    /// Raw identifier of a cell.
    #[inline]
    fn raw(&self, cell: Self::Cell) -> u64 {
        cell.into()
    }
}

impl<G: GridPrimitives + ?Sized> GridPrimitives for &G {
    type Cell = G::Cell;

    fn resolution_of(&self, cell: Self::Cell) -> Resolution {
        (**self).resolution_of(cell)
    }

    fn is_pentagon(&self, cell: Self::Cell) -> bool {
        (**self).is_pentagon(cell)
    }

    fn center_of(&self, cell: Self::Cell) -> LatLng {
        (**self).center_of(cell)
    }

    fn boundary_of(&self, cell: Self::Cell) -> Boundary {
        (**self).boundary_of(cell)
    }

    fn cell_at(&self, point: LatLng, resolution: Resolution) -> Option<Self::Cell> {
        (**self).cell_at(point, resolution)
    }

    fn parent_of(&self, cell: Self::Cell, resolution: Resolution) -> Option<Self::Cell> {
        (**self).parent_of(cell, resolution)
    }

    fn visit_children<F: FnMut(Self::Cell)>(&self, cell: Self::Cell, resolution: Resolution, f: F) {
        (**self).visit_children(cell, resolution, f);
    }

    fn children_count(&self, cell: Self::Cell, resolution: Resolution) -> u64 {
        (**self).children_count(cell, resolution)
    }

    fn neighbors_of(&self, cell: Self::Cell) -> Neighbors<Self::Cell> {
        (**self).neighbors_of(cell)
    }

    fn mean_edge_length_deg(&self, resolution: Resolution) -> f64 {
        (**self).mean_edge_length_deg(resolution)
    }
}
