// Copyright 2025 the Hexfill Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hexfill: polyfill, boundary reconstruction, and compaction over
//! hierarchical hexagonal grids.
//!
//! - [`polyfill`]: the cells at a resolution covering a polygon with holes,
//!   by cell center ([`ContainmentMode::Center`]) or by any overlap
//!   ([`ContainmentMode::Overlap`]). [`polyfill_multi`] fills every polygon of
//!   a [`MultiPolygon`] and unions the results.
//! - [`cells_to_polygons`]: the outline of a cell set, as polygons with holes.
//! - [`compact`] and [`uncompact`]: a cell set's minimal mixed-resolution form,
//!   and back.
//! - [`find_seeds`]: interior starting cells for a fill.
//!
//! The engine is generic over [`GridPrimitives`]; grid geometry and
//! identifiers come from a backend. [`backends::H3Grid`] (feature
//! `backend_h3`) provides the H3 grid, [`backends::QuadGrid`] a planar
//! quadtree. [`Hexfill`] bundles a backend with an [`EngineConfig`].
//!
//! ## Features
//!
//! - `backend_h3` *(default)*: enables the H3 backend.
//! - `parallel` *(default)*: fills the polygons of a multipolygon on the
//!   `rayon` thread pool.
//!
//! # Example
//!
//! ```rust
//! use hexfill::backends::QuadGrid;
//! use hexfill::{ContainmentMode, Hexfill, LatLng, Polygon, Resolution, Ring};
//!
//! let engine = Hexfill::new(QuadGrid::new());
//! let square = Ring::new([
//!     LatLng::new(1.0, 1.0),
//!     LatLng::new(1.0, 9.0),
//!     LatLng::new(9.0, 9.0),
//!     LatLng::new(9.0, 1.0),
//! ]);
//! let polygon = Polygon::new(square, Vec::new()).unwrap();
//! let res = Resolution::new(6).unwrap();
//!
//! let cells = engine.polyfill(&polygon, res).unwrap();
//! assert_eq!(cells.len(), 9);
//!
//! // Round trip through the compact form.
//! let compacted = engine.compact(&cells);
//! assert_eq!(engine.uncompact(&compacted, res).unwrap(), cells);
//!
//! // The cells' outline is a single polygon.
//! let outline = engine.cells_to_polygons(&cells).unwrap();
//! assert_eq!(outline.len(), 1);
//!
//! // A full cover keeps every cell the square touches.
//! let engine = engine.with_mode(ContainmentMode::Overlap);
//! assert_eq!(engine.polyfill(&polygon, res).unwrap().len(), 16);
//! ```
//!
//! ## Logging
//!
//! Operations emit `tracing` events: one `debug` summary per call and
//! `trace` detail per step. No subscriber is installed.

mod boundary;
mod cell_set;
mod compact;
pub mod config;
pub mod coords;
pub mod error;
mod polyfill;
mod seed;

pub use boundary::{VERTEX_EPSILON, cells_to_polygons};
pub use cell_set::CellSet;
pub use compact::{compact, uncompact, uncompact_size, uncompact_with};
pub use config::{ContainmentMode, EngineConfig, PolyfillConfig};
pub use error::{DegenerateReason, HexfillError, Result};
pub use polyfill::{polyfill, polyfill_multi, polyfill_multi_with, polyfill_with};
pub use seed::find_seeds;

pub use hexfill_geom::{
    BOUNDARY_EPSILON, Containment, MalformedRing, MultiPolygon, Polygon, Ring, RingDefect,
};
pub use hexfill_grid::{GridPrimitives, InvalidResolution, LatLng, Resolution, backends};

/// A grid backend bundled with an engine configuration.
///
/// Every method forwards to the free function of the same name with the
/// stored grid and configuration.
#[derive(Clone, Debug, Default)]
pub struct Hexfill<G> {
    grid: G,
    config: EngineConfig,
}

impl<G: GridPrimitives> Hexfill<G> {
    /// Create an engine over `grid` with the default configuration.
    pub fn new(grid: G) -> Self {
        Self::with_config(grid, EngineConfig::default())
    }

    /// Create an engine over `grid` with `config`.
    pub fn with_config(grid: G, config: EngineConfig) -> Self {
        Self { grid, config }
    }

    /// Replace the polyfill containment mode.
    pub fn with_mode(mut self, mode: ContainmentMode) -> Self {
        self.config.polyfill.mode = mode;
        self
    }

    /// The grid backend.
    #[inline]
    pub fn grid(&self) -> &G {
        &self.grid
    }

    /// The configuration.
    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// See [`polyfill_with`].
    pub fn polyfill(&self, polygon: &Polygon, resolution: Resolution) -> Result<CellSet<G::Cell>> {
        polyfill_with(&self.grid, polygon, resolution, &self.config)
    }

    /// See [`find_seeds`].
    pub fn find_seeds(&self, polygon: &Polygon, resolution: Resolution) -> Result<Vec<G::Cell>> {
        seed::find_seeds_bounded(
            &self.grid,
            polygon,
            resolution,
            self.config.polyfill.mode,
            self.config.polyfill.max_seed_samples,
        )
    }

    /// See [`cells_to_polygons`].
    pub fn cells_to_polygons(&self, cells: &CellSet<G::Cell>) -> Result<MultiPolygon> {
        cells_to_polygons(&self.grid, cells)
    }

    /// See [`compact`].
    pub fn compact(&self, cells: &CellSet<G::Cell>) -> CellSet<G::Cell> {
        compact(&self.grid, cells)
    }

    /// See [`uncompact_with`].
    pub fn uncompact(
        &self,
        cells: &CellSet<G::Cell>,
        target: Resolution,
    ) -> Result<CellSet<G::Cell>> {
        uncompact_with(&self.grid, cells, target, &self.config)
    }

    /// See [`uncompact_size`].
    pub fn uncompact_size(&self, cells: &CellSet<G::Cell>, target: Resolution) -> Result<u64> {
        uncompact_size(&self.grid, cells, target)
    }
}

impl<G: GridPrimitives + Sync> Hexfill<G> {
    /// See [`polyfill_multi_with`].
    pub fn polyfill_multi(
        &self,
        polygons: &MultiPolygon,
        resolution: Resolution,
    ) -> Result<CellSet<G::Cell>> {
        polyfill_multi_with(&self.grid, polygons, resolution, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::QuadGrid;

    #[test]
    fn facade_applies_its_budget_everywhere() {
        let engine = Hexfill::with_config(
            QuadGrid::new(),
            EngineConfig::default().with_max_cells(Some(4)),
        );
        let res = Resolution::new(6).unwrap();
        let square = coords::polygon_from_positions(&[vec![
            [1.0, 1.0],
            [9.0, 1.0],
            [9.0, 9.0],
            [1.0, 9.0],
            [1.0, 1.0],
        ]])
        .unwrap();
        assert_eq!(
            engine.polyfill(&square, res),
            Err(HexfillError::CellBudgetExceeded { limit: 4 })
        );
        assert_eq!(
            engine.polyfill_multi(&square.clone().into(), res),
            Err(HexfillError::CellBudgetExceeded { limit: 4 })
        );

        let coarse = engine.find_seeds(&square, Resolution::new(2).unwrap()).unwrap();
        let coarse = CellSet::from_unsorted(coarse);
        assert_eq!(engine.uncompact_size(&coarse, Resolution::new(4).unwrap()), Ok(16));
        assert_eq!(
            engine.uncompact(&coarse, Resolution::new(4).unwrap()),
            Err(HexfillError::CellBudgetExceeded { limit: 4 })
        );
    }
}
