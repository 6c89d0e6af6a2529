// Copyright 2025 the Hexfill Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Breadth-first polygon fills.

use std::collections::VecDeque;

use hashbrown::HashSet;
use hexfill_geom::{Containment, MultiPolygon, Polygon};
use hexfill_grid::{GridPrimitives, LatLng, Resolution, wrap_longitude};
use tracing::{debug, trace};

use crate::cell_set::CellSet;
use crate::config::{ContainmentMode, EngineConfig};
use crate::error::{HexfillError, Result};
use crate::seed;

/// Cells at `resolution` covering `polygon` under `mode`, with default
/// settings otherwise.
pub fn polyfill<G: GridPrimitives>(
    grid: &G,
    polygon: &Polygon,
    resolution: Resolution,
    mode: ContainmentMode,
) -> Result<CellSet<G::Cell>> {
    polyfill_with(grid, polygon, resolution, &EngineConfig::default().with_mode(mode))
}

/// Cells at `resolution` covering `polygon`, as configured by `config`.
///
/// In [`ContainmentMode::Center`] a cell is kept when its center is strictly
/// inside the polygon; cells whose center lies on an edge are traversed but
/// not kept. In [`ContainmentMode::Overlap`] a cell is kept when its outline
/// shares any point with the polygon.
///
/// The call is all-or-nothing: exceeding `config.max_cells` fails with
/// [`HexfillError::CellBudgetExceeded`] and discards the partial fill.
pub fn polyfill_with<G: GridPrimitives>(
    grid: &G,
    polygon: &Polygon,
    resolution: Resolution,
    config: &EngineConfig,
) -> Result<CellSet<G::Cell>> {
    let seeds = seed::find_seeds_bounded(
        grid,
        polygon,
        resolution,
        config.polyfill.mode,
        config.polyfill.max_seed_samples,
    )?;

    let mut fill = FloodFill::new(grid, polygon, config.polyfill.mode, config.max_cells);
    fill.extend(seeds);
    if config.polyfill.trace_boundary {
        fill.trace_boundary(resolution);
    }
    fill.run()?;

    debug!(
        %resolution,
        mode = ?config.polyfill.mode,
        visited = fill.visited.len(),
        cells = fill.cells.len(),
        "polyfill complete"
    );
    Ok(CellSet::from_unsorted(fill.cells))
}

/// Union of the fills of every polygon in `polygons`, with default settings
/// otherwise.
pub fn polyfill_multi<G>(
    grid: &G,
    polygons: &MultiPolygon,
    resolution: Resolution,
    mode: ContainmentMode,
) -> Result<CellSet<G::Cell>>
where
    G: GridPrimitives + Sync,
{
    polyfill_multi_with(grid, polygons, resolution, &EngineConfig::default().with_mode(mode))
}

/// Union of the fills of every polygon in `polygons`, as configured by
/// `config`.
///
/// Polygons are filled independently; with the `parallel` feature and
/// `config.polyfill.parallel` set they run on the rayon thread pool. Errors
/// carry the index of the failing polygon. When several polygons fail, the
/// lowest index is reported.
pub fn polyfill_multi_with<G>(
    grid: &G,
    polygons: &MultiPolygon,
    resolution: Resolution,
    config: &EngineConfig,
) -> Result<CellSet<G::Cell>>
where
    G: GridPrimitives + Sync,
{
    let fill_one = |(index, polygon): (usize, &Polygon)| {
        polyfill_with(grid, polygon, resolution, config).map_err(|e| e.in_polygon(index))
    };

    #[cfg(feature = "parallel")]
    let parts: Vec<Result<CellSet<G::Cell>>> = if config.polyfill.parallel {
        use rayon::prelude::*;
        polygons
            .polygons()
            .par_iter()
            .enumerate()
            .map(fill_one)
            .collect()
    } else {
        polygons.iter().enumerate().map(fill_one).collect()
    };
    #[cfg(not(feature = "parallel"))]
    let parts: Vec<Result<CellSet<G::Cell>>> =
        polygons.iter().enumerate().map(fill_one).collect();

    let mut cells = Vec::new();
    for part in parts {
        cells.extend(part?.into_vec());
    }
    let merged = CellSet::from_unsorted(cells);
    config.check_budget(merged.len() as u64)?;
    debug!(
        %resolution,
        polygons = polygons.len(),
        cells = merged.len(),
        "multipolygon fill complete"
    );
    Ok(merged)
}

/// What to do with a popped cell.
enum Visit {
    /// Emit the cell and traverse its neighbors.
    Keep,
    /// Traverse its neighbors only.
    Expand,
    /// Drop it.
    Skip,
}

struct FloodFill<'a, G: GridPrimitives> {
    grid: &'a G,
    polygon: &'a Polygon,
    mode: ContainmentMode,
    limit: Option<usize>,
    visited: HashSet<G::Cell>,
    queue: VecDeque<G::Cell>,
    cells: Vec<G::Cell>,
}

impl<'a, G: GridPrimitives> FloodFill<'a, G> {
    fn new(grid: &'a G, polygon: &'a Polygon, mode: ContainmentMode, limit: Option<usize>) -> Self {
        Self {
            grid,
            polygon,
            mode,
            limit,
            visited: HashSet::new(),
            queue: VecDeque::new(),
            cells: Vec::new(),
        }
    }

    /// Queue a cell unless it was already seen.
    #[inline]
    fn push(&mut self, cell: G::Cell) {
        if self.visited.insert(cell) {
            self.queue.push_back(cell);
        }
    }

    fn extend(&mut self, cells: impl IntoIterator<Item = G::Cell>) {
        for cell in cells {
            self.push(cell);
        }
    }

    /// Queue the cells along every ring edge, and their neighbors.
    ///
    /// Edges are sampled at half the mean cell edge length, so every cell an
    /// edge passes through is found even where the polygon is thinner than a
    /// cell.
    fn trace_boundary(&mut self, resolution: Resolution) {
        let step = self.grid.mean_edge_length_deg(resolution) * 0.5;
        let mut last = None;
        let polygon = self.polygon;
        for ring in polygon.rings() {
            for (a, b) in ring.edges() {
                let dlng = wrap_longitude(b.lng - a.lng);
                let dlat = b.lat - a.lat;
                let len = dlng.hypot(dlat);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    reason = "Sample counts are small positive integers."
                )]
                let samples = ((len / step).ceil() as usize).max(1);
                for k in 0..samples {
                    let t = k as f64 / samples as f64;
                    let point = LatLng::new(a.lat + dlat * t, wrap_longitude(a.lng + dlng * t));
                    let Some(cell) = self.grid.cell_at(point, resolution) else {
                        continue;
                    };
                    if last == Some(cell) {
                        continue;
                    }
                    last = Some(cell);
                    self.push(cell);
                    let neighbors = self.grid.neighbors_of(cell);
                    self.extend(neighbors);
                }
            }
        }
        trace!(queued = self.queue.len(), "boundary traced");
    }

    fn classify(&self, cell: G::Cell) -> Visit {
        match self.mode {
            ContainmentMode::Center => match self.polygon.contains(self.grid.center_of(cell)) {
                Containment::Inside => Visit::Keep,
                Containment::Boundary => Visit::Expand,
                Containment::Outside => Visit::Skip,
            },
            ContainmentMode::Overlap => {
                if self.polygon.overlaps_outline(&self.grid.boundary_of(cell)) {
                    Visit::Keep
                } else {
                    Visit::Skip
                }
            }
        }
    }

    fn run(&mut self) -> Result<()> {
        while let Some(cell) = self.queue.pop_front() {
            match self.classify(cell) {
                Visit::Keep => {
                    self.cells.push(cell);
                    if let Some(limit) = self.limit {
                        if self.cells.len() > limit {
                            debug!(limit, "polyfill aborted: cell budget exceeded");
                            return Err(HexfillError::CellBudgetExceeded { limit });
                        }
                    }
                }
                Visit::Expand => {}
                Visit::Skip => continue,
            }
            let neighbors = self.grid.neighbors_of(cell);
            self.extend(neighbors);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PolyfillConfig;
    use crate::error::DegenerateReason;
    use hexfill_geom::Ring;
    use hexfill_grid::backends::{QuadCell, QuadGrid};

    fn res(level: u8) -> Resolution {
        Resolution::new(level).unwrap()
    }

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

    fn polygon(outer: Ring, holes: Vec<Ring>) -> Polygon {
        Polygon::new(outer, holes).unwrap()
    }

    #[test]
    fn center_and_overlap_modes() {
        // 2.8125° cells; centers at 1.40625 + k * 2.8125.
        let grid = QuadGrid::new();
        let poly = polygon(square(1.0, 1.0, 8.0), Vec::new());

        let center = polyfill(&grid, &poly, res(6), ContainmentMode::Center).unwrap();
        assert_eq!(center.len(), 9);
        for &cell in &center {
            assert_eq!(poly.contains(grid.center_of(cell)), Containment::Inside);
        }

        let overlap = polyfill(&grid, &poly, res(6), ContainmentMode::Overlap).unwrap();
        assert_eq!(overlap.len(), 16);
        for &cell in &center {
            assert!(overlap.contains(cell), "center cells are a subset of overlap cells");
        }
    }

    #[test]
    fn holes_are_excluded() {
        let grid = QuadGrid::new();
        let poly = polygon(square(1.0, 1.0, 8.0), vec![square(3.5, 3.5, 1.4)]);
        let cells = polyfill(&grid, &poly, res(6), ContainmentMode::Center).unwrap();
        assert_eq!(cells.len(), 8);
        let hole_cell = grid.cell_at(LatLng::new(4.2, 4.2), res(6)).unwrap();
        assert!(!cells.contains(hole_cell));
    }

    #[test]
    fn sub_cell_polygon() {
        let grid = QuadGrid::new();
        let poly = polygon(square(0.1, 0.1, 0.1), Vec::new());
        let center = polyfill(&grid, &poly, res(2), ContainmentMode::Center).unwrap();
        assert!(center.is_empty());
        let overlap = polyfill(&grid, &poly, res(2), ContainmentMode::Overlap).unwrap();
        assert_eq!(overlap.len(), 1);
    }

    fn dumbbell() -> Polygon {
        polygon(
            ring(&[
                (0.0, 0.0),
                (0.0, 10.0),
                (4.995, 10.0),
                (4.995, 30.0),
                (0.0, 30.0),
                (0.0, 40.0),
                (10.0, 40.0),
                (10.0, 30.0),
                (5.005, 30.0),
                (5.005, 10.0),
                (10.0, 10.0),
                (10.0, 0.0),
            ]),
            Vec::new(),
        )
    }

    #[test]
    fn boundary_tracing_reaches_lobes_behind_a_neck() {
        let grid = QuadGrid::new();
        let poly = dumbbell();
        let cells = polyfill(&grid, &poly, res(6), ContainmentMode::Center).unwrap();
        // 4x4 centers in the west lobe, 4x3 in the east one.
        assert_eq!(cells.len(), 28);
        assert!(cells.contains(grid.cell_at(LatLng::new(5.0, 5.0), res(6)).unwrap()));
        assert!(cells.contains(grid.cell_at(LatLng::new(5.0, 35.0), res(6)).unwrap()));
    }

    #[test]
    fn without_tracing_the_fill_stays_in_the_seeded_lobe() {
        // The centroid sits in the neck, whose cell center is outside, so the
        // seed comes from the first edge and the neck blocks the east lobe.
        let grid = QuadGrid::new();
        let config = EngineConfig::default()
            .with_polyfill(PolyfillConfig::default().with_trace_boundary(false));
        let cells = polyfill_with(&grid, &dumbbell(), res(6), &config).unwrap();
        assert_eq!(cells.len(), 16);
        for &cell in &cells {
            assert!(grid.center_of(cell).lng < 10.0);
        }
    }

    #[test]
    fn antimeridian_fill_spans_both_sides() {
        let grid = QuadGrid::new();
        let poly = polygon(
            ring(&[(0.0, 175.0), (0.0, -175.0), (5.0, -175.0), (5.0, 175.0)]),
            Vec::new(),
        );
        let cells = polyfill(&grid, &poly, res(6), ContainmentMode::Center).unwrap();
        assert_eq!(cells.len(), 8);
        let columns: Vec<u32> = cells.iter().map(|c| c.column()).collect();
        assert!(columns.contains(&0));
        assert!(columns.contains(&127));
    }

    #[test]
    fn budget_aborts_the_whole_call() {
        let grid = QuadGrid::new();
        let poly = polygon(square(1.0, 1.0, 8.0), Vec::new());
        let config = EngineConfig::default().with_max_cells(Some(5));
        assert_eq!(
            polyfill_with(&grid, &poly, res(6), &config),
            Err(HexfillError::CellBudgetExceeded { limit: 5 })
        );
        let config = EngineConfig::default().with_max_cells(Some(9));
        assert_eq!(polyfill_with(&grid, &poly, res(6), &config).unwrap().len(), 9);
    }

    #[test]
    fn multipolygon_unions_and_tags_errors() {
        let grid = QuadGrid::new();
        let multi: MultiPolygon = vec![
            polygon(square(1.0, 1.0, 8.0), Vec::new()),
            polygon(square(21.0, 21.0, 8.0), Vec::new()),
        ]
        .into();
        let cells = polyfill_multi(&grid, &multi, res(6), ContainmentMode::Center).unwrap();
        assert_eq!(cells.len(), 18);

        let sequential = EngineConfig::default()
            .with_polyfill(PolyfillConfig::default().with_parallel(false));
        assert_eq!(
            polyfill_multi_with(&grid, &multi, res(6), &sequential).unwrap(),
            cells
        );

        let mut bad = multi.clone();
        let cover = square(40.0, 40.0, 1.0);
        bad.push(Polygon::new(cover.clone(), vec![cover]).unwrap());
        assert_eq!(
            polyfill_multi(&grid, &bad, res(6), ContainmentMode::Center),
            Err(HexfillError::DegeneratePolygon {
                polygon: 2,
                reason: DegenerateReason::ZeroArea
            })
        );
    }

    #[test]
    fn fills_are_deterministic() {
        let grid = QuadGrid::new();
        let poly = dumbbell();
        let a: Vec<QuadCell> = polyfill(&grid, &poly, res(7), ContainmentMode::Overlap)
            .unwrap()
            .into_vec();
        let b: Vec<QuadCell> = polyfill(&grid, &poly, res(7), ContainmentMode::Overlap)
            .unwrap()
            .into_vec();
        assert_eq!(a, b);
    }
}
