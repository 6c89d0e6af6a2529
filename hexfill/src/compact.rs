// Copyright 2025 the Hexfill Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hierarchical compaction and expansion of cell sets.

use hashbrown::{HashMap, HashSet};
use hexfill_grid::{GridPrimitives, Resolution};
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::cell_set::CellSet;
use crate::config::EngineConfig;
use crate::error::{HexfillError, Result};

/// Number of resolution levels.
const LEVELS: usize = Resolution::MAX.get() as usize + 1;

/// The smallest set of cells covering exactly the same area as `cells`.
///
/// Works from the finest resolution present to the coarsest: whenever every
/// child of a parent is present (six for a pentagon, seven otherwise), the
/// children are replaced by the parent, which then takes part in the next
/// coarser pass.
///
/// A member whose ancestor is also a member is redundant and dropped first,
/// so the result never holds a cell together with one of its ancestors.
/// Compacting a compacted set returns it unchanged.
pub fn compact<G: GridPrimitives>(grid: &G, cells: &CellSet<G::Cell>) -> CellSet<G::Cell> {
    if cells.is_empty() {
        return CellSet::new();
    }

    let members: HashSet<G::Cell> = cells.iter().copied().collect();
    let mut levels: Vec<Vec<G::Cell>> = vec![Vec::new(); LEVELS];
    let mut redundant = 0_usize;
    for &cell in cells {
        let res = grid.resolution_of(cell);
        let covered = res
            .coarser()
            .into_iter()
            .flat_map(Resolution::descending)
            .filter_map(|ancestor| grid.parent_of(cell, ancestor))
            .any(|ancestor| members.contains(&ancestor));
        if covered {
            redundant += 1;
        } else {
            levels[usize::from(res.get())].push(cell);
        }
    }
    if redundant > 0 {
        debug!(redundant, "dropped cells covered by an ancestor");
    }

    let mut out = Vec::with_capacity(cells.len());
    let mut promoted = 0_usize;
    for res in Resolution::MAX.descending() {
        let level = core::mem::take(&mut levels[usize::from(res.get())]);
        let Some(coarser) = res.coarser() else {
            out.extend(level);
            continue;
        };
        if level.is_empty() {
            continue;
        }
        let mut siblings: HashMap<G::Cell, SmallVec<[G::Cell; 7]>> = HashMap::new();
        for cell in level {
            match grid.parent_of(cell, coarser) {
                Some(parent) => siblings.entry(parent).or_default().push(cell),
                None => out.push(cell),
            }
        }
        for (parent, children) in siblings {
            if children.len() as u64 == grid.children_count(parent, res) {
                levels[usize::from(coarser.get())].push(parent);
                promoted += 1;
            } else {
                out.extend(children);
            }
        }
        trace!(%res, promoted, "compaction pass");
    }

    let out = CellSet::from_unsorted(out);
    debug!(input = cells.len(), output = out.len(), promoted, "compacted");
    out
}

/// Number of cells [`uncompact`] would produce, without producing them.
///
/// Fails with [`HexfillError::IncompatibleUncompactTarget`] if a member is
/// finer than `target`. Members are assumed not to overlap.
pub fn uncompact_size<G: GridPrimitives>(
    grid: &G,
    cells: &CellSet<G::Cell>,
    target: Resolution,
) -> Result<u64> {
    let mut total = 0_u64;
    for &cell in cells {
        let resolution = grid.resolution_of(cell);
        if resolution > target {
            return Err(HexfillError::IncompatibleUncompactTarget {
                cell: grid.raw(cell),
                resolution,
                target,
            });
        }
        total = total.saturating_add(grid.children_count(cell, target));
    }
    Ok(total)
}

/// Every member expanded to its descendants at `target`.
///
/// Members already at `target` pass through unchanged. Fails with
/// [`HexfillError::IncompatibleUncompactTarget`] if a member is finer than
/// `target`.
pub fn uncompact<G: GridPrimitives>(
    grid: &G,
    cells: &CellSet<G::Cell>,
    target: Resolution,
) -> Result<CellSet<G::Cell>> {
    uncompact_with(grid, cells, target, &EngineConfig::default())
}

/// [`uncompact`] with a cell budget.
///
/// The output size is computed first; if it exceeds `config.max_cells` the
/// call fails with [`HexfillError::CellBudgetExceeded`] before expanding
/// anything.
pub fn uncompact_with<G: GridPrimitives>(
    grid: &G,
    cells: &CellSet<G::Cell>,
    target: Resolution,
    config: &EngineConfig,
) -> Result<CellSet<G::Cell>> {
    let size = uncompact_size(grid, cells, target)?;
    config.check_budget(size)?;

    let mut out = Vec::with_capacity(usize::try_from(size).unwrap_or(0));
    for &cell in cells {
        grid.visit_children(cell, target, |child| out.push(child));
    }
    debug!(input = cells.len(), output = out.len(), %target, "uncompacted");
    Ok(CellSet::from_unsorted(out))
}
