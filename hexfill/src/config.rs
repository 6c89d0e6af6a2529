// Copyright 2025 the Hexfill Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Engine configuration types.
//!
//! Plain structs with defaults and `with_*` builders. They derive `serde` so
//! hosts can load them from their own configuration files.

use serde::{Deserialize, Serialize};

/// Which cells a polyfill keeps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainmentMode {
    /// Keep cells whose center is strictly inside the polygon.
    ///
    /// Fast, and the union of results tiles adjacent polygons without
    /// overlap, but polygons thinner than a cell may come back empty.
    #[default]
    Center,
    /// Keep cells whose outline shares any point with the polygon.
    ///
    /// Covers the polygon without gaps at its edge.
    Overlap,
}

/// Configuration for polyfill traversals.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolyfillConfig {
    /// Containment predicate for kept cells.
    /// Default: [`ContainmentMode::Center`].
    pub mode: ContainmentMode,

    /// Seed the traversal with the cells along every ring edge, in addition
    /// to the seed finder's cells. Keeps lobes joined by necks narrower than
    /// a cell reachable.
    /// Default: true
    pub trace_boundary: bool,

    /// Fill the polygons of a multipolygon in parallel. Only effective with
    /// the `parallel` feature.
    /// Default: true
    pub parallel: bool,

    /// Maximum number of candidate points and cells the seed finder tests
    /// before reporting a degenerate polygon.
    /// Default: 4096
    pub max_seed_samples: usize,
}

impl Default for PolyfillConfig {
    fn default() -> Self {
        Self {
            mode: ContainmentMode::Center,
            trace_boundary: true,
            parallel: true,
            max_seed_samples: 4096,
        }
    }
}

impl PolyfillConfig {
    /// Set the containment mode.
    pub fn with_mode(mut self, mode: ContainmentMode) -> Self {
        self.mode = mode;
        self
    }

    /// Enable or disable boundary tracing.
    pub fn with_trace_boundary(mut self, trace_boundary: bool) -> Self {
        self.trace_boundary = trace_boundary;
        self
    }

    /// Enable or disable parallel multipolygon fills.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Configuration shared by every engine operation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Polyfill settings.
    pub polyfill: PolyfillConfig,

    /// Upper bound on the number of cells any single call may produce or
    /// expand to. Exceeding it fails the call with
    /// [`HexfillError::CellBudgetExceeded`][crate::HexfillError::CellBudgetExceeded].
    /// Default: unlimited
    pub max_cells: Option<usize>,
}

impl EngineConfig {
    /// Set the polyfill settings.
    pub fn with_polyfill(mut self, polyfill: PolyfillConfig) -> Self {
        self.polyfill = polyfill;
        self
    }

    /// Set the polyfill containment mode.
    pub fn with_mode(mut self, mode: ContainmentMode) -> Self {
        self.polyfill.mode = mode;
        self
    }

    /// Set the cell budget.
    pub fn with_max_cells(mut self, max_cells: Option<usize>) -> Self {
        self.max_cells = max_cells;
        self
    }

    /// Fail with `CellBudgetExceeded` if `count` is over budget.
    pub(crate) fn check_budget(&self, count: u64) -> crate::Result<()> {
        match self.max_cells {
            Some(limit) if count > limit as u64 => {
                Err(crate::HexfillError::CellBudgetExceeded { limit })
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.polyfill.mode, ContainmentMode::Center);
        assert!(config.polyfill.trace_boundary);
        assert_eq!(config.max_cells, None);
        assert!(config.check_budget(u64::MAX).is_ok());
    }

    #[test]
    fn budget_is_inclusive() {
        let config = EngineConfig::default().with_max_cells(Some(10));
        assert!(config.check_budget(10).is_ok());
        assert_eq!(
            config.check_budget(11),
            Err(crate::HexfillError::CellBudgetExceeded { limit: 10 })
        );
    }

    #[test]
    fn builders_compose() {
        let config = EngineConfig::default()
            .with_mode(ContainmentMode::Overlap)
            .with_polyfill(PolyfillConfig::default().with_trace_boundary(false))
            .with_max_cells(Some(5));
        // `with_polyfill` replaces the whole polyfill section.
        assert_eq!(config.polyfill.mode, ContainmentMode::Center);
        assert!(!config.polyfill.trace_boundary);
        assert_eq!(config.max_cells, Some(5));
    }
}
