// Copyright 2025 the Hexfill Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types for the polyfill and compaction engine.

use hexfill_geom::MalformedRing;
use hexfill_grid::{InvalidResolution, Resolution};
use thiserror::Error;

/// Why a polygon cannot be filled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum DegenerateReason {
    /// The outer ring minus its holes encloses no area.
    #[error("zero area")]
    ZeroArea,
    /// Bounded sampling found no point strictly inside the polygon.
    #[error("no interior point found")]
    NoInteriorPoint,
}

/// Engine errors.
///
/// Every operation is all-or-nothing: an error means no partial result was
/// produced. Inputs are deterministic, so nothing is retried.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HexfillError {
    /// Resolution outside `[0, 15]`.
    #[error(transparent)]
    InvalidResolution(#[from] InvalidResolution),

    /// Zero-area polygon, or no interior seed could be located.
    #[error("polygon {polygon} is degenerate: {reason}")]
    DegeneratePolygon {
        /// Index of the polygon within its multipolygon.
        polygon: usize,
        /// What made it degenerate.
        reason: DegenerateReason,
    },

    /// A ring is not closed, too short, self-intersecting, or otherwise
    /// unusable.
    #[error("polygon {polygon}: {source}")]
    MalformedRing {
        /// Index of the polygon within its multipolygon.
        polygon: usize,
        /// The offending ring and defect.
        source: MalformedRing,
    },

    /// A member of the set is finer than the uncompact target.
    #[error(
        "cannot uncompact cell {cell:#x} at resolution {resolution} to coarser resolution {target}"
    )]
    IncompatibleUncompactTarget {
        /// Raw identifier of the offending cell.
        cell: u64,
        /// Resolution of the offending cell.
        resolution: Resolution,
        /// Requested target resolution.
        target: Resolution,
    },

    /// The cells' outline edges cannot be walked into closed rings.
    #[error("cell set cannot be walked into closed rings near ({lat}, {lng}): {detail}")]
    InconsistentCellSet {
        /// Latitude of the vertex where the walk failed.
        lat: f64,
        /// Longitude of the vertex where the walk failed.
        lng: f64,
        /// What went wrong.
        detail: &'static str,
    },

    /// The result would exceed the configured cell budget.
    #[error("result exceeds the cell budget of {limit}")]
    CellBudgetExceeded {
        /// The configured limit.
        limit: usize,
    },
}

impl From<MalformedRing> for HexfillError {
    fn from(source: MalformedRing) -> Self {
        Self::MalformedRing { polygon: 0, source }
    }
}

impl HexfillError {
    /// Attach a polygon index to polygon-scoped errors.
    pub(crate) fn in_polygon(self, index: usize) -> Self {
        match self {
            Self::DegeneratePolygon { reason, .. } => Self::DegeneratePolygon {
                polygon: index,
                reason,
            },
            Self::MalformedRing { source, .. } => Self::MalformedRing {
                polygon: index,
                source,
            },
            other => other,
        }
    }
}

/// Result type for engine operations.
pub type Result<T> = core::result::Result<T, HexfillError>;
