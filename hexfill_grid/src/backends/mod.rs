// Copyright 2025 the Hexfill Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend implementations for different discrete global grids.
//!
//! - `h3` (feature `backend_h3`): the H3 hexagonal grid via [`h3o`].
//! - `quad`: planar aperture-4 quadtree over the lat/lng rectangle.
//!
//! Arity note
//! ----------
//! H3 cells have 7 children and 6 neighbors, except the 12 pentagons per
//! resolution, which have 6 children and 5 neighbors. Quadtree cells have 4
//! children and up to 4 neighbors. The engine never assumes either: it asks
//! [`GridPrimitives::children_count`][crate::GridPrimitives::children_count]
//! and [`GridPrimitives::neighbors_of`][crate::GridPrimitives::neighbors_of].

#[cfg(feature = "backend_h3")]
pub(crate) mod h3;
pub(crate) mod quad;

#[cfg(feature = "backend_h3")]
pub use h3::H3Grid;
pub use quad::{QuadCell, QuadGrid};
