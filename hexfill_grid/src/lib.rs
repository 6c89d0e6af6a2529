// Copyright 2025 the Hexfill Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hexfill Grid: the grid primitive seam of the hexfill engine.
//!
//! A discrete global grid maps every point on the sphere to a cell at one of
//! 16 resolutions, with cells nesting across resolutions. This crate does not
//! implement a projection; it defines the [`GridPrimitives`] trait the engine
//! consumes and ships backends for it.
//!
//! - Cell ↔ outline, cell ↔ center, point → cell.
//! - Parent and child lookup, pentagon-aware child counts.
//! - Neighbor enumeration.
//!
//! ## Features
//!
//! - `backend_h3` *(default)*: enables [`backends::H3Grid`], backed by `h3o`.
//!
//! # Example
//!
//! ```rust
//! use hexfill_grid::{GridPrimitives, LatLng, Resolution};
//! use hexfill_grid::backends::QuadGrid;
//!
//! let grid = QuadGrid::new();
//! let res = Resolution::new(4).unwrap();
//! let cell = grid.cell_at(LatLng::new(10.0, 20.0), res).unwrap();
//!
//! assert_eq!(grid.resolution_of(cell), res);
//! assert_eq!(grid.boundary_of(cell).len(), 4);
//! assert_eq!(grid.children_of(cell, Resolution::new(5).unwrap()).len(), 4);
//! ```
//!
//! ### Float semantics
//!
//! Coordinates are degrees. Backends assume finite inputs and return `None`
//! from [`GridPrimitives::cell_at`] otherwise.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod backend;
pub mod backends;
mod types;

pub use backend::GridPrimitives;
pub use types::{Boundary, InvalidResolution, LatLng, Neighbors, Resolution, wrap_longitude};
