// Copyright 2025 the Hexfill Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hexfill Geom: geographic rings and polygons with containment tests.
//!
//! This crate provides the narrow-phase geometry of the hexfill engine, built
//! on top of [`kurbo`]. It knows nothing about grids.
//!
//! - [`Ring`]: a closed vertex sequence with validation ([`RingDefect`]).
//! - [`Polygon`]: an outer ring with holes. [`Polygon::contains`] classifies a
//!   point as [`Containment::Inside`], [`Containment::Outside`] or
//!   [`Containment::Boundary`] using the even-odd rule, so ring orientation
//!   does not matter and holes subtract.
//! - [`Polygon::overlaps_outline`]: whether a cell outline shares any point
//!   with the polygon, used for full-cover fills.
//! - [`MultiPolygon`]: independent polygons.
//!
//! ## Antimeridian
//!
//! Rings are unwrapped into a contiguous longitude span on construction and
//! query points are shifted by whole turns into that span, so a ring running
//! from 179.9° to -179.9° behaves like one running from 179.9° to 180.1°.
//! Rings that wind around a pole are rejected with [`RingDefect::EnclosesPole`].
//!
//! # Example
//!
//! ```rust
//! use hexfill_geom::{Containment, Polygon, Ring};
//! use hexfill_grid::LatLng;
//!
//! let outer = Ring::new([
//!     LatLng::new(0.0, 179.0),
//!     LatLng::new(0.0, -179.0),
//!     LatLng::new(2.0, -179.0),
//!     LatLng::new(2.0, 179.0),
//! ]);
//! let polygon = Polygon::new(outer, Vec::new()).unwrap();
//!
//! assert_eq!(polygon.contains(LatLng::new(1.0, -179.5)), Containment::Inside);
//! assert_eq!(polygon.contains(LatLng::new(1.0, 0.0)), Containment::Outside);
//! ```
//!
//! Distances are planar, in degrees; [`BOUNDARY_EPSILON`] is the tolerance
//! for boundary hits.
//!
//! ## Features
//!
//! - `std` *(default)*: use the standard library for floating-point math.
//! - `libm`: `no_std` builds that rely on `libm` through `kurbo`.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod planar;
mod polygon;
mod ring;

pub use planar::BOUNDARY_EPSILON;
pub use polygon::{Containment, MalformedRing, MultiPolygon, Polygon};
pub use ring::{Ring, RingDefect};
