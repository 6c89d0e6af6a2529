// Copyright 2025 the Hexfill Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Value types shared by every grid backend.

use core::fmt;

use smallvec::SmallVec;

/// Error returned when a resolution falls outside `[0, 15]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("resolution {0} is outside the supported range 0..=15")]
pub struct InvalidResolution(pub u8);

/// Grid subdivision level, `0` (coarsest) to `15` (finest).
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Resolution(u8);

impl Resolution {
    /// The coarsest resolution.
    pub const MIN: Self = Self(0);
    /// The finest resolution.
    pub const MAX: Self = Self(15);

    /// Validate a raw resolution level.
    #[inline]
    pub const fn new(level: u8) -> Result<Self, InvalidResolution> {
        if level <= Self::MAX.0 {
            Ok(Self(level))
        } else {
            Err(InvalidResolution(level))
        }
    }

    /// Build a resolution, clamping out-of-range levels to [`Resolution::MAX`].
    ///
    /// Backends use this when decoding levels from identifiers they already trust.
    #[inline]
    pub const fn saturating(level: u8) -> Self {
        if level <= Self::MAX.0 {
            Self(level)
        } else {
            Self::MAX
        }
    }

    /// The raw level.
    #[inline]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// The next finer resolution, if any.
    #[inline]
    pub const fn finer(self) -> Option<Self> {
        if self.0 < Self::MAX.0 {
            Some(Self(self.0 + 1))
        } else {
            None
        }
    }

    /// The next coarser resolution, if any.
    #[inline]
    pub const fn coarser(self) -> Option<Self> {
        if self.0 > 0 { Some(Self(self.0 - 1)) } else { None }
    }

    /// Number of levels separating `self` from a finer `other`, or `None` if
    /// `other` is coarser.
    #[inline]
    pub const fn depth_to(self, other: Self) -> Option<u8> {
        if other.0 >= self.0 {
            Some(other.0 - self.0)
        } else {
            None
        }
    }

    /// Iterate from `self` down to [`Resolution::MIN`], inclusive.
    pub fn descending(self) -> impl Iterator<Item = Self> {
        (0..=self.0).rev().map(Self)
    }
}

impl TryFrom<u8> for Resolution {
    type Error = InvalidResolution;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        Self::new(level)
    }
}

impl From<Resolution> for u8 {
    fn from(res: Resolution) -> Self {
        res.0
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A geographic coordinate in degrees.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LatLng {
    /// Latitude in degrees, positive north.
    pub lat: f64,
    /// Longitude in degrees, positive east.
    pub lng: f64,
}

impl LatLng {
    /// Create a coordinate from latitude and longitude in degrees.
    #[inline(always)]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Whether both components are finite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }

    /// The same point with its longitude folded into `[-180, 180]`.
    #[inline]
    pub fn normalized(self) -> Self {
        Self {
            lat: self.lat,
            lng: wrap_longitude(self.lng),
        }
    }
}

/// Fold a longitude (or a longitude delta) into `[-180, 180]`.
#[inline]
pub fn wrap_longitude(lng: f64) -> f64 {
    if (-180.0..=180.0).contains(&lng) {
        lng
    } else {
        let wrapped = ((lng + 180.0) % 360.0 + 360.0) % 360.0 - 180.0;
        // The Euclidean remainder maps +180 onto -180; keep the sign of the
        // input there.
        if wrapped == -180.0 && lng > 0.0 {
            180.0
        } else {
            wrapped
        }
    }
}

/// Ordered outline of one cell. Hexagons have 6 vertices, pentagons 5, and
/// cells crossing an icosahedron edge carry up to 10 distortion vertices.
pub type Boundary = SmallVec<[LatLng; 10]>;

/// Neighbor list of one cell: 6 for hexagons, 5 for pentagons.
pub type Neighbors<C> = SmallVec<[C; 6]>;

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use alloc::vec::Vec;

    #[test]
    fn resolution_range_is_enforced() {
        assert_eq!(Resolution::new(0), Ok(Resolution::MIN));
        assert_eq!(Resolution::new(15), Ok(Resolution::MAX));
        assert_eq!(Resolution::new(16), Err(InvalidResolution(16)));
        assert_eq!(Resolution::saturating(200), Resolution::MAX);
    }

    #[test]
    fn resolution_steps() {
        let nine = Resolution::new(9).unwrap();
        assert_eq!(nine.finer().map(u8::from), Some(10));
        assert_eq!(nine.coarser().map(u8::from), Some(8));
        assert_eq!(Resolution::MAX.finer(), None);
        assert_eq!(Resolution::MIN.coarser(), None);
        assert_eq!(nine.depth_to(Resolution::MAX), Some(6));
        assert_eq!(Resolution::MAX.depth_to(nine), None);
        let levels: Vec<u8> = Resolution::new(2).unwrap().descending().map(u8::from).collect();
        assert_eq!(levels, vec![2, 1, 0]);
    }

    #[test]
    fn longitudes_wrap_into_range() {
        assert_eq!(wrap_longitude(10.0), 10.0);
        assert_eq!(wrap_longitude(180.0), 180.0);
        assert_eq!(wrap_longitude(-180.0), -180.0);
        assert!((wrap_longitude(181.0) - -179.0).abs() < 1e-12);
        assert!((wrap_longitude(-181.0) - 179.0).abs() < 1e-12);
        assert_eq!(wrap_longitude(540.0), 180.0);
        assert!((LatLng::new(1.0, 359.5).normalized().lng - -0.5).abs() < 1e-12);
    }
}
