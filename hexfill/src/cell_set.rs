// Copyright 2025 the Hexfill Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deduplicated cell sets with a deterministic order.

use core::fmt;

/// A set of cells ordered by raw identifier.
///
/// Backed by a sorted, deduplicated `Vec`; membership is a binary search.
/// Iteration order only depends on the members, never on how the set was
/// built.
#[derive(Clone, PartialEq, Eq)]
pub struct CellSet<C> {
    cells: Vec<C>,
}

impl<C> Default for CellSet<C> {
    fn default() -> Self {
        Self { cells: Vec::new() }
    }
}

impl<C: fmt::Debug> fmt::Debug for CellSet<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.cells.iter()).finish()
    }
}

impl<C> CellSet<C> {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the set is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterate over the cells in ascending raw order.
    pub fn iter(&self) -> core::slice::Iter<'_, C> {
        self.cells.iter()
    }

    /// The cells in ascending raw order.
    #[inline]
    pub fn as_slice(&self) -> &[C] {
        &self.cells
    }

    /// Consume the set, returning the sorted cells.
    pub fn into_vec(self) -> Vec<C> {
        self.cells
    }
}

impl<C: Copy + Into<u64>> CellSet<C> {
    /// Build a set from cells in any order, dropping duplicates.
    pub fn from_unsorted(mut cells: Vec<C>) -> Self {
        cells.sort_unstable_by_key(|&c| c.into());
        cells.dedup_by_key(|c| (*c).into());
        Self { cells }
    }

    /// Whether `cell` is a member.
    pub fn contains(&self, cell: C) -> bool {
        let key: u64 = cell.into();
        self.cells.binary_search_by_key(&key, |&c| c.into()).is_ok()
    }

    /// Members of either set.
    pub fn union(&self, other: &Self) -> Self {
        let mut cells = Vec::with_capacity(self.len() + other.len());
        let (mut a, mut b) = (self.cells.iter().peekable(), other.cells.iter().peekable());
        loop {
            let next = match (a.peek(), b.peek()) {
                (Some(&&x), Some(&&y)) => {
                    let (kx, ky): (u64, u64) = (x.into(), y.into());
                    if kx < ky {
                        a.next();
                    } else if ky < kx {
                        b.next();
                    } else {
                        a.next();
                        b.next();
                    }
                    if ky < kx { y } else { x }
                }
                (Some(&&x), None) => {
                    a.next();
                    x
                }
                (None, Some(&&y)) => {
                    b.next();
                    y
                }
                (None, None) => break,
            };
            cells.push(next);
        }
        Self { cells }
    }
}

impl<C: Copy + Into<u64>> FromIterator<C> for CellSet<C> {
    fn from_iter<I: IntoIterator<Item = C>>(iter: I) -> Self {
        Self::from_unsorted(iter.into_iter().collect())
    }
}

impl<C: Copy + Into<u64>> Extend<C> for CellSet<C> {
    fn extend<I: IntoIterator<Item = C>>(&mut self, iter: I) {
        let mut cells = core::mem::take(&mut self.cells);
        cells.extend(iter);
        *self = Self::from_unsorted(cells);
    }
}

impl<C> IntoIterator for CellSet<C> {
    type Item = C;
    type IntoIter = std::vec::IntoIter<C>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.into_iter()
    }
}

impl<'a, C> IntoIterator for &'a CellSet<C> {
    type Item = &'a C;
    type IntoIter = core::slice::Iter<'a, C>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorted_and_deduplicated() {
        let set: CellSet<u64> = [5_u64, 1, 3, 5, 1].into_iter().collect();
        assert_eq!(set.as_slice(), &[1, 3, 5]);
        assert!(set.contains(3));
        assert!(!set.contains(4));
    }

    #[test]
    fn union_merges_in_order() {
        let a = CellSet::from_unsorted(vec![1_u64, 4, 9]);
        let b = CellSet::from_unsorted(vec![2_u64, 4, 10]);
        assert_eq!(a.union(&b).into_vec(), vec![1, 2, 4, 9, 10]);
        assert_eq!(a.union(&CellSet::new()), a);
    }

    #[test]
    fn extend_keeps_the_invariant() {
        let mut set = CellSet::from_unsorted(vec![8_u64, 2]);
        set.extend([2_u64, 7, 1]);
        assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec![1, 2, 7, 8]);
        assert_eq!(set.len(), 4);
    }
}
