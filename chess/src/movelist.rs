//! Per-piece list of destinations

use crate::types::Coord;

use arrayvec::ArrayVec;
use stormchess_base::Bitboard;
use std::ops::{Deref, DerefMut};
use std::slice;

/// Ordered set of destinations available to a single piece
///
/// A board holds at most 64 cells, so the list never needs to grow beyond that.
#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct MoveList(ArrayVec<Coord, 64>);

impl Deref for MoveList {
    type Target = ArrayVec<Coord, 64>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for MoveList {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Coord;
    type IntoIter = slice::Iter<'a, Coord>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl MoveList {
    pub fn new() -> MoveList {
        MoveList(ArrayVec::new())
    }

    /// Adds `c` unless it is already present
    pub fn add(&mut self, c: Coord) {
        if !self.0.contains(&c) {
            self.0.push(c);
        }
    }

    pub fn has(&self, c: Coord) -> bool {
        self.0.contains(&c)
    }

    pub fn to_bitboard(&self) -> Bitboard {
        self.0.iter().collect()
    }
}
