use crate::types::Coord;
use derive_more::{BitOr, BitOrAssign};
use std::fmt;
use std::iter::{FromIterator, IntoIterator};

/// Set of cells within the 8×8 frame
#[derive(Default, Copy, Clone, PartialEq, Eq, Hash, BitOr, BitOrAssign)]
pub struct Bitboard(u64);

impl Bitboard {
    pub const EMPTY: Bitboard = Bitboard(0);

    pub const fn with(self, coord: Coord) -> Bitboard {
        Bitboard(self.0 | (1_u64 << coord.index()))
    }

    pub fn set(&mut self, coord: Coord) {
        *self = self.with(coord);
    }

    pub const fn has(&self, coord: Coord) -> bool {
        ((self.0 >> coord.index()) & 1) != 0
    }
}

impl fmt::Debug for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        f.debug_set().entries(*self).finish()
    }
}

pub struct Iter(u64);

impl Iterator for Iter {
    type Item = Coord;

    fn next(&mut self) -> Option<Coord> {
        if self.0 == 0 {
            return None;
        }
        let bit = self.0.trailing_zeros();
        self.0 &= self.0.wrapping_sub(1_u64);
        Some(Coord::from_index(bit as usize))
    }
}

impl IntoIterator for Bitboard {
    type Item = Coord;
    type IntoIter = Iter;

    fn into_iter(self) -> Iter {
        Iter(self.0)
    }
}

impl FromIterator<Coord> for Bitboard {
    fn from_iter<I: IntoIterator<Item = Coord>>(iter: I) -> Bitboard {
        let mut res = Bitboard::EMPTY;
        for c in iter {
            res.set(c);
        }
        res
    }
}

impl<'a> FromIterator<&'a Coord> for Bitboard {
    fn from_iter<I: IntoIterator<Item = &'a Coord>>(iter: I) -> Bitboard {
        iter.into_iter().copied().collect()
    }
}
