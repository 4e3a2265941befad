use crate::types::{Color, Delta};

pub const ORTHOGONAL: [Delta; 4] = [
    Delta::new(0, 1),
    Delta::new(0, -1),
    Delta::new(-1, 0),
    Delta::new(1, 0),
];

pub const DIAGONAL: [Delta; 4] = [
    Delta::new(1, 1),
    Delta::new(1, -1),
    Delta::new(-1, 1),
    Delta::new(-1, -1),
];

pub const ADJACENT: [Delta; 8] = [
    Delta::new(0, 1),
    Delta::new(0, -1),
    Delta::new(-1, 0),
    Delta::new(1, 0),
    Delta::new(1, 1),
    Delta::new(1, -1),
    Delta::new(-1, 1),
    Delta::new(-1, -1),
];

pub const KNIGHT: [Delta; 8] = [
    Delta::new(-1, -2),
    Delta::new(-1, 2),
    Delta::new(1, 2),
    Delta::new(1, -2),
    Delta::new(-2, -1),
    Delta::new(-2, 1),
    Delta::new(2, 1),
    Delta::new(2, -1),
];

/// Direction in which the pawns of color `c` advance
pub const fn forward(c: Color) -> Delta {
    match c {
        Color::White => Delta::new(0, -1),
        Color::Black => Delta::new(0, 1),
    }
}

/// Row of the standard layout holding the pieces of color `c`
pub const fn back_row(c: Color) -> usize {
    match c {
        Color::White => 7,
        Color::Black => 0,
    }
}

/// Row of the standard layout holding the pawns of color `c`
pub const fn pawn_row(c: Color) -> usize {
    match c {
        Color::White => 6,
        Color::Black => 1,
    }
}
