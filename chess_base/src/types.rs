use derive_more::{Add, Neg};
use std::fmt::{self, Display};
use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum DimsError {
    #[error("board side {0} is smaller than {min}", min = Dims::MIN_SIDE)]
    TooSmall(usize),
    #[error("board side {0} is larger than {max}", max = Dims::MAX_SIDE)]
    TooLarge(usize),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Color {
    White = 0,
    Black = 1,
}

impl Color {
    pub const COUNT: usize = 2;

    pub const fn inv(&self) -> Color {
        match *self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    pub const fn index(&self) -> usize {
        *self as u8 as usize
    }

    pub fn iter() -> impl Iterator<Item = Self> {
        [Color::White, Color::Black].into_iter()
    }

    pub fn as_char(&self) -> char {
        match *self {
            Color::White => 'w',
            Color::Black => 'b',
        }
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}", self.as_char())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PieceKind {
    Pawn = 0,
    Knight = 1,
    Bishop = 2,
    Rook = 3,
    Queen = 4,
    King = 5,
    Sniper = 6,
    Caster = 7,
}

impl PieceKind {
    pub const fn index(&self) -> usize {
        *self as u8 as usize
    }

    /// Returns `true` for the piece whose safety decides check and checkmate
    pub const fn is_leader(&self) -> bool {
        matches!(*self, PieceKind::King)
    }

    pub fn as_char(&self) -> char {
        b"PNBRQKSC"[self.index()] as char
    }

    pub fn as_utf8_char(&self, color: Color) -> char {
        match color {
            Color::White => ['♙', '♘', '♗', '♖', '♕', '♔', '⌖', '☈'][self.index()],
            Color::Black => ['♟', '♞', '♝', '♜', '♛', '♚', '⊕', '☇'][self.index()],
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'P' => Some(PieceKind::Pawn),
            'N' => Some(PieceKind::Knight),
            'B' => Some(PieceKind::Bishop),
            'R' => Some(PieceKind::Rook),
            'Q' => Some(PieceKind::Queen),
            'K' => Some(PieceKind::King),
            'S' => Some(PieceKind::Sniper),
            'C' => Some(PieceKind::Caster),
            _ => None,
        }
    }
}

impl Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}", self.as_char())
    }
}

/// Relative offset between two cells
///
/// `dx` grows from left to right, `dy` grows from top to bottom.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Add, Neg)]
pub struct Delta {
    pub dx: i8,
    pub dy: i8,
}

impl Delta {
    pub const fn new(dx: i8, dy: i8) -> Delta {
        Delta { dx, dy }
    }

    pub const fn scaled(self, by: i8) -> Delta {
        Delta {
            dx: self.dx * by,
            dy: self.dy * by,
        }
    }

    /// Chebyshev length, i.e. the number of king steps needed to cover this offset
    pub const fn steps(&self) -> u8 {
        let x = self.dx.unsigned_abs();
        let y = self.dy.unsigned_abs();
        if x > y {
            x
        } else {
            y
        }
    }
}

/// Cell coordinate within the 8×8 frame
///
/// `x` goes from left to right, `y` goes from top to bottom, so `(0, 0)` is the top-left
/// cell and the black pieces start on rows 0 and 1 of the standard layout.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Coord(u8);

impl Coord {
    pub const FRAME: usize = 8;

    pub const fn from_index(val: usize) -> Coord {
        assert!(val < 64, "coord must be between 0 and 63");
        Coord(val as u8)
    }

    pub const fn from_parts(x: usize, y: usize) -> Coord {
        assert!(x < Self::FRAME && y < Self::FRAME, "coord is out of frame");
        Coord(((y as u8) << 3) | x as u8)
    }

    /// Returns `None` if the coordinate does not fit into the 8×8 frame
    pub const fn new(x: usize, y: usize) -> Option<Coord> {
        if x >= Self::FRAME || y >= Self::FRAME {
            return None;
        }
        Some(Coord::from_parts(x, y))
    }

    pub const fn x(&self) -> usize {
        (self.0 & 7) as usize
    }

    pub const fn y(&self) -> usize {
        (self.0 >> 3) as usize
    }

    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    pub fn try_shift(self, delta: Delta) -> Option<Coord> {
        let x = self.x() as isize + delta.dx as isize;
        let y = self.y() as isize + delta.dy as isize;
        if x < 0 || y < 0 {
            return None;
        }
        Coord::new(x as usize, y as usize)
    }

    pub fn delta_to(self, other: Coord) -> Delta {
        Delta::new(
            other.x() as i8 - self.x() as i8,
            other.y() as i8 - self.y() as i8,
        )
    }
}

impl fmt::Debug for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        if self.0 < 64 {
            return write!(f, "Coord{}", self);
        }
        write!(f, "Coord(?{:?})", self.0)
    }
}

impl Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "({},{})", self.x(), self.y())
    }
}

/// Board dimensions
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Dims {
    width: u8,
    height: u8,
}

impl Dims {
    pub const MIN_SIDE: usize = 4;
    pub const MAX_SIDE: usize = Coord::FRAME;
    pub const STANDARD: Dims = Dims {
        width: 8,
        height: 8,
    };

    pub fn new(width: usize, height: usize) -> Result<Dims, DimsError> {
        for side in [width, height] {
            if side < Self::MIN_SIDE {
                return Err(DimsError::TooSmall(side));
            }
            if side > Self::MAX_SIDE {
                return Err(DimsError::TooLarge(side));
            }
        }
        Ok(Dims {
            width: width as u8,
            height: height as u8,
        })
    }

    pub const fn width(&self) -> usize {
        self.width as usize
    }

    pub const fn height(&self) -> usize {
        self.height as usize
    }

    pub const fn contains(&self, c: Coord) -> bool {
        c.x() < self.width() && c.y() < self.height()
    }

    /// Shifts `c` by `delta`, returning `None` if the result leaves the board
    pub fn shift(&self, c: Coord, delta: Delta) -> Option<Coord> {
        c.try_shift(delta).filter(|&d| self.contains(d))
    }

    /// Iterates over all the cells of the board, row by row
    pub fn cells(&self) -> impl Iterator<Item = Coord> {
        let (width, height) = (self.width(), self.height());
        (0..height).flat_map(move |y| (0..width).map(move |x| Coord::from_parts(x, y)))
    }
}

impl Default for Dims {
    fn default() -> Dims {
        Dims::STANDARD
    }
}

impl Display for Dims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}x{}", self.width, self.height)
    }
}
