//! # Base types for stormchess
//!
//! This is an auxiliary crate for `stormchess`, which contains plain value types: colors,
//! piece kinds, coordinates, board dimensions and bitboards. It has no game logic, so it can
//! be shared with collaborators (renderers, input handlers) which don't need the engine itself.
//!
//! Normally you don't want to use this crate directly. Use `stormchess` instead.

pub mod bitboard;
pub mod geometry;
pub mod types;

pub use bitboard::Bitboard;
pub use types::{Color, Coord, Delta, Dims, DimsError, PieceKind};
