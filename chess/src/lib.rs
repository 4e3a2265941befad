//! # Stormchess
//!
//! Rule engine for a chess variant with two extra pieces: the sniper, which can hit an
//! enemy caster from a distance, and the caster, which gathers energy and then hits a
//! short column of cells with a storm.
//!
//! The engine keeps a [`Board`] with up-to-date move lists for every piece, and a
//! [`Game`] on top of it which enforces turn order, detects check, checkmate and stalemate,
//! and can take back the last move.
//!
//! # Example
//!
//! ```
//! use stormchess::{Color, Coord, Game};
//!
//! let mut game = Game::new();
//! let pawn = game.board().id_at(Coord::from_parts(4, 6)).unwrap();
//! assert!(game.attempt_move(pawn, Coord::from_parts(4, 4)));
//! assert_eq!(game.turn(), Color::Black);
//! assert!(game.undo());
//! assert_eq!(game.turn(), Color::White);
//! ```

pub mod board;
pub mod command;
pub mod game;
pub mod movelist;
pub mod piece;
pub mod player;
pub mod types;

pub use board::{Board, Layout, MoveRecord, PrettyStyle};
pub use game::{Game, MoveError, MoveReport};
pub use movelist::MoveList;
pub use piece::{MoveKind, Piece, PieceState};
pub use player::Player;
pub use stormchess_base::{geometry, Bitboard};
pub use types::{
    Color, Coord, Delta, Dims, DrawReason, GameStatus, Outcome, PieceId, PieceKind, WinReason,
};
