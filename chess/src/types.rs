//! Core types used by the engine

pub use stormchess_base::types::*;

use derive_more::Display;
use std::fmt;

/// Stable handle of a piece inside a [`Board`](crate::board::Board)
///
/// Handles are indices into the board's piece arena. A piece keeps its handle after
/// being captured, so the handle can still be used to inspect or revive it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[display(fmt = "#{}", _0)]
pub struct PieceId(pub(crate) u16);

impl PieceId {
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Reason for a side to win the game
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum WinReason {
    /// Opponent's leader is in check and nothing can escape it
    Checkmate,
    /// Opponent's leader was removed from play
    LeaderCaptured,
    /// Opponent gave up
    Forfeit,
}

/// Reason for the game to end in a draw
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DrawReason {
    /// No side is in check and no live piece can move
    Stalemate,
    /// Both players agreed on a tie
    Agreement,
}

/// Result of a finished game
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Outcome {
    Win { side: Color, reason: WinReason },
    Draw(DrawReason),
}

impl Outcome {
    pub const fn win(side: Color, reason: WinReason) -> Outcome {
        Outcome::Win { side, reason }
    }

    /// Returns the winning side, or `None` for a draw
    pub const fn winner(&self) -> Option<Color> {
        match *self {
            Outcome::Win { side, .. } => Some(side),
            Outcome::Draw(_) => None,
        }
    }

    pub const fn is_draw(&self) -> bool {
        matches!(*self, Outcome::Draw(_))
    }
}

impl fmt::Display for WinReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        let s = match *self {
            WinReason::Checkmate => "checkmate",
            WinReason::LeaderCaptured => "leader captured",
            WinReason::Forfeit => "opponent forfeits",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for DrawReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        let s = match *self {
            DrawReason::Stalemate => "stalemate",
            DrawReason::Agreement => "draw by agreement",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match *self {
            Outcome::Win { side, reason } => {
                let name = match side {
                    Color::White => "white",
                    Color::Black => "black",
                };
                write!(f, "{} wins ({})", name, reason)
            }
            Outcome::Draw(reason) => write!(f, "draw ({})", reason),
        }
    }
}

/// Coarse state of a [`Game`](crate::game::Game)
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum GameStatus {
    /// The game goes on, and it's the move of the given side
    Running(Color),
    /// The game is over
    Finished(Outcome),
}

impl GameStatus {
    pub const fn is_finished(&self) -> bool {
        matches!(*self, GameStatus::Finished(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome() {
        let o = Outcome::win(Color::Black, WinReason::Checkmate);
        assert_eq!(o.winner(), Some(Color::Black));
        assert!(!o.is_draw());
        assert_eq!(o.to_string(), "black wins (checkmate)");

        let o = Outcome::Draw(DrawReason::Stalemate);
        assert_eq!(o.winner(), None);
        assert!(o.is_draw());
        assert_eq!(o.to_string(), "draw (stalemate)");
    }

    #[test]
    fn test_piece_id() {
        assert_eq!(PieceId(12).to_string(), "#12");
        assert_eq!(PieceId(3).index(), 3);
    }
}
