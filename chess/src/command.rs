//! Single-step undo

use crate::board::{Board, MoveRecord};
use crate::types::{Color, Coord, PieceId};

/// Memento of one executed move
///
/// Holds the board-level [`MoveRecord`] together with the turn owner and the check flag
/// from before the move. Owns no board state itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveCommand {
    record: MoveRecord,
    prev_turn: Color,
    prev_check: Option<Color>,
}

impl MoveCommand {
    /// Performs the move of `id` onto `dst` and passes the turn to the other side
    ///
    /// Returns `None` and changes nothing if the board rejects the move.
    pub(crate) fn execute(
        board: &mut Board,
        turn: &mut Color,
        check: Option<Color>,
        id: PieceId,
        dst: Coord,
    ) -> Option<MoveCommand> {
        let record = board.make_move(id, dst)?;
        let cmd = MoveCommand {
            record,
            prev_turn: *turn,
            prev_check: check,
        };
        *turn = turn.inv();
        Some(cmd)
    }

    /// Reverts the move, restoring the board, the turn owner and the check flag
    pub(crate) fn undo(&self, board: &mut Board, turn: &mut Color, check: &mut Option<Color>) {
        board.unmake_move(&self.record);
        *turn = self.prev_turn;
        *check = self.prev_check;
    }

    pub fn record(&self) -> &MoveRecord {
        &self.record
    }

    pub fn prev_turn(&self) -> Color {
        self.prev_turn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execute_undo() {
        let mut board = Board::standard();
        let before = board.clone();
        let mut turn = Color::White;
        let mut check = None;

        let pawn = board.id_at(Coord::from_parts(4, 6)).unwrap();
        assert!(MoveCommand::execute(
            &mut board,
            &mut turn,
            check,
            pawn,
            Coord::from_parts(4, 3)
        )
        .is_none());
        assert_eq!(turn, Color::White);
        assert_eq!(board, before);

        let cmd = MoveCommand::execute(&mut board, &mut turn, check, pawn, Coord::from_parts(4, 4))
            .unwrap();
        assert_eq!(turn, Color::Black);
        assert_eq!(cmd.prev_turn(), Color::White);
        assert_eq!(cmd.record().mover(), pawn);
        assert_eq!(board.piece(pawn).unwrap().first_move(), Some(false));

        check = Some(Color::Black);
        cmd.undo(&mut board, &mut turn, &mut check);
        assert_eq!(turn, Color::White);
        assert_eq!(check, None);
        assert_eq!(board, before);
        assert_eq!(board.piece(pawn).unwrap().first_move(), Some(true));
    }
}
