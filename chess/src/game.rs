//! Turn order and game-ending conditions

use crate::board::Board;
use crate::command::MoveCommand;
use crate::piece::{MoveKind, Piece};
use crate::types::{Color, Coord, DrawReason, GameStatus, Outcome, PieceId, WinReason};

use thiserror::Error;
use tracing::{debug, info, instrument};

/// Reason for [`Game::try_move()`] to reject a move
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum MoveError {
    #[error("game is already finished")]
    Finished,
    #[error("no piece {0}")]
    UnknownPiece(PieceId),
    #[error("piece {0} is out of play")]
    DeadPiece(PieceId),
    #[error("piece {0} does not belong to the side to move")]
    WrongSide(PieceId),
    #[error("piece {id} cannot move to {dst}")]
    Unreachable { id: PieceId, dst: Coord },
}

/// Summary of an accepted move
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveReport {
    pub kind: MoveKind,
    /// Pieces removed from play by the move
    pub victims: Vec<PieceId>,
    /// Side whose leader is attacked after the move
    pub check: Option<Color>,
    /// Set if the move ended the game
    pub outcome: Option<Outcome>,
}

/// Returns `true` if `color` is in check and no move of its pieces gets it out
///
/// Each candidate move of a non-leader piece is made on `board` and taken back, so the
/// board ends up the same as before the call.
pub fn is_checkmate(board: &mut Board, color: Color) -> bool {
    if !board.is_in_check(color) {
        return false;
    }
    let Some(leader) = board.leader(color) else {
        return false;
    };
    if board.moves(leader).map_or(false, |m| !m.is_empty()) {
        return false;
    }
    let candidates: Vec<(PieceId, Coord)> = board
        .pieces()
        .filter(|&(id, p)| p.color() == color && id != leader)
        .flat_map(|(id, p)| p.moves().iter().map(move |&dst| (id, dst)))
        .collect();
    for (id, dst) in candidates {
        let Some(rec) = board.make_move(id, dst) else {
            continue;
        };
        let escaped = board.leader(color).is_some() && !board.is_in_check(color);
        board.unmake_move(&rec);
        if escaped {
            return false;
        }
    }
    true
}

/// Returns `true` if no side is in check and no live piece on the board can move
pub fn is_stalemate(board: &Board) -> bool {
    !Color::iter().any(|c| board.is_in_check(c)) && !board.has_any_moves()
}

/// Game in progress
///
/// Owns the board, tracks whose turn it is and decides when the game ends. Keeps the
/// last move so it can be taken back, and a tally of wins which survives [`Game::reset()`].
#[derive(Debug, Clone)]
pub struct Game {
    board: Board,
    initial: Board,
    initial_turn: Color,
    turn: Color,
    check: Option<Color>,
    outcome: Option<Outcome>,
    last: Option<MoveCommand>,
    score: [u32; Color::COUNT],
}

impl Game {
    /// Starts a game from the standard layout, White moves first
    pub fn new() -> Game {
        Game::from_board(Board::standard(), Color::White)
    }

    /// Starts a game from an arbitrary position, with `turn` to move
    ///
    /// The position is also remembered as the one [`Game::reset()`] goes back to.
    pub fn from_board(board: Board, turn: Color) -> Game {
        let check = checked_side(&board, turn.inv());
        Game {
            initial: board.clone(),
            board,
            initial_turn: turn,
            turn,
            check,
            outcome: None,
            last: None,
            score: [0; Color::COUNT],
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the live piece on `c`
    pub fn piece_at(&self, c: Coord) -> Option<&Piece> {
        self.board.get(c)
    }

    /// Side to move
    pub fn turn(&self) -> Color {
        self.turn
    }

    pub fn status(&self) -> GameStatus {
        match self.outcome {
            Some(o) => GameStatus::Finished(o),
            None => GameStatus::Running(self.turn),
        }
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn winner(&self) -> Option<Color> {
        self.outcome.and_then(|o| o.winner())
    }

    pub fn is_tie(&self) -> bool {
        self.outcome.map_or(false, |o| o.is_draw())
    }

    /// Returns `true` if some side's leader was attacked after the last move
    pub fn is_check(&self) -> bool {
        self.check.is_some()
    }

    pub fn checked_side(&self) -> Option<Color> {
        self.check
    }

    /// Number of games won by `color` since the creation of this object
    pub fn score(&self, color: Color) -> u32 {
        self.score[color.index()]
    }

    pub fn is_checkmate(&mut self, color: Color) -> bool {
        is_checkmate(&mut self.board, color)
    }

    pub fn is_stalemate(&self) -> bool {
        is_stalemate(&self.board)
    }

    /// Moves `id` onto `dst`, returning `false` if the move is not allowed
    pub fn attempt_move(&mut self, id: PieceId, dst: Coord) -> bool {
        self.try_move(id, dst).is_ok()
    }

    /// Moves `id` onto `dst` and evaluates the resulting position
    ///
    /// Rejected moves leave the game untouched.
    #[instrument(level = "debug", skip(self), fields(turn = %self.turn))]
    pub fn try_move(&mut self, id: PieceId, dst: Coord) -> Result<MoveReport, MoveError> {
        let res = self.do_move(id, dst);
        match &res {
            Ok(report) => debug!(
                kind = ?report.kind,
                victims = report.victims.len(),
                "move accepted"
            ),
            Err(e) => debug!(error = %e, "move rejected"),
        }
        res
    }

    fn do_move(&mut self, id: PieceId, dst: Coord) -> Result<MoveReport, MoveError> {
        if self.outcome.is_some() {
            return Err(MoveError::Finished);
        }
        let piece = self.board.piece(id).ok_or(MoveError::UnknownPiece(id))?;
        if !piece.is_alive() {
            return Err(MoveError::DeadPiece(id));
        }
        if piece.color() != self.turn {
            return Err(MoveError::WrongSide(id));
        }
        let mover = self.turn;
        let cmd = MoveCommand::execute(&mut self.board, &mut self.turn, self.check, id, dst)
            .ok_or(MoveError::Unreachable { id, dst })?;

        let victims: Vec<PieceId> = cmd.record().victims().iter().map(|v| v.id()).collect();
        let kind = cmd.record().kind();
        self.last = Some(cmd);
        self.evaluate(mover, &victims);
        Ok(MoveReport {
            kind,
            victims,
            check: self.check,
            outcome: self.outcome,
        })
    }

    /// Updates the check flag and the outcome after a move of `mover`
    fn evaluate(&mut self, mover: Color, victims: &[PieceId]) {
        let other = mover.inv();
        let lost_leader = |board: &Board, color: Color| {
            board.leader(color).is_none()
                && victims.iter().any(|&v| {
                    board
                        .piece(v)
                        .map_or(false, |p| p.is_leader() && p.color() == color)
                })
        };

        if lost_leader(&self.board, other) {
            self.check = None;
            self.finish(Outcome::win(mover, WinReason::LeaderCaptured));
            return;
        }
        if lost_leader(&self.board, mover) {
            self.check = None;
            self.finish(Outcome::win(other, WinReason::LeaderCaptured));
            return;
        }

        let other_check = self.board.is_in_check(other);
        let mover_check = self.board.is_in_check(mover);
        self.check = if other_check {
            Some(other)
        } else if mover_check {
            Some(mover)
        } else {
            None
        };

        if other_check && is_checkmate(&mut self.board, other) {
            self.finish(Outcome::win(mover, WinReason::Checkmate));
        } else if mover_check && is_checkmate(&mut self.board, mover) {
            self.finish(Outcome::win(other, WinReason::Checkmate));
        } else if !other_check && !mover_check && !self.board.has_any_moves() {
            self.finish(Outcome::Draw(DrawReason::Stalemate));
        }
    }

    fn finish(&mut self, outcome: Outcome) {
        if let Some(side) = outcome.winner() {
            self.score[side.index()] += 1;
        }
        info!(%outcome, "game finished");
        self.outcome = Some(outcome);
    }

    /// Returns `true` if [`Game::undo()`] would take back a move
    pub fn can_undo(&self) -> bool {
        self.outcome.is_none() && self.last.is_some()
    }

    /// Takes back the last move
    ///
    /// Only one move is remembered, so a second call without a move in between does
    /// nothing. Moves that ended the game cannot be taken back. Returns `false` if there
    /// was nothing to undo.
    pub fn undo(&mut self) -> bool {
        if self.outcome.is_some() {
            return false;
        }
        let Some(cmd) = self.last.take() else {
            return false;
        };
        cmd.undo(&mut self.board, &mut self.turn, &mut self.check);
        debug!(piece = %cmd.record().mover(), turn = %self.turn, "move undone");
        true
    }

    /// Ends the game with `color` giving up
    ///
    /// Returns `false` if the game is already finished.
    pub fn forfeit(&mut self, color: Color) -> bool {
        if self.outcome.is_some() {
            return false;
        }
        self.finish(Outcome::win(color.inv(), WinReason::Forfeit));
        true
    }

    /// Ends the game in a draw by agreement
    ///
    /// Returns `false` if the game is already finished.
    pub fn force_tie(&mut self) -> bool {
        if self.outcome.is_some() {
            return false;
        }
        self.finish(Outcome::Draw(DrawReason::Agreement));
        true
    }

    /// Puts the initial position back and starts over, keeping the score
    pub fn reset(&mut self) {
        self.board = self.initial.clone();
        self.turn = self.initial_turn;
        self.check = checked_side(&self.board, self.turn.inv());
        self.outcome = None;
        self.last = None;
        info!(turn = %self.turn, "game reset");
    }
}

impl Default for Game {
    fn default() -> Game {
        Game::new()
    }
}

fn checked_side(board: &Board, first: Color) -> Option<Color> {
    [first, first.inv()]
        .into_iter()
        .find(|&c| board.is_in_check(c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Layout;
    use crate::types::PieceKind;
    use rand::{Rng, SeedableRng};
    use rand_xoshiro::Xoshiro256PlusPlus;
    use std::str::FromStr;

    const STORM_ENERGY_ABOVE: u8 = crate::piece::STORM_ENERGY + 1;

    fn c(x: usize, y: usize) -> Coord {
        Coord::from_parts(x, y)
    }

    fn kings() -> Board {
        let mut b = Board::new();
        b.add_piece(Color::White, PieceKind::King, c(3, 6)).unwrap();
        b.add_piece(Color::Black, PieceKind::King, c(5, 1)).unwrap();
        b
    }

    #[test]
    fn test_checkmate() {
        let mut b = Board::new();
        b.add_piece(Color::White, PieceKind::King, c(0, 7)).unwrap();
        b.add_piece(Color::Black, PieceKind::King, c(5, 1)).unwrap();
        b.add_piece(Color::Black, PieceKind::Queen, c(1, 6)).unwrap();
        b.add_piece(Color::Black, PieceKind::Rook, c(1, 0)).unwrap();
        let before = b.clone();
        assert!(is_checkmate(&mut b, Color::White));
        assert!(!is_checkmate(&mut b, Color::Black));
        assert_eq!(b, before);
    }

    #[test]
    fn test_unprotected_attacker() {
        let mut b = kings();
        b.add_piece(Color::Black, PieceKind::Queen, c(2, 5)).unwrap();
        b.add_piece(Color::Black, PieceKind::Rook, c(4, 7)).unwrap();
        let king = b.leader(Color::White).unwrap();
        assert!(b.is_in_check(Color::White));
        assert_eq!(b.moves(king).unwrap().as_slice(), &[c(2, 5)]);
        assert!(!is_checkmate(&mut b, Color::White));
    }

    #[test]
    fn test_false_checkmate() {
        let mut b = kings();
        b.add_piece(Color::White, PieceKind::Queen, c(7, 3)).unwrap();
        b.add_piece(Color::White, PieceKind::Rook, c(3, 0)).unwrap();
        b.add_piece(Color::White, PieceKind::Rook, c(4, 4)).unwrap();
        b.add_piece(Color::White, PieceKind::Rook, c(6, 5)).unwrap();
        b.add_piece(Color::Black, PieceKind::Queen, c(4, 2)).unwrap();
        assert!(b.is_in_check(Color::Black));
        let king = b.leader(Color::Black).unwrap();
        assert_eq!(b.moves(king).unwrap().as_slice(), &[c(4, 1), c(5, 2)]);
        // the queen can also block the diagonal
        let mut game = Game::from_board(b, Color::Black);
        assert_eq!(game.checked_side(), Some(Color::Black));
        assert!(!game.is_checkmate(Color::Black));
        let queen = game.board().id_at(c(4, 2)).unwrap();
        let report = game.try_move(queen, c(6, 2)).unwrap();
        assert_eq!(report.check, None);
        assert_eq!(report.outcome, None);
    }

    #[test]
    fn test_stalemate() {
        assert!(is_stalemate(&Board::new()));
        assert!(!is_stalemate(&kings()));

        let mut b = Board::from_str("4/4/p3/4/P3/4").unwrap();
        let pawn = b.id_at(c(0, 4)).unwrap();
        assert!(b.set_first_move(pawn, false));
        assert!(!is_stalemate(&b));

        let mut game = Game::from_board(b, Color::White);
        let report = game.try_move(pawn, c(0, 3)).unwrap();
        assert_eq!(report.outcome, Some(Outcome::Draw(DrawReason::Stalemate)));
        assert!(game.is_stalemate());
        assert!(game.is_tie());
        assert_eq!(game.winner(), None);
        assert_eq!(game.score(Color::White), 0);
        assert_eq!(game.score(Color::Black), 0);
    }

    #[test]
    fn test_turns() {
        let mut game = Game::new();
        assert_eq!(game.status(), GameStatus::Running(Color::White));
        let black_pawn = game.board().id_at(c(0, 1)).unwrap();
        let white_pawn = game.board().id_at(c(0, 6)).unwrap();

        assert_eq!(
            game.try_move(black_pawn, c(0, 2)),
            Err(MoveError::WrongSide(black_pawn))
        );
        assert_eq!(
            game.try_move(PieceId(999), c(0, 2)),
            Err(MoveError::UnknownPiece(PieceId(999)))
        );
        assert_eq!(
            game.try_move(white_pawn, c(0, 3)),
            Err(MoveError::Unreachable {
                id: white_pawn,
                dst: c(0, 3)
            })
        );
        assert!(!game.can_undo());
        assert_eq!(game.board(), &Board::standard());

        assert!(game.attempt_move(white_pawn, c(0, 4)));
        assert_eq!(game.turn(), Color::Black);
        assert!(!game.attempt_move(white_pawn, c(0, 3)));
        assert!(game.attempt_move(black_pawn, c(0, 3)));
        assert_eq!(game.turn(), Color::White);
        // blocked now
        assert!(!game.attempt_move(white_pawn, c(0, 3)));
        assert_eq!(game.piece_at(c(0, 4)).map(|p| p.kind()), Some(PieceKind::Pawn));
    }

    #[test]
    fn test_undo() {
        let mut game = Game::new();
        let knight = game.board().id_at(c(1, 7)).unwrap();
        let pawn = game.board().id_at(c(3, 1)).unwrap();
        assert!(!game.undo());

        assert!(game.attempt_move(knight, c(2, 5)));
        assert!(game.attempt_move(pawn, c(3, 3)));
        assert!(game.attempt_move(knight, c(3, 3)));
        assert_eq!(game.board().player(Color::Black).captured(), &[pawn]);

        assert!(game.can_undo());
        assert!(game.undo());
        assert!(!game.undo());
        assert_eq!(game.turn(), Color::White);
        assert_eq!(game.board().id_at(c(3, 3)), Some(pawn));
        assert_eq!(game.board().id_at(c(2, 5)), Some(knight));
        assert!(game.board().piece(pawn).unwrap().is_alive());
        assert!(game.board().player(Color::Black).captured().is_empty());
        assert_eq!(game.board().player(Color::Black).len(), 16);
        assert_eq!(game.board().player(Color::Black).get(11), Some(pawn));
    }

    #[test]
    fn test_undo_first_move() {
        let mut game = Game::new();
        let before = game.board().clone();
        let pawn = game.board().id_at(c(0, 6)).unwrap();
        assert!(game.attempt_move(pawn, c(0, 4)));
        assert_eq!(game.board().piece(pawn).unwrap().first_move(), Some(false));
        assert!(game.undo());
        assert_eq!(game.board().piece(pawn).unwrap().first_move(), Some(true));
        assert_eq!(game.board(), &before);
        assert!(game.attempt_move(pawn, c(0, 4)));
    }

    #[test]
    fn test_win_by_checkmate() {
        let mut b = Board::new();
        b.add_piece(Color::White, PieceKind::King, c(0, 7)).unwrap();
        b.add_piece(Color::Black, PieceKind::King, c(5, 1)).unwrap();
        let queen = b.add_piece(Color::Black, PieceKind::Queen, c(4, 6)).unwrap();
        b.add_piece(Color::Black, PieceKind::Rook, c(1, 0)).unwrap();
        let initial = b.clone();

        let mut game = Game::from_board(b, Color::Black);
        assert_eq!(game.checked_side(), None);
        let report = game.try_move(queen, c(1, 6)).unwrap();
        assert_eq!(report.check, Some(Color::White));
        assert_eq!(
            report.outcome,
            Some(Outcome::win(Color::Black, WinReason::Checkmate))
        );
        assert_eq!(game.winner(), Some(Color::Black));
        assert_eq!(game.score(Color::Black), 1);
        assert!(game.status().is_finished());
        assert!(!game.can_undo());
        assert!(!game.undo());

        let king = game.board().leader(Color::White).unwrap();
        assert_eq!(game.try_move(king, c(1, 6)), Err(MoveError::Finished));

        game.reset();
        assert_eq!(game.board(), &initial);
        assert_eq!(game.turn(), Color::Black);
        assert_eq!(game.outcome(), None);
        assert_eq!(game.score(Color::Black), 1);
        assert!(game.attempt_move(queen, c(1, 6)));
        assert_eq!(game.score(Color::Black), 2);
    }

    #[test]
    fn test_leader_captured() {
        let mut b = Board::new();
        b.add_piece(Color::White, PieceKind::King, c(0, 7)).unwrap();
        let rook = b.add_piece(Color::White, PieceKind::Rook, c(6, 6)).unwrap();
        b.add_piece(Color::Black, PieceKind::King, c(4, 0)).unwrap();
        let enemy = b.add_piece(Color::Black, PieceKind::Rook, c(0, 0)).unwrap();

        let mut game = Game::from_board(b, Color::White);
        assert!(game.is_check());
        assert_eq!(game.checked_side(), Some(Color::White));
        let report = game.try_move(rook, c(6, 5)).unwrap();
        assert_eq!(report.check, Some(Color::White));
        assert_eq!(report.outcome, None);

        let report = game.try_move(enemy, c(0, 7)).unwrap();
        assert_eq!(
            report.outcome,
            Some(Outcome::win(Color::Black, WinReason::LeaderCaptured))
        );
        assert_eq!(game.board().leader(Color::White), None);
        assert_eq!(game.checked_side(), None);
    }

    #[test]
    fn test_storm_in_game() {
        let mut b = Board::new();
        b.add_piece(Color::White, PieceKind::King, c(7, 7)).unwrap();
        b.add_piece(Color::Black, PieceKind::King, c(0, 0)).unwrap();
        let caster = b.add_piece(Color::White, PieceKind::Caster, c(4, 4)).unwrap();
        let target = b.add_piece(Color::Black, PieceKind::Knight, c(4, 1)).unwrap();
        b.add_piece(Color::Black, PieceKind::Pawn, c(4, 0)).unwrap();
        assert!(b.set_energy(caster, STORM_ENERGY_ABOVE));

        let mut game = Game::from_board(b, Color::White);
        let before = game.board().clone();
        let report = game.try_move(caster, c(4, 1)).unwrap();
        assert_eq!(report.kind, MoveKind::Storm);
        assert_eq!(report.victims.len(), 2);
        assert!(report.victims.contains(&target));
        assert_eq!(game.board().piece(caster).unwrap().pos(), c(4, 4));
        assert_eq!(game.board().piece(caster).unwrap().energy(), Some(0));
        assert!(game.undo());
        assert_eq!(game.board(), &before);
    }

    #[test]
    fn test_forfeit_and_tie() {
        let mut game = Game::new();
        assert!(game.forfeit(Color::White));
        assert_eq!(
            game.outcome(),
            Some(Outcome::win(Color::Black, WinReason::Forfeit))
        );
        assert!(!game.forfeit(Color::Black));
        assert!(!game.force_tie());
        assert_eq!(game.score(Color::Black), 1);

        game.reset();
        assert!(game.force_tie());
        assert!(game.is_tie());
        assert_eq!(game.status(), GameStatus::Finished(Outcome::Draw(DrawReason::Agreement)));
        assert_eq!(game.score(Color::White), 0);
        assert_eq!(game.score(Color::Black), 1);
    }

    fn check_invariants(board: &Board) {
        for (id, p) in board.pieces() {
            assert_eq!(board.id_at(p.pos()), Some(id));
            assert!(board.player(p.color()).contains(id));
            assert!(!board.player(p.color()).captured().contains(&id));
            if p.is_leader() {
                let enemies = board.pieces().filter(|(_, e)| e.color() != p.color());
                for (_, e) in enemies {
                    for dst in p.moves() {
                        assert!(!e.can_move_to(*dst));
                    }
                }
            }
        }
        for color in Color::iter() {
            for id in board.player(color).captured() {
                assert!(!board.piece(*id).unwrap().is_alive());
            }
        }
    }

    fn random_playout(board: Board, seed: u64, plies: usize) {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let mut game = Game::from_board(board, Color::White);
        for _ in 0..plies {
            check_invariants(game.board());
            let turn = game.turn();
            let moves: Vec<(PieceId, Coord)> = game
                .board()
                .pieces()
                .filter(|(_, p)| p.color() == turn)
                .flat_map(|(id, p)| p.moves().iter().map(move |&dst| (id, dst)))
                .collect();
            if moves.is_empty() {
                break;
            }
            let (id, dst) = moves[rng.gen_range(0..moves.len())];

            let before = game.board().clone();
            let check = game.checked_side();
            let report = game.try_move(id, dst).unwrap();
            if report.outcome.is_some() {
                assert!(!game.undo());
                break;
            }
            assert!(game.undo());
            assert_eq!(game.board(), &before);
            assert_eq!(game.turn(), turn);
            assert_eq!(game.checked_side(), check);
            assert!(!game.undo());

            assert_eq!(game.try_move(id, dst), Ok(report));
        }
    }

    #[test]
    fn test_random_standard() {
        for seed in 0..8 {
            random_playout(Board::standard(), seed, 120);
        }
    }

    #[test]
    fn test_random_variant() {
        let mut b = Board::new();
        b.setup(Layout::Standard).unwrap();
        for (x, y) in [(1, 0), (1, 7)] {
            b.remove_piece(c(x, y)).unwrap();
        }
        for (x, y) in [(6, 0), (6, 7)] {
            b.remove_piece(c(x, y)).unwrap();
        }
        b.add_piece(Color::Black, PieceKind::Sniper, c(1, 0)).unwrap();
        b.add_piece(Color::White, PieceKind::Sniper, c(1, 7)).unwrap();
        let bc = b.add_piece(Color::Black, PieceKind::Caster, c(6, 0)).unwrap();
        let wc = b.add_piece(Color::White, PieceKind::Caster, c(6, 7)).unwrap();
        b.set_energy(bc, 3);
        b.set_energy(wc, 3);
        for seed in 100..108 {
            random_playout(b.clone(), seed, 150);
        }
    }
}
