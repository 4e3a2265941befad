//! Board and related things

use crate::movelist::MoveList;
use crate::piece::{MoveKind, Occupancy, Piece, PieceState};
use crate::player::Player;
use crate::types::{Color, Coord, Delta, Dims, DimsError, PieceId, PieceKind};

use stormchess_base::geometry;
use stormchess_base::Bitboard;

use arrayvec::ArrayVec;
use std::fmt::{self, Display};
use std::str::FromStr;
use thiserror::Error;
use tracing::trace;

/// Error setting up the initial position
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum SetupError {
    /// Standard layout needs a full-size board
    #[error("standard layout needs an 8x8 board, got {0}")]
    BadDims(Dims),
}

/// Error parsing a [`Board`] from its string form
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum BoardParseError {
    /// Row is longer than the first one, or longer than the board can be
    #[error("too many items in row {0}")]
    RowOverflow(usize),
    /// Row is shorter than the first one
    #[error("not enough items in row {0}")]
    RowUnderflow(usize),
    /// Unexpected character
    #[error("unexpected char {0:?}")]
    UnexpectedChar(char),
    /// Board has unsupported size
    #[error("bad board size: {0}")]
    Dims(#[from] DimsError),
}

/// Initial position of the board
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum Layout {
    /// Board without any pieces
    #[default]
    Empty,
    /// Two rows of pawns and the usual back rows
    Standard,
}

const BACK_ROW: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

/// Piece removed from play by a move
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Victim {
    id: PieceId,
    pos: Coord,
    roster_index: Option<usize>,
}

impl Victim {
    pub fn id(&self) -> PieceId {
        self.id
    }

    pub fn pos(&self) -> Coord {
        self.pos
    }
}

/// Everything needed to take back a move made by [`Board::make_move()`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRecord {
    mover: PieceId,
    from: Coord,
    to: Coord,
    kind: MoveKind,
    prev_state: PieceState,
    victims: ArrayVec<Victim, 3>,
}

impl MoveRecord {
    pub fn mover(&self) -> PieceId {
        self.mover
    }

    pub fn from(&self) -> Coord {
        self.from
    }

    pub fn to(&self) -> Coord {
        self.to
    }

    pub fn kind(&self) -> MoveKind {
        self.kind
    }

    /// State of the moving piece before the move (first-move flag, energy)
    pub fn prev_state(&self) -> PieceState {
        self.prev_state
    }

    /// Pieces removed from play, in removal order
    pub fn victims(&self) -> &[Victim] {
        &self.victims
    }
}

/// Board with pieces, rosters and up-to-date move lists
///
/// Pieces live in an arena and are referred to by [`PieceId`]. A captured piece stays in
/// the arena with its liveness flag cleared, so it can be revived by [`Board::unmake_move()`].
///
/// Every mutating method ends with a board-wide refresh, so the move lists of all the
/// pieces always match the current occupancy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    dims: Dims,
    cells: [Option<PieceId>; 64],
    pieces: Vec<Piece>,
    players: [Player; 2],
}

/// View of the board with one cell treated as empty
///
/// Hiding the leader lets rays pass through its cell, so stepping back along the line of
/// an attack is not considered safe.
struct Hidden<'a> {
    board: &'a Board,
    hidden: Option<Coord>,
}

impl<'a> Occupancy for Hidden<'a> {
    fn dims(&self) -> Dims {
        self.board.dims
    }

    fn occupant(&self, c: Coord) -> Option<&Piece> {
        if self.hidden == Some(c) {
            return None;
        }
        self.board.occupant(c)
    }
}

impl Occupancy for Board {
    fn dims(&self) -> Dims {
        self.dims
    }

    fn occupant(&self, c: Coord) -> Option<&Piece> {
        self.get(c)
    }
}

impl Board {
    /// Creates an empty 8×8 board
    pub fn new() -> Board {
        Board::with_dims(Dims::STANDARD)
    }

    /// Creates an empty board of given size
    pub fn with_dims(dims: Dims) -> Board {
        Board {
            dims,
            cells: [None; 64],
            pieces: Vec::new(),
            players: [Player::new(Color::White), Player::new(Color::Black)],
        }
    }

    /// Creates an 8×8 board with the standard layout
    pub fn standard() -> Board {
        let mut board = Board::new();
        board.fill_standard();
        board
    }

    /// Removes all the pieces and puts the pieces of `layout` instead
    pub fn setup(&mut self, layout: Layout) -> Result<(), SetupError> {
        match layout {
            Layout::Empty => self.clear(),
            Layout::Standard => {
                if self.dims != Dims::STANDARD {
                    return Err(SetupError::BadDims(self.dims));
                }
                self.fill_standard();
            }
        }
        Ok(())
    }

    fn fill_standard(&mut self) {
        self.clear_silent();
        let dims = self.dims;
        for c in dims.cells() {
            for color in [Color::Black, Color::White] {
                // the arena is empty, so ids never run out here
                if c.y() == geometry::back_row(color) {
                    let _ = self.place(color, BACK_ROW[c.x()], c);
                } else if c.y() == geometry::pawn_row(color) {
                    let _ = self.place(color, PieceKind::Pawn, c);
                }
            }
        }
        self.refresh_moves();
    }

    pub fn dims(&self) -> Dims {
        self.dims
    }

    /// Returns the id of the live piece on `c`
    pub fn id_at(&self, c: Coord) -> Option<PieceId> {
        if !self.dims.contains(c) {
            return None;
        }
        self.cells[c.index()]
    }

    /// Returns the live piece on `c`
    pub fn get(&self, c: Coord) -> Option<&Piece> {
        self.id_at(c).map(|id| &self.pieces[id.index()])
    }

    /// Same as [`Board::get()`], but out-of-range coordinates yield `None`
    pub fn at(&self, x: usize, y: usize) -> Option<&Piece> {
        self.get(Coord::new(x, y)?)
    }

    /// Returns the piece with the given id, dead or alive
    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.get(id.index())
    }

    /// Iterates over all the live pieces
    pub fn pieces(&self) -> impl Iterator<Item = (PieceId, &Piece)> + '_ {
        self.pieces
            .iter()
            .enumerate()
            .filter(|(_, p)| p.alive)
            .map(|(i, p)| (PieceId(i as u16), p))
    }

    pub fn player(&self, color: Color) -> &Player {
        &self.players[color.index()]
    }

    /// Returns the first live piece of kind `kind` in the roster of `color`
    pub fn piece_of_kind(&self, color: Color, kind: PieceKind) -> Option<PieceId> {
        self.player(color)
            .roster()
            .iter()
            .copied()
            .find(|id| self.pieces[id.index()].kind() == kind)
    }

    /// Returns the leader of `color`, or `None` if it is out of play
    pub fn leader(&self, color: Color) -> Option<PieceId> {
        self.piece_of_kind(color, PieceKind::King)
    }

    pub fn moves(&self, id: PieceId) -> Option<&MoveList> {
        self.piece(id).map(Piece::moves)
    }

    pub fn can_move_to(&self, id: PieceId, c: Coord) -> bool {
        self.piece(id)
            .map_or(false, |p| p.alive && p.can_move_to(c))
    }

    /// Returns `true` if some enemy of `color` can move onto its leader
    pub fn is_in_check(&self, color: Color) -> bool {
        let Some(leader) = self.leader(color) else {
            return false;
        };
        let pos = self.pieces[leader.index()].pos;
        self.pieces()
            .any(|(_, p)| p.color != color && p.can_move_to(pos))
    }

    /// Returns `true` if at least one live piece of either side can move
    pub fn has_any_moves(&self) -> bool {
        self.pieces().any(|(_, p)| !p.moves.is_empty())
    }

    /// Cells the leader of `color` must not step onto
    ///
    /// This is the union of the enemy move lists and the cells enemy pieces control,
    /// computed with the leader itself taken off the board.
    pub fn threats(&self, color: Color) -> Bitboard {
        let hidden = self.leader(color).map(|id| self.pieces[id.index()].pos);
        self.threats_hiding(color, hidden)
    }

    fn threats_hiding(&self, color: Color, hidden: Option<Coord>) -> Bitboard {
        let view = Hidden {
            board: self,
            hidden,
        };
        let mut res = Bitboard::EMPTY;
        for (_, p) in self.pieces() {
            if p.color == color {
                continue;
            }
            res |= p.attacks(&view);
            if !p.is_leader() {
                res |= p.moves.to_bitboard();
            }
        }
        res
    }

    /// Adds a new piece on `c`
    ///
    /// Returns `None` if `c` is outside the board or already occupied, or if the board has
    /// run out of piece ids. Removed pieces keep their ids, so ids are only reclaimed by
    /// [`Board::clear()`].
    pub fn add_piece(&mut self, color: Color, kind: PieceKind, c: Coord) -> Option<PieceId> {
        if !self.dims.contains(c) || self.cells[c.index()].is_some() {
            return None;
        }
        let id = self.place(color, kind, c)?;
        self.refresh_moves();
        Some(id)
    }

    fn place(&mut self, color: Color, kind: PieceKind, c: Coord) -> Option<PieceId> {
        let id = PieceId(u16::try_from(self.pieces.len()).ok()?);
        self.pieces.push(Piece::new(color, kind, c));
        self.cells[c.index()] = Some(id);
        self.players[color.index()].add(id);
        Some(id)
    }

    /// Takes the piece on `c` off the board without recording it as captured
    pub fn remove_piece(&mut self, c: Coord) -> Option<PieceId> {
        let id = self.id_at(c)?;
        self.cells[c.index()] = None;
        let piece = &mut self.pieces[id.index()];
        piece.alive = false;
        piece.moves.clear();
        let color = piece.color;
        self.players[color.index()].remove(id);
        self.refresh_moves();
        Some(id)
    }

    /// Sets the first-move flag of a pawn, returns `false` for other pieces
    pub fn set_first_move(&mut self, id: PieceId, value: bool) -> bool {
        match self.pieces.get_mut(id.index()) {
            Some(Piece {
                state: PieceState::Pawn { first_move },
                ..
            }) => *first_move = value,
            _ => return false,
        }
        self.refresh_moves();
        true
    }

    /// Sets the energy of a caster, returns `false` for other pieces
    pub fn set_energy(&mut self, id: PieceId, value: u8) -> bool {
        match self.pieces.get_mut(id.index()) {
            Some(Piece {
                state: PieceState::Caster { energy },
                ..
            }) => *energy = value,
            _ => return false,
        }
        self.refresh_moves();
        true
    }

    /// Removes all the pieces, keeping the dimensions
    pub fn clear(&mut self) {
        self.clear_silent();
        self.refresh_moves();
    }

    fn clear_silent(&mut self) {
        self.cells = [None; 64];
        self.pieces.clear();
        for p in &mut self.players {
            p.clear();
        }
    }

    /// Recomputes the move lists of all the pieces
    ///
    /// Leaders go last, as their moves depend on the move lists of the enemy pieces.
    pub fn refresh_moves(&mut self) {
        trace!(pieces = self.pieces.len(), "refreshing move lists");
        for i in 0..self.pieces.len() {
            let piece = &self.pieces[i];
            if piece.alive && piece.is_leader() {
                continue;
            }
            let moves = if piece.alive {
                piece.compute_moves(&*self, Bitboard::EMPTY)
            } else {
                MoveList::new()
            };
            self.pieces[i].moves = moves;
        }
        for i in 0..self.pieces.len() {
            let piece = &self.pieces[i];
            if !piece.alive || !piece.is_leader() {
                continue;
            }
            let threats = self.threats_hiding(piece.color, Some(piece.pos));
            trace!(color = %piece.color, ?threats, "leader threats");
            let moves = piece.compute_moves(&*self, threats);
            self.pieces[i].moves = moves;
        }
    }

    /// Makes a move from the move list of `id` and returns the record to take it back
    ///
    /// Returns `None` and leaves the board intact if `id` is not a live piece or `dst` is
    /// not in its move list.
    pub fn make_move(&mut self, id: PieceId, dst: Coord) -> Option<MoveRecord> {
        let piece = self.pieces.get(id.index())?;
        if !piece.alive {
            return None;
        }
        let kind = piece.classify(dst)?;
        let from = piece.pos;
        let prev_state = piece.state;

        let mut victims = ArrayVec::new();
        match kind {
            MoveKind::Step | MoveKind::DoubleStep | MoveKind::Snipe => {
                if let Some(victim) = self.cells[dst.index()] {
                    self.capture(victim, &mut victims);
                }
            }
            MoveKind::Storm => {
                for dy in [0, 1, -1] {
                    let Some(c) = self.dims.shift(dst, Delta::new(0, dy)) else {
                        continue;
                    };
                    if let Some(victim) = self.cells[c.index()] {
                        self.capture(victim, &mut victims);
                    }
                }
            }
        }

        if !kind.is_ranged() {
            self.cells[from.index()] = None;
            self.cells[dst.index()] = Some(id);
            self.pieces[id.index()].pos = dst;
        }

        let piece = &mut self.pieces[id.index()];
        piece.state = match piece.state {
            PieceState::Pawn { .. } => PieceState::Pawn { first_move: false },
            PieceState::Caster { .. } if kind == MoveKind::Storm => {
                PieceState::Caster { energy: 0 }
            }
            PieceState::Caster { energy } => PieceState::Caster {
                energy: energy.saturating_add(1),
            },
            state => state,
        };

        trace!(%id, %from, %dst, ?kind, victims = victims.len(), "made move");
        self.refresh_moves();
        Some(MoveRecord {
            mover: id,
            from,
            to: dst,
            kind,
            prev_state,
            victims,
        })
    }

    fn capture(&mut self, id: PieceId, victims: &mut ArrayVec<Victim, 3>) {
        let piece = &mut self.pieces[id.index()];
        piece.alive = false;
        piece.moves.clear();
        let (pos, color) = (piece.pos, piece.color);
        self.cells[pos.index()] = None;
        let roster_index = self.players[color.index()].capture(id);
        victims.push(Victim {
            id,
            pos,
            roster_index,
        });
    }

    /// Takes back a move made by [`Board::make_move()`]
    ///
    /// `rec` must be the record of the last move made on this board.
    pub fn unmake_move(&mut self, rec: &MoveRecord) {
        let mover = &mut self.pieces[rec.mover.index()];
        let cur = mover.pos;
        mover.pos = rec.from;
        mover.state = rec.prev_state;
        if self.cells[cur.index()] == Some(rec.mover) {
            self.cells[cur.index()] = None;
        }
        self.cells[rec.from.index()] = Some(rec.mover);

        for v in rec.victims.iter().rev() {
            let piece = &mut self.pieces[v.id.index()];
            piece.alive = true;
            piece.pos = v.pos;
            let color = piece.color;
            self.cells[v.pos.index()] = Some(v.id);
            if let Some(index) = v.roster_index {
                self.players[color.index()].revive(v.id, index);
            }
        }
        self.refresh_moves();
    }

    /// Attempts to move `id` onto `dst`, returns `true` on success
    pub fn move_piece(&mut self, id: PieceId, dst: Coord) -> bool {
        self.make_move(id, dst).is_some()
    }

    /// Wraps the board to allow pretty-printing with the given style `Style`
    ///
    /// The resulting wrapper implements [`fmt::Display`], so can be used with
    /// `write!()`, `println!()`, or `ToString::to_string`.
    ///
    /// # Example
    ///
    /// ```
    /// # use stormchess::board::{Board, PrettyStyle};
    /// #
    /// let b = Board::standard();
    ///
    /// let res = r#"
    /// 0|rnbqkbnr
    /// 1|pppppppp
    /// 2|........
    /// 3|........
    /// 4|........
    /// 5|........
    /// 6|PPPPPPPP
    /// 7|RNBQKBNR
    /// -+--------
    ///  |01234567
    /// "#;
    /// assert_eq!(b.pretty(PrettyStyle::Ascii).to_string().trim(), res.trim());
    /// ```
    pub fn pretty(&self, style: PrettyStyle) -> Pretty<'_> {
        Pretty { board: self, style }
    }
}

impl Default for Board {
    fn default() -> Board {
        Board::new()
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        for y in 0..self.dims.height() {
            if y != 0 {
                write!(f, "/")?;
            }
            let mut empty = 0;
            for x in 0..self.dims.width() {
                let Some(p) = self.get(Coord::from_parts(x, y)) else {
                    empty += 1;
                    continue;
                };
                if empty != 0 {
                    write!(f, "{}", empty)?;
                    empty = 0;
                }
                write!(f, "{}", p.as_char())?;
            }
            if empty != 0 {
                write!(f, "{}", empty)?;
            }
        }
        Ok(())
    }
}

type Row = ArrayVec<Option<(Color, PieceKind)>, { Dims::MAX_SIDE }>;

fn parse_row(s: &str, y: usize) -> Result<Row, BoardParseError> {
    type Error = BoardParseError;

    let mut row = Row::new();
    for ch in s.chars() {
        match ch {
            '1'..='8' => {
                let add = ch as usize - '0' as usize;
                if row.len() + add > Dims::MAX_SIDE {
                    return Err(Error::RowOverflow(y));
                }
                for _ in 0..add {
                    row.push(None);
                }
            }
            _ => {
                let kind = PieceKind::from_char(ch).ok_or(Error::UnexpectedChar(ch))?;
                let color = if ch.is_ascii_uppercase() {
                    Color::White
                } else {
                    Color::Black
                };
                row.try_push(Some((color, kind)))
                    .map_err(|_| Error::RowOverflow(y))?;
            }
        }
    }
    Ok(row)
}

impl FromStr for Board {
    type Err = BoardParseError;

    /// Parses the board from the form produced by [`Display`]
    ///
    /// Rows go from top to bottom and are separated by `/`. Board size is taken from
    /// the input. Pawns standing on the second row from their own edge keep their
    /// first-move flag.
    fn from_str(s: &str) -> Result<Board, Self::Err> {
        type Error = BoardParseError;

        let mut rows = Vec::new();
        for (y, part) in s.trim().split('/').enumerate() {
            let row = parse_row(part, y)?;
            if let Some(first) = rows.first().map(Row::len) {
                if row.len() > first {
                    return Err(Error::RowOverflow(y));
                }
                if row.len() < first {
                    return Err(Error::RowUnderflow(y));
                }
            }
            rows.push(row);
        }
        let width = rows.first().map_or(0, Row::len);
        let dims = Dims::new(width, rows.len())?;

        let mut board = Board::with_dims(dims);
        for (y, row) in rows.iter().enumerate() {
            for (x, cell) in row.iter().enumerate() {
                let Some((color, kind)) = *cell else {
                    continue;
                };
                let Some(id) = board.place(color, kind, Coord::from_parts(x, y)) else {
                    continue;
                };
                let start = match color {
                    Color::White => dims.height() - 2,
                    Color::Black => 1,
                };
                if let PieceState::Pawn { first_move } = &mut board.pieces[id.index()].state {
                    *first_move = y == start;
                }
            }
        }
        board.refresh_moves();
        Ok(board)
    }
}

/// Style for [`Board::pretty()`]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PrettyStyle {
    /// Print pieces and frames as ASCII characters
    Ascii,
    /// Print pieces and frames as fancy Unicode characters
    Utf8,
}

/// Wrapper to pretty-print the board
///
/// See docs for [`Board::pretty()`] for more details.
pub struct Pretty<'a> {
    board: &'a Board,
    style: PrettyStyle,
}

trait StyleTable {
    const HORZ_FRAME: char;
    const VERT_FRAME: char;
    const ANGLE_FRAME: char;
    const EMPTY: char = '.';

    fn piece(p: &Piece) -> char;

    fn fmt(b: &Board, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        let dims = b.dims();
        for y in 0..dims.height() {
            write!(f, "{}{}", y, Self::VERT_FRAME)?;
            for x in 0..dims.width() {
                match b.get(Coord::from_parts(x, y)) {
                    Some(p) => write!(f, "{}", Self::piece(p))?,
                    None => write!(f, "{}", Self::EMPTY)?,
                }
            }
            writeln!(f)?;
        }
        write!(f, "{}{}", Self::HORZ_FRAME, Self::ANGLE_FRAME)?;
        for _ in 0..dims.width() {
            write!(f, "{}", Self::HORZ_FRAME)?;
        }
        writeln!(f)?;
        write!(f, " {}", Self::VERT_FRAME)?;
        for x in 0..dims.width() {
            write!(f, "{}", x)?;
        }
        writeln!(f)?;
        Ok(())
    }
}

struct AsciiStyleTable;
struct Utf8StyleTable;

impl StyleTable for AsciiStyleTable {
    const HORZ_FRAME: char = '-';
    const VERT_FRAME: char = '|';
    const ANGLE_FRAME: char = '+';

    fn piece(p: &Piece) -> char {
        p.as_char()
    }
}

impl StyleTable for Utf8StyleTable {
    const HORZ_FRAME: char = '─';
    const VERT_FRAME: char = '│';
    const ANGLE_FRAME: char = '┼';

    fn piece(p: &Piece) -> char {
        p.as_utf8_char()
    }
}

impl<'a> Display for Pretty<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self.style {
            PrettyStyle::Ascii => AsciiStyleTable::fmt(self.board, f),
            PrettyStyle::Utf8 => Utf8StyleTable::fmt(self.board, f),
        }
    }
}
