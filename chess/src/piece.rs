//! Pieces and their move generation

use crate::movelist::MoveList;
use crate::types::{Color, Coord, Delta, Dims, PieceKind};

use stormchess_base::geometry;
use stormchess_base::Bitboard;

/// Maximum distance at which a sniper can hit an enemy caster
pub const SNIPE_RANGE: u8 = 5;

/// Energy a caster needs before it can cast a storm
pub const STORM_ENERGY: u8 = 4;

/// Distances straight ahead or behind at which a caster can target a storm
pub const STORM_DISTANCES: [i8; 2] = [3, 4];

/// Read-only view of the board occupancy, used to generate moves
pub trait Occupancy {
    fn dims(&self) -> Dims;

    /// Returns the live piece standing on `c`, if any
    fn occupant(&self, c: Coord) -> Option<&Piece>;

    fn is_free(&self, c: Coord) -> bool {
        self.occupant(c).is_none()
    }
}

/// Kind of the piece together with its kind-specific state
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PieceState {
    Pawn { first_move: bool },
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
    Sniper,
    Caster { energy: u8 },
}

impl PieceState {
    /// Returns the state of a freshly placed piece of kind `kind`
    pub const fn new(kind: PieceKind) -> PieceState {
        match kind {
            PieceKind::Pawn => PieceState::Pawn { first_move: true },
            PieceKind::Knight => PieceState::Knight,
            PieceKind::Bishop => PieceState::Bishop,
            PieceKind::Rook => PieceState::Rook,
            PieceKind::Queen => PieceState::Queen,
            PieceKind::King => PieceState::King,
            PieceKind::Sniper => PieceState::Sniper,
            PieceKind::Caster => PieceState::Caster { energy: 0 },
        }
    }

    pub const fn kind(&self) -> PieceKind {
        match *self {
            PieceState::Pawn { .. } => PieceKind::Pawn,
            PieceState::Knight => PieceKind::Knight,
            PieceState::Bishop => PieceKind::Bishop,
            PieceState::Rook => PieceKind::Rook,
            PieceState::Queen => PieceKind::Queen,
            PieceState::King => PieceKind::King,
            PieceState::Sniper => PieceKind::Sniper,
            PieceState::Caster { .. } => PieceKind::Caster,
        }
    }
}

/// Effect of moving a piece to one of the cells in its move list
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MoveKind {
    /// Relocation, possibly capturing the piece on the destination
    Step,
    /// Pawn advancing two cells on its first move
    DoubleStep,
    /// Sniper hits a caster from a distance and stays in place
    Snipe,
    /// Caster hits the destination and its column neighbours and stays in place
    Storm,
}

impl MoveKind {
    /// Returns `true` if the moving piece doesn't leave its cell
    pub const fn is_ranged(&self) -> bool {
        matches!(*self, MoveKind::Snipe | MoveKind::Storm)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    pub(crate) color: Color,
    pub(crate) pos: Coord,
    pub(crate) alive: bool,
    pub(crate) state: PieceState,
    pub(crate) moves: MoveList,
}

impl Piece {
    pub fn new(color: Color, kind: PieceKind, pos: Coord) -> Piece {
        Piece {
            color,
            pos,
            alive: true,
            state: PieceState::new(kind),
            moves: MoveList::new(),
        }
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn kind(&self) -> PieceKind {
        self.state.kind()
    }

    pub fn pos(&self) -> Coord {
        self.pos
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn state(&self) -> PieceState {
        self.state
    }

    pub fn is_leader(&self) -> bool {
        self.kind().is_leader()
    }

    pub fn is_enemy(&self, other: &Piece) -> bool {
        self.color != other.color
    }

    /// Returns the first-move flag for pawns, `None` for other kinds
    pub fn first_move(&self) -> Option<bool> {
        match self.state {
            PieceState::Pawn { first_move } => Some(first_move),
            _ => None,
        }
    }

    /// Returns the accumulated energy for casters, `None` for other kinds
    pub fn energy(&self) -> Option<u8> {
        match self.state {
            PieceState::Caster { energy } => Some(energy),
            _ => None,
        }
    }

    /// Returns `true` if the piece is a caster charged enough to cast a storm
    pub fn is_charged(&self) -> bool {
        matches!(self.state, PieceState::Caster { energy } if energy >= STORM_ENERGY)
    }

    /// Destinations computed by the last refresh of the board
    pub fn moves(&self) -> &MoveList {
        &self.moves
    }

    pub fn can_move_to(&self, c: Coord) -> bool {
        self.moves.has(c)
    }

    pub fn as_char(&self) -> char {
        let c = self.kind().as_char();
        match self.color {
            Color::White => c,
            Color::Black => c.to_ascii_lowercase(),
        }
    }

    pub fn as_utf8_char(&self) -> char {
        self.kind().as_utf8_char(self.color)
    }

    /// Tells what moving to `dst` would do, or returns `None` if `dst` is not in the move list
    pub fn classify(&self, dst: Coord) -> Option<MoveKind> {
        if !self.can_move_to(dst) {
            return None;
        }
        let delta = self.pos.delta_to(dst);
        let kind = match self.state {
            PieceState::Pawn { .. } if delta.dy.abs() == 2 => MoveKind::DoubleStep,
            PieceState::Sniper if delta.steps() >= 2 => MoveKind::Snipe,
            PieceState::Caster { .. } if delta.steps() >= 2 => MoveKind::Storm,
            _ => MoveKind::Step,
        };
        Some(kind)
    }

    /// Computes the destinations of this piece against `occ`
    ///
    /// `threats` is consulted only for the leader, which never moves onto a threatened
    /// cell. Other kinds ignore it.
    pub fn compute_moves<O: Occupancy + ?Sized>(&self, occ: &O, threats: Bitboard) -> MoveList {
        let mut out = MoveList::new();
        match self.state {
            PieceState::Pawn { first_move } => self.gen_pawn(occ, first_move, &mut out),
            PieceState::Knight => self.gen_offsets(occ, &geometry::KNIGHT, &mut out),
            PieceState::Bishop => self.gen_rays(occ, &geometry::DIAGONAL, &mut out),
            PieceState::Rook => self.gen_rays(occ, &geometry::ORTHOGONAL, &mut out),
            PieceState::Queen => self.gen_rays(occ, &geometry::ADJACENT, &mut out),
            PieceState::King => {
                self.gen_offsets(occ, &geometry::ADJACENT, &mut out);
                out.retain(|c| !threats.has(*c));
            }
            PieceState::Sniper => {
                self.gen_offsets(occ, &geometry::ADJACENT, &mut out);
                self.gen_snipes(occ, &mut out);
            }
            PieceState::Caster { energy } => {
                self.gen_offsets(occ, &geometry::ADJACENT, &mut out);
                if energy >= STORM_ENERGY {
                    self.gen_storms(occ, &mut out);
                }
            }
        }
        out
    }

    /// Cells this piece controls, regardless of what stands on them
    ///
    /// Unlike the move list, this includes cells holding allies, the first blocker of
    /// every ray and the diagonals of pawns. Used to find cells unsafe for the enemy leader.
    pub fn attacks<O: Occupancy + ?Sized>(&self, occ: &O) -> Bitboard {
        let dims = occ.dims();
        let mut res = Bitboard::EMPTY;
        let near = |deltas: &[Delta], res: &mut Bitboard| {
            for d in deltas {
                if let Some(c) = dims.shift(self.pos, *d) {
                    res.set(c);
                }
            }
        };
        match self.state {
            PieceState::Pawn { .. } => {
                let fwd = geometry::forward(self.color);
                near(&[fwd + Delta::new(-1, 0), fwd + Delta::new(1, 0)], &mut res);
            }
            PieceState::Knight => near(&geometry::KNIGHT, &mut res),
            PieceState::King | PieceState::Sniper => near(&geometry::ADJACENT, &mut res),
            PieceState::Bishop => self.attack_rays(occ, &geometry::DIAGONAL, &mut res),
            PieceState::Rook => self.attack_rays(occ, &geometry::ORTHOGONAL, &mut res),
            PieceState::Queen => self.attack_rays(occ, &geometry::ADJACENT, &mut res),
            PieceState::Caster { energy } => {
                near(&geometry::ADJACENT, &mut res);
                if energy >= STORM_ENERGY {
                    // target cells and the cells hit around them
                    for dist in 2..=5 {
                        near(&[Delta::new(0, dist), Delta::new(0, -dist)], &mut res);
                    }
                }
            }
        }
        res
    }

    fn gen_offsets<O: Occupancy + ?Sized>(&self, occ: &O, deltas: &[Delta], out: &mut MoveList) {
        let dims = occ.dims();
        for d in deltas {
            let Some(dst) = dims.shift(self.pos, *d) else {
                continue;
            };
            match occ.occupant(dst) {
                Some(p) if !self.is_enemy(p) => {}
                _ => out.add(dst),
            }
        }
    }

    fn gen_rays<O: Occupancy + ?Sized>(&self, occ: &O, dirs: &[Delta], out: &mut MoveList) {
        for dir in dirs {
            self.walk_ray(occ, self.pos, *dir, out);
        }
    }

    fn walk_ray<O: Occupancy + ?Sized>(
        &self,
        occ: &O,
        from: Coord,
        dir: Delta,
        out: &mut MoveList,
    ) {
        let Some(next) = occ.dims().shift(from, dir) else {
            return;
        };
        match occ.occupant(next) {
            None => {
                out.add(next);
                self.walk_ray(occ, next, dir, out);
            }
            Some(p) if self.is_enemy(p) => out.add(next),
            Some(_) => {}
        }
    }

    fn attack_rays<O: Occupancy + ?Sized>(&self, occ: &O, dirs: &[Delta], res: &mut Bitboard) {
        let dims = occ.dims();
        for dir in dirs {
            let mut cur = self.pos;
            while let Some(next) = dims.shift(cur, *dir) {
                res.set(next);
                if !occ.is_free(next) {
                    break;
                }
                cur = next;
            }
        }
    }

    fn gen_pawn<O: Occupancy + ?Sized>(&self, occ: &O, first_move: bool, out: &mut MoveList) {
        let dims = occ.dims();
        let fwd = geometry::forward(self.color);
        if let Some(one) = dims.shift(self.pos, fwd) {
            if occ.is_free(one) {
                out.add(one);
                if first_move {
                    if let Some(two) = dims.shift(one, fwd) {
                        if occ.is_free(two) {
                            out.add(two);
                        }
                    }
                }
            }
        }
        for side in [Delta::new(-1, 0), Delta::new(1, 0)] {
            let Some(dst) = dims.shift(self.pos, fwd + side) else {
                continue;
            };
            if matches!(occ.occupant(dst), Some(p) if self.is_enemy(p)) {
                out.add(dst);
            }
        }
    }

    fn gen_snipes<O: Occupancy + ?Sized>(&self, occ: &O, out: &mut MoveList) {
        let dims = occ.dims();
        for dir in geometry::ADJACENT {
            for dist in 1..=SNIPE_RANGE as i8 {
                let Some(dst) = dims.shift(self.pos, dir.scaled(dist)) else {
                    break;
                };
                // allies don't block the shot
                let Some(p) = occ.occupant(dst).filter(|p| self.is_enemy(p)) else {
                    continue;
                };
                // adjacent targets are already covered by a plain step
                if dist >= 2 && p.kind() == PieceKind::Caster {
                    out.add(dst);
                }
                break;
            }
        }
    }

    fn gen_storms<O: Occupancy + ?Sized>(&self, occ: &O, out: &mut MoveList) {
        let dims = occ.dims();
        for dist in STORM_DISTANCES {
            for dy in [dist, -dist] {
                let Some(dst) = dims.shift(self.pos, Delta::new(0, dy)) else {
                    continue;
                };
                if matches!(occ.occupant(dst), Some(p) if self.is_enemy(p)) {
                    out.add(dst);
                }
            }
        }
    }
}
