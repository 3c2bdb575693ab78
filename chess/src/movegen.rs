//! Attack tracing and move generation

use crate::bitboard::Bitboard;
use crate::board::{Board, RawBoard};
use crate::moves::{Move, MoveKind, PromotePiece};
use crate::piece::{Piece, Target, DIAG_DIRS, KING_OFFSETS, KNIGHT_OFFSETS, LINE_DIRS};
use crate::types::{CastlingSide, Color, Coord, PieceKind};
use crate::{castling, geometry, legal};

use std::convert::Infallible;
use std::ops::{Deref, DerefMut};
use std::slice;

use arrayvec::ArrayVec;
use thiserror::Error;

/// Error indicating that a [`Piece`] handle does not describe the board it is used with
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum InvalidPieceReference {
    /// There is no piece on the square anymore
    #[error("no piece on {0}")]
    Vacant(Coord),
    /// Another piece stands on the square
    #[error("piece on {0} does not match the handle")]
    Mismatch(Coord),
    /// The piece belongs to the side which is not to move
    #[error("piece on {0} does not belong to the side to move")]
    NotToMove(Coord),
    /// The square does not exist on this board
    #[error("square {0} is out of board")]
    OutOfBoard(Coord),
}

/// Calls `visit` for every piece of color `by` which attacks `target`, until `visit` returns `true`
///
/// Returns `true` if the iteration was stopped by `visit`. The attacks are traced in reverse, from
/// the target square, so the cost doesn't depend on the number of pieces on the board.
fn trace_attackers(
    r: &RawBoard,
    target: Coord,
    by: Color,
    mut visit: impl FnMut(Coord) -> bool,
) -> bool {
    let dims = r.dims;
    let mut check = |c: Option<Coord>, kind: PieceKind| match c {
        Some(c) => r.get(c).is(by, kind) && visit(c),
        None => false,
    };

    // Pawns of color `by` attack forward, so look backwards from the target
    let back = -geometry::pawn_forward_delta(by);
    for df in [-1, 1] {
        if check(dims.shift(target, df, back), PieceKind::Pawn) {
            return true;
        }
    }
    for &(df, dr) in &KNIGHT_OFFSETS {
        if check(dims.shift(target, df, dr), PieceKind::Knight) {
            return true;
        }
    }
    for &(df, dr) in &KING_OFFSETS {
        if check(dims.shift(target, df, dr), PieceKind::King) {
            return true;
        }
    }

    for (dirs, kind) in [(&DIAG_DIRS, PieceKind::Bishop), (&LINE_DIRS, PieceKind::Rook)] {
        for &(df, dr) in dirs {
            let mut cur = target;
            while let Some(c) = dims.shift(cur, df, dr) {
                let cell = r.get(c);
                if cell.is_occupied() {
                    if (cell.is(by, kind) || cell.is(by, PieceKind::Queen)) && visit(c) {
                        return true;
                    }
                    break;
                }
                cur = c;
            }
        }
    }

    false
}

/// Returns `true` if any piece of color `by` attacks square `c`
///
/// Only the geometry and current occupancy are considered: a pinned piece still attacks.
pub fn is_square_attacked(r: &RawBoard, c: Coord, by: Color) -> bool {
    trace_attackers(r, c, by, |_| true)
}

/// Returns all the pieces of color `by` which attack square `c`
pub fn square_attackers(r: &RawBoard, c: Coord, by: Color) -> Bitboard {
    let mut res = Bitboard::EMPTY;
    trace_attackers(r, c, by, |src| {
        res.set(r.dims.index(src));
        false
    });
    res
}

/// Returns all the squares attacked by pieces of color `by`
pub fn attacked_squares(r: &RawBoard, by: Color) -> Bitboard {
    let dims = r.dims;
    let mut res = Bitboard::EMPTY;
    for c in dims.iter() {
        let piece = match Piece::from_cell(r.get(c), c) {
            Some(p) if p.color() == by => p,
            _ => continue,
        };
        for ray in piece.reach(dims) {
            if ray.target() == Target::MoveOnly {
                continue;
            }
            for &dst in ray.squares() {
                res.set(dims.index(dst));
                if ray.is_blockable() && r.get(dst).is_occupied() {
                    break;
                }
            }
        }
    }
    res
}

pub(crate) trait MaybeMovePush {
    type Err;

    fn push(&mut self, m: Move) -> Result<(), Self::Err>;
}

/// Growable list of moves
#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct MoveList(Vec<Move>);

impl MoveList {
    pub fn new() -> MoveList {
        MoveList(Vec::new())
    }
}

impl Deref for MoveList {
    type Target = Vec<Move>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for MoveList {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl IntoIterator for MoveList {
    type Item = Move;
    type IntoIter = std::vec::IntoIter<Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<Move> for MoveList {
    fn from_iter<I: IntoIterator<Item = Move>>(iter: I) -> Self {
        MoveList(iter.into_iter().collect())
    }
}

/// Moves of a single piece
///
/// The capacity is enough for any piece on any supported board size.
pub type PieceMoves = ArrayVec<Move, 64>;

pub trait MovePush {
    fn push(&mut self, m: Move);
}

impl<const N: usize> MovePush for ArrayVec<Move, N> {
    fn push(&mut self, m: Move) {
        ArrayVec::push(self, m);
    }
}

impl MovePush for MoveList {
    fn push(&mut self, m: Move) {
        self.0.push(m);
    }
}

impl MovePush for Vec<Move> {
    fn push(&mut self, m: Move) {
        Vec::push(self, m);
    }
}

impl<T: MovePush> MaybeMovePush for T {
    type Err = Infallible;

    fn push(&mut self, m: Move) -> Result<(), Self::Err> {
        <Self as MovePush>::push(self, m);
        Ok(())
    }
}

struct ErrOnFirst;

impl MaybeMovePush for ErrOnFirst {
    type Err = ();

    fn push(&mut self, _mv: Move) -> Result<(), ()> {
        Err(())
    }
}

fn push_pawn<P: MaybeMovePush>(
    r: &RawBoard,
    piece: &Piece,
    dst: Coord,
    capture: bool,
    res: &mut P,
) -> Result<(), P::Err> {
    let src = piece.coord();
    if dst.rank() == geometry::promote_rank(r.dims, piece.color()) {
        for promote in PromotePiece::ALL {
            let kind = MoveKind::Promote {
                piece: promote,
                capture,
            };
            res.push(Move::new(kind, PieceKind::Pawn, src, dst))?;
        }
        return Ok(());
    }
    let kind = if capture {
        MoveKind::Capture
    } else {
        MoveKind::Quiet
    };
    res.push(Move::new(kind, PieceKind::Pawn, src, dst))
}

/// Generates semi-legal moves of `piece`, except castling
///
/// The piece must stand on the board and belong to the side to move.
pub(crate) fn gen_semilegal<P: MaybeMovePush>(
    r: &RawBoard,
    piece: &Piece,
    res: &mut P,
) -> Result<(), P::Err> {
    let src = piece.coord();
    let color = piece.color();
    let kind = piece.kind();
    for ray in piece.reach(r.dims) {
        for (i, &dst) in ray.squares().iter().enumerate() {
            let cell = r.get(dst);
            match ray.target() {
                Target::MoveOnly => {
                    if cell.is_occupied() {
                        break;
                    }
                    if i == 1 {
                        res.push(Move::new(MoveKind::PawnDouble, kind, src, dst))?;
                    } else {
                        push_pawn(r, piece, dst, false, res)?;
                    }
                }
                Target::CaptureOnly => {
                    if cell.color() == Some(color.inv()) {
                        push_pawn(r, piece, dst, true, res)?;
                    } else if cell.is_empty() && r.ep_target == Some(dst) && r.side == color {
                        res.push(Move::new(MoveKind::Enpassant, kind, src, dst))?;
                    }
                }
                Target::Any => {
                    match cell.color() {
                        None => res.push(Move::new(MoveKind::Quiet, kind, src, dst))?,
                        Some(c) if c != color => {
                            res.push(Move::new(MoveKind::Capture, kind, src, dst))?
                        }
                        Some(_) => {}
                    }
                    if ray.is_blockable() && cell.is_occupied() {
                        break;
                    }
                }
            }
        }
    }
    Ok(())
}

fn gen_legal<P: MaybeMovePush>(b: &Board, piece: &Piece, res: &mut P) -> Result<(), P::Err> {
    let r = b.raw();
    let king = b.king_pos(r.side);
    gen_semilegal(r, piece, &mut legal::LegalFilter::new(r, king, res))?;
    if piece.kind() == PieceKind::King {
        for side in CastlingSide::ALL {
            if castling::check(r, piece.color(), side).is_err() {
                continue;
            }
            let mv = Move::from_castling(r, piece.color(), side);
            if legal::is_safe(r, king, mv) {
                res.push(mv)?;
            }
        }
    }
    Ok(())
}

fn check_piece(b: &Board, piece: &Piece) -> Result<(), InvalidPieceReference> {
    let c = piece.coord();
    if !b.dims().contains(c) {
        return Err(InvalidPieceReference::OutOfBoard(c));
    }
    let cell = b.get(c);
    if cell.is_empty() {
        return Err(InvalidPieceReference::Vacant(c));
    }
    if !cell.is(piece.color(), piece.kind()) {
        return Err(InvalidPieceReference::Mismatch(c));
    }
    if piece.color() != b.side() {
        return Err(InvalidPieceReference::NotToMove(c));
    }
    Ok(())
}

/// Generates all the legal moves of `piece`, including castling
///
/// The handle is verified against the board first. An empty result means that the piece
/// really has no moves.
pub fn legal_moves(b: &Board, piece: &Piece) -> Result<PieceMoves, InvalidPieceReference> {
    check_piece(b, piece)?;
    let mut res = PieceMoves::new();
    let _ = gen_legal(b, piece, &mut res);
    Ok(res)
}

/// Generates all the legal moves of the side to move
///
/// Moves are grouped by piece in square index order.
pub fn legal_moves_all(b: &Board) -> MoveList {
    let mut res = MoveList::new();
    for piece in b.pieces_of(b.side()) {
        let _ = gen_legal(b, &piece, &mut res);
    }
    res
}

/// Returns `true` if the side to move has at least one legal move
pub fn has_legal_moves(b: &Board) -> bool {
    b.pieces_of(b.side())
        .any(|piece| gen_legal(b, &piece, &mut ErrOnFirst).is_err())
}

/// Collects the legal non-castling moves of pieces of kind `kind` which land on `dst`
pub(crate) fn san_candidates<P: MovePush>(b: &Board, kind: PieceKind, dst: Coord, res: &mut P) {
    let r = b.raw();
    let king = b.king_pos(r.side);
    for piece in b.pieces_of(r.side).filter(|p| p.kind() == kind) {
        let mut moves = PieceMoves::new();
        let _ = gen_semilegal(r, &piece, &mut moves);
        for mv in moves {
            if mv.dst() == dst && legal::is_safe(r, king, mv) {
                res.push(mv);
            }
        }
    }
}
