use super::{san, uci};
use crate::board::{Board, RawBoard};
use crate::castling::{self, CastlingBlock, CastlingError, CastlingStateError};
use crate::movegen::{self, PieceMoves};
use crate::piece::Piece;
use crate::types::{CastlingSide, Cell, Color, Coord, PieceKind};
use crate::{geometry, legal};

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Target piece for promotion
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PromotePiece {
    Knight,
    Bishop,
    Rook,
    Queen,
}

impl PromotePiece {
    /// All the promotion pieces, strongest first
    pub const ALL: [PromotePiece; 4] = [
        PromotePiece::Queen,
        PromotePiece::Rook,
        PromotePiece::Bishop,
        PromotePiece::Knight,
    ];
}

impl From<PromotePiece> for PieceKind {
    #[inline]
    fn from(p: PromotePiece) -> Self {
        match p {
            PromotePiece::Knight => PieceKind::Knight,
            PromotePiece::Bishop => PieceKind::Bishop,
            PromotePiece::Rook => PieceKind::Rook,
            PromotePiece::Queen => PieceKind::Queen,
        }
    }
}

impl TryFrom<PieceKind> for PromotePiece {
    type Error = ();

    #[inline]
    fn try_from(p: PieceKind) -> Result<Self, Self::Error> {
        match p {
            PieceKind::Knight => Ok(PromotePiece::Knight),
            PieceKind::Bishop => Ok(PromotePiece::Bishop),
            PieceKind::Rook => Ok(PromotePiece::Rook),
            PieceKind::Queen => Ok(PromotePiece::Queen),
            _ => Err(()),
        }
    }
}

/// Move kind
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MoveKind {
    /// Move to an empty square
    Quiet,
    /// Capture of the piece on the destination square
    Capture,
    /// Pawn advance by two squares from its initial rank
    PawnDouble,
    /// Pawn capture en passant
    Enpassant,
    /// Castling; the move is described by the king's source and destination, and `rook` is
    /// the square the castling rook starts from
    Castling { side: CastlingSide, rook: Coord },
    /// Pawn promotion, with or without a capture
    Promote { piece: PromotePiece, capture: bool },
}

impl MoveKind {
    #[inline]
    pub fn promote(self) -> Option<PromotePiece> {
        match self {
            MoveKind::Promote { piece, .. } => Some(piece),
            _ => None,
        }
    }

    #[inline]
    pub fn castling(self) -> Option<CastlingSide> {
        match self {
            MoveKind::Castling { side, .. } => Some(side),
            _ => None,
        }
    }

    #[inline]
    pub fn is_capture(self) -> bool {
        matches!(
            self,
            MoveKind::Capture | MoveKind::Enpassant | MoveKind::Promote { capture: true, .. }
        )
    }
}

/// Move output style
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Style {
    /// Output in SAN format, with capital Latin letters for pieces
    San,
    /// Output in SAN format, with Unicode chess symbols for pieces
    SanUtf8,
    /// Output in UCI format
    Uci,
}

/// Chess move
///
/// A move is a plain description: kind, moving piece, source and destination. Creating a move
/// doesn't check anything; use [`Move::validate()`] or [`Board::apply_move()`] to check it against
/// a position. The moves returned by [`movegen`](crate::movegen) are always legal in the position
/// they were generated for.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Move {
    kind: MoveKind,
    piece: PieceKind,
    src: Coord,
    dst: Coord,
}

/// Error indicating that a move cannot be made in the given position
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum ValidateError {
    /// One of the squares doesn't exist on this board
    #[error("square {0} is out of board")]
    OutOfBoard(Coord),
    /// No piece on the source square
    #[error("no piece on {0}")]
    NoPiece(Coord),
    /// The piece on the source square belongs to the side not to move
    #[error("piece on {0} belongs to the wrong side")]
    WrongSide(Coord),
    /// The piece on the source square differs from the one stated in the move
    #[error("expected {expected} on {at}, found {found}")]
    PieceMismatch {
        at: Coord,
        expected: PieceKind,
        found: PieceKind,
    },
    /// The piece cannot make such move
    #[error("move is not semi-legal")]
    NotSemiLegal,
    /// The move leaves the king of the moving side attacked
    #[error("move leaves the king in check")]
    SelfCheck,
    /// Pawn move to the last rank must name a promotion piece
    #[error("promotion piece required")]
    PromotionRequired,
    /// Promotion piece named for a move which is not a promotion
    #[error("unexpected promotion")]
    UnexpectedPromotion,
    /// Castling is not allowed in this position
    #[error("cannot castle {0:?} side: {1}")]
    Castling(CastlingSide, CastlingBlock),
    /// Castling right is recorded, but the king or the rook is not in place
    #[error("inconsistent castling state: {0}")]
    CastlingState(#[from] CastlingStateError),
}

impl Move {
    /// Creates a move from its raw parts
    #[inline]
    pub const fn new(kind: MoveKind, piece: PieceKind, src: Coord, dst: Coord) -> Move {
        Move {
            kind,
            piece,
            src,
            dst,
        }
    }

    /// Creates a castling move made by `color` to side `side`
    ///
    /// The king and rook origins are taken from the castling files of `r`.
    #[inline]
    pub fn from_castling(r: &RawBoard, color: Color, side: CastlingSide) -> Move {
        Move {
            kind: MoveKind::Castling {
                side,
                rook: r.castling_rook_home(color, side),
            },
            piece: PieceKind::King,
            src: r.king_home(color),
            dst: geometry::castling_king_dst(r.dims, color, side),
        }
    }

    /// Creates a move from the SAN string `s` in position `b`
    ///
    /// The returned move is guaranteed to be legal.
    #[inline]
    pub fn from_san(s: &str, b: &Board) -> Result<Move, san::ParseError> {
        Ok(san::Move::from_str(s)?.into_move(b)?)
    }

    /// Creates a move from the UCI string `s` in position `b`
    ///
    /// The returned move is guaranteed to be legal.
    #[inline]
    pub fn from_uci(s: &str, b: &Board) -> Result<Move, uci::ParseError> {
        uci::Move::from_str(s)?.into_move(b)
    }

    /// Checks whether this move is legal in position `b`
    ///
    /// On failure, reports the first reason found. The checks go from the cheapest ones: board
    /// bounds, the piece on the source square, piece geometry and occupancy (or the castling
    /// preconditions), and finally the self-check probe.
    pub fn validate(&self, b: &Board) -> Result<(), ValidateError> {
        let r = b.raw();
        for c in [self.src, self.dst] {
            if !r.dims.contains(c) {
                return Err(ValidateError::OutOfBoard(c));
            }
        }

        let cell = r.get(self.src);
        let (color, kind) = match (cell.color(), cell.kind()) {
            (Some(color), Some(kind)) => (color, kind),
            _ => return Err(ValidateError::NoPiece(self.src)),
        };
        if color != r.side {
            return Err(ValidateError::WrongSide(self.src));
        }
        if kind != self.piece {
            return Err(ValidateError::PieceMismatch {
                at: self.src,
                expected: self.piece,
                found: kind,
            });
        }

        match self.kind {
            MoveKind::Castling { side, .. } => {
                if *self != Move::from_castling(r, color, side) {
                    return Err(ValidateError::NotSemiLegal);
                }
                castling::check(r, color, side).map_err(|e| match e {
                    CastlingError::Blocked(block) => ValidateError::Castling(side, block),
                    CastlingError::State(state) => state.into(),
                })?;
            }
            _ => {
                if self.kind.promote().is_some()
                    && self.dst.rank() != geometry::promote_rank(r.dims, color)
                {
                    return Err(ValidateError::UnexpectedPromotion);
                }
                let mut candidates = PieceMoves::new();
                let _ = movegen::gen_semilegal(r, &Piece::new(color, kind, self.src), &mut candidates);
                if !candidates.contains(self) {
                    let needs_promote = candidates
                        .iter()
                        .any(|m| m.dst == self.dst && m.kind.promote().is_some());
                    if needs_promote && self.kind.promote().is_none() {
                        return Err(ValidateError::PromotionRequired);
                    }
                    return Err(ValidateError::NotSemiLegal);
                }
            }
        }

        if !legal::is_safe(r, b.king_pos(color), *self) {
            return Err(ValidateError::SelfCheck);
        }
        Ok(())
    }

    /// Returns `true` if the move is legal in position `b`
    #[inline]
    pub fn is_legal(&self, b: &Board) -> bool {
        self.validate(b).is_ok()
    }

    #[inline]
    pub const fn kind(&self) -> MoveKind {
        self.kind
    }

    /// Returns the kind of the moving piece
    ///
    /// For promotions, this is a pawn. For castling, this is a king.
    #[inline]
    pub const fn piece(&self) -> PieceKind {
        self.piece
    }

    #[inline]
    pub const fn src(&self) -> Coord {
        self.src
    }

    #[inline]
    pub const fn dst(&self) -> Coord {
        self.dst
    }

    #[inline]
    pub fn is_capture(&self) -> bool {
        self.kind.is_capture()
    }

    #[inline]
    pub fn promote(&self) -> Option<PromotePiece> {
        self.kind.promote()
    }

    /// Returns the square the rook starts from if this is a castling move
    #[inline]
    pub fn castling_rook(&self) -> Option<Coord> {
        match self.kind {
            MoveKind::Castling { rook, .. } => Some(rook),
            _ => None,
        }
    }

    /// Converts this move into a parsed UCI representation
    #[inline]
    pub fn uci(&self) -> uci::Move {
        (*self).into()
    }

    /// Converts this move into a parsed SAN representation in position `b`
    ///
    /// This function returns an error if the move is not legal in the given position.
    #[inline]
    pub fn san(&self, b: &Board) -> Result<san::Move, ValidateError> {
        san::Move::from_move(*self, b)
    }

    /// Returns the wrapper which helps to format the move with the given style `style`
    ///
    /// The resulting wrapper implements [`fmt::Display`], so can be used with
    /// `write!()`, `println!()`, or `ToString::to_string`.
    ///
    /// # Example
    ///
    /// ```
    /// # use fenix::{Board, Move, moves::Style};
    /// #
    /// let b = Board::initial();
    /// let mv = Move::from_uci("g1f3", &b).unwrap();
    /// assert_eq!(mv.styled(&b, Style::Uci).unwrap().to_string(), "g1f3");
    /// assert_eq!(mv.styled(&b, Style::San).unwrap().to_string(), "Nf3");
    /// assert_eq!(mv.styled(&b, Style::SanUtf8).unwrap().to_string(), "♘f3");
    /// ```
    pub fn styled(&self, b: &Board, style: Style) -> Result<StyledMove, ValidateError> {
        match style {
            Style::Uci => Ok(StyledMove(Styled::Uci((*self).into()))),
            Style::San => Ok(StyledMove(Styled::San(
                san::Move::from_move(*self, b)?,
                san::Style::Algebraic,
            ))),
            Style::SanUtf8 => Ok(StyledMove(Styled::San(
                san::Move::from_move(*self, b)?,
                san::Style::Utf8,
            ))),
        }
    }
}

impl fmt::Display for Move {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        self.uci().fmt(f)
    }
}

enum Styled {
    Uci(uci::Move),
    San(san::Move, san::Style),
}

/// Wrapper to format the move with the given style
///
/// See [`Move::styled()`] doc for details.
pub struct StyledMove(Styled);

impl fmt::Display for StyledMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match &self.0 {
            Styled::Uci(mv) => mv.fmt(f),
            Styled::San(mv, sty) => mv.styled(*sty).fmt(f),
        }
    }
}

// A rook loses its castling tag as soon as it leaves its origin
fn move_cell(r: &mut RawBoard, src: Coord, dst: Coord) {
    let cell = r.get(src);
    r.put(src, Cell::EMPTY);
    r.put(dst, cell.with_castling(None));
}

/// Plays a semi-legal move `mv` on `r`, updating all the position state
///
/// Nothing is validated here, so the result may leave the mover's king attacked. This is how
/// the legality probes work: they call this on a copy and inspect the result.
pub(crate) fn make_raw(r: &mut RawBoard, mv: Move) {
    let dims = r.dims;
    let color = r.side;
    let is_capture = mv.kind.castling().is_none() && r.get(mv.dst).is_occupied();
    r.ep_target = None;

    match mv.kind {
        MoveKind::Quiet | MoveKind::Capture => move_cell(r, mv.src, mv.dst),
        MoveKind::PawnDouble => {
            move_cell(r, mv.src, mv.dst);
            let mid = (mv.src.rank() + mv.dst.rank()) / 2;
            r.ep_target = Some(Coord::from_parts(mv.src.file(), mid));
        }
        MoveKind::Enpassant => {
            move_cell(r, mv.src, mv.dst);
            r.put(Coord::from_parts(mv.dst.file(), mv.src.rank()), Cell::EMPTY);
        }
        MoveKind::Castling {
            side,
            rook: rook_src,
        } => {
            let rook_dst = geometry::castling_rook_dst(dims, color, side);
            let king = r.get(mv.src);
            let rook = r.get(rook_src);
            // Take both pieces first, the destinations may overlap with the sources
            r.put(mv.src, Cell::EMPTY);
            r.put(rook_src, Cell::EMPTY);
            r.put(mv.dst, king);
            r.put(rook_dst, rook.with_castling(None));
        }
        MoveKind::Promote { piece, .. } => {
            r.put(mv.src, Cell::EMPTY);
            r.put(mv.dst, Cell::from_parts(color, piece.into()));
        }
    }

    if mv.piece == PieceKind::King {
        r.castling.unset_color(color);
    }
    for c in [Color::White, Color::Black] {
        for side in CastlingSide::ALL {
            let origin = r.castling_rook_home(c, side);
            if mv.src == origin || mv.dst == origin {
                r.castling.unset(c, side);
            }
        }
    }
    r.sync_castling();

    if mv.piece == PieceKind::Pawn || is_capture {
        r.move_counter = 0;
    } else {
        r.move_counter = r.move_counter.saturating_add(1);
    }
    if color == Color::Black {
        r.move_number = r.move_number.saturating_add(1);
    }
    r.side = color.inv();
}
