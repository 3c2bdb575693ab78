//! Self-check filtering

use crate::board::RawBoard;
use crate::movegen::{self, MaybeMovePush};
use crate::moves::{self, Move};
use crate::types::{Coord, PieceKind};

/// Returns `true` if the semi-legal move `mv` doesn't leave the mover's king attacked
///
/// `king` is the position of the mover's king before the move. The move is played on a copy
/// of `r`, so this also covers pins, discovered checks and king steps into attacked squares.
pub fn is_safe(r: &RawBoard, king: Coord, mv: Move) -> bool {
    let mut probe = *r;
    moves::make_raw(&mut probe, mv);
    let king = if mv.piece() == PieceKind::King {
        mv.dst()
    } else {
        king
    };
    !movegen::is_square_attacked(&probe, king, r.side.inv())
}

/// Move sink which passes through only the moves that pass [`is_safe()`]
pub(crate) struct LegalFilter<'a, P> {
    board: &'a RawBoard,
    king: Coord,
    inner: &'a mut P,
}

impl<'a, P: MaybeMovePush> LegalFilter<'a, P> {
    pub fn new(board: &'a RawBoard, king: Coord, inner: &'a mut P) -> Self {
        Self { board, king, inner }
    }
}

impl<'a, P: MaybeMovePush> MaybeMovePush for LegalFilter<'a, P> {
    type Err = P::Err;

    fn push(&mut self, mv: Move) -> Result<(), Self::Err> {
        match is_safe(self.board, self.king, mv) {
            true => self.inner.push(mv),
            false => Ok(()),
        }
    }
}
