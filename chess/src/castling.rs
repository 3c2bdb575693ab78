//! Castling preconditions
//!
//! Castling rights are stored as plain flags and are not fixed up when a position is imported.
//! Instead, each castling attempt checks that the king and the corresponding rook are still in
//! place, and reports a [`CastlingStateError`] if the recorded right contradicts the board.
//!
//! The king and rook origins come from [`RawBoard::castling_files`], so Fischer-random setups
//! castle the same way: the king and the rook land on the usual castling squares, and every
//! square they cross, other than their own, must be empty.

use crate::board::RawBoard;
use crate::geometry;
use crate::movegen;
use crate::types::{CastlingSide, Color, Coord, PieceKind};

use thiserror::Error;

/// Reason why castling is not possible in the current position
#[derive(Debug, Copy, Clone, Error, Eq, PartialEq)]
pub enum CastlingBlock {
    /// The castling right is absent
    #[error("no castling right")]
    NoRight,
    /// A square between the king and the rook is occupied
    #[error("square {0} is occupied")]
    Occupied(Coord),
    /// The king is in check, passes through an attacked square or lands on one
    #[error("square {0} is attacked")]
    Attacked(Coord),
}

/// Castling right is recorded, but the pieces are not where it requires them to be
#[derive(Debug, Copy, Clone, Error, Eq, PartialEq)]
pub enum CastlingStateError {
    #[error("{} king is not on {expected}", color.as_long_str())]
    KingMissing { color: Color, expected: Coord },
    #[error("{} rook for {side:?} side castling is not on {expected}", color.as_long_str())]
    RookMissing {
        color: Color,
        side: CastlingSide,
        expected: Coord,
    },
}

#[derive(Debug, Copy, Clone, Error, Eq, PartialEq)]
pub enum CastlingError {
    #[error("castling is blocked: {0}")]
    Blocked(#[from] CastlingBlock),
    #[error("inconsistent castling state: {0}")]
    State(#[from] CastlingStateError),
}

// Inclusive file span covered by all the given squares
fn file_span(squares: &[Coord]) -> std::ops::RangeInclusive<usize> {
    let lo = squares.iter().map(|c| c.file()).min().unwrap_or(0);
    let hi = squares.iter().map(|c| c.file()).max().unwrap_or(0);
    lo..=hi
}

/// Checks whether `color` may castle to `side` in position `r`
///
/// The checks go in this order: the right itself, the placement of the king and the rook,
/// the emptiness of the squares both pieces cross, and finally the attacks on the squares the
/// king stands on, passes and lands on.
pub fn check(r: &RawBoard, color: Color, side: CastlingSide) -> Result<(), CastlingError> {
    if !r.castling.has(color, side) {
        return Err(CastlingBlock::NoRight.into());
    }

    let dims = r.dims;
    let king = r.king_home(color);
    if !r.get(king).is(color, PieceKind::King) {
        return Err(CastlingStateError::KingMissing {
            color,
            expected: king,
        }
        .into());
    }
    let rook = r.castling_rook_home(color, side);
    let rook_cell = r.get(rook);
    if !rook_cell.is(color, PieceKind::Rook) || rook_cell.castling() != Some(side) {
        return Err(CastlingStateError::RookMissing {
            color,
            side,
            expected: rook,
        }
        .into());
    }

    let rank = king.rank();
    let dst = geometry::castling_king_dst(dims, color, side);
    let rook_dst = geometry::castling_rook_dst(dims, color, side);
    for file in file_span(&[king, dst, rook, rook_dst]) {
        let c = Coord::from_parts(file, rank);
        if c != king && c != rook && r.get(c).is_occupied() {
            return Err(CastlingBlock::Occupied(c).into());
        }
    }

    for file in file_span(&[king, dst]) {
        let c = Coord::from_parts(file, rank);
        if movegen::is_square_attacked(r, c, color.inv()) {
            return Err(CastlingBlock::Attacked(c).into());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::types::Dims;
    use std::str::FromStr;

    fn sq(s: &str) -> Coord {
        Coord::from_str(s).unwrap()
    }

    #[test]
    fn test_simple() {
        let b = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        for color in [Color::White, Color::Black] {
            for side in CastlingSide::ALL {
                assert_eq!(check(b.raw(), color, side), Ok(()));
            }
        }

        let b = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w Kq - 0 1").unwrap();
        assert_eq!(
            check(b.raw(), Color::White, CastlingSide::Queen),
            Err(CastlingBlock::NoRight.into())
        );
        assert_eq!(check(b.raw(), Color::Black, CastlingSide::Queen), Ok(()));
    }

    #[test]
    fn test_blocked() {
        let b = Board::from_fen("r3k2r/8/8/8/8/8/8/RN2K1NR w KQkq - 0 1").unwrap();
        assert_eq!(
            check(b.raw(), Color::White, CastlingSide::Queen),
            Err(CastlingBlock::Occupied(sq("b1")).into())
        );
        assert_eq!(
            check(b.raw(), Color::White, CastlingSide::King),
            Err(CastlingBlock::Occupied(sq("g1")).into())
        );

        // Queenside castling is possible when only b1 is attacked
        let b = Board::from_fen("1r2k2r/8/8/8/8/8/8/R3K2R w KQk - 0 1").unwrap();
        assert_eq!(check(b.raw(), Color::White, CastlingSide::Queen), Ok(()));

        let b = Board::from_fen("2r1k2r/8/8/8/8/8/8/R3K2R w KQk - 0 1").unwrap();
        assert_eq!(
            check(b.raw(), Color::White, CastlingSide::Queen),
            Err(CastlingBlock::Attacked(sq("c1")).into())
        );

        let b = Board::from_fen("4k2r/8/8/8/8/8/8/R3K2r w Qk - 0 1").unwrap();
        assert_eq!(
            check(b.raw(), Color::White, CastlingSide::Queen),
            Err(CastlingBlock::Attacked(sq("e1")).into())
        );
    }

    #[test]
    fn test_state() {
        let b = Board::from_fen("4k3/8/8/8/8/8/8/R2K3R w KQ - 0 1").unwrap();
        assert_eq!(
            check(b.raw(), Color::White, CastlingSide::King),
            Err(CastlingStateError::KingMissing {
                color: Color::White,
                expected: sq("e1"),
            }
            .into())
        );

        let b = Board::from_fen("4k3/8/8/8/8/8/8/1R2K2R w KQ - 0 1").unwrap();
        assert_eq!(
            check(b.raw(), Color::White, CastlingSide::Queen),
            Err(CastlingStateError::RookMissing {
                color: Color::White,
                side: CastlingSide::Queen,
                expected: sq("a1"),
            }
            .into())
        );
        assert_eq!(check(b.raw(), Color::White, CastlingSide::King), Ok(()));
    }

    #[test]
    fn test_wide() {
        let dims = Dims::new(10, 8).unwrap();
        let b = Board::from_fen_dims("r4k3r/10/10/10/10/10/10/R4K3R w KQkq - 0 1", dims).unwrap();
        assert_eq!(check(b.raw(), Color::White, CastlingSide::King), Ok(()));
        assert_eq!(check(b.raw(), Color::Black, CastlingSide::Queen), Ok(()));

        let b = Board::from_fen_dims("r4k3r/10/10/10/10/10/10/R3K4R w KQkq - 0 1", dims).unwrap();
        assert_eq!(
            check(b.raw(), Color::White, CastlingSide::King),
            Err(CastlingStateError::KingMissing {
                color: Color::White,
                expected: sq("f1"),
            }
            .into())
        );
    }

    #[test]
    fn test_fischer_random() {
        // King on e1, rooks on b1 and g1
        let b = Board::from_fen("1r2k1r1/pppppppp/8/8/8/8/PPPPPPPP/1R2K1R1 w GBgb - 0 1").unwrap();
        assert_eq!(b.raw().king_home(Color::White), sq("e1"));
        assert_eq!(
            b.raw().castling_rook_home(Color::White, CastlingSide::Queen),
            sq("b1")
        );
        assert_eq!(
            b.raw().castling_rook_home(Color::Black, CastlingSide::King),
            sq("g8")
        );
        for color in [Color::White, Color::Black] {
            for side in CastlingSide::ALL {
                assert_eq!(check(b.raw(), color, side), Ok(()));
            }
        }

        // The rook crosses c1 and d1 on its way
        let b = Board::from_fen("1r2k1r1/pppppppp/8/8/8/8/PPPPPPPP/1RN1K1R1 w GBgb - 0 1").unwrap();
        assert_eq!(
            check(b.raw(), Color::White, CastlingSide::Queen),
            Err(CastlingBlock::Occupied(sq("c1")).into())
        );

        // King on b1 next to its rook on a1, the knight on d1 stands on the rook's destination
        let b = Board::from_fen("rk6/8/8/8/8/8/8/RK1N4 w Aa - 0 1").unwrap();
        assert_eq!(
            check(b.raw(), Color::White, CastlingSide::Queen),
            Err(CastlingBlock::Occupied(sq("d1")).into())
        );
        let b = Board::from_fen("rk6/8/8/8/8/8/8/RK6 w Aa - 0 1").unwrap();
        assert_eq!(check(b.raw(), Color::White, CastlingSide::Queen), Ok(()));
    }
}
