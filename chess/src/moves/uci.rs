//! Utilities to work with moves in UCI format
//!
//! Squares are written as a file letter followed by a rank number, so on boards larger than
//! ten ranks a square may take three characters, like `e10`.
//!
//! Castling is written as the king's move, like `e1g1`. If the king moves by less than two
//! files, which happens on narrow boards and in Fischer-random positions, that would read as
//! an ordinary king step, so the move is written as the king taking its own rook instead,
//! like `d1f1`. Both forms are accepted when parsing.

use super::base::{self, MoveKind, PromotePiece, ValidateError};
use crate::board::Board;
use crate::geometry;
use crate::movegen;
use crate::types::{CastlingSide, Coord, CoordParseError, PieceKind};

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Error creating a parsed UCI representation from string
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum RawParseError {
    /// Bad string length
    #[error("bad string length")]
    BadLength,
    /// Bad source square
    #[error("bad source: {0}")]
    BadSrc(CoordParseError),
    /// Bad destination square
    #[error("bad destination: {0}")]
    BadDst(CoordParseError),
    /// Bad promote character
    #[error("bad promote char {0:?}")]
    BadPromote(char),
}

/// Error parsing UCI into a legal [`moves::Move`](super::Move)
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum ParseError {
    /// Error parsing move
    #[error("cannot parse move: {0}")]
    Parse(#[from] RawParseError),
    /// Null move cannot be played on a board
    #[error("null move is not allowed")]
    NullMove,
    /// Move is not legal
    #[error("invalid move: {0}")]
    Validate(#[from] ValidateError),
}

/// Parsed move in UCI format
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Move {
    /// Null UCI move
    Null,
    /// Non-null UCI move
    Move {
        /// Source square
        src: Coord,
        /// Destination square
        dst: Coord,
        /// Piece to promote, if any
        promote: Option<PromotePiece>,
    },
}

fn guess_kind(b: &Board, piece: PieceKind, dst: Coord, promote: Option<PromotePiece>) -> MoveKind {
    let capture = b.get(dst).is_occupied();
    match promote {
        Some(piece) => MoveKind::Promote { piece, capture },
        None if piece == PieceKind::Pawn && !capture && Some(dst) == b.ep_target() => {
            MoveKind::Enpassant
        }
        None if capture => MoveKind::Capture,
        None => MoveKind::Quiet,
    }
}

impl Move {
    /// Converts the UCI move into a legal [`moves::Move`](super::Move) in position `b`
    ///
    /// If the move is not legal, the error explains why, in the same way as
    /// [`Move::validate()`](super::Move::validate) does.
    pub fn into_move(self, b: &Board) -> Result<base::Move, ParseError> {
        let (src, dst, promote) = match self {
            Move::Null => return Err(ParseError::NullMove),
            Move::Move { src, dst, promote } => (src, dst, promote),
        };
        for c in [src, dst] {
            if !b.dims().contains(c) {
                return Err(ValidateError::OutOfBoard(c).into());
            }
        }
        let piece = b.piece_at(src).ok_or(ValidateError::NoPiece(src))?;
        if piece.color() != b.side() {
            return Err(ValidateError::WrongSide(src).into());
        }

        let moves = movegen::legal_moves(b, &piece).map_err(|_| ValidateError::NoPiece(src))?;
        if let Some(mv) = moves
            .iter()
            .find(|m| m.dst() == dst && m.promote() == promote && m.kind().castling().is_none())
        {
            return Ok(*mv);
        }

        if piece.kind() == PieceKind::King && promote.is_none() {
            for side in CastlingSide::ALL {
                let mv = base::Move::from_castling(b.raw(), piece.color(), side);
                let to_rook = mv.castling_rook() == Some(dst);
                let to_dst = mv.dst() == dst && src.file().abs_diff(dst.file()) >= 2;
                if mv.src() == src && (to_rook || to_dst) {
                    mv.validate(b)?;
                    return Ok(mv);
                }
            }
        }

        if moves.iter().any(|m| m.dst() == dst && m.promote().is_some()) {
            return Err(ValidateError::PromotionRequired.into());
        }
        if promote.is_some() && dst.rank() != geometry::promote_rank(b.dims(), piece.color()) {
            return Err(ValidateError::UnexpectedPromotion.into());
        }
        let guess = base::Move::new(
            guess_kind(b, piece.kind(), dst, promote),
            piece.kind(),
            src,
            dst,
        );
        guess.validate(b)?;
        // The guessed move turned out legal, so the legal list above must have contained it
        Err(ValidateError::NotSemiLegal.into())
    }
}

impl From<base::Move> for Move {
    #[inline]
    fn from(mv: base::Move) -> Move {
        let dst = match mv.castling_rook() {
            Some(rook) if mv.src().file().abs_diff(mv.dst().file()) < 2 => rook,
            _ => mv.dst(),
        };
        Move::Move {
            src: mv.src(),
            dst,
            promote: mv.promote(),
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match *self {
            Move::Null => write!(f, "0000"),
            Move::Move { src, dst, promote } => {
                write!(f, "{}{}", src, dst)?;
                match promote {
                    Some(PromotePiece::Knight) => write!(f, "n")?,
                    Some(PromotePiece::Bishop) => write!(f, "b")?,
                    Some(PromotePiece::Rook) => write!(f, "r")?,
                    Some(PromotePiece::Queen) => write!(f, "q")?,
                    None => {}
                };
                Ok(())
            }
        }
    }
}

impl FromStr for Move {
    type Err = RawParseError;

    fn from_str(s: &str) -> Result<Move, Self::Err> {
        if s == "0000" {
            return Ok(Move::Null);
        }
        if !(4..=7).contains(&s.len()) || !s.is_ascii() {
            return Err(RawParseError::BadLength);
        }

        // Squares are a letter with up to two digits, so look for the start of the next letter
        let bytes = s.as_bytes();
        let square_end = |start: usize| {
            let mut pos = start + 1;
            while pos < bytes.len() && bytes[pos].is_ascii_digit() {
                pos += 1;
            }
            pos
        };
        let src_end = square_end(0);
        if src_end >= s.len() {
            return Err(RawParseError::BadLength);
        }
        let dst_end = square_end(src_end);
        let src = Coord::from_str(&s[..src_end]).map_err(RawParseError::BadSrc)?;
        let dst = Coord::from_str(&s[src_end..dst_end]).map_err(RawParseError::BadDst)?;

        let promote = match &bytes[dst_end..] {
            [] => None,
            [b] => Some(match b {
                b'n' => PromotePiece::Knight,
                b'b' => PromotePiece::Bishop,
                b'r' => PromotePiece::Rook,
                b'q' => PromotePiece::Queen,
                _ => return Err(RawParseError::BadPromote(*b as char)),
            }),
            _ => return Err(RawParseError::BadLength),
        };
        Ok(Move::Move { src, dst, promote })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::castling::CastlingBlock;
    use crate::types::{Color, Dims};

    fn sq(s: &str) -> Coord {
        Coord::from_str(s).unwrap()
    }

    #[test]
    fn test_simple() {
        assert_eq!(Move::from_str("0000").unwrap(), Move::Null);
        assert_eq!(
            Move::Null.into_move(&Board::initial()),
            Err(ParseError::NullMove)
        );

        assert_eq!(
            Move::from_str("e2e4").unwrap(),
            Move::Move {
                src: sq("e2"),
                dst: sq("e4"),
                promote: None
            }
        );
        assert_eq!(
            Move::from_str("e2e4")
                .unwrap()
                .into_move(&Board::initial())
                .unwrap(),
            base::Move::new(MoveKind::PawnDouble, PieceKind::Pawn, sq("e2"), sq("e4")),
        );
    }

    #[test]
    fn test_parse() {
        assert_eq!(
            Move::from_str("a10b12q").unwrap(),
            Move::Move {
                src: sq("a10"),
                dst: sq("b12"),
                promote: Some(PromotePiece::Queen)
            }
        );
        assert_eq!(Move::from_str("a7a8n").unwrap().to_string(), "a7a8n");
        assert_eq!(Move::from_str("e2"), Err(RawParseError::BadLength));
        assert_eq!(Move::from_str("e2e4qq"), Err(RawParseError::BadLength));
        assert_eq!(Move::from_str("a7a8k"), Err(RawParseError::BadPromote('k')));
        assert!(matches!(
            Move::from_str("z2e4"),
            Err(RawParseError::BadSrc(_))
        ));
        assert!(matches!(
            Move::from_str("e2e0"),
            Err(RawParseError::BadDst(_))
        ));
    }

    #[test]
    fn test_errors() {
        let b = Board::initial();
        let parse = |s: &str| Move::from_str(s).unwrap().into_move(&b);
        assert_eq!(
            parse("e3e4"),
            Err(ValidateError::NoPiece(sq("e3")).into())
        );
        assert_eq!(
            parse("e7e5"),
            Err(ValidateError::WrongSide(sq("e7")).into())
        );
        assert_eq!(parse("e2e5"), Err(ValidateError::NotSemiLegal.into()));
        assert_eq!(parse("e2e9"), Err(ValidateError::OutOfBoard(sq("e9")).into()));
        assert_eq!(
            parse("e1g1"),
            Err(ValidateError::Castling(CastlingSide::King, CastlingBlock::Occupied(sq("f1"))).into())
        );
        assert_eq!(parse("e2e3q"), Err(ValidateError::UnexpectedPromotion.into()));

        let b = Board::from_fen("8/4P3/8/8/8/8/k7/4K3 w - - 0 1").unwrap();
        assert_eq!(
            Move::from_str("e7e8").unwrap().into_move(&b),
            Err(ValidateError::PromotionRequired.into())
        );
        assert_eq!(
            Move::from_str("e7e8r").unwrap().into_move(&b).unwrap().promote(),
            Some(PromotePiece::Rook)
        );
    }

    #[test]
    fn test_castling_and_enpassant() {
        let b = Board::from_fen("r3k2r/8/8/3pP3/8/8/8/R3K2R w KQkq d6 0 1").unwrap();
        let mv = Move::from_str("e1c1").unwrap().into_move(&b).unwrap();
        assert_eq!(mv.kind().castling(), Some(CastlingSide::Queen));
        assert_eq!(mv.castling_rook(), Some(sq("a1")));
        assert_eq!(mv.uci().to_string(), "e1c1");
        // King takes its own rook is also understood
        let mv = Move::from_str("e1h1").unwrap().into_move(&b).unwrap();
        assert_eq!(mv.kind().castling(), Some(CastlingSide::King));
        let mv = Move::from_str("e5d6").unwrap().into_move(&b).unwrap();
        assert_eq!(mv.kind(), MoveKind::Enpassant);
        assert_eq!(mv.uci().to_string(), "e5d6");
    }

    #[test]
    fn test_tall_board() {
        let dims = Dims::new(8, 10).unwrap();
        let b = Board::from_fen_dims(
            "rnbqkbnr/pppppppp/8/8/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            dims,
        )
        .unwrap();
        let mv = Move::from_str("e2e4").unwrap().into_move(&b).unwrap();
        assert_eq!(mv.kind(), MoveKind::PawnDouble);
        let b = b.make_move(mv).unwrap();
        let mv = Move::from_str("d9d7").unwrap().into_move(&b).unwrap();
        assert_eq!(mv.to_string(), "d9d7");
        let b = b.make_move(mv).unwrap();
        assert_eq!(b.ep_target(), Some(sq("d8")));
    }

    #[test]
    fn test_short_castling_path() {
        // On six files the king castles from d1 to e1, one file away
        let dims = Dims::new(6, 6).unwrap();
        let b = Board::from_fen_dims("r2k1r/6/6/6/6/R2K1R w KQkq - 0 1", dims).unwrap();
        let castle = base::Move::from_castling(b.raw(), Color::White, CastlingSide::King);
        assert_eq!(castle.src(), sq("d1"));
        assert_eq!(castle.dst(), sq("e1"));
        assert_eq!(castle.uci().to_string(), "d1f1");

        let mv = Move::from_str("d1f1").unwrap().into_move(&b).unwrap();
        assert_eq!(mv, castle);
        let mv = Move::from_str("d1e1").unwrap().into_move(&b).unwrap();
        assert_eq!(mv.kind(), MoveKind::Quiet);

        let castle = base::Move::from_castling(b.raw(), Color::White, CastlingSide::Queen);
        assert_eq!(castle.uci().to_string(), "d1a1");
        assert_eq!(
            Move::from_str("d1a1").unwrap().into_move(&b).unwrap(),
            castle
        );
    }

    #[test]
    fn test_fischer_random_castling() {
        let b = Board::from_fen("1r2k1r1/pppppppp/8/8/8/8/PPPPPPPP/1R2K1R1 w GBgb - 0 1")
            .unwrap();
        let mv = Move::from_str("e1g1").unwrap().into_move(&b).unwrap();
        assert_eq!(mv.kind().castling(), Some(CastlingSide::King));
        assert_eq!(mv.castling_rook(), Some(sq("g1")));
        assert_eq!(mv.uci().to_string(), "e1g1");

        // The king lands on its own rook's square, the rook ends on f1
        let b = b.make_move(mv).unwrap();
        assert_eq!(
            b.as_fen(),
            "1r2k1r1/pppppppp/8/8/8/8/PPPPPPPP/1R3RK1 b gb - 1 1"
        );
    }
}
