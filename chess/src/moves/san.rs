//! Utilities to work with moves in SAN format

use super::base::{self, MoveKind, PromotePiece, ValidateError};
use crate::board::Board;
use crate::geometry;
use crate::movegen::{self, MovePush};
use crate::types::{self, CastlingSide, Coord, CoordParseError, PieceKind};

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Error parsing SAN representation from string
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum RawParseError {
    /// String is empty
    #[error("string is empty")]
    EmptyString,
    /// String contains non-ASCII characters
    #[error("non-ASCII data in string")]
    NonAscii,
    /// Destination cell is invalid
    #[error("invalid destination cell")]
    InvalidDst(#[from] CoordParseError),
    /// Extra bytes in non-pawn move
    #[error("non-pawn move too long")]
    NonPawnMoveTooLong,
    /// String for pawn move is too short
    #[error("pawn move too short")]
    PawnMoveTooShort,
    /// Extra bytes in pawn move
    #[error("pawn move too long")]
    PawnMoveTooLong,
    /// Parsing failed for unspecified reasons
    #[error("syntax error")]
    Syntax,
}

/// Error converting SAN move into [`moves::Move`](super::Move)
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum IntoMoveError {
    /// Resulting move is not legal
    ///
    /// Note that, when the move is not legal, you can also get [`IntoMoveError::NotFound`] error.
    #[error("invalid move: {0}")]
    Validate(#[from] ValidateError),
    /// Capture sign is put when the move is non-capture
    #[error("got capture sign on a non-capture move")]
    CaptureExpected,
    /// Cannot find a corresponding legal move described by the given SAN string
    #[error("no such move")]
    NotFound,
    /// The description given by SAN string is ambiguous
    #[error("ambiguous move (candidates are at least `{0}` and `{1}`)")]
    Ambiguity(base::Move, base::Move),
}

/// Error parsing [`moves::Move`](super::Move) from SAN string
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum ParseError {
    /// Cannot parse SAN string
    #[error("cannot parse move: {0}")]
    Parse(#[from] RawParseError),
    /// Cannot convert a parsed string into a legal move
    #[error("cannot convert move: {0}")]
    Convert(#[from] IntoMoveError),
}

/// Style for formatting SAN moves
///
/// Note that the style can be used only for _formatting_. Move parser only accepts
/// ASCII characters as piece names and doesn't accept Unicode pieces.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Style {
    /// Use capital Latin letters for pieces
    Algebraic,
    /// Use Unicode chess symbols for pieces
    Utf8,
}

impl Style {
    fn piece_char(self, piece: PieceKind) -> char {
        match self {
            Style::Algebraic => piece.as_char(),
            Style::Utf8 => match piece {
                PieceKind::Pawn => '♙',
                PieceKind::Knight => '♘',
                PieceKind::Bishop => '♗',
                PieceKind::Rook => '♖',
                PieceKind::Queen => '♕',
                PieceKind::King => '♔',
            },
        }
    }

    fn write_promote(self, f: &mut fmt::Formatter<'_>, promote: Option<PromotePiece>) -> fmt::Result {
        let Some(piece) = promote else {
            return Ok(());
        };
        let piece = self.piece_char(piece.into());
        match self {
            Style::Algebraic => write!(f, "={}", piece),
            Style::Utf8 => write!(f, "{}", piece),
        }
    }
}

/// Parsed SAN string, without check indicator
///
/// Files are stored as zero-based ordinals, so `0` is the `a` file.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Data {
    /// Castling
    Castling(CastlingSide),
    /// Simple pawn move
    PawnMove {
        /// Destination square
        dst: Coord,
        /// Piece to promote, if any
        promote: Option<PromotePiece>,
    },
    /// Pawn capture
    PawnCapture {
        /// Source file
        src: usize,
        /// Destination square
        dst: Coord,
        /// Piece to promote, if any
        promote: Option<PromotePiece>,
    },
    /// Simplified pawn capture (like `cd`, `fe`, etc.)
    PawnCaptureShort {
        /// Source file
        src: usize,
        /// Destination file
        dst: usize,
        /// Piece to promote, if any
        promote: Option<PromotePiece>,
    },
    /// Non-pawn move
    Simple {
        /// Piece to move
        piece: PieceKind,
        /// Source file, if specified
        file: Option<usize>,
        /// Source rank, if specified
        rank: Option<usize>,
        /// Is the move capture?
        is_capture: bool,
        /// Destination square
        dst: Coord,
    },
}

struct AmbigDetector {
    mv: base::Move,
    sim_any: bool,
    sim_file: bool,
    sim_rank: bool,
}

impl AmbigDetector {
    fn new(mv: base::Move) -> Self {
        Self {
            mv,
            sim_any: false,
            sim_file: false,
            sim_rank: false,
        }
    }

    fn file(&self) -> Option<usize> {
        if self.sim_any && (self.sim_rank || !self.sim_file) {
            return Some(self.mv.src().file());
        }
        None
    }

    fn rank(&self) -> Option<usize> {
        if self.sim_any && self.sim_file {
            return Some(self.mv.src().rank());
        }
        None
    }
}

impl MovePush for AmbigDetector {
    fn push(&mut self, mv: base::Move) {
        if mv.src() == self.mv.src() {
            return;
        }
        self.sim_any = true;
        if self.mv.src().file() == mv.src().file() {
            self.sim_file = true;
        }
        if self.mv.src().rank() == mv.src().rank() {
            self.sim_rank = true;
        }
    }
}

#[derive(Copy, Clone)]
enum AmbigSearcherState {
    Empty,
    Found(base::Move),
    Ambiguity(base::Move, base::Move),
}

struct AmbigSearcher<F> {
    filter: F,
    state: AmbigSearcherState,
}

impl<F: Fn(&base::Move) -> bool> AmbigSearcher<F> {
    fn new(filter: F) -> Self {
        AmbigSearcher {
            filter,
            state: AmbigSearcherState::Empty,
        }
    }

    fn get_move(&self) -> Result<base::Move, IntoMoveError> {
        match &self.state {
            AmbigSearcherState::Empty => Err(IntoMoveError::NotFound),
            AmbigSearcherState::Found(mv) => Ok(*mv),
            AmbigSearcherState::Ambiguity(mv, mv2) => Err(IntoMoveError::Ambiguity(*mv, *mv2)),
        }
    }
}

impl<F: Fn(&base::Move) -> bool> MovePush for AmbigSearcher<F> {
    fn push(&mut self, mv: base::Move) {
        if !(self.filter)(&mv) {
            return;
        }
        self.state = match self.state {
            AmbigSearcherState::Empty => AmbigSearcherState::Found(mv),
            AmbigSearcherState::Found(mv2) => AmbigSearcherState::Ambiguity(mv2, mv),
            s @ AmbigSearcherState::Ambiguity(_, _) => s,
        };
    }
}

fn pawn_capture_kind(
    b: &Board,
    dst: Coord,
    promote: Option<PromotePiece>,
) -> Result<MoveKind, IntoMoveError> {
    if b.get(dst).is_occupied() {
        return Ok(match promote {
            Some(piece) => MoveKind::Promote {
                piece,
                capture: true,
            },
            None => MoveKind::Capture,
        });
    }
    if Some(dst) == b.ep_target() && promote.is_none() {
        return Ok(MoveKind::Enpassant);
    }
    Err(IntoMoveError::CaptureExpected)
}

impl Data {
    /// Returns the wrapper which helps to format the move with the given style `style`
    ///
    /// See [`Move::styled()`] doc for details.
    #[inline]
    pub fn styled(&self, style: Style) -> StyledData<'_> {
        StyledData(self, style)
    }

    /// Creates the parsed SAN from move `mv` in position `b`
    ///
    /// The move is expected to be legal. Disambiguation is computed against the other legal
    /// moves of the same piece kind to the same square.
    pub fn from_move(mv: base::Move, b: &Board) -> Data {
        if let Some(side) = mv.kind().castling() {
            return Data::Castling(side);
        }
        if mv.piece() == PieceKind::Pawn {
            if mv.src().file() == mv.dst().file() {
                return Data::PawnMove {
                    dst: mv.dst(),
                    promote: mv.promote(),
                };
            }
            return Data::PawnCapture {
                src: mv.src().file(),
                dst: mv.dst(),
                promote: mv.promote(),
            };
        }
        let mut detector = AmbigDetector::new(mv);
        movegen::san_candidates(b, mv.piece(), mv.dst(), &mut detector);
        Data::Simple {
            piece: mv.piece(),
            file: detector.file(),
            rank: detector.rank(),
            is_capture: mv.is_capture(),
            dst: mv.dst(),
        }
    }

    /// Converts the parsed SAN into [`moves::Move`](super::Move) in the position `b`
    ///
    /// The returned move is guaranteed to be legal.
    pub fn into_move(self, b: &Board) -> Result<base::Move, IntoMoveError> {
        let side = b.side();
        let dims = b.dims();
        match self {
            Self::Castling(side_to) => {
                let mv = base::Move::from_castling(b.raw(), side, side_to);
                mv.validate(b)?;
                Ok(mv)
            }
            Self::PawnMove { dst, promote } => {
                let fwd = geometry::pawn_forward_delta(side);
                let mut src = dims.shift(dst, 0, -fwd).ok_or(IntoMoveError::NotFound)?;
                let mut kind = MoveKind::Quiet;
                if b.get(src).is_empty() {
                    if let Some(far) = dims.shift(dst, 0, -2 * fwd) {
                        if far.rank() == geometry::pawn_home_rank(dims, side) {
                            src = far;
                            kind = MoveKind::PawnDouble;
                        }
                    }
                }
                let kind = match promote {
                    Some(piece) => MoveKind::Promote {
                        piece,
                        capture: false,
                    },
                    None => kind,
                };
                let mv = base::Move::new(kind, PieceKind::Pawn, src, dst);
                mv.validate(b)?;
                Ok(mv)
            }
            Self::PawnCapture { src, dst, promote } => {
                let fwd = geometry::pawn_forward_delta(side);
                let src_rank = dims.shift(dst, 0, -fwd).ok_or(IntoMoveError::NotFound)?.rank();
                let kind = pawn_capture_kind(b, dst, promote)?;
                let mv = base::Move::new(
                    kind,
                    PieceKind::Pawn,
                    Coord::from_parts(src, src_rank),
                    dst,
                );
                mv.validate(b)?;
                Ok(mv)
            }
            Self::PawnCaptureShort { src, dst, promote } => {
                let mut searcher = AmbigSearcher::new(|mv: &base::Move| {
                    mv.piece() == PieceKind::Pawn
                        && mv.is_capture()
                        && mv.src().file() == src
                        && mv.dst().file() == dst
                        && mv.promote() == promote
                });
                for mv in movegen::legal_moves_all(b) {
                    searcher.push(mv);
                }
                searcher.get_move()
            }
            Self::Simple {
                piece,
                file,
                rank,
                is_capture,
                dst,
            } => {
                if is_capture && b.get(dst).is_empty() {
                    return Err(IntoMoveError::CaptureExpected);
                }
                let mut searcher = AmbigSearcher::new(|mv: &base::Move| {
                    file.map_or(true, |f| mv.src().file() == f)
                        && rank.map_or(true, |r| mv.src().rank() == r)
                });
                movegen::san_candidates(b, piece, dst, &mut searcher);
                searcher.get_move()
            }
        }
    }

    fn write_styled(&self, f: &mut fmt::Formatter<'_>, style: Style) -> fmt::Result {
        match *self {
            Self::Castling(CastlingSide::King) => write!(f, "O-O"),
            Self::Castling(CastlingSide::Queen) => write!(f, "O-O-O"),
            Self::PawnMove { dst, promote } => {
                write!(f, "{}", dst)?;
                style.write_promote(f, promote)
            }
            Self::PawnCapture { src, dst, promote } => {
                write!(f, "{}x{}", types::file_to_char(src), dst)?;
                style.write_promote(f, promote)
            }
            Self::PawnCaptureShort { src, dst, promote } => {
                write!(f, "{}{}", types::file_to_char(src), types::file_to_char(dst))?;
                style.write_promote(f, promote)
            }
            Self::Simple {
                piece,
                file,
                rank,
                is_capture,
                dst,
            } => {
                write!(f, "{}", style.piece_char(piece))?;
                if let Some(file) = file {
                    write!(f, "{}", types::file_to_char(file))?;
                }
                if let Some(rank) = rank {
                    write!(f, "{}", rank + 1)?;
                }
                if is_capture {
                    write!(f, "x")?;
                }
                write!(f, "{}", dst)
            }
        }
    }
}

impl fmt::Display for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_styled(f, Style::Algebraic)
    }
}

impl<'a> fmt::Display for StyledData<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.write_styled(f, self.1)
    }
}

fn file_of(b: u8) -> Option<usize> {
    types::file_from_char(b as char)
}

/// Splits the destination square off the end of `s`
fn split_dst(s: &str) -> Result<(&str, Coord), RawParseError> {
    let digits = s.bytes().rev().take_while(u8::is_ascii_digit).count();
    let start = s
        .len()
        .checked_sub(digits + 1)
        .ok_or(RawParseError::Syntax)?;
    let dst = Coord::from_str(&s[start..])?;
    Ok((&s[..start], dst))
}

fn parse_rank(s: &str) -> Result<(Option<usize>, &str), RawParseError> {
    let digits = s.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return Ok((None, s));
    }
    let rank: usize = s[..digits].parse().map_err(|_| RawParseError::Syntax)?;
    if rank == 0 || rank > types::MAX_ORDINAL || s.starts_with('0') {
        return Err(RawParseError::Syntax);
    }
    Ok((Some(rank - 1), &s[digits..]))
}

impl FromStr for Data {
    type Err = RawParseError;

    fn from_str(data: &str) -> Result<Data, Self::Err> {
        if data == "O-O" || data == "0-0" {
            return Ok(Self::Castling(CastlingSide::King));
        }
        if data == "O-O-O" || data == "0-0-0" {
            return Ok(Self::Castling(CastlingSide::Queen));
        }
        if data.is_empty() {
            return Err(RawParseError::EmptyString);
        }
        if !data.is_ascii() {
            return Err(RawParseError::NonAscii);
        }

        let first = data.as_bytes()[0];
        if let Some(piece) = PieceKind::from_char(first as char).filter(|&p| p != PieceKind::Pawn)
        {
            let (rest, dst) = split_dst(&data[1..])?;
            let (file, rest) = match rest.bytes().next().and_then(file_of) {
                Some(file) => (Some(file), &rest[1..]),
                None => (None, rest),
            };
            let (rank, rest) = parse_rank(rest)?;
            let (is_capture, rest) = match rest.bytes().next() {
                Some(b'x' | b':') => (true, &rest[1..]),
                _ => (false, rest),
            };
            if !rest.is_empty() {
                return Err(RawParseError::NonPawnMoveTooLong);
            }
            return Ok(Data::Simple {
                piece,
                file,
                rank,
                is_capture,
                dst,
            });
        }

        let bytes = data.as_bytes();
        let (promote, rest) = match bytes.split_last() {
            Some((b @ (b'N' | b'B' | b'R' | b'Q'), _)) => {
                let promote = match PieceKind::from_char(*b as char).map(PromotePiece::try_from) {
                    Some(Ok(p)) => p,
                    _ => return Err(RawParseError::Syntax),
                };
                let rest = &data[..data.len() - 1];
                let rest = rest.strip_suffix('=').unwrap_or(rest);
                (Some(promote), rest)
            }
            _ => (None, data),
        };

        if rest.len() < 2 {
            return Err(RawParseError::PawnMoveTooShort);
        }
        let rb = rest.as_bytes();
        if rest.len() == 2 {
            if let (Some(src), Some(dst)) = (file_of(rb[0]), file_of(rb[1])) {
                return Ok(Data::PawnCaptureShort { src, dst, promote });
            }
        }

        let (prefix, dst) = split_dst(rest)?;
        let pb = prefix.as_bytes();
        match pb.len() {
            0 => Ok(Data::PawnMove { dst, promote }),
            1 => Err(RawParseError::Syntax),
            2 => {
                let src = file_of(pb[0]).ok_or(RawParseError::Syntax)?;
                if !matches!(pb[1], b':' | b'x') {
                    return Err(RawParseError::Syntax);
                }
                Ok(Data::PawnCapture { src, dst, promote })
            }
            _ => Err(RawParseError::PawnMoveTooLong),
        }
    }
}

/// Check indication
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum CheckMark {
    /// Check (a.k.a. "+")
    Single,
    /// Double check (a.k.a "++")
    ///
    /// This one is not set while converting the move into SAN and is used primarily for parsing.
    /// Note that in some notations "++" may denote checkmate, but it's still parsed as
    /// [`CheckMark::Double`].
    Double,
    /// Checkmate (a.k.a "#")
    Checkmate,
}

/// Parsed SAN move with a [`CheckMark`]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Move {
    /// Data without check mark
    pub data: Data,
    /// Check mark, if any
    pub check: Option<CheckMark>,
}

/// Wrapper to format [`Data`] with the given style
///
/// See [`Move::styled()`] doc for details.
pub struct StyledData<'a>(&'a Data, Style);

/// Wrapper to format [`Move`] with the given style
///
/// See [`Move::styled()`] doc for details.
pub struct StyledMove<'a>(&'a Move, Style);

impl Move {
    /// Returns the wrapper which helps to format the move with the given style `style`
    ///
    /// The resulting wrapper implements [`fmt::Display`], so can be used with
    /// `write!()`, `println!()`, or `ToString::to_string`.
    ///
    /// The usage is similar to [`RawBoard::pretty()`](crate::RawBoard::pretty) or
    /// [`moves::Move::styled()`](super::Move::styled).
    #[inline]
    pub fn styled(&self, style: Style) -> StyledMove<'_> {
        StyledMove(self, style)
    }

    fn write_styled(&self, f: &mut fmt::Formatter<'_>, style: Style) -> fmt::Result {
        self.data.write_styled(f, style)?;
        let mark = match self.check {
            Some(CheckMark::Single) => "+",
            Some(CheckMark::Double) => "++",
            Some(CheckMark::Checkmate) => "#",
            None => "",
        };
        f.write_str(mark)
    }

    /// Creates the parsed SAN from move `mv` in position `b`
    ///
    /// Returns an error if the move is not legal in `b`.
    pub fn from_move(mv: base::Move, b: &Board) -> Result<Move, ValidateError> {
        let next = b.make_move(mv)?;
        let data = Data::from_move(mv, b);
        let check = if next.is_check() {
            if movegen::has_legal_moves(&next) {
                Some(CheckMark::Single)
            } else {
                Some(CheckMark::Checkmate)
            }
        } else {
            None
        };
        Ok(Move { data, check })
    }

    /// Converts the parsed SAN into [`moves::Move`](super::Move) in the position `b`
    ///
    /// The check mark is not verified.
    pub fn into_move(self, b: &Board) -> Result<base::Move, IntoMoveError> {
        self.data.into_move(b)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_styled(f, Style::Algebraic)
    }
}

impl<'a> fmt::Display for StyledMove<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.write_styled(f, self.1)
    }
}

impl FromStr for Move {
    type Err = RawParseError;

    fn from_str(s: &str) -> Result<Move, Self::Err> {
        let (check, s) = if let Some(rest) = s.strip_suffix('#') {
            (Some(CheckMark::Checkmate), rest)
        } else if let Some(rest) = s.strip_suffix("++") {
            (Some(CheckMark::Double), rest)
        } else if let Some(rest) = s.strip_suffix('+') {
            (Some(CheckMark::Single), rest)
        } else {
            (None, s)
        };
        Ok(Move {
            data: Data::from_str(s)?,
            check,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Dims;

    #[test]
    fn test_simple() {
        let mut b = Board::initial();
        for (mv_str, fen_str) in [
            (
                "e4",
                "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1",
            ),
            (
                "Nc6",
                "r1bqkbnr/pppppppp/2n5/8/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 1 2",
            ),
            (
                "Nf3",
                "r1bqkbnr/pppppppp/2n5/8/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 2 2",
            ),
            (
                "e5",
                "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq e6 0 3",
            ),
            (
                "Bb5",
                "r1bqkbnr/pppp1ppp/2n5/1B2p3/4P3/5N2/PPPP1PPP/RNBQK2R b KQkq - 1 3",
            ),
            (
                "Nf6",
                "r1bqkb1r/pppp1ppp/2n2n2/1B2p3/4P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 2 4",
            ),
            (
                "O-O",
                "r1bqkb1r/pppp1ppp/2n2n2/1B2p3/4P3/5N2/PPPP1PPP/RNBQ1RK1 b kq - 3 4",
            ),
            (
                "Nxe4",
                "r1bqkb1r/pppp1ppp/2n5/1B2p3/4n3/5N2/PPPP1PPP/RNBQ1RK1 w kq - 0 5",
            ),
            (
                "Re1",
                "r1bqkb1r/pppp1ppp/2n5/1B2p3/4n3/5N2/PPPP1PPP/RNBQR1K1 b kq - 1 5",
            ),
            (
                "Qh4",
                "r1b1kb1r/pppp1ppp/2n5/1B2p3/4n2q/5N2/PPPP1PPP/RNBQR1K1 w kq - 2 6",
            ),
            (
                "Kh1",
                "r1b1kb1r/pppp1ppp/2n5/1B2p3/4n2q/5N2/PPPP1PPP/RNBQR2K b kq - 3 6",
            ),
        ] {
            let m = base::Move::from_san(mv_str, &b).unwrap();
            assert_eq!(
                Move::from_str(mv_str).unwrap(),
                Move::from_move(m, &b).unwrap()
            );
            assert_eq!(m.san(&b).unwrap().to_string(), mv_str.to_string());
            b.apply_move(m).unwrap();
            assert_eq!(b.as_fen(), fen_str);
        }
    }

    #[test]
    fn test_pawn_conflict() {
        let b = Board::from_fen("8/8/1p6/2P5/1p5k/2P5/7K/8 w - - 0 1").unwrap();
        assert!(matches!(
            base::Move::from_san("cb", &b),
            Err(ParseError::Convert(IntoMoveError::Ambiguity(_, _)))
        ));
        assert_eq!(
            base::Move::from_san("cxb4", &b).unwrap(),
            base::Move::from_uci("c3b4", &b).unwrap()
        );
        assert_eq!(
            base::Move::from_san("cxb6", &b).unwrap(),
            base::Move::from_uci("c5b6", &b).unwrap()
        );
        assert_eq!(
            base::Move::from_san("cd", &b),
            Err(ParseError::Convert(IntoMoveError::NotFound))
        );
    }

    #[test]
    fn test_conflict() {
        let b = Board::from_fen("k5K1/8/5q2/6n1/8/2P5/5q2/8 b - - 0 1").unwrap();
        let san = |s: &str| base::Move::from_san(s, &b);
        let uci = |s: &str| base::Move::from_uci(s, &b).unwrap();
        assert_eq!(san("Qe5").unwrap(), uci("f6e5"));
        assert!(matches!(
            san("Qd4"),
            Err(ParseError::Convert(IntoMoveError::Ambiguity(_, _)))
        ));
        assert_eq!(san("Qxc3").unwrap(), uci("f6c3"));
        assert_eq!(san("Qb2").unwrap(), uci("f2b2"));
        assert_eq!(san("Qa1"), Err(ParseError::Convert(IntoMoveError::NotFound)));
        assert_eq!(san("Qg5"), Err(ParseError::Convert(IntoMoveError::NotFound)));
        assert_eq!(san("Qe3").unwrap(), uci("f2e3"));
        assert_eq!(san("Q2d4").unwrap(), uci("f2d4"));
        assert_eq!(san("Q6d4").unwrap(), uci("f6d4"));
        assert_eq!(san("Qf6d4").unwrap(), uci("f6d4"));
        assert_eq!(san("Qfe5").unwrap(), uci("f6e5"));
        assert_eq!(san("Q6e5").unwrap(), uci("f6e5"));
        assert_eq!(san("Qf6e5").unwrap(), uci("f6e5"));
        assert_eq!(san("Qge5"), Err(ParseError::Convert(IntoMoveError::NotFound)));
        assert_eq!(san("Q5e5"), Err(ParseError::Convert(IntoMoveError::NotFound)));
        assert_eq!(san("Qg5e5"), Err(ParseError::Convert(IntoMoveError::NotFound)));
        assert!(matches!(
            san("Qfd4"),
            Err(ParseError::Convert(IntoMoveError::Ambiguity(_, _)))
        ));
        assert_eq!(san("Kaa7").unwrap(), uci("a8a7"));
    }

    #[test]
    fn test_capture() {
        let b = Board::from_fen("k5K1/8/p4q2/1P4n1/8/2P5/5q2/8 b - - 0 1").unwrap();
        let san = |s: &str| base::Move::from_san(s, &b);
        let uci = |s: &str| base::Move::from_uci(s, &b).unwrap();
        assert_eq!(
            san("Qxe5"),
            Err(ParseError::Convert(IntoMoveError::CaptureExpected))
        );
        assert_eq!(san("Qe5").unwrap(), uci("f6e5"));
        assert_eq!(san("Qc3").unwrap(), uci("f6c3"));
        assert_eq!(san("Qxc3").unwrap(), uci("f6c3"));
        assert_eq!(san("axb5").unwrap(), uci("a6b5"));
        assert_eq!(
            san("axa5"),
            Err(ParseError::Convert(IntoMoveError::CaptureExpected))
        );
        assert_eq!(
            san("a4"),
            Err(ParseError::Convert(IntoMoveError::Validate(
                ValidateError::NoPiece(Coord::from_str("a5").unwrap())
            )))
        );
        assert_eq!(san("a5").unwrap(), uci("a6a5"));
    }

    #[test]
    fn test_pawns() {
        for (fen_str, uci_str, mv_str, real_mv_str) in [
            ("8/8/8/4p3/3P4/8/3P4/5K1k w - - 0 1", "d4e5", "de", "dxe5"),
            ("8/8/8/2PpP3/8/8/5k1K/8 w - d6 0 1", "c5d6", "cd", "cxd6"),
            ("8/8/8/2PpP3/8/8/5k1K/8 w - d6 0 1", "e5d6", "ed", "exd6"),
            ("8/8/8/3pP3/2P5/8/5k1K/8 w - d6 0 1", "c4d5", "cd", "cxd5"),
            ("8/8/8/3pP3/2P5/8/5k1K/8 w - d6 0 1", "e5d6", "ed", "exd6"),
            (
                "2n2n1n/3P2P1/8/8/8/8/3K1k2/8 w - - 0 1",
                "d7d8n",
                "d8N",
                "d8=N",
            ),
            (
                "2n2n1n/3P2P1/8/8/8/8/3K1k2/8 w - - 0 1",
                "d7c8b",
                "dcB",
                "dxc8=B",
            ),
            (
                "2n2n1n/3P2P1/8/8/8/8/3K1k2/8 w - - 0 1",
                "g7f8r",
                "gf=R",
                "gxf8=R+",
            ),
            (
                "2n2n1n/3P2P1/8/8/8/8/3K1k2/8 w - - 0 1",
                "g7h8q",
                "gh=Q",
                "gxh8=Q",
            ),
            ("8/8/8/8/3p3k/2P5/1PP4K/8 w - - 0 1", "b2b3", "b3", "b3"),
            ("8/8/8/8/3p3k/2P5/1PP4K/8 w - - 0 1", "b2b4", "b4", "b4"),
            ("8/8/8/8/3p3k/2P5/1PP4K/8 w - - 0 1", "c3c4", "c4", "c4"),
            ("8/8/8/8/3p3k/2P5/1PP4K/8 w - - 0 1", "c3d4", "cd", "cxd4"),
        ] {
            let b = Board::from_fen(fen_str).unwrap();
            let m = base::Move::from_san(mv_str, &b).unwrap();
            assert_eq!(m, base::Move::from_uci(uci_str, &b).unwrap());
            assert_eq!(m, base::Move::from_san(real_mv_str, &b).unwrap());
            assert_eq!(m.san(&b).unwrap().to_string(), real_mv_str.to_string());
            m.validate(&b).unwrap();
        }
    }

    #[test]
    fn test_promotion_errors() {
        let b = Board::from_fen("8/3P4/8/8/8/8/k7/4K3 w - - 0 1").unwrap();
        assert_eq!(
            base::Move::from_san("d8", &b),
            Err(ParseError::Convert(IntoMoveError::Validate(
                ValidateError::PromotionRequired
            )))
        );
        assert!(matches!(
            base::Move::from_san("Kd2=Q", &b),
            Err(ParseError::Parse(RawParseError::InvalidDst(_)))
        ));
        let b = Board::from_fen("8/8/8/8/8/3P4/k7/4K3 w - - 0 1").unwrap();
        assert_eq!(
            base::Move::from_san("d4=Q", &b),
            Err(ParseError::Convert(IntoMoveError::Validate(
                ValidateError::UnexpectedPromotion
            )))
        );
    }

    #[test]
    fn test_tricky() {
        for (fen_str, uci_str, mv_str) in [
            ("4k3/6K1/8/2N5/8/8/8/N7 w - - 0 1", "a1b3", "Nab3"),
            ("4k3/6K1/8/N7/8/8/8/N7 w - - 0 1", "a1b3", "N1b3"),
            ("4k3/6K1/8/8/8/8/8/N1N5 w - - 0 1", "a1b3", "Nab3"),
            ("4k3/6K1/8/N1N5/8/8/8/N1N5 w - - 0 1", "a1b3", "Na1b3"),
            ("5k2/8/5K2/8/3R3R/8/8/b7 w - - 0 1", "h4f4", "Rf4"),
            ("4k3/6K1/8/2N5/8/1r6/8/N7 w - - 0 1", "a1b3", "Naxb3"),
            ("4k3/6K1/8/N7/8/1r6/8/N7 w - - 0 1", "a1b3", "N1xb3"),
            ("4k3/6K1/8/8/8/1r6/8/N1N5 w - - 0 1", "a1b3", "Naxb3"),
            ("4k3/6K1/8/N1N5/8/1r6/8/N1N5 w - - 0 1", "a1b3", "Na1xb3"),
        ] {
            let b = Board::from_fen(fen_str).unwrap();
            let m = base::Move::from_san(mv_str, &b).unwrap();
            assert_eq!(m, base::Move::from_uci(uci_str, &b).unwrap());
            assert_eq!(
                Move::from_str(mv_str).unwrap(),
                Move::from_move(m, &b).unwrap()
            );
            assert_eq!(m.san(&b).unwrap().to_string(), mv_str.to_string());
            m.validate(&b).unwrap();
        }
    }

    #[test]
    fn test_styled() {
        let b = Board::from_fen("8/2P5/8/8/8/8/4k1K1/8 w - - 0 1").unwrap();
        let styled = |uci: &str, style| {
            base::Move::from_uci(uci, &b)
                .unwrap()
                .san(&b)
                .unwrap()
                .styled(style)
                .to_string()
        };
        assert_eq!(styled("g2h2", Style::Utf8), "♔h2");
        assert_eq!(styled("g2h2", Style::Algebraic), "Kh2");
        assert_eq!(styled("c7c8b", Style::Utf8), "c8♗");
        assert_eq!(styled("c7c8b", Style::Algebraic), "c8=B");
    }

    #[test]
    fn test_check() {
        let b = Board::from_fen("1r5k/8/8/8/8/6p1/r7/5K2 b - - 0 1").unwrap();
        let san = |s: &str| base::Move::from_san(s, &b).unwrap();
        let uci = |s: &str| base::Move::from_uci(s, &b).unwrap();
        assert_eq!(uci("g3g2").san(&b).unwrap().to_string(), "g2+");
        assert_eq!(uci("b8b1").san(&b).unwrap().to_string(), "Rb1#");
        assert_eq!(san("g2"), uci("g3g2"));
        assert_eq!(san("g2+"), uci("g3g2"));
        assert_eq!(san("Rb1"), uci("b8b1"));
        assert_eq!(san("Rb1+"), uci("b8b1"));
        assert_eq!(san("Rb1#"), uci("b8b1"));
        assert_eq!(
            Move::from_str("Rb1++").unwrap().check,
            Some(CheckMark::Double)
        );
    }

    #[test]
    fn test_parse() {
        assert_eq!(Move::from_str(""), Err(RawParseError::EmptyString));
        assert_eq!(Move::from_str("0-0-0").unwrap().data, Data::Castling(CastlingSide::Queen));
        assert_eq!(Move::from_str("Nf3♘"), Err(RawParseError::NonAscii));
        assert_eq!(Move::from_str("e"), Err(RawParseError::PawnMoveTooShort));
        assert_eq!(Move::from_str("exyd4"), Err(RawParseError::PawnMoveTooLong));
        assert_eq!(Move::from_str("Nbxxd4"), Err(RawParseError::NonPawnMoveTooLong));
        assert_eq!(
            Move::from_str("Rb10b12").unwrap().data,
            Data::Simple {
                piece: PieceKind::Rook,
                file: Some(1),
                rank: Some(9),
                is_capture: false,
                dst: Coord::from_str("b12").unwrap(),
            }
        );
        assert!(matches!(
            Move::from_str("Nq3"),
            Err(RawParseError::InvalidDst(_))
        ));
    }

    #[test]
    fn test_tall_board() {
        let dims = Dims::new(8, 10).unwrap();
        let b = Board::from_fen_dims("4k3/10/10/10/10/10/10/10/4P3/R3K3 w Q - 0 1", dims);
        assert!(b.is_err());
        let b = Board::from_fen_dims("4k3/8/8/8/8/8/8/8/4P3/R3K3 w Q - 0 1", dims).unwrap();
        let m = base::Move::from_san("e4", &b).unwrap();
        assert_eq!(m.kind(), MoveKind::PawnDouble);
        let m = base::Move::from_san("Ra10+", &b).unwrap();
        assert_eq!(m.dst(), Coord::from_str("a10").unwrap());
        assert_eq!(m.san(&b).unwrap().to_string(), "Ra10+");
        let m = base::Move::from_san("O-O-O", &b).unwrap();
        assert_eq!(m.san(&b).unwrap().to_string(), "O-O-O");
    }
}
